pub mod expand;
pub mod init;
pub mod inspect;

pub use expand::{expand, ExpandArgs};
pub use init::{init, InitArgs};
pub use inspect::{inspect, InspectArgs};
