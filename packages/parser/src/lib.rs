//! # lsxgen parser
//!
//! Document model and I/O for LSX resource-bank files.
//!
//! ```text
//! .lsx text ──parse──▶ Document { declaration, root: Node } ──serialize──▶ .lsx text
//! ```

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;

#[cfg(test)]
mod tests_serializer;

pub use ast::{Attribute, Declaration, Document, Node};
pub use error::{ParseError, ParseResult};
pub use parser::{parse, parse_bytes, Parser};
pub use serializer::{serialize, Serializer};
