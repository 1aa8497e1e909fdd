//! # lsxgen Editor
//!
//! Variant expansion for LSX resource banks.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: .lsx text → Document tree           │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: one expansion pass                  │
//! │  - locator: pattern → template nodes        │
//! │  - rewriter: template → clone per variant   │
//! │  - splicer: template slot → clone run       │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ parser: Document tree → .lsx text           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lsxgen_editor::{BankDocument, ExpansionEngine, VariantSource};
//!
//! let mut doc = BankDocument::load("HUM_F_Body.lsf.lsx")?;
//! let variants = VariantSource::new(["Basis", "Slim", "Heavy"], "Basis")?;
//!
//! let mut engine = ExpansionEngine::default();
//! let report = doc.expand(&mut engine, &variants)?;
//!
//! doc.save_to("HUM_F_Body_generated.lsf.lsx".as_ref(), "\t")?;
//! ```

mod document;
mod errors;
pub mod expansion;
pub mod id_generator;
pub mod locator;
pub mod rewriter;
pub mod splicer;

pub use document::BankDocument;
pub use errors::EditorError;
pub use expansion::{
    ExpansionEngine, ExpansionError, ExpansionOptions, ExpansionReport, GeneratedEntry,
    TemplateInfo, TemplateReport, VariantSource, DEFAULT_BASE_NAME, VISUAL_BANK_PATTERN,
};
pub use id_generator::IDGenerator;
pub use locator::{find_all, find_parent, node_at, Match, NodePath, Pattern, PatternError};
pub use rewriter::{
    derive_base_identifier, expand, sanitize_variant_name, BaseIdentifier, MatchMode,
    RewriteError, RewriteRules, RewriteTarget,
};
pub use splicer::{splice, splice_all, Splice, SpliceError};

// Re-export parser types for convenience
pub use lsxgen_parser::{Document, Node};
