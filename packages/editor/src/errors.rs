//! Error types for the editor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] lsxgen_parser::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Expansion error: {0}")]
    Expansion(#[from] crate::expansion::ExpansionError),

    #[error("Document is not file-backed")]
    NotFileBacked,
}

impl EditorError {
    /// True for failures caused by the input rather than the environment
    pub fn is_precondition(&self) -> bool {
        matches!(self, EditorError::Expansion(e) if e.is_precondition())
    }
}
