//! # Document Handle
//!
//! A BankDocument represents a single .lsx file and its editing state.
//! Documents can be:
//! - **Memory-backed**: built from source text, for tests and piping
//! - **File-backed**: loaded from disk, remembers its path
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Expand → Serialize → Save
//!   ↓      ↓       ↓          ↓         ↓
//! File   Tree   Splices    Markup   Temp file + rename
//! ```
//!
//! Saving goes through a temporary file in the destination directory that
//! is renamed over the target, so an interrupted write never leaves a
//! truncated document behind.

use crate::expansion::{ExpansionEngine, ExpansionReport, VariantSource};
use crate::EditorError;
use lsxgen_parser::{parse, parse_bytes, Document, Serializer};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Editable resource-bank document
#[derive(Debug)]
pub struct BankDocument {
    /// Path of the source file, if file-backed
    pub path: Option<PathBuf>,

    tree: Document,
}

impl BankDocument {
    /// Create document from source text (memory-backed)
    pub fn from_source(source: &str) -> Result<Self, EditorError> {
        Ok(Self {
            path: None,
            tree: parse(source)?,
        })
    }

    /// Load document from file (file-backed)
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, EditorError> {
        let path = path.into();
        let bytes = std::fs::read(&path)?;
        let tree = parse_bytes(&bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Loaded document");

        Ok(Self {
            path: Some(path),
            tree,
        })
    }

    pub fn tree(&self) -> &Document {
        &self.tree
    }

    /// Run one expansion pass over this document
    ///
    /// On error the tree is unchanged.
    pub fn expand(
        &mut self,
        engine: &mut ExpansionEngine,
        variants: &VariantSource,
    ) -> Result<ExpansionReport, EditorError> {
        Ok(engine.expand_document(&mut self.tree, variants)?)
    }

    /// Serialize with the given indent string
    pub fn to_markup(&self, indent: &str) -> String {
        Serializer::with_indent(indent).serialize(&self.tree)
    }

    /// Save back to the file the document was loaded from
    pub fn save(&self, indent: &str) -> Result<(), EditorError> {
        let path = self.path.clone().ok_or(EditorError::NotFileBacked)?;
        self.save_to(&path, indent)
    }

    /// Write the document to `path`, replacing it atomically
    pub fn save_to(&self, path: &Path, indent: &str) -> Result<(), EditorError> {
        let markup = self.to_markup(indent);
        write_atomic(path, markup.as_bytes())?;
        info!(path = %path.display(), bytes = markup.len(), "Saved document");
        Ok(())
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
