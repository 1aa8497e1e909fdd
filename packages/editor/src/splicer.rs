//! # Tree Splicer
//!
//! Replaces one node in its parent's child list with an ordered run of
//! replacement nodes.
//!
//! ## Semantics
//!
//! - The replaced node's slot is taken by the replacements, in order
//! - Every other sibling keeps its relative order
//! - An empty replacement list removes the node
//! - The root cannot be spliced (it has no parent)
//!
//! Several splices are applied as one batch: the batch is validated up
//! front, then applied from the last target in document order to the first,
//! so positions of targets not yet applied never shift.

use crate::locator::{node_at, node_at_mut, NodePath};
use lsxgen_parser::Node;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpliceError {
    #[error("Cannot splice the root node")]
    RootNotSpliceable,

    #[error("Node not found: {0}")]
    NodeNotFound(NodePath),

    #[error("Splice targets overlap: {outer} contains {inner}")]
    Overlapping { outer: NodePath, inner: NodePath },

    #[error("Node {0} is targeted twice")]
    Duplicate(NodePath),
}

/// Replace the node at `path` with `replacement`
#[derive(Debug, Clone, PartialEq)]
pub struct Splice {
    pub path: NodePath,
    pub replacement: Vec<Node>,
}

impl Splice {
    pub fn new(path: NodePath, replacement: Vec<Node>) -> Self {
        Self { path, replacement }
    }

    /// Validate that this splice can be applied to `root`
    pub fn validate(&self, root: &Node) -> Result<(), SpliceError> {
        if self.path.is_root() {
            return Err(SpliceError::RootNotSpliceable);
        }
        node_at(root, &self.path)
            .map(|_| ())
            .ok_or_else(|| SpliceError::NodeNotFound(self.path.clone()))
    }

    /// Apply to `root`, returning the removed node
    pub fn apply(self, root: &mut Node) -> Result<Node, SpliceError> {
        let (parent_path, index) = self
            .path
            .split_last()
            .ok_or(SpliceError::RootNotSpliceable)?;

        let parent = node_at_mut(root, &parent_path)
            .filter(|parent| index < parent.children.len())
            .ok_or_else(|| SpliceError::NodeNotFound(self.path.clone()))?;

        let mut removed = parent.children.splice(index..=index, self.replacement);
        removed
            .next()
            .ok_or_else(|| SpliceError::NodeNotFound(self.path.clone()))
    }
}

/// Replace the node at `template_path` with `clones`
///
/// Returns the number of nodes inserted.
pub fn splice(root: &mut Node, template_path: &NodePath, clones: Vec<Node>) -> Result<usize, SpliceError> {
    let inserted = clones.len();
    Splice::new(template_path.clone(), clones).apply(root)?;
    Ok(inserted)
}

/// Check that no path is repeated or lies inside another
pub fn ensure_disjoint<'a>(paths: impl IntoIterator<Item = &'a NodePath>) -> Result<(), SpliceError> {
    let mut sorted: Vec<&NodePath> = paths.into_iter().collect();
    sorted.sort();

    // after sorting, an enclosing path is immediately followed by a path below it
    for pair in sorted.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a == b {
            return Err(SpliceError::Duplicate(a.clone()));
        }
        if a.is_ancestor_of(b) {
            return Err(SpliceError::Overlapping {
                outer: a.clone(),
                inner: b.clone(),
            });
        }
    }
    Ok(())
}

/// Apply several splices to one tree
///
/// Nothing is changed unless every splice validates and the targets are
/// disjoint. Returns the total number of nodes inserted.
pub fn splice_all(root: &mut Node, mut splices: Vec<Splice>) -> Result<usize, SpliceError> {
    ensure_disjoint(splices.iter().map(|s| &s.path))?;
    for s in &splices {
        s.validate(root)?;
    }

    splices.sort_by(|a, b| b.path.cmp(&a.path));

    let mut inserted = 0;
    for s in splices {
        inserted += s.replacement.len();
        s.apply(root)?;
    }
    Ok(inserted)
}
