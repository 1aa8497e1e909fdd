//! # Path Locator
//!
//! Resolves path patterns against a node tree.
//!
//! ## Pattern syntax
//!
//! ```text
//! .//region[@id="VisualBank"]/node[@id="VisualBank"]/children/node[@id="Resource"]
//! ```
//!
//! - `/` descends to children, `//` to all descendants
//! - a leading `.` names the context node and may be omitted
//! - a step is a tag name or `*`, followed by any number of predicates:
//!   `[@attr="value"]`, `[@attr='value']` or `[@attr]`
//!
//! Matches are reported with their index path from the context node. Index
//! paths identify nodes by position, so two structurally identical siblings
//! stay distinct.

use lsxgen_parser::Node;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid pattern {pattern:?} at {pos}: {message}")]
pub struct PatternError {
    pub pattern: String,
    pub pos: usize,
    pub message: String,
}

impl PatternError {
    fn new(pattern: &str, pos: usize, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.to_string(),
            pos,
            message: message.into(),
        }
    }
}

/// Child indices leading from a context node to a descendant
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Path of the parent and this node's index within it
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (last, parent) = self.0.split_last()?;
        Some((Self(parent.to_vec()), *last))
    }

    /// True when `other` lies strictly below this path
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[@name]`
    Has(String),
    /// `[@name="value"]`
    Equals(String, String),
}

impl Predicate {
    fn matches(&self, node: &Node) -> bool {
        match self {
            Predicate::Has(name) => node.has_attribute(name),
            Predicate::Equals(name, value) => node.attribute(name) == Some(value.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub axis: Axis,
    /// `None` for the `*` wildcard
    pub tag: Option<String>,
    pub predicates: Vec<Predicate>,
}

impl Step {
    fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if node.tag != *tag {
                return false;
            }
        }
        self.predicates.iter().all(|p| p.matches(node))
    }
}

/// Compiled path pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    steps: Vec<Step>,
}

impl Pattern {
    pub fn parse(source: &str) -> Result<Self, PatternError> {
        PatternParser::new(source).parse()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Pattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::parse(&source).map_err(serde::de::Error::custom)
    }
}

struct PatternParser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> PatternParser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<Pattern, PatternError> {
        let mut steps = Vec::new();

        if self.peek() == Some('.') && self.peek_at(1) != Some('.') {
            self.pos += 1;
        } else if self.peek() == Some('/') && self.peek_at(1) != Some('/') {
            return Err(self.error("absolute patterns are not supported"));
        }

        if self.at_end() {
            // "." selects the context node itself
            return Ok(Pattern {
                source: self.source.to_string(),
                steps,
            });
        }

        let mut axis = self.parse_separator(true)?;
        loop {
            steps.push(self.parse_step(axis)?);
            if self.at_end() {
                break;
            }
            axis = self.parse_separator(false)?;
        }

        Ok(Pattern {
            source: self.source.to_string(),
            steps,
        })
    }

    /// Reads `/` or `//`; before the first step the separator is optional
    fn parse_separator(&mut self, first: bool) -> Result<Axis, PatternError> {
        match (self.peek(), self.peek_at(1)) {
            (Some('/'), Some('/')) => {
                self.pos += 2;
                Ok(Axis::Descendant)
            }
            (Some('/'), _) => {
                self.pos += 1;
                Ok(Axis::Child)
            }
            _ if first => Ok(Axis::Child),
            (Some(c), _) => Err(self.error(format!("expected '/', found {:?}", c))),
            (None, _) => Err(self.error("unexpected end of pattern")),
        }
    }

    fn parse_step(&mut self, axis: Axis) -> Result<Step, PatternError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '/' || c == '[' {
                break;
            }
            self.pos += 1;
        }

        let name: String = self.chars[start..self.pos].iter().collect();
        let name = name.trim();
        if name.is_empty() {
            return Err(self.error("expected a tag name or '*'"));
        }
        if name == "." || name == ".." {
            return Err(self.error(format!("{:?} is only allowed at the start", name)));
        }

        let tag = if name == "*" { None } else { Some(name.to_string()) };

        let mut predicates = Vec::new();
        while self.peek() == Some('[') {
            predicates.push(self.parse_predicate()?);
        }

        Ok(Step {
            axis,
            tag,
            predicates,
        })
    }

    fn parse_predicate(&mut self) -> Result<Predicate, PatternError> {
        self.expect('[')?;
        self.skip_spaces();
        self.expect('@')?;

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '=' || c == ']' || c.is_whitespace() {
                break;
            }
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        if name.is_empty() {
            return Err(self.error("expected an attribute name after '@'"));
        }

        self.skip_spaces();
        if self.peek() == Some(']') {
            self.pos += 1;
            return Ok(Predicate::Has(name));
        }

        self.expect('=')?;
        self.skip_spaces();

        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.error("expected a quoted value")),
        };
        self.pos += 1;

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == quote {
                break;
            }
            self.pos += 1;
        }
        if self.at_end() {
            return Err(self.error("unterminated string"));
        }
        let value: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;

        self.skip_spaces();
        self.expect(']')?;

        Ok(Predicate::Equals(name, value))
    }

    fn expect(&mut self, expected: char) -> Result<(), PatternError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected {:?}, found {:?}", expected, c))),
            None => Err(self.error(format!("expected {:?}, found end of pattern", expected))),
        }
    }

    fn skip_spaces(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: impl Into<String>) -> PatternError {
        PatternError::new(self.source, self.pos, message)
    }
}

/// A node matched by [`find_all`], with its index path
#[derive(Debug, Clone)]
pub struct Match<'a> {
    pub path: NodePath,
    pub node: &'a Node,
}

/// Every node below `root` matching `pattern`, in document order
///
/// Never fails: a pattern that matches nothing yields an empty list.
pub fn find_all<'a>(root: &'a Node, pattern: &Pattern) -> Vec<Match<'a>> {
    let mut current = vec![NodePath::root()];

    for step in pattern.steps() {
        let mut next = Vec::new();
        for path in &current {
            let Some(context) = node_at(root, path) else {
                continue;
            };
            match step.axis {
                Axis::Child => {
                    for (index, child) in context.children.iter().enumerate() {
                        if step.matches(child) {
                            next.push(path.child(index));
                        }
                    }
                }
                Axis::Descendant => collect_descendants(context, path, step, &mut next),
            }
        }
        // index paths sort in document order
        next.sort();
        next.dedup();
        current = next;
    }

    current
        .into_iter()
        .filter_map(|path| node_at(root, &path).map(|node| Match { path, node }))
        .collect()
}

/// Depth-first walk with an explicit ancestor stack
fn collect_descendants(context: &Node, context_path: &NodePath, step: &Step, out: &mut Vec<NodePath>) {
    let mut stack: Vec<(&Node, NodePath)> = context
        .children
        .iter()
        .enumerate()
        .rev()
        .map(|(index, child)| (child, context_path.child(index)))
        .collect();

    while let Some((node, path)) = stack.pop() {
        if step.matches(node) {
            out.push(path.clone());
        }
        for (index, child) in node.children.iter().enumerate().rev() {
            stack.push((child, path.child(index)));
        }
    }
}

/// Parent of `node` and its child index, found by identity
///
/// Compares addresses, not values: of two equal siblings only the one that
/// is actually passed in matches. Returns `None` for `root` itself and for
/// nodes outside the tree.
pub fn find_parent<'a>(root: &'a Node, node: &Node) -> Option<(&'a Node, usize)> {
    let mut stack = vec![root];
    while let Some(parent) = stack.pop() {
        if let Some(index) = parent
            .children
            .iter()
            .position(|child| std::ptr::eq(child, node))
        {
            return Some((parent, index));
        }
        stack.extend(parent.children.iter().rev());
    }
    None
}

pub fn node_at<'a>(root: &'a Node, path: &NodePath) -> Option<&'a Node> {
    path.indices()
        .iter()
        .try_fold(root, |node, &index| node.children.get(index))
}

pub fn node_at_mut<'a>(root: &'a mut Node, path: &NodePath) -> Option<&'a mut Node> {
    path.indices()
        .iter()
        .try_fold(root, |node, &index| node.children.get_mut(index))
}
