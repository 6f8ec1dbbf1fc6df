//! Outline data types.
//!
//! This module contains the value types the outline engine is built from:
//! - `FolderIndex` - stable, creation-time identity of a lesson
//! - `FolderPath` - chain of folder indices from the root (storage address)
//! - `OutlinePath` - chain of sibling positions from the root (display address)
//! - `Node` - a chapter or subchapter with its children

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Deepest depth a node may live at (roots are depth 0).
pub const MAX_DEPTH: usize = 2;

/// Stable identity of a lesson, assigned once when the lesson is created.
///
/// Never reassigned and never reused within a tree, so it survives re-sorting
/// and is what storage uses to find a lesson again.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct FolderIndex(pub u32);

impl fmt::Display for FolderIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Positional address of a node: zero-based sibling indices from the root.
///
/// Only meaningful against the tree snapshot it was taken from.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutlinePath(Vec<usize>);

impl OutlinePath {
    /// Path of the root group itself (no segments)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Segments of the path
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of segments (equals the node's depth + 1)
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty path
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Depth of the addressed node, `None` for the empty path
    pub fn depth(&self) -> Option<usize> {
        self.0.len().checked_sub(1)
    }

    /// Path of the parent node, `None` for roots and the empty path
    pub fn parent(&self) -> Option<OutlinePath> {
        if self.0.len() < 2 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// Position within the sibling group
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// Path of the child at `index`
    pub fn child(&self, index: usize) -> OutlinePath {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }

    /// Path of the sibling at `index` (same parent)
    pub fn with_last(&self, index: usize) -> OutlinePath {
        let mut segments = self.0.clone();
        if let Some(last) = segments.last_mut() {
            *last = index;
        }
        Self(segments)
    }

    /// 1-based dotted display number, e.g. `[0, 2]` -> `1.3`
    pub fn display_number(&self) -> String {
        self.0
            .iter()
            .map(|i| (i + 1).to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl From<Vec<usize>> for OutlinePath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

impl From<&[usize]> for OutlinePath {
    fn from(segments: &[usize]) -> Self {
        Self(segments.to_vec())
    }
}

impl fmt::Display for OutlinePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        write!(f, "{}", self.display_number())
    }
}

/// Storage address of a node: the folder indices of its ancestors and itself.
///
/// Stable across re-sorting of siblings; used whenever an address must
/// survive display-order changes (persistence, expansion keys).
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct FolderPath(Vec<FolderIndex>);

impl FolderPath {
    /// Segments of the path
    pub fn as_slice(&self) -> &[FolderIndex] {
        &self.0
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty path
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Folder index of the root chapter this path lives under
    pub fn root(&self) -> Option<FolderIndex> {
        self.0.first().copied()
    }

    /// Folder path of the child with `index`
    pub fn child(&self, index: FolderIndex) -> FolderPath {
        let mut segments = self.0.clone();
        segments.push(index);
        Self(segments)
    }

    /// Strict ancestors, outermost first
    pub fn ancestors(&self) -> impl Iterator<Item = FolderPath> + '_ {
        (1..self.0.len()).map(|end| Self(self.0[..end].to_vec()))
    }
}

impl From<Vec<FolderIndex>> for FolderPath {
    fn from(segments: Vec<FolderIndex>) -> Self {
        Self(segments)
    }
}

impl From<Vec<u32>> for FolderPath {
    fn from(segments: Vec<u32>) -> Self {
        Self(segments.into_iter().map(FolderIndex).collect())
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "/{}", parts.join("/"))
    }
}

/// Direction of a sibling move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards index 0
    Up,
    /// Towards the end of the sibling list
    Down,
}

/// A chapter or subchapter.
///
/// Children are shared (`Arc`) so tree values can reuse untouched subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Display title
    pub title: String,
    /// Markdown body
    pub content: String,
    /// 1-based position among siblings
    pub order: u32,
    /// Stable identity
    pub folder_index: FolderIndex,
    /// Ordered children
    pub children: Vec<Arc<Node>>,
}

impl Node {
    /// Create a leaf node
    pub fn new(
        folder_index: FolderIndex,
        order: u32,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            order,
            folder_index,
            children: Vec::new(),
        }
    }

    /// True iff the node has at least one child
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, the node itself included
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(|c| c.subtree_len()).sum::<usize>()
    }
}

/// Title and content for a lesson that does not exist yet.
///
/// The tree assigns `order` and `folder_index` when the draft is inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeDraft {
    /// Display title
    pub title: String,
    /// Markdown body
    pub content: String,
}

impl NodeDraft {
    /// Create a draft
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}
