//! The outline tree value and its read-only queries.
//!
//! An `OutlineTree` is an immutable value: every mutation (see `mutate`)
//! returns a new tree that shares all untouched subtrees with the old one.
//! Cloning a tree is O(1).

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{Result, SyllabusError};

use super::renumber::{is_contiguous, renumber, sort_group};
use super::snapshot::LessonSnapshot;
use super::types::{FolderIndex, FolderPath, MAX_DEPTH, Node, OutlinePath};

/// Ordered list of root chapters plus the folder index allocator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutlineTree {
    pub(super) roots: Arc<Vec<Arc<Node>>>,
    /// Next folder index to hand out; only ever grows
    pub(super) next_folder_index: u32,
}

impl OutlineTree {
    /// Empty outline
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from stored lessons.
    ///
    /// Sibling groups are stably sorted by their stored `order` and then
    /// renumbered to `1..N`. Fails on lessons nested below the depth bound and
    /// on duplicate folder indices.
    pub fn from_snapshot(lessons: &[LessonSnapshot]) -> Result<Self> {
        let mut seen = HashSet::new();
        let roots = build_group(lessons, 0, &mut seen)?;
        let next_folder_index = seen.iter().map(|i| i.0 + 1).max().unwrap_or(0);
        Ok(Self {
            roots: Arc::new(roots),
            next_folder_index,
        })
    }

    /// Serializable form of the whole tree
    pub fn to_snapshot(&self) -> Vec<LessonSnapshot> {
        self.roots.iter().map(|node| snapshot_node(node)).collect()
    }

    /// Root chapters in display order
    pub fn roots(&self) -> &[Arc<Node>] {
        &self.roots
    }

    /// Total number of nodes
    pub fn len(&self) -> usize {
        self.roots.iter().map(|node| node.subtree_len()).sum()
    }

    /// Whether the outline has no chapters
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Folder index the next inserted node will receive
    pub fn next_folder_index(&self) -> FolderIndex {
        FolderIndex(self.next_folder_index)
    }

    /// Whether `other` is the very same tree value (no change happened)
    pub fn same_snapshot(&self, other: &OutlineTree) -> bool {
        Arc::ptr_eq(&self.roots, &other.roots)
            && self.next_folder_index == other.next_folder_index
    }

    /// The sibling group whose parent is at `parent` (empty slice = roots)
    pub fn group(&self, parent: &[usize]) -> Option<&[Arc<Node>]> {
        let mut group: &[Arc<Node>] = &self.roots;
        for &index in parent {
            group = &group.get(index)?.children;
        }
        Some(group)
    }

    /// Node at `path`
    pub fn get(&self, path: &OutlinePath) -> Option<&Arc<Node>> {
        let (last, parent) = path.as_slice().split_last()?;
        self.group(parent)?.get(*last)
    }

    /// Node at `path`, or `NodeNotFound`
    pub fn node(&self, path: &OutlinePath) -> Result<&Node> {
        self.get(path)
            .map(|node| node.as_ref())
            .ok_or_else(|| SyllabusError::NodeNotFound(path.clone()))
    }

    /// Storage address of the node at `path`
    pub fn folder_path_of(&self, path: &OutlinePath) -> Option<FolderPath> {
        let mut group: &[Arc<Node>] = &self.roots;
        let mut indices = Vec::with_capacity(path.len());
        for &index in path.as_slice() {
            let node = group.get(index)?;
            indices.push(node.folder_index);
            group = &node.children;
        }
        if indices.is_empty() {
            return None;
        }
        Some(FolderPath::from(indices))
    }

    /// Current position of the node with the given storage address
    pub fn path_of(&self, folder_path: &FolderPath) -> Option<OutlinePath> {
        let mut group: &[Arc<Node>] = &self.roots;
        let mut segments = Vec::with_capacity(folder_path.len());
        for folder_index in folder_path.as_slice() {
            let position = group
                .iter()
                .position(|node| node.folder_index == *folder_index)?;
            segments.push(position);
            group = &group[position].children;
        }
        if segments.is_empty() {
            return None;
        }
        Some(OutlinePath::from(segments))
    }

    /// Whether a child may be added under the node at `parent`
    pub fn can_insert_child(&self, parent: &OutlinePath) -> bool {
        !parent.is_empty() && parent.len() <= MAX_DEPTH && self.get(parent).is_some()
    }

    /// Verify the structural invariants; returns a description of the first
    /// violation found.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        check_group(&self.roots, 0, &mut seen)?;
        if let Some(max) = seen.iter().max()
            && max.0 >= self.next_folder_index
        {
            return Err(format!(
                "folder index {} not below allocator {}",
                max, self.next_folder_index
            ));
        }
        Ok(())
    }
}

fn build_group(
    lessons: &[LessonSnapshot],
    depth: usize,
    seen: &mut HashSet<FolderIndex>,
) -> Result<Vec<Arc<Node>>> {
    let mut group = Vec::with_capacity(lessons.len());
    for lesson in lessons {
        if depth > MAX_DEPTH {
            return Err(SyllabusError::DepthExceeded {
                title: lesson.title.clone(),
            });
        }
        if !seen.insert(lesson.folder_index) {
            return Err(SyllabusError::DuplicateFolderIndex(lesson.folder_index));
        }
        let children = build_group(&lesson.sublessons, depth + 1, seen)?;
        group.push(Arc::new(Node {
            title: lesson.title.clone(),
            content: lesson.content.clone(),
            order: lesson.order,
            folder_index: lesson.folder_index,
            children,
        }));
    }
    sort_group(&mut group);
    renumber(&mut group);
    Ok(group)
}

fn snapshot_node(node: &Node) -> LessonSnapshot {
    LessonSnapshot {
        title: node.title.clone(),
        content: node.content.clone(),
        order: node.order,
        folder_index: node.folder_index,
        has_sublessons: node.has_children(),
        sublessons: node.children.iter().map(|c| snapshot_node(c)).collect(),
    }
}

fn check_group(
    group: &[Arc<Node>],
    depth: usize,
    seen: &mut HashSet<FolderIndex>,
) -> std::result::Result<(), String> {
    if !is_contiguous(group) {
        let orders: Vec<u32> = group.iter().map(|n| n.order).collect();
        return Err(format!("orders {:?} at depth {} not contiguous", orders, depth));
    }
    for node in group {
        if depth > MAX_DEPTH {
            return Err(format!("'{}' lives at depth {}", node.title, depth));
        }
        if !seen.insert(node.folder_index) {
            return Err(format!("folder index {} repeated", node.folder_index));
        }
        check_group(&node.children, depth + 1, seen)?;
    }
    Ok(())
}
