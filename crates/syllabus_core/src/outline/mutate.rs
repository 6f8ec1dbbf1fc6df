//! Path-addressed edits.
//!
//! Each operation takes `&self` and returns a new tree. Only the nodes on the
//! path from the root to the edited sibling group are copied (via
//! `Arc::make_mut`); every other subtree is shared with the input tree.

use std::sync::Arc;

use crate::error::{Result, SyllabusError};

use super::renumber::{renumber, sort_group};
use super::tree::OutlineTree;
use super::types::{Direction, FolderIndex, MAX_DEPTH, Node, NodeDraft, OutlinePath};

impl OutlineTree {
    /// Append a new root chapter. Returns the new tree and the chapter's path.
    pub fn insert_root(&self, draft: NodeDraft) -> (OutlineTree, OutlinePath) {
        let mut next = self.clone();
        let folder_index = next.allocate();
        let mut roots = self.roots.as_ref().clone();
        roots.push(Arc::new(Node::new(folder_index, 0, draft.title, draft.content)));
        renumber(&mut roots);
        let path = OutlinePath::from(vec![roots.len() - 1]);
        next.roots = Arc::new(roots);
        (next, path)
    }

    /// Append a child under the node at `parent`.
    ///
    /// Rejected with `MaxDepthReached` when the child would land below the
    /// depth bound.
    pub fn insert_child(
        &self,
        parent: &OutlinePath,
        draft: NodeDraft,
    ) -> Result<(OutlineTree, OutlinePath)> {
        if parent.is_empty() {
            return Err(SyllabusError::NodeNotFound(parent.clone()));
        }
        if parent.len() > MAX_DEPTH {
            return Err(SyllabusError::MaxDepthReached(parent.clone()));
        }
        let folder_index = FolderIndex(self.next_folder_index);
        let (mut next, position) = self.edit_group(parent.as_slice(), |group| {
            group.push(Arc::new(Node::new(folder_index, 0, draft.title, draft.content)));
            renumber(group);
            Ok(group.len() - 1)
        })?;
        next.allocate();
        Ok((next, parent.child(position)))
    }

    /// Remove the node at `path` together with its subtree.
    pub fn delete_at(&self, path: &OutlinePath) -> Result<OutlineTree> {
        let (last, parent) = split(path)?;
        let (next, _) = self.edit_group(parent, |group| {
            if last >= group.len() {
                return Err(SyllabusError::NodeNotFound(path.clone()));
            }
            group.remove(last);
            renumber(group);
            Ok(())
        })?;
        Ok(next)
    }

    /// Swap the node at `path` with its neighbour.
    ///
    /// At a boundary the input tree is returned unchanged
    /// (`same_snapshot` holds).
    pub fn move_sibling(&self, path: &OutlinePath, direction: Direction) -> Result<OutlineTree> {
        let (last, parent) = split(path)?;
        let len = self
            .group(parent)
            .ok_or_else(|| SyllabusError::NodeNotFound(path.clone()))?
            .len();
        if last >= len {
            return Err(SyllabusError::NodeNotFound(path.clone()));
        }
        let target = match direction {
            Direction::Up if last > 0 => last - 1,
            Direction::Down if last + 1 < len => last + 1,
            _ => return Ok(self.clone()),
        };
        let (next, _) = self.edit_group(parent, |group| {
            group.swap(last, target);
            renumber(group);
            Ok(())
        })?;
        Ok(next)
    }

    /// Apply `f` to the node at `path`.
    ///
    /// `order`, `folder_index` and `children` are restored after `f` runs;
    /// structure only changes through the dedicated operations.
    pub fn update(&self, path: &OutlinePath, f: impl FnOnce(&mut Node)) -> Result<OutlineTree> {
        let (last, parent) = split(path)?;
        let (next, _) = self.edit_group(parent, |group| {
            let slot = group
                .get_mut(last)
                .ok_or_else(|| SyllabusError::NodeNotFound(path.clone()))?;
            let node = Arc::make_mut(slot);
            let order = node.order;
            let folder_index = node.folder_index;
            let children = std::mem::take(&mut node.children);
            f(node);
            node.order = order;
            node.folder_index = folder_index;
            node.children = children;
            Ok(())
        })?;
        Ok(next)
    }

    /// Replace title and content of the node at `path`
    pub fn update_content(
        &self,
        path: &OutlinePath,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<OutlineTree> {
        let title = title.into();
        let content = content.into();
        self.update(path, |node| {
            node.title = title;
            node.content = content;
        })
    }

    /// Tree with every sibling group stably sorted by `order`.
    ///
    /// Returns a clone sharing the same roots when nothing is out of order.
    pub fn sorted(&self) -> OutlineTree {
        if is_sorted_deep(&self.roots) {
            return self.clone();
        }
        let mut next = self.clone();
        let mut roots = self.roots.as_ref().clone();
        sort_deep(&mut roots);
        next.roots = Arc::new(roots);
        next
    }

    pub(super) fn allocate(&mut self) -> FolderIndex {
        let index = FolderIndex(self.next_folder_index);
        self.next_folder_index += 1;
        index
    }

    /// Copy the path down to the group under `parent` and run `edit` on it.
    fn edit_group<R, F>(&self, parent: &[usize], edit: F) -> Result<(OutlineTree, R)>
    where
        F: FnOnce(&mut Vec<Arc<Node>>) -> Result<R>,
    {
        let mut roots = self.roots.as_ref().clone();
        let out = descend(&mut roots, parent, parent, edit)?;
        Ok((
            OutlineTree {
                roots: Arc::new(roots),
                next_folder_index: self.next_folder_index,
            },
            out,
        ))
    }
}

fn split(path: &OutlinePath) -> Result<(usize, &[usize])> {
    path.as_slice()
        .split_last()
        .map(|(last, parent)| (*last, parent))
        .ok_or_else(|| SyllabusError::NodeNotFound(path.clone()))
}

fn descend<R, F>(group: &mut Vec<Arc<Node>>, rest: &[usize], parent: &[usize], edit: F) -> Result<R>
where
    F: FnOnce(&mut Vec<Arc<Node>>) -> Result<R>,
{
    match rest.split_first() {
        None => edit(group),
        Some((&index, rest)) => {
            let node = group
                .get_mut(index)
                .ok_or_else(|| SyllabusError::NodeNotFound(OutlinePath::from(parent)))?;
            descend(&mut Arc::make_mut(node).children, rest, parent, edit)
        }
    }
}

fn is_sorted_deep(group: &[Arc<Node>]) -> bool {
    group.windows(2).all(|w| w[0].order <= w[1].order)
        && group.iter().all(|node| is_sorted_deep(&node.children))
}

fn sort_deep(group: &mut [Arc<Node>]) {
    sort_group(group);
    for node in group.iter_mut() {
        if !is_sorted_deep(&node.children) {
            sort_deep(&mut Arc::make_mut(node).children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_tree;

    fn titles(group: &[Arc<Node>]) -> Vec<&str> {
        group.iter().map(|n| n.title.as_str()).collect()
    }

    fn orders(group: &[Arc<Node>]) -> Vec<u32> {
        group.iter().map(|n| n.order).collect()
    }

    #[test]
    fn test_move_up_swaps_and_renumbers() {
        let tree = OutlineTree::new();
        let (tree, _) = tree.insert_root(NodeDraft::new("A", "a"));
        let (tree, _) = tree.insert_root(NodeDraft::new("B", "b"));
        let a_index = tree.roots()[0].folder_index;
        let b_index = tree.roots()[1].folder_index;

        let moved = tree.move_sibling(&OutlinePath::from(vec![1]), Direction::Up).unwrap();

        assert_eq!(titles(moved.roots()), vec!["B", "A"]);
        assert_eq!(orders(moved.roots()), vec![1, 2]);
        assert_eq!(moved.roots()[0].folder_index, b_index);
        assert_eq!(moved.roots()[1].folder_index, a_index);
    }

    #[test]
    fn test_move_at_boundary_returns_same_tree() {
        let tree = sample_tree();
        let up = tree.move_sibling(&OutlinePath::from(vec![0]), Direction::Up).unwrap();
        assert!(up.same_snapshot(&tree));
        let last = tree.roots().len() - 1;
        let down = tree
            .move_sibling(&OutlinePath::from(vec![last]), Direction::Down)
            .unwrap();
        assert!(down.same_snapshot(&tree));
    }

    #[test]
    fn test_insert_child_under_depth_two_is_rejected() {
        let tree = sample_tree();
        let deep = OutlinePath::from(vec![0, 0, 0]);
        assert!(tree.get(&deep).is_some());
        let err = tree
            .insert_child(&deep, NodeDraft::new("Too deep", "x"))
            .unwrap_err();
        assert!(matches!(err, SyllabusError::MaxDepthReached(_)));
        assert!(!tree.can_insert_child(&deep));

        // a depth-1 parent still takes children at depth 2
        let middle = OutlinePath::from(vec![0, 1]);
        assert!(tree.can_insert_child(&middle));
        let (_, added) = tree
            .insert_child(&middle, NodeDraft::new("Deepest", "x"))
            .unwrap();
        assert_eq!(added, OutlinePath::from(vec![0, 1, 0]));
    }

    #[test]
    fn test_insert_child_appends_and_shares_other_subtrees() {
        let tree = sample_tree();
        let before = tree.len();
        let (next, path) = tree
            .insert_child(&OutlinePath::from(vec![1]), NodeDraft::new("New", "n"))
            .unwrap();

        assert_eq!(next.len(), before + 1);
        assert_eq!(next.node(&path).unwrap().title, "New");
        assert_eq!(next.node(&path).unwrap().folder_index, tree.next_folder_index());
        assert!(Arc::ptr_eq(&tree.roots()[0], &next.roots()[0]));
        assert!(next.check_invariants().is_ok());
    }

    #[test]
    fn test_delete_removes_subtree_and_renumbers() {
        let tree = sample_tree();
        let removed = tree.roots()[0].subtree_len();
        let next = tree.delete_at(&OutlinePath::from(vec![0])).unwrap();
        assert_eq!(next.len(), tree.len() - removed);
        assert_eq!(next.roots()[0].order, 1);
        assert!(next.check_invariants().is_ok());
    }

    #[test]
    fn test_folder_indices_never_reused_after_delete() {
        let (tree, _) = OutlineTree::new().insert_root(NodeDraft::new("A", ""));
        let (tree, _) = tree.insert_root(NodeDraft::new("B", ""));
        let b_index = tree.roots()[1].folder_index;
        let tree = tree.delete_at(&OutlinePath::from(vec![1])).unwrap();
        let (tree, path) = tree.insert_root(NodeDraft::new("C", ""));
        assert!(tree.node(&path).unwrap().folder_index > b_index);
    }

    #[test]
    fn test_update_changes_only_target() {
        let tree = sample_tree();
        let target = OutlinePath::from(vec![0, 1]);
        let next = tree.update_content(&target, "Renamed", "body").unwrap();

        assert_eq!(next.node(&target).unwrap().title, "Renamed");
        let sibling = OutlinePath::from(vec![0, 0]);
        assert!(Arc::ptr_eq(
            tree.get(&sibling).unwrap(),
            next.get(&sibling).unwrap()
        ));
        assert!(Arc::ptr_eq(&tree.roots()[1], &next.roots()[1]));
    }

    #[test]
    fn test_update_cannot_change_structure() {
        let tree = sample_tree();
        let path = OutlinePath::from(vec![0]);
        let original = tree.node(&path).unwrap().clone();
        let next = tree
            .update(&path, |node| {
                node.order = 99;
                node.folder_index = FolderIndex(999);
                node.children.clear();
                node.title = "Changed".to_string();
            })
            .unwrap();
        let node = next.node(&path).unwrap();
        assert_eq!(node.order, original.order);
        assert_eq!(node.folder_index, original.folder_index);
        assert_eq!(node.children.len(), original.children.len());
        assert_eq!(node.title, "Changed");
    }

    #[test]
    fn test_missing_paths_are_reported() {
        let tree = sample_tree();
        let missing = OutlinePath::from(vec![7, 0]);
        assert!(matches!(
            tree.delete_at(&missing),
            Err(SyllabusError::NodeNotFound(_))
        ));
        assert!(matches!(
            tree.move_sibling(&OutlinePath::from(vec![9]), Direction::Up),
            Err(SyllabusError::NodeNotFound(_))
        ));
        assert!(tree.update_content(&OutlinePath::root(), "x", "y").is_err());
    }

    #[test]
    fn test_sorted_is_identity_when_already_sorted() {
        let tree = sample_tree();
        assert!(tree.sorted().same_snapshot(&tree));
    }
}
