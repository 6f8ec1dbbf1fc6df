//! Linear projection of an outline.
//!
//! The projection is recomputed from scratch after every change; a flat index
//! is only meaningful against the projection it came from.

use std::sync::Arc;

use serde::Serialize;
use ts_rs::TS;

use crate::outline::{FolderPath, Node, OutlinePath, OutlineTree};

/// One node in depth-first pre-order position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    /// Shared handle to the node itself
    pub node: Arc<Node>,
    /// 0 for chapters
    pub depth: usize,
    /// Flat index of the parent record, `None` for chapters
    pub parent_flat_index: Option<usize>,
    /// Position in the projection
    pub flat_index: usize,
    /// Structural position in the tree the projection was built from
    pub path: OutlinePath,
    /// Storage address, stable under re-sorting
    pub folder_path: FolderPath,
}

impl FlatRecord {
    /// 1-based dotted number shown next to the title
    pub fn display_number(&self) -> String {
        self.path.display_number()
    }

    /// Serializable summary for front ends
    pub fn view(&self) -> FlatRecordView {
        FlatRecordView {
            flat_index: self.flat_index,
            depth: self.depth,
            parent_flat_index: self.parent_flat_index,
            path: self.path.as_slice().to_vec(),
            folder_path: self.folder_path.clone(),
            display_number: self.display_number(),
            title: self.node.title.clone(),
            has_children: self.node.has_children(),
        }
    }
}

/// What a front end needs to draw one outline row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct FlatRecordView {
    /// Position in the projection
    pub flat_index: usize,
    /// 0 for chapters
    pub depth: usize,
    /// Flat index of the parent row
    pub parent_flat_index: Option<usize>,
    /// Positional path from the root
    pub path: Vec<usize>,
    /// Stable folder path
    pub folder_path: FolderPath,
    /// Dotted number, e.g. `2.1`
    pub display_number: String,
    /// Lesson title
    pub title: String,
    /// Whether the row can be expanded
    pub has_children: bool,
}

/// Ordered list of flat records for one tree value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    records: Vec<FlatRecord>,
}

impl Projection {
    /// Record at `flat_index`
    pub fn get(&self, flat_index: usize) -> Option<&FlatRecord> {
        self.records.get(flat_index)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the projection is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in flat order
    pub fn iter(&self) -> impl Iterator<Item = &FlatRecord> {
        self.records.iter()
    }

    /// Flat indices of the strict ancestors of `flat_index`, outermost first
    pub fn ancestors(&self, flat_index: usize) -> Vec<usize> {
        let mut chain = Vec::new();
        let mut current = self.get(flat_index).and_then(|r| r.parent_flat_index);
        while let Some(index) = current {
            chain.push(index);
            current = self.records[index].parent_flat_index;
        }
        chain.reverse();
        chain
    }

    /// Flat index of the record at `path`
    pub fn position_of_path(&self, path: &OutlinePath) -> Option<usize> {
        self.records.iter().position(|r| &r.path == path)
    }

    /// Flat index of the record with `folder_path`
    pub fn position_of_folder_path(&self, folder_path: &FolderPath) -> Option<usize> {
        self.records
            .iter()
            .position(|r| &r.folder_path == folder_path)
    }

    /// Dotted display number of a record
    pub fn display_number(&self, record: &FlatRecord) -> String {
        record.display_number()
    }
}

struct Pending<'a> {
    node: &'a Arc<Node>,
    depth: usize,
    parent_flat_index: Option<usize>,
    path: OutlinePath,
    folder_path: FolderPath,
}

/// Project `tree` into depth-first pre-order.
///
/// Uses an explicit stack; children are pushed in reverse so they pop in
/// order.
pub fn flatten(tree: &OutlineTree) -> Projection {
    let mut records = Vec::with_capacity(tree.len());
    let mut stack: Vec<Pending<'_>> = tree
        .roots()
        .iter()
        .enumerate()
        .rev()
        .map(|(position, node)| Pending {
            node,
            depth: 0,
            parent_flat_index: None,
            path: OutlinePath::from(vec![position]),
            folder_path: FolderPath::from(vec![node.folder_index]),
        })
        .collect();

    while let Some(pending) = stack.pop() {
        let flat_index = records.len();
        for (position, child) in pending.node.children.iter().enumerate().rev() {
            stack.push(Pending {
                node: child,
                depth: pending.depth + 1,
                parent_flat_index: Some(flat_index),
                path: pending.path.child(position),
                folder_path: pending.folder_path.child(child.folder_index),
            });
        }
        records.push(FlatRecord {
            node: Arc::clone(pending.node),
            depth: pending.depth,
            parent_flat_index: pending.parent_flat_index,
            flat_index,
            path: pending.path,
            folder_path: pending.folder_path,
        });
    }

    Projection { records }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::{Direction, NodeDraft};
    use crate::test_utils::sample_tree;

    fn titles(projection: &Projection) -> Vec<&str> {
        projection.iter().map(|r| r.node.title.as_str()).collect()
    }

    #[test]
    fn test_flatten_is_preorder() {
        let projection = flatten(&sample_tree());
        assert_eq!(
            titles(&projection),
            vec![
                "Getting Started",
                "Install",
                "Toolchain",
                "Hello World",
                "Ownership",
                "Borrowing",
                "Wrap Up"
            ]
        );
        let toolchain = projection.get(2).unwrap();
        assert_eq!(toolchain.depth, 2);
        assert_eq!(toolchain.parent_flat_index, Some(1));
        assert_eq!(toolchain.display_number(), "1.1.1");
        assert_eq!(projection.ancestors(2), vec![0, 1]);
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let tree = sample_tree().sorted();
        assert_eq!(flatten(&tree), flatten(&tree));
    }

    #[test]
    fn test_add_subchapter_grows_projection_by_one() {
        let (tree, _) = OutlineTree::new().insert_root(NodeDraft::new("A", "a"));
        let (tree, _) = tree.insert_root(NodeDraft::new("B", "b"));
        let before = flatten(&tree);

        let (tree, _) = tree
            .insert_child(&OutlinePath::from(vec![0]), NodeDraft::new("Intro", "i"))
            .unwrap();
        let after = flatten(&tree);

        assert_eq!(after.len(), before.len() + 1);
        let intro = after.iter().find(|r| r.node.title == "Intro").unwrap();
        assert_eq!(intro.depth, 1);
        let a = after.iter().find(|r| r.node.title == "A").unwrap();
        assert_eq!(intro.parent_flat_index, Some(a.flat_index));
    }

    #[test]
    fn test_delete_chapter_removes_its_records() {
        let (tree, _) = OutlineTree::new().insert_root(NodeDraft::new("A", ""));
        let (tree, _) = tree.insert_root(NodeDraft::new("B", ""));
        let a = OutlinePath::from(vec![0]);
        let (tree, _) = tree.insert_child(&a, NodeDraft::new("A.1", "")).unwrap();
        let (tree, _) = tree.insert_child(&a, NodeDraft::new("A.2", "")).unwrap();
        let before = flatten(&tree);

        let tree = tree.delete_at(&a).unwrap();
        let after = flatten(&tree);

        assert_eq!(before.len() - after.len(), 3);
        assert_eq!(tree.roots()[0].title, "B");
        assert_eq!(tree.roots()[0].order, 1);
    }

    #[test]
    fn test_folder_path_survives_reordering_but_path_does_not() {
        let tree = sample_tree();
        let before = flatten(&tree);
        let ownership = before
            .iter()
            .find(|r| r.node.title == "Ownership")
            .unwrap()
            .clone();

        let moved = tree
            .move_sibling(&ownership.path, Direction::Up)
            .unwrap();
        let after = flatten(&moved);
        let again = after
            .iter()
            .find(|r| r.node.title == "Ownership")
            .unwrap();

        assert_eq!(again.folder_path, ownership.folder_path);
        assert_ne!(again.path, ownership.path);
        assert_eq!(
            after.position_of_folder_path(&ownership.folder_path),
            Some(again.flat_index)
        );
    }

    #[test]
    fn test_view_serializes_camel_case() {
        let projection = flatten(&sample_tree());
        let json = serde_json::to_value(projection.get(1).unwrap().view()).unwrap();
        assert_eq!(json["displayNumber"], "1.1");
        assert_eq!(json["parentFlatIndex"], 0);
        assert_eq!(json["hasChildren"], true);
    }
}
