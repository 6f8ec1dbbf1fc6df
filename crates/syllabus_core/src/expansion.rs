//! Which chapters are expanded in the outline view.
//!
//! Keys are folder paths, so expansion survives reordering of siblings.

use std::collections::BTreeSet;

use crate::flatten::{FlatRecord, Projection};
use crate::outline::FolderPath;

/// Set of expanded node keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionStore {
    expanded: BTreeSet<FolderPath>,
}

impl ExpansionStore {
    /// Nothing expanded
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is expanded
    pub fn is_expanded(&self, key: &FolderPath) -> bool {
        self.expanded.contains(key)
    }

    /// Chapters are always visible; deeper records need every ancestor expanded.
    pub fn is_visible(&self, record: &FlatRecord) -> bool {
        record.depth == 0
            || record
                .folder_path
                .ancestors()
                .all(|ancestor| self.expanded.contains(&ancestor))
    }

    /// Flip exactly one key. Returns the new state of that key.
    pub fn toggle(&mut self, key: &FolderPath) -> bool {
        if self.expanded.remove(key) {
            false
        } else {
            self.expanded.insert(key.clone());
            true
        }
    }

    /// Expand every ancestor of the record at `flat_index`.
    ///
    /// Never collapses anything. Returns whether a key was added.
    pub fn auto_expand_ancestors(&mut self, projection: &Projection, flat_index: usize) -> bool {
        let Some(record) = projection.get(flat_index) else {
            return false;
        };
        let mut changed = false;
        for ancestor in record.folder_path.ancestors() {
            changed |= self.expanded.insert(ancestor);
        }
        changed
    }

    /// Records that should be drawn, in flat order
    pub fn visible<'a>(&self, projection: &'a Projection) -> Vec<&'a FlatRecord> {
        projection.iter().filter(|r| self.is_visible(r)).collect()
    }

    /// Drop keys whose nodes no longer exist
    pub fn retain_existing(&mut self, projection: &Projection) {
        self.expanded
            .retain(|key| projection.position_of_folder_path(key).is_some());
    }

    /// Number of expanded keys
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// True when every node is collapsed
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::flatten;
    use crate::test_utils::sample_tree;

    #[test]
    fn test_chapters_visible_regardless_of_state() {
        let projection = flatten(&sample_tree());
        let store = ExpansionStore::new();
        let visible: Vec<&str> = store
            .visible(&projection)
            .iter()
            .map(|r| r.node.title.as_str())
            .collect();
        assert_eq!(visible, vec!["Getting Started", "Ownership", "Wrap Up"]);
    }

    #[test]
    fn test_toggle_does_not_cascade() {
        let projection = flatten(&sample_tree());
        let mut store = ExpansionStore::new();
        let chapter = projection.get(0).unwrap().folder_path.clone();
        let install = projection.get(1).unwrap().folder_path.clone();

        assert!(store.toggle(&chapter));
        assert!(store.toggle(&install));
        assert_eq!(store.visible(&projection).len(), projection.len());

        assert!(!store.toggle(&chapter));
        assert!(store.is_expanded(&install));
        // toolchain is hidden because its grandparent is collapsed
        assert!(!store.is_visible(projection.get(2).unwrap()));
    }

    #[test]
    fn test_auto_expand_is_idempotent_and_additive() {
        let projection = flatten(&sample_tree());
        let mut store = ExpansionStore::new();

        assert!(store.auto_expand_ancestors(&projection, 2));
        assert!(store.is_visible(projection.get(2).unwrap()));
        assert_eq!(store.len(), 2);
        assert!(!store.auto_expand_ancestors(&projection, 2));
        assert!(!store.auto_expand_ancestors(&projection, 0));
        assert!(!store.auto_expand_ancestors(&projection, 99));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_retain_existing_forgets_deleted_nodes() {
        let tree = sample_tree();
        let projection = flatten(&tree);
        let mut store = ExpansionStore::new();
        store.auto_expand_ancestors(&projection, 2);

        let tree = tree
            .delete_at(&crate::outline::OutlinePath::from(vec![0]))
            .unwrap();
        store.retain_existing(&flatten(&tree));
        assert!(store.is_empty());
    }
}
