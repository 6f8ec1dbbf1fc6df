//! Contiguous ordering within a sibling group.
//!
//! Every structural edit touches exactly one sibling group; these helpers
//! restore `order == position + 1` for that group and nothing else.

use std::sync::Arc;

use super::types::Node;

/// Rewrite `order` to `1..=N` for one sibling group.
///
/// Nodes already at the right order keep their `Arc` identity, so untouched
/// siblings stay shared with the previous tree.
pub fn renumber(group: &mut [Arc<Node>]) {
    for (position, node) in group.iter_mut().enumerate() {
        let expected = position as u32 + 1;
        if node.order != expected {
            Arc::make_mut(node).order = expected;
        }
    }
}

/// Whether a group's orders are exactly `1..=N`
pub fn is_contiguous(group: &[Arc<Node>]) -> bool {
    group
        .iter()
        .enumerate()
        .all(|(position, node)| node.order == position as u32 + 1)
}

/// Stable sort of one group by `order`; returns whether anything moved.
pub fn sort_group(group: &mut [Arc<Node>]) -> bool {
    if group.windows(2).all(|w| w[0].order <= w[1].order) {
        return false;
    }
    group.sort_by_key(|node| node.order);
    true
}
