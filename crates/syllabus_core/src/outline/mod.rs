//! The depth-bounded lesson outline and its path-addressed edits.

mod mutate;
mod renumber;
mod snapshot;
mod tree;
mod types;

pub use renumber::{is_contiguous, renumber};
pub use snapshot::LessonSnapshot;
pub use tree::OutlineTree;
pub use types::{Direction, FolderIndex, FolderPath, MAX_DEPTH, Node, NodeDraft, OutlinePath};
