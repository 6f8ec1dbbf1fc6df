#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Chapter attachments (upload validation, fetch tickets)
pub mod attachment;

/// Configuration options
pub mod config;

/// Navigation cursor over the flattened outline
pub mod cursor;

/// Error (common error types)
pub mod error;

/// Which chapters are expanded
pub mod expansion;

/// Pre-order projection of the outline tree
pub mod flatten;

/// Filesystem abstraction
pub mod fs;

/// User-facing notices
pub mod notice;

/// The outline tree and its path-addressed edits
pub mod outline;

/// Learner progress and bookmarks
pub mod progress;

/// Editing session (state machine over one course)
pub mod session;

/// Storage seams and their folder-backed implementations
pub mod store;

#[cfg(test)]
pub mod test_utils;
