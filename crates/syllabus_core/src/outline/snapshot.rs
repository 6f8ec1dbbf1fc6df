//! Serializable form of an outline, as exchanged with storage.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::types::FolderIndex;

/// One lesson as stored, with its sublessons nested inline.
///
/// Field names follow the wire format the web front end already speaks
/// (`folderIndex`, `hasSublessons`, `sublessons`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct LessonSnapshot {
    /// Display title
    pub title: String,
    /// Markdown body
    #[serde(default)]
    pub content: String,
    /// Stored display order (not necessarily contiguous)
    #[serde(default)]
    pub order: u32,
    /// Stable identity
    pub folder_index: FolderIndex,
    /// Mirrors `!sublessons.is_empty()`
    #[serde(default)]
    pub has_sublessons: bool,
    /// Nested lessons
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sublessons: Vec<LessonSnapshot>,
}

impl LessonSnapshot {
    /// Leaf lesson
    pub fn new(folder_index: u32, order: u32, title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
            order,
            folder_index: FolderIndex(folder_index),
            has_sublessons: false,
            sublessons: Vec::new(),
        }
    }

    /// Builder: attach sublessons
    pub fn with_sublessons(mut self, sublessons: Vec<LessonSnapshot>) -> Self {
        self.has_sublessons = !sublessons.is_empty();
        self.sublessons = sublessons;
        self
    }
}
