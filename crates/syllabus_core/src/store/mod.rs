//! Storage collaborators.
//!
//! The session only talks to storage through these traits. Folder-backed
//! implementations over [`FileSystem`](crate::fs::FileSystem) live in the
//! submodules.

mod attachments;
mod folder;
mod progress;

pub use attachments::FolderAttachmentStore;
pub use folder::{COURSE_TEMPLATE_DIR, FolderCourseStore};
pub use progress::FileProgressStore;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::attachment::{Attachment, AttachmentUpload};
use crate::error::Result;
use crate::outline::{FolderIndex, FolderPath, LessonSnapshot, OutlineTree};
use crate::progress::{Bookmark, ProgressRecord};

/// Course difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum Difficulty {
    /// No prior knowledge assumed
    Beginner,
    /// Some background expected
    #[default]
    Intermediate,
    /// For experienced learners
    Advanced,
}

impl Difficulty {
    /// Case-insensitive parse; unknown values fall back to `Intermediate`
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "beginner" => Difficulty::Beginner,
            "advanced" => Difficulty::Advanced,
            _ => Difficulty::Intermediate,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        };
        write!(f, "{}", name)
    }
}

/// A whole course as loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CourseSnapshot {
    /// Directory name
    pub id: String,
    /// Display title
    pub title: String,
    /// Short tagline
    #[serde(default)]
    pub subtitle: String,
    /// Longer description
    #[serde(default)]
    pub description: String,
    /// Author name
    #[serde(default)]
    pub author: String,
    /// Difficulty level
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Estimated time to finish
    #[serde(default)]
    pub estimated_hours: u32,
    /// Tags followed by primary and secondary categories
    #[serde(default)]
    pub tags: Vec<String>,
    /// Date of the last revision
    #[serde(default)]
    pub last_updated: Option<NaiveDate>,
    /// Chapters in order
    pub lessons: Vec<LessonSnapshot>,
}

impl CourseSnapshot {
    /// Build the outline tree for this course
    pub fn outline(&self) -> Result<OutlineTree> {
        OutlineTree::from_snapshot(&self.lessons)
    }
}

/// One row of a course listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CourseSummary {
    /// Directory name
    pub id: String,
    /// Display title
    pub title: String,
    /// Longer description
    pub description: String,
    /// Difficulty level
    pub difficulty: Difficulty,
    /// Number of chapters
    pub chapter_count: usize,
    /// Chapters and all nested lessons
    pub lesson_count: usize,
}

/// Course content persistence
pub trait CourseStore {
    /// All readable courses, in directory order
    fn list(&self) -> Result<Vec<CourseSummary>>;

    /// Load one course with folder indices assigned
    fn load(&self, course_id: &str) -> Result<CourseSnapshot>;

    /// Replace the markdown body of one lesson
    fn save_content(&self, course_id: &str, folder_path: &FolderPath, content: &str) -> Result<()>;

    /// Write the whole outline (explicit save)
    fn save_outline(&self, course_id: &str, tree: &OutlineTree) -> Result<()>;
}

/// Chapter attachments
pub trait AttachmentStore {
    /// Attachments of one chapter
    fn list(&self, course_id: &str, chapter: FolderIndex) -> Result<Vec<Attachment>>;

    /// Validate and store one file
    fn upload(
        &self,
        course_id: &str,
        chapter: FolderIndex,
        upload: AttachmentUpload,
    ) -> Result<Attachment>;

    /// Remove an attachment and its file
    fn delete(&self, course_id: &str, attachment_id: &str) -> Result<()>;
}

/// Learner progress
pub trait ProgressStore {
    /// Stored record, or a fresh one if the course was never opened
    fn load(&self, course_id: &str) -> Result<ProgressRecord>;

    /// Remember the last visited lesson
    fn set_current_lesson(&self, course_id: &str, flat_index: usize) -> Result<()>;

    /// Mark or unmark a lesson; `total` is the live projection length
    fn set_completed(
        &self,
        course_id: &str,
        flat_index: usize,
        completed: bool,
        total: usize,
    ) -> Result<ProgressRecord>;

    /// Add a bookmark or update its note
    fn add_bookmark(&self, course_id: &str, lesson_index: usize, note: &str) -> Result<Bookmark>;

    /// Returns whether a bookmark existed
    fn remove_bookmark(&self, course_id: &str, lesson_index: usize) -> Result<bool>;

    /// Bookmarks in insertion order
    fn list_bookmarks(&self, course_id: &str) -> Result<Vec<Bookmark>> {
        Ok(self.load(course_id)?.bookmarks)
    }
}
