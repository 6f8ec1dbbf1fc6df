//! Learner progress and bookmarks.
//!
//! Every index here is a flat index into the projection that was current when
//! it was recorded. Structural edits do not rewrite them: after a chapter is
//! deleted or moved, a stored index may name a different lesson or point past
//! the end. `ProgressView` resolves indices against the live projection and
//! reports the latter case as `ResolvedIndex::Dangling`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::flatten::{FlatRecord, Projection};

/// A bookmark on one lesson
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Bookmark {
    /// Flat index of the bookmarked lesson
    pub lesson_index: usize,
    /// Free-form note
    #[serde(default)]
    pub note: String,
    /// When the bookmark was first added
    pub created_at: DateTime<Utc>,
}

/// Progress of one learner through one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ProgressRecord {
    /// Course this record belongs to
    pub course_id: String,
    /// Flat index the learner was last on
    #[serde(default)]
    pub current_lesson_index: usize,
    /// Sorted, no duplicates
    #[serde(default)]
    pub completed_lessons: Vec<usize>,
    /// Percentage, 0..=100
    #[serde(default)]
    pub progress: u8,
    /// When the course was first opened
    pub started_at: DateTime<Utc>,
    /// Last change to the record
    pub updated_at: DateTime<Utc>,
    /// Set once every lesson is completed
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// One entry per lesson at most
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

impl ProgressRecord {
    /// Fresh record with nothing completed
    pub fn new(course_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            course_id: course_id.into(),
            current_lesson_index: 0,
            completed_lessons: Vec::new(),
            progress: 0,
            started_at: now,
            updated_at: now,
            completed_at: None,
            bookmarks: Vec::new(),
        }
    }

    /// Remember where the learner is
    pub fn set_current_lesson(&mut self, flat_index: usize) {
        self.current_lesson_index = flat_index;
        self.updated_at = Utc::now();
    }

    /// Mark or unmark a lesson, then recompute the percentage against `total`.
    pub fn set_completed(&mut self, flat_index: usize, completed: bool, total: usize) {
        match self.completed_lessons.binary_search(&flat_index) {
            Ok(position) if !completed => {
                self.completed_lessons.remove(position);
            }
            Err(position) if completed => self.completed_lessons.insert(position, flat_index),
            _ => {}
        }
        self.update_progress(percent(self.completed_lessons.len(), total));
    }

    /// Set the percentage. Reaching 100 stamps `completed_at` the first time.
    pub fn update_progress(&mut self, progress: u8) {
        let now = Utc::now();
        self.progress = progress.min(100);
        self.updated_at = now;
        if self.progress == 100 && self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
    }

    /// Whether the lesson at `flat_index` is done
    pub fn is_completed(&self, flat_index: usize) -> bool {
        self.completed_lessons.binary_search(&flat_index).is_ok()
    }

    /// Add a bookmark, or replace the note of the existing one
    pub fn add_bookmark(&mut self, lesson_index: usize, note: impl Into<String>) -> &Bookmark {
        let note = note.into();
        let position = match self
            .bookmarks
            .binary_search_by_key(&lesson_index, |b| b.lesson_index)
        {
            Ok(position) => {
                self.bookmarks[position].note = note;
                position
            }
            Err(position) => {
                self.bookmarks.insert(
                    position,
                    Bookmark {
                        lesson_index,
                        note,
                        created_at: Utc::now(),
                    },
                );
                position
            }
        };
        &self.bookmarks[position]
    }

    /// Returns whether a bookmark was removed
    pub fn remove_bookmark(&mut self, lesson_index: usize) -> bool {
        let before = self.bookmarks.len();
        self.bookmarks.retain(|b| b.lesson_index != lesson_index);
        self.bookmarks.len() != before
    }

    /// Bookmark on a lesson, if any
    pub fn bookmark(&self, lesson_index: usize) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|b| b.lesson_index == lesson_index)
    }
}

/// `round(done * 100 / total)`, clamped to 100; 0 for an empty course
pub fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let value = (done as f64 * 100.0 / total as f64).round();
    value.min(100.0) as u8
}

/// A stored flat index looked up in the live projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedIndex<'a> {
    /// Index still points at a lesson
    Lesson(&'a FlatRecord),
    /// Past the end of the projection
    Dangling(usize),
}

/// Read-only interpretation of a progress record against a projection.
pub struct ProgressView<'a> {
    record: &'a ProgressRecord,
    projection: &'a Projection,
}

impl<'a> ProgressView<'a> {
    /// Pair a record with the projection it indexes
    pub fn new(record: &'a ProgressRecord, projection: &'a Projection) -> Self {
        Self { record, projection }
    }

    fn resolve(&self, index: usize) -> ResolvedIndex<'a> {
        match self.projection.get(index) {
            Some(record) => ResolvedIndex::Lesson(record),
            None => ResolvedIndex::Dangling(index),
        }
    }

    /// Lesson the learner was last on
    pub fn current(&self) -> ResolvedIndex<'a> {
        self.resolve(self.record.current_lesson_index)
    }

    /// Whether the lesson at `flat_index` is done
    pub fn is_completed(&self, flat_index: usize) -> bool {
        self.record.is_completed(flat_index)
    }

    /// Completed indices resolved against the projection
    pub fn completed(&self) -> Vec<ResolvedIndex<'a>> {
        self.record
            .completed_lessons
            .iter()
            .map(|&i| self.resolve(i))
            .collect()
    }

    /// Bookmarks with their resolved lessons
    pub fn bookmarks(&self) -> Vec<(&'a Bookmark, ResolvedIndex<'a>)> {
        self.record
            .bookmarks
            .iter()
            .map(|b| (b, self.resolve(b.lesson_index)))
            .collect()
    }

    /// Percentage recomputed against the live projection length
    pub fn live_percent(&self) -> u8 {
        let in_range = self
            .record
            .completed_lessons
            .iter()
            .filter(|&&i| i < self.projection.len())
            .count();
        percent(in_range, self.projection.len())
    }
}
