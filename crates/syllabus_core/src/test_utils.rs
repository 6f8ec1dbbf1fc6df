//! Test utilities for syllabus_core
//!
//! Shared fixtures: a small sample outline, position sinks that record or
//! fail, a course store that always fails, and an in-memory course folder.

use std::io;

use crate::cursor::PositionSink;
use crate::error::{Result, SyllabusError};
use crate::fs::InMemoryFileSystem;
use crate::outline::{FolderPath, LessonSnapshot, OutlineTree};
use crate::store::{CourseSnapshot, CourseStore, CourseSummary};

/// Seven lessons over three chapters, folder indices 0..=6 in pre-order:
///
/// ```text
/// 1     Getting Started
/// 1.1     Install
/// 1.1.1     Toolchain
/// 1.2     Hello World
/// 2     Ownership
/// 2.1     Borrowing
/// 3     Wrap Up
/// ```
pub fn sample_lessons() -> Vec<LessonSnapshot> {
    vec![
        LessonSnapshot::new(0, 1, "Getting Started", "Welcome aboard.").with_sublessons(vec![
            LessonSnapshot::new(1, 1, "Install", "Install the toolchain.").with_sublessons(
                vec![LessonSnapshot::new(2, 1, "Toolchain", "rustup, cargo.")],
            ),
            LessonSnapshot::new(3, 2, "Hello World", "fn main() {}"),
        ]),
        LessonSnapshot::new(4, 2, "Ownership", "Moves and copies.")
            .with_sublessons(vec![LessonSnapshot::new(5, 1, "Borrowing", "& and &mut.")]),
        LessonSnapshot::new(6, 3, "Wrap Up", "That's it."),
    ]
}

/// [`sample_lessons`] as a tree
pub fn sample_tree() -> OutlineTree {
    OutlineTree::from_snapshot(&sample_lessons()).unwrap()
}

/// Remembers every persisted position.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub positions: Vec<usize>,
}

impl PositionSink for RecordingSink {
    fn persist_position(&mut self, flat_index: usize) -> Result<()> {
        self.positions.push(flat_index);
        Ok(())
    }
}

/// Sink whose writes always fail
#[derive(Debug, Default)]
pub struct FailingSink;

impl PositionSink for FailingSink {
    fn persist_position(&mut self, _flat_index: usize) -> Result<()> {
        Err(disk_full())
    }
}

/// Course store whose every call fails
#[derive(Debug, Default)]
pub struct FailingCourseStore;

impl CourseStore for FailingCourseStore {
    fn list(&self) -> Result<Vec<CourseSummary>> {
        Err(disk_full())
    }

    fn load(&self, course_id: &str) -> Result<CourseSnapshot> {
        Err(SyllabusError::CourseNotFound(course_id.to_string()))
    }

    fn save_content(&self, _: &str, _: &FolderPath, _: &str) -> Result<()> {
        Err(disk_full())
    }

    fn save_outline(&self, _: &str, _: &OutlineTree) -> Result<()> {
        Err(disk_full())
    }
}

fn disk_full() -> SyllabusError {
    SyllabusError::Io(io::Error::other("disk full"))
}

/// A `courses/` folder with one real course, the template, a placeholder-id
/// course and one with a corrupt `course.json`.
///
/// Only the first chapter of `rust` stores a `folder_index` (10).
pub fn sample_course_fs() -> InMemoryFileSystem {
    InMemoryFileSystem::with_files(vec![
        (
            "courses/rust/course.json",
            r#"{"id":"rust-basics","title":"Rust Basics","author":{"name":"Ferris"},"metadata":{"difficulty":"Beginner","estimated_hours":6,"last_updated":"2025-03-01"},"tags":["rust"],"categories":{"primary":"programming","secondary":["systems"]}}"#,
        ),
        (
            "courses/rust/lessons/01-getting-started/lesson.json",
            r#"{"title":"Getting Started","order":1,"folder_index":10,"has_quiz":true}"#,
        ),
        (
            "courses/rust/lessons/01-getting-started/content.md",
            "Welcome aboard.",
        ),
        (
            "courses/rust/lessons/01-getting-started/quiz.json",
            r#"{"questions":[]}"#,
        ),
        (
            "courses/rust/lessons/01-getting-started/sublessons/01-install/lesson.json",
            r#"{"title":"Install"}"#,
        ),
        (
            "courses/rust/lessons/01-getting-started/sublessons/01-install/content.md",
            "Install the toolchain.",
        ),
        (
            "courses/rust/lessons/01-getting-started/sublessons/01-install/sublessons/01-toolchain/lesson.json",
            r#"{"title":"Toolchain"}"#,
        ),
        (
            "courses/rust/lessons/01-getting-started/sublessons/01-install/sublessons/01-toolchain/content.md",
            "rustup, cargo.",
        ),
        (
            "courses/rust/lessons/01-getting-started/sublessons/02-hello-world/lesson.json",
            r#"{"title":"Hello World"}"#,
        ),
        (
            "courses/rust/lessons/01-getting-started/sublessons/02-hello-world/content.md",
            "fn main() {}",
        ),
        ("courses/rust/lessons/02-ownership/content.md", "Moves and copies."),
        (
            "courses/rust/lessons/02-ownership/sublessons/01-borrowing/lesson.json",
            r#"{"title":"Borrowing"}"#,
        ),
        (
            "courses/rust/lessons/02-ownership/sublessons/01-borrowing/content.md",
            "& and &mut.",
        ),
        (
            "courses/rust/lessons/03-wrap-up/lesson.json",
            r#"{"title":"Wrap Up","order":3}"#,
        ),
        (
            "courses/COURSE-TEMPLATE/course.json",
            r#"{"id":"template","title":"Template"}"#,
        ),
        (
            "courses/untitled/course.json",
            r#"{"id":"GENERATE-UUID","title":"Untitled Course"}"#,
        ),
        ("courses/broken/course.json", "{not json"),
    ])
}
