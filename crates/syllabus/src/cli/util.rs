//! Shared CLI utilities

use syllabus_core::flatten::{Projection, flatten};
use syllabus_core::outline::{FolderIndex, OutlinePath, OutlineTree};
use syllabus_core::store::{CourseSnapshot, CourseStore};

use crate::cli::Stores;

/// A loaded course with its tree and projection
pub struct LoadedCourse {
    pub course: CourseSnapshot,
    pub tree: OutlineTree,
    pub projection: Projection,
}

/// Load a course, printing the error if that fails
pub fn load_course(stores: &Stores, course_id: &str) -> Option<LoadedCourse> {
    let course = match stores.courses.load(course_id) {
        Ok(course) => course,
        Err(e) => {
            eprintln!("✗ {}", e);
            eprintln!("  Run 'syllabus list' to see available courses");
            return None;
        }
    };
    let tree = match course.outline() {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("✗ Invalid outline in '{}': {}", course_id, e);
            return None;
        }
    };
    let projection = flatten(&tree);
    Some(LoadedCourse {
        course,
        tree,
        projection,
    })
}

/// Parse a 1-based dotted lesson number (`2.1`) into an outline path
pub fn parse_lesson_number(number: &str) -> Option<OutlinePath> {
    let segments = number
        .trim()
        .split('.')
        .map(|part| part.parse::<usize>().ok()?.checked_sub(1))
        .collect::<Option<Vec<usize>>>()?;
    if segments.is_empty() {
        return None;
    }
    Some(OutlinePath::from(segments))
}

/// Flat index of the lesson with `number`, printing an error if there is none
pub fn resolve_lesson(projection: &Projection, number: &str) -> Option<usize> {
    let found = parse_lesson_number(number).and_then(|path| projection.position_of_path(&path));
    if found.is_none() {
        eprintln!("✗ No lesson numbered '{}'", number);
        eprintln!("  Run 'syllabus outline <course> --all' to see lesson numbers");
    }
    found
}

/// Folder index of the chapter with 1-based `number`
pub fn chapter_folder_index(tree: &OutlineTree, number: usize) -> Option<FolderIndex> {
    let found = number
        .checked_sub(1)
        .and_then(|i| tree.roots().get(i))
        .map(|chapter| chapter.folder_index);
    if found.is_none() {
        eprintln!(
            "✗ No chapter {} (course has {})",
            number,
            tree.roots().len()
        );
    }
    found
}

/// Human-readable byte size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
