//! `list` and `outline` commands

use syllabus_core::expansion::ExpansionStore;
use syllabus_core::flatten::{FlatRecord, FlatRecordView, Projection};
use syllabus_core::progress::ProgressRecord;
use syllabus_core::store::{CourseStore, ProgressStore};

use crate::cli::Stores;
use crate::cli::util::load_course;

/// Handle the list command
pub fn handle_list(stores: &Stores) -> bool {
    let courses = match stores.courses.list() {
        Ok(courses) => courses,
        Err(e) => {
            eprintln!("✗ Error listing courses: {}", e);
            return false;
        }
    };

    if courses.is_empty() {
        println!("No courses in {}", stores.courses.root().display());
        return true;
    }

    for course in courses {
        println!(
            "{}  {} ({}, {} chapters, {} lessons)",
            course.id, course.title, course.difficulty, course.chapter_count, course.lesson_count
        );
        if !course.description.is_empty() {
            println!("    {}", course.description);
        }
    }
    true
}

/// Handle the outline command
pub fn handle_outline(stores: &Stores, course_id: &str, all: bool, json: bool) -> bool {
    let Some(loaded) = load_course(stores, course_id) else {
        return false;
    };

    if json {
        let views: Vec<FlatRecordView> = loaded.projection.iter().map(|r| r.view()).collect();
        return match serde_json::to_string_pretty(&views) {
            Ok(text) => {
                println!("{}", text);
                true
            }
            Err(e) => {
                eprintln!("✗ {}", e);
                false
            }
        };
    }

    let progress = stores.progress.load(&loaded.course.id).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable progress for '{}': {}", course_id, e);
        ProgressRecord::new(&loaded.course.id)
    });

    println!("{}", loaded.course.title);
    if !loaded.course.subtitle.is_empty() {
        println!("{}", loaded.course.subtitle);
    }
    println!();
    for line in outline_lines(&loaded.projection, &progress, all) {
        println!("{}", line);
    }
    true
}

/// Lines of the outline: chapters only, or every lesson with `all`
fn outline_lines(projection: &Projection, progress: &ProgressRecord, all: bool) -> Vec<String> {
    let records: Vec<&FlatRecord> = if all {
        projection.iter().collect()
    } else {
        ExpansionStore::new().visible(projection)
    };
    records
        .into_iter()
        .map(|record| {
            let mark = if progress.is_completed(record.flat_index) {
                "✓"
            } else {
                " "
            };
            let folded = if !all && record.node.has_children() {
                format!(" (+{})", record.node.subtree_len() - 1)
            } else {
                String::new()
            };
            format!(
                "{} {}{} {}{}",
                mark,
                "  ".repeat(record.depth),
                record.display_number(),
                record.node.title,
                folded
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use syllabus_core::flatten::flatten;
    use syllabus_core::outline::{NodeDraft, OutlinePath, OutlineTree};

    fn projection() -> Projection {
        let (tree, _) = OutlineTree::new().insert_root(NodeDraft::new("Basics", "b"));
        let (tree, _) = tree
            .insert_child(&OutlinePath::from(vec![0]), NodeDraft::new("Variables", "v"))
            .unwrap();
        let (tree, _) = tree.insert_root(NodeDraft::new("Loops", "l"));
        flatten(&tree)
    }

    #[test]
    fn test_outline_lines_chapters_only() {
        let progress = ProgressRecord::new("c");
        let lines = outline_lines(&projection(), &progress, false);
        assert_eq!(lines, vec!["  1 Basics (+1)", "  2 Loops"]);
    }

    #[test]
    fn test_outline_lines_all_with_completion() {
        let mut progress = ProgressRecord::new("c");
        progress.set_completed(1, true, 3);
        let lines = outline_lines(&projection(), &progress, true);
        assert_eq!(lines, vec!["  1 Basics", "✓   1.1 Variables", "  2 Loops"]);
    }
}
