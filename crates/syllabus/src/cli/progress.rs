//! `progress`, `complete` and `bookmark` commands

use syllabus_core::flatten::Projection;
use syllabus_core::progress::{ProgressView, ResolvedIndex};
use syllabus_core::store::ProgressStore;

use crate::cli::Stores;
use crate::cli::args::BookmarkCommands;
use crate::cli::util::{load_course, resolve_lesson};

/// "1.2 Hello World", or a marker for an index past the end
fn describe(resolved: ResolvedIndex<'_>) -> String {
    match resolved {
        ResolvedIndex::Lesson(record) => {
            format!("{} {}", record.display_number(), record.node.title)
        }
        ResolvedIndex::Dangling(index) => format!("(lesson #{} no longer exists)", index + 1),
    }
}

fn label(projection: &Projection, flat_index: usize) -> String {
    describe(match projection.get(flat_index) {
        Some(record) => ResolvedIndex::Lesson(record),
        None => ResolvedIndex::Dangling(flat_index),
    })
}

/// Handle the progress command
pub fn handle_progress(stores: &Stores, course_id: &str) -> bool {
    let Some(loaded) = load_course(stores, course_id) else {
        return false;
    };
    let record = match stores.progress.load(&loaded.course.id) {
        Ok(record) => record,
        Err(e) => {
            eprintln!("✗ Error reading progress: {}", e);
            return false;
        }
    };
    let view = ProgressView::new(&record, &loaded.projection);

    println!("{}", loaded.course.title);
    println!(
        "Progress: {}% ({} of {} lessons)",
        view.live_percent(),
        record.completed_lessons.len(),
        loaded.projection.len()
    );
    println!("Current lesson: {}", describe(view.current()));
    println!(
        "Started: {}",
        record.started_at.with_timezone(&chrono::Local).format("%Y-%m-%d")
    );
    if let Some(done) = record.completed_at {
        println!(
            "Completed: {}",
            done.with_timezone(&chrono::Local).format("%Y-%m-%d")
        );
    }

    let completed = view.completed();
    if !completed.is_empty() {
        println!();
        println!("Completed lessons:");
        for resolved in completed {
            println!("  ✓ {}", describe(resolved));
        }
    }

    let bookmarks = view.bookmarks();
    if !bookmarks.is_empty() {
        println!();
        println!("Bookmarks:");
        for (bookmark, resolved) in bookmarks {
            if bookmark.note.is_empty() {
                println!("  ★ {}", describe(resolved));
            } else {
                println!("  ★ {} - {}", describe(resolved), bookmark.note);
            }
        }
    }
    true
}

/// Handle the complete command
pub fn handle_complete(stores: &Stores, course_id: &str, lesson: &str, undo: bool) -> bool {
    let Some(loaded) = load_course(stores, course_id) else {
        return false;
    };
    let Some(flat_index) = resolve_lesson(&loaded.projection, lesson) else {
        return false;
    };

    match stores.progress.set_completed(
        &loaded.course.id,
        flat_index,
        !undo,
        loaded.projection.len(),
    ) {
        Ok(record) => {
            let verb = if undo { "Unmarked" } else { "Completed" };
            println!(
                "✓ {} {} ({}%)",
                verb,
                label(&loaded.projection, flat_index),
                record.progress
            );
            if record.progress == 100 && !undo {
                println!("  Course finished!");
            }
            true
        }
        Err(e) => {
            eprintln!("✗ Error saving progress: {}", e);
            false
        }
    }
}

/// Handle bookmark subcommands
pub fn handle_bookmark_command(stores: &Stores, command: BookmarkCommands) -> bool {
    match command {
        BookmarkCommands::Add {
            course,
            lesson,
            note,
        } => {
            let Some(loaded) = load_course(stores, &course) else {
                return false;
            };
            let Some(flat_index) = resolve_lesson(&loaded.projection, &lesson) else {
                return false;
            };
            match stores
                .progress
                .add_bookmark(&loaded.course.id, flat_index, &note)
            {
                Ok(_) => {
                    println!("✓ Bookmarked {}", label(&loaded.projection, flat_index));
                    true
                }
                Err(e) => {
                    eprintln!("✗ Error saving bookmark: {}", e);
                    false
                }
            }
        }

        BookmarkCommands::Remove { course, lesson } => {
            let Some(loaded) = load_course(stores, &course) else {
                return false;
            };
            let Some(flat_index) = resolve_lesson(&loaded.projection, &lesson) else {
                return false;
            };
            match stores.progress.remove_bookmark(&loaded.course.id, flat_index) {
                Ok(true) => {
                    println!("✓ Removed bookmark on {}", label(&loaded.projection, flat_index));
                    true
                }
                Ok(false) => {
                    println!("No bookmark on {}", label(&loaded.projection, flat_index));
                    true
                }
                Err(e) => {
                    eprintln!("✗ Error removing bookmark: {}", e);
                    false
                }
            }
        }

        BookmarkCommands::List { course } => {
            let Some(loaded) = load_course(stores, &course) else {
                return false;
            };
            let bookmarks = match stores.progress.list_bookmarks(&loaded.course.id) {
                Ok(bookmarks) => bookmarks,
                Err(e) => {
                    eprintln!("✗ Error reading bookmarks: {}", e);
                    return false;
                }
            };
            if bookmarks.is_empty() {
                println!("No bookmarks in '{}'", loaded.course.id);
            }
            for bookmark in bookmarks {
                let created = bookmark
                    .created_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M");
                println!(
                    "{}  {}  {}",
                    created,
                    label(&loaded.projection, bookmark.lesson_index),
                    bookmark.note
                );
            }
            true
        }
    }
}
