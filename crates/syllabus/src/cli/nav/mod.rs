//! Browse and edit a course outline with an interactive TUI
//!
//! The outline pane shows chapters with their sublessons folded away until
//! expanded; the preview pane shows the selected lesson and the attachments
//! of its chapter.

mod app;
mod keys;
mod state;
mod ui;

use syllabus_core::config::Config;
use syllabus_core::cursor::NavigationCursor;
use syllabus_core::progress::ProgressRecord;
use syllabus_core::session::EditSession;
use syllabus_core::store::ProgressStore;

use crate::cli::Stores;
use crate::cli::util::load_course;

use state::{NavState, NavStores};

/// Handle the 'nav' command
pub fn handle_nav(stores: &Stores, config: &Config, course_id: &str) -> bool {
    let Some(loaded) = load_course(stores, course_id) else {
        return false;
    };
    let course_id = loaded.course.id.clone();

    let progress = stores.progress.load(&course_id).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable progress for '{}': {}", course_id, e);
        ProgressRecord::new(&course_id)
    });

    let cursor = NavigationCursor::new()
        .with_auto_expand(config.auto_expand_on_select)
        .with_persistence(config.persist_position);
    let mut session = EditSession::new(course_id, loaded.tree).with_cursor(cursor);
    session.resume_at(progress.current_lesson_index);

    let mut state = NavState::new(session, loaded.course.title, progress);
    let nav_stores = NavStores {
        courses: &stores.courses,
        progress: &stores.progress,
        attachments: &stores.attachments,
    };

    let mut terminal = ratatui::init();
    let result = app::run(&mut terminal, &mut state, nav_stores);

    // Restore terminal (always, even on error)
    ratatui::restore();

    if let Err(e) = result {
        eprintln!("✗ TUI error: {}", e);
        return false;
    }
    if state.session.is_dirty() {
        println!("Outline changes were not written");
    }
    true
}
