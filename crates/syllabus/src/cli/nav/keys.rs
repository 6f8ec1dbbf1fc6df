//! Key binding handling for the navigation TUI

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use syllabus_core::cursor::NavKey;
use syllabus_core::outline::Direction;
use syllabus_core::session::{EditState, SaveEdit};

use super::state::{ConfirmAction, InputMode, NavState, NavStores, PositionWriter, TextAction};

/// Handle a key event, dispatching by current input mode.
pub fn handle_key(state: &mut NavState, key: KeyEvent, stores: NavStores<'_>) {
    match state.mode {
        InputMode::Normal => handle_normal_key(state, key, stores),
        InputMode::TextInput { .. } => handle_text_input_key(state, key, stores),
        InputMode::Confirm { .. } => handle_confirm_key(state, key),
    }
    state.absorb_notices();
    state.sync_attachments(stores.attachments);
}

fn navigate(state: &mut NavState, key: NavKey, stores: NavStores<'_>) {
    let mut sink = PositionWriter::new(stores.progress, state.session.course_id());
    if state.session.handle_key(key, &mut sink).is_selected() {
        state.preview_scroll = 0;
    }
}

fn select(state: &mut NavState, flat_index: usize, stores: NavStores<'_>) {
    let mut sink = PositionWriter::new(stores.progress, state.session.course_id());
    state.session.select(flat_index, &mut sink);
    state.preview_scroll = 0;
}

/// Handle keys in normal browsing mode
fn handle_normal_key(state: &mut NavState, key: KeyEvent, stores: NavStores<'_>) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.should_quit = true;
        }

        // Quit, asking first if there is unsaved structure
        KeyCode::Char('q') | KeyCode::Esc => {
            if state.session.is_dirty() {
                state.mode = InputMode::Confirm {
                    message: "Quit without saving the outline?".to_string(),
                    action: ConfirmAction::Quit,
                };
            } else {
                state.should_quit = true;
            }
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Right => {
            navigate(state, NavKey::Next, stores);
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::Left => {
            navigate(state, NavKey::Previous, stores);
        }

        // Toggle expand
        KeyCode::Char(' ') | KeyCode::Tab => {
            let current = state.session.cursor().current();
            state.session.toggle_expanded(current);
        }

        // Scroll preview
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..10 {
                state.scroll_preview_down();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..10 {
                state.scroll_preview_up();
            }
        }
        KeyCode::PageDown => state.scroll_preview_down(),
        KeyCode::PageUp => state.scroll_preview_up(),

        // === Outline editing ===

        // Add chapter
        KeyCode::Char('a') => match state.session.begin_add_chapter() {
            Ok(()) => state.open_prompt(
                "New chapter title",
                String::new(),
                TextAction::DraftTitle { then_content: true },
            ),
            Err(e) => state.set_status(e.to_string(), true),
        },

        // Add subchapter under the current lesson
        KeyCode::Char('A') => {
            let Some(parent) = state.current().map(|r| r.path.clone()) else {
                return;
            };
            if !state.session.can_add_subchapter(&parent) {
                state.set_status("Lessons nest at most three levels deep".to_string(), true);
                return;
            }
            match state.session.begin_add_subchapter(&parent) {
                Ok(()) => state.open_prompt(
                    "New lesson title",
                    String::new(),
                    TextAction::DraftTitle { then_content: true },
                ),
                Err(e) => state.set_status(e.to_string(), true),
            }
        }

        // Edit title
        KeyCode::Char('e') => {
            let Some((path, title)) = state
                .current()
                .map(|r| (r.path.clone(), r.node.title.clone()))
            else {
                return;
            };
            match state.session.begin_edit(&path) {
                Ok(()) => state.open_prompt(
                    "Title",
                    title,
                    TextAction::DraftTitle {
                        then_content: false,
                    },
                ),
                Err(e) => state.set_status(e.to_string(), true),
            }
        }

        // Edit content (written through immediately)
        KeyCode::Char('E') => {
            if let Some(content) = state.current().map(|r| r.node.content.clone()) {
                state.open_prompt("Content", content, TextAction::LessonContent);
            }
        }

        // Move among siblings, keeping the cursor on the moved lesson
        KeyCode::Char('J') | KeyCode::Char('K') => {
            let direction = if key.code == KeyCode::Char('J') {
                Direction::Down
            } else {
                Direction::Up
            };
            let Some((path, folder_path)) = state
                .current()
                .map(|r| (r.path.clone(), r.folder_path.clone()))
            else {
                return;
            };
            match state.session.move_node(&path, direction) {
                Ok(true) => {
                    if let Some(position) = state
                        .session
                        .projection()
                        .position_of_folder_path(&folder_path)
                    {
                        select(state, position, stores);
                    }
                }
                Ok(false) => {}
                Err(e) => state.set_status(e.to_string(), true),
            }
        }

        // Delete (confirm first)
        KeyCode::Char('x') => {
            if let Some(record) = state.current() {
                let message = if record.node.has_children() {
                    format!("Delete '{}' and its sublessons?", record.node.title)
                } else {
                    format!("Delete '{}'?", record.node.title)
                };
                let action = ConfirmAction::Delete(record.path.clone());
                state.mode = InputMode::Confirm { message, action };
            }
        }

        // Toggle completion
        KeyCode::Char('c') => {
            let current = state.session.cursor().current();
            if state.current().is_none() {
                return;
            }
            let done = state.progress.is_completed(current);
            if let Some(record) = state
                .session
                .mark_current_completed(stores.progress, !done)
            {
                let message = if done {
                    format!("Marked not completed ({}%)", record.progress)
                } else {
                    format!("Completed ({}%)", record.progress)
                };
                state.progress = record;
                state.set_status(message, false);
            }
        }

        // Write the outline
        KeyCode::Char('w') => {
            state.session.save_course(stores.courses);
        }

        _ => {}
    }
}

/// Byte offset of the `cursor`-th character
fn byte_offset(buffer: &str, cursor: usize) -> usize {
    buffer
        .char_indices()
        .nth(cursor)
        .map(|(i, _)| i)
        .unwrap_or(buffer.len())
}

/// Handle keys in text input mode
fn handle_text_input_key(state: &mut NavState, key: KeyEvent, stores: NavStores<'_>) {
    let (prompt, mut buffer, mut cursor, action) = match state.mode.clone() {
        InputMode::TextInput {
            prompt,
            buffer,
            cursor,
            action,
        } => (prompt, buffer, cursor, action),
        _ => return,
    };
    let len = buffer.chars().count();

    match key.code {
        KeyCode::Esc => {
            if state.session.cancel_edit() {
                state.set_status("Cancelled".to_string(), false);
            }
            state.close_prompt();
            return;
        }
        KeyCode::Enter => {
            submit(state, action, buffer, stores);
            return;
        }
        KeyCode::Backspace => {
            if cursor > 0 {
                buffer.remove(byte_offset(&buffer, cursor - 1));
                cursor -= 1;
            }
        }
        KeyCode::Delete => {
            if cursor < len {
                buffer.remove(byte_offset(&buffer, cursor));
            }
        }
        KeyCode::Left => cursor = cursor.saturating_sub(1),
        KeyCode::Right => cursor = (cursor + 1).min(len),
        KeyCode::Home => cursor = 0,
        KeyCode::End => cursor = len,
        KeyCode::Char(c) => {
            buffer.insert(byte_offset(&buffer, cursor), c);
            cursor += 1;
        }
        _ => return,
    }

    state.mode = InputMode::TextInput {
        prompt,
        buffer,
        cursor,
        action,
    };
}

/// Apply a submitted prompt
fn submit(state: &mut NavState, action: TextAction, buffer: String, stores: NavStores<'_>) {
    match action {
        TextAction::DraftTitle { then_content } => {
            if let Err(e) = state.session.set_draft_title(buffer) {
                state.set_status(e.to_string(), true);
                state.close_prompt();
                return;
            }
            if then_content {
                state.open_prompt("Content", String::new(), TextAction::DraftContent);
            } else {
                finish_draft(state, stores);
            }
        }
        TextAction::DraftContent => {
            if let Err(e) = state.session.set_draft_content(buffer) {
                state.set_status(e.to_string(), true);
                state.close_prompt();
                return;
            }
            finish_draft(state, stores);
        }
        TextAction::LessonContent => {
            state.close_prompt();
            if state.session.save_current_content(stores.courses, &buffer) {
                state.set_status("Content saved".to_string(), false);
            }
        }
    }
}

/// Save the draft, or reopen the first field that failed validation
fn finish_draft(state: &mut NavState, stores: NavStores<'_>) {
    match state.session.save_edit() {
        Ok(SaveEdit::Saved(path)) => {
            state.close_prompt();
            if let Some(position) = state.session.projection().position_of_path(&path) {
                select(state, position, stores);
            }
            state.set_status("Saved (press w to write the outline)".to_string(), false);
        }
        Ok(SaveEdit::Invalid(errors)) => {
            let EditState::Editing { draft, .. } = state.session.edit_state().clone() else {
                state.close_prompt();
                return;
            };
            let messages: Vec<String> = [errors.title.clone(), errors.content.clone()]
                .into_iter()
                .flatten()
                .collect();
            if errors.title.is_some() {
                state.open_prompt(
                    "Title",
                    draft.title,
                    TextAction::DraftTitle {
                        then_content: errors.content.is_some(),
                    },
                );
            } else {
                state.open_prompt("Content", draft.content, TextAction::DraftContent);
            }
            state.set_status(messages.join(", "), true);
        }
        Err(e) => {
            state.session.cancel_edit();
            state.close_prompt();
            state.set_status(e.to_string(), true);
        }
    }
}

/// Handle keys in confirmation mode
fn handle_confirm_key(state: &mut NavState, key: KeyEvent) {
    let action = match &state.mode {
        InputMode::Confirm { action, .. } => action.clone(),
        _ => return,
    };

    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            state.mode = InputMode::Normal;
            match action {
                ConfirmAction::Delete(path) => match state.session.delete_node(&path) {
                    Ok(()) => {
                        state.invalidate_attachments();
                        state.set_status("Deleted (press w to write the outline)".to_string(), false);
                    }
                    Err(e) => state.set_status(e.to_string(), true),
                },
                ConfirmAction::Quit => state.should_quit = true,
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = InputMode::Normal;
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;
    use syllabus_core::fs::InMemoryFileSystem;
    use syllabus_core::outline::{NodeDraft, OutlinePath, OutlineTree};
    use syllabus_core::progress::ProgressRecord;
    use syllabus_core::session::EditSession;
    use syllabus_core::store::{
        FileProgressStore, FolderAttachmentStore, FolderCourseStore, ProgressStore,
    };

    struct Fixture {
        courses: FolderCourseStore<InMemoryFileSystem>,
        progress: FileProgressStore<InMemoryFileSystem>,
        attachments: FolderAttachmentStore<InMemoryFileSystem>,
    }

    impl Fixture {
        fn new() -> Self {
            let fs = InMemoryFileSystem::new();
            Self {
                courses: FolderCourseStore::new(fs.clone(), "courses"),
                progress: FileProgressStore::new(fs.clone(), "progress"),
                attachments: FolderAttachmentStore::new(fs, "attachments"),
            }
        }

        fn stores(&self) -> NavStores<'_> {
            NavStores {
                courses: &self.courses,
                progress: &self.progress,
                attachments: &self.attachments,
            }
        }
    }

    fn state() -> NavState {
        let (tree, _) = OutlineTree::new().insert_root(NodeDraft::new("Basics", "b"));
        let (tree, _) = tree
            .insert_child(&OutlinePath::from(vec![0]), NodeDraft::new("Variables", "v"))
            .unwrap();
        let (tree, _) = tree.insert_root(NodeDraft::new("Loops", "l"));
        NavState::new(
            EditSession::new("intro", tree),
            "Intro".to_string(),
            ProgressRecord::new("intro"),
        )
    }

    fn press(state: &mut NavState, fixture: &Fixture, code: KeyCode) {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(key.kind, KeyEventKind::Press);
        handle_key(state, key, fixture.stores());
    }

    fn type_text(state: &mut NavState, fixture: &Fixture, text: &str) {
        for c in text.chars() {
            press(state, fixture, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_navigation_persists_position() {
        let fixture = Fixture::new();
        let mut state = state();
        press(&mut state, &fixture, KeyCode::Char('j'));
        press(&mut state, &fixture, KeyCode::Down);
        assert_eq!(state.session.cursor().current(), 2);
        assert_eq!(fixture.progress.load("intro").unwrap().current_lesson_index, 2);
        press(&mut state, &fixture, KeyCode::Left);
        assert_eq!(state.session.cursor().current(), 1);
    }

    #[test]
    fn test_add_chapter_through_prompts() {
        let fixture = Fixture::new();
        let mut state = state();
        press(&mut state, &fixture, KeyCode::Char('a'));
        // j is text now, not navigation
        type_text(&mut state, &fixture, "Traits jk");
        press(&mut state, &fixture, KeyCode::Enter);
        type_text(&mut state, &fixture, "impl");
        press(&mut state, &fixture, KeyCode::Enter);

        assert_eq!(state.mode, InputMode::Normal);
        let current = state.current().unwrap();
        assert_eq!(current.node.title, "Traits jk");
        assert_eq!(current.display_number(), "3");
        assert!(state.session.is_dirty());
    }

    #[test]
    fn test_empty_title_reopens_prompt() {
        let fixture = Fixture::new();
        let mut state = state();
        press(&mut state, &fixture, KeyCode::Char('a'));
        press(&mut state, &fixture, KeyCode::Enter);
        type_text(&mut state, &fixture, "body");
        press(&mut state, &fixture, KeyCode::Enter);

        match &state.mode {
            InputMode::TextInput { prompt, .. } => assert_eq!(prompt, "Title"),
            other => panic!("unexpected mode {:?}", other),
        }
        let (message, is_error) = state.status_message.clone().unwrap();
        assert!(is_error);
        assert_eq!(message, "Title is required");

        press(&mut state, &fixture, KeyCode::Esc);
        assert!(!state.session.is_editing());
        assert_eq!(state.session.tree().roots().len(), 2);
    }

    #[test]
    fn test_move_keeps_cursor_on_lesson() {
        let fixture = Fixture::new();
        let mut state = state();
        press(&mut state, &fixture, KeyCode::Char('J'));
        let current = state.current().unwrap();
        assert_eq!(current.node.title, "Basics");
        assert_eq!(current.display_number(), "2");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let fixture = Fixture::new();
        let mut state = state();
        press(&mut state, &fixture, KeyCode::Char('x'));
        press(&mut state, &fixture, KeyCode::Char('n'));
        assert_eq!(state.session.projection().len(), 3);

        press(&mut state, &fixture, KeyCode::Char('x'));
        press(&mut state, &fixture, KeyCode::Char('y'));
        assert_eq!(state.session.projection().len(), 1);
        assert_eq!(state.current().unwrap().node.title, "Loops");
    }

    #[test]
    fn test_quit_asks_when_dirty() {
        let fixture = Fixture::new();
        let mut state = state();
        press(&mut state, &fixture, KeyCode::Char('K'));
        assert!(!state.session.is_dirty());
        press(&mut state, &fixture, KeyCode::Char('J'));
        press(&mut state, &fixture, KeyCode::Char('q'));
        assert!(!state.should_quit);
        press(&mut state, &fixture, KeyCode::Char('y'));
        assert!(state.should_quit);
    }

    #[test]
    fn test_completion_toggle() {
        let fixture = Fixture::new();
        let mut state = state();
        press(&mut state, &fixture, KeyCode::Char('c'));
        assert_eq!(state.progress.completed_lessons, vec![0]);
        assert_eq!(state.progress.progress, 33);
        press(&mut state, &fixture, KeyCode::Char('c'));
        assert!(state.progress.completed_lessons.is_empty());
    }

    #[test]
    fn test_byte_offset_handles_multibyte() {
        assert_eq!(byte_offset("héllo", 2), 3);
        assert_eq!(byte_offset("abc", 10), 3);
    }
}
