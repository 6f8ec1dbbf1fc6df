//! Navigation application state management

use syllabus_core::cursor::{KeyFocus, PositionSink};
use syllabus_core::error::Result;
use syllabus_core::flatten::FlatRecord;
use syllabus_core::notice::NoticeLevel;
use syllabus_core::outline::{FolderIndex, OutlinePath};
use syllabus_core::progress::ProgressRecord;
use syllabus_core::session::EditSession;
use syllabus_core::store::{AttachmentStore, CourseStore, ProgressStore};

/// The stores the TUI talks to
#[derive(Clone, Copy)]
pub struct NavStores<'a> {
    pub courses: &'a dyn CourseStore,
    pub progress: &'a dyn ProgressStore,
    pub attachments: &'a dyn AttachmentStore,
}

/// Writes the cursor position to the progress store
pub struct PositionWriter<'a> {
    store: &'a dyn ProgressStore,
    course_id: String,
}

impl<'a> PositionWriter<'a> {
    pub fn new(store: &'a dyn ProgressStore, course_id: &str) -> Self {
        Self {
            store,
            course_id: course_id.to_string(),
        }
    }
}

impl PositionSink for PositionWriter<'_> {
    fn persist_position(&mut self, flat_index: usize) -> Result<()> {
        self.store.set_current_lesson(&self.course_id, flat_index)
    }
}

/// Input mode for the TUI
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Browsing the outline
    Normal,
    /// Single-line text entry in the help bar
    TextInput {
        prompt: String,
        buffer: String,
        /// Cursor position in characters
        cursor: usize,
        action: TextAction,
    },
    /// y/n question
    Confirm {
        message: String,
        action: ConfirmAction,
    },
}

/// What a submitted text prompt does
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextAction {
    /// Title of the lesson being added or edited
    DraftTitle { then_content: bool },
    /// Content of the lesson being added
    DraftContent,
    /// Replace the current lesson's content and write it straight away
    LessonContent,
}

/// What a confirmed question does
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfirmAction {
    Delete(OutlinePath),
    Quit,
}

/// Navigation application state
pub struct NavState {
    /// The editing session over the open course
    pub session: EditSession,

    /// Title shown in the outline pane border
    pub course_title: String,

    /// Last known progress record
    pub progress: ProgressRecord,

    /// Current input mode
    pub mode: InputMode,

    /// Status message and whether it is an error
    pub status_message: Option<(String, bool)>,

    /// Whether to quit the app
    pub should_quit: bool,

    /// Preview scroll offset (line number)
    pub preview_scroll: u16,

    /// Chapter whose attachments are loaded
    attachments_chapter: Option<FolderIndex>,
}

impl NavState {
    pub fn new(session: EditSession, course_title: String, progress: ProgressRecord) -> Self {
        Self {
            session,
            course_title,
            progress,
            mode: InputMode::Normal,
            status_message: None,
            should_quit: false,
            preview_scroll: 0,
            attachments_chapter: None,
        }
    }

    pub fn set_status(&mut self, message: String, is_error: bool) {
        self.status_message = Some((message, is_error));
    }

    /// Move session notices into the status line; the newest one wins
    pub fn absorb_notices(&mut self) {
        for notice in self.session.take_notices() {
            let is_error = notice.level != NoticeLevel::Info;
            self.set_status(notice.message, is_error);
        }
    }

    pub fn current(&self) -> Option<&FlatRecord> {
        self.session.current_record()
    }

    /// Row of the cursor in the visible outline, if it is visible
    pub fn selected_row(&self) -> Option<usize> {
        let current = self.session.cursor().current();
        self.session
            .visible()
            .iter()
            .position(|record| record.flat_index == current)
    }

    /// Reload attachments when the cursor entered another chapter
    pub fn sync_attachments(&mut self, store: &dyn AttachmentStore) {
        let chapter = self.current().and_then(|r| r.folder_path.root());
        if chapter != self.attachments_chapter {
            self.session.refresh_attachments(store);
            self.attachments_chapter = chapter;
        }
    }

    /// Reload attachments on the next sync
    pub fn invalidate_attachments(&mut self) {
        self.attachments_chapter = None;
    }

    /// Open a text prompt; navigation keys stop reaching the outline
    pub fn open_prompt(&mut self, prompt: &str, buffer: String, action: TextAction) {
        let cursor = buffer.chars().count();
        self.mode = InputMode::TextInput {
            prompt: prompt.to_string(),
            buffer,
            cursor,
            action,
        };
        self.session.set_focus(KeyFocus::TextEntry);
    }

    pub fn close_prompt(&mut self) {
        self.mode = InputMode::Normal;
        if !self.session.is_editing() {
            self.session.set_focus(KeyFocus::Outline);
        }
    }

    /// Scroll preview down by one line
    pub fn scroll_preview_down(&mut self) {
        let lines = self
            .current()
            .map(|r| r.node.content.lines().count())
            .unwrap_or(0);
        let max_scroll = lines.saturating_sub(1) as u16;
        if self.preview_scroll < max_scroll {
            self.preview_scroll += 1;
        }
    }

    /// Scroll preview up by one line
    pub fn scroll_preview_up(&mut self) {
        self.preview_scroll = self.preview_scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syllabus_core::outline::{NodeDraft, OutlineTree};

    fn state() -> NavState {
        let (tree, _) = OutlineTree::new().insert_root(NodeDraft::new("Basics", "one\ntwo\nthree"));
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

    #[test]
    fn test_selected_row_tracks_visible_outline() {
        let mut state = state();
        assert_eq!(state.selected_row(), Some(0));
        state.session.resume_at(2);
        // Loops is the second visible row while Basics is collapsed
        assert_eq!(state.selected_row(), Some(1));
        state.session.toggle_expanded(0);
        assert_eq!(state.selected_row(), Some(2));
    }

    #[test]
    fn test_prompt_moves_focus() {
        let mut state = state();
        state.open_prompt("Content", "abc".to_string(), TextAction::LessonContent);
        assert_eq!(state.session.focus(), KeyFocus::TextEntry);
        match &state.mode {
            InputMode::TextInput { cursor, .. } => assert_eq!(*cursor, 3),
            other => panic!("unexpected mode {:?}", other),
        }
        state.close_prompt();
        assert_eq!(state.session.focus(), KeyFocus::Outline);
        assert_eq!(state.mode, InputMode::Normal);
    }

    #[test]
    fn test_preview_scroll_is_bounded() {
        let mut state = state();
        for _ in 0..10 {
            state.scroll_preview_down();
        }
        assert_eq!(state.preview_scroll, 2);
        state.scroll_preview_up();
        assert_eq!(state.preview_scroll, 1);
    }
}
