//! The editing session: one author working on one course outline.
//!
//! An [`EditSession`] owns the current tree together with everything derived
//! from it (projection, expansion, cursor) and the edit state machine:
//!
//! ```text
//! Idle --begin_*--> Editing --save_edit (valid)--> Idle
//!                      |  \--save_edit (invalid)--> Editing (field errors)
//!                      \--cancel_edit-----------> Idle
//! ```
//!
//! Structural operations are refused while a lesson is being edited. Storage
//! failures never undo in-memory state; they are queued as notices.

use crate::attachment::{Attachment, AttachmentLoader, AttachmentUpload, FetchTicket};
use crate::cursor::{KeyFocus, NavKey, NavigationCursor, PositionSink, SelectOutcome};
use crate::error::{Result, SyllabusError};
use crate::expansion::ExpansionStore;
use crate::flatten::{FlatRecord, Projection, flatten};
use crate::notice::Notice;
use crate::outline::{Direction, NodeDraft, OutlinePath, OutlineTree};
use crate::progress::ProgressRecord;
use crate::store::{AttachmentStore, CourseStore, ProgressStore};

/// What the open editor will do on save
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditMode {
    /// Add a lesson; `parent: None` adds a chapter
    New { parent: Option<OutlinePath> },
    /// Change the lesson at `path`
    Existing { path: OutlinePath },
}

/// Editor contents, untrimmed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditDraft {
    /// Draft title
    pub title: String,
    /// Draft body
    pub content: String,
}

/// Validation messages per field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    /// Title error, if any
    pub title: Option<String>,
    /// Content error, if any
    pub content: Option<String>,
}

impl FieldErrors {
    /// True when both fields are valid
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Title and content must contain something besides whitespace
    pub fn validate(draft: &EditDraft) -> Self {
        Self {
            title: draft
                .title
                .trim()
                .is_empty()
                .then(|| "Title is required".to_string()),
            content: draft
                .content
                .trim()
                .is_empty()
                .then(|| "Content is required".to_string()),
        }
    }
}

/// Edit state machine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditState {
    /// Nothing is being edited
    #[default]
    Idle,
    /// A draft is open
    Editing {
        /// What the draft will create or update
        mode: EditMode,
        /// Current field values
        draft: EditDraft,
        /// Errors from the last save attempt
        errors: FieldErrors,
    },
}

/// Result of `save_edit`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEdit {
    /// Stored in the tree at this path
    Saved(OutlinePath),
    /// Nothing stored; still editing
    Invalid(FieldErrors),
}

/// Single-writer session over one course outline.
#[derive(Debug, Clone)]
pub struct EditSession {
    course_id: String,
    tree: OutlineTree,
    projection: Projection,
    expansion: ExpansionStore,
    cursor: NavigationCursor,
    edit: EditState,
    focus: KeyFocus,
    notices: Vec<Notice>,
    attachments: AttachmentLoader,
    dirty: bool,
}

impl EditSession {
    /// Session over `tree` with the cursor on the first lesson
    pub fn new(course_id: impl Into<String>, tree: OutlineTree) -> Self {
        let projection = flatten(&tree);
        Self {
            course_id: course_id.into(),
            tree,
            projection,
            expansion: ExpansionStore::new(),
            cursor: NavigationCursor::new(),
            edit: EditState::Idle,
            focus: KeyFocus::Outline,
            notices: Vec::new(),
            attachments: AttachmentLoader::new(),
            dirty: false,
        }
    }

    /// Load a course from `store` and open a session on it
    pub fn open(store: &dyn CourseStore, course_id: &str) -> Result<Self> {
        let course = store.load(course_id)?;
        let tree = course.outline()?;
        log::debug!("Opened course '{}' ({} lessons)", course.id, tree.len());
        Ok(Self::new(course.id, tree))
    }

    /// Builder: use a configured cursor (auto-expand, persistence flags)
    pub fn with_cursor(mut self, cursor: NavigationCursor) -> Self {
        self.cursor = cursor;
        self.cursor.clamp_to(self.projection.len());
        self
    }

    /// Put the cursor on a remembered position without persisting it again.
    ///
    /// Out-of-range positions are clamped.
    pub fn resume_at(&mut self, flat_index: usize) {
        self.cursor.jump_to(flat_index);
        self.cursor.clamp_to(self.projection.len());
        self.expansion
            .auto_expand_ancestors(&self.projection, self.cursor.current());
    }

    // ---- accessors -------------------------------------------------------

    /// Course this session edits
    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    /// Current tree value
    pub fn tree(&self) -> &OutlineTree {
        &self.tree
    }

    /// Projection of the current tree
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Expanded nodes
    pub fn expansion(&self) -> &ExpansionStore {
        &self.expansion
    }

    /// Navigation cursor
    pub fn cursor(&self) -> &NavigationCursor {
        &self.cursor
    }

    /// Record under the cursor, `None` for an empty outline
    pub fn current_record(&self) -> Option<&FlatRecord> {
        self.projection.get(self.cursor.current())
    }

    /// Records to draw, in order
    pub fn visible(&self) -> Vec<&FlatRecord> {
        self.expansion.visible(&self.projection)
    }

    /// Current edit state
    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Whether a draft is open
    pub fn is_editing(&self) -> bool {
        matches!(self.edit, EditState::Editing { .. })
    }

    /// Who receives navigation keys
    pub fn focus(&self) -> KeyFocus {
        self.focus
    }

    /// Route keyboard input elsewhere (e.g. a prompt outside the editor)
    pub fn set_focus(&mut self, focus: KeyFocus) {
        self.focus = focus;
    }

    /// Structural edits not yet written with `save_course`
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Drain queued notices, oldest first
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Attachments of the chapter under the cursor, as last loaded
    pub fn attachments(&self) -> &[Attachment] {
        self.attachments.attachments()
    }

    // ---- edit state machine ----------------------------------------------

    fn ensure_idle(&self) -> Result<()> {
        if self.is_editing() {
            return Err(SyllabusError::EditInProgress);
        }
        Ok(())
    }

    fn start_editing(&mut self, mode: EditMode, draft: EditDraft) {
        self.edit = EditState::Editing {
            mode,
            draft,
            errors: FieldErrors::default(),
        };
        self.focus = KeyFocus::TextEntry;
    }

    fn finish_editing(&mut self) {
        self.edit = EditState::Idle;
        self.focus = KeyFocus::Outline;
    }

    /// Open an empty editor for a new chapter
    pub fn begin_add_chapter(&mut self) -> Result<()> {
        self.ensure_idle()?;
        self.start_editing(EditMode::New { parent: None }, EditDraft::default());
        Ok(())
    }

    /// Whether a subchapter may be added under `parent`
    pub fn can_add_subchapter(&self, parent: &OutlinePath) -> bool {
        self.tree.can_insert_child(parent)
    }

    /// Open an empty editor for a lesson under `parent`
    pub fn begin_add_subchapter(&mut self, parent: &OutlinePath) -> Result<()> {
        self.ensure_idle()?;
        self.tree.node(parent)?;
        if !self.tree.can_insert_child(parent) {
            return Err(SyllabusError::MaxDepthReached(parent.clone()));
        }
        self.start_editing(
            EditMode::New {
                parent: Some(parent.clone()),
            },
            EditDraft::default(),
        );
        Ok(())
    }

    /// Open the editor on an existing lesson
    pub fn begin_edit(&mut self, path: &OutlinePath) -> Result<()> {
        self.ensure_idle()?;
        let node = self.tree.node(path)?;
        let draft = EditDraft {
            title: node.title.clone(),
            content: node.content.clone(),
        };
        self.start_editing(EditMode::Existing { path: path.clone() }, draft);
        Ok(())
    }

    fn draft_mut(&mut self) -> Result<&mut EditDraft> {
        match &mut self.edit {
            EditState::Editing { draft, .. } => Ok(draft),
            EditState::Idle => Err(SyllabusError::NotEditing),
        }
    }

    /// Replace the draft title
    pub fn set_draft_title(&mut self, title: impl Into<String>) -> Result<()> {
        self.draft_mut()?.title = title.into();
        Ok(())
    }

    /// Replace the draft body
    pub fn set_draft_content(&mut self, content: impl Into<String>) -> Result<()> {
        self.draft_mut()?.content = content.into();
        Ok(())
    }

    /// Validate and store the draft.
    ///
    /// Invalid drafts keep the session in `Editing` with the field errors
    /// recorded. Saved values are trimmed.
    pub fn save_edit(&mut self) -> Result<SaveEdit> {
        let EditState::Editing {
            mode,
            draft,
            errors,
        } = &mut self.edit
        else {
            return Err(SyllabusError::NotEditing);
        };

        let found = FieldErrors::validate(draft);
        if !found.is_empty() {
            *errors = found.clone();
            return Ok(SaveEdit::Invalid(found));
        }

        let title = draft.title.trim().to_string();
        let content = draft.content.trim().to_string();
        let (tree, path) = match mode {
            EditMode::New { parent: None } => self.tree.insert_root(NodeDraft::new(title, content)),
            EditMode::New {
                parent: Some(parent),
            } => self.tree.insert_child(parent, NodeDraft::new(title, content))?,
            EditMode::Existing { path } => {
                (self.tree.update_content(path, title, content)?, path.clone())
            }
        };

        self.finish_editing();
        self.replace_tree(tree);
        if let Some(position) = self.projection.position_of_path(&path) {
            self.expansion
                .auto_expand_ancestors(&self.projection, position);
        }
        Ok(SaveEdit::Saved(path))
    }

    /// Close the editor, discarding the draft. Returns whether it was open.
    pub fn cancel_edit(&mut self) -> bool {
        let was_editing = self.is_editing();
        self.finish_editing();
        was_editing
    }

    // ---- structural operations -------------------------------------------

    fn replace_tree(&mut self, tree: OutlineTree) {
        self.tree = tree;
        self.projection = flatten(&self.tree);
        self.expansion.retain_existing(&self.projection);
        self.cursor.clamp_to(self.projection.len());
        self.dirty = true;
    }

    /// Swap a lesson with its neighbour. Returns false at a boundary.
    pub fn move_node(&mut self, path: &OutlinePath, direction: Direction) -> Result<bool> {
        self.ensure_idle()?;
        let moved = self.tree.move_sibling(path, direction)?;
        if moved.same_snapshot(&self.tree) {
            return Ok(false);
        }
        self.replace_tree(moved);
        Ok(true)
    }

    /// Remove a lesson and everything below it
    pub fn delete_node(&mut self, path: &OutlinePath) -> Result<()> {
        self.ensure_idle()?;
        let tree = self.tree.delete_at(path)?;
        self.replace_tree(tree);
        Ok(())
    }

    /// Expand or collapse the record at `flat_index`.
    /// Returns the new expanded state, `None` if the index is out of range.
    pub fn toggle_expanded(&mut self, flat_index: usize) -> Option<bool> {
        let key = self.projection.get(flat_index)?.folder_path.clone();
        Some(self.expansion.toggle(&key))
    }

    // ---- navigation ------------------------------------------------------

    fn queue(&mut self, outcome: SelectOutcome) -> SelectOutcome {
        if let SelectOutcome::Selected {
            notice: Some(notice),
            ..
        } = &outcome
        {
            self.notices.push(notice.clone());
        }
        outcome
    }

    /// Move the cursor to `flat_index`
    pub fn select(&mut self, flat_index: usize, sink: &mut dyn PositionSink) -> SelectOutcome {
        let outcome =
            self.cursor
                .select_index(flat_index, &self.projection, &mut self.expansion, sink);
        self.queue(outcome)
    }

    /// Move the cursor by `delta` visible rows
    pub fn step(&mut self, delta: isize, sink: &mut dyn PositionSink) -> SelectOutcome {
        let outcome = self
            .cursor
            .step(delta, &self.projection, &mut self.expansion, sink);
        self.queue(outcome)
    }

    /// Previous/next, ignored while text entry has focus
    pub fn handle_key(&mut self, key: NavKey, sink: &mut dyn PositionSink) -> SelectOutcome {
        let outcome = self.cursor.handle_key(
            key,
            self.focus,
            &self.projection,
            &mut self.expansion,
            sink,
        );
        self.queue(outcome)
    }

    // ---- persistence -----------------------------------------------------

    /// Write the whole outline. Returns whether it succeeded.
    pub fn save_course(&mut self, store: &dyn CourseStore) -> bool {
        match store.save_outline(&self.course_id, &self.tree) {
            Ok(()) => {
                self.dirty = false;
                self.notices.push(Notice::info("Course saved"));
                true
            }
            Err(e) => {
                log::warn!("Failed to save course '{}': {}", self.course_id, e);
                self.notices
                    .push(Notice::error(format!("Could not save the course: {}", e)));
                false
            }
        }
    }

    /// Replace the body of the current lesson and write it through.
    ///
    /// The in-memory change is kept even if the write fails.
    pub fn save_current_content(&mut self, store: &dyn CourseStore, content: &str) -> bool {
        let Some(record) = self.current_record() else {
            return false;
        };
        let path = record.path.clone();
        let folder_path = record.folder_path.clone();
        match self.tree.update(&path, |node| node.content = content.to_string()) {
            Ok(tree) => {
                // content edits do not invalidate positions
                self.tree = tree;
                self.projection = flatten(&self.tree);
            }
            Err(e) => {
                log::warn!("Lesson {} vanished before saving: {}", path, e);
                return false;
            }
        }
        match store.save_content(&self.course_id, &folder_path, content) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to save content of {}: {}", folder_path, e);
                self.notices
                    .push(Notice::error(format!("Could not save the lesson: {}", e)));
                false
            }
        }
    }

    /// Mark the current lesson completed or not
    pub fn mark_current_completed(
        &mut self,
        store: &dyn ProgressStore,
        completed: bool,
    ) -> Option<ProgressRecord> {
        let flat_index = self.current_record()?.flat_index;
        match store.set_completed(&self.course_id, flat_index, completed, self.projection.len()) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Failed to update progress: {}", e);
                self.notices
                    .push(Notice::warning(format!("Could not save progress: {}", e)));
                None
            }
        }
    }

    // ---- attachments -----------------------------------------------------

    /// Start loading attachments for the chapter under the cursor
    pub fn load_attachments(&mut self) -> Option<FetchTicket> {
        let chapter = self
            .current_record()
            .and_then(|record| record.folder_path.root());
        match chapter {
            Some(chapter) => Some(self.attachments.request(chapter)),
            None => {
                self.attachments.clear();
                None
            }
        }
    }

    /// Commit a fetch result.
    ///
    /// Ignored when the ticket is stale or the cursor has since moved to
    /// another chapter.
    pub fn finish_attachment_load(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Attachment>>,
    ) -> bool {
        let current = self
            .current_record()
            .and_then(|record| record.folder_path.root());
        if current != Some(ticket.chapter) {
            log::debug!(
                "Dropping attachments of chapter {}; the cursor left it",
                ticket.chapter
            );
            self.attachments.cancel(ticket);
            return false;
        }
        self.attachments.commit(ticket, result)
    }

    /// Load attachments for the current chapter synchronously
    pub fn refresh_attachments(&mut self, store: &dyn AttachmentStore) {
        if let Some(ticket) = self.load_attachments() {
            let result = store.list(&self.course_id, ticket.chapter);
            self.finish_attachment_load(ticket, result);
        }
    }

    /// Attach a file to the current chapter
    pub fn upload_attachment(
        &mut self,
        store: &dyn AttachmentStore,
        upload: AttachmentUpload,
    ) -> Option<Attachment> {
        let chapter = self.current_record()?.folder_path.root()?;
        match store.upload(&self.course_id, chapter, upload) {
            Ok(attachment) => {
                self.refresh_attachments(store);
                Some(attachment)
            }
            Err(e) => {
                log::warn!("Upload failed: {}", e);
                self.notices
                    .push(Notice::error(format!("Could not upload: {}", e)));
                None
            }
        }
    }

    /// Delete an attachment. Returns whether it succeeded.
    pub fn delete_attachment(&mut self, store: &dyn AttachmentStore, attachment_id: &str) -> bool {
        match store.delete(&self.course_id, attachment_id) {
            Ok(()) => {
                self.refresh_attachments(store);
                true
            }
            Err(e) => {
                log::warn!("Failed to delete attachment {}: {}", attachment_id, e);
                self.notices
                    .push(Notice::error(format!("Could not delete attachment: {}", e)));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::NoPersistence;
    use crate::test_utils::{FailingCourseStore, RecordingSink, sample_tree};

    fn session() -> EditSession {
        EditSession::new("rust", sample_tree())
    }

    fn path(segments: &[usize]) -> OutlinePath {
        OutlinePath::from(segments)
    }

    #[test]
    fn test_add_chapter_flow() {
        let mut session = session();
        session.begin_add_chapter().unwrap();
        assert_eq!(session.focus(), KeyFocus::TextEntry);
        session.set_draft_title("  Traits  ").unwrap();
        session.set_draft_content(" impl blocks ").unwrap();

        let saved = session.save_edit().unwrap();

        assert_eq!(saved, SaveEdit::Saved(path(&[3])));
        let node = session.tree().node(&path(&[3])).unwrap();
        assert_eq!(node.title, "Traits");
        assert_eq!(node.content, "impl blocks");
        assert_eq!(node.order, 4);
        assert!(!session.is_editing());
        assert!(session.is_dirty());
        assert_eq!(session.focus(), KeyFocus::Outline);
    }

    #[test]
    fn test_validation_keeps_editing() {
        let mut session = session();
        session.begin_add_chapter().unwrap();
        session.set_draft_title("   ").unwrap();
        session.set_draft_content("body").unwrap();

        let outcome = session.save_edit().unwrap();

        let SaveEdit::Invalid(errors) = outcome else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.title.as_deref(), Some("Title is required"));
        assert_eq!(errors.content, None);
        assert!(session.is_editing());
        assert_eq!(session.tree().roots().len(), 3);
        match session.edit_state() {
            EditState::Editing { errors, .. } => assert!(errors.title.is_some()),
            EditState::Idle => panic!("should still be editing"),
        }
    }

    #[test]
    fn test_structural_ops_refused_while_editing() {
        let mut session = session();
        session.begin_edit(&path(&[1])).unwrap();

        assert!(matches!(
            session.move_node(&path(&[1]), Direction::Up),
            Err(SyllabusError::EditInProgress)
        ));
        assert!(matches!(
            session.delete_node(&path(&[0])),
            Err(SyllabusError::EditInProgress)
        ));
        assert!(matches!(
            session.begin_add_chapter(),
            Err(SyllabusError::EditInProgress)
        ));

        assert!(session.cancel_edit());
        assert!(!session.cancel_edit());
        assert!(session.move_node(&path(&[1]), Direction::Up).unwrap());
    }

    #[test]
    fn test_edit_existing_updates_only_that_lesson() {
        let mut session = session();
        session.begin_edit(&path(&[0, 1])).unwrap();
        session.set_draft_content("println!").unwrap();
        assert_eq!(session.save_edit().unwrap(), SaveEdit::Saved(path(&[0, 1])));

        let tree = session.tree();
        assert_eq!(tree.node(&path(&[0, 1])).unwrap().content, "println!");
        assert_eq!(tree.node(&path(&[0, 1])).unwrap().title, "Hello World");
        assert_eq!(tree.node(&path(&[0, 0])).unwrap().title, "Install");
    }

    #[test]
    fn test_subchapter_depth_limit() {
        let mut session = session();
        assert!(session.can_add_subchapter(&path(&[0, 0])));
        assert!(!session.can_add_subchapter(&path(&[0, 0, 0])));
        assert!(matches!(
            session.begin_add_subchapter(&path(&[0, 0, 0])),
            Err(SyllabusError::MaxDepthReached(_))
        ));
        assert!(!session.is_editing());
        assert!(matches!(
            session.begin_add_subchapter(&path(&[8])),
            Err(SyllabusError::NodeNotFound(_))
        ));
    }

    #[test]
    fn test_new_subchapter_is_revealed() {
        let mut session = session();
        session.begin_add_subchapter(&path(&[1])).unwrap();
        session.set_draft_title("Lifetimes").unwrap();
        session.set_draft_content("'a").unwrap();
        session.save_edit().unwrap();

        let titles: Vec<&str> = session
            .visible()
            .iter()
            .map(|r| r.node.title.as_str())
            .collect();
        assert!(titles.contains(&"Lifetimes"));
        assert!(titles.contains(&"Borrowing"));
    }

    #[test]
    fn test_draft_setters_require_editing() {
        let mut session = session();
        assert!(matches!(
            session.set_draft_title("x"),
            Err(SyllabusError::NotEditing)
        ));
        assert!(matches!(session.save_edit(), Err(SyllabusError::NotEditing)));
    }

    #[test]
    fn test_delete_clamps_cursor_without_persisting() {
        let mut session = session();
        let mut sink = RecordingSink::default();
        session.select(6, &mut sink);
        session.delete_node(&path(&[2])).unwrap();

        assert_eq!(session.projection().len(), 6);
        assert_eq!(session.cursor().current(), 5);
        assert_eq!(sink.positions, vec![6]);
    }

    #[test]
    fn test_boundary_move_reports_no_change() {
        let mut session = session();
        assert!(!session.move_node(&path(&[0]), Direction::Up).unwrap());
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_keys_suppressed_while_editing() {
        let mut session = session();
        session.begin_edit(&path(&[0])).unwrap();
        let outcome = session.handle_key(NavKey::Next, &mut NoPersistence);
        assert_eq!(outcome, SelectOutcome::Ignored);
        session.cancel_edit();
        assert!(session.handle_key(NavKey::Next, &mut NoPersistence).is_selected());
        assert_eq!(session.cursor().current(), 1);
    }

    #[test]
    fn test_failed_save_becomes_notice() {
        let mut session = session();
        session.delete_node(&path(&[2])).unwrap();

        assert!(!session.save_course(&FailingCourseStore));

        assert!(session.is_dirty());
        assert_eq!(session.tree().roots().len(), 2);
        let notices = session.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, crate::notice::NoticeLevel::Error);
        assert!(session.take_notices().is_empty());
    }

    #[test]
    fn test_failed_content_save_keeps_memory_copy() {
        let mut session = session();
        session.resume_at(3);
        assert!(!session.save_current_content(&FailingCourseStore, "new body"));
        assert_eq!(session.current_record().unwrap().node.content, "new body");
        assert_eq!(session.take_notices().len(), 1);
    }

    #[test]
    fn test_toggle_expanded_by_flat_index() {
        let mut session = session();
        assert_eq!(session.visible().len(), 3);
        assert_eq!(session.toggle_expanded(0), Some(true));
        assert_eq!(session.visible().len(), 5);
        assert_eq!(session.toggle_expanded(0), Some(false));
        assert_eq!(session.toggle_expanded(42), None);
    }

    #[test]
    fn test_resume_at_reveals_position() {
        let mut session = session();
        session.resume_at(1);
        assert_eq!(session.cursor().current(), 1);
        assert_eq!(session.visible().len(), 5);
        session.resume_at(99);
        assert_eq!(session.cursor().current(), 6);
    }

    fn pdf(id: &str, chapter: u32) -> Attachment {
        Attachment {
            id: id.to_string(),
            course_id: "rust".to_string(),
            chapter: crate::outline::FolderIndex(chapter),
            filename: format!("{}.pdf", id),
            original_name: "notes.pdf".to_string(),
            mime_type: "application/pdf".to_string(),
            size: 4,
            uploaded_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_attachments_dropped_after_leaving_chapter() {
        let mut session = session();
        let for_first = session.load_attachments().unwrap();
        assert_eq!(for_first.chapter.0, 0);

        // Ownership is a different root chapter
        session.select(4, &mut NoPersistence);
        assert!(!session.finish_attachment_load(for_first, Ok(vec![pdf("a", 0)])));
        assert!(session.attachments().is_empty());
        assert!(!session.attachments.is_loading());

        // moving within the same chapter keeps the fetch valid
        session.select(5, &mut NoPersistence);
        let for_second = session.load_attachments().unwrap();
        session.select(4, &mut NoPersistence);
        assert!(session.finish_attachment_load(for_second, Ok(vec![pdf("b", 4)])));
        assert_eq!(session.attachments()[0].id, "b");
    }
}
