//! Current position in the projection.

use crate::error::Result;
use crate::expansion::ExpansionStore;
use crate::flatten::Projection;
use crate::notice::Notice;

/// Receives the flat index every time the cursor lands somewhere.
///
/// Fire-and-forget: an error is logged and surfaced as a notice, the cursor
/// keeps its new position.
pub trait PositionSink {
    /// Store the new position
    fn persist_position(&mut self, flat_index: usize) -> Result<()>;
}

impl<F> PositionSink for F
where
    F: FnMut(usize) -> Result<()>,
{
    fn persist_position(&mut self, flat_index: usize) -> Result<()> {
        self(flat_index)
    }
}

/// Sink that drops every position
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl PositionSink for NoPersistence {
    fn persist_position(&mut self, _flat_index: usize) -> Result<()> {
        Ok(())
    }
}

/// Navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    /// One row up
    Previous,
    /// One row down
    Next,
}

/// Where keyboard input currently goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyFocus {
    /// Keys drive the outline
    #[default]
    Outline,
    /// A text field has focus; navigation keys belong to it
    TextEntry,
}

/// Result of a cursor operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Out of range, clamped onto itself, or suppressed
    Ignored,
    /// The cursor is at the requested index. Carries the notice produced by
    /// a failed persistence call, if any.
    Selected {
        flat_index: usize,
        notice: Option<Notice>,
    },
}

impl SelectOutcome {
    /// Whether a row is selected
    pub fn is_selected(&self) -> bool {
        matches!(self, SelectOutcome::Selected { .. })
    }

    /// Take the notice out, if any
    pub fn into_notice(self) -> Option<Notice> {
        match self {
            SelectOutcome::Selected { notice, .. } => notice,
            SelectOutcome::Ignored => None,
        }
    }
}

/// Cursor over a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCursor {
    current: usize,
    auto_expand: bool,
    persist: bool,
}

impl Default for NavigationCursor {
    fn default() -> Self {
        Self {
            current: 0,
            auto_expand: true,
            persist: true,
        }
    }
}

impl NavigationCursor {
    /// Cursor with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `current`; no persistence is fired
    pub fn at(current: usize) -> Self {
        Self {
            current,
            ..Self::default()
        }
    }

    /// Builder: whether selecting expands the ancestors of the target
    pub fn with_auto_expand(mut self, auto_expand: bool) -> Self {
        self.auto_expand = auto_expand;
        self
    }

    /// Builder: whether the position sink is called at all
    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    /// Current flat index
    pub fn current(&self) -> usize {
        self.current
    }

    /// Move to `flat_index` if it is inside the projection.
    pub fn select_index(
        &mut self,
        flat_index: usize,
        projection: &Projection,
        expansion: &mut ExpansionStore,
        sink: &mut dyn PositionSink,
    ) -> SelectOutcome {
        if flat_index >= projection.len() {
            log::debug!(
                "Ignoring selection of {} (projection has {} records)",
                flat_index,
                projection.len()
            );
            return SelectOutcome::Ignored;
        }
        self.current = flat_index;
        if self.auto_expand {
            expansion.auto_expand_ancestors(projection, flat_index);
        }
        let notice = if self.persist {
            sink.persist_position(flat_index).err().map(|e| {
                log::warn!("Failed to persist position {}: {}", flat_index, e);
                Notice::warning(format!("Could not save your position: {}", e))
            })
        } else {
            None
        };
        SelectOutcome::Selected { flat_index, notice }
    }

    /// Move by `delta`, clamped to the projection. No wraparound.
    pub fn step(
        &mut self,
        delta: isize,
        projection: &Projection,
        expansion: &mut ExpansionStore,
        sink: &mut dyn PositionSink,
    ) -> SelectOutcome {
        if projection.is_empty() {
            return SelectOutcome::Ignored;
        }
        let last = projection.len() - 1;
        let target = self.current.saturating_add_signed(delta).min(last);
        if target == self.current {
            return SelectOutcome::Ignored;
        }
        self.select_index(target, projection, expansion, sink)
    }

    /// Previous/next unless a text field has focus
    pub fn handle_key(
        &mut self,
        key: NavKey,
        focus: KeyFocus,
        projection: &Projection,
        expansion: &mut ExpansionStore,
        sink: &mut dyn PositionSink,
    ) -> SelectOutcome {
        if focus == KeyFocus::TextEntry {
            return SelectOutcome::Ignored;
        }
        let delta = match key {
            NavKey::Previous => -1,
            NavKey::Next => 1,
        };
        self.step(delta, projection, expansion, sink)
    }

    /// Place the cursor without expanding or persisting
    pub fn jump_to(&mut self, flat_index: usize) {
        self.current = flat_index;
    }

    /// Pull the cursor back into `[0, len)` after an edit. Does not persist.
    pub fn clamp_to(&mut self, len: usize) -> bool {
        let clamped = self.current.min(len.saturating_sub(1));
        let changed = clamped != self.current;
        self.current = clamped;
        changed
    }
}
