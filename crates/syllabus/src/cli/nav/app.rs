//! Main event loop for the navigation TUI

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;

use super::keys::handle_key;
use super::state::{NavState, NavStores};
use super::ui::render;

/// Run the navigation TUI event loop
pub fn run(
    terminal: &mut DefaultTerminal,
    state: &mut NavState,
    stores: NavStores<'_>,
) -> io::Result<()> {
    state.sync_attachments(stores.attachments);

    loop {
        terminal.draw(|frame| render(frame, state))?;

        if state.should_quit {
            break;
        }

        // Handle events (with timeout for responsiveness)
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            handle_key(state, key, stores);
        }
    }

    Ok(())
}
