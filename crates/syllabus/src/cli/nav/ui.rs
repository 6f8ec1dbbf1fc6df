//! UI layout and widget rendering for the navigation TUI

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use syllabus_core::flatten::FlatRecord;

use super::state::{InputMode, NavState};
use crate::cli::util::format_size;

/// Render the full UI
pub fn render(frame: &mut Frame, state: &NavState) {
    // Main layout: content area + help bar at bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    // Content area: outline on left, preview on right
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[0]);

    render_outline(frame, state, content_chunks[0]);
    render_preview(frame, state, content_chunks[1]);
    render_help_bar(frame, state, main_chunks[1]);
}

fn bold(color: Color) -> Style {
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

/// One outline row: completion mark, fold marker, number and title
fn outline_row(state: &NavState, record: &FlatRecord) -> Line<'static> {
    let fold = if !record.node.has_children() {
        "  "
    } else if state.session.expansion().is_expanded(&record.folder_path) {
        "▾ "
    } else {
        "▸ "
    };
    let mark = if state.progress.is_completed(record.flat_index) {
        Span::styled("✓ ", Style::default().fg(Color::Green))
    } else {
        Span::raw("  ")
    };
    let number_style = if record.depth == 0 {
        bold(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    Line::from(vec![
        mark,
        Span::raw("  ".repeat(record.depth)),
        Span::raw(fold),
        Span::styled(format!("{} ", record.display_number()), number_style),
        Span::raw(record.node.title.clone()),
    ])
}

/// Render the outline list
fn render_outline(frame: &mut Frame, state: &NavState, area: Rect) {
    let items: Vec<ListItem> = state
        .session
        .visible()
        .into_iter()
        .map(|record| ListItem::new(outline_row(state, record)))
        .collect();

    let dirty = if state.session.is_dirty() { " *" } else { "" };
    let title = format!(
        " {}{} ({}%) ",
        state.course_title, dirty, state.progress.progress
    );

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default().with_selected(state.selected_row());
    frame.render_stateful_widget(list, area, &mut list_state);
}

/// Render the preview pane: header, lesson content and chapter attachments
fn render_preview(frame: &mut Frame, state: &NavState, area: Rect) {
    let attachment_rows = state.session.attachments().len().min(5) as u16;
    let preview_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(attachment_rows + 2),
        ])
        .split(area);

    render_preview_header(frame, state, preview_chunks[0]);
    render_preview_content(frame, state, preview_chunks[1]);
    render_attachments(frame, state, preview_chunks[2]);
}

fn render_preview_header(frame: &mut Frame, state: &NavState, area: Rect) {
    let (title, detail) = match state.current() {
        Some(record) => {
            let children = record.node.children.len();
            let detail = if children == 0 {
                format!("Lesson {}", record.display_number())
            } else {
                format!("Lesson {} · {} sublessons", record.display_number(), children)
            };
            (record.node.title.clone(), detail)
        }
        None => ("(No lessons)".to_string(), "Press a to add a chapter".to_string()),
    };

    let header_lines = vec![
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("  ", Style::default()),
            Span::styled(detail, Style::default().fg(Color::DarkGray)),
        ]),
    ];

    let header = Paragraph::new(header_lines).block(
        Block::default()
            .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
            .border_style(Style::default().fg(Color::Blue)),
    );

    frame.render_widget(header, area);
}

fn render_preview_content(frame: &mut Frame, state: &NavState, area: Rect) {
    let body = state
        .current()
        .map(|record| record.node.content.as_str())
        .unwrap_or("");
    let content = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::RIGHT)
                .border_style(Style::default().fg(Color::Blue)),
        )
        .wrap(Wrap { trim: false })
        .scroll((state.preview_scroll, 0));

    frame.render_widget(content, area);
}

fn render_attachments(frame: &mut Frame, state: &NavState, area: Rect) {
    let attachments = state.session.attachments();
    let lines: Vec<Line> = if attachments.is_empty() {
        vec![Line::from(Span::styled(
            "  No attachments",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        attachments
            .iter()
            .map(|a| {
                Line::from(vec![
                    Span::raw(format!("  {} ", a.original_name)),
                    Span::styled(
                        format!("{} {}", a.mime_type, format_size(a.size)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ])
            })
            .collect()
    };

    let block = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Attachments ")
            .border_style(Style::default().fg(Color::Blue)),
    );
    frame.render_widget(block, area);
}

/// Render the help bar at the bottom, adapting to current input mode
fn render_help_bar(frame: &mut Frame, state: &NavState, area: Rect) {
    let line = match &state.mode {
        InputMode::Normal => render_normal_help(state),
        InputMode::TextInput {
            prompt,
            buffer,
            cursor,
            ..
        } => render_text_input_help(prompt, buffer, *cursor),
        InputMode::Confirm { message, .. } => render_confirm_help(message),
    };

    let help_bar = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(help_bar, area);
}

/// Status message if one is set, otherwise key hints
fn render_normal_help(state: &NavState) -> Line<'static> {
    if let Some((msg, is_error)) = &state.status_message {
        let color = if *is_error { Color::Red } else { Color::Green };
        return Line::from(vec![
            Span::raw(" "),
            Span::styled(msg.clone(), bold(color)),
        ]);
    }

    let hints = [
        (" j/k", "nav"),
        ("Space", "fold"),
        ("a/A", "add"),
        ("e/E", "edit"),
        ("J/K", "move"),
        ("x", "del"),
        ("c", "done"),
        ("w", "write"),
        ("q", "quit"),
    ];
    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(key, bold(Color::Cyan)));
        spans.push(Span::raw(format!(": {}  ", label)));
    }
    Line::from(spans)
}

/// Prompt and editable buffer with a block cursor
fn render_text_input_help(prompt: &str, buffer: &str, cursor: usize) -> Line<'static> {
    let before: String = buffer.chars().take(cursor).collect();
    let cursor_char = buffer
        .chars()
        .nth(cursor)
        .map(String::from)
        .unwrap_or_else(|| " ".to_string());
    let after: String = buffer.chars().skip(cursor + 1).collect();

    Line::from(vec![
        Span::styled(format!(" {}: ", prompt), bold(Color::Yellow)),
        Span::raw(before),
        Span::styled(
            cursor_char,
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(after),
        Span::styled("  Esc", Style::default().fg(Color::DarkGray)),
        Span::styled(": cancel", Style::default().fg(Color::DarkGray)),
    ])
}

fn render_confirm_help(message: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {} ", message), bold(Color::Yellow)),
        Span::styled("y", bold(Color::Green)),
        Span::raw("/"),
        Span::styled("n", bold(Color::Red)),
    ])
}
