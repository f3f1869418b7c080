//! Rendering for the editor screens.
//!
//! Reads state only. The route table is snapshotted once per frame so the
//! read lock is never held while drawing.

use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::config::Route;
use crate::editor::input::TextInput;
use crate::editor::state::{Editor, Screen, Status};

const SELECTED: Style = Style::new()
    .fg(Color::Rgb(0x7D, 0x56, 0xF4))
    .add_modifier(Modifier::BOLD);
const HELP: Style = Style::new().fg(Color::Rgb(0x77, 0x77, 0x77));
const ERROR: Style = Style::new().fg(Color::Red);

const LIST_HELP: [&str; 2] = [
    "↑/k up • ↓/j down • a add • d delete • D toggle active",
    "q quit editor (proxy keeps serving)",
];
const ADD_HELP: &str = "tab/↑/↓ switch field • enter next/save • esc cancel";

/// Draw the current screen.
pub fn draw(frame: &mut Frame, editor: &Editor) {
    match editor.screen() {
        Screen::List => draw_list(frame, editor),
        Screen::Add => draw_add(frame, editor),
    }
}

fn draw_list(frame: &mut Frame, editor: &Editor) {
    let routes = editor.config().routes().snapshot();
    let [header, title, body, status, help] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(LIST_HELP.len() as u16),
    ])
    .areas(frame.area());

    let port = Line::from(vec![
        Span::raw(format!("Port: {}", editor.config().port())),
        Span::styled(format!("  ({})", editor.config().file().display()), HELP),
    ]);
    frame.render_widget(Paragraph::new(port), header);
    frame.render_widget(Paragraph::new("Routes:"), title);

    if routes.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("  No routes. Press a to add one.", HELP)),
            body,
        );
    } else {
        let width = column_width(&routes, body.width);
        let items: Vec<ListItem> = routes.iter().map(|r| ListItem::new(row(r, width))).collect();
        let list = List::new(items)
            .highlight_symbol("> ")
            .highlight_style(SELECTED);
        let mut state = ListState::default().with_selected(Some(editor.selection()));
        frame.render_stateful_widget(list, body, &mut state);
    }

    frame.render_widget(status_line(editor.status()), status);
    let help_lines: Vec<Line> = LIST_HELP.iter().map(|h| Line::styled(*h, HELP)).collect();
    frame.render_widget(Paragraph::new(help_lines), help);
}

fn draw_add(frame: &mut Frame, editor: &Editor) {
    let form = editor.form();
    let [title, source, destination, _, status, help] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(Paragraph::new("Add route:"), title);
    render_input(frame, &form.source, source);
    render_input(frame, &form.destination, destination);
    frame.render_widget(status_line(editor.status()), status);
    frame.render_widget(Paragraph::new(Line::styled(ADD_HELP, HELP)), help);
}

fn render_input(frame: &mut Frame, input: &TextInput, area: Rect) {
    let prompt_style = if input.is_focused() {
        SELECTED
    } else {
        Style::new()
    };
    let line = Line::from(vec![
        Span::styled(input.prompt(), prompt_style),
        Span::raw(input.value()),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    if input.is_focused() {
        let offset = input.prompt().chars().count() + input.cursor();
        let x = area.x.saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
        if x < area.right() && area.y < area.bottom() {
            frame.set_cursor_position(Position::new(x, area.y));
        }
    }
}

fn status_line(status: Option<&Status>) -> Paragraph<'static> {
    match status {
        Some(Status::Info(message)) => Paragraph::new(message.clone()),
        Some(Status::Error(message)) => Paragraph::new(Span::styled(message.clone(), ERROR)),
        None => Paragraph::new(""),
    }
}

/// Width of the source column: the longest source, capped at half the viewport.
fn column_width(routes: &[Route], viewport: u16) -> usize {
    let longest = routes
        .iter()
        .map(|r| r.source.chars().count())
        .max()
        .unwrap_or(0);
    longest.min(usize::from(viewport / 2).saturating_sub(8))
}

fn row(route: &Route, width: usize) -> String {
    let flag = if route.active { 'A' } else { 'D' };
    format!("{} {:<width$} -> {}", flag, route.source, route.dest, width = width)
}
