//! Editor state machine.
//!
//! # States
//! ```text
//!            a                      enter (dest, saved)
//!   List ─────────▶ Add ──────────────────────────────▶ List
//!    │               │  esc / ctrl+c (form discarded)    ▲
//!    │               └───────────────────────────────────┘
//!    │ q / ctrl+c
//!    ▼
//!   (session ends, proxy keeps serving)
//! ```
//!
//! # Design Decisions
//! - The table is only touched through `Config`, under its lock; the editor
//!   never keeps a private copy beyond a per-frame snapshot
//! - Persistence errors are shown in the status line and logged; the
//!   in-memory change stays applied
//! - A failed save on the add form keeps the form open with its input;
//!   submitting again rewrites that same route instead of appending another
//! - Load-time validation warnings open the session in the status line, since
//!   the log may not be visible while the editor owns the terminal

use std::sync::Arc;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::{Config, EditError};
use crate::editor::input::TextInput;

/// Which screen is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Add,
}

/// Result of handling one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Field of the add form holding keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Source,
    Destination,
}

/// Last message for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// Two-field form for a new route.
#[derive(Debug, Clone)]
pub struct AddForm {
    pub source: TextInput,
    pub destination: TextInput,
    focus: Focus,
}

impl AddForm {
    fn new() -> Self {
        Self {
            source: TextInput::new("Source: "),
            destination: TextInput::new("Destination: "),
            focus: Focus::Source,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Clear both fields and focus the source field.
    fn reset(&mut self) {
        self.source.reset();
        self.destination.reset();
        self.set_focus(Focus::Source);
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        match focus {
            Focus::Source => {
                self.destination.blur();
                self.source.focus();
            }
            Focus::Destination => {
                self.source.blur();
                self.destination.focus();
            }
        }
    }

    fn toggle_focus(&mut self) {
        match self.focus {
            Focus::Source => self.set_focus(Focus::Destination),
            Focus::Destination => self.set_focus(Focus::Source),
        }
    }

    fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            Focus::Source => &mut self.source,
            Focus::Destination => &mut self.destination,
        }
    }
}

/// Interactive editor session over a shared configuration.
#[derive(Debug)]
pub struct Editor {
    config: Arc<Config>,
    screen: Screen,
    selection: usize,
    form: AddForm,
    width: u16,
    height: u16,
    status: Option<Status>,
    /// Index of a route added from the open form whose save failed.
    unsaved: Option<usize>,
}

impl Editor {
    pub fn new(config: Arc<Config>) -> Self {
        let status = match config.load_warnings() {
            [] => None,
            [first, rest @ ..] => Some(Status::Error(format!(
                "{} warning(s) in {}: {}",
                rest.len() + 1,
                config.file().display(),
                first
            ))),
        };

        Self {
            config,
            screen: Screen::List,
            selection: 0,
            form: AddForm::new(),
            width: 0,
            height: 0,
            status,
            unsaved: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn form(&self) -> &AddForm {
        &self.form
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    /// Viewport size from the last resize event.
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    /// Process one terminal event.
    pub fn handle_event(&mut self, event: &Event) -> Flow {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match self.screen {
                Screen::List => self.handle_list_key(key),
                Screen::Add => self.handle_add_key(key),
            },
            Event::Resize(width, height) => {
                self.resize(*width, *height);
                Flow::Continue
            }
            _ => Flow::Continue,
        }
    }

    fn handle_list_key(&mut self, key: &KeyEvent) -> Flow {
        if is_ctrl_c(key) {
            return Flow::Quit;
        }

        match key.code {
            KeyCode::Char('q') => return Flow::Quit,
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('D') => self.toggle_selected(),
            KeyCode::Char('a') => self.open_add_form(),
            _ => {}
        }
        Flow::Continue
    }

    fn handle_add_key(&mut self, key: &KeyEvent) -> Flow {
        if is_ctrl_c(key) {
            self.close_add_form();
            return Flow::Continue;
        }

        match key.code {
            KeyCode::Esc => self.close_add_form(),
            KeyCode::Up | KeyCode::BackTab => self.form.toggle_focus(),
            KeyCode::Down | KeyCode::Tab => self.form.toggle_focus(),
            KeyCode::Enter => match self.form.focus() {
                Focus::Source => self.form.set_focus(Focus::Destination),
                Focus::Destination => self.submit_form(),
            },
            _ => {
                self.form.focused_mut().handle_key(key);
            }
        }
        Flow::Continue
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.config.routes().len();
        if len == 0 {
            self.selection = 0;
            return;
        }
        self.selection = self.selection.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_selection(&mut self) {
        let len = self.config.routes().len();
        self.selection = self.selection.min(len.saturating_sub(1));
    }

    fn delete_selected(&mut self) {
        if self.config.routes().is_empty() {
            return;
        }

        match self.config.delete_route(self.selection) {
            Ok(route) => {
                tracing::info!(source = %route.source, dest = %route.dest, "Route deleted");
                self.status = Some(Status::Info(format!("Deleted {}", route.source)));
            }
            Err(e) => self.report(e),
        }
        self.clamp_selection();
    }

    fn toggle_selected(&mut self) {
        if self.config.routes().is_empty() {
            return;
        }

        match self.config.toggle_route(self.selection) {
            Ok(active) => {
                tracing::info!(index = self.selection, active, "Route toggled");
                let state = if active { "Activated" } else { "Deactivated" };
                self.status = Some(Status::Info(format!("{} route {}", state, self.selection + 1)));
            }
            Err(e) => self.report(e),
        }
    }

    fn open_add_form(&mut self) {
        self.form.reset();
        self.unsaved = None;
        self.status = None;
        self.screen = Screen::Add;
    }

    fn close_add_form(&mut self) {
        self.form.reset();
        self.unsaved = None;
        self.screen = Screen::List;
    }

    fn submit_form(&mut self) {
        let source = self.form.source.value().trim().to_string();
        let dest = self.form.destination.value().trim().to_string();
        if source.is_empty() || dest.is_empty() {
            self.status = Some(Status::Error("Source and destination are required".into()));
            return;
        }

        let result = match self.unsaved {
            Some(index) => self.config.replace_route(index, &source, &dest).map(|()| index),
            None => self.config.add_route(&source, &dest),
        };

        match result {
            Ok(index) => {
                tracing::info!(source = %source, dest = %dest, "Route added");
                self.selection = index;
                self.status = Some(Status::Info(format!("Added {} (inactive, press D to activate)", source)));
                self.close_add_form();
            }
            Err(e) => {
                // The route is in the table already; a resubmit only retries the save
                if let EditError::Persist(_) = e {
                    let last = self.config.routes().len().saturating_sub(1);
                    self.unsaved = Some(self.unsaved.unwrap_or(last));
                } else {
                    self.unsaved = None;
                }
                self.report(e);
            }
        }
    }

    fn report(&mut self, error: EditError) {
        tracing::error!(error = %error, "Route table edit failed");
        self.status = Some(Status::Error(error.to_string()));
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Route;
    use std::path::PathBuf;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("portal-editor-{}.json", uuid::Uuid::new_v4()))
    }

    fn unwritable_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("portal-missing-{}", uuid::Uuid::new_v4()))
            .join("config.json")
    }

    fn route(source: &str, dest: &str, active: bool) -> Route {
        Route {
            source: source.into(),
            dest: dest.into(),
            active,
        }
    }

    fn editor_at(path: PathBuf, routes: Vec<Route>) -> Editor {
        Editor::new(Arc::new(Config::new(path, 8080, routes)))
    }

    fn press(editor: &mut Editor, code: KeyCode) -> Flow {
        editor.handle_event(&Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl_c(editor: &mut Editor) -> Flow {
        editor.handle_event(&Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
    }

    fn type_str(editor: &mut Editor, text: &str) {
        for c in text.chars() {
            press(editor, KeyCode::Char(c));
        }
    }

    fn three_routes() -> Vec<Route> {
        vec![
            route("a.com", "http://1", true),
            route("b.com", "http://2", false),
            route("c.com", "http://3", true),
        ]
    }

    #[test]
    fn test_quit_keys_on_list() {
        let mut editor = editor_at(temp_path(), Vec::new());
        assert_eq!(press(&mut editor, KeyCode::Char('q')), Flow::Quit);

        let mut editor = editor_at(temp_path(), Vec::new());
        assert_eq!(ctrl_c(&mut editor), Flow::Quit);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut editor = editor_at(temp_path(), three_routes());

        press(&mut editor, KeyCode::Up);
        assert_eq!(editor.selection(), 0);

        for _ in 0..5 {
            press(&mut editor, KeyCode::Down);
        }
        assert_eq!(editor.selection(), 2);

        press(&mut editor, KeyCode::Char('k'));
        assert_eq!(editor.selection(), 1);
    }

    #[test]
    fn test_empty_table_keys_are_noops() {
        let path = temp_path();
        let mut editor = editor_at(path.clone(), Vec::new());

        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Char('d'));
        press(&mut editor, KeyCode::Char('D'));

        assert_eq!(editor.selection(), 0);
        assert_eq!(editor.status(), None);
        assert!(!path.exists());
    }

    #[test]
    fn test_delete_last_clamps_selection() {
        let path = temp_path();
        let mut editor = editor_at(path.clone(), three_routes());

        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Char('d'));

        assert_eq!(editor.selection(), 1);
        assert_eq!(editor.config().routes().len(), 2);
        assert_eq!(editor.screen(), Screen::List);

        let saved = Config::load(&path).unwrap();
        assert_eq!(
            saved.routes().snapshot(),
            vec![route("a.com", "http://1", true), route("b.com", "http://2", false)]
        );
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_toggle_twice_restores_and_saves() {
        let path = temp_path();
        let mut editor = editor_at(path.clone(), three_routes());

        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Char('D'));
        assert_eq!(editor.config().routes().lookup("b.com").as_deref(), Some("http://2"));
        assert_eq!(Config::load(&path).unwrap().routes().active_count(), 3);

        press(&mut editor, KeyCode::Char('D'));
        assert_eq!(editor.config().routes().lookup("b.com"), None);
        assert_eq!(Config::load(&path).unwrap().routes().active_count(), 2);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_save_failure_is_reported_and_applied() {
        let mut editor = editor_at(unwritable_path(), three_routes());

        press(&mut editor, KeyCode::Down);
        press(&mut editor, KeyCode::Char('D'));

        assert!(matches!(editor.status(), Some(Status::Error(_))));
        assert_eq!(editor.screen(), Screen::List);
        assert_eq!(editor.config().routes().lookup("B.COM").as_deref(), Some("http://2"));
    }

    #[test]
    fn test_add_route_flow() {
        let path = temp_path();
        let mut editor = editor_at(path.clone(), three_routes());

        press(&mut editor, KeyCode::Char('a'));
        assert_eq!(editor.screen(), Screen::Add);
        assert_eq!(editor.form().focus(), Focus::Source);
        assert!(editor.form().source.is_focused());

        type_str(&mut editor, "New.com");
        press(&mut editor, KeyCode::Enter);
        assert_eq!(editor.form().focus(), Focus::Destination);

        type_str(&mut editor, "http://4");
        press(&mut editor, KeyCode::Enter);

        assert_eq!(editor.screen(), Screen::List);
        assert_eq!(editor.selection(), 3);

        let routes = editor.config().routes().snapshot();
        assert_eq!(routes.last(), Some(&route("new.com", "http://4", false)));
        assert_eq!(Config::load(&path).unwrap().routes().len(), 4);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_add_form_is_reset_on_open() {
        let mut editor = editor_at(temp_path(), Vec::new());

        press(&mut editor, KeyCode::Char('a'));
        type_str(&mut editor, "left.over");
        press(&mut editor, KeyCode::Tab);
        type_str(&mut editor, "http://x");
        press(&mut editor, KeyCode::Esc);

        press(&mut editor, KeyCode::Char('a'));
        assert_eq!(editor.form().source.value(), "");
        assert_eq!(editor.form().destination.value(), "");
        assert_eq!(editor.form().focus(), Focus::Source);
    }

    #[test]
    fn test_escape_discards_without_mutation() {
        let path = temp_path();
        let mut editor = editor_at(path.clone(), three_routes());

        press(&mut editor, KeyCode::Char('a'));
        type_str(&mut editor, "x.com");
        press(&mut editor, KeyCode::Esc);

        assert_eq!(editor.screen(), Screen::List);
        assert_eq!(editor.config().routes().len(), 3);
        assert!(!path.exists());
    }

    #[test]
    fn test_ctrl_c_on_add_returns_to_list() {
        let mut editor = editor_at(temp_path(), Vec::new());

        press(&mut editor, KeyCode::Char('a'));
        assert_eq!(ctrl_c(&mut editor), Flow::Continue);
        assert_eq!(editor.screen(), Screen::List);
    }

    #[test]
    fn test_list_keys_are_text_on_add() {
        let mut editor = editor_at(temp_path(), Vec::new());

        press(&mut editor, KeyCode::Char('a'));
        assert_eq!(press(&mut editor, KeyCode::Char('q')), Flow::Continue);
        type_str(&mut editor, "dD");

        assert_eq!(editor.screen(), Screen::Add);
        assert_eq!(editor.form().source.value(), "qdD");
    }

    #[test]
    fn test_focus_cycling() {
        let mut editor = editor_at(temp_path(), Vec::new());
        press(&mut editor, KeyCode::Char('a'));

        press(&mut editor, KeyCode::Down);
        assert_eq!(editor.form().focus(), Focus::Destination);
        press(&mut editor, KeyCode::Tab);
        assert_eq!(editor.form().focus(), Focus::Source);
        press(&mut editor, KeyCode::BackTab);
        assert_eq!(editor.form().focus(), Focus::Destination);
        press(&mut editor, KeyCode::Up);
        assert_eq!(editor.form().focus(), Focus::Source);
        assert!(!editor.form().destination.is_focused());
    }

    #[test]
    fn test_empty_fields_are_rejected() {
        let path = temp_path();
        let mut editor = editor_at(path.clone(), Vec::new());

        press(&mut editor, KeyCode::Char('a'));
        type_str(&mut editor, "only-source.com");
        press(&mut editor, KeyCode::Enter);
        press(&mut editor, KeyCode::Enter);

        assert_eq!(editor.screen(), Screen::Add);
        assert!(matches!(editor.status(), Some(Status::Error(_))));
        assert!(editor.config().routes().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_add_save_failure_keeps_form() {
        let mut editor = editor_at(unwritable_path(), Vec::new());

        press(&mut editor, KeyCode::Char('a'));
        type_str(&mut editor, "a.com");
        press(&mut editor, KeyCode::Enter);
        type_str(&mut editor, "http://1");
        press(&mut editor, KeyCode::Enter);

        assert_eq!(editor.screen(), Screen::Add);
        assert!(matches!(editor.status(), Some(Status::Error(_))));
        assert_eq!(editor.form().source.value(), "a.com");
        assert_eq!(editor.form().destination.value(), "http://1");

        // Applied in memory, inactive
        assert_eq!(editor.config().routes().snapshot(), vec![route("a.com", "http://1", false)]);
    }

    #[test]
    fn test_add_resubmit_after_failed_save_does_not_duplicate() {
        let mut editor = editor_at(unwritable_path(), vec![route("a.com", "http://1", true)]);

        press(&mut editor, KeyCode::Char('a'));
        type_str(&mut editor, "b.com");
        press(&mut editor, KeyCode::Enter);
        type_str(&mut editor, "http://2");
        press(&mut editor, KeyCode::Enter);
        press(&mut editor, KeyCode::Enter);

        assert_eq!(editor.screen(), Screen::Add);
        assert_eq!(editor.config().routes().len(), 2);

        // Edited input rewrites the same pending route
        press(&mut editor, KeyCode::Backspace);
        type_str(&mut editor, "3");
        press(&mut editor, KeyCode::Enter);
        assert_eq!(
            editor.config().routes().snapshot(),
            vec![route("a.com", "http://1", true), route("b.com", "http://3", false)]
        );
    }

    #[test]
    fn test_reopened_form_adds_a_new_route() {
        let mut editor = editor_at(unwritable_path(), Vec::new());

        for dest in ["http://1", "http://2"] {
            press(&mut editor, KeyCode::Char('a'));
            type_str(&mut editor, "a.com");
            press(&mut editor, KeyCode::Enter);
            type_str(&mut editor, dest);
            press(&mut editor, KeyCode::Enter);
            press(&mut editor, KeyCode::Esc);
        }

        assert_eq!(editor.config().routes().len(), 2);
    }

    #[test]
    fn test_load_warnings_open_in_status_line() {
        let path = temp_path();
        std::fs::write(
            &path,
            r#"{ "Port": 8080, "Routes": [
                { "source": "a.com", "dest": "http://1", "Active": true },
                { "source": "a.com", "dest": "http://2", "Active": true }
            ] }"#,
        )
        .unwrap();

        let editor = Editor::new(Arc::new(Config::load(&path).unwrap()));
        match editor.status() {
            Some(Status::Error(message)) => {
                assert!(message.starts_with("1 warning(s)"), "{}", message);
                assert!(message.contains("shadowed"), "{}", message);
            }
            other => panic!("unexpected status {:?}", other),
        }

        let clean = editor_at(temp_path(), Vec::new());
        assert_eq!(clean.status(), None);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_resize_only_updates_size() {
        let mut editor = editor_at(temp_path(), three_routes());
        press(&mut editor, KeyCode::Down);

        assert_eq!(editor.handle_event(&Event::Resize(120, 40)), Flow::Continue);
        assert_eq!(editor.size(), (120, 40));
        assert_eq!(editor.selection(), 1);
        assert_eq!(editor.screen(), Screen::List);
    }

    #[test]
    fn test_key_release_is_ignored() {
        let mut editor = editor_at(temp_path(), Vec::new());
        let mut release = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        assert_eq!(editor.handle_event(&Event::Key(release)), Flow::Continue);
    }
}
