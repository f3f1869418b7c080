//! Single-line text field with a cursor.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Editable text field used by the add form.
///
/// The cursor is a char index into `value`, so multi-byte input is safe.
#[derive(Debug, Clone)]
pub struct TextInput {
    prompt: &'static str,
    value: String,
    cursor: usize,
    focused: bool,
}

impl TextInput {
    pub fn new(prompt: &'static str) -> Self {
        Self {
            prompt,
            value: String::new(),
            cursor: 0,
            focused: false,
        }
    }

    pub fn prompt(&self) -> &'static str {
        self.prompt
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in chars from the start of the value.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Clear the value and move the cursor home. Focus is unchanged.
    pub fn reset(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Apply an editing key. Returns false for keys the field ignores.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => {
                let at = self.byte_index(self.cursor);
                self.value.drain(..at);
                self.cursor = 0;
            }
            KeyCode::Char('k') if ctrl => {
                let at = self.byte_index(self.cursor);
                self.value.truncate(at);
            }
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
            }
            KeyCode::Delete if self.cursor < self.len() => {
                let at = self.byte_index(self.cursor);
                self.value.remove(at);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            _ => return false,
        }
        true
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.value
            .char_indices()
            .nth(chars)
            .map_or(self.value.len(), |(i, _)| i)
    }
}
