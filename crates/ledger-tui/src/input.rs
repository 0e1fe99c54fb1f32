//! Single-line input: editing, cursor and command history.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press asks the reducer to do beyond editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Key was consumed by the editor (or ignored).
    None,
    /// Enter: the taken line.
    Submit(String),
}

/// Line editor state.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    text: String,
    /// Cursor position in chars.
    cursor: usize,
    /// Submitted lines, oldest first.
    pub history: Vec<String>,
    /// Current position in history (None = not navigating).
    pub history_index: Option<usize>,
    /// Draft text saved when navigating history.
    draft: Option<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    /// Takes the line for submission and records it in history.
    pub fn take(&mut self) -> String {
        let line = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.history_index = None;
        self.draft = None;
        if !line.trim().is_empty() && self.history.last() != Some(&line) {
            self.history.push(line.clone());
        }
        line
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map_or(self.text.len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn insert_str(&mut self, s: &str) {
        for ch in s.chars().filter(|c| !c.is_control()) {
            self.insert_char(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Deletes from line start to cursor.
    pub fn kill_to_start(&mut self) {
        let at = self.byte_index(self.cursor);
        self.text.replace_range(..at, "");
        self.cursor = 0;
    }

    /// Navigates up in command history.
    pub fn navigate_up(&mut self) {
        if self.history.is_empty() {
            return;
        }

        if self.history_index.is_none() {
            self.draft = Some(self.text.clone());
            self.history_index = Some(self.history.len() - 1);
        } else if let Some(idx) = self.history_index
            && idx > 0
        {
            self.history_index = Some(idx - 1);
        }

        if let Some(idx) = self.history_index
            && let Some(entry) = self.history.get(idx).cloned()
        {
            self.set_text(&entry);
        }
    }

    /// Navigates down in command history.
    pub fn navigate_down(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };

        if idx + 1 < self.history.len() {
            self.history_index = Some(idx + 1);
            if let Some(entry) = self.history.get(idx + 1).cloned() {
                self.set_text(&entry);
            }
        } else {
            let draft = self.draft.take().unwrap_or_default();
            self.history_index = None;
            self.set_text(&draft);
        }
    }
}

/// Applies an editing key. Keys the editor does not own return `None`.
pub fn handle_key(input: &mut InputState, key: KeyEvent) -> Option<InputAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => return Some(InputAction::Submit(input.take())),
        KeyCode::Char('a') if ctrl => input.move_home(),
        KeyCode::Char('e') if ctrl => input.move_end(),
        KeyCode::Char('u') if ctrl => input.kill_to_start(),
        KeyCode::Char(_) if ctrl => return None,
        KeyCode::Char(ch) => input.insert_char(ch),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        KeyCode::Up => input.navigate_up(),
        KeyCode::Down => input.navigate_down(),
        _ => return None,
    }
    Some(InputAction::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_str(input: &mut InputState, s: &str) {
        for ch in s.chars() {
            handle_key(input, key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_typing_and_submit() {
        let mut input = InputState::new();
        type_str(&mut input, "help");
        assert_eq!(
            handle_key(&mut input, key(KeyCode::Enter)),
            Some(InputAction::Submit("help".to_string()))
        );
        assert_eq!(input.text(), "");
        assert_eq!(input.history, vec!["help"]);
    }

    #[test]
    fn test_editing_keys_respect_multibyte_chars() {
        let mut input = InputState::new();
        type_str(&mut input, "héllo");
        handle_key(&mut input, key(KeyCode::Left));
        handle_key(&mut input, key(KeyCode::Left));
        handle_key(&mut input, key(KeyCode::Backspace));
        assert_eq!(input.text(), "hélo");
        handle_key(&mut input, key(KeyCode::Home));
        handle_key(&mut input, key(KeyCode::Delete));
        assert_eq!(input.text(), "élo");
        handle_key(&mut input, ctrl('e'));
        type_str(&mut input, "!");
        assert_eq!(input.text(), "élo!");
    }

    #[test]
    fn test_ctrl_u_kills_to_start() {
        let mut input = InputState::new();
        type_str(&mut input, "scan rABC");
        for _ in 0..4 {
            handle_key(&mut input, key(KeyCode::Left));
        }
        handle_key(&mut input, ctrl('u'));
        assert_eq!(input.text(), "rABC");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_history_navigation_restores_draft() {
        let mut input = InputState::new();
        for line in ["help", "ca"] {
            input.set_text(line);
            input.take();
        }
        type_str(&mut input, "dra");

        handle_key(&mut input, key(KeyCode::Up));
        assert_eq!(input.text(), "ca");
        handle_key(&mut input, key(KeyCode::Up));
        assert_eq!(input.text(), "help");
        handle_key(&mut input, key(KeyCode::Up));
        assert_eq!(input.text(), "help");
        handle_key(&mut input, key(KeyCode::Down));
        assert_eq!(input.text(), "ca");
        handle_key(&mut input, key(KeyCode::Down));
        assert_eq!(input.text(), "dra");
        assert_eq!(input.history_index, None);
    }

    #[test]
    fn test_blank_and_repeated_lines_skip_history() {
        let mut input = InputState::new();
        for line in ["  ", "help", "help"] {
            input.set_text(line);
            input.take();
        }
        assert_eq!(input.history, vec!["help"]);
    }

    #[test]
    fn test_unowned_keys_pass_through() {
        let mut input = InputState::new();
        assert_eq!(handle_key(&mut input, ctrl('o')), None);
        assert_eq!(handle_key(&mut input, key(KeyCode::PageUp)), None);
        assert_eq!(handle_key(&mut input, key(KeyCode::Esc)), None);
    }
}
