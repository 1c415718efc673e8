use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Single-line text field used by the feedback form.
pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    max_chars: usize,
}

impl LineInput {
    pub fn new(text: &str, max_chars: usize) -> Self {
        let text: String = text.chars().take(max_chars).collect();
        let cursor = text.chars().count();
        Self {
            text,
            cursor,
            max_chars,
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// When cursor is at end of text, cursor_char is None.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        match self.text[byte_offset..].chars().next() {
            Some(ch) => {
                let next_byte = byte_offset + ch.len_utf8();
                (&self.text[..byte_offset], Some(ch), &self.text[next_byte..])
            }
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.len());
            }
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.remove_at(self.cursor - 1);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.text.clear();
                self.cursor = 0;
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.len() < self.max_chars {
                    let byte_offset = self.char_to_byte(self.cursor);
                    self.text.insert(byte_offset, ch);
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        InputResult::Continue
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn remove_at(&mut self, char_idx: usize) {
        let byte_offset = self.char_to_byte(char_idx);
        if let Some(ch) = self.text[byte_offset..].chars().next() {
            self.text
                .replace_range(byte_offset..byte_offset + ch.len_utf8(), "");
        }
    }

    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut LineInput, s: &str) {
        for ch in s.chars() {
            input.handle(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = LineInput::new("", 100);
        type_str(&mut input, "great quiz");
        assert_eq!(input.value(), "great quiz");
        input.handle(key(KeyCode::Backspace));
        assert_eq!(input.value(), "great qui");
    }

    #[test]
    fn insert_in_middle_with_multibyte() {
        let mut input = LineInput::new("caf", 100);
        type_str(&mut input, "é!");
        input.handle(key(KeyCode::Home));
        input.handle(key(KeyCode::Delete));
        assert_eq!(input.value(), "afé!");
        let (before, cur, after) = input.render_parts();
        assert_eq!(before, "");
        assert_eq!(cur, Some('a'));
        assert_eq!(after, "fé!");
    }

    #[test]
    fn respects_max_chars() {
        let mut input = LineInput::new("", 3);
        type_str(&mut input, "abcdef");
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn ctrl_u_clears() {
        let mut input = LineInput::new("hello", 100);
        input.handle(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
        assert!(input.is_empty());
        assert_eq!(input.render_parts(), ("", None, ""));
    }

    #[test]
    fn enter_and_esc_report_results() {
        let mut input = LineInput::new("", 10);
        assert_eq!(input.handle(key(KeyCode::Enter)), InputResult::Submit);
        assert_eq!(input.handle(key(KeyCode::Esc)), InputResult::Cancel);
        assert_eq!(input.handle(key(KeyCode::Char('x'))), InputResult::Continue);
    }
}
