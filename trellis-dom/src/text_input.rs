/// Editable value and caret state of a text control (`input`, `textarea`).
///
/// All positions are character offsets, not byte offsets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInputData {
    pub text: String,
    pub cursor: usize,
    /// Anchor position for selection. When Some and != cursor, text is selected.
    pub anchor: Option<usize>,
}

impl TextInputData {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self {
            text,
            cursor,
            anchor: None,
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Get the selection range as (start, end) where start <= end.
    pub fn selection(&self) -> Option<(usize, usize)> {
        self.anchor.and_then(|a| {
            if a != self.cursor {
                Some(if a < self.cursor {
                    (a, self.cursor)
                } else {
                    (self.cursor, a)
                })
            } else {
                None
            }
        })
    }

    /// The caret range; collapsed to `(cursor, cursor)` without a selection.
    pub fn range(&self) -> (usize, usize) {
        self.selection().unwrap_or((self.cursor, self.cursor))
    }

    /// Set the caret range, clamped to the text.
    pub fn set_range(&mut self, start: usize, end: usize) {
        let len = self.char_count();
        let end = end.min(len);
        let start = start.min(end);
        self.cursor = end;
        self.anchor = (start != end).then_some(start);
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Replace the whole value. The caret moves to the end unless the value is
    /// unchanged.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.text {
            return false;
        }
        self.text = text;
        self.cursor = self.char_count();
        self.anchor = None;
        true
    }

    /// Insert a string at the caret, replacing the selection if any.
    pub fn insert(&mut self, s: &str) {
        let (start, end) = self.range();
        let from = char_to_byte_index(&self.text, start);
        let to = char_to_byte_index(&self.text, end);
        self.text.replace_range(from..to, s);
        self.cursor = start + s.chars().count();
        self.anchor = None;
    }

    /// Delete the selection or the character before the caret.
    /// Returns true if text changed.
    pub fn delete_back(&mut self) -> bool {
        if self.selection().is_some() {
            self.insert("");
            return true;
        }
        if self.cursor == 0 {
            return false;
        }
        let from = char_to_byte_index(&self.text, self.cursor - 1);
        let to = char_to_byte_index(&self.text, self.cursor);
        self.text.replace_range(from..to, "");
        self.cursor -= 1;
        true
    }

    /// Delete the selection or the character after the caret.
    /// Returns true if text changed.
    pub fn delete_forward(&mut self) -> bool {
        if self.selection().is_some() {
            self.insert("");
            return true;
        }
        if self.cursor >= self.char_count() {
            return false;
        }
        let from = char_to_byte_index(&self.text, self.cursor);
        let to = char_to_byte_index(&self.text, self.cursor + 1);
        self.text.replace_range(from..to, "");
        true
    }

    /// Move the caret by `delta` characters, collapsing any selection.
    pub fn move_cursor(&mut self, delta: isize) {
        if let Some((start, end)) = self.selection() {
            self.cursor = if delta < 0 { start } else { end };
            self.clear_selection();
            return;
        }
        let len = self.char_count();
        self.cursor = self.cursor.saturating_add_signed(delta).min(len);
    }

    pub fn move_to_start(&mut self) {
        self.cursor = 0;
        self.clear_selection();
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.char_count();
        self.clear_selection();
    }
}

fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_at_cursor() {
        let mut data = TextInputData::new("hello");
        data.set_range(3, 3);
        data.insert("x");
        assert_eq!(data.text, "helxlo");
        assert_eq!(data.range(), (4, 4));
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut data = TextInputData::new("hello");
        data.set_range(1, 4);
        data.insert("EY");
        assert_eq!(data.text, "hEYo");
        assert_eq!(data.range(), (3, 3));
    }

    #[test]
    fn test_delete_back_multibyte() {
        let mut data = TextInputData::new("añb");
        data.set_range(2, 2);
        assert!(data.delete_back());
        assert_eq!(data.text, "ab");
        assert_eq!(data.cursor, 1);
    }

    #[test]
    fn test_delete_at_edges() {
        let mut data = TextInputData::new("ab");
        data.move_to_start();
        assert!(!data.delete_back());
        data.move_to_end();
        assert!(!data.delete_forward());
    }

    #[test]
    fn test_set_text_moves_caret_to_end() {
        let mut data = TextInputData::new("abc");
        data.set_range(1, 1);
        assert!(!data.set_text("abc"));
        assert_eq!(data.cursor, 1);
        assert!(data.set_text("abcd"));
        assert_eq!(data.range(), (4, 4));
    }

    #[test]
    fn test_set_range_clamps() {
        let mut data = TextInputData::new("abc");
        data.set_range(7, 9);
        assert_eq!(data.range(), (3, 3));
        data.set_range(2, 1);
        assert_eq!(data.range(), (1, 1));
    }

    #[test]
    fn test_move_cursor_collapses_selection() {
        let mut data = TextInputData::new("hello");
        data.set_range(1, 3);
        data.move_cursor(-1);
        assert_eq!(data.range(), (1, 1));
        data.move_cursor(-5);
        assert_eq!(data.cursor, 0);
    }
}
