//! Text buffer for rename, filter and search input.

use serde::{Deserialize, Serialize};

use crate::key::KeyInput;

/// Where the caret lands when a rename buffer is seeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaretPolicy {
    /// Before the extension, so typing replaces the stem.
    #[default]
    Stem,
    /// After the last character.
    End,
}

/// What a key did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEdit {
    /// The text changed.
    Edited,
    /// Only the caret moved.
    Moved,
    /// The key is not a buffer key.
    Ignored,
}

/// An editable line with a caret. The caret is a byte offset that always
/// sits on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    raw: String,
    caret: usize,
}

impl TextBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text` with the caret at the end.
    pub fn with_text(text: &str) -> Self {
        Self {
            raw: text.to_string(),
            caret: text.len(),
        }
    }

    /// Seed a rename buffer with an entry name.
    ///
    /// With [`CaretPolicy::Stem`], a name with an extension gets the caret
    /// before its last dot. Dotfiles such as ".bashrc" count as having no
    /// extension.
    pub fn for_rename(name: &str, policy: CaretPolicy) -> Self {
        let caret = match policy {
            CaretPolicy::End => name.len(),
            CaretPolicy::Stem => stem_boundary(name),
        };
        Self {
            raw: name.to_string(),
            caret,
        }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.raw
    }

    /// Caret as a byte offset.
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Caret as a character count, for rendering.
    pub fn caret_chars(&self) -> usize {
        self.raw[..self.caret].chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Insert a character at the caret.
    pub fn insert(&mut self, c: char) {
        self.raw.insert(self.caret, c);
        self.caret += c.len_utf8();
    }

    /// Delete the character before the caret.
    pub fn backspace(&mut self) -> bool {
        match self.prev_boundary() {
            Some(prev) => {
                self.raw.replace_range(prev..self.caret, "");
                self.caret = prev;
                true
            }
            None => false,
        }
    }

    /// Delete the character at the caret.
    pub fn delete(&mut self) -> bool {
        match self.next_boundary() {
            Some(next) => {
                self.raw.replace_range(self.caret..next, "");
                true
            }
            None => false,
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.caret = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.caret = next;
        }
    }

    pub fn move_home(&mut self) {
        self.caret = 0;
    }

    pub fn move_end(&mut self) {
        self.caret = self.raw.len();
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.caret = 0;
    }

    /// Delete from the caret to the end.
    pub fn kill_to_end(&mut self) -> bool {
        let changed = self.caret < self.raw.len();
        self.raw.truncate(self.caret);
        changed
    }

    /// Delete the word before the caret.
    pub fn delete_word(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let before = self.raw[..self.caret].trim_end();
        let word_start = before
            .rfind(char::is_whitespace)
            .map(|i| i + 1)
            .unwrap_or(0);
        self.raw.replace_range(word_start..self.caret, "");
        self.caret = word_start;
        true
    }

    /// Apply an editing key.
    pub fn handle_key(&mut self, key: &KeyInput) -> BufferEdit {
        if let Some(c) = key.printable() {
            self.insert(c);
            return BufferEdit::Edited;
        }

        let edited = |changed: bool| {
            if changed {
                BufferEdit::Edited
            } else {
                BufferEdit::Moved
            }
        };

        match (key.key.as_str(), key.ctrl) {
            ("Backspace", false) => edited(self.backspace()),
            ("Delete", false) => edited(self.delete()),
            ("ArrowLeft", false) => {
                self.move_left();
                BufferEdit::Moved
            }
            ("ArrowRight", false) => {
                self.move_right();
                BufferEdit::Moved
            }
            ("Home", false) | ("a", true) => {
                self.move_home();
                BufferEdit::Moved
            }
            ("End", false) | ("e", true) => {
                self.move_end();
                BufferEdit::Moved
            }
            ("u", true) => {
                let changed = !self.raw.is_empty();
                self.clear();
                edited(changed)
            }
            ("k", true) => edited(self.kill_to_end()),
            ("w", true) => edited(self.delete_word()),
            _ => BufferEdit::Ignored,
        }
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.raw[..self.caret]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.raw[self.caret..]
            .chars()
            .next()
            .map(|c| self.caret + c.len_utf8())
    }
}

fn stem_boundary(name: &str) -> usize {
    match name.rfind('.') {
        Some(0) | None => name.len(),
        Some(i) => i,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_caret_policy() {
        assert_eq!(TextBuffer::for_rename("report.txt", CaretPolicy::Stem).caret(), 6);
        assert_eq!(TextBuffer::for_rename("archive.tar.gz", CaretPolicy::Stem).caret(), 11);
        assert_eq!(TextBuffer::for_rename(".bashrc", CaretPolicy::Stem).caret(), 7);
        assert_eq!(TextBuffer::for_rename("Makefile", CaretPolicy::Stem).caret(), 8);
        assert_eq!(TextBuffer::for_rename("report.txt", CaretPolicy::End).caret(), 10);
    }

    #[test]
    fn test_editing_keys() {
        let mut buffer = TextBuffer::for_rename("report.txt", CaretPolicy::Stem);
        assert_eq!(buffer.handle_key(&KeyInput::plain("s")), BufferEdit::Edited);
        assert_eq!(buffer.text(), "reports.txt");

        buffer.handle_key(&KeyInput::plain("Backspace"));
        buffer.handle_key(&KeyInput::plain("Backspace"));
        assert_eq!(buffer.text(), "repor.txt");

        buffer.handle_key(&KeyInput::ctrl("k"));
        assert_eq!(buffer.text(), "repor");

        buffer.handle_key(&KeyInput::ctrl("a"));
        buffer.handle_key(&KeyInput::plain("Delete"));
        assert_eq!(buffer.text(), "epor");

        assert_eq!(buffer.handle_key(&KeyInput::plain("F5")), BufferEdit::Ignored);
    }

    #[test]
    fn test_multibyte_characters() {
        let mut buffer = TextBuffer::with_text("naïve");
        buffer.move_left();
        buffer.move_left();
        buffer.backspace();
        assert_eq!(buffer.text(), "nave");
        assert_eq!(buffer.caret_chars(), 2);
        buffer.insert('é');
        assert_eq!(buffer.text(), "naéve");
    }

    #[test]
    fn test_delete_word() {
        let mut buffer = TextBuffer::with_text("quarterly report ");
        buffer.delete_word();
        assert_eq!(buffer.text(), "quarterly ");
        buffer.handle_key(&KeyInput::ctrl("u"));
        assert!(buffer.is_empty());
    }
}
