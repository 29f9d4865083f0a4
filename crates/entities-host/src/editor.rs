//! Editor access used by the suggestion controller.
//!
//! Positions are `(line, ch)` pairs where `ch` counts Unicode scalar values
//! from the start of the line.

use serde::{Deserialize, Serialize};

/// A cursor position inside the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct EditorPosition {
    pub line: usize,
    pub ch: usize,
}

impl EditorPosition {
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Synchronous editor surface owned by the host
pub trait Editor {
    /// Text of `line`, or an empty string past the end of the document
    fn get_line(&self, line: usize) -> String;

    fn get_cursor(&self) -> EditorPosition;

    /// Replace the text between `from` and `to` (exclusive) with `text`.
    /// An empty `text` deletes the range.
    fn replace_range(&mut self, text: &str, from: EditorPosition, to: EditorPosition);

    fn set_cursor(&mut self, pos: EditorPosition);
}

/// Line-buffer editor used by the CLI harness and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryEditor {
    lines: Vec<String>,
    cursor: EditorPosition,
}

impl MemoryEditor {
    pub fn new(text: &str) -> Self {
        let lines = text.split('\n').map(str::to_string).collect();
        Self {
            lines,
            cursor: EditorPosition::default(),
        }
    }

    /// Create an editor with the cursor placed at the end of the text
    pub fn with_cursor_at_end(text: &str) -> Self {
        let mut editor = Self::new(text);
        let line = editor.lines.len().saturating_sub(1);
        let ch = editor.lines[line].chars().count();
        editor.cursor = EditorPosition::new(line, ch);
        editor
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Byte offset into the whole document for a position, clamped to the text
    fn offset(&self, pos: EditorPosition) -> usize {
        let mut offset = 0;
        for (idx, line) in self.lines.iter().enumerate() {
            if idx == pos.line {
                return offset + char_to_byte(line, pos.ch);
            }
            offset += line.len() + 1;
        }
        offset.saturating_sub(1)
    }
}

fn char_to_byte(line: &str, ch: usize) -> usize {
    line.char_indices()
        .nth(ch)
        .map(|(idx, _)| idx)
        .unwrap_or(line.len())
}

impl Editor for MemoryEditor {
    fn get_line(&self, line: usize) -> String {
        self.lines.get(line).cloned().unwrap_or_default()
    }

    fn get_cursor(&self) -> EditorPosition {
        self.cursor
    }

    fn replace_range(&mut self, text: &str, from: EditorPosition, to: EditorPosition) {
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let mut document = self.text();
        let start = self.offset(from);
        let end = self.offset(to).max(start);
        document.replace_range(start..end, text);
        self.lines = document.split('\n').map(str::to_string).collect();
    }

    fn set_cursor(&mut self, pos: EditorPosition) {
        self.cursor = pos;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_range_single_line() {
        let mut editor = MemoryEditor::new("hello :smile world");
        editor.replace_range("😄", EditorPosition::new(0, 6), EditorPosition::new(0, 12));
        assert_eq!(editor.text(), "hello 😄 world");
    }

    #[test]
    fn test_replace_range_with_multibyte_prefix() {
        let mut editor = MemoryEditor::new("😄 @bob");
        editor.replace_range("[[Bob]]", EditorPosition::new(0, 2), EditorPosition::new(0, 6));
        assert_eq!(editor.text(), "😄 [[Bob]]");
    }

    #[test]
    fn test_replace_range_inserts_newlines() {
        let mut editor = MemoryEditor::new("first\n/note");
        editor.replace_range("> [!note]\n> ", EditorPosition::new(1, 0), EditorPosition::new(1, 5));
        assert_eq!(editor.line_count(), 3);
        assert_eq!(editor.get_line(1), "> [!note]");
        assert_eq!(editor.get_line(2), "> ");
    }

    #[test]
    fn test_empty_replacement_deletes() {
        let mut editor = MemoryEditor::new("abc/tpl");
        editor.replace_range("", EditorPosition::new(0, 3), EditorPosition::new(0, 7));
        assert_eq!(editor.text(), "abc");
    }

    #[test]
    fn test_cursor_at_end() {
        let editor = MemoryEditor::with_cursor_at_end("one\ntwo @x");
        assert_eq!(editor.get_cursor(), EditorPosition::new(1, 6));
        assert_eq!(editor.get_line(5), "");
    }
}
