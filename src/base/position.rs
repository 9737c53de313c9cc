//! Line/column tracking for source text.
//!
//! Offsets inside the crate are byte-based [`TextSize`] values. Diagnostics
//! and tokens report human-facing positions, so [`LineIndex`] converts
//! between the two. Columns count characters, not bytes.

use text_size::{TextRange, TextSize};

/// A zero-indexed line/column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LineCol {
    pub line: u32,
    pub col: u32,
}

impl LineCol {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// One-based `(line, column)` as printed in diagnostics.
    pub fn one_based(self) -> (u32, u32) {
        (self.line + 1, self.col + 1)
    }
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the first character of every line.
    line_starts: Vec<TextSize>,
    text: String,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self {
            line_starts,
            text: text.to_string(),
        }
    }

    /// Number of lines (a trailing newline opens an empty last line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a byte offset into a zero-indexed line/column.
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn line_col(&self, offset: TextSize) -> LineCol {
        let offset = offset.min(TextSize::of(self.text.as_str()));
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let start = usize::from(self.line_starts[line]);
        let end = usize::from(offset);
        let col = self
            .text
            .get(start..end)
            .map(|s| s.chars().count())
            .unwrap_or(end - start);
        LineCol::new(line as u32, col as u32)
    }

    /// Convert a zero-indexed line/column back into a byte offset.
    pub fn offset(&self, pos: LineCol) -> Option<TextSize> {
        let start = *self.line_starts.get(pos.line as usize)?;
        let line_end = self
            .line_starts
            .get(pos.line as usize + 1)
            .copied()
            .unwrap_or_else(|| TextSize::of(self.text.as_str()));
        let line_text = &self.text[usize::from(start)..usize::from(line_end)];
        let mut offset = start;
        for (i, ch) in line_text.chars().enumerate() {
            if i == pos.col as usize {
                return Some(offset);
            }
            offset += TextSize::of(ch);
        }
        (line_text.chars().count() == pos.col as usize).then_some(offset)
    }

    /// Length of `range` in characters.
    pub fn char_len(&self, range: TextRange) -> u32 {
        self.text
            .get(usize::from(range.start())..usize::from(range.end()))
            .map(|s| s.chars().count() as u32)
            .unwrap_or_else(|| u32::from(range.len()))
    }
}
