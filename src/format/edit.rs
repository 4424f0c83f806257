//! Text edits in editor coordinates.
//!
//! Lines and characters are zero-indexed, characters count Unicode scalar values. The tokenizer's
//! one-indexed lines are converted at the formatter boundary.

use std::fmt;

use serpent_syntax::lexer;

/// Zero-indexed position in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub character: usize,
}

impl Position {
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

/// Half-open range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
}

impl TextRange {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }
}

/// Replace `range` with `new_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(range: TextRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }
}

impl fmt::Display for TextEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{} {:?}",
            self.range.start.line + 1,
            self.range.start.character,
            self.range.end.line + 1,
            self.range.end.character,
            self.new_text
        )
    }
}

/// Byte offset of `position` in `text`, clamped to the line end and the text end.
///
/// Lines end at `\n`, `\r\n` or a lone `\r`.
pub fn offset_of(text: &str, position: Position) -> usize {
    offset_in(text, &lexer::line_starts(text), position)
}

fn offset_in(text: &str, starts: &[usize], position: Position) -> usize {
    let Some(&line_start) = starts.get(position.line) else {
        return text.len();
    };
    let content = &text[line_start..lexer::line_content_end(text, line_start)];
    let column = content
        .char_indices()
        .nth(position.character)
        .map_or(content.len(), |(i, _)| i);
    line_start + column
}

/// Apply non-overlapping edits to `text`.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let starts = lexer::line_starts(text);
    let mut resolved: Vec<(usize, usize, &str)> = edits
        .iter()
        .map(|e| {
            (
                offset_in(text, &starts, e.range.start),
                offset_in(text, &starts, e.range.end),
                e.new_text.as_str(),
            )
        })
        .collect();
    resolved.sort_by_key(|(start, _, _)| std::cmp::Reverse(*start));

    let mut out = text.to_string();
    for (start, end, new_text) in resolved {
        out.replace_range(start..end.max(start), new_text);
    }
    out
}
