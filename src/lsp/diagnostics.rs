//! Convert serpent syntax errors and edits to LSP types

use tower_lsp::lsp_types::{self, Diagnostic, DiagnosticSeverity, NumberOrString, Position, Range};

use crate::format::{self, TextEdit};
use serpent_syntax::diagnostics::{Severity, SyntaxError};

/// Convert a byte offset to LSP Position (0-based line and character)
pub fn offset_to_position(source: &str, offset: usize) -> Position {
    let offset = offset.min(source.len());
    let mut line = 0u32;
    let mut col = 0u32;

    let mut chars = source.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if i >= offset {
            break;
        }
        let line_break = c == '\n' || (c == '\r' && chars.peek().is_none_or(|&(_, n)| n != '\n'));
        if line_break {
            line += 1;
            col = 0;
        } else if c != '\r' {
            col += 1;
        }
    }

    Position::new(line, col)
}

/// Convert a span to LSP Range
pub fn span_to_range(source: &str, start: usize, end: usize) -> Range {
    let start_pos = offset_to_position(source, start);
    let end_pos = offset_to_position(source, end.max(start + 1));
    Range::new(start_pos, end_pos)
}

fn severity_to_lsp(severity: Severity) -> DiagnosticSeverity {
    match severity {
        Severity::Error => DiagnosticSeverity::ERROR,
        Severity::Warning => DiagnosticSeverity::WARNING,
        Severity::Hint => DiagnosticSeverity::HINT,
    }
}

/// Convert a SyntaxError to LSP Diagnostic
pub fn syntax_error_to_diagnostic(error: &SyntaxError, source: &str) -> Diagnostic {
    Diagnostic {
        range: span_to_range(source, error.span.start, error.span.end),
        severity: Some(severity_to_lsp(error.severity)),
        code: Some(NumberOrString::String(error.code.as_str().to_string())),
        source: Some("serpent".to_string()),
        message: error.message.clone(),
        ..Default::default()
    }
}

/// LSP position to the formatter's position
pub fn position_from_lsp(position: Position) -> format::Position {
    format::Position::new(position.line as usize, position.character as usize)
}

fn position_to_lsp(position: format::Position) -> Position {
    Position::new(position.line as u32, position.character as u32)
}

/// Convert a formatter edit to an LSP edit
pub fn edit_to_lsp(edit: TextEdit) -> lsp_types::TextEdit {
    lsp_types::TextEdit {
        range: Range::new(position_to_lsp(edit.range.start), position_to_lsp(edit.range.end)),
        new_text: edit.new_text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpent_syntax::ast::Span;
    use serpent_syntax::diagnostics::ErrorCode;

    #[test]
    fn test_offset_to_position() {
        let source = "line 1\nline 2\nline 3";

        let pos = offset_to_position(source, 0);
        assert_eq!(pos.line, 0);
        assert_eq!(pos.character, 0);

        let pos = offset_to_position(source, 7); // Start of "line 2"
        assert_eq!(pos.line, 1);
        assert_eq!(pos.character, 0);

        let pos = offset_to_position(source, 10); // "e 2"
        assert_eq!(pos.line, 1);
        assert_eq!(pos.character, 3);
    }

    #[test]
    fn test_offset_to_position_carriage_returns() {
        let source = "a\rbc\r\nd";
        assert_eq!(offset_to_position(source, 3), Position::new(1, 1));
        assert_eq!(offset_to_position(source, 5), Position::new(1, 2));
        assert_eq!(offset_to_position(source, 6), Position::new(2, 0));
    }

    #[test]
    fn test_syntax_error_to_diagnostic() {
        let source = "x = 1\ny = $\n";
        let error = SyntaxError::new("unexpected character '$'", Span::new(10, 11), ErrorCode::UnexpectedCharacter);
        let diagnostic = syntax_error_to_diagnostic(&error, source);
        assert_eq!(diagnostic.range, Range::new(Position::new(1, 4), Position::new(1, 5)));
        assert_eq!(diagnostic.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(
            diagnostic.code,
            Some(NumberOrString::String("syntax::unexpected-character".to_string()))
        );
    }

    #[test]
    fn test_empty_span_gets_one_character() {
        let range = span_to_range("abc", 1, 1);
        assert_eq!(range, Range::new(Position::new(0, 1), Position::new(0, 2)));
    }

    #[test]
    fn test_edit_to_lsp() {
        let edit = TextEdit::new(
            format::TextRange::new(format::Position::new(2, 0), format::Position::new(2, 4)),
            "",
        );
        let lsp = edit_to_lsp(edit);
        assert_eq!(lsp.range, Range::new(Position::new(2, 0), Position::new(2, 4)));
        assert_eq!(lsp.new_text, "");
        assert_eq!(position_from_lsp(Position::new(3, 7)), format::Position::new(3, 7));
    }
}
