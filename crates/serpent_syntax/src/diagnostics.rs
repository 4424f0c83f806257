//! Syntax diagnostics and the error-sink boundary.
//!
//! Everything in this crate reports problems through [`ErrorSink::add`]; there is no other side channel.
//! The collected [`SyntaxError`] values implement [`miette::Diagnostic`] so front ends can render them
//! with source context.

use std::fmt;

use miette::{Diagnostic, LabeledSpan};

use crate::ast::Span;

/// Stable classification of a syntax problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    UnexpectedCharacter,
    UnterminatedString,
    BadEscape,
    NonAsciiBytes,
    BadNumber,
    /// Close bracket with nothing open.
    UnmatchedBracket,
    /// Close bracket that does not match the innermost open bracket.
    MismatchedBracket,
    /// End of input with brackets still open.
    UnclosedBracket,
    IndentationError,
    InvalidSyntax,
    FStringComment,
    FStringBackslash,
    FStringBadConversion,
    FStringUnterminated,
    FStringEmptyExpression,
    FStringSingleCloseBrace,
    NestingTooDeep,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "syntax::unexpected-character",
            ErrorCode::UnterminatedString => "syntax::unterminated-string",
            ErrorCode::BadEscape => "syntax::bad-escape",
            ErrorCode::NonAsciiBytes => "syntax::non-ascii-bytes",
            ErrorCode::BadNumber => "syntax::bad-number",
            ErrorCode::UnmatchedBracket => "syntax::unmatched-bracket",
            ErrorCode::MismatchedBracket => "syntax::mismatched-bracket",
            ErrorCode::UnclosedBracket => "syntax::unclosed-bracket",
            ErrorCode::IndentationError => "syntax::indentation",
            ErrorCode::InvalidSyntax => "syntax::invalid",
            ErrorCode::FStringComment => "fstring::comment",
            ErrorCode::FStringBackslash => "fstring::backslash",
            ErrorCode::FStringBadConversion => "fstring::bad-conversion",
            ErrorCode::FStringUnterminated => "fstring::unterminated",
            ErrorCode::FStringEmptyExpression => "fstring::empty-expression",
            ErrorCode::FStringSingleCloseBrace => "fstring::single-close-brace",
            ErrorCode::NestingTooDeep => "syntax::nesting-too-deep",
        }
    }

    fn help(self) -> Option<&'static str> {
        match self {
            ErrorCode::FStringComment => Some("move the comment outside the f-string"),
            ErrorCode::FStringBackslash => Some("bind the value to a name before the f-string (allowed from Python 3.12)"),
            ErrorCode::FStringBadConversion => Some("valid conversions are !s, !r and !a"),
            ErrorCode::FStringSingleCloseBrace => Some("write `}}` for a literal brace"),
            ErrorCode::IndentationError => Some("dedent to a column used by an enclosing block"),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Hint,
    Warning,
    Error,
}

impl From<Severity> for miette::Severity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Hint => miette::Severity::Advice,
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        }
    }
}

/// A lexical or f-string syntax error with an absolute source span.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
    pub code: ErrorCode,
    pub severity: Severity,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, span: Span, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            span,
            code,
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

impl Diagnostic for SyntaxError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(self.severity.into())
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.code.help().map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let label = LabeledSpan::at(self.span.start..self.span.end.max(self.span.start), "here");
        Some(Box::new(std::iter::once(label)))
    }
}

// ============================================================================
// Error sink
// ============================================================================

/// Receiver for syntax errors.
///
/// Nested parses (f-string fields, format specifiers) all report into the same sink, with spans already
/// translated to absolute offsets.
pub trait ErrorSink {
    fn add(&mut self, message: String, span: Span, code: ErrorCode, severity: Severity);

    fn error(&mut self, message: &str, span: Span, code: ErrorCode) {
        self.add(message.to_string(), span, code, Severity::Error);
    }
}

impl ErrorSink for Vec<SyntaxError> {
    fn add(&mut self, message: String, span: Span, code: ErrorCode, severity: Severity) {
        self.push(SyntaxError {
            message,
            span,
            code,
            severity,
        });
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ErrorSink for NullSink {
    fn add(&mut self, _message: String, _span: Span, _code: ErrorCode, _severity: Severity) {}
}

/// Report `error` into any sink.
pub fn report(sink: &mut dyn ErrorSink, error: SyntaxError) {
    sink.add(error.message, error.span, error.code, error.severity);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<SyntaxError> = Vec::new();
        sink.error("bad", Span::new(1, 2), ErrorCode::BadNumber);
        report(
            &mut sink,
            SyntaxError::new("meh", Span::new(3, 4), ErrorCode::InvalidSyntax).with_severity(Severity::Warning),
        );
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0].code, ErrorCode::BadNumber);
        assert_eq!(sink[1].severity, Severity::Warning);
        assert_eq!(sink[0].to_string(), "bad");
    }

    #[test]
    fn test_diagnostic_metadata() {
        let err = SyntaxError::new("f-string: comments are not allowed", Span::new(5, 6), ErrorCode::FStringComment);
        assert_eq!(err.code().map(|c| c.to_string()).as_deref(), Some("fstring::comment"));
        assert_eq!(Diagnostic::severity(&err), Some(miette::Severity::Error));
        assert!(err.help().is_some());
        assert_eq!(err.labels().map(|l| l.count()), Some(1));
    }

    #[test]
    fn test_null_sink_discards() {
        let mut sink = NullSink;
        sink.error("ignored", Span::point(0), ErrorCode::InvalidSyntax);
    }
}
