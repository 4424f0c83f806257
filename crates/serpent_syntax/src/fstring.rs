//! F-string body parser.
//!
//! The tokenizer hands f-strings over undecoded ([`FStringLiteral`]). This module splits a body into
//! literal segments and `{expression!conversion:format_spec}` replacement fields, re-entering the expression
//! parser for each field and itself for each format specifier.
//!
//! ## Notes
//! - Every span is absolute: the body origin is carried into the sub-parsers.
//! - Structural problems (comment or, before 3.12, backslash in a field; bad conversion; unterminated or
//!   empty field; lone `}`) are reported to the sink and leave an [`Expr::Error`] or literal in place.
//! - Nesting shares the budget of [`crate::parser::MAX_NESTING_DEPTH`] with the expression parser.
//!
//! ## Examples
//! ```rust
//! use serpent_syntax::ast::Location;
//! use serpent_syntax::fstring::parse_fstring;
//! use serpent_core::PythonVersion;
//!
//! let mut errors = Vec::new();
//! let fstring = parse_fstring("{x:{width}}", Location::START, false, PythonVersion::LATEST, &mut errors);
//! assert!(errors.is_empty());
//! assert_eq!(fstring.formatted_values().count(), 1);
//! ```

use crate::ast::{Conversion, Expr, FString, FStringPart, FormattedValue, Location, Span, Spanned};
use crate::diagnostics::{ErrorCode, ErrorSink, Severity};
use crate::lexer::{FStringLiteral, decode_escapes};
use crate::parser::{self, MAX_NESTING_DEPTH};
use serpent_core::PythonVersion;

/// Parse an f-string body (the text between the quotes).
#[tracing::instrument(skip_all, fields(body_len = body.len(), version = %version))]
pub fn parse_fstring(
    body: &str,
    body_origin: Location,
    is_raw: bool,
    version: PythonVersion,
    sink: &mut dyn ErrorSink,
) -> FString {
    FStringParser::new(body, body_origin, is_raw, version).parse(sink)
}

/// Parse the body of an f-string token.
pub fn parse_literal(literal: &FStringLiteral, version: PythonVersion, sink: &mut dyn ErrorSink) -> FString {
    FStringParser::new(&literal.body, literal.body_start, literal.is_raw, version).parse(sink)
}

/// How scanning a replacement field's expression ended.
struct FieldExpr {
    end: usize,
    /// End of `expr=` plus trailing whitespace, for self-documenting fields.
    debug_end: Option<usize>,
}

/// A field that cannot be parsed; the rest of the field is skipped.
struct FieldError {
    code: ErrorCode,
    message: &'static str,
    at: usize,
}

/// Single-use parser over one f-string body. [`FStringParser::parse`] consumes it.
pub struct FStringParser<'a> {
    body: &'a str,
    origin: Location,
    is_raw: bool,
    version: PythonVersion,
    depth: usize,
    pos: usize,
}

impl<'a> FStringParser<'a> {
    pub fn new(body: &'a str, origin: Location, is_raw: bool, version: PythonVersion) -> Self {
        Self {
            body,
            origin,
            is_raw,
            version,
            depth: 0,
            pos: 0,
        }
    }

    /// Start at an existing nesting depth (an f-string inside a replacement field).
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn parse(mut self, sink: &mut dyn ErrorSink) -> FString {
        let whole = self.span(0, self.body.len());
        if self.depth >= MAX_NESTING_DEPTH {
            sink.error("f-string is nested too deeply", whole, ErrorCode::NestingTooDeep);
            return FString::new(Vec::new(), whole);
        }
        let parts = self.parts(sink, false);
        FString::new(parts, whole)
    }

    // ========================================================================
    // Positions
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.body[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.body[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.origin.offset + start, self.origin.offset + end)
    }

    /// Absolute location of a body position.
    fn location_at(&self, pos: usize) -> Location {
        let offset = self.origin.offset + pos;
        let starts = crate::lexer::line_starts(&self.body[..pos]);
        let line_start = starts.last().copied().unwrap_or(0);
        let column = self.body[line_start..pos].chars().count();
        match starts.len() {
            1 => Location::new(offset, self.origin.line, self.origin.column + column),
            n => Location::new(offset, self.origin.line + n - 1, column),
        }
    }

    // ========================================================================
    // Literal text
    // ========================================================================

    /// Literal segments and replacement fields until the end of the body, or (for a format specifier) the
    /// closing `}` of the enclosing field, which is left unconsumed.
    fn parts(&mut self, sink: &mut dyn ErrorSink, in_spec: bool) -> Vec<FStringPart> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut literal_start = self.pos;
        let mut chunk_start = self.pos;

        while let Some(c) = self.peek() {
            match c {
                '{' if !in_spec && self.peek_at(1) == Some('{') => {
                    self.decode_chunk(chunk_start, &mut literal, sink);
                    literal.push('{');
                    self.pos += 2;
                    chunk_start = self.pos;
                }
                '{' => {
                    self.decode_chunk(chunk_start, &mut literal, sink);
                    self.flush_literal(&mut parts, &mut literal, literal_start);
                    let value = self.replacement_field(sink);
                    parts.push(FStringPart::FormattedValue(value));
                    literal_start = self.pos;
                    chunk_start = self.pos;
                }
                '}' if in_spec => break,
                '}' => {
                    self.decode_chunk(chunk_start, &mut literal, sink);
                    if self.peek_at(1) == Some('}') {
                        self.pos += 2;
                    } else {
                        sink.error(
                            "f-string: single '}' is not allowed",
                            self.span(self.pos, self.pos + 1),
                            ErrorCode::FStringSingleCloseBrace,
                        );
                        self.pos += 1;
                    }
                    literal.push('}');
                    chunk_start = self.pos;
                }
                '\\' if !self.is_raw => {
                    self.bump();
                    // `\N{NAME}` braces are not a replacement field.
                    if self.peek() == Some('N') && self.peek_at(1) == Some('{') {
                        while let Some(n) = self.peek() {
                            self.bump();
                            if n == '}' {
                                break;
                            }
                        }
                    } else {
                        self.bump();
                    }
                }
                _ => self.bump(),
            }
        }

        self.decode_chunk(chunk_start, &mut literal, sink);
        self.flush_literal(&mut parts, &mut literal, literal_start);
        parts
    }

    /// Decode `body[start..pos]` onto `out`, reporting bad escapes as warnings.
    fn decode_chunk(&self, start: usize, out: &mut String, sink: &mut dyn ErrorSink) {
        let raw = &self.body[start..self.pos];
        if self.is_raw {
            out.push_str(raw);
            return;
        }
        let (decoded, errors) = decode_escapes(raw, true);
        out.push_str(&decoded);
        for e in errors {
            sink.add(
                e.message,
                self.span(start + e.start, start + e.end),
                ErrorCode::BadEscape,
                Severity::Warning,
            );
        }
    }

    fn flush_literal(&self, parts: &mut Vec<FStringPart>, literal: &mut String, start: usize) {
        if literal.is_empty() {
            return;
        }
        let text = std::mem::take(literal);
        parts.push(FStringPart::Literal(Spanned::new(text, self.span(start, self.pos))));
    }

    // ========================================================================
    // Replacement fields
    // ========================================================================

    /// `{expression[=][!conversion][:format_spec]}` starting at the current `{`.
    fn replacement_field(&mut self, sink: &mut dyn ErrorSink) -> FormattedValue {
        let open = self.pos;
        self.pos += 1; // {
        let expr_start = self.pos;

        let scanned = match self.scan_expression() {
            Ok(scanned) => scanned,
            Err(error) => return self.recover(open, expr_start, error, sink),
        };

        let text = &self.body[expr_start..scanned.end];
        let expression = if text.trim().is_empty() {
            sink.error(
                "f-string: empty expression not allowed",
                self.span(open, scanned.end + 1),
                ErrorCode::FStringEmptyExpression,
            );
            Spanned::new(Expr::Error, self.span(expr_start, scanned.end))
        } else {
            parser::parse_expression_at_depth(text, self.location_at(expr_start), self.version, sink, self.depth + 1)
        };
        let debug_text = scanned
            .debug_end
            .map(|end| self.body[expr_start..end].to_string());

        let mut conversion = None;
        if self.peek() == Some('!') {
            self.bump();
            let c = self.peek();
            match c.and_then(Conversion::from_char) {
                Some(conv) if matches!(self.peek_at(1), Some(':') | Some('}')) => {
                    conversion = Some(conv);
                    self.bump();
                }
                _ if c.is_none() => {}
                _ => {
                    let end = self.pos + c.map_or(0, char::len_utf8);
                    sink.error(
                        "f-string: invalid conversion character: expected 's', 'r', or 'a'",
                        self.span(self.pos, end),
                        ErrorCode::FStringBadConversion,
                    );
                    while self.peek().is_some_and(|c| c != ':' && c != '}') {
                        self.bump();
                    }
                }
            }
        }

        let mut format_spec = None;
        if self.peek() == Some(':') {
            self.bump();
            let spec_start = self.pos;
            if self.depth + 1 >= MAX_NESTING_DEPTH {
                sink.error(
                    "f-string: format specifier is nested too deeply",
                    self.span(spec_start, self.body.len()),
                    ErrorCode::NestingTooDeep,
                );
                self.skip_field_rest();
            } else {
                self.depth += 1;
                let parts = self.parts(sink, true);
                self.depth -= 1;
                format_spec = Some(FString::new(parts, self.span(spec_start, self.pos)));
            }
        }

        if self.peek() == Some('}') {
            self.bump();
        } else {
            sink.error(
                "f-string: expecting '}'",
                self.span(open, self.pos),
                ErrorCode::FStringUnterminated,
            );
        }

        FormattedValue {
            expression: Box::new(expression),
            conversion,
            format_spec,
            debug_text,
            span: self.span(open, self.pos),
        }
    }

    /// Find where the field's expression ends, honoring nested brackets and strings.
    fn scan_expression(&mut self) -> Result<FieldExpr, FieldError> {
        let mut brackets = 0usize;

        loop {
            let Some(c) = self.peek() else {
                return Err(FieldError {
                    code: ErrorCode::FStringUnterminated,
                    message: "f-string: expecting '}'",
                    at: self.pos,
                });
            };
            match c {
                '\'' | '"' => self.skip_nested_string(c)?,
                '#' => {
                    return Err(FieldError {
                        code: ErrorCode::FStringComment,
                        message: "f-string expression part cannot include '#'",
                        at: self.pos,
                    });
                }
                '\\' if !self.version.allows_backslash_in_fstring_expr() => {
                    return Err(FieldError {
                        code: ErrorCode::FStringBackslash,
                        message: "f-string expression part cannot include a backslash",
                        at: self.pos,
                    });
                }
                '(' | '[' | '{' => {
                    brackets += 1;
                    self.bump();
                }
                ')' | ']' | '}' if brackets > 0 => {
                    brackets -= 1;
                    self.bump();
                }
                '}' => {
                    return Ok(FieldExpr {
                        end: self.pos,
                        debug_end: None,
                    });
                }
                ':' if brackets == 0 => {
                    return Ok(FieldExpr {
                        end: self.pos,
                        debug_end: None,
                    });
                }
                '!' if self.peek_at(1) == Some('=') => self.pos += 2,
                '!' if brackets == 0 => {
                    return Ok(FieldExpr {
                        end: self.pos,
                        debug_end: None,
                    });
                }
                '=' if brackets == 0 && self.version.has_fstring_debug() => {
                    if self.peek_at(1) == Some('=') {
                        self.pos += 2;
                        continue;
                    }
                    let prev = self.body[..self.pos].chars().next_back();
                    if matches!(prev, Some('=' | '<' | '>' | '!')) {
                        self.bump();
                        continue;
                    }
                    let end = self.pos;
                    self.bump();
                    while self.peek().is_some_and(char::is_whitespace) {
                        self.bump();
                    }
                    let at_terminator = match self.peek() {
                        Some('}') | Some(':') => true,
                        Some('!') => self.peek_at(1) != Some('='),
                        _ => false,
                    };
                    if at_terminator {
                        return Ok(FieldExpr {
                            end,
                            debug_end: Some(self.pos),
                        });
                    }
                }
                _ => self.bump(),
            }
        }
    }

    /// Skip a quoted string inside a replacement field.
    fn skip_nested_string(&mut self, quote: char) -> Result<(), FieldError> {
        let start = self.pos;
        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        self.pos += if triple { 3 } else { 1 };

        while let Some(c) = self.peek() {
            if c == '\\' {
                if !self.version.allows_backslash_in_fstring_expr() {
                    return Err(FieldError {
                        code: ErrorCode::FStringBackslash,
                        message: "f-string expression part cannot include a backslash",
                        at: self.pos,
                    });
                }
                self.bump();
                self.bump();
                continue;
            }
            if c == quote {
                if !triple {
                    self.bump();
                    return Ok(());
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.pos += 3;
                    return Ok(());
                }
            }
            self.bump();
        }

        Err(FieldError {
            code: ErrorCode::FStringUnterminated,
            message: "f-string: unterminated string",
            at: start,
        })
    }

    /// Report `error`, skip the rest of the field and produce an error node.
    fn recover(&mut self, open: usize, expr_start: usize, error: FieldError, sink: &mut dyn ErrorSink) -> FormattedValue {
        let at_end = error.at >= self.body.len();
        let error_span = if error.code == ErrorCode::FStringUnterminated {
            self.span(open, self.body.len())
        } else {
            let end = if at_end { error.at } else { error.at + 1 };
            self.span(error.at, end)
        };
        sink.error(error.message, error_span, error.code);

        if error.code == ErrorCode::FStringUnterminated {
            self.pos = self.body.len();
        } else {
            self.skip_field_rest();
            if self.peek() == Some('}') {
                self.bump();
            }
        }

        let expr_end = self.pos.max(expr_start);
        FormattedValue {
            expression: Box::new(Spanned::new(Expr::Error, self.span(expr_start, expr_end))),
            conversion: None,
            format_spec: None,
            debug_text: None,
            span: self.span(open, self.pos),
        }
    }

    /// Advance to the `}` closing the current field (left unconsumed), or the end of the body.
    fn skip_field_rest(&mut self) {
        let mut depth = 0usize;
        while let Some(c) = self.peek() {
            match c {
                '{' => depth += 1,
                '}' if depth == 0 => return,
                '}' => depth -= 1,
                _ => {}
            }
            self.bump();
        }
    }
}
