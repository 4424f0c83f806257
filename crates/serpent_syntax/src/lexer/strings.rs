//! String scanning for the Python tokenizer.
//!
//! Handles plain strings, bytes and f-strings with every prefix combination, single and triple quotes,
//! and escape decoding. F-string bodies are kept undecoded for `crate::fstring`.

use super::Tokenizer;
use super::tokens::{BytesLiteral, FStringLiteral, Literal, StringLiteral, TokenKind};
use crate::diagnostics::ErrorCode;

// ============================================================================
// Escape sequence handling
// ============================================================================

/// Problem found while decoding escapes; offsets are byte positions within the decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EscapeError {
    pub start: usize,
    pub end: usize,
    pub message: String,
}

/// Decode backslash escapes in a non-raw string body.
///
/// ## Parameters
/// - `unicode`: accept `\u`, `\U` and `\N{...}` (text strings only, not bytes).
///
/// ## Notes
/// - Unknown escapes keep the backslash, as Python does.
/// - `\N{name}` is kept verbatim: there is no Unicode name table here.
/// - `\xhh` and `\ooo` produce the code point with that value; bytes callers narrow it to `u8`.
pub(crate) fn decode_escapes(body: &str, unicode: bool) -> (String, Vec<EscapeError>) {
    let mut out = String::with_capacity(body.len());
    let mut errors = Vec::new();
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, e)) = chars.next() else {
            out.push('\\');
            break;
        };
        match e {
            '\n' => {}
            '\r' => {
                if chars.peek().is_some_and(|(_, n)| *n == '\n') {
                    chars.next();
                }
            }
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut value = e.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek() {
                        Some((_, d)) if d.is_digit(8) => {
                            value = value * 8 + d.to_digit(8).unwrap_or(0);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.push(char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            'x' | 'u' | 'U' if e == 'x' || unicode => {
                let width = match e {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut digits = String::new();
                while digits.len() < width {
                    match chars.peek() {
                        Some((_, d)) if d.is_ascii_hexdigit() => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let end = i + 2 + digits.len();
                let decoded = if digits.len() == width {
                    u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32)
                } else {
                    None
                };
                match decoded {
                    Some(ch) => out.push(ch),
                    None => {
                        errors.push(EscapeError {
                            start: i,
                            end,
                            message: format!("invalid \\{e} escape: expected {width} hex digits"),
                        });
                        out.push('\\');
                        out.push(e);
                        out.push_str(&digits);
                    }
                }
            }
            'N' if unicode => {
                out.push_str("\\N");
                if chars.peek().is_some_and(|(_, n)| *n == '{') {
                    let mut closed = false;
                    for (_, n) in chars.by_ref() {
                        out.push(n);
                        if n == '}' {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        errors.push(EscapeError {
                            start: i,
                            end: body.len(),
                            message: "malformed \\N character escape".to_string(),
                        });
                    }
                } else {
                    errors.push(EscapeError {
                        start: i,
                        end: i + 2,
                        message: "malformed \\N character escape".to_string(),
                    });
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    (out, errors)
}

// ============================================================================
// String scanning
// ============================================================================

impl<'a> Tokenizer<'a> {
    /// Scan a string literal whose (possibly empty) `prefix` has already been consumed.
    pub(super) fn scan_string(&mut self, start: usize, prefix: &str) -> TokenKind {
        let lower = prefix.to_ascii_lowercase();
        let is_raw = lower.contains('r');
        let is_bytes = lower.contains('b');
        let is_fstring = lower.contains('f');

        let Some(quote) = self.bump() else {
            return TokenKind::Error(prefix.to_string());
        };
        let triple = self.peek() == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let body_start = self.pos;
        let body_start_loc = self.location_at(body_start);
        let (body_end, terminated) = if is_fstring && self.version.allows_backslash_in_fstring_expr() {
            self.scan_fstring_body(quote, triple)
        } else {
            self.scan_plain_body(quote, triple)
        };

        if !terminated {
            let message = if triple {
                "unterminated triple-quoted string literal"
            } else {
                "unterminated string literal"
            };
            self.report(message, start, self.pos, ErrorCode::UnterminatedString);
        }

        let source = self.source;
        let body = &source[body_start..body_end];

        if is_fstring {
            return TokenKind::Constant(Literal::FString(FStringLiteral {
                body: body.to_string(),
                body_start: body_start_loc,
                prefix: prefix.to_string(),
                is_raw,
                is_triple: triple,
            }));
        }

        let implicit_bytes = self.version.is_python2() && !lower.contains('u');
        if is_bytes || implicit_bytes {
            let value = self.decode_bytes(body, body_start, is_raw, is_bytes);
            return TokenKind::Constant(Literal::Bytes(BytesLiteral {
                value,
                prefix: prefix.to_string(),
                is_triple: triple,
            }));
        }

        let value = if is_raw {
            body.to_string()
        } else {
            let (value, errors) = decode_escapes(body, true);
            self.report_escape_errors(errors, body_start);
            value
        };
        TokenKind::Constant(Literal::Str(StringLiteral {
            value,
            prefix: prefix.to_string(),
            is_triple: triple,
        }))
    }

    /// Scan to the closing quote(s). Returns the body end and whether the literal was terminated.
    ///
    /// An unterminated single-quoted literal stops before the line break; a triple-quoted one runs to EOF.
    fn scan_plain_body(&mut self, quote: char, triple: bool) -> (usize, bool) {
        loop {
            match self.peek() {
                None => return (self.pos, false),
                Some('\\') => {
                    self.bump();
                    if !self.eat_line_break() {
                        self.bump();
                    }
                }
                Some(c) if c == quote => {
                    if !triple {
                        let end = self.pos;
                        self.bump();
                        return (end, true);
                    }
                    if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                        let end = self.pos;
                        self.bump();
                        self.bump();
                        self.bump();
                        return (end, true);
                    }
                    self.bump();
                }
                Some('\n') | Some('\r') if !triple => return (self.pos, false),
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Nested-quote scanning, falling back to the first closing quote when that never terminates.
    ///
    /// `f"{x"` then ends at its second `"` and the f-string parser reports the open replacement field,
    /// instead of the literal swallowing the rest of the line (or file, for triple quotes).
    fn scan_fstring_body(&mut self, quote: char, triple: bool) -> (usize, bool) {
        let checkpoint = self.checkpoint();
        let nested = self.scan_nested_fstring_body(quote, triple);
        if nested.1 {
            return nested;
        }
        self.rewind(checkpoint);
        self.scan_plain_body(quote, triple)
    }

    /// F-string body scanning for grammars where replacement fields may reuse the outer quote.
    ///
    /// Tracks replacement fields, brackets inside them and format-spec regions, so a quote inside
    /// `{...}` starts a nested string instead of ending the literal.
    fn scan_nested_fstring_body(&mut self, quote: char, triple: bool) -> (usize, bool) {
        #[derive(Clone, Copy, PartialEq)]
        enum Frame {
            Field { in_spec: bool },
            Bracket,
        }
        let mut stack: Vec<Frame> = Vec::new();

        loop {
            let top = stack.last().copied();
            let Some(c) = self.peek() else {
                return (self.pos, false);
            };
            let in_code = matches!(top, Some(Frame::Field { in_spec: false }) | Some(Frame::Bracket));

            match c {
                '\\' => {
                    self.bump();
                    if !self.eat_line_break() {
                        self.bump();
                    }
                }
                '\n' | '\r' if !triple && !in_code => return (self.pos, false),
                q if (q == '"' || q == '\'') && in_code => {
                    self.bump();
                    let nested_triple = self.peek() == Some(q) && self.peek_at(1) == Some(q);
                    if nested_triple {
                        self.bump();
                        self.bump();
                    }
                    let (_, ok) = self.scan_plain_body(q, nested_triple);
                    if !ok {
                        return (self.pos, false);
                    }
                }
                q if q == quote => {
                    if !triple {
                        let end = self.pos;
                        self.bump();
                        return (end, true);
                    }
                    if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                        let end = self.pos;
                        self.bump();
                        self.bump();
                        self.bump();
                        return (end, true);
                    }
                    self.bump();
                }
                '{' => {
                    self.bump();
                    match top {
                        None if self.peek() == Some('{') => {
                            self.bump();
                        }
                        None | Some(Frame::Field { in_spec: true }) => stack.push(Frame::Field { in_spec: false }),
                        Some(_) => stack.push(Frame::Bracket),
                    }
                }
                '(' | '[' if in_code => {
                    self.bump();
                    stack.push(Frame::Bracket);
                }
                ')' | ']' if in_code => {
                    self.bump();
                    if top == Some(Frame::Bracket) {
                        stack.pop();
                    }
                }
                '}' => {
                    self.bump();
                    if top.is_some() {
                        stack.pop();
                    } else if self.peek() == Some('}') {
                        self.bump();
                    }
                }
                ':' if top == Some(Frame::Field { in_spec: false }) => {
                    self.bump();
                    stack.pop();
                    stack.push(Frame::Field { in_spec: true });
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn decode_bytes(&mut self, body: &str, body_start: usize, is_raw: bool, explicit: bool) -> Vec<u8> {
        if explicit {
            if let Some((i, c)) = body.char_indices().find(|(_, c)| !c.is_ascii()) {
                self.report(
                    format!("bytes can only contain ASCII literal characters, found '{c}'"),
                    body_start + i,
                    body_start + i + c.len_utf8(),
                    ErrorCode::NonAsciiBytes,
                );
            }
        }
        if is_raw {
            return body.as_bytes().to_vec();
        }
        let (decoded, errors) = decode_escapes(body, false);
        self.report_escape_errors(errors, body_start);
        let mut bytes = Vec::with_capacity(decoded.len());
        for ch in decoded.chars() {
            match u8::try_from(u32::from(ch)) {
                Ok(b) => bytes.push(b),
                Err(_) => {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
        bytes
    }

    fn report_escape_errors(&mut self, errors: Vec<EscapeError>, body_start: usize) {
        for e in errors {
            self.warn(e.message, body_start + e.start, body_start + e.end, ErrorCode::BadEscape);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostics::ErrorCode;
    use crate::lexer::{Literal, TokenKind, lex};
    use serpent_core::PythonVersion;

    fn first(source: &str, version: PythonVersion) -> TokenKind {
        lex(source, version).0.remove(0).kind
    }

    #[test]
    fn test_decode_escapes() {
        let (s, errors) = super::decode_escapes(r"a\tb\x41\101é\N{DASH}\q", true);
        assert!(errors.is_empty());
        assert_eq!(s, "a\tbAA\u{e9}\\N{DASH}\\q");
        let (_, errors) = super::decode_escapes(r"\x4", true);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_prefixes_and_quotes() {
        match first(r#"rb'\d'"#, PythonVersion::LATEST) {
            TokenKind::Constant(Literal::Bytes(b)) => assert_eq!(b.value, b"\\d"),
            other => panic!("expected bytes, got {other:?}"),
        }
        match first(r#"R"\n""#, PythonVersion::LATEST) {
            TokenKind::Constant(Literal::Str(s)) => assert_eq!(s.value, "\\n"),
            other => panic!("expected str, got {other:?}"),
        }
        match first("'''a\n'b'\n'''", PythonVersion::LATEST) {
            TokenKind::Constant(Literal::Str(s)) => {
                assert!(s.is_triple);
                assert_eq!(s.value, "a\n'b'\n");
            }
            other => panic!("expected str, got {other:?}"),
        }
    }

    #[test]
    fn test_python2_plain_string_is_bytes_and_fstring_prefix_is_name() {
        assert!(matches!(first("'x'", PythonVersion::V27), TokenKind::Constant(Literal::Bytes(_))));
        assert!(matches!(first("u'x'", PythonVersion::V27), TokenKind::Constant(Literal::Str(_))));
        assert!(matches!(first("f'x'", PythonVersion::V35), TokenKind::Name(n) if n == "f"));
    }

    #[test]
    fn test_fstring_keeps_raw_body_and_origin() {
        let (tokens, errors) = lex("x = f'a{b!r:>{w}}'", PythonVersion::LATEST);
        assert!(errors.is_empty());
        match &tokens[2].kind {
            TokenKind::Constant(Literal::FString(f)) => {
                assert_eq!(f.body, "a{b!r:>{w}}");
                assert_eq!(f.body_start.offset, 6);
                assert!(!f.is_raw);
            }
            other => panic!("expected f-string, got {other:?}"),
        }
    }

    #[test]
    fn test_fstring_nested_quotes_312() {
        let source = r#"f"{d["key"]}" + 1"#;
        let (tokens, errors) = lex(source, PythonVersion::V312);
        assert!(errors.is_empty(), "{errors:?}");
        match &tokens[0].kind {
            TokenKind::Constant(Literal::FString(f)) => assert_eq!(f.body, r#"{d["key"]}"#),
            other => panic!("expected f-string, got {other:?}"),
        }
        assert!(tokens[1].kind.is_operator(serpent_core::lang::operators::OperatorId::Plus));
    }

    #[test]
    fn test_fstring_fill_quote_in_spec_312() {
        let (tokens, errors) = lex(r#"f"{x:'^10}""#, PythonVersion::V312);
        assert!(errors.is_empty(), "{errors:?}");
        assert!(matches!(&tokens[0].kind, TokenKind::Constant(Literal::FString(f)) if f.body == "{x:'^10}"));
    }

    #[test]
    fn test_fstring_with_open_field_ends_at_outer_quote() {
        for (source, body) in [("f\"{x\"\ny = 1\n", "{x"), ("f'{x'\ny = 1\n", "{x"), ("f'''{x'''\ny = 1\n", "{x")] {
            let (tokens, errors) = lex(source, PythonVersion::LATEST);
            assert!(errors.is_empty(), "{source:?}: {errors:?}");
            assert!(
                matches!(&tokens[0].kind, TokenKind::Constant(Literal::FString(f)) if f.body == body),
                "{source:?}: {:?}",
                tokens[0].kind
            );
            assert!(tokens.iter().any(|t| matches!(&t.kind, TokenKind::Name(n) if n == "y")));
        }
    }

    #[test]
    fn test_unterminated_fstring_still_reported() {
        let (_, errors) = lex("f'{x\ny = 1\n", PythonVersion::LATEST);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UnterminatedString);
    }

    #[test]
    fn test_unterminated_string_runs_to_end_of_line() {
        let (tokens, errors) = lex("x = 'abc\ny = 1\n", PythonVersion::LATEST);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::UnterminatedString);
        assert!(matches!(&tokens[2].kind, TokenKind::Constant(Literal::Str(s)) if s.value == "abc"));
        assert!(tokens.iter().any(|t| matches!(&t.kind, TokenKind::Name(n) if n == "y")));
    }

    #[test]
    fn test_unterminated_triple_runs_to_eof() {
        let (tokens, errors) = lex("x = '''abc\ny = 1\n", PythonVersion::LATEST);
        assert_eq!(errors[0].code, ErrorCode::UnterminatedString);
        assert!(!tokens.iter().any(|t| matches!(&t.kind, TokenKind::Name(n) if n == "y")));
    }

    #[test]
    fn test_non_ascii_bytes_rejected() {
        let (_, errors) = lex("b'caf\u{e9}'", PythonVersion::LATEST);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::NonAsciiBytes);
    }

    #[test]
    fn test_backslash_newline_inside_string() {
        let (tokens, errors) = lex("'a\\\nb'", PythonVersion::LATEST);
        assert!(errors.is_empty());
        assert!(matches!(&tokens[0].kind, TokenKind::Constant(Literal::Str(s)) if s.value == "ab"));
    }
}
