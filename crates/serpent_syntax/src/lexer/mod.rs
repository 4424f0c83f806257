//! Tokenizer for Python source.
//!
//! Handles tokenization including:
//! - Version-gated keywords (`async`/`await` from 3.7, `print`/`exec` in 2.7)
//! - Names and literals (numbers, strings, bytes, f-strings with every prefix combination)
//! - Operators and punctuation by maximal munch over the `serpent_core` registries
//! - Indentation-based blocks (INDENT/DEDENT tokens), logical NEWLINE vs. non-logical NL
//! - Comments and explicit line joins as real tokens, so formatters can see them
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token, Literal)
//! - `strings` - String/bytes/f-string scanning and escape decoding
//! - `numbers` - Numeric literal scanning
//! - `indent` - INDENT/DEDENT handling
//!
//! ## Notes
//! - The tokenizer is pull-based: nothing is scanned until a token is requested, and the cursor only moves
//!   forward. [`Tokenizer::tokens_through_line`] relies on this to serve repeated line-bounded requests.
//! - Malformed input never stops the stream. Errors are collected and a best-effort token is produced.

mod indent;
mod numbers;
mod strings;
pub mod tokens;

pub(crate) use strings::decode_escapes;
pub use tokens::{BytesLiteral, FStringLiteral, Literal, LiteralKind, Number, StringLiteral, Token, TokenKind};

use std::cell::Cell;
use std::collections::VecDeque;

use crate::ast::{Location, Span};
use crate::diagnostics::{ErrorCode, ErrorSink, Severity, SyntaxError};
use serpent_core::PythonVersion;
use serpent_core::lang::punctuation::{self, PunctuationId};
use serpent_core::lang::operators::{self, OperatorId};
use serpent_core::lang::keywords;

// ============================================================================
// TOKENIZER STATE
// ----------------------------------------------------------------------------
// Tokenizer state diagram (simplified):
//
// [Start of line] → measure indent → {blank/comment line → NL}
//                                     {code → INDENT/DEDENT* → [Inside code]}
//                                                                  ↓
//                                          see '(' → [bracket_depth++], '\n' → NL
//                                                                  ↓
//                                          see '\\\n' → EXPLICIT_LINE_JOIN (stay inside code)
//                                                                  ↓
//                                          see '\n' at depth 0 → NEWLINE → [Start of line]
// ============================================================================

/// Tokenizer behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenizerOptions {
    /// Keep `Token::verbatim` and `Token::whitespace` (needed by formatters).
    pub verbatim: bool,
    /// Behave as if the source were wrapped in parentheses: no indentation, line breaks are NL.
    pub implicit_parens: bool,
}

impl TokenizerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbatim(mut self, verbatim: bool) -> Self {
        self.verbatim = verbatim;
        self
    }

    pub fn with_implicit_parens(mut self, implicit_parens: bool) -> Self {
        self.implicit_parens = implicit_parens;
        self
    }
}

/// Tokenizer for Python source code.
///
/// Converts source text into a lazy stream of tokens. Positions are absolute: a tokenizer created with
/// [`Tokenizer::with_origin`] reports offsets, lines and columns relative to the enclosing file.
pub struct Tokenizer<'a> {
    source: &'a str,
    version: PythonVersion,
    options: TokenizerOptions,
    origin: Location,

    pos: usize,
    line: usize,
    line_start: usize,
    /// Start of the whitespace run preceding the next token.
    ws_start: usize,
    /// Last `(pos, column)` computed on the current line, so columns are counted incrementally.
    column_cache: Cell<(usize, usize)>,

    indent_stack: Vec<usize>,
    pending: VecDeque<Token>,
    at_line_start: bool,
    /// The current logical line has produced a non-trivia token.
    line_has_content: bool,
    /// Bracket depth for implicit line continuation (parens, brackets, braces).
    bracket_depth: usize,
    base_depth: usize,

    peeked: Option<Token>,
    finished: bool,
    eof_yielded: bool,
    errors: Vec<SyntaxError>,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer for a whole file.
    pub fn new(source: &'a str, version: PythonVersion, options: TokenizerOptions) -> Self {
        Self::with_origin(source, Location::START, version, options)
    }

    /// Create a tokenizer for a fragment that starts at `origin` in some enclosing file.
    pub fn with_origin(source: &'a str, origin: Location, version: PythonVersion, options: TokenizerOptions) -> Self {
        let base_depth = usize::from(options.implicit_parens);
        Self {
            source,
            version,
            options,
            origin,
            pos: 0,
            line: 1,
            line_start: 0,
            ws_start: 0,
            column_cache: Cell::new((0, 0)),
            indent_stack: vec![0],
            pending: VecDeque::new(),
            at_line_start: !options.implicit_parens,
            line_has_content: false,
            bracket_depth: base_depth,
            base_depth,
            peeked: None,
            finished: false,
            eof_yielded: false,
            errors: Vec::new(),
        }
    }

    pub fn version(&self) -> PythonVersion {
        self.version
    }

    /// Errors reported so far.
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<SyntaxError> {
        std::mem::take(&mut self.errors)
    }

    /// Move every collected error into `sink`.
    pub fn drain_errors_into(&mut self, sink: &mut dyn ErrorSink) {
        for e in self.errors.drain(..) {
            sink.add(e.message, e.span, e.code, e.severity);
        }
    }

    /// Location of the tokenizer cursor (absolute).
    pub fn current_location(&self) -> Location {
        self.location_at(self.pos)
    }

    /// Return the next token. After the end of input this keeps returning `EndOfFile`.
    pub fn next_token(&mut self) -> Token {
        if let Some(token) = self.peeked.take() {
            return token;
        }
        self.scan()
    }

    /// Look at the next token without consuming it.
    pub fn peek_token(&mut self) -> &Token {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.scan(),
        };
        self.peeked.insert(token)
    }

    /// Return every token whose start line is `<= line` that has not been returned yet.
    ///
    /// The cursor is shared with [`Tokenizer::next_token`]: repeated calls with growing line numbers continue
    /// where the previous call stopped. `EndOfFile` is never included.
    pub fn tokens_through_line(&mut self, line: usize) -> Vec<Token> {
        let mut out = Vec::new();
        loop {
            let next = self.peek_token();
            if next.is_eof() || next.start.line > line {
                break;
            }
            out.push(self.next_token());
        }
        out
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn peek_at(&self, n: usize) -> Option<char> {
        self.source[self.pos..].chars().nth(n)
    }

    /// Consume one character, keeping line bookkeeping in sync (`\n`, `\r\n` and lone `\r` end a line).
    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        match c {
            '\n' => self.start_new_line(),
            '\r' if self.peek() != Some('\n') => self.start_new_line(),
            _ => {}
        }
        Some(c)
    }

    fn start_new_line(&mut self) {
        self.line += 1;
        self.line_start = self.pos;
    }

    /// Cursor state to return to when a speculative scan fails.
    pub(super) fn checkpoint(&self) -> (usize, usize, usize) {
        (self.pos, self.line, self.line_start)
    }

    pub(super) fn rewind(&mut self, (pos, line, line_start): (usize, usize, usize)) {
        self.pos = pos;
        self.line = line;
        self.line_start = line_start;
        self.column_cache.set((line_start, 0));
    }

    /// Consume a line terminator if one is next; returns `true` when something was consumed.
    fn eat_line_break(&mut self) -> bool {
        match self.peek() {
            Some('\n') => {
                self.bump();
                true
            }
            Some('\r') => {
                self.bump();
                if self.peek() == Some('\n') {
                    self.bump();
                }
                true
            }
            _ => false,
        }
    }

    // ========================================================================
    // Positions and token construction
    // ========================================================================

    /// Absolute location of a local byte position on the current line or an earlier point of it.
    fn location_at(&self, pos: usize) -> Location {
        if pos < self.line_start {
            let (line, line_start) = self.line_of(pos);
            let column = self.source[line_start..pos].chars().count();
            return self.absolute(pos, line, column);
        }
        let (cached_pos, cached_column) = self.column_cache.get();
        let (from, base) = if (self.line_start..=pos).contains(&cached_pos) {
            (cached_pos, cached_column)
        } else {
            (self.line_start, 0)
        };
        let column = base + self.source[from..pos].chars().count();
        self.column_cache.set((pos, column));
        self.absolute(pos, self.line, column)
    }

    /// Slow path for positions before the current line (only used for error spans).
    fn line_of(&self, pos: usize) -> (usize, usize) {
        let starts = line_starts(self.source);
        let index = starts.partition_point(|&start| start <= pos) - 1;
        (index + 1, starts[index])
    }

    fn absolute(&self, pos: usize, line: usize, column: usize) -> Location {
        let column = if line == 1 { self.origin.column + column } else { column };
        Location::new(self.origin.offset + pos, self.origin.line + line - 1, column)
    }

    fn abs_span(&self, start: usize, end: usize) -> Span {
        Span::new(self.origin.offset + start, self.origin.offset + end)
    }

    pub(crate) fn report(&mut self, message: impl Into<String>, start: usize, end: usize, code: ErrorCode) {
        let span = self.abs_span(start, end);
        self.errors.push(SyntaxError::new(message, span, code));
    }

    pub(crate) fn warn(&mut self, message: impl Into<String>, start: usize, end: usize, code: ErrorCode) {
        let span = self.abs_span(start, end);
        self.errors
            .push(SyntaxError::new(message, span, code).with_severity(Severity::Warning));
    }

    /// Build a token spanning `start..self.pos` and reset the whitespace cursor.
    fn make_token(&mut self, kind: TokenKind, start: usize, start_loc: Location) -> Token {
        let mut token = Token::new(kind, start_loc, self.location_at(self.pos));
        if self.options.verbatim {
            token.verbatim = Some(self.source[start..self.pos].to_string());
            token.whitespace = self.source[self.ws_start..start].to_string();
        }
        self.ws_start = self.pos;
        token
    }

    /// Zero-width synthetic token (INDENT/DEDENT/EOF) at the cursor.
    fn synthetic(&self, kind: TokenKind) -> Token {
        let here = self.location_at(self.pos);
        let mut token = Token::new(kind, here, here);
        if self.options.verbatim {
            token.verbatim = Some(String::new());
        }
        token
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan(&mut self) -> Token {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return token;
            }
            if self.finished {
                return self.synthetic(TokenKind::EndOfFile);
            }
            if self.at_line_start {
                self.handle_indentation();
                continue;
            }
            if let Some(token) = self.scan_token() {
                return token;
            }
        }
    }

    /// Scan one token; `None` means state changed without producing a token (e.g. EOF queued).
    fn scan_token(&mut self) -> Option<Token> {
        // Skip whitespace (but not newlines)
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\x0c' {
                self.bump();
            } else {
                break;
            }
        }

        let start = self.pos;
        let start_loc = self.location_at(start);

        let Some(c) = self.peek() else {
            self.finish();
            return None;
        };

        let kind = match c {
            // Comments
            '#' => {
                while let Some(c) = self.peek() {
                    if c == '\n' || c == '\r' {
                        break;
                    }
                    self.bump();
                }
                TokenKind::Comment(self.source[start..self.pos].to_string())
            }

            // Line breaks
            '\n' | '\r' => {
                self.eat_line_break();
                let logical = self.bracket_depth == 0 && self.line_has_content;
                if self.bracket_depth == 0 {
                    self.at_line_start = true;
                    self.line_has_content = false;
                }
                if logical { TokenKind::Newline } else { TokenKind::NL }
            }

            // Explicit line join
            '\\' => {
                self.bump();
                if self.eat_line_break() {
                    TokenKind::ExplicitLineJoin
                } else {
                    self.report("unexpected character after line continuation character", start, self.pos, ErrorCode::UnexpectedCharacter);
                    self.line_has_content = true;
                    TokenKind::Error("\\".to_string())
                }
            }

            // Strings
            '"' | '\'' => {
                self.line_has_content = true;
                self.scan_string(start, "")
            }

            // Numbers
            '0'..='9' => {
                self.line_has_content = true;
                self.scan_number(start)
            }
            '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                self.line_has_content = true;
                self.scan_number(start)
            }

            // Names, keywords and prefixed strings
            _ if is_ident_start(c) => {
                self.line_has_content = true;
                self.scan_identifier(start)
            }

            // Operators and punctuation
            _ => {
                self.line_has_content = true;
                self.scan_operator(start)
            }
        };

        Some(self.make_token(kind, start, start_loc))
    }

    /// Queue the end-of-input tokens: trailing NEWLINE, remaining DEDENTs, EOF.
    fn finish(&mut self) {
        if self.bracket_depth > self.base_depth {
            let end = self.pos;
            self.report("unexpected end of input: bracket was never closed", end, end, ErrorCode::UnclosedBracket);
        }
        if self.line_has_content {
            let token = self.synthetic(TokenKind::Newline);
            self.pending.push_back(token);
            self.line_has_content = false;
        }
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            let token = self.synthetic(TokenKind::Dedent);
            self.pending.push_back(token);
        }
        self.finished = true;
    }

    // ========================================================================
    // Operator helpers
    // ========================================================================

    /// Maximal munch over punctuation and operator spellings (3, 2, then 1 characters).
    fn scan_operator(&mut self, start: usize) -> TokenKind {
        let source = self.source;
        let rest = &source[self.pos..];
        let longest = operators::max_spelling_len().max(3);
        for len in (1..=longest).rev() {
            if len > rest.len() || !rest.is_char_boundary(len) {
                continue;
            }
            let candidate = &rest[..len];
            if let Some(id) = punctuation::from_str(candidate) {
                if id == PunctuationId::Backquote && !self.version.is_python2() {
                    continue;
                }
                self.advance_bytes(len);
                return self.punctuation_token(id, start);
            }
            if let Some(id) = operators::from_str(candidate, self.version) {
                self.advance_bytes(len);
                return TokenKind::Operator(id);
            }
            // Decorators predate the matrix-multiply operator.
            if candidate == "@" {
                self.advance_bytes(len);
                return TokenKind::Operator(OperatorId::At);
            }
        }

        // Nothing matched: consume one character and report it.
        let c = self.bump().unwrap_or_default();
        self.report(format!("unexpected character '{c}'"), start, self.pos, ErrorCode::UnexpectedCharacter);
        TokenKind::Error(c.to_string())
    }

    fn advance_bytes(&mut self, len: usize) {
        let target = self.pos + len;
        while self.pos < target {
            self.bump();
        }
    }

    /// Track bracket depth; a close bracket with nothing open is reported but still produced.
    fn punctuation_token(&mut self, id: PunctuationId, start: usize) -> TokenKind {
        if punctuation::is_open(id) {
            self.bracket_depth += 1;
        } else if punctuation::is_close(id) {
            if self.bracket_depth > self.base_depth {
                self.bracket_depth -= 1;
            } else {
                self.report(
                    format!("unmatched '{}'", punctuation::as_str(id)),
                    start,
                    self.pos,
                    ErrorCode::UnmatchedBracket,
                );
            }
        }
        TokenKind::Punctuation(id)
    }

    // ========================================================================
    // Identifier scanning
    // ========================================================================

    fn scan_identifier(&mut self, start: usize) -> TokenKind {
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                self.bump();
            } else {
                break;
            }
        }
        let source = self.source;
        let name = &source[start..self.pos];

        if matches!(self.peek(), Some('"') | Some('\'')) && self.is_string_prefix(name) {
            let prefix = name.to_string();
            return self.scan_string(start, &prefix);
        }

        match keywords::from_str(name, self.version) {
            Some(id) => TokenKind::Keyword(id),
            None => TokenKind::Name(name.to_string()),
        }
    }

    /// String prefixes accepted by the target version (case-insensitive).
    fn is_string_prefix(&self, name: &str) -> bool {
        if name.len() > 2 {
            return false;
        }
        let lower = name.to_ascii_lowercase();
        match lower.as_str() {
            "r" | "u" | "b" | "br" | "rb" => true,
            "ur" => self.version.is_python2(),
            "f" | "fr" | "rf" => self.version.has_fstrings(),
            _ => false,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    /// Yields `EndOfFile` exactly once, then `None`.
    fn next(&mut self) -> Option<Token> {
        if self.eof_yielded {
            return None;
        }
        let token = self.next_token();
        if token.is_eof() {
            self.eof_yielded = true;
        }
        Some(token)
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier.
fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

/// Check if a character can continue an identifier.
fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Byte offset where each line of `source` starts.
///
/// `\n`, `\r\n` and a lone `\r` each end a line, the same rule the tokenizer uses for line numbers.
pub fn line_starts(source: &str) -> Vec<usize> {
    let bytes = source.as_bytes();
    let mut starts = vec![0];
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\n' => starts.push(i + 1),
            b'\r' if bytes.get(i + 1) != Some(&b'\n') => starts.push(i + 1),
            _ => {}
        }
    }
    starts
}

/// Byte offset where the content of the line starting at `start` ends (before its line break).
pub fn line_content_end(source: &str, start: usize) -> usize {
    source[start..].find(['\n', '\r']).map_or(source.len(), |i| start + i)
}

/// Convenience function to tokenize a whole source string.
///
/// Returns every token (ending with `EndOfFile`) together with the collected errors.
#[tracing::instrument(skip_all, fields(source_len = source.len(), version = %version))]
pub fn lex(source: &str, version: PythonVersion) -> (Vec<Token>, Vec<SyntaxError>) {
    let mut tokenizer = Tokenizer::new(source, version, TokenizerOptions::default());
    let tokens: Vec<Token> = tokenizer.by_ref().collect();
    let errors = tokenizer.take_errors();
    tracing::debug!(tokens = tokens.len(), errors = errors.len(), "tokenized");
    (tokens, errors)
}

// ============================================================================
// TESTS
// ============================================================================
