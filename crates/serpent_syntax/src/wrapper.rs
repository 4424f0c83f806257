//! Token arena and bracket-tracking wrapper around the tokenizer.
//!
//! Formatters need more context than a bare token stream: the previous and next token, the innermost
//! enclosing bracket or `lambda`, and the partner of every bracket. [`TokenizerWrapper`] pulls tokens lazily,
//! drops layout tokens, and appends each remaining token to a [`TokenArena`] where those links are plain
//! [`TokenId`] indices.
//!
//! ## Notes
//! - A logical NEWLINE breaks the `prev` chain: the first token of a logical line has no `prev`.
//! - Brackets are matched here, not in the tokenizer. A mismatch is reported, the token is still stored, and
//!   the bracket stack is left untouched so it never underflows.
//! - [`LineTokens`] files tokens by the line they start on and only grows.

use std::ops::Range;

use crate::ast::Span;
use crate::diagnostics::{ErrorCode, ErrorSink, SyntaxError};
use crate::lexer::{Token, TokenKind, Tokenizer, TokenizerOptions};
use serpent_core::PythonVersion;
use serpent_core::lang::keywords::{self, KeywordId};
use serpent_core::lang::operators::{self, OperatorId};
use serpent_core::lang::punctuation::{self, PunctuationId};

// ============================================================================
// ARENA
// ============================================================================

/// Index of a token in a [`TokenArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u32);

impl TokenId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A token plus its links into the surrounding stream.
#[derive(Debug, Clone)]
pub struct TokenExt {
    pub token: Token,
    pub prev: Option<TokenId>,
    pub next: Option<TokenId>,
    /// Innermost open bracket or `lambda` enclosing this token. For a close bracket (or the colon ending a
    /// lambda) this is the context outside the pair.
    pub inside: Option<TokenId>,
    /// Partner bracket, or the lambda/colon pair.
    pub matching: Option<TokenId>,
    /// One-indexed line this token is filed under.
    pub line: usize,
}

impl TokenExt {
    pub fn kind(&self) -> &TokenKind {
        &self.token.kind
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.token.kind, TokenKind::Operator(_))
    }

    pub fn is_open(&self) -> bool {
        self.token.kind.is_open_bracket()
    }

    pub fn is_close(&self) -> bool {
        self.token.kind.is_close_bracket()
    }

    /// Reserved word other than `True`/`False`/`None`.
    pub fn is_keyword(&self) -> bool {
        self.token.keyword_id().is_some_and(|id| !keywords::is_value_keyword(id))
    }

    pub fn is_multiline_string(&self) -> bool {
        self.token.is_multiline_string()
    }

    pub fn is_number(&self) -> bool {
        self.token.kind.is_number()
    }

    pub fn is_comment(&self) -> bool {
        self.token.kind.is_comment()
    }

    /// A name or number, the building blocks of a "simple" slice operand.
    pub fn is_simple(&self) -> bool {
        match &self.token.kind {
            TokenKind::Name(_) => true,
            TokenKind::Keyword(id) => keywords::is_value_keyword(*id),
            kind => kind.is_number(),
        }
    }

    /// Comments and line joins carry no meaning for spacing decisions.
    pub fn is_trivia(&self) -> bool {
        matches!(self.token.kind, TokenKind::Comment(_) | TokenKind::ExplicitLineJoin)
    }

    pub fn is_keyword_id(&self, id: KeywordId) -> bool {
        self.token.kind.is_keyword(id)
    }

    pub fn is_punct(&self, id: PunctuationId) -> bool {
        self.token.kind.is_punctuation(id)
    }

    pub fn is_op(&self, id: OperatorId) -> bool {
        self.token.kind.is_operator(id)
    }
}

/// Growable buffer of linked tokens.
#[derive(Debug, Default)]
pub struct TokenArena {
    tokens: Vec<TokenExt>,
}

impl TokenArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, id: TokenId) -> &TokenExt {
        &self.tokens[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TokenId, &TokenExt)> {
        self.tokens
            .iter()
            .enumerate()
            .map(|(i, t)| (TokenId(i as u32), t))
    }

    fn push(&mut self, ext: TokenExt) -> TokenId {
        let id = TokenId(self.tokens.len() as u32);
        self.tokens.push(ext);
        id
    }

    fn get_mut(&mut self, id: TokenId) -> &mut TokenExt {
        &mut self.tokens[id.index()]
    }

    /// Previous token skipping comments and line joins.
    pub fn prev_significant(&self, id: TokenId) -> Option<TokenId> {
        let mut cur = self.get(id).prev;
        while let Some(p) = cur {
            if !self.get(p).is_trivia() {
                return Some(p);
            }
            cur = self.get(p).prev;
        }
        None
    }

    /// Next token skipping comments and line joins.
    pub fn next_significant(&self, id: TokenId) -> Option<TokenId> {
        let mut cur = self.get(id).next;
        while let Some(n) = cur {
            if !self.get(n).is_trivia() {
                return Some(n);
            }
            cur = self.get(n).next;
        }
        None
    }

    /// The enclosing `(` belongs to a call, a `def`/`class` header or a decorator rather than a parenthesized
    /// expression.
    pub fn is_inside_function_args(&self, id: TokenId) -> bool {
        let Some(open) = self.get(id).inside else {
            return false;
        };
        if !self.get(open).is_punct(PunctuationId::LParen) {
            return false;
        }
        match self.prev_significant(open).map(|p| self.get(p)) {
            Some(p) => matches!(p.token.kind, TokenKind::Name(_)) || p.is_close(),
            None => false,
        }
    }

    /// The `=` at `id` is a parameter default that follows an annotation (`def f(a: int = 1)`).
    pub fn is_annotated_default(&self, id: TokenId) -> bool {
        let inside = self.get(id).inside;
        let mut cur = self.prev_significant(id);
        while let Some(p) = cur {
            let ext = self.get(p);
            if Some(p) == inside {
                return false;
            }
            if ext.inside == inside {
                if ext.is_punct(PunctuationId::Comma) {
                    return false;
                }
                if ext.is_punct(PunctuationId::Colon) {
                    return true;
                }
            }
            cur = self.prev_significant(p);
        }
        false
    }

    /// `=` used for a keyword argument or an unannotated parameter default.
    pub fn is_keyword_equals(&self, id: TokenId) -> bool {
        if !self.get(id).is_op(OperatorId::Assign) {
            return false;
        }
        let in_lambda = self
            .get(id)
            .inside
            .is_some_and(|i| self.get(i).is_keyword_id(KeywordId::Lambda));
        (in_lambda || self.is_inside_function_args(id)) && !self.is_annotated_default(id)
    }

    /// The colon at `id` is a slice separator (directly inside `[...]`, not ending a lambda).
    pub fn is_slice_colon(&self, id: TokenId) -> bool {
        let ext = self.get(id);
        if !ext.is_punct(PunctuationId::Colon) || ext.matching.is_some() {
            return false;
        }
        ext.inside
            .is_some_and(|i| self.get(i).is_punct(PunctuationId::LBracket))
    }

    /// The colon at `id` ends a lambda parameter list.
    pub fn is_lambda_colon(&self, id: TokenId) -> bool {
        let ext = self.get(id);
        ext.is_punct(PunctuationId::Colon)
            && ext
                .matching
                .is_some_and(|m| self.get(m).is_keyword_id(KeywordId::Lambda))
    }

    /// `match`/`case` opening a statement: first on its logical line (or after `;`), outside brackets, not
    /// followed by `:` or `.`, with a header colon later on the line.
    pub fn is_soft_keyword(&self, id: TokenId, version: PythonVersion) -> bool {
        let ext = self.get(id);
        let TokenKind::Name(name) = ext.kind() else {
            return false;
        };
        if keywords::soft_keyword_from_str(name, version).is_none() || ext.inside.is_some() {
            return false;
        }
        if self
            .prev_significant(id)
            .is_some_and(|p| !self.get(p).is_punct(PunctuationId::Semicolon))
        {
            return false;
        }
        let Some(first) = self.next_significant(id) else {
            return false;
        };
        if self.get(first).is_punct(PunctuationId::Colon) || self.get(first).is_punct(PunctuationId::Dot) {
            return false;
        }
        let mut cur = Some(first);
        while let Some(c) = cur {
            let ext = self.get(c);
            if ext.is_punct(PunctuationId::Semicolon) {
                return false;
            }
            if ext.is_punct(PunctuationId::Colon) && ext.inside.is_none() && !self.is_lambda_colon(c) {
                return true;
            }
            cur = self.next_significant(c);
        }
        false
    }

    /// Every slice operand from the start of this subscript element up to the colon is simple.
    pub fn is_simple_slice_to_left(&self, colon: TokenId) -> bool {
        let inside = self.get(colon).inside;
        let mut operand = Vec::new();
        let mut cur = self.prev_significant(colon);
        while let Some(p) = cur {
            let ext = self.get(p);
            if Some(p) == inside || (ext.inside == inside && ext.is_punct(PunctuationId::Comma)) {
                break;
            }
            if ext.inside == inside && ext.is_punct(PunctuationId::Colon) {
                if !self.is_simple_operand(&operand) {
                    return false;
                }
                operand.clear();
            } else {
                operand.push(p);
            }
            cur = self.prev_significant(p);
        }
        operand.reverse();
        self.is_simple_operand(&operand)
    }

    /// Every slice operand from the colon to the end of this subscript element is simple.
    ///
    /// Tokens not loaded yet count as the end of the element.
    pub fn is_simple_slice_to_right(&self, colon: TokenId) -> bool {
        let inside = self.get(colon).inside;
        let close = inside.and_then(|i| self.get(i).matching);
        let mut operand = Vec::new();
        let mut cur = self.next_significant(colon);
        while let Some(n) = cur {
            let ext = self.get(n);
            if Some(n) == close || (ext.inside == inside && ext.is_punct(PunctuationId::Comma)) {
                break;
            }
            if ext.inside == inside && ext.is_punct(PunctuationId::Colon) {
                if !self.is_simple_operand(&operand) {
                    return false;
                }
                operand.clear();
            } else {
                operand.push(n);
            }
            cur = self.next_significant(n);
        }
        self.is_simple_operand(&operand)
    }

    pub fn is_simple_slice(&self, colon: TokenId) -> bool {
        self.is_simple_slice_to_left(colon) && self.is_simple_slice_to_right(colon)
    }

    /// Empty, a single name/number, or a unary `+`/`-`/`~` applied to one.
    fn is_simple_operand(&self, ids: &[TokenId]) -> bool {
        match ids {
            [] => true,
            [one] => self.get(*one).is_simple(),
            [sign, one] => {
                self.get(*sign)
                    .token
                    .operator_id()
                    .is_some_and(operators::can_be_unary)
                    && !self.get(*sign).is_op(OperatorId::Star)
                    && !self.get(*sign).is_op(OperatorId::Power)
                    && self.get(*one).is_simple()
            }
            _ => false,
        }
    }
}

// ============================================================================
// WRAPPER
// ============================================================================

/// Bracket problems found while linking tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BracketError {
    #[error("close bracket has no matching open: '{}' at {span:?}", punctuation::as_str(*.close))]
    Unmatched { close: PunctuationId, span: Span, line: usize },
    #[error(
        "close bracket has no matching open: '{}' cannot close '{}' at {span:?}",
        punctuation::as_str(*.close),
        punctuation::as_str(*.open)
    )]
    Mismatched {
        open: PunctuationId,
        close: PunctuationId,
        span: Span,
        line: usize,
    },
}

impl BracketError {
    pub fn span(&self) -> Span {
        match self {
            BracketError::Unmatched { span, .. } | BracketError::Mismatched { span, .. } => *span,
        }
    }

    /// One-indexed line of the offending close bracket.
    pub fn line(&self) -> usize {
        match self {
            BracketError::Unmatched { line, .. } | BracketError::Mismatched { line, .. } => *line,
        }
    }
}

/// Pulls tokens from a [`Tokenizer`], links them into a [`TokenArena`] and tracks bracket/lambda nesting.
pub struct TokenizerWrapper<'a> {
    tokenizer: Tokenizer<'a>,
    arena: TokenArena,
    /// Open brackets and `lambda`s, innermost last.
    stack: Vec<TokenId>,
    last: Option<TokenId>,
    lookahead: Option<Token>,
    /// A logical NEWLINE was skipped before `lookahead`.
    lookahead_breaks_chain: bool,
    errors: Vec<SyntaxError>,
}

impl<'a> TokenizerWrapper<'a> {
    /// Wrap a verbatim tokenizer over `source`.
    pub fn new(source: &'a str, version: PythonVersion) -> Self {
        let options = TokenizerOptions::new().with_verbatim(true);
        Self::from_tokenizer(Tokenizer::new(source, version, options))
    }

    pub fn from_tokenizer(tokenizer: Tokenizer<'a>) -> Self {
        Self {
            tokenizer,
            arena: TokenArena::new(),
            stack: Vec::new(),
            last: None,
            lookahead: None,
            lookahead_breaks_chain: false,
            errors: Vec::new(),
        }
    }

    pub fn arena(&self) -> &TokenArena {
        &self.arena
    }

    /// Bracket errors found so far (lexical errors stay in the tokenizer).
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    pub fn tokenizer_errors(&self) -> &[SyntaxError] {
        self.tokenizer.errors()
    }

    /// Look at the next significant token without linking it. Repeated calls return the same token.
    pub fn peek(&mut self) -> Option<&Token> {
        if self.lookahead.is_none() {
            self.fill_lookahead();
        }
        self.lookahead.as_ref()
    }

    /// Link the next significant token into the arena. `Ok(None)` at end of input.
    ///
    /// A bracket mismatch still stores the token (so the stream keeps moving) but returns the error.
    pub fn next(&mut self) -> Result<Option<TokenId>, BracketError> {
        if self.lookahead.is_none() {
            self.fill_lookahead();
        }
        let Some(token) = self.lookahead.take() else {
            return Ok(None);
        };
        if std::mem::take(&mut self.lookahead_breaks_chain) {
            self.last = None;
            // Anything still open at a logical line end is a lambda without its colon or a bracket the
            // tokenizer already gave up on.
            self.stack.clear();
        }

        let line = token.start.line;
        let id = self.arena.push(TokenExt {
            token,
            prev: self.last,
            next: None,
            inside: self.stack.last().copied(),
            matching: None,
            line,
        });
        if let Some(prev) = self.last {
            self.arena.get_mut(prev).next = Some(id);
        }
        self.last = Some(id);

        self.track_nesting(id)?;
        Ok(Some(id))
    }

    /// Skip layout tokens up to the next significant one (`None` at end of input).
    fn fill_lookahead(&mut self) {
        loop {
            let token = self.tokenizer.next_token();
            match token.kind {
                TokenKind::EndOfFile => return,
                TokenKind::Newline => self.lookahead_breaks_chain = true,
                TokenKind::NL | TokenKind::Indent | TokenKind::Dedent => {}
                _ => {
                    self.lookahead = Some(token);
                    return;
                }
            }
        }
    }

    fn track_nesting(&mut self, id: TokenId) -> Result<(), BracketError> {
        let ext = self.arena.get(id);
        if ext.is_keyword_id(KeywordId::Lambda) {
            self.stack.push(id);
            return Ok(());
        }
        let Some(p) = ext.token.punctuation_id() else {
            return Ok(());
        };

        if punctuation::is_open(p) {
            self.stack.push(id);
            return Ok(());
        }

        if p == PunctuationId::Colon {
            let top = self.stack.last().copied();
            if let Some(lambda) = top.filter(|t| self.arena.get(*t).is_keyword_id(KeywordId::Lambda)) {
                self.stack.pop();
                self.link(lambda, id);
            }
            return Ok(());
        }

        if !punctuation::is_close(p) {
            return Ok(());
        }

        // A lambda cannot span a close bracket: `f(lambda x)` is already broken, drop it.
        while let Some(top) = self.stack.last().copied() {
            if self.arena.get(top).is_keyword_id(KeywordId::Lambda) {
                self.stack.pop();
            } else {
                break;
            }
        }

        let span = ext.token.span();
        let line = ext.line;
        let Some(open) = self.stack.last().copied() else {
            let error = BracketError::Unmatched { close: p, span, line };
            self.report(&error);
            return Err(error);
        };

        let open_id = self.arena.get(open).token.punctuation_id();
        if open_id.and_then(punctuation::closing_for) != Some(p) {
            let error = BracketError::Mismatched {
                open: open_id.unwrap_or(PunctuationId::LParen),
                close: p,
                span,
                line,
            };
            self.report(&error);
            return Err(error);
        }

        self.stack.pop();
        self.link(open, id);
        let outer = self.stack.last().copied();
        self.arena.get_mut(id).inside = outer;
        Ok(())
    }

    fn link(&mut self, open: TokenId, close: TokenId) {
        self.arena.get_mut(open).matching = Some(close);
        let outer = self.arena.get(open).inside;
        let ext = self.arena.get_mut(close);
        ext.matching = Some(open);
        ext.inside = outer;
    }

    fn report(&mut self, error: &BracketError) {
        let code = match error {
            BracketError::Unmatched { .. } => ErrorCode::UnmatchedBracket,
            BracketError::Mismatched { .. } => ErrorCode::MismatchedBracket,
        };
        tracing::debug!(%error, "bracket mismatch");
        self.errors
            .error("close bracket has no matching open", error.span(), code);
    }
}

// ============================================================================
// LINE INDEX
// ============================================================================

/// Tokens grouped by the (one-indexed) line they start on, loaded on demand.
pub struct LineTokens<'a> {
    wrapper: TokenizerWrapper<'a>,
    /// `lines[n - 1]` is the arena range for line `n`.
    lines: Vec<Range<usize>>,
    bracket_errors: Vec<BracketError>,
}

impl<'a> LineTokens<'a> {
    pub fn new(source: &'a str, version: PythonVersion) -> Self {
        Self::from_wrapper(TokenizerWrapper::new(source, version))
    }

    pub fn from_wrapper(wrapper: TokenizerWrapper<'a>) -> Self {
        Self {
            wrapper,
            lines: Vec::new(),
            bracket_errors: Vec::new(),
        }
    }

    pub fn arena(&self) -> &TokenArena {
        self.wrapper.arena()
    }

    pub fn wrapper(&self) -> &TokenizerWrapper<'a> {
        &self.wrapper
    }

    /// Load every token starting on or before `line`, then peek one token past it.
    pub fn ensure_line(&mut self, line: usize) {
        while self.wrapper.peek().is_some_and(|t| t.start.line <= line) {
            self.advance();
        }
        let _ = self.wrapper.peek();
    }

    /// Load tokens until `open` has found its partner or the input ends.
    pub fn ensure_matching(&mut self, open: TokenId) {
        while self.arena().get(open).matching.is_none() && self.wrapper.peek().is_some() {
            self.advance();
        }
    }

    /// Token ids filed under `line` (empty for lines with no tokens or not loaded yet).
    pub fn line(&self, line: usize) -> impl Iterator<Item = TokenId> + '_ {
        let range = line
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .cloned()
            .unwrap_or(0..0);
        range.map(|i| TokenId(i as u32))
    }

    /// First bracket error reported on `line`, if any.
    pub fn bracket_error_on(&self, line: usize) -> Option<&BracketError> {
        self.bracket_errors.iter().find(|e| e.line() == line)
    }

    fn advance(&mut self) {
        let id = match self.wrapper.next() {
            Ok(Some(id)) => id,
            Ok(None) => return,
            Err(error) => {
                self.bracket_errors.push(error);
                // The token was stored anyway; it is the newest one.
                TokenId(self.wrapper.arena().len() as u32 - 1)
            }
        };
        let line = self.wrapper.arena().get(id).line;
        if self.lines.len() < line {
            let end = id.index();
            self.lines.resize(line, end..end);
        }
        self.lines[line - 1].end = id.index() + 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(source: &str) -> TokenizerWrapper<'_> {
        let mut wrapper = TokenizerWrapper::new(source, PythonVersion::LATEST);
        while let Ok(Some(_)) = wrapper.next() {}
        wrapper
    }

    fn find(arena: &TokenArena, text: &str) -> TokenId {
        arena
            .iter()
            .find(|(_, t)| t.token.text() == text)
            .map(|(id, _)| id)
            .unwrap_or_else(|| panic!("no token {text:?}"))
    }

    #[test]
    fn test_mismatched_bracket_reported_at_close() {
        let mut wrapper = TokenizerWrapper::new("foo(bar]", PythonVersion::LATEST);
        let mut result = Ok(None);
        for _ in 0..4 {
            result = wrapper.next();
        }
        let err = result.expect_err("mismatch");
        assert!(matches!(
            err,
            BracketError::Mismatched {
                open: PunctuationId::LParen,
                close: PunctuationId::RBracket,
                ..
            }
        ));
        assert_eq!(err.span(), Span::new(7, 8));
        assert_eq!(wrapper.errors().len(), 1);
        assert_eq!(wrapper.errors()[0].message, "close bracket has no matching open");
        assert_eq!(wrapper.errors()[0].code, ErrorCode::MismatchedBracket);
        // The stream keeps going.
        assert_eq!(wrapper.next(), Ok(None));
    }

    #[test]
    fn test_unmatched_close_does_not_underflow() {
        let mut wrapper = TokenizerWrapper::new(")]", PythonVersion::LATEST);
        assert!(matches!(wrapper.next(), Err(BracketError::Unmatched { .. })));
        assert!(matches!(wrapper.next(), Err(BracketError::Unmatched { .. })));
        assert_eq!(wrapper.next(), Ok(None));
    }

    #[test]
    fn test_peek_is_idempotent_and_consistent() {
        let mut wrapper = TokenizerWrapper::new("a\n\n  \nb", PythonVersion::LATEST);
        let first = wrapper.peek().cloned();
        assert_eq!(wrapper.peek().cloned(), first);
        let a = wrapper.next().expect("ok").expect("token");
        assert_eq!(Some(&wrapper.arena().get(a).token), first.as_ref());
        let peeked = wrapper.peek().cloned().expect("b");
        let b = wrapper.next().expect("ok").expect("token");
        assert_eq!(wrapper.arena().get(b).token, peeked);
        assert_eq!(wrapper.arena().get(b).token.whitespace, "");
    }

    #[test]
    fn test_links_and_logical_line_break() {
        let wrapper = load("x = f(a)\ny\n");
        let arena = wrapper.arena();
        let open = find(arena, "(");
        let close = find(arena, ")");
        assert_eq!(arena.get(open).matching, Some(close));
        assert_eq!(arena.get(close).matching, Some(open));
        assert_eq!(arena.get(find(arena, "a")).inside, Some(open));
        assert_eq!(arena.get(close).inside, None);
        // `y` starts a new logical line.
        assert_eq!(arena.get(find(arena, "y")).prev, None);
        assert_eq!(arena.get(close).next, None);
    }

    #[test]
    fn test_lambda_scope_ends_at_colon() {
        let wrapper = load("f(lambda x, y=1: {x: y})");
        let arena = wrapper.arena();
        let lambda = find(arena, "lambda");
        let eq = find(arena, "=");
        assert_eq!(arena.get(eq).inside, Some(lambda));
        assert!(arena.is_keyword_equals(eq));
        let colons: Vec<TokenId> = arena
            .iter()
            .filter(|(_, t)| t.is_punct(PunctuationId::Colon))
            .map(|(id, _)| id)
            .collect();
        assert!(arena.is_lambda_colon(colons[0]));
        assert_eq!(arena.get(lambda).matching, Some(colons[0]));
        assert!(!arena.is_lambda_colon(colons[1]));
        assert!(arena.get(arena.get(colons[1]).inside.expect("brace")).is_punct(PunctuationId::LBrace));
    }

    #[test]
    fn test_soft_keywords_only_open_statements() {
        let source = "match p:\n    case [a, *rest]:\n        pass\nmatch = lambda: 0\nmatch: int = 2\nmatch.group(1)\ncase(x)\n";
        let wrapper = load(source);
        let arena = wrapper.arena();
        let named: Vec<TokenId> = arena
            .iter()
            .filter(|(_, t)| matches!(t.kind(), TokenKind::Name(n) if n == "match" || n == "case"))
            .map(|(id, _)| id)
            .collect();
        let soft: Vec<bool> = named
            .iter()
            .map(|&id| arena.is_soft_keyword(id, PythonVersion::LATEST))
            .collect();
        assert_eq!(soft, vec![true, true, false, false, false, false]);
        assert!(!arena.is_soft_keyword(named[0], PythonVersion::V39));
    }

    #[test]
    fn test_keyword_equals_contexts() {
        let wrapper = load("def f(a, b: int = 1, c=2): pass\nx = g(k=3)\n");
        let arena = wrapper.arena();
        let eqs: Vec<TokenId> = arena
            .iter()
            .filter(|(_, t)| t.is_op(OperatorId::Assign))
            .map(|(id, _)| id)
            .collect();
        assert_eq!(eqs.len(), 4);
        assert!(arena.is_annotated_default(eqs[0]));
        assert!(!arena.is_keyword_equals(eqs[0]));
        assert!(arena.is_keyword_equals(eqs[1]));
        assert!(!arena.is_keyword_equals(eqs[2])); // x = ...
        assert!(arena.is_keyword_equals(eqs[3]));
    }

    #[test]
    fn test_slice_simplicity() {
        let wrapper = load("a[1:2]\nb[x+1:y]\nc[::2]\nd[-1:]\ne[f(x):]\n");
        let arena = wrapper.arena();
        let colons: Vec<TokenId> = arena
            .iter()
            .filter(|(_, t)| t.is_punct(PunctuationId::Colon))
            .map(|(id, _)| id)
            .collect();
        assert!(colons.iter().all(|c| arena.is_slice_colon(*c)));
        assert!(arena.is_simple_slice(colons[0]));
        assert!(!arena.is_simple_slice(colons[1]));
        assert!(arena.is_simple_slice(colons[2]));
        assert!(arena.is_simple_slice(colons[3]));
        assert!(arena.is_simple_slice(colons[4]));
        assert!(!arena.is_simple_slice(colons[5]));
    }

    #[test]
    fn test_line_index_grows_lazily() {
        let source = "a = 1\n\nb = (\n    2)\nc\n";
        let mut lines = LineTokens::new(source, PythonVersion::LATEST);
        lines.ensure_line(1);
        assert_eq!(lines.line(1).count(), 3);
        assert_eq!(lines.line(3).count(), 0);
        lines.ensure_line(4);
        assert_eq!(lines.line(2).count(), 0);
        assert_eq!(lines.line(3).count(), 3);
        assert_eq!(lines.line(4).count(), 2);
        assert_eq!(lines.line(0).count(), 0);
        // Asking again changes nothing.
        let before = lines.arena().len();
        lines.ensure_line(2);
        assert_eq!(lines.arena().len(), before);
    }

    #[test]
    fn test_line_index_records_bracket_errors() {
        let mut lines = LineTokens::new("ok = 1\nfoo(bar]\n", PythonVersion::LATEST);
        lines.ensure_line(2);
        assert!(lines.bracket_error_on(1).is_none());
        assert!(lines.bracket_error_on(2).is_some());
    }
}
