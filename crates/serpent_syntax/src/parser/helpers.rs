/// Token-stream helpers.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking/consuming tokens (`peek`, `advance`)
/// - Matching / expecting keywords, operators, and punctuation
/// - The nesting guard shared with the f-string parser
impl<'a> Parser<'a> {
    // ========================================================================
    // Helpers
    // ========================================================================

    /// Return `true` if the current token is [`TokenKind::EndOfFile`].
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::EndOfFile)
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &'a Token {
        let tokens = self.tokens;
        &tokens[self.pos.min(tokens.len() - 1)]
    }

    /// Return the token after the current token without consuming it.
    fn peek_next(&self) -> &'a Token {
        let tokens = self.tokens;
        &tokens[(self.pos + 1).min(tokens.len() - 1)]
    }

    /// Advance to the next token and return the token we just consumed.
    fn advance(&mut self) -> &'a Token {
        let tokens = self.tokens;
        let current = self.pos.min(tokens.len() - 1);
        if !self.is_at_end() {
            self.pos += 1;
        }
        &tokens[current]
    }

    /// Start offset of the current token.
    fn start_offset(&self) -> usize {
        self.peek().start.offset
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1) {
            Some(i) => self.tokens[i].end.offset,
            None => self.start_offset(),
        }
    }

    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    fn check_op(&self, id: OperatorId) -> bool {
        self.peek().kind.is_operator(id)
    }

    fn match_keyword(&mut self, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_op(&mut self, id: OperatorId) -> bool {
        if self.check_op(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, id: PunctuationId, what: &str) -> Result<(), SyntaxError> {
        if self.match_punct(id) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_keyword(&mut self, id: KeywordId, what: &str) -> Result<(), SyntaxError> {
        if self.match_keyword(id) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn expect_name(&mut self) -> Result<Spanned<String>, SyntaxError> {
        if let TokenKind::Name(name) = &self.peek().kind {
            let name = name.clone();
            let span = self.peek().span();
            self.advance();
            Ok(Spanned::new(name, span))
        } else {
            Err(self.unexpected("name"))
        }
    }

    /// Build an "expected X" error at the current token.
    fn unexpected(&self, expected: &str) -> SyntaxError {
        let found = self.peek();
        let message = if matches!(found.kind, TokenKind::EndOfFile) {
            format!("expected {expected}, found end of expression")
        } else {
            format!("expected {expected}, found '{}'", found.text())
        };
        SyntaxError::new(message, found.span(), ErrorCode::InvalidSyntax)
    }

    /// Run `f` one nesting level deeper, refusing to go past [`MAX_NESTING_DEPTH`].
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>) -> Result<T, SyntaxError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::new(
                "expression is nested too deeply",
                self.peek().span(),
                ErrorCode::NestingTooDeep,
            ));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// The current token can begin an expression (used after a trailing comma).
    fn starts_expression(&self) -> bool {
        let kind = &self.peek().kind;
        match kind {
            TokenKind::Name(_) | TokenKind::Constant(_) => true,
            TokenKind::Keyword(id) => matches!(
                id,
                KeywordId::True
                    | KeywordId::False
                    | KeywordId::None
                    | KeywordId::Lambda
                    | KeywordId::Not
                    | KeywordId::Await
                    | KeywordId::Yield
            ),
            TokenKind::Operator(id) => matches!(
                id,
                OperatorId::Plus | OperatorId::Minus | OperatorId::Tilde | OperatorId::Star | OperatorId::Power
            ),
            TokenKind::Punctuation(id) => matches!(
                id,
                PunctuationId::LParen
                    | PunctuationId::LBracket
                    | PunctuationId::LBrace
                    | PunctuationId::Ellipsis
                    | PunctuationId::Backquote
            ),
            _ => false,
        }
    }

    /// `async for` / `for` starts a comprehension clause.
    fn at_comp_for(&self) -> bool {
        self.check_keyword(KeywordId::For)
            || (self.check_keyword(KeywordId::Async) && self.peek_next().kind.is_keyword(KeywordId::For))
    }
}
