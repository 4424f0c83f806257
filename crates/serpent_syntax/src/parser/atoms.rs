/// Atoms, displays, comprehensions, lambdas and string literals.
///
/// This chunk handles everything that can appear at the bottom of the precedence ladder, plus the two
/// constructs that carry their own mini-grammars (lambda parameter lists and comprehension clauses).
impl<'a> Parser<'a> {
    // ========================================================================
    // Atoms
    // ========================================================================

    fn atom(&mut self) -> ParseResult {
        let token = self.peek();
        let span = token.span();

        match &token.kind {
            TokenKind::Name(name) => {
                self.advance();
                Ok(Spanned::new(Expr::Name(name.clone()), span))
            }
            TokenKind::Constant(Literal::Number(number)) => {
                self.advance();
                Ok(Spanned::new(Expr::Constant(number_constant(number)), span))
            }
            TokenKind::Constant(_) => self.strings(),
            TokenKind::Keyword(KeywordId::True) => {
                self.advance();
                Ok(Spanned::new(Expr::Constant(Constant::True), span))
            }
            TokenKind::Keyword(KeywordId::False) => {
                self.advance();
                Ok(Spanned::new(Expr::Constant(Constant::False), span))
            }
            TokenKind::Keyword(KeywordId::None) => {
                self.advance();
                Ok(Spanned::new(Expr::Constant(Constant::None), span))
            }
            TokenKind::Punctuation(PunctuationId::Ellipsis) => {
                self.advance();
                Ok(Spanned::new(Expr::Constant(Constant::Ellipsis), span))
            }
            TokenKind::Punctuation(PunctuationId::LParen) => self.nested(|p| p.paren_atom()),
            TokenKind::Punctuation(PunctuationId::LBracket) => self.nested(|p| p.list_atom()),
            TokenKind::Punctuation(PunctuationId::LBrace) => self.nested(|p| p.brace_atom()),
            TokenKind::Punctuation(PunctuationId::Backquote) => self.nested(|p| p.repr_atom()),
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `()`, `(x)`, `(x,)`, `(x for ...)`, `(yield ...)`.
    fn paren_atom(&mut self) -> ParseResult {
        let start = self.start_offset();
        self.advance(); // (

        if self.match_punct(PunctuationId::RParen) {
            return Ok(Spanned::new(Expr::Tuple(Vec::new()), Span::new(start, self.prev_end())));
        }
        if self.check_keyword(KeywordId::Yield) {
            let expr = self.yield_expr()?;
            self.expect_punct(PunctuationId::RParen, "')'")?;
            return Ok(expr);
        }

        let first = self.star_named_expression()?;
        if self.at_comp_for() {
            let generators = self.comprehension_clauses()?;
            self.expect_punct(PunctuationId::RParen, "')'")?;
            let span = Span::new(start, self.prev_end());
            return Ok(Spanned::new(Expr::Generator(Box::new(first), generators), span));
        }
        if !self.check_punct(PunctuationId::Comma) {
            self.expect_punct(PunctuationId::RParen, "')'")?;
            return Ok(first);
        }

        let mut items = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_punct(PunctuationId::RParen) {
                break;
            }
            items.push(self.star_named_expression()?);
        }
        self.expect_punct(PunctuationId::RParen, "')'")?;
        Ok(Spanned::new(Expr::Tuple(items), Span::new(start, self.prev_end())))
    }

    /// `[...]` list display or list comprehension.
    fn list_atom(&mut self) -> ParseResult {
        let start = self.start_offset();
        self.advance(); // [

        if self.match_punct(PunctuationId::RBracket) {
            return Ok(Spanned::new(Expr::List(Vec::new()), Span::new(start, self.prev_end())));
        }

        let first = self.star_named_expression()?;
        if self.at_comp_for() {
            let generators = self.comprehension_clauses()?;
            self.expect_punct(PunctuationId::RBracket, "']'")?;
            let span = Span::new(start, self.prev_end());
            return Ok(Spanned::new(Expr::ListComp(Box::new(first), generators), span));
        }

        let items = self.display_items(first, PunctuationId::RBracket)?;
        Ok(Spanned::new(Expr::List(items), Span::new(start, self.prev_end())))
    }

    /// `{...}`: dict or set display, or the matching comprehension.
    fn brace_atom(&mut self) -> ParseResult {
        let start = self.start_offset();
        self.advance(); // {

        if self.match_punct(PunctuationId::RBrace) {
            return Ok(Spanned::new(Expr::Dict(Vec::new()), Span::new(start, self.prev_end())));
        }

        if self.check_op(OperatorId::Power) {
            return self.dict_rest(start, Vec::new());
        }

        let first = self.star_named_expression()?;
        if self.match_punct(PunctuationId::Colon) {
            let value = self.expression()?;
            if self.at_comp_for() {
                let generators = self.comprehension_clauses()?;
                self.expect_punct(PunctuationId::RBrace, "'}'")?;
                let span = Span::new(start, self.prev_end());
                return Ok(Spanned::new(
                    Expr::DictComp(Box::new(first), Box::new(value), generators),
                    span,
                ));
            }
            let items = vec![DictItem::Pair(first, value)];
            if self.match_punct(PunctuationId::RBrace) {
                return Ok(Spanned::new(Expr::Dict(items), Span::new(start, self.prev_end())));
            }
            self.expect_punct(PunctuationId::Comma, "',' or '}'")?;
            return self.dict_rest(start, items);
        }

        if self.at_comp_for() {
            let generators = self.comprehension_clauses()?;
            self.expect_punct(PunctuationId::RBrace, "'}'")?;
            let span = Span::new(start, self.prev_end());
            return Ok(Spanned::new(Expr::SetComp(Box::new(first), generators), span));
        }

        let items = self.display_items(first, PunctuationId::RBrace)?;
        Ok(Spanned::new(Expr::Set(items), Span::new(start, self.prev_end())))
    }

    /// Remaining `key: value` / `**mapping` items of a dict display, through the closing `}`.
    fn dict_rest(&mut self, start: usize, mut items: Vec<DictItem>) -> ParseResult {
        while !self.check_punct(PunctuationId::RBrace) {
            if self.match_op(OperatorId::Power) {
                items.push(DictItem::Unpack(self.bitwise_or()?));
            } else {
                let key = self.expression()?;
                self.expect_punct(PunctuationId::Colon, "':'")?;
                let value = self.expression()?;
                items.push(DictItem::Pair(key, value));
            }
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        self.expect_punct(PunctuationId::RBrace, "'}'")?;
        Ok(Spanned::new(Expr::Dict(items), Span::new(start, self.prev_end())))
    }

    /// Comma-separated items after `first`, through the `close` bracket.
    fn display_items(&mut self, first: Spanned<Expr>, close: PunctuationId) -> Result<Vec<Spanned<Expr>>, SyntaxError> {
        let mut items = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_punct(close) {
                break;
            }
            items.push(self.star_named_expression()?);
        }
        let what = format!("',' or '{}'", serpent_core::lang::punctuation::as_str(close));
        self.expect_punct(close, &what)?;
        Ok(items)
    }

    /// Python 2 `` `x` ``.
    fn repr_atom(&mut self) -> ParseResult {
        let start = self.start_offset();
        self.advance(); // `
        let value = self.star_expressions()?;
        self.expect_punct(PunctuationId::Backquote, "closing '`'")?;
        Ok(Spanned::new(Expr::Repr(Box::new(value)), Span::new(start, self.prev_end())))
    }

    // ========================================================================
    // Strings
    // ========================================================================

    /// One or more adjacent string literals, concatenated.
    ///
    /// Any f-string in the run turns the result into a single [`Expr::FString`].
    fn strings(&mut self) -> ParseResult {
        let start = self.start_offset();
        let mut parts: Vec<FStringPart> = Vec::new();
        let mut bytes: Vec<u8> = Vec::new();
        let (mut has_text, mut has_bytes, mut has_fstring) = (false, false, false);

        while let TokenKind::Constant(literal) = &self.peek().kind {
            let span = self.peek().span();
            match literal {
                Literal::Str(s) => {
                    has_text = true;
                    parts.push(FStringPart::Literal(Spanned::new(s.value.clone(), span)));
                }
                Literal::Bytes(b) => {
                    has_bytes = true;
                    bytes.extend_from_slice(&b.value);
                }
                Literal::FString(f) => {
                    has_fstring = true;
                    let parsed = crate::fstring::FStringParser::new(&f.body, f.body_start, f.is_raw, self.version)
                        .with_depth(self.depth + 1)
                        .parse(&mut self.errors);
                    parts.extend(parsed.parts);
                }
                Literal::Number(_) => break,
            }
            self.advance();
        }
        let span = Span::new(start, self.prev_end());

        if has_bytes && (has_text || has_fstring) {
            // Python 2 freely mixes `"..."` (bytes) with `u"..."`.
            if !self.version.is_python2() || has_fstring {
                return Err(SyntaxError::new(
                    "cannot mix bytes and nonbytes literals",
                    span,
                    ErrorCode::InvalidSyntax,
                ));
            }
            let mut text: String = bytes.iter().map(|b| char::from(*b)).collect();
            for part in &parts {
                if let FStringPart::Literal(s) = part {
                    text.push_str(&s.node);
                }
            }
            return Ok(Spanned::new(Expr::Constant(Constant::Str(text)), span));
        }
        if has_bytes {
            return Ok(Spanned::new(Expr::Constant(Constant::Bytes(bytes)), span));
        }
        if has_fstring {
            return Ok(Spanned::new(Expr::FString(FString::new(parts, span)), span));
        }
        let text: String = parts
            .iter()
            .filter_map(|p| match p {
                FStringPart::Literal(s) => Some(s.node.as_str()),
                FStringPart::FormattedValue(_) => None,
            })
            .collect();
        Ok(Spanned::new(Expr::Constant(Constant::Str(text)), span))
    }

    // ========================================================================
    // Lambda, yield, comprehensions
    // ========================================================================

    /// `lambda [params]: body`
    fn lambda(&mut self) -> ParseResult {
        let start = self.start_offset();
        self.advance(); // lambda
        let params = self.lambda_params()?;
        self.expect_punct(PunctuationId::Colon, "':' after lambda parameters")?;
        let body = self.nested(|p| p.expression())?;
        let span = Span::new(start, body.span.end);
        Ok(Spanned::new(Expr::Lambda(params, Box::new(body)), span))
    }

    fn lambda_params(&mut self) -> Result<Vec<Param>, SyntaxError> {
        let mut params = Vec::new();
        while !self.check_punct(PunctuationId::Colon) {
            let start = self.start_offset();
            let (name, kind, default) = if self.match_op(OperatorId::Star) {
                if matches!(self.peek().kind, TokenKind::Name(_)) {
                    (Some(self.expect_name()?.node), ParamKind::VarArgs, None)
                } else {
                    (None, ParamKind::KeywordOnlyMarker, None)
                }
            } else if self.match_op(OperatorId::Power) {
                (Some(self.expect_name()?.node), ParamKind::KwArgs, None)
            } else if self.check_op(OperatorId::Slash) {
                if !self.version.has_positional_only_params() {
                    return Err(self.unexpected("parameter name"));
                }
                self.advance();
                (None, ParamKind::PositionalOnlyMarker, None)
            } else {
                let name = self.expect_name()?.node;
                let default = if self.match_op(OperatorId::Assign) {
                    Some(self.expression()?)
                } else {
                    None
                };
                (Some(name), ParamKind::Normal, default)
            };
            params.push(Param {
                name,
                kind,
                default,
                span: Span::new(start, self.prev_end()),
            });
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok(params)
    }

    /// `yield`, `yield x, y`, `yield from x`.
    fn yield_expr(&mut self) -> ParseResult {
        let start = self.start_offset();
        self.advance(); // yield
        if self.match_keyword(KeywordId::From) {
            let value = self.expression()?;
            let span = Span::new(start, value.span.end);
            return Ok(Spanned::new(Expr::YieldFrom(Box::new(value)), span));
        }
        if !self.starts_expression() || self.check_keyword(KeywordId::Yield) {
            return Ok(Spanned::new(Expr::Yield(None), Span::new(start, self.prev_end())));
        }
        let value = self.star_expressions()?;
        let span = Span::new(start, value.span.end);
        Ok(Spanned::new(Expr::Yield(Some(Box::new(value))), span))
    }

    /// One or more `[async] for target in iter [if cond]*` clauses.
    fn comprehension_clauses(&mut self) -> Result<Vec<Comprehension>, SyntaxError> {
        let mut clauses = Vec::new();
        while self.at_comp_for() {
            let is_async = self.match_keyword(KeywordId::Async);
            self.advance(); // for
            let target = self.target_list()?;
            self.expect_keyword(KeywordId::In, "'in'")?;
            let iter = self.or_test()?;
            let mut ifs = Vec::new();
            while self.match_keyword(KeywordId::If) {
                ifs.push(self.or_test()?);
            }
            clauses.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
        }
        Ok(clauses)
    }

    /// Comprehension target: `x`, `x, y`, `(a, b), *rest`.
    fn target_list(&mut self) -> ParseResult {
        let first = self.target()?;
        if !self.check_punct(PunctuationId::Comma) {
            return Ok(first);
        }
        let start = first.span.start;
        let mut items = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_keyword(KeywordId::In) {
                break;
            }
            items.push(self.target()?);
        }
        Ok(Spanned::new(Expr::Tuple(items), Span::new(start, self.prev_end())))
    }

    fn target(&mut self) -> ParseResult {
        if self.check_op(OperatorId::Star) {
            let start = self.start_offset();
            self.advance();
            let value = self.bitwise_or()?;
            let span = Span::new(start, value.span.end);
            return Ok(Spanned::new(Expr::Starred(Box::new(value)), span));
        }
        self.bitwise_or()
    }
}

fn number_constant(number: &Number) -> Constant {
    match number {
        Number::Int(v) => Constant::Int(*v),
        Number::LargeInt(s) => Constant::LargeInt(s.clone()),
        Number::Float(v) => Constant::Float(*v),
        Number::Imaginary(v) => Constant::Imaginary(*v),
    }
}
