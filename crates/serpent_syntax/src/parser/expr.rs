/// Expression parsing methods.
///
/// This chunk implements the expression grammar using a precedence ladder:
/// lambda/conditional → `or` → `and` → `not` → comparison → `|` → `^` → `&` → shifts → additive →
/// multiplicative → unary → power → `await` → postfix → atom.
///
/// ## Notes
/// - Operator identities are carried by [`TokenKind::Operator`] / [`OperatorId`] rather than string spellings.
/// - Every helper returns [`Spanned<Expr>`] with absolute spans so f-string fields map back to the file.
impl<'a> Parser<'a> {
    // ========================================================================
    // Expression lists
    // ========================================================================

    /// `a, *b, c` becomes a tuple when a comma is present.
    fn star_expressions(&mut self) -> ParseResult {
        let first = self.star_named_expression()?;
        if !self.check_punct(PunctuationId::Comma) {
            return Ok(first);
        }
        let start = first.span.start;
        let mut items = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if !self.starts_expression() {
                break;
            }
            items.push(self.star_named_expression()?);
        }
        Ok(Spanned::new(Expr::Tuple(items), Span::new(start, self.prev_end())))
    }

    fn star_named_expression(&mut self) -> ParseResult {
        if self.check_op(OperatorId::Star) {
            let start = self.start_offset();
            self.advance();
            let value = self.bitwise_or()?;
            let span = Span::new(start, value.span.end);
            return Ok(Spanned::new(Expr::Starred(Box::new(value)), span));
        }
        self.named_expression()
    }

    /// `name := value` or a plain expression.
    fn named_expression(&mut self) -> ParseResult {
        if matches!(self.peek().kind, TokenKind::Name(_)) && self.peek_next().kind.is_operator(OperatorId::Walrus) {
            let target = self.expect_name()?;
            self.advance(); // :=
            let value = self.expression()?;
            let span = target.span.merge(value.span);
            let target = Spanned::new(Expr::Name(target.node), target.span);
            return Ok(Spanned::new(Expr::Named(Box::new(target), Box::new(value)), span));
        }
        self.expression()
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// `lambda`, or a disjunction optionally followed by `if ... else ...`.
    fn expression(&mut self) -> ParseResult {
        if self.check_keyword(KeywordId::Lambda) {
            return self.lambda();
        }
        let body = self.or_test()?;
        if !self.match_keyword(KeywordId::If) {
            return Ok(body);
        }
        let test = self.or_test()?;
        self.expect_keyword(KeywordId::Else, "'else' in conditional expression")?;
        let orelse = self.expression()?;
        let span = body.span.merge(orelse.span);
        Ok(Spanned::new(
            Expr::IfExp {
                body: Box::new(body),
                test: Box::new(test),
                orelse: Box::new(orelse),
            },
            span,
        ))
    }

    fn or_test(&mut self) -> ParseResult {
        let first = self.and_test()?;
        if !self.check_keyword(KeywordId::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.match_keyword(KeywordId::Or) {
            values.push(self.and_test()?);
        }
        let span = values[0].span.merge(values[values.len() - 1].span);
        Ok(Spanned::new(Expr::BoolOp(BoolOp::Or, values), span))
    }

    fn and_test(&mut self) -> ParseResult {
        let first = self.not_test()?;
        if !self.check_keyword(KeywordId::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.match_keyword(KeywordId::And) {
            values.push(self.not_test()?);
        }
        let span = values[0].span.merge(values[values.len() - 1].span);
        Ok(Spanned::new(Expr::BoolOp(BoolOp::And, values), span))
    }

    fn not_test(&mut self) -> ParseResult {
        if self.check_keyword(KeywordId::Not) {
            let start = self.start_offset();
            self.advance();
            let expr = self.nested(|p| p.not_test())?;
            let span = Span::new(start, expr.span.end);
            return Ok(Spanned::new(Expr::Unary(UnaryOp::Not, Box::new(expr)), span));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> ParseResult {
        let left = self.bitwise_or()?;
        let mut comparisons = Vec::new();

        loop {
            let op = if self.match_op(OperatorId::EqEq) {
                CompareOp::Eq
            } else if self.match_op(OperatorId::NotEq) || self.match_op(OperatorId::LtGt) {
                CompareOp::NotEq
            } else if self.match_op(OperatorId::Lt) {
                CompareOp::Lt
            } else if self.match_op(OperatorId::LtEq) {
                CompareOp::LtEq
            } else if self.match_op(OperatorId::Gt) {
                CompareOp::Gt
            } else if self.match_op(OperatorId::GtEq) {
                CompareOp::GtEq
            } else if self.match_keyword(KeywordId::In) {
                CompareOp::In
            } else if self.check_keyword(KeywordId::Not) && self.peek_next().kind.is_keyword(KeywordId::In) {
                self.advance(); // not
                self.advance(); // in
                CompareOp::NotIn
            } else if self.match_keyword(KeywordId::Is) {
                if self.match_keyword(KeywordId::Not) {
                    CompareOp::IsNot
                } else {
                    CompareOp::Is
                }
            } else {
                break;
            };
            comparisons.push((op, self.bitwise_or()?));
        }

        if comparisons.is_empty() {
            return Ok(left);
        }
        let end = comparisons[comparisons.len() - 1].1.span.end;
        let span = Span::new(left.span.start, end);
        Ok(Spanned::new(Expr::Compare(Box::new(left), comparisons), span))
    }

    fn bitwise_or(&mut self) -> ParseResult {
        let mut left = self.bitwise_xor()?;
        while self.match_op(OperatorId::BitOr) {
            let right = self.bitwise_xor()?;
            left = binary(left, BinaryOp::BitOr, right);
        }
        Ok(left)
    }

    fn bitwise_xor(&mut self) -> ParseResult {
        let mut left = self.bitwise_and()?;
        while self.match_op(OperatorId::BitXor) {
            let right = self.bitwise_and()?;
            left = binary(left, BinaryOp::BitXor, right);
        }
        Ok(left)
    }

    fn bitwise_and(&mut self) -> ParseResult {
        let mut left = self.shift()?;
        while self.match_op(OperatorId::BitAnd) {
            let right = self.shift()?;
            left = binary(left, BinaryOp::BitAnd, right);
        }
        Ok(left)
    }

    fn shift(&mut self) -> ParseResult {
        let mut left = self.additive()?;
        loop {
            let op = if self.match_op(OperatorId::LeftShift) {
                BinaryOp::LShift
            } else if self.match_op(OperatorId::RightShift) {
                BinaryOp::RShift
            } else {
                break;
            };
            let right = self.additive()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn additive(&mut self) -> ParseResult {
        let mut left = self.multiplicative()?;
        loop {
            let op = if self.match_op(OperatorId::Plus) {
                BinaryOp::Add
            } else if self.match_op(OperatorId::Minus) {
                BinaryOp::Sub
            } else {
                break;
            };
            let right = self.multiplicative()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    fn multiplicative(&mut self) -> ParseResult {
        let mut left = self.factor()?;
        loop {
            let op = if self.match_op(OperatorId::Star) {
                BinaryOp::Mul
            } else if self.match_op(OperatorId::At) {
                BinaryOp::MatMul
            } else if self.match_op(OperatorId::FloorDiv) {
                BinaryOp::FloorDiv
            } else if self.match_op(OperatorId::Slash) {
                BinaryOp::Div
            } else if self.match_op(OperatorId::Percent) {
                BinaryOp::Mod
            } else {
                break;
            };
            let right = self.factor()?;
            left = binary(left, op, right);
        }
        Ok(left)
    }

    /// Prefix `+`, `-`, `~`.
    fn factor(&mut self) -> ParseResult {
        let op = match self.peek().operator_id() {
            Some(OperatorId::Plus) => UnaryOp::Plus,
            Some(OperatorId::Minus) => UnaryOp::Minus,
            Some(OperatorId::Tilde) => UnaryOp::Invert,
            _ => return self.power(),
        };
        let start = self.start_offset();
        self.advance();
        let operand = self.nested(|p| p.factor())?;
        let span = Span::new(start, operand.span.end);
        Ok(Spanned::new(Expr::Unary(op, Box::new(operand)), span))
    }

    /// `**` binds tighter than a unary operator on its left and is right-associative: `-2**-1` is `-(2**(-1))`.
    fn power(&mut self) -> ParseResult {
        let base = self.await_primary()?;
        if !self.match_op(OperatorId::Power) {
            return Ok(base);
        }
        let exponent = self.factor()?;
        Ok(binary(base, BinaryOp::Pow, exponent))
    }

    fn await_primary(&mut self) -> ParseResult {
        if self.check_keyword(KeywordId::Await) {
            let start = self.start_offset();
            self.advance();
            let expr = self.primary()?;
            let span = Span::new(start, expr.span.end);
            return Ok(Spanned::new(Expr::Await(Box::new(expr)), span));
        }
        self.primary()
    }

    /// An atom followed by any number of `.name`, `(...)` and `[...]` trailers.
    fn primary(&mut self) -> ParseResult {
        let mut expr = self.atom()?;

        loop {
            if self.match_punct(PunctuationId::Dot) {
                let name = self.expect_name()?;
                let span = Span::new(expr.span.start, name.span.end);
                expr = Spanned::new(Expr::Attribute(Box::new(expr), name.node), span);
            } else if self.check_punct(PunctuationId::LParen) {
                self.advance();
                let args = self.nested(|p| p.arguments())?;
                self.expect_punct(PunctuationId::RParen, "')'")?;
                let span = Span::new(expr.span.start, self.prev_end());
                expr = Spanned::new(Expr::Call(Box::new(expr), args), span);
            } else if self.check_punct(PunctuationId::LBracket) {
                self.advance();
                let index = self.nested(|p| p.subscripts())?;
                self.expect_punct(PunctuationId::RBracket, "']'")?;
                let span = Span::new(expr.span.start, self.prev_end());
                expr = Spanned::new(Expr::Subscript(Box::new(expr), Box::new(index)), span);
            } else {
                break;
            }
        }

        Ok(expr)
    }

    // ========================================================================
    // Subscripts and slices
    // ========================================================================

    /// Contents of `[...]`: one item, or a tuple of items when commas are present.
    fn subscripts(&mut self) -> ParseResult {
        let first = self.subscript_item()?;
        if !self.check_punct(PunctuationId::Comma) {
            return Ok(first);
        }
        let start = first.span.start;
        let mut items = vec![first];
        while self.match_punct(PunctuationId::Comma) {
            if self.check_punct(PunctuationId::RBracket) {
                break;
            }
            items.push(self.subscript_item()?);
        }
        Ok(Spanned::new(Expr::Tuple(items), Span::new(start, self.prev_end())))
    }

    /// `x`, `*x`, or a slice `[lower]:[upper][:[step]]`.
    fn subscript_item(&mut self) -> ParseResult {
        let start = self.start_offset();
        let lower = if self.check_punct(PunctuationId::Colon) {
            None
        } else {
            let item = self.star_named_expression()?;
            if !self.check_punct(PunctuationId::Colon) {
                return Ok(item);
            }
            Some(Box::new(item))
        };

        self.advance(); // :
        let upper = self.slice_bound()?;
        let step = if self.match_punct(PunctuationId::Colon) {
            self.slice_bound()?
        } else {
            None
        };
        let span = Span::new(start, self.prev_end());
        Ok(Spanned::new(Expr::Slice { lower, upper, step }, span))
    }

    fn slice_bound(&mut self) -> Result<Option<ExprBox>, SyntaxError> {
        if self.check_punct(PunctuationId::Colon)
            || self.check_punct(PunctuationId::Comma)
            || self.check_punct(PunctuationId::RBracket)
        {
            return Ok(None);
        }
        Ok(Some(Box::new(self.expression()?)))
    }

    // ========================================================================
    // Call arguments
    // ========================================================================

    /// Arguments up to (not including) the closing `)`.
    fn arguments(&mut self) -> Result<Vec<Arg>, SyntaxError> {
        let mut args = Vec::new();
        while !self.check_punct(PunctuationId::RParen) {
            args.push(self.argument()?);
            if !self.match_punct(PunctuationId::Comma) {
                break;
            }
        }
        Ok(args)
    }

    fn argument(&mut self) -> Result<Arg, SyntaxError> {
        let start = self.start_offset();
        if self.match_op(OperatorId::Star) {
            let value = self.expression()?;
            let span = Span::new(start, value.span.end);
            return Ok(Arg::Star(Spanned::new(Expr::Starred(Box::new(value)), span)));
        }
        if self.match_op(OperatorId::Power) {
            return Ok(Arg::DoubleStar(self.expression()?));
        }
        if matches!(self.peek().kind, TokenKind::Name(_)) && self.peek_next().kind.is_operator(OperatorId::Assign) {
            let name = self.expect_name()?;
            self.advance(); // =
            let value = self.expression()?;
            return Ok(Arg::Keyword(name, value));
        }

        let value = self.named_expression()?;
        if self.at_comp_for() {
            let generators = self.comprehension_clauses()?;
            let span = Span::new(start, self.prev_end());
            return Ok(Arg::Positional(Spanned::new(Expr::Generator(Box::new(value), generators), span)));
        }
        Ok(Arg::Positional(value))
    }
}

/// Combine two operands into a binary node spanning both.
fn binary(left: Spanned<Expr>, op: BinaryOp, right: Spanned<Expr>) -> Spanned<Expr> {
    let span = left.span.merge(right.span);
    Spanned::new(Expr::Binary(Box::new(left), op, Box::new(right)), span)
}
