/// Parser core types and entrypoint.
///
/// This chunk defines the [`Parser`] type and its `parse()` entrypoint.
///
/// ## Notes
/// - This file is `include!`'d into `crate::parser` to keep all parser methods in a
///   single module while avoiding a single “god file”.
/// - Nesting (brackets, unary chains, f-strings inside f-strings) is bounded by [`MAX_NESTING_DEPTH`]. The
///   counter is threaded through the f-string parser so mutual recursion shares one budget.

/// Deepest bracket/unary/f-string nesting accepted before reporting [`ErrorCode::NestingTooDeep`].
pub const MAX_NESTING_DEPTH: usize = 64;

type ParseResult = Result<Spanned<Expr>, SyntaxError>;

/// Parser state.
///
/// ## Notes
/// - The token slice must end with `EndOfFile` and must not contain layout or trivia tokens.
/// - Parsing stops at the first error; the caller gets an [`Expr::Error`] covering the whole fragment.
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    version: PythonVersion,
    depth: usize,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for a token stream.
    pub fn new(tokens: &'a [Token], version: PythonVersion) -> Self {
        Self::with_depth(tokens, version, 0)
    }

    pub(crate) fn with_depth(tokens: &'a [Token], version: PythonVersion, depth: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            version,
            depth,
            errors: Vec::new(),
        }
    }

    /// Parse the whole token stream as one expression.
    ///
    /// Always produces a node; errors (including those from nested f-strings) are returned alongside it.
    pub fn parse(mut self) -> (Spanned<Expr>, Vec<SyntaxError>) {
        let result = self.top_level().and_then(|expr| {
            if self.is_at_end() {
                Ok(expr)
            } else {
                Err(self.unexpected("end of expression"))
            }
        });

        match result {
            Ok(expr) => (expr, self.errors),
            Err(e) => {
                self.errors.push(e);
                let span = self.full_span();
                (Spanned::new(Expr::Error, span), self.errors)
            }
        }
    }

    /// `yield ...` or a (possibly starred) expression list.
    fn top_level(&mut self) -> ParseResult {
        if self.check_keyword(KeywordId::Yield) {
            return self.yield_expr();
        }
        self.star_expressions()
    }

    fn full_span(&self) -> Span {
        match (self.tokens.first(), self.tokens.last()) {
            (Some(first), Some(last)) => Span::new(first.start.offset, last.end.offset.max(first.start.offset)),
            _ => Span::default(),
        }
    }
}
