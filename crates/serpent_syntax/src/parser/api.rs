/// Parse a source fragment as a single expression.
///
/// This is the main public entrypoint for parsing. The fragment is tokenized as if it were wrapped in
/// parentheses, so it may span several lines.
///
/// ## Parameters
/// - `text`: the fragment.
/// - `origin`: where `text` starts in the enclosing file; every span in the result is absolute.
/// - `sink`: receives tokenizer and parser errors.
///
/// ## Returns
/// The parsed expression, or an [`Expr::Error`] node covering the fragment if parsing failed.
#[tracing::instrument(skip_all, fields(text_len = text.len(), version = %version))]
pub fn parse_expression(text: &str, origin: Location, version: PythonVersion, sink: &mut dyn ErrorSink) -> Spanned<Expr> {
    parse_expression_at_depth(text, origin, version, sink, 0)
}

/// [`parse_expression`] with an explicit starting nesting depth (used by the f-string parser).
pub(crate) fn parse_expression_at_depth(
    text: &str,
    origin: Location,
    version: PythonVersion,
    sink: &mut dyn ErrorSink,
    depth: usize,
) -> Spanned<Expr> {
    let options = TokenizerOptions::new().with_implicit_parens(true);
    let mut tokenizer = Tokenizer::with_origin(text, origin, version, options);
    let tokens: Vec<Token> = tokenizer
        .by_ref()
        .filter(|t| !t.kind.is_layout() && !t.kind.is_comment() && t.kind != TokenKind::ExplicitLineJoin)
        .collect();
    tokenizer.drain_errors_into(sink);

    let (expr, errors) = Parser::with_depth(&tokens, version, depth).parse();
    tracing::trace!(errors = errors.len(), "parsed expression fragment");
    for error in errors {
        crate::diagnostics::report(sink, error);
    }
    expr
}
