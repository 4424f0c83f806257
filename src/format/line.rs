//! On-type line formatter
//!
//! [`LineFormatter`] re-spaces the tokens of one physical line and returns at most one edit. Tokens are
//! pulled lazily from a single [`LineTokens`] session, so formatting several lines of the same document
//! advances one tokenizer cursor monotonically.
//!
//! ## Notes
//! - Leading indentation is never touched: the edit starts at the first token of the line.
//! - A multiline string ending on the line is left alone and the edit starts after it; one opening on
//!   the line ends the edit at its start.
//! - String and number tokens are written back from their verbatim source text.
//! - A bracket mismatch or an unexpected token pair fails the line: the failure is logged and no edits
//!   are returned.

use serpent_core::PythonVersion;
use serpent_core::lang::keywords::KeywordId;
use serpent_core::lang::operators::OperatorId;
use serpent_core::lang::punctuation::PunctuationId;
use serpent_syntax::ast::Location;
use serpent_syntax::lexer::{self, Token, TokenKind};
use serpent_syntax::wrapper::{BracketError, LineTokens, TokenArena, TokenExt, TokenId};

use super::config::FormatOptions;
use super::edit::{Position, TextEdit, TextRange};
use super::writer::{LineWriter, Spacing};

/// Why a line was left unformatted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("line {line}: {source}")]
    Bracket {
        line: usize,
        #[source]
        source: BracketError,
    },
    #[error("line {line}: no spacing rule for {text:?}")]
    Unhandled { line: usize, text: String },
}

/// Formats single lines of one document.
pub struct LineFormatter<'a> {
    text: &'a str,
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
    options: FormatOptions,
    tokens: LineTokens<'a>,
}

impl<'a> LineFormatter<'a> {
    pub fn new(text: &'a str, options: FormatOptions) -> Self {
        let line_starts = lexer::line_starts(text);
        let tokens = LineTokens::new(text, options.version);
        Self {
            text,
            line_starts,
            options,
            tokens,
        }
    }

    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Format one-indexed `line`. Returns zero or one edit.
    #[tracing::instrument(skip(self), fields(version = %self.options.version))]
    pub fn format_line(&mut self, line: usize) -> Vec<TextEdit> {
        match self.try_format_line(line) {
            Ok(edit) => edit.into_iter().collect(),
            Err(error) => {
                tracing::warn!(%error, "line left unformatted");
                Vec::new()
            }
        }
    }

    /// Format every line of the document.
    pub fn format_document(&mut self) -> Vec<TextEdit> {
        (1..=self.line_count())
            .flat_map(|line| self.format_line(line))
            .collect()
    }

    /// [`LineFormatter::format_line`] with the failure reason.
    pub fn try_format_line(&mut self, line: usize) -> Result<Option<TextEdit>, FormatError> {
        if line < 1 || line > self.line_count() {
            return Ok(None);
        }
        self.tokens.ensure_line(line);
        if let Some(error) = self.tokens.bracket_error_on(line) {
            return Err(FormatError::Bracket {
                line,
                source: error.clone(),
            });
        }

        let ids: Vec<TokenId> = self.tokens.line(line).collect();
        let (Some(&first), Some(&last)) = (ids.first(), ids.last()) else {
            return Ok(None);
        };

        // Slice colons look at the right-hand operand, which may continue on later lines.
        let unclosed: Vec<TokenId> = ids
            .iter()
            .filter_map(|&id| {
                let arena = self.tokens.arena();
                let ext = arena.get(id);
                ext.inside.filter(|&open| {
                    ext.is_punct(PunctuationId::Colon)
                        && arena.get(open).is_punct(PunctuationId::LBracket)
                        && arena.get(open).matching.is_none()
                })
            })
            .collect();
        for open in unclosed {
            self.tokens.ensure_matching(open);
        }

        let arena = self.tokens.arena();
        let anchor = first
            .index()
            .checked_sub(1)
            .map(|i| TokenId(i as u32))
            .filter(|&p| arena.get(p).is_multiline_string() && arena.get(p).token.end.line == line);
        let opens_string = arena.get(last).is_multiline_string();
        let emitted = if opens_string { &ids[..ids.len() - 1] } else { &ids[..] };

        let mut writer = LineWriter::new();
        let mut prev = anchor;
        for &id in emitted {
            let ext = arena.get(id);
            if matches!(ext.kind(), TokenKind::Error(_)) {
                return Err(FormatError::Unhandled {
                    line,
                    text: ext.token.text(),
                });
            }
            if let Some(p) = prev {
                writer.separate(&self.spacing(arena, p, id, line)?);
            }
            writer.write(&token_text(&ext.token));
            prev = Some(id);
        }
        if opens_string {
            if let Some(p) = prev {
                writer.separate(&self.spacing(arena, p, last, line)?);
            }
        }

        let start = match anchor {
            Some(a) => arena.get(a).token.end,
            None => arena.get(first).token.start,
        };
        let (end_offset, end_position) = if opens_string {
            let s = arena.get(last).token.start;
            (s.offset, position_of(s))
        } else {
            self.line_content_end(line)
        };
        let new_text = if opens_string {
            writer.finish()
        } else {
            writer.finish_trimmed()
        };

        let original = self.text.get(start.offset..end_offset).unwrap_or_default();
        if new_text.is_empty() || new_text == original {
            return Ok(None);
        }
        tracing::debug!(line, %new_text, "line reformatted");
        Ok(Some(TextEdit::new(
            TextRange::new(position_of(start), end_position),
            new_text,
        )))
    }

    /// Offset and position of the end of `line`'s content (before the line break).
    fn line_content_end(&self, line: usize) -> (usize, Position) {
        let start = self.line_starts[line - 1];
        let end = lexer::line_content_end(self.text, start);
        (end, Position::new(line - 1, self.text[start..end].chars().count()))
    }

    // ========================================================================
    // Spacing rules
    // ========================================================================

    /// Separator between `left` and `right`, two consecutive tokens of the line.
    fn spacing(&self, arena: &TokenArena, left: TokenId, right: TokenId, line: usize) -> Result<Spacing, FormatError> {
        use PunctuationId as P;
        let l = arena.get(left);
        let r = arena.get(right);

        if matches!(l.kind(), TokenKind::Error(_)) || matches!(r.kind(), TokenKind::Error(_)) {
            return Err(FormatError::Unhandled {
                line,
                text: r.token.text(),
            });
        }

        if r.is_comment() {
            let ws = &r.token.whitespace;
            return Ok(if ws.len() >= self.options.comment_padding {
                Spacing::Keep(ws.clone())
            } else {
                Spacing::Spaces(self.options.comment_padding)
            });
        }
        if matches!(r.kind(), TokenKind::ExplicitLineJoin) {
            return Ok(Spacing::Space);
        }

        // from . import x, from ..pkg import y
        if (r.is_punct(P::Dot) || r.is_punct(P::Ellipsis)) && l.is_keyword_id(KeywordId::From) {
            return Ok(Spacing::Space);
        }
        if in_relative_import(arena, left) {
            return Ok(if r.is_keyword() { Spacing::Space } else { Spacing::None });
        }
        // `case [a, *rest]:` is a pattern, not a subscript.
        if arena.is_soft_keyword(left, self.options.version) {
            return Ok(Spacing::Space);
        }

        if l.is_open() || r.is_close() || r.is_punct(P::Comma) || r.is_punct(P::Semicolon) {
            return Ok(Spacing::None);
        }
        if l.is_punct(P::Comma) {
            return Ok(if r.is_punct(P::Colon) { Spacing::None } else { Spacing::Space });
        }
        if l.is_punct(P::Semicolon) {
            return Ok(Spacing::Space);
        }

        if r.is_punct(P::Colon) {
            let spaced = arena.is_slice_colon(right) && !l.is_punct(P::Colon) && !arena.is_simple_slice(right);
            return Ok(if spaced { Spacing::Space } else { Spacing::None });
        }
        if l.is_punct(P::Colon) {
            let tight = if arena.is_slice_colon(left) {
                arena.is_simple_slice(left)
            } else {
                r.is_punct(P::Colon)
            };
            return Ok(if tight { Spacing::None } else { Spacing::Space });
        }

        if r.is_punct(P::Dot) {
            // `1 .real`, not `1.real`
            return Ok(if l.is_number() { Spacing::Space } else { Spacing::None });
        }
        if l.is_punct(P::Dot) {
            return Ok(Spacing::None);
        }
        if l.is_punct(P::Arrow) || r.is_punct(P::Arrow) {
            return Ok(Spacing::Space);
        }
        if l.is_punct(P::Backquote) || r.is_punct(P::Backquote) {
            return Ok(Spacing::Keep(r.token.whitespace.clone()));
        }

        if l.is_operator() {
            let tight = arena.is_keyword_equals(left) || is_prefix_operator(arena, left, self.options.version);
            return Ok(if tight { Spacing::None } else { Spacing::Space });
        }
        if r.is_operator() {
            return Ok(if arena.is_keyword_equals(right) {
                Spacing::None
            } else {
                Spacing::Space
            });
        }

        if r.is_keyword() {
            return Ok(Spacing::Space);
        }
        if l.is_keyword() {
            // Python 2 `print(x)` / `exec(code)` stay call-shaped.
            let call_like = (l.is_keyword_id(KeywordId::Print) || l.is_keyword_id(KeywordId::Exec)) && r.is_punct(P::LParen);
            return Ok(if call_like { Spacing::None } else { Spacing::Space });
        }

        if is_value_end(l) {
            if r.is_open() {
                return Ok(Spacing::None);
            }
            if r.kind().is_value() {
                return Ok(Spacing::Space);
            }
        }

        Err(FormatError::Unhandled {
            line,
            text: r.token.text(),
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn position_of(location: Location) -> Position {
    Position::new(location.line.saturating_sub(1), location.column)
}

fn token_text(token: &Token) -> String {
    match token.kind {
        TokenKind::ExplicitLineJoin => "\\".to_string(),
        _ => token.text(),
    }
}

/// Names, constants and close brackets: things a call or subscript can follow.
fn is_value_end(ext: &TokenExt) -> bool {
    ext.kind().is_value() || ext.is_close()
}

/// `id` is one of the dots between `from` and the module name.
fn in_relative_import(arena: &TokenArena, id: TokenId) -> bool {
    let mut cur = Some(id);
    while let Some(c) = cur {
        let ext = arena.get(c);
        if ext.is_keyword_id(KeywordId::From) {
            return c != id;
        }
        if !(ext.is_punct(PunctuationId::Dot) || ext.is_punct(PunctuationId::Ellipsis)) {
            return false;
        }
        cur = arena.prev_significant(c);
    }
    false
}

/// The operator at `id` is unary, an unpacking star or a decorator `@`.
fn is_prefix_operator(arena: &TokenArena, id: TokenId, version: PythonVersion) -> bool {
    let Some(op) = arena.get(id).token.operator_id() else {
        return false;
    };
    let prev = arena.prev_significant(id);
    match op {
        OperatorId::At => prev.is_none(),
        OperatorId::Plus | OperatorId::Minus | OperatorId::Tilde | OperatorId::Star | OperatorId::Power => match prev {
            None => true,
            Some(pid) => {
                let p = arena.get(pid);
                p.is_operator()
                    || arena.is_soft_keyword(pid, version)
                    || p.is_open()
                    || p.is_keyword()
                    || p.is_punct(PunctuationId::Comma)
                    || p.is_punct(PunctuationId::Colon)
                    || p.is_punct(PunctuationId::Semicolon)
                    || p.is_punct(PunctuationId::Arrow)
            }
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::edit::apply_edits;

    fn format(source: &str) -> String {
        format_with(source, FormatOptions::default())
    }

    fn format_with(source: &str, options: FormatOptions) -> String {
        let mut formatter = LineFormatter::new(source, options);
        let edits = formatter.format_document();
        apply_edits(source, &edits)
    }

    // ========================================
    // Operators
    // ========================================

    #[test]
    fn test_binary_and_assignment_operators() {
        insta::assert_snapshot!(format("x=1+2*y\n").trim_end(), @"x = 1 + 2 * y");
        insta::assert_snapshot!(format("a+=b<<c\n").trim_end(), @"a += b << c");
        insta::assert_snapshot!(format("ok=a<b and c!=d\n").trim_end(), @"ok = a < b and c != d");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(format("x = - 1\n"), "x = -1\n");
        assert_eq!(format("y = a*-b\n"), "y = a * -b\n");
        assert_eq!(format("f( -x, ~ y)\n"), "f(-x, ~y)\n");
        assert_eq!(format("return -1\n"), "return -1\n");
        assert_eq!(format("z = x -1\n"), "z = x - 1\n");
    }

    #[test]
    fn test_unpacking_and_varargs() {
        assert_eq!(format("f(* args, ** kwargs)\n"), "f(*args, **kwargs)\n");
        assert_eq!(format("first, * rest = items\n"), "first, *rest = items\n");
        assert_eq!(format("y = 2**n\n"), "y = 2 ** n\n");
        assert_eq!(format("g = lambda *a, **k: 0\n"), "g = lambda *a, **k: 0\n");
    }

    #[test]
    fn test_keyword_equals() {
        assert_eq!(format("f(a = 1, b=-2)\n"), "f(a=1, b=-2)\n");
        assert_eq!(format("def f(a = 1, b: int=2): pass\n"), "def f(a=1, b: int = 2): pass\n");
        assert_eq!(format("h = lambda x = 1: x\n"), "h = lambda x=1: x\n");
        assert_eq!(format("t = (a = 1)\n"), "t = (a = 1)\n");
    }

    #[test]
    fn test_decorator_and_matmul() {
        assert_eq!(format("@ property\n"), "@property\n");
        assert_eq!(format("m = a@b\n"), "m = a @ b\n");
    }

    // ========================================
    // Punctuation
    // ========================================

    #[test]
    fn test_commas_and_brackets() {
        assert_eq!(format("f( a ,b )\n"), "f(a, b)\n");
        assert_eq!(format("t = (1 ,)\n"), "t = (1,)\n");
        assert_eq!(format("x = y [0]\n"), "x = y[0]\n");
        assert_eq!(format("call (x) (y)\n"), "call(x)(y)\n");
    }

    #[test]
    fn test_colons() {
        assert_eq!(format("d = {'a':1 , 'b' :2}\n"), "d = {'a': 1, 'b': 2}\n");
        assert_eq!(format("if x :\n    pass\n"), "if x:\n    pass\n");
        assert_eq!(format("def f(a:int)->str: pass\n"), "def f(a: int) -> str: pass\n");
        assert_eq!(format("k = lambda:0\n"), "k = lambda: 0\n");
    }

    #[test]
    fn test_slices() {
        assert_eq!(format("a[1:2]\n"), "a[1:2]\n");
        assert_eq!(format("a[x+1:y]\n"), "a[x + 1 : y]\n");
        assert_eq!(format("a[::2]\n"), "a[::2]\n");
        assert_eq!(format("a[-1 :]\n"), "a[-1:]\n");
        assert_eq!(format("a[f(x):]\n"), "a[f(x) :]\n");
        assert_eq!(format("a[x+1::2]\n"), "a[x + 1 :: 2]\n");
        assert_eq!(format("a[1:2, x+1:]\n"), "a[1:2, x + 1 :]\n");
    }

    #[test]
    fn test_dots() {
        assert_eq!(format("import os . path\n"), "import os.path\n");
        assert_eq!(format("n = 1 .real\n"), "n = 1 .real\n");
        assert_eq!(format("from .import x\n"), "from . import x\n");
        assert_eq!(format("from .. pkg import y\n"), "from ..pkg import y\n");
        assert_eq!(format("from ...pkg import z\n"), "from ...pkg import z\n");
    }

    #[test]
    fn test_keywords() {
        assert_eq!(format("x = not(y)\n"), "x = not (y)\n");
        assert_eq!(format("if(a)and(b): pass\n"), "if (a) and (b): pass\n");
        assert_eq!(format("v = [x for x in(y)if x]\n"), "v = [x for x in (y) if x]\n");
        assert_eq!(format("x = y if a else-1\n"), "x = y if a else -1\n");
        assert_eq!(format("x = 1if y else 2\n"), "x = 1 if y else 2\n");
    }

    #[test]
    fn test_match_statement_soft_keywords() {
        let source = "match command :\n    case[a, * rest]:\n        pass\n    case -1 :\n        pass\n";
        assert_eq!(
            format(source),
            "match command:\n    case [a, *rest]:\n        pass\n    case -1:\n        pass\n"
        );
        assert_eq!(format("match(x, y):\n    case _: pass\n"), "match (x, y):\n    case _: pass\n");
        // Plain names elsewhere, and always before 3.10.
        assert_eq!(format("case = match[0]\n"), "case = match[0]\n");
        let options = FormatOptions::new().with_version(PythonVersion::V39);
        assert_eq!(format_with("case[a]: int = 1\n", options), "case[a]: int = 1\n");
    }

    #[test]
    fn test_python2_print() {
        let options = FormatOptions::new().with_version(PythonVersion::V27);
        assert_eq!(format_with("print(x)\n", options.clone()), "print(x)\n");
        assert_eq!(format_with("print  x ,y\n", options.clone()), "print x, y\n");
        assert_eq!(format_with("x = ` y `\n", options), "x = ` y `\n");
    }

    // ========================================
    // Comments, trivia and strings
    // ========================================

    #[test]
    fn test_end_to_end_line() {
        let source = "x=1+2  # comment\n";
        let mut formatter = LineFormatter::new(source, FormatOptions::default());
        let edits = formatter.format_line(1);
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].range, TextRange::new(Position::new(0, 0), Position::new(0, 16)));
        assert_eq!(edits[0].new_text, "x = 1 + 2  # comment");
    }

    #[test]
    fn test_comment_padding() {
        assert_eq!(format("x = 1 # c\n"), "x = 1  # c\n");
        assert_eq!(format("x = 1      # c\n"), "x = 1      # c\n");
        let options = FormatOptions::new().with_comment_padding(1);
        assert_eq!(format_with("x = 1# c\n", options), "x = 1 # c\n");
    }

    #[test]
    fn test_trailing_whitespace_trimmed_and_indent_kept() {
        assert_eq!(format("if a:\n    b=1   \n"), "if a:\n    b = 1\n");
    }

    #[test]
    fn test_explicit_line_join() {
        assert_eq!(format("x = 1+\\\n    2\n"), "x = 1 + \\\n    2\n");
    }

    #[test]
    fn test_literals_are_verbatim() {
        assert_eq!(format("s=u'a  b'+0x_FF\n"), "s = u'a  b' + 0x_FF\n");
        assert_eq!(format("t = 'a' 'b'\n"), "t = 'a' 'b'\n");
    }

    #[test]
    fn test_multiline_strings() {
        let source = "x=  '''one\n  two  \nthree'''+y\n";
        let mut formatter = LineFormatter::new(source, FormatOptions::default());
        let first = formatter.format_line(1);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].range, TextRange::new(Position::new(0, 0), Position::new(0, 4)));
        assert_eq!(first[0].new_text, "x = ");
        // The middle of the string is never touched.
        assert!(formatter.format_line(2).is_empty());
        let last = formatter.format_line(3);
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].range.start, Position::new(2, 8));
        assert_eq!(last[0].new_text, " + y");
    }

    #[test]
    fn test_no_edit_cases() {
        let mut formatter = LineFormatter::new("x = 1\n\n# only a comment\n", FormatOptions::default());
        assert!(formatter.format_line(0).is_empty());
        assert!(formatter.format_line(1).is_empty());
        assert!(formatter.format_line(2).is_empty());
        assert!(formatter.format_line(3).is_empty());
        assert!(formatter.format_line(99).is_empty());
    }

    // ========================================
    // Failures
    // ========================================

    #[test]
    fn test_bracket_mismatch_fails_the_line_only() {
        let source = "foo(bar]\ny=2\n";
        let mut formatter = LineFormatter::new(source, FormatOptions::default());
        let error = formatter.try_format_line(1).unwrap_err();
        assert!(matches!(error, FormatError::Bracket { line: 1, .. }));
        assert!(error.to_string().contains("close bracket has no matching open"));
        assert_eq!(formatter.format_line(2).len(), 1);
    }

    #[test]
    fn test_unknown_token_fails_the_line() {
        let mut formatter = LineFormatter::new("x=1 $ 2\n", FormatOptions::default());
        assert!(matches!(
            formatter.try_format_line(1),
            Err(FormatError::Unhandled { line: 1, .. })
        ));
        assert!(formatter.format_line(1).is_empty());
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let mut formatter = LineFormatter::new("x=1\ry=2\r", FormatOptions::default());
        assert_eq!(
            formatter.format_line(1),
            vec![TextEdit::new(
                TextRange::new(Position::new(0, 0), Position::new(0, 3)),
                "x = 1"
            )]
        );
        assert_eq!(format("x=1\ry=2\r"), "x = 1\ry = 2\r");
        assert_eq!(format("x=1\r\ny=2\r\n"), "x = 1\r\ny = 2\r\n");
        assert_eq!(format("if a :\r    b=[1 ,2]\r"), "if a:\r    b = [1, 2]\r");
    }

    #[test]
    fn test_lines_can_be_formatted_out_of_order() {
        let source = "a=1\nb=2\nc=3\n";
        let mut formatter = LineFormatter::new(source, FormatOptions::default());
        assert_eq!(formatter.format_line(3)[0].new_text, "c = 3");
        assert_eq!(formatter.format_line(1)[0].new_text, "a = 1");
    }
}
