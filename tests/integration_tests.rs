//! Integration tests: tokenizer, formatters and f-string parser driven through the public API

use serpent::format::{
    BlockFormatter, FormatOptions, IndentOptions, LineFormatter, Position, TextEdit, TextRange, apply_edits,
    format_source,
};
use serpent::lexer::{self, Literal, TokenKind};
use serpent::wrapper::{BracketError, LineTokens};
use serpent::{PythonVersion, fstring};
use serpent_syntax::ast::{Expr, FStringPart};
use serpent_syntax::diagnostics::ErrorCode;

fn format_one(line: &str) -> String {
    format_source(line, &FormatOptions::default())
}

// ========================================
// Line formatter
// ========================================

#[test]
fn test_end_to_end_line() {
    let text = "x=1+2  # comment";
    let edits = LineFormatter::new(text, FormatOptions::default()).format_line(1);
    assert_eq!(
        edits,
        vec![TextEdit::new(
            TextRange::new(Position::new(0, 0), Position::new(0, 16)),
            "x = 1 + 2  # comment"
        )]
    );
}

#[test]
fn test_slice_spacing() {
    assert_eq!(format_one("a[1:2]\n"), "a[1:2]\n");
    assert_eq!(format_one("a[x+1:y]\n"), "a[x + 1 : y]\n");
    assert_eq!(format_one("a[::2]\n"), "a[::2]\n");
}

#[test]
fn test_formatting_is_a_fixed_point() {
    let source = "def f(a,b=1,*args,**kw):\n    return [x**2 for x in a if x>b][1:-1]\n";
    let once = format_one(source);
    assert_eq!(once, "def f(a, b=1, *args, **kw):\n    return [x ** 2 for x in a if x > b][1:-1]\n");
    assert!(LineFormatter::new(&once, FormatOptions::default()).format_document().is_empty());
}

#[test]
fn test_literals_are_byte_identical() {
    let source = "x=0XFF+1_000+r'\\d'+b\"\\x00\"\n";
    assert_eq!(format_one(source), "x = 0XFF + 1_000 + r'\\d' + b\"\\x00\"\n");
}

#[test]
fn test_lines_formatted_in_any_order() {
    let text = "a=1\nb=2\nc=3\n";
    let mut formatter = LineFormatter::new(text, FormatOptions::default());
    let third = formatter.format_line(3);
    let first = formatter.format_line(1);
    assert_eq!(third[0].new_text, "c = 3");
    assert_eq!(first[0].new_text, "a = 1");
}

#[test]
fn test_bracket_mismatch_leaves_line_alone() {
    let mut formatter = LineFormatter::new("foo(bar]\n", FormatOptions::default());
    assert!(formatter.format_line(1).is_empty());
}

// ========================================
// Tokenizer and wrapper
// ========================================

#[test]
fn test_bracket_mismatch_reported_at_close() {
    let mut lines = LineTokens::new("foo(bar]\n", PythonVersion::LATEST);
    lines.ensure_line(1);
    let error = lines.bracket_error_on(1).cloned().expect("mismatch");
    assert!(matches!(error, BracketError::Mismatched { .. }));
    assert_eq!(error.span().start, 7);
    assert!(error.to_string().starts_with("close bracket has no matching open"));
}

#[test]
fn test_version_gated_keywords() {
    let (tokens, _) = lexer::lex("print x\n", PythonVersion::V27);
    assert!(matches!(tokens[0].kind, TokenKind::Keyword(_)));

    let (tokens, _) = lexer::lex("print(x)\n", PythonVersion::V38);
    assert!(matches!(&tokens[0].kind, TokenKind::Name(n) if n == "print"));
}

// ========================================
// F-strings
// ========================================

fn only_fstring(source: &str) -> serpent_syntax::lexer::FStringLiteral {
    let (tokens, errors) = lexer::lex(source, PythonVersion::LATEST);
    assert!(errors.is_empty(), "{errors:?}");
    tokens
        .into_iter()
        .find_map(|t| match t.kind {
            TokenKind::Constant(Literal::FString(f)) => Some(f),
            _ => None,
        })
        .expect("f-string token")
}

#[test]
fn test_fstring_nested_format_spec() {
    let literal = only_fstring("f\"{x:{width}}\"\n");
    let mut errors = Vec::new();
    let parsed = fstring::parse_literal(&literal, PythonVersion::LATEST, &mut errors);
    assert!(errors.is_empty());

    let values: Vec<_> = parsed.formatted_values().collect();
    assert_eq!(values.len(), 1);
    let spec = values[0].format_spec.as_ref().expect("format spec");
    assert_eq!(spec.formatted_values().count(), 1);
    let width = &spec.formatted_values().next().expect("width").expression;
    assert!(matches!(&width.node, Expr::Name(n) if n == "width"));
    // Absolute offsets: `width` starts after `f"{x:{`.
    assert_eq!(width.span.start, 6);
}

#[test]
fn test_fstring_escaped_braces() {
    let literal = only_fstring("f\"{{literal}}\"\n");
    let mut errors = Vec::new();
    let parsed = fstring::parse_literal(&literal, PythonVersion::LATEST, &mut errors);
    assert!(errors.is_empty());
    assert_eq!(parsed.formatted_values().count(), 0);
    let literals: Vec<&str> = parsed.literals().map(|l| l.node.as_str()).collect();
    assert_eq!(literals.concat(), "{literal}");
}

#[test]
fn test_fstring_unterminated_expression() {
    let literal = only_fstring("f\"{x\"\n");
    let mut errors = Vec::new();
    let parsed = fstring::parse_literal(&literal, PythonVersion::LATEST, &mut errors);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::FStringUnterminated);
    assert!(parsed.parts.iter().any(|p| matches!(
        p,
        FStringPart::FormattedValue(v) if v.expression.node.is_error()
    )));
}

#[test]
fn test_syntax_errors_cover_fstrings_in_files() {
    let errors = serpent_syntax::syntax_errors("a = f'{x # no}'\nb = 1\n", PythonVersion::LATEST);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ErrorCode::FStringComment);
}

#[test]
fn test_open_replacement_field_reported_once_per_version() {
    for version in [PythonVersion::V36, PythonVersion::V311, PythonVersion::V312, PythonVersion::LATEST] {
        for literal in ["f\"{x\"", "f'{x'", "f'''{x'''", "f\"\"\"{x\"\"\""] {
            let source = format!("s = {literal}\ny = 1\n");
            let errors = serpent_syntax::syntax_errors(&source, version);
            let codes: Vec<ErrorCode> = errors.iter().map(|e| e.code).collect();
            assert_eq!(codes, vec![ErrorCode::FStringUnterminated], "{version} {literal}");
        }
    }
}

#[test]
fn test_lines_after_open_replacement_field_are_formatted() {
    let source = "s = f'''{x'''\ny=1\nz=2\n";
    assert_eq!(format_one(source), "s = f'''{x'''\ny = 1\nz = 2\n");
}

#[test]
fn test_carriage_return_documents_keep_every_statement() {
    assert_eq!(format_one("x=1\ry=2\r"), "x = 1\ry = 2\r");
    assert_eq!(format_one("x=1\r\ny=2\r\n"), "x = 1\r\ny = 2\r\n");
}

// ========================================
// Block formatter
// ========================================

#[test]
fn test_block_formatter_dedents_else() {
    let text = "if x:\n    pass\n    else:";
    let edits = BlockFormatter::provide_edits(text, Position::new(2, 9), &IndentOptions::default());
    assert_eq!(apply_edits(text, &edits), "if x:\n    pass\nelse:");
}

#[test]
fn test_block_formatter_respects_def_boundary() {
    let text = "if x:\n    pass\n    def g():\n        pass\n    else:";
    assert!(BlockFormatter::provide_edits(text, Position::new(4, 9), &IndentOptions::default()).is_empty());
}
