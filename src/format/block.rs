//! Block-continuation re-indenter
//!
//! When a line starting with `else`, `elif`, `except` or `finally` is completed, [`BlockFormatter`] looks
//! back for the block it continues and moves the line to that block's indentation. It works on raw line
//! text with a small regex table; the tokenizer is not involved.

use once_cell::sync::Lazy;
use regex::Regex;
use serpent_syntax::lexer;

use super::config::IndentOptions;
use super::edit::{Position, TextEdit, TextRange};

/// Continuation keyword, the pattern of its line, and the keywords that may open the block it continues.
///
/// A `head` group is the header text before its final colon; it must have balanced brackets.
const BLOCK_RULES: &[(&str, &str, &[&str])] = &[
    ("else", r"^\s*else\s*:", &["if", "elif", "for", "while", "try", "except"]),
    ("elif", r"^(?P<head>\s*elif\b.*):\s*(?:#.*)?$", &["if", "elif"]),
    ("except", r"^(?P<head>\s*except\b.*):\s*(?:#.*)?$", &["try", "except"]),
    ("finally", r"^\s*finally\s*:", &["try", "except", "else"]),
];

struct BlockRule {
    keyword: &'static str,
    line: Regex,
    predecessor: Regex,
}

static RULES: Lazy<Vec<BlockRule>> = Lazy::new(|| {
    BLOCK_RULES
        .iter()
        .map(|&(keyword, line, predecessors)| BlockRule {
            keyword,
            line: Regex::new(line).expect("INVARIANT: block rule pattern is valid"),
            predecessor: Regex::new(&format!(r"^\s*(?:async\s+)?(?:{})\b", predecessors.join("|")))
                .expect("INVARIANT: predecessor pattern is valid"),
        })
        .collect()
});

impl BlockRule {
    fn matches(&self, line: &str) -> bool {
        self.line.captures(line).is_some_and(|caps| {
            caps.name("head")
                .is_none_or(|head| brackets_balanced(head.as_str()))
        })
    }
}

/// Function and class headers: re-indenting never looks past one.
static BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(?:(?:async\s+)?def|class)\b").expect("INVARIANT: boundary pattern is valid"));

/// Indentation fixer for block-continuation lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlockFormatter;

impl BlockFormatter {
    /// Edits re-indenting the line at `position` (zero-indexed) to match the block it continues.
    ///
    /// `text` must contain at least the lines up to and including that line. Returns no edits when the
    /// line is not a continuation, no matching block is found, a `def`/`class` boundary is crossed, or
    /// the indentation already matches.
    #[tracing::instrument(skip_all, fields(line = position.line))]
    pub fn provide_edits(text: &str, position: Position, options: &IndentOptions) -> Vec<TextEdit> {
        let lines: Vec<&str> = lexer::line_starts(text)
            .into_iter()
            .map(|start| &text[start..lexer::line_content_end(text, start)])
            .collect();
        let Some(current) = lines.get(position.line) else {
            return Vec::new();
        };
        let Some(rule) = RULES.iter().find(|r| r.matches(current)) else {
            return Vec::new();
        };

        let current_indent = leading_whitespace(current);
        let current_width = options.indent_width(current_indent);
        // Smallest indentation seen between the candidate and the current line; a block's body is
        // always deeper than its header.
        let mut min_seen = usize::MAX;

        for (index, candidate) in lines[..position.line].iter().enumerate().rev() {
            let trimmed = candidate.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if BOUNDARY.is_match(candidate) {
                tracing::debug!(keyword = rule.keyword, boundary = index, "stopped at function or class");
                return Vec::new();
            }
            let indent = leading_whitespace(candidate);
            let width = options.indent_width(indent);
            if rule.predecessor.is_match(candidate) && width <= current_width && width < min_seen {
                return reindent(position.line, current_indent, indent, options);
            }
            min_seen = min_seen.min(width);
            if min_seen == 0 {
                break;
            }
        }
        Vec::new()
    }
}

/// Every bracket opened in `text` is closed again (string contents ignored).
fn brackets_balanced(text: &str) -> bool {
    let mut depth = 0i32;
    let mut quote = None;
    for c in text.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[' | '{') => depth += 1,
            (None, ')' | ']' | '}') => depth -= 1,
            _ => {}
        }
    }
    depth == 0
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

fn reindent(line: usize, current: &str, target: &str, options: &IndentOptions) -> Vec<TextEdit> {
    if current == target {
        return Vec::new();
    }
    let spaces_only = |s: &str| s.chars().all(|c| c == ' ');
    let edit = if options.insert_spaces && spaces_only(current) && spaces_only(target) && target.len() < current.len()
    {
        // Delete the extra columns.
        TextEdit::new(
            TextRange::new(Position::new(line, target.len()), Position::new(line, current.len())),
            "",
        )
    } else {
        TextEdit::new(
            TextRange::new(Position::new(line, 0), Position::new(line, current.chars().count())),
            target,
        )
    };
    vec![edit]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::edit::apply_edits;

    fn reformat(text: &str, line: usize, options: IndentOptions) -> String {
        let edits = BlockFormatter::provide_edits(text, Position::new(line, 0), &options);
        apply_edits(text, &edits)
    }

    #[test]
    fn test_else_dedents_to_if() {
        let text = "if x:\n    pass\n    else:";
        let edits = BlockFormatter::provide_edits(text, Position::new(2, 9), &IndentOptions::default());
        assert_eq!(
            edits,
            vec![TextEdit::new(
                TextRange::new(Position::new(2, 0), Position::new(2, 4)),
                ""
            )]
        );
        assert_eq!(apply_edits(text, &edits), "if x:\n    pass\nelse:");
    }

    #[test]
    fn test_already_aligned_is_left_alone() {
        let text = "if x:\n    pass\nelse:";
        assert!(BlockFormatter::provide_edits(text, Position::new(2, 5), &IndentOptions::default()).is_empty());
    }

    #[test]
    fn test_def_boundary_stops_search() {
        let text = "if x:\n    def g():\n        pass\n    else:";
        assert!(BlockFormatter::provide_edits(text, Position::new(3, 9), &IndentOptions::default()).is_empty());
    }

    #[test]
    fn test_nested_blocks_pick_the_open_one() {
        let text = "def f():\n    if a:\n        if b:\n            pass\n        x = 1\n        else:\n";
        assert_eq!(
            reformat(text, 5, IndentOptions::default()),
            "def f():\n    if a:\n        if b:\n            pass\n        x = 1\n    else:\n"
        );
    }

    #[test]
    fn test_elif_except_finally() {
        let opts = IndentOptions::default();
        assert_eq!(
            reformat("if a:\n    b\n    elif c:", 2, opts),
            "if a:\n    b\nelif c:"
        );
        assert_eq!(
            reformat("try:\n    x()\n    except ValueError as e:", 2, opts),
            "try:\n    x()\nexcept ValueError as e:"
        );
        assert_eq!(
            reformat("try:\n    x()\nexcept E:\n    y()\n    finally:", 4, opts),
            "try:\n    x()\nexcept E:\n    y()\nfinally:"
        );
        assert_eq!(
            reformat("for i in r:\n    pass\n    else:", 2, opts),
            "for i in r:\n    pass\nelse:"
        );
    }

    #[test]
    fn test_header_must_be_complete() {
        let opts = IndentOptions::default();
        // The colon belongs to a slice; the header is still being typed.
        assert!(BlockFormatter::provide_edits("if a:\n    b\n    elif d[a:", Position::new(2, 13), &opts).is_empty());
        assert_eq!(
            reformat("if a:\n    b\n    elif d[a:]:  # tail", 2, opts),
            "if a:\n    b\nelif d[a:]:  # tail"
        );
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let opts = IndentOptions::default();
        assert_eq!(reformat("if x:\r\n    pass\r\n    else:", 2, opts), "if x:\r\n    pass\r\nelse:");
        assert_eq!(reformat("if x:\r    pass\r    else:", 2, opts), "if x:\r    pass\relse:");
        // A lone `\r` ends the line, so `else:` is not on line 0.
        assert!(BlockFormatter::provide_edits("if x:\r    else:", Position::new(0, 0), &opts).is_empty());
    }

    #[test]
    fn test_tabs_substitute_the_prefix() {
        let opts = IndentOptions::new().with_insert_spaces(false);
        assert_eq!(
            reformat("\tif a:\n\t\tpass\n\t\telse:", 2, opts),
            "\tif a:\n\t\tpass\n\telse:"
        );
    }

    #[test]
    fn test_no_match_no_edit() {
        let opts = IndentOptions::default();
        assert!(BlockFormatter::provide_edits("x = 1\n    else:", Position::new(1, 0), &opts).is_empty());
        assert!(BlockFormatter::provide_edits("if a:\n    b = 1", Position::new(1, 0), &opts).is_empty());
        assert!(BlockFormatter::provide_edits("else:", Position::new(3, 0), &opts).is_empty());
        // `elsewhere:` is not `else:`
        assert!(BlockFormatter::provide_edits("if a:\n  b\n  elsewhere:", Position::new(2, 0), &opts).is_empty());
    }
}
