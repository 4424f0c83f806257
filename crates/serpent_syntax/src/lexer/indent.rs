//! Indentation handling for the Python tokenizer.
//!
//! Implements INDENT/DEDENT synthesis with an indentation stack. Tabs advance to the next multiple of 8
//! and a form feed resets the count, as in CPython.

use super::Tokenizer;
use super::tokens::TokenKind;
use crate::diagnostics::ErrorCode;

const TAB_SIZE: usize = 8;

impl<'a> Tokenizer<'a> {
    /// Measure the indentation of a new physical line and queue INDENT/DEDENT tokens.
    ///
    /// Blank and comment-only lines leave the stack untouched; their line break becomes NL.
    pub(super) fn handle_indentation(&mut self) {
        let start = self.pos;
        let mut indent = 0;

        while let Some(c) = self.peek() {
            match c {
                ' ' => indent += 1,
                '\t' => indent = (indent / TAB_SIZE + 1) * TAB_SIZE,
                '\x0c' => indent = 0,
                _ => break,
            }
            self.bump();
        }

        self.at_line_start = false;

        // Blank line, comment-only line, or end of input: no indentation change.
        match self.peek() {
            None | Some('#') | Some('\n') | Some('\r') => return,
            _ => {}
        }

        let current = *self.indent_stack.last().unwrap_or(&0);

        if indent > current {
            self.indent_stack.push(indent);
            let token = self.synthetic(TokenKind::Indent);
            self.pending.push_back(token);
        } else if indent < current {
            while let Some(&top) = self.indent_stack.last() {
                if indent >= top || self.indent_stack.len() == 1 {
                    break;
                }
                self.indent_stack.pop();
                let token = self.synthetic(TokenKind::Dedent);
                self.pending.push_back(token);
            }

            // Verify we landed on a valid indent level
            let landed = *self.indent_stack.last().unwrap_or(&0);
            if indent != landed {
                self.report(
                    format!("unindent does not match any outer indentation level (expected {landed} columns, got {indent})"),
                    start,
                    self.pos,
                    ErrorCode::IndentationError,
                );
            }
        }
    }

    /// Current indentation stack depth (0 at module level).
    pub fn indent_level(&self) -> usize {
        self.indent_stack.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{TokenKind, Tokenizer, TokenizerOptions, lex};
    use serpent_core::PythonVersion;

    fn count(tokens: &[crate::lexer::Token], kind: TokenKind) -> usize {
        tokens.iter().filter(|t| t.kind == kind).count()
    }

    #[test]
    fn test_multiple_dedents() {
        let source = "def foo():\n  if True:\n    x = 1\ny = 2";
        let (tokens, errors) = lex(source, PythonVersion::LATEST);
        assert!(errors.is_empty());
        assert_eq!(count(&tokens, TokenKind::Indent), 2);
        assert_eq!(count(&tokens, TokenKind::Dedent), 2);
    }

    #[test]
    fn test_dedents_flushed_at_eof() {
        let (tokens, _) = lex("if a:\n    if b:\n        c\n", PythonVersion::LATEST);
        assert_eq!(count(&tokens, TokenKind::Dedent), 2);
        assert!(tokens.last().is_some_and(|t| t.is_eof()));
    }

    #[test]
    fn test_comment_lines_do_not_indent() {
        let (tokens, _) = lex("x\n        # deep comment\ny\n", PythonVersion::LATEST);
        assert_eq!(count(&tokens, TokenKind::Indent), 0);
    }

    #[test]
    fn test_indent_level_tracks_stack() {
        let mut tokenizer = Tokenizer::new("if a:\n    b\nc\n", PythonVersion::LATEST, TokenizerOptions::default());
        assert_eq!(tokenizer.indent_level(), 0);
        // Serving line 1 peeks into line 2, which opens the block.
        let _ = tokenizer.tokens_through_line(1);
        assert_eq!(tokenizer.indent_level(), 1);
        let _ = tokenizer.tokens_through_line(3);
        assert_eq!(tokenizer.indent_level(), 0);
    }
}
