//! Python syntax layer for serpent: tokenizer, token arena, expression parser and f-string parser.
//!
//! This crate is dependency-light and shared by the formatters, the CLI and the language server.
//!
//! ## Notes
//! - This crate is “syntax-only”: no name resolution, no type inference, no statement-level AST.
//! - Vocabulary identity (keywords/operators/punctuation/versions) comes from `serpent_core::lang`.
//! - Every error is reported through [`diagnostics::ErrorSink`]; nothing in here panics on malformed input.
//!
//! ## Examples
//! ```rust
//! use serpent_syntax::lexer;
//! use serpent_core::PythonVersion;
//!
//! let (tokens, errors) = lexer::lex("x = 1\n", PythonVersion::LATEST);
//! assert!(errors.is_empty());
//! assert_eq!(tokens.len(), 5); // x, =, 1, NEWLINE, EOF
//! ```
//!
//! ## See also
//! - `serpent_core::lang` for registry-backed language vocabulary.

pub mod ast;
pub mod diagnostics;
pub mod fstring;
pub mod lexer;
pub mod parser;
pub mod token_helpers;
pub mod wrapper;

pub use serpent_core::PythonVersion;

use diagnostics::SyntaxError;
use lexer::{Literal, TokenKind};

/// Tokenize `source` and parse every f-string in it, returning all errors in source order.
pub fn syntax_errors(source: &str, version: PythonVersion) -> Vec<SyntaxError> {
    let (tokens, mut errors) = lexer::lex(source, version);
    for token in &tokens {
        if let TokenKind::Constant(Literal::FString(literal)) = &token.kind {
            fstring::parse_literal(literal, version, &mut errors);
        }
    }
    errors.sort_by_key(|e| e.span.start);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_errors_merges_lexer_and_fstring_errors() {
        let errors = syntax_errors("x = f'{a!z}' $\n", PythonVersion::LATEST);
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert_eq!(
            codes,
            vec![
                diagnostics::ErrorCode::FStringBadConversion,
                diagnostics::ErrorCode::UnexpectedCharacter
            ]
        );
    }

    #[test]
    fn test_syntax_errors_clean_source() {
        assert!(syntax_errors("def f(x):\n    return f'{x!r:>{10}}'\n", PythonVersion::LATEST).is_empty());
    }
}
