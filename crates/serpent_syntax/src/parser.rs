//! Expression parser for Python.
//!
//! Parses a single expression (tuples and `yield` allowed) from a token slice. It is used wherever a
//! fragment of source must be understood on its own: replacement fields inside f-strings, and the `check`
//! command. Statement-level parsing is out of scope.
//!
//! ## Examples
//!
//! ```rust
//! use serpent_syntax::ast::{Expr, Location};
//! use serpent_syntax::parser;
//! use serpent_core::PythonVersion;
//!
//! let mut errors = Vec::new();
//! let expr = parser::parse_expression("a + b * 2", Location::START, PythonVersion::LATEST, &mut errors);
//! assert!(errors.is_empty());
//! assert!(matches!(expr.node, Expr::Binary(..)));
//! ```

use crate::ast::*;
use crate::diagnostics::{ErrorCode, ErrorSink, SyntaxError};
use crate::lexer::{Literal, Number, Token, TokenKind, Tokenizer, TokenizerOptions};
use serpent_core::PythonVersion;
use serpent_core::lang::keywords::KeywordId;
use serpent_core::lang::operators::OperatorId;
use serpent_core::lang::punctuation::PunctuationId;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/expr.rs");
include!("parser/atoms.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
