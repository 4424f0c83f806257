#![forbid(unsafe_code)]
//! Serpent: Python formatting tools
//!
//! Serpent tokenizes Python 2.7 and 3.x source incrementally and uses the tokens to format code while
//! the user types. This crate provides the tooling on top of the syntax crates: the line and block
//! formatters, the `serpent` CLI and the `serpent-lsp` language server.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod cli;
pub mod format;
pub mod lsp;

pub use serpent_core::PythonVersion;
pub use serpent_syntax::{fstring, lexer, wrapper};

pub use format::{
    BlockFormatter, FormatOptions, IndentOptions, LineFormatter, TextEdit, check_formatted, format_diff, format_source,
};
