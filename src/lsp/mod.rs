//! Serpent Language Server Protocol (LSP) implementation
//!
//! Provides editor features:
//! - Syntax diagnostics (tokenizer and f-string errors)
//! - On-type formatting (`\n` and `;` re-space a line, `:` re-indents block continuations)
//! - Whole-document formatting

pub mod backend;
pub mod diagnostics;

pub use backend::SerpentLanguageServer;
