//! Python language vocabulary registries.
//!
//! This module is the “front door” for language-level vocabulary: reserved keywords, operators,
//! punctuation, and the language versions that gate them.
//!
//! The design goal is to avoid stringly-typed checks scattered across the tokenizer and formatters.
//! Instead, callers work with **stable IDs** (e.g. `KeywordId`, `OperatorId`) and look up
//! spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The tokenizer enforces syntax; registries provide spellings and metadata for shared use (diagnostics,
//!   formatting, highlighting).
//!
//! ## Examples
//! ```rust
//! use serpent_core::lang::keywords::{self, KeywordId};
//! use serpent_core::PythonVersion;
//!
//! assert_eq!(keywords::from_str("if", PythonVersion::LATEST), Some(KeywordId::If));
//! assert_eq!(keywords::as_str(KeywordId::If), "if");
//! ```

pub mod keywords;
pub mod operators;
pub mod punctuation;
pub mod versions;
