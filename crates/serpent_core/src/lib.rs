//! Provide the canonical Python vocabulary shared by the serpent tokenizer, parser and formatters.
//!
//! This crate is intentionally small and dependency-free. It answers questions like “is `async` a
//! keyword in Python 3.6?” or “what is the spelling of `OperatorId::FloorDivAssign`?” without knowing
//! anything about tokens, spans or ASTs.
//!
//! ## Notes
//!
//! - This is a “vocabulary core” crate: **no IO**, no global state, and no syntax-tree types.
//! - Version gating lives here so the tokenizer and the formatter agree on which spellings are reserved.

pub mod lang;

pub use lang::versions::PythonVersion;
