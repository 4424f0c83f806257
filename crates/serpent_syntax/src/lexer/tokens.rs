//! Token types for the Python tokenizer.
//!
//! The tokenizer uses **registry-backed IDs** for language vocabulary:
//! - `Keyword(KeywordId)` for reserved words (version-dependent)
//! - `Operator(OperatorId)` for symbol operators
//! - `Punctuation(PunctuationId)` for brackets and separators
//!
//! ## Notes
//! - Positions are kept as [`Location`]s: byte offset, one-indexed line, zero-indexed column.
//! - In verbatim mode every token also carries its exact source text and the whitespace before it.

use crate::ast::{Location, Span};
use serpent_core::lang::keywords::KeywordId;
use serpent_core::lang::operators::OperatorId;
use serpent_core::lang::punctuation::PunctuationId;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // ========== Keyword / operator / punctuation (ID-based) ==========
    Keyword(KeywordId),
    Operator(OperatorId),
    Punctuation(PunctuationId),

    // ========== Names and literals ==========
    Name(String),
    Constant(Literal),

    // ========== Layout ==========
    /// End of a logical line.
    Newline,
    /// Non-logical line break (blank line, comment-only line, or inside brackets).
    NL,
    Indent,
    Dedent,

    // ========== Trivia ==========
    /// Comment text including the leading `#`.
    Comment(String),
    /// `\` followed by a line break.
    ExplicitLineJoin,

    // ========== Special ==========
    /// Character the tokenizer could not classify; already reported to the error list.
    Error(String),
    EndOfFile,
}

/// Decoded literal value carried by a `Constant` token.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(StringLiteral),
    Bytes(BytesLiteral),
    Number(Number),
    FString(FStringLiteral),
}

/// Literal kind, coarse enough for formatting and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    String,
    AsciiString,
    Number,
    FString,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub value: String,
    pub prefix: String,
    pub is_triple: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BytesLiteral {
    pub value: Vec<u8>,
    pub prefix: String,
    pub is_triple: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Int(i64),
    /// Integer that does not fit in `i64`; normalized spelling without `_` or `L`.
    LargeInt(String),
    Float(f64),
    Imaginary(f64),
}

/// Undecoded f-string; the body is handed to `crate::fstring` for parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct FStringLiteral {
    /// Text between the quotes, exactly as written.
    pub body: String,
    /// Where `body` starts in the source.
    pub body_start: Location,
    pub prefix: String,
    pub is_raw: bool,
    pub is_triple: bool,
}

impl Literal {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Literal::Str(_) => LiteralKind::String,
            Literal::Bytes(_) => LiteralKind::AsciiString,
            Literal::Number(_) => LiteralKind::Number,
            Literal::FString(_) => LiteralKind::FString,
        }
    }

    pub fn is_string_like(&self) -> bool {
        !matches!(self, Literal::Number(_))
    }

    /// Triple-quoted string, bytes or f-string.
    pub fn is_triple_quoted(&self) -> bool {
        match self {
            Literal::Str(s) => s.is_triple,
            Literal::Bytes(b) => b.is_triple,
            Literal::FString(f) => f.is_triple,
            Literal::Number(_) => false,
        }
    }
}

/// A token with its kind and source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: Location,
    pub end: Location,
    /// Exact source image (verbatim mode only).
    pub verbatim: Option<String>,
    /// Spaces, tabs and form feeds immediately before the token on the same physical line (verbatim mode only).
    pub whitespace: String,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, start: Location, end: Location) -> Self {
        Self {
            kind,
            start,
            end,
            verbatim: None,
            whitespace: String::new(),
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start.offset, self.end.offset)
    }

    /// Source text for the token, from `verbatim` if present, otherwise a canonical spelling.
    pub fn text(&self) -> String {
        if let Some(v) = &self.verbatim {
            return v.clone();
        }
        self.kind.canonical_text()
    }

    /// The token's span covers more than one physical line (triple-quoted strings, line joins).
    pub fn is_multiline(&self) -> bool {
        self.end.line > self.start.line
    }
}

impl TokenKind {
    /// Canonical spelling for ID-based and trivia tokens; literal kinds fall back to a placeholder.
    pub fn canonical_text(&self) -> String {
        use serpent_core::lang::{keywords, operators, punctuation};
        match self {
            TokenKind::Keyword(id) => keywords::as_str(*id).to_string(),
            TokenKind::Operator(id) => operators::as_str(*id).to_string(),
            TokenKind::Punctuation(id) => punctuation::as_str(*id).to_string(),
            TokenKind::Name(n) => n.clone(),
            TokenKind::Comment(c) => c.clone(),
            TokenKind::Error(s) => s.clone(),
            TokenKind::ExplicitLineJoin => "\\".to_string(),
            TokenKind::Newline | TokenKind::NL => "\n".to_string(),
            TokenKind::Constant(Literal::Number(n)) => match n {
                Number::Int(i) => i.to_string(),
                Number::LargeInt(s) => s.clone(),
                Number::Float(f) => format!("{f:?}"),
                Number::Imaginary(f) => format!("{f:?}j"),
            },
            TokenKind::Constant(Literal::Str(s)) => format!("{:?}", s.value),
            TokenKind::Constant(_) => "<literal>".to_string(),
            TokenKind::Indent | TokenKind::Dedent | TokenKind::EndOfFile => String::new(),
        }
    }
}
