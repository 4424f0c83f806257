//! Small helper APIs for working with `Token` / `TokenKind`.
//!
//! These helpers exist to reduce repetitive `matches!(...)` at call sites and to make it easy
//! to work with ID-based tokens.

use crate::lexer::{Literal, LiteralKind, Token, TokenKind};
use serpent_core::lang::keywords::{self, KeywordId};
use serpent_core::lang::operators::OperatorId;
use serpent_core::lang::punctuation::{self, PunctuationId};

impl TokenKind {
    /// Return the keyword id, if this is a keyword token.
    pub fn keyword_id(&self) -> Option<KeywordId> {
        match self {
            TokenKind::Keyword(id) => Some(*id),
            _ => None,
        }
    }

    /// Return `true` if this is the given keyword.
    pub fn is_keyword(&self, id: KeywordId) -> bool {
        matches!(self, TokenKind::Keyword(k) if *k == id)
    }

    /// Return the operator id, if this is an operator token.
    pub fn operator_id(&self) -> Option<OperatorId> {
        match self {
            TokenKind::Operator(id) => Some(*id),
            _ => None,
        }
    }

    /// Return `true` if this is the given operator.
    pub fn is_operator(&self, id: OperatorId) -> bool {
        matches!(self, TokenKind::Operator(o) if *o == id)
    }

    /// Return the punctuation id, if this is a punctuation token.
    pub fn punctuation_id(&self) -> Option<PunctuationId> {
        match self {
            TokenKind::Punctuation(id) => Some(*id),
            _ => None,
        }
    }

    /// Return `true` if this is the given punctuation.
    pub fn is_punctuation(&self, id: PunctuationId) -> bool {
        matches!(self, TokenKind::Punctuation(p) if *p == id)
    }

    pub fn is_open_bracket(&self) -> bool {
        self.punctuation_id().is_some_and(punctuation::is_open)
    }

    pub fn is_close_bracket(&self) -> bool {
        self.punctuation_id().is_some_and(punctuation::is_close)
    }

    /// Newline, NL, Indent and Dedent.
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::NL | TokenKind::Indent | TokenKind::Dedent
        )
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::Comment(_))
    }

    pub fn literal(&self) -> Option<&Literal> {
        match self {
            TokenKind::Constant(lit) => Some(lit),
            _ => None,
        }
    }

    pub fn literal_kind(&self) -> Option<LiteralKind> {
        self.literal().map(Literal::kind)
    }

    pub fn is_number(&self) -> bool {
        self.literal_kind() == Some(LiteralKind::Number)
    }

    pub fn is_string_like(&self) -> bool {
        self.literal().is_some_and(Literal::is_string_like)
    }

    /// Names, constants and the value keywords `True`/`False`/`None`.
    pub fn is_value(&self) -> bool {
        match self {
            TokenKind::Name(_) | TokenKind::Constant(_) => true,
            TokenKind::Keyword(id) => keywords::is_value_keyword(*id),
            TokenKind::Punctuation(PunctuationId::Ellipsis) => true,
            _ => false,
        }
    }
}

impl Token {
    /// Convenience wrapper for `self.kind.keyword_id()`.
    pub fn keyword_id(&self) -> Option<KeywordId> {
        self.kind.keyword_id()
    }

    /// Convenience wrapper for `self.kind.operator_id()`.
    pub fn operator_id(&self) -> Option<OperatorId> {
        self.kind.operator_id()
    }

    /// Convenience wrapper for `self.kind.punctuation_id()`.
    pub fn punctuation_id(&self) -> Option<PunctuationId> {
        self.kind.punctuation_id()
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfFile)
    }

    /// String-like constant whose span crosses a line break.
    pub fn is_multiline_string(&self) -> bool {
        self.kind.is_string_like() && self.is_multiline()
    }
}
