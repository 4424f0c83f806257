//! Punctuation vocabulary: brackets, separators and the few symbols that are not operators.
//!
//! ## Notes
//! - Bracket pairs are modelled explicitly so the token wrapper can verify that a close bracket matches
//!   the innermost open one.
//!
//! ## Examples
//! ```rust
//! use serpent_core::lang::punctuation::{self, PunctuationId};
//!
//! assert_eq!(punctuation::from_str("->"), Some(PunctuationId::Arrow));
//! assert_eq!(punctuation::closing_for(PunctuationId::LBracket), Some(PunctuationId::RBracket));
//! ```

/// Stable identifier for every punctuation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationId {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Dot,
    Ellipsis,
    Arrow,
    /// Python 2 repr quotes.
    Backquote,
}

/// High-level grouping for tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctuationCategory {
    Open,
    Close,
    Separator,
    Access,
}

#[derive(Debug, Clone, Copy)]
pub struct PunctuationInfo {
    pub id: PunctuationId,
    pub canonical: &'static str,
    pub category: PunctuationCategory,
}

/// Registry of all punctuation.
pub const PUNCTUATION: &[PunctuationInfo] = &[
    info(PunctuationId::LParen, "(", PunctuationCategory::Open),
    info(PunctuationId::RParen, ")", PunctuationCategory::Close),
    info(PunctuationId::LBracket, "[", PunctuationCategory::Open),
    info(PunctuationId::RBracket, "]", PunctuationCategory::Close),
    info(PunctuationId::LBrace, "{", PunctuationCategory::Open),
    info(PunctuationId::RBrace, "}", PunctuationCategory::Close),
    info(PunctuationId::Comma, ",", PunctuationCategory::Separator),
    info(PunctuationId::Colon, ":", PunctuationCategory::Separator),
    info(PunctuationId::Semicolon, ";", PunctuationCategory::Separator),
    info(PunctuationId::Dot, ".", PunctuationCategory::Access),
    info(PunctuationId::Ellipsis, "...", PunctuationCategory::Access),
    info(PunctuationId::Arrow, "->", PunctuationCategory::Separator),
    info(PunctuationId::Backquote, "`", PunctuationCategory::Separator),
];

pub fn as_str(id: PunctuationId) -> &'static str {
    info_for(id).canonical
}

pub fn category(id: PunctuationId) -> PunctuationCategory {
    info_for(id).category
}

/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: PunctuationId) -> &'static PunctuationInfo {
    PUNCTUATION.iter().find(|p| p.id == id).expect("punctuation info missing")
}

pub fn from_str(s: &str) -> Option<PunctuationId> {
    PUNCTUATION.iter().find(|p| p.canonical == s).map(|p| p.id)
}

pub fn is_open(id: PunctuationId) -> bool {
    category(id) == PunctuationCategory::Open
}

pub fn is_close(id: PunctuationId) -> bool {
    category(id) == PunctuationCategory::Close
}

/// Close bracket matching an open bracket.
pub fn closing_for(open: PunctuationId) -> Option<PunctuationId> {
    match open {
        PunctuationId::LParen => Some(PunctuationId::RParen),
        PunctuationId::LBracket => Some(PunctuationId::RBracket),
        PunctuationId::LBrace => Some(PunctuationId::RBrace),
        _ => None,
    }
}

/// Open bracket matching a close bracket.
pub fn opening_for(close: PunctuationId) -> Option<PunctuationId> {
    match close {
        PunctuationId::RParen => Some(PunctuationId::LParen),
        PunctuationId::RBracket => Some(PunctuationId::LBracket),
        PunctuationId::RBrace => Some(PunctuationId::LBrace),
        _ => None,
    }
}

const fn info(id: PunctuationId, canonical: &'static str, category: PunctuationCategory) -> PunctuationInfo {
    PunctuationInfo { id, canonical, category }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_pairs_round_trip() {
        for p in PUNCTUATION {
            if is_open(p.id) {
                let close = closing_for(p.id).expect("open bracket without close");
                assert!(is_close(close));
                assert_eq!(opening_for(close), Some(p.id));
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(from_str("..."), Some(PunctuationId::Ellipsis));
        assert_eq!(from_str(";"), Some(PunctuationId::Semicolon));
        assert_eq!(from_str("+"), None);
        assert_eq!(as_str(PunctuationId::Arrow), "->");
    }
}
