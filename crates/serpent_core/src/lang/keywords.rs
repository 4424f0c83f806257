//! Define the reserved keyword vocabulary for Python.
//!
//! This module is the single source of truth for reserved words: a stable identifier
//! ([`KeywordId`]) plus a const metadata table ([`KEYWORDS`]) that records canonical spellings,
//! categories, and the range of language versions in which the spelling is reserved.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive** and **version-aware**: `async` is a keyword in 3.7+ but a
//!   plain name in 3.5/3.6, `print` is a keyword only in 2.7.
//! - Soft keywords (`match`, `case`) are not reserved: [`from_str`] never returns them. They have their own
//!   small table, looked up with [`soft_keyword_from_str`]; whether a name acts as one depends on its position.
//! - Some reserved words are also “word operators” (e.g. `and`). If you need operator precedence, use
//!   [`crate::lang::operators`].
//!
//! ## Examples
//! ```rust
//! use serpent_core::lang::keywords::{self, KeywordId};
//! use serpent_core::PythonVersion;
//!
//! assert_eq!(keywords::from_str("lambda", PythonVersion::V38), Some(KeywordId::Lambda));
//! assert_eq!(keywords::from_str("async", PythonVersion::V36), None);
//! assert_eq!(keywords::as_str(KeywordId::Elif), "elif");
//! ```

use super::versions::PythonVersion;

/// Stable identifier for every reserved keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Control flow / statements
    If,
    Elif,
    Else,
    For,
    While,
    Break,
    Continue,
    Return,
    Yield,
    Pass,
    Try,
    Except,
    Finally,
    Raise,
    Assert,
    With,
    Del,
    Global,
    Nonlocal,

    // Definitions
    Def,
    Class,
    Lambda,
    Async,
    Await,

    // Imports
    Import,
    From,
    As,

    // Constants
    True,
    False,
    None,

    // Word operators
    And,
    Or,
    Not,
    In,
    Is,

    // Python 2 statements
    Print,
    Exec,
}

/// High-level grouping for documentation and tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    ControlFlow,
    Definition,
    Import,
    Constant,
    Operator,
    Statement,
}

/// Metadata for a keyword.
///
/// ## Notes
/// - `since` is the first version in which the spelling is reserved.
/// - `until` is the last version in which it is reserved (`None` means still reserved).
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
    pub since: PythonVersion,
    pub until: Option<PythonVersion>,
}

impl KeywordInfo {
    /// Whether this spelling is reserved in `version`.
    pub fn is_reserved_in(&self, version: PythonVersion) -> bool {
        version >= self.since && self.until.is_none_or(|last| version <= last)
    }
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Control flow / statements
    info(KeywordId::If, "if", KeywordCategory::ControlFlow),
    info(KeywordId::Elif, "elif", KeywordCategory::ControlFlow),
    info(KeywordId::Else, "else", KeywordCategory::ControlFlow),
    info(KeywordId::For, "for", KeywordCategory::ControlFlow),
    info(KeywordId::While, "while", KeywordCategory::ControlFlow),
    info(KeywordId::Break, "break", KeywordCategory::ControlFlow),
    info(KeywordId::Continue, "continue", KeywordCategory::ControlFlow),
    info(KeywordId::Return, "return", KeywordCategory::ControlFlow),
    info(KeywordId::Yield, "yield", KeywordCategory::ControlFlow),
    info(KeywordId::Pass, "pass", KeywordCategory::Statement),
    info(KeywordId::Try, "try", KeywordCategory::ControlFlow),
    info(KeywordId::Except, "except", KeywordCategory::ControlFlow),
    info(KeywordId::Finally, "finally", KeywordCategory::ControlFlow),
    info(KeywordId::Raise, "raise", KeywordCategory::ControlFlow),
    info(KeywordId::Assert, "assert", KeywordCategory::Statement),
    info(KeywordId::With, "with", KeywordCategory::ControlFlow),
    info(KeywordId::Del, "del", KeywordCategory::Statement),
    info(KeywordId::Global, "global", KeywordCategory::Statement),
    ranged(
        KeywordId::Nonlocal,
        "nonlocal",
        KeywordCategory::Statement,
        PythonVersion::V35,
        None,
    ),
    // Definitions
    info(KeywordId::Def, "def", KeywordCategory::Definition),
    info(KeywordId::Class, "class", KeywordCategory::Definition),
    info(KeywordId::Lambda, "lambda", KeywordCategory::Definition),
    ranged(
        KeywordId::Async,
        "async",
        KeywordCategory::Definition,
        PythonVersion::V37,
        None,
    ),
    ranged(
        KeywordId::Await,
        "await",
        KeywordCategory::Operator,
        PythonVersion::V37,
        None,
    ),
    // Imports
    info(KeywordId::Import, "import", KeywordCategory::Import),
    info(KeywordId::From, "from", KeywordCategory::Import),
    info(KeywordId::As, "as", KeywordCategory::Import),
    // Constants
    info(KeywordId::True, "True", KeywordCategory::Constant),
    info(KeywordId::False, "False", KeywordCategory::Constant),
    info(KeywordId::None, "None", KeywordCategory::Constant),
    // Word operators
    info(KeywordId::And, "and", KeywordCategory::Operator),
    info(KeywordId::Or, "or", KeywordCategory::Operator),
    info(KeywordId::Not, "not", KeywordCategory::Operator),
    info(KeywordId::In, "in", KeywordCategory::Operator),
    info(KeywordId::Is, "is", KeywordCategory::Operator),
    // Python 2 statements
    ranged(
        KeywordId::Print,
        "print",
        KeywordCategory::Statement,
        PythonVersion::V27,
        Some(PythonVersion::V27),
    ),
    ranged(
        KeywordId::Exec,
        "exec",
        KeywordCategory::Statement,
        PythonVersion::V27,
        Some(PythonVersion::V27),
    ),
];

/// Canonical spelling.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by spelling, honoring the version range in which the spelling is reserved.
///
/// ## Returns
/// - `Some(KeywordId)` if `s` is a reserved word in `version`.
/// - `None` otherwise (the spelling is an ordinary name).
pub fn from_str(s: &str, version: PythonVersion) -> Option<KeywordId> {
    KEYWORDS
        .iter()
        .find(|k| k.canonical == s && k.is_reserved_in(version))
        .map(|k| k.id)
}

/// `True`, `False` and `None` behave like names for spacing purposes.
pub fn is_value_keyword(id: KeywordId) -> bool {
    category(id) == KeywordCategory::Constant
}

/// Keywords that are spelled words but act as operators (`and`, `or`, `not`, `in`, `is`, `await`).
pub fn is_word_operator(id: KeywordId) -> bool {
    category(id) == KeywordCategory::Operator
}

// --- helpers -----------------------------------------------------------------

const fn info(id: KeywordId, canonical: &'static str, category: KeywordCategory) -> KeywordInfo {
    ranged(id, canonical, category, PythonVersion::V27, None)
}

const fn ranged(
    id: KeywordId,
    canonical: &'static str,
    category: KeywordCategory,
    since: PythonVersion,
    until: Option<PythonVersion>,
) -> KeywordInfo {
    KeywordInfo {
        id,
        canonical,
        category,
        since,
        until,
    }
}

// ============================================================================
// Soft keywords
// ============================================================================

/// Names that act as keywords only when they open a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoftKeywordId {
    Match,
    Case,
}

const SOFT_KEYWORDS: &[(SoftKeywordId, &str)] = &[(SoftKeywordId::Match, "match"), (SoftKeywordId::Case, "case")];

/// Lookup of a soft keyword spelling. Always `None` for grammars without pattern matching.
pub fn soft_keyword_from_str(s: &str, version: PythonVersion) -> Option<SoftKeywordId> {
    if !version.has_pattern_matching() {
        return None;
    }
    SOFT_KEYWORDS
        .iter()
        .find(|(_, spelling)| *spelling == s)
        .map(|&(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_id_has_registry_entry() {
        for k in KEYWORDS {
            assert_eq!(info_for(k.id).canonical, k.canonical);
        }
    }

    #[test]
    fn test_version_gating() {
        assert_eq!(from_str("async", PythonVersion::V35), None);
        assert_eq!(from_str("async", PythonVersion::V37), Some(KeywordId::Async));
        assert_eq!(from_str("print", PythonVersion::V27), Some(KeywordId::Print));
        assert_eq!(from_str("print", PythonVersion::V38), None);
        assert_eq!(from_str("nonlocal", PythonVersion::V27), None);
        assert_eq!(from_str("nonlocal", PythonVersion::V36), Some(KeywordId::Nonlocal));
    }

    #[test]
    fn test_soft_keywords_are_names() {
        assert_eq!(from_str("match", PythonVersion::LATEST), None);
        assert_eq!(from_str("case", PythonVersion::LATEST), None);
        assert_eq!(from_str("type", PythonVersion::LATEST), None);
        assert_eq!(soft_keyword_from_str("match", PythonVersion::V310), Some(SoftKeywordId::Match));
        assert_eq!(soft_keyword_from_str("case", PythonVersion::LATEST), Some(SoftKeywordId::Case));
        assert_eq!(soft_keyword_from_str("case", PythonVersion::V39), None);
        assert_eq!(soft_keyword_from_str("if", PythonVersion::LATEST), None);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(from_str("none", PythonVersion::LATEST), None);
        assert_eq!(from_str("None", PythonVersion::LATEST), Some(KeywordId::None));
        assert!(is_value_keyword(KeywordId::None));
        assert!(!is_value_keyword(KeywordId::Return));
    }
}
