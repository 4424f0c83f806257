//! Operator vocabulary.
//!
//! This module defines the canonical symbol-operator set along with basic metadata such as
//! precedence, fixity, and the version range in which a spelling exists.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive** and returns only symbol operators. Word operators
//!   (`and`, `not`, ...) are lexed as keywords; see [`crate::lang::keywords`].
//! - `@` is listed once as [`OperatorId::At`]; whether it is a decorator or matrix multiplication is a
//!   parser/formatter decision.
//!
//! ## Examples
//! ```rust
//! use serpent_core::lang::operators::{self, OperatorId};
//! use serpent_core::PythonVersion;
//!
//! assert_eq!(operators::from_str("//=", PythonVersion::LATEST), Some(OperatorId::FloorDivAssign));
//! assert_eq!(operators::from_str(":=", PythonVersion::V37), None);
//! assert!(operators::info_for(OperatorId::Star).precedence > operators::info_for(OperatorId::Plus).precedence);
//! ```

use super::versions::PythonVersion;

/// Define whether an operator is infix (binary), prefix (unary), or may be either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fixity {
    Infix,
    Prefix,
    /// `+`, `-`: binary or unary depending on position.
    Either,
}

/// Stable identifier for every symbol operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorId {
    // Arithmetic
    Plus,
    Minus,
    Star,
    Power,
    Slash,
    FloorDiv,
    Percent,
    At,

    // Bitwise
    LeftShift,
    RightShift,
    BitAnd,
    BitOr,
    BitXor,
    Tilde,

    // Comparison
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    /// Python 2 `<>`.
    LtGt,

    // Assignment
    Assign,
    Walrus,
    PlusAssign,
    MinusAssign,
    StarAssign,
    PowerAssign,
    SlashAssign,
    FloorDivAssign,
    PercentAssign,
    AtAssign,
    LeftShiftAssign,
    RightShiftAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
}

/// Metadata for an operator.
///
/// ## Notes
/// - `precedence` is a relative ordering where higher binds tighter; assignment-like operators use 0.
#[derive(Debug, Clone, Copy)]
pub struct OperatorInfo {
    pub id: OperatorId,
    pub spelling: &'static str,
    pub precedence: u8,
    pub fixity: Fixity,
    pub since: PythonVersion,
    pub until: Option<PythonVersion>,
}

impl OperatorInfo {
    pub fn exists_in(&self, version: PythonVersion) -> bool {
        version >= self.since && self.until.is_none_or(|last| version <= last)
    }
}

/// Registry of all operators.
pub const OPERATORS: &[OperatorInfo] = &[
    // Arithmetic
    op(OperatorId::Plus, "+", 50, Fixity::Either),
    op(OperatorId::Minus, "-", 50, Fixity::Either),
    op(OperatorId::Star, "*", 60, Fixity::Infix),
    op(OperatorId::Power, "**", 80, Fixity::Infix),
    op(OperatorId::Slash, "/", 60, Fixity::Infix),
    op(OperatorId::FloorDiv, "//", 60, Fixity::Infix),
    op(OperatorId::Percent, "%", 60, Fixity::Infix),
    ranged(OperatorId::At, "@", 60, Fixity::Infix, PythonVersion::V35, None),
    // Bitwise
    op(OperatorId::LeftShift, "<<", 45, Fixity::Infix),
    op(OperatorId::RightShift, ">>", 45, Fixity::Infix),
    op(OperatorId::BitAnd, "&", 40, Fixity::Infix),
    op(OperatorId::BitXor, "^", 35, Fixity::Infix),
    op(OperatorId::BitOr, "|", 30, Fixity::Infix),
    op(OperatorId::Tilde, "~", 70, Fixity::Prefix),
    // Comparison
    op(OperatorId::Lt, "<", 20, Fixity::Infix),
    op(OperatorId::Gt, ">", 20, Fixity::Infix),
    op(OperatorId::LtEq, "<=", 20, Fixity::Infix),
    op(OperatorId::GtEq, ">=", 20, Fixity::Infix),
    op(OperatorId::EqEq, "==", 20, Fixity::Infix),
    op(OperatorId::NotEq, "!=", 20, Fixity::Infix),
    ranged(
        OperatorId::LtGt,
        "<>",
        20,
        Fixity::Infix,
        PythonVersion::V27,
        Some(PythonVersion::V27),
    ),
    // Assignment
    op(OperatorId::Assign, "=", 0, Fixity::Infix),
    ranged(OperatorId::Walrus, ":=", 0, Fixity::Infix, PythonVersion::V38, None),
    op(OperatorId::PlusAssign, "+=", 0, Fixity::Infix),
    op(OperatorId::MinusAssign, "-=", 0, Fixity::Infix),
    op(OperatorId::StarAssign, "*=", 0, Fixity::Infix),
    op(OperatorId::PowerAssign, "**=", 0, Fixity::Infix),
    op(OperatorId::SlashAssign, "/=", 0, Fixity::Infix),
    op(OperatorId::FloorDivAssign, "//=", 0, Fixity::Infix),
    op(OperatorId::PercentAssign, "%=", 0, Fixity::Infix),
    ranged(OperatorId::AtAssign, "@=", 0, Fixity::Infix, PythonVersion::V35, None),
    op(OperatorId::LeftShiftAssign, "<<=", 0, Fixity::Infix),
    op(OperatorId::RightShiftAssign, ">>=", 0, Fixity::Infix),
    op(OperatorId::BitAndAssign, "&=", 0, Fixity::Infix),
    op(OperatorId::BitOrAssign, "|=", 0, Fixity::Infix),
    op(OperatorId::BitXorAssign, "^=", 0, Fixity::Infix),
];

/// Return the full metadata entry for an operator.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: OperatorId) -> &'static OperatorInfo {
    OPERATORS.iter().find(|o| o.id == id).expect("operator info missing")
}

/// Canonical spelling.
pub fn as_str(id: OperatorId) -> &'static str {
    info_for(id).spelling
}

/// Resolve an operator spelling to its identifier for the given version.
pub fn from_str(spelling: &str, version: PythonVersion) -> Option<OperatorId> {
    OPERATORS
        .iter()
        .find(|o| o.spelling == spelling && o.exists_in(version))
        .map(|o| o.id)
}

/// `=`, `:=` and every augmented assignment.
pub fn is_assignment(id: OperatorId) -> bool {
    info_for(id).precedence == 0
}

pub fn is_comparison(id: OperatorId) -> bool {
    matches!(
        id,
        OperatorId::Lt
            | OperatorId::Gt
            | OperatorId::LtEq
            | OperatorId::GtEq
            | OperatorId::EqEq
            | OperatorId::NotEq
            | OperatorId::LtGt
    )
}

/// Operators that may appear in prefix position (`+x`, `-x`, `~x`).
pub fn can_be_unary(id: OperatorId) -> bool {
    matches!(info_for(id).fixity, Fixity::Prefix | Fixity::Either)
}

/// Length of the longest spelling in [`OPERATORS`]; the tokenizer starts maximal munch here.
pub fn max_spelling_len() -> usize {
    OPERATORS.iter().map(|o| o.spelling.len()).max().unwrap_or(1)
}

// --- helpers -----------------------------------------------------------------

const fn op(id: OperatorId, spelling: &'static str, precedence: u8, fixity: Fixity) -> OperatorInfo {
    ranged(id, spelling, precedence, fixity, PythonVersion::V27, None)
}

const fn ranged(
    id: OperatorId,
    spelling: &'static str,
    precedence: u8,
    fixity: Fixity,
    since: PythonVersion,
    until: Option<PythonVersion>,
) -> OperatorInfo {
    OperatorInfo {
        id,
        spelling,
        precedence,
        fixity,
        since,
        until,
    }
}
