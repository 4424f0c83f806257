//! Python language versions and the syntax capabilities they gate.
//!
//! ## Notes
//! - Only versions whose grammar differs in a way the tokenizer or formatter cares about are listed.
//! - Ordering follows release order, so `PartialOrd` comparisons read naturally (`v >= PythonVersion::V38`).
//!
//! ## Examples
//! ```rust
//! use serpent_core::PythonVersion;
//!
//! let v: PythonVersion = "3.8".parse().unwrap();
//! assert!(v.has_walrus());
//! assert!(!PythonVersion::V27.has_fstrings());
//! ```

use std::fmt;
use std::str::FromStr;

/// Language version tag selecting syntax variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PythonVersion {
    V27,
    V35,
    V36,
    V37,
    V38,
    V39,
    V310,
    V311,
    V312,
    V313,
}

/// Every known version, oldest first.
pub const ALL_VERSIONS: &[PythonVersion] = &[
    PythonVersion::V27,
    PythonVersion::V35,
    PythonVersion::V36,
    PythonVersion::V37,
    PythonVersion::V38,
    PythonVersion::V39,
    PythonVersion::V310,
    PythonVersion::V311,
    PythonVersion::V312,
    PythonVersion::V313,
];

impl PythonVersion {
    /// Newest supported grammar.
    pub const LATEST: PythonVersion = PythonVersion::V313;

    /// `major.minor` spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            PythonVersion::V27 => "2.7",
            PythonVersion::V35 => "3.5",
            PythonVersion::V36 => "3.6",
            PythonVersion::V37 => "3.7",
            PythonVersion::V38 => "3.8",
            PythonVersion::V39 => "3.9",
            PythonVersion::V310 => "3.10",
            PythonVersion::V311 => "3.11",
            PythonVersion::V312 => "3.12",
            PythonVersion::V313 => "3.13",
        }
    }

    pub fn is_at_least(self, other: PythonVersion) -> bool {
        self >= other
    }

    pub fn is_python2(self) -> bool {
        self == PythonVersion::V27
    }

    /// `f"..."` literals (PEP 498).
    pub fn has_fstrings(self) -> bool {
        self >= PythonVersion::V36
    }

    /// `async`/`await` are reserved words from 3.7 on; earlier they are contextual names.
    pub fn async_is_keyword(self) -> bool {
        self >= PythonVersion::V37
    }

    /// Assignment expressions `:=` (PEP 572).
    pub fn has_walrus(self) -> bool {
        self >= PythonVersion::V38
    }

    /// Positional-only parameter marker `/` (PEP 570).
    pub fn has_positional_only_params(self) -> bool {
        self >= PythonVersion::V38
    }

    /// Self-documenting `f"{expr=}"`.
    pub fn has_fstring_debug(self) -> bool {
        self >= PythonVersion::V38
    }

    /// PEP 701 lifted the ban on backslashes inside f-string replacement fields.
    pub fn allows_backslash_in_fstring_expr(self) -> bool {
        self >= PythonVersion::V312
    }

    /// Structural pattern matching with the `match`/`case` soft keywords (PEP 634).
    pub fn has_pattern_matching(self) -> bool {
        self >= PythonVersion::V310
    }

    /// `print` and `exec` are statements (keywords) only in Python 2.
    pub fn has_print_statement(self) -> bool {
        self.is_python2()
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        PythonVersion::LATEST
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a version string does not name a known grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVersion(pub String);

impl fmt::Display for UnknownVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown Python version '{}' (expected one of 2.7, 3.5 .. 3.13)", self.0)
    }
}

impl std::error::Error for UnknownVersion {}

impl FromStr for PythonVersion {
    type Err = UnknownVersion;

    /// Accepts `3.8`, `38`, `py38` and `python3.8`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .trim_start_matches("python")
            .trim_start_matches("py")
            .replace('.', "");
        ALL_VERSIONS
            .iter()
            .copied()
            .find(|v| v.as_str().replace('.', "") == digits)
            .ok_or_else(|| UnknownVersion(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_versions() {
        assert_eq!("3.8".parse::<PythonVersion>(), Ok(PythonVersion::V38));
        assert_eq!("310".parse::<PythonVersion>(), Ok(PythonVersion::V310));
        assert_eq!("py27".parse::<PythonVersion>(), Ok(PythonVersion::V27));
        assert_eq!("python3.12".parse::<PythonVersion>(), Ok(PythonVersion::V312));
        assert!("4.0".parse::<PythonVersion>().is_err());
    }

    #[test]
    fn test_round_trip_spelling() {
        for v in ALL_VERSIONS {
            assert_eq!(v.as_str().parse::<PythonVersion>(), Ok(*v));
        }
    }

    #[test]
    fn test_capabilities() {
        assert!(!PythonVersion::V35.has_fstrings());
        assert!(PythonVersion::V36.has_fstrings());
        assert!(!PythonVersion::V36.async_is_keyword());
        assert!(PythonVersion::V37.async_is_keyword());
        assert!(!PythonVersion::V311.allows_backslash_in_fstring_expr());
        assert!(PythonVersion::V312.allows_backslash_in_fstring_expr());
        assert!(PythonVersion::V27.has_print_statement());
        assert!(!PythonVersion::V35.has_print_statement());
        assert!(!PythonVersion::V39.has_pattern_matching());
        assert!(PythonVersion::V310.has_pattern_matching());
    }
}
