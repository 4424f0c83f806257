//! CLI module for serpent
//!
//! This module provides the command-line interface over the tokenizer and the formatters.
//!
//! ## Commands
//!
//! - `tokens <file>` - Print the token stream
//! - `fmt <file|dir>` - Format Python source files (`--check`, `--diff`, `--line N`)
//! - `check <file>` - Report tokenizer and f-string errors
//! - `fstring <body>` - Parse an f-string body and print its parts
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serpent_core::PythonVersion;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Python tokenizer and on-type formatter
#[derive(Parser, Debug)]
#[command(name = "serpent")]
#[command(version = VERSION)]
#[command(about = "Python tokenizer and on-type formatter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Python grammar to use (2.7, 3.5 .. 3.13)
    #[arg(long = "python", value_name = "VERSION", default_value_t = PythonVersion::LATEST, global = true)]
    pub python: PythonVersion,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the token stream of a file
    Tokens {
        /// Source file to tokenize
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Format Python source files
    Fmt {
        /// File or directory to format
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
        /// Show diff of formatting changes
        #[arg(long)]
        diff: bool,
        /// Only print the edit for this one-indexed line (single file only)
        #[arg(long, value_name = "N", conflicts_with_all = ["check", "diff"])]
        line: Option<usize>,
        /// Minimum spaces before a trailing comment
        #[arg(long, value_name = "N", default_value_t = 2)]
        comment_padding: usize,
    },

    /// Report tokenizer and f-string errors
    Check {
        /// Source file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Parse an f-string body (the text between the quotes)
    Fstring {
        /// F-string body, e.g. "{x!r:>{width}}"
        #[arg(value_name = "BODY")]
        body: String,
        /// Treat the body as a raw f-string
        #[arg(long)]
        raw: bool,
    },
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    let version = cli.python;
    tracing::debug!(%version, "selected grammar");

    match cli.command {
        Command::Tokens { file } => commands::tokens(&file, version),
        Command::Fmt {
            path,
            check,
            diff,
            line,
            comment_padding,
        } => {
            let options = crate::format::FormatOptions::new()
                .with_version(version)
                .with_comment_padding(comment_padding);
            match line {
                Some(line) => commands::format_line(&path, line, &options),
                None => commands::format_files(&path, check, diff, &options),
            }
        }
        Command::Check { file } => commands::check_file(&file, version),
        Command::Fstring { body, raw } => commands::fstring(&body, raw, version),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_tokens() {
        let cli = Cli::try_parse_from(["serpent", "tokens", "a.py"]).unwrap();
        assert!(matches!(cli.command, Command::Tokens { .. }));
        assert_eq!(cli.python, PythonVersion::LATEST);
    }

    #[test]
    fn test_cli_parse_python_version() {
        let cli = Cli::try_parse_from(["serpent", "check", "a.py", "--python", "2.7"]).unwrap();
        assert_eq!(cli.python, PythonVersion::V27);

        let cli = Cli::try_parse_from(["serpent", "--python", "py38", "tokens", "a.py"]).unwrap();
        assert_eq!(cli.python, PythonVersion::V38);

        assert!(Cli::try_parse_from(["serpent", "--python", "4.0", "tokens", "a.py"]).is_err());
    }

    #[test]
    fn test_cli_parse_fmt() {
        let cli = Cli::try_parse_from(["serpent", "fmt", "src/", "--check"]).unwrap();
        if let Command::Fmt {
            check,
            diff,
            line,
            comment_padding,
            ..
        } = cli.command
        {
            assert!(check);
            assert!(!diff);
            assert_eq!(line, None);
            assert_eq!(comment_padding, 2);
        } else {
            panic!("Expected Fmt command");
        }
    }

    #[test]
    fn test_cli_parse_fmt_line() {
        let cli = Cli::try_parse_from(["serpent", "fmt", "a.py", "--line", "3"]).unwrap();
        assert!(matches!(cli.command, Command::Fmt { line: Some(3), .. }));
        assert!(Cli::try_parse_from(["serpent", "fmt", "a.py", "--line", "3", "--check"]).is_err());
    }

    #[test]
    fn test_cli_parse_fstring() {
        let cli = Cli::try_parse_from(["serpent", "fstring", "{x!r}", "--raw"]).unwrap();
        if let Command::Fstring { body, raw } = cli.command {
            assert_eq!(body, "{x!r}");
            assert!(raw);
        } else {
            panic!("Expected Fstring command");
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["serpent"]).is_err());
    }
}
