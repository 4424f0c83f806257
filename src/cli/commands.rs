//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::path::{Path, PathBuf};

use miette::{NamedSource, Report};
use serpent_core::PythonVersion;
use serpent_syntax::ast::Location;
use serpent_syntax::diagnostics::SyntaxError;
use serpent_syntax::lexer::{Literal, Token, TokenKind, Tokenizer, TokenizerOptions};
use serpent_syntax::fstring::parse_fstring;
use serpent_syntax::syntax_errors;

use crate::format::{FormatOptions, LineFormatter, format_diff, format_source};

use super::{CliError, CliResult, ExitCode};

/// Maximum source file size (100 MB)
///
/// Files larger than this are rejected to prevent out-of-memory conditions
/// while tokenizing.
const MAX_SOURCE_SIZE: u64 = 100 * 1024 * 1024;

/// Read source file contents.
///
/// ## Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_SOURCE_SIZE` (100 MB)
pub fn read_source(file_path: &Path) -> CliResult<String> {
    let display = file_path.display();
    let metadata =
        fs::metadata(file_path).map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", display, e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            display,
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(file_path).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", display, e)))
}

/// Render syntax errors against their source with miette.
pub fn render_errors(name: &str, source: &str, errors: &[SyntaxError]) -> String {
    let mut out = String::new();
    for error in errors {
        let report = Report::new(error.clone()).with_source_code(NamedSource::new(name, source.to_string()));
        out.push_str(&format!("{:?}\n", report));
    }
    out
}

// ============================================================================
// tokens
// ============================================================================

/// Tokenize a file and print one token per line.
pub fn tokens(file_path: &Path, version: PythonVersion) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let mut tokenizer = Tokenizer::new(&source, version, TokenizerOptions::new().with_verbatim(true));
    for token in tokenizer.by_ref() {
        println!("{}", describe_token(&token));
    }

    let errors = tokenizer.take_errors();
    if errors.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    let name = file_path.display().to_string();
    Err(CliError::failure(render_errors(&name, &source, &errors).trim_end()))
}

/// `start-end  KIND  text` for one token.
pub fn describe_token(token: &Token) -> String {
    format!("{}-{}\t{}\t{:?}", token.start, token.end, kind_name(&token.kind), token.text())
}

fn kind_name(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Keyword(_) => "KEYWORD",
        TokenKind::Operator(_) => "OP",
        TokenKind::Punctuation(_) => "PUNCT",
        TokenKind::Name(_) => "NAME",
        TokenKind::Constant(Literal::Number(_)) => "NUMBER",
        TokenKind::Constant(Literal::FString(_)) => "FSTRING",
        TokenKind::Constant(Literal::Bytes(_)) => "BYTES",
        TokenKind::Constant(Literal::Str(_)) => "STRING",
        TokenKind::Newline => "NEWLINE",
        TokenKind::NL => "NL",
        TokenKind::Indent => "INDENT",
        TokenKind::Dedent => "DEDENT",
        TokenKind::Comment(_) => "COMMENT",
        TokenKind::ExplicitLineJoin => "LINE_JOIN",
        TokenKind::Error(_) => "ERROR",
        TokenKind::EndOfFile => "EOF",
    }
}

// ============================================================================
// check
// ============================================================================

/// Report tokenizer and f-string errors in a file.
pub fn check_file(file_path: &Path, version: PythonVersion) -> CliResult<ExitCode> {
    let source = read_source(file_path)?;
    let errors = syntax_errors(&source, version);
    if errors.is_empty() {
        println!("✓ No syntax errors ({})", version);
        return Ok(ExitCode::SUCCESS);
    }
    let name = file_path.display().to_string();
    Err(CliError::failure(render_errors(&name, &source, &errors).trim_end()))
}

// ============================================================================
// fstring
// ============================================================================

/// Parse an f-string body and print the result.
pub fn fstring(body: &str, is_raw: bool, version: PythonVersion) -> CliResult<ExitCode> {
    let mut errors = Vec::new();
    let parsed = parse_fstring(body, Location::START, is_raw, version, &mut errors);
    println!("{:#?}", parsed);
    if errors.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    Err(CliError::failure(render_errors("<fstring>", body, &errors).trim_end()))
}

// ============================================================================
// fmt
// ============================================================================

/// Print the edit for one line of a file without modifying it.
pub fn format_line(path: &Path, line: usize, options: &FormatOptions) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let mut formatter = LineFormatter::new(&source, options.clone());
    match formatter.try_format_line(line) {
        Ok(Some(edit)) => println!("{}", edit),
        Ok(None) => println!("line {} is already formatted", line),
        Err(e) => return Err(CliError::failure(format!("{}: {}", path.display(), e))),
    }
    Ok(ExitCode::SUCCESS)
}

/// Format Python source files.
pub fn format_files(path: &Path, check_mode: bool, diff_mode: bool, options: &FormatOptions) -> CliResult<ExitCode> {
    let files = collect_py_files(path);

    if files.is_empty() {
        return Err(CliError::failure("No .py files found"));
    }

    let mut needs_formatting = false;
    let mut formatted_count = 0;
    let mut error_count = 0;

    for file_path in &files {
        let source = match read_source(file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}", e);
                error_count += 1;
                continue;
            }
        };

        let formatted = format_source(&source, options);
        let changed = source != formatted;

        if diff_mode && changed {
            println!("--- {}", file_path.display());
            if let Some(diff) = format_diff(&source, options) {
                print!("{}", diff);
            }
            println!();
        }

        if check_mode {
            if changed {
                println!("Would reformat: {}", file_path.display());
                needs_formatting = true;
            }
        } else if diff_mode {
            if changed {
                needs_formatting = true;
            }
        } else if changed {
            if let Err(e) = fs::write(file_path, &formatted) {
                eprintln!("Error writing {}: {}", file_path.display(), e);
                error_count += 1;
            } else {
                println!("Formatted: {}", file_path.display());
                formatted_count += 1;
            }
        }
    }

    if check_mode || diff_mode {
        if needs_formatting {
            let msg = if diff_mode {
                "need formatting"
            } else {
                "would be reformatted"
            };
            return Err(CliError::failure(format!("\n{} file(s) {}", files.len(), msg)));
        } else {
            println!("✓ {} file(s) already formatted", files.len());
        }
    } else {
        println!("\n✓ {} file(s) formatted, {} error(s)", formatted_count, error_count);
    }

    if error_count > 0 {
        return Err(CliError::new("", ExitCode::FAILURE));
    }

    Ok(ExitCode::SUCCESS)
}

fn collect_py_files(path: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if path.is_file() {
        if path.extension().is_some_and(|ext| ext == "py") {
            files.push(path.to_path_buf());
        }
    } else if path.is_dir() {
        if let Ok(entries) = fs::read_dir(path) {
            for entry in entries.flatten() {
                let entry_path = entry.path();
                if entry_path.is_dir() {
                    let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                    if !name.starts_with('.') && name != "target" && name != "__pycache__" && name != "venv" {
                        files.extend(collect_py_files(&entry_path));
                    }
                } else if entry_path.extension().is_some_and(|ext| ext == "py") {
                    files.push(entry_path);
                }
            }
        }
    }

    files.sort();
    files
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serpent_syntax::lexer;

    #[test]
    fn test_describe_token() {
        let mut tokenizer = Tokenizer::new("x = 'a'\n", PythonVersion::LATEST, TokenizerOptions::new().with_verbatim(true));
        let lines: Vec<String> = tokenizer.by_ref().map(|t| describe_token(&t)).collect();
        assert_eq!(lines[0], "1:1-1:2\tNAME\t\"x\"");
        assert_eq!(lines[1], "1:3-1:4\tOP\t\"=\"");
        assert_eq!(lines[2], "1:5-1:8\tSTRING\t\"'a'\"");
    }

    #[test]
    fn test_render_errors_names_the_source() {
        let (_, errors) = lexer::lex("x = $\n", PythonVersion::LATEST);
        let rendered = render_errors("demo.py", "x = $\n", &errors);
        assert!(rendered.contains("demo.py"));
        assert!(rendered.contains("unexpected character"));
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("/nonexistent/serpent/file.py")).unwrap_err();
        assert!(err.message.starts_with("Cannot access file"));
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }

    #[test]
    fn test_format_files_rewrites_in_place() {
        let dir = std::env::temp_dir().join(format!("serpent_fmt_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let file = dir.join("a.py");
        fs::write(&file, "x=1\n").unwrap();

        let options = FormatOptions::default();
        assert!(format_files(&dir, true, false, &options).is_err());
        assert_eq!(format_files(&dir, false, false, &options).unwrap(), ExitCode::SUCCESS);
        assert_eq!(fs::read_to_string(&file).unwrap(), "x = 1\n");
        assert_eq!(format_files(&dir, true, false, &options).unwrap(), ExitCode::SUCCESS);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_collect_py_files_skips_other_extensions() {
        let dir = std::env::temp_dir().join(format!("serpent_collect_{}", std::process::id()));
        fs::create_dir_all(dir.join("__pycache__")).unwrap();
        fs::write(dir.join("b.py"), "").unwrap();
        fs::write(dir.join("a.txt"), "").unwrap();
        fs::write(dir.join("__pycache__").join("c.py"), "").unwrap();

        assert_eq!(collect_py_files(&dir), vec![dir.join("b.py")]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
