use std::fs;
use std::path::{Path, PathBuf};

use serpent_core::lang::keywords::KEYWORDS;

/// Guardrail against stringly-typed keyword checks.
///
/// This is intentionally a **coarse** safety net. It looks for patterns like `== "else"` or
/// `"lambda" => ...` in non-test Rust code, where callers are expected to go through `serpent_core::lang`
/// registries (`KeywordId`) instead.
///
/// Notes:
/// - Registries themselves (`crates/serpent_core/src/lang/**`) and `tests/` are allowed.
/// - Scanning stops at the first `#[cfg(test)]` of a file.
#[test]
fn no_stringly_keyword_checks_in_rust_sources() {
    let root = repo_root();
    let spellings: Vec<&'static str> = KEYWORDS.iter().map(|k| k.canonical).collect();
    let mut offenders: Vec<(PathBuf, usize, String)> = Vec::new();

    let targets = [root.join("src"), root.join("crates")];
    for dir in targets {
        if dir.exists() {
            scan_dir(&root, &dir, &spellings, &mut offenders);
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::new();
        msg.push_str("Found stringly-typed keyword checks. Prefer serpent_core registries.\n\n");
        for (path, line_no, line) in offenders.into_iter().take(80) {
            msg.push_str(&format!(
                "- {}:{}: {}\n",
                path.strip_prefix(&root).unwrap_or(&path).display(),
                line_no,
                line.trim()
            ));
        }
        panic!("{msg}");
    }
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn is_allowed_file(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
    if !rel.ends_with(".rs") {
        return true;
    }
    // Registries define the spellings; allow them.
    if rel.starts_with("crates/serpent_core/src/lang/") {
        return true;
    }
    rel.ends_with("/tests.rs")
}

fn scan_dir(root: &Path, dir: &Path, spellings: &[&'static str], offenders: &mut Vec<(PathBuf, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(root, &path, spellings, offenders);
            continue;
        }
        if is_allowed_file(root, &path) {
            continue;
        }
        let Ok(contents) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in contents.lines().enumerate() {
            if line.trim_start().starts_with("#[cfg(test)]") {
                break;
            }
            if is_suspicious_line(line, spellings) {
                offenders.push((path.clone(), idx + 1, line.to_string()));
            }
        }
    }
}

fn is_suspicious_line(line: &str, spellings: &[&'static str]) -> bool {
    // Avoid false positives in comments/docstrings.
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") {
        return false;
    }

    // Patterns we consider "stringly vocab checks":
    // - `... == "spelling"`
    // - `"spelling" => ...`
    spellings.iter().any(|s| {
        let eq = format!("== \"{s}\"");
        let arm = format!("\"{s}\" =>");
        line.contains(&eq) || line.contains(&arm)
    })
}

#[test]
fn suspicious_line_detection() {
    let spellings = ["else", "lambda"];
    assert!(is_suspicious_line(r#"if name == "else" {"#, &spellings));
    assert!(is_suspicious_line(r#"    "lambda" => true,"#, &spellings));
    assert!(!is_suspicious_line(r#"// name == "else""#, &spellings));
    assert!(!is_suspicious_line(r#"if name == "elsewhere" {"#, &spellings));
}
