//! Layering guardrails for the workspace crates.
//!
//! - `serpent_core` is a pure vocabulary crate: no dependencies at all.
//! - `serpent_syntax` is shared by the CLI and the language server and must not pull in the async or LSP stack.
//!
//! These tests scan the member manifests instead of resolving the dependency graph.

/// Dependency names declared in `[dependencies]` of a manifest (dev-dependencies are ignored).
fn main_dependencies(manifest: &str) -> Vec<String> {
    let mut in_dependencies = false;
    let mut names = Vec::new();

    for raw_line in manifest.lines() {
        let line = raw_line.trim();
        // Track when we enter/exit the `[dependencies]` table.
        if line.starts_with('[') {
            in_dependencies = line == "[dependencies]";
            continue;
        }

        if !in_dependencies || line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Strip inline comments for robustness.
        let line_no_comment = line.split('#').next().unwrap_or("").trim();
        if let Some((name, _)) = line_no_comment.split_once('=') {
            names.push(name.trim().to_string());
        }
    }
    names
}

#[test]
fn core_has_no_dependencies() {
    let deps = main_dependencies(include_str!("../crates/serpent_core/Cargo.toml"));
    assert!(deps.is_empty(), "`serpent_core` must stay dependency-free, found {deps:?}");
}

#[test]
fn syntax_does_not_depend_on_async_or_lsp_crates() {
    let deps = main_dependencies(include_str!("../crates/serpent_syntax/Cargo.toml"));
    for forbidden in ["tokio", "tower-lsp", "serde_json", "clap"] {
        assert!(
            !deps.iter().any(|d| d == forbidden),
            "`{forbidden}` must not appear in serpent_syntax [dependencies]"
        );
    }
    assert!(deps.iter().any(|d| d == "serpent_core"));
}

#[test]
fn dependency_scan_ignores_dev_dependencies() {
    let manifest = "[dependencies]\na = \"1\" # note\n\n[dev-dependencies]\nb = \"1\"\n";
    assert_eq!(main_dependencies(manifest), vec!["a".to_string()]);
}
