//! Python source formatting
//!
//! Two formatters share the edit types in this module:
//! - [`LineFormatter`] re-spaces the tokens of a physical line (PEP 8 operator, comma and colon spacing).
//! - [`BlockFormatter`] re-indents `else`/`elif`/`except`/`finally` lines to the block they continue.
//!
//! Both produce [`TextEdit`]s in zero-indexed editor coordinates. The helpers below run the line
//! formatter over a whole document for the CLI.

mod block;
mod config;
mod edit;
mod line;
mod writer;

use serpent_syntax::lexer;

pub use block::BlockFormatter;
pub use config::{FormatOptions, IndentOptions};
pub use edit::{Position, TextEdit, TextRange, apply_edits, offset_of};
pub use line::{FormatError, LineFormatter};

/// Format every line of `source`.
pub fn format_source(source: &str, options: &FormatOptions) -> String {
    let edits = LineFormatter::new(source, options.clone()).format_document();
    apply_edits(source, &edits)
}

/// Check if source code is already formatted
pub fn check_formatted(source: &str, options: &FormatOptions) -> bool {
    LineFormatter::new(source, options.clone())
        .format_document()
        .is_empty()
}

/// Get the diff between original and formatted source
pub fn format_diff(source: &str, options: &FormatOptions) -> Option<String> {
    let formatted = format_source(source, options);
    if source == formatted {
        return None;
    }

    // Line edits never add or remove lines, so a line-by-line diff is exact.
    let mut diff = String::new();
    for (i, (orig, fmt)) in physical_lines(source).zip(physical_lines(&formatted)).enumerate() {
        if orig != fmt {
            diff.push_str(&format!("-{:4} | {}\n", i + 1, orig));
            diff.push_str(&format!("+{:4} | {}\n", i + 1, fmt));
        }
    }
    Some(diff)
}

/// Line contents, split with the tokenizer's line-break rule.
fn physical_lines(text: &str) -> impl Iterator<Item = &str> {
    lexer::line_starts(text)
        .into_iter()
        .map(move |start| &text[start..lexer::line_content_end(text, start)])
}
