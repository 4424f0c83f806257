//! Formatter configuration
//!
//! The spacing rules are fixed (PEP 8); only the knobs below vary.

use serpent_core::PythonVersion;

/// Settings for the line formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Minimum number of spaces between code and a trailing comment
    pub comment_padding: usize,
    /// Language version used to tokenize the document
    pub version: PythonVersion,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            comment_padding: 2,
            version: PythonVersion::LATEST,
        }
    }
}

impl FormatOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum padding before trailing comments
    pub fn with_comment_padding(mut self, padding: usize) -> Self {
        self.comment_padding = padding;
        self
    }

    /// Set the target language version
    pub fn with_version(mut self, version: PythonVersion) -> Self {
        self.version = version;
        self
    }
}

/// Editor indentation settings, used by the block formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentOptions {
    /// Width of a tab stop in columns
    pub tab_size: usize,
    /// Whether the editor indents with spaces
    pub insert_spaces: bool,
}

impl Default for IndentOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
        }
    }
}

impl IndentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab_size(mut self, tab_size: usize) -> Self {
        self.tab_size = tab_size;
        self
    }

    pub fn with_insert_spaces(mut self, insert_spaces: bool) -> Self {
        self.insert_spaces = insert_spaces;
        self
    }

    /// Visual width of a run of leading whitespace.
    pub fn indent_width(&self, indent: &str) -> usize {
        let tab = self.tab_size.max(1);
        indent.chars().fold(0, |col, c| match c {
            '\t' => (col / tab + 1) * tab,
            _ => col + 1,
        })
    }
}
