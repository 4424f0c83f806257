//! Output buffer for one formatted line
//!
//! The line formatter decides the separator before every token; the writer joins them and trims the
//! result.

/// What goes between two tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spacing {
    /// Tokens touch
    None,
    /// Exactly one space
    Space,
    /// This many spaces
    Spaces(usize),
    /// Whatever the source had
    Keep(String),
}

/// Writer that builds the replacement text for one line
#[derive(Debug, Default)]
pub struct LineWriter {
    output: String,
}

impl LineWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a separator
    pub fn separate(&mut self, spacing: &Spacing) {
        match spacing {
            Spacing::None => {}
            Spacing::Space => self.output.push(' '),
            Spacing::Spaces(n) => self.output.extend(std::iter::repeat_n(' ', *n)),
            Spacing::Keep(ws) => self.output.push_str(ws),
        }
    }

    /// Write token text verbatim
    pub fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    /// Get the output, keeping trailing whitespace (the line continues after it)
    pub fn finish(self) -> String {
        self.output
    }

    /// Get the output with trailing whitespace removed
    pub fn finish_trimmed(self) -> String {
        let mut output = self.output;
        output.truncate(output.trim_end().len());
        output
    }
}
