//! Number scanning for the Python tokenizer.
//!
//! Handles decimal/hex/octal/binary integers with `_` separators, floats, exponents, imaginary literals,
//! and the Python 2 forms (`L` suffix, `0777` octal). Malformed literals are reported and still produce a
//! best-effort `Constant` token.

use super::Tokenizer;
use super::tokens::{Literal, Number, TokenKind};
use crate::diagnostics::ErrorCode;
use serpent_core::lang::keywords::{self, KeywordId};

impl<'a> Tokenizer<'a> {
    pub(super) fn scan_number(&mut self, start: usize) -> TokenKind {
        let number = if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X' | 'o' | 'O' | 'b' | 'B')) {
            self.scan_radix_number(start)
        } else {
            self.scan_decimal_number(start)
        };

        // `1abc` / `0x1g`: swallow the rest of the word so the stream re-synchronizes.
        if self.peek().is_some_and(|c| c == '_' || c.is_alphanumeric()) && !self.at_abutting_keyword() {
            while self.peek().is_some_and(|c| c == '_' || c.is_alphanumeric()) {
                self.bump();
            }
            let source = self.source;
            self.report(
                format!("invalid numeric literal '{}'", &source[start..self.pos]),
                start,
                self.pos,
                ErrorCode::BadNumber,
            );
        }

        TokenKind::Constant(Literal::Number(number))
    }

    fn scan_radix_number(&mut self, start: usize) -> Number {
        self.bump(); // 0
        let marker = self.bump().unwrap_or('x');
        let radix = match marker {
            'x' | 'X' => 16,
            'o' | 'O' => 8,
            _ => 2,
        };

        let digits_start = self.pos;
        while self.peek().is_some_and(|c| c == '_' || c.is_digit(radix)) {
            self.bump();
        }
        let source = self.source;
        let raw = &source[digits_start..self.pos];
        let digits: String = raw.chars().filter(|c| *c != '_').collect();

        // `0x_1f` is valid: an underscore may directly follow the prefix.
        let underscores_ok = !raw.ends_with('_') && !raw.contains("__");
        if digits.is_empty() || !underscores_ok {
            self.report(
                format!("invalid {} literal", radix_name(radix)),
                start,
                self.pos,
                ErrorCode::BadNumber,
            );
        }
        self.eat_long_suffix();

        if digits.is_empty() {
            return Number::Int(0);
        }
        match i64::from_str_radix(&digits, radix) {
            Ok(v) => Number::Int(v),
            Err(_) => Number::LargeInt(format!("0{}{}", marker.to_ascii_lowercase(), digits.to_ascii_lowercase())),
        }
    }

    fn scan_decimal_number(&mut self, start: usize) -> Number {
        let mut is_float = false;

        // Integer part (empty for `.5`)
        self.eat_decimal_digits();

        // Fraction
        if self.peek() == Some('.') {
            is_float = true;
            self.bump();
            self.eat_decimal_digits();
        }

        // Exponent
        if matches!(self.peek(), Some('e' | 'E')) {
            let has_digits = match self.peek_at(1) {
                Some('+' | '-') => self.peek_at(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_digits {
                is_float = true;
                self.bump();
                if matches!(self.peek(), Some('+' | '-')) {
                    self.bump();
                }
                self.eat_decimal_digits();
            }
            // Otherwise the trailing-word check in `scan_number` reports `1e` / `1ex`.
        }

        let imaginary = matches!(self.peek(), Some('j' | 'J'));
        if imaginary {
            self.bump();
        }

        let source = self.source;
        let text = &source[start..self.pos];
        let cleaned: String = text
            .chars()
            .filter(|c| !matches!(c, '_' | 'j' | 'J'))
            .collect();

        if !underscores_valid(text) {
            self.report(format!("invalid decimal literal '{text}'"), start, self.pos, ErrorCode::BadNumber);
        }

        if imaginary || is_float {
            let value = cleaned.parse::<f64>().unwrap_or_else(|_| {
                self.report(format!("invalid float literal '{text}'"), start, self.pos, ErrorCode::BadNumber);
                0.0
            });
            return if imaginary {
                Number::Imaginary(value)
            } else {
                Number::Float(value)
            };
        }

        // Leading zeros: legal octal in 2.7, an error in 3.x unless every digit is zero.
        if cleaned.len() > 1 && cleaned.starts_with('0') {
            if self.version.is_python2() {
                self.eat_long_suffix();
                return match i64::from_str_radix(&cleaned, 8) {
                    Ok(v) => Number::Int(v),
                    Err(_) => {
                        self.report(format!("invalid octal literal '{text}'"), start, self.pos, ErrorCode::BadNumber);
                        Number::Int(0)
                    }
                };
            }
            if cleaned.chars().any(|c| c != '0') {
                self.report(
                    "leading zeros in decimal integer literals are not permitted",
                    start,
                    self.pos,
                    ErrorCode::BadNumber,
                );
            }
        }

        self.eat_long_suffix();
        match cleaned.parse::<i64>() {
            Ok(v) => Number::Int(v),
            Err(_) => Number::LargeInt(cleaned),
        }
    }

    /// A keyword that may directly follow a number: `1if x else 2`, `[0for x in y]`.
    fn at_abutting_keyword(&self) -> bool {
        let rest = &self.source[self.pos..];
        let len = rest
            .find(|c: char| !(c == '_' || c.is_alphanumeric()))
            .unwrap_or(rest.len());
        keywords::from_str(&rest[..len], self.version).is_some_and(|id| {
            matches!(
                id,
                KeywordId::And
                    | KeywordId::Else
                    | KeywordId::For
                    | KeywordId::If
                    | KeywordId::In
                    | KeywordId::Is
                    | KeywordId::Not
                    | KeywordId::Or
            )
        })
    }

    fn eat_decimal_digits(&mut self) {
        while self.peek().is_some_and(|c| c == '_' || c.is_ascii_digit()) {
            self.bump();
        }
    }

    /// Python 2 `L` suffix on integers. In 3.x the trailing-word check reports it instead.
    fn eat_long_suffix(&mut self) {
        if self.version.is_python2() && matches!(self.peek(), Some('l' | 'L')) {
            self.bump();
        }
    }
}

fn radix_name(radix: u32) -> &'static str {
    match radix {
        16 => "hexadecimal",
        8 => "octal",
        _ => "binary",
    }
}

/// Every `_` must sit between two decimal digits.
fn underscores_valid(text: &str) -> bool {
    let chars: Vec<char> = text.chars().collect();
    chars.iter().enumerate().all(|(i, c)| {
        *c != '_'
            || (i > 0
                && chars[i - 1].is_ascii_digit()
                && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()))
    })
}
