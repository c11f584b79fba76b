//! Numeric literals: decimal, hex/octal/binary, legacy octal, BigInt and
//! numeric separators.

use super::{Lexer, TokenFlags, TokenKind, is_id_start};
use crate::error::{Diagnostic, Result};

impl<'a> Lexer<'a> {
    /// Scan a numeric literal whose first character (a digit or the `.` of
    /// `.5`) has already been consumed.
    pub(super) fn scan_number(&mut self, first: char) -> Result<TokenKind> {
        let kind = if first == '.' {
            let mut text = String::from(".");
            self.scan_digits(10, &mut text, false)?;
            self.scan_exponent(&mut text)?;
            if self.peek() == Some('n') {
                return Err(self.error_here(Diagnostic::InvalidBigInt));
            }
            self.decimal_value(&text)?
        } else if first == '0' {
            match self.peek() {
                Some('x' | 'X') => self.scan_radix_number(16)?,
                Some('o' | 'O') => self.scan_radix_number(8)?,
                Some('b' | 'B') => self.scan_radix_number(2)?,
                Some('0'..='9') => self.scan_leading_zero()?,
                Some('_') => {
                    return Err(self.error_at(
                        Diagnostic::InvalidNumericSeparator,
                        self.pos,
                        self.pos + 1,
                    ));
                }
                _ => self.scan_decimal(first)?,
            }
        } else {
            self.scan_decimal(first)?
        };

        self.check_after_number()?;
        Ok(kind)
    }

    fn scan_decimal(&mut self, first: char) -> Result<TokenKind> {
        let mut text = String::from(first);
        self.scan_digits(10, &mut text, true)?;

        if self.peek() == Some('n') {
            self.advance();
            return Ok(TokenKind::BigInt(text));
        }

        let mut fractional = false;
        if self.peek() == Some('.') {
            self.advance();
            text.push('.');
            self.scan_digits(10, &mut text, false)?;
            fractional = true;
        }
        let exponent = self.scan_exponent(&mut text)?;

        if self.peek() == Some('n') && (fractional || exponent) {
            return Err(self.error_here(Diagnostic::InvalidBigInt));
        }
        self.decimal_value(&text)
    }

    /// `0x`, `0o`, `0b` literals; the leading `0` is consumed, the prefix letter is not.
    fn scan_radix_number(&mut self, radix: u32) -> Result<TokenKind> {
        self.advance();
        let mut digits = String::new();
        self.scan_digits(radix, &mut digits, false)?;
        if digits.is_empty() {
            return Err(self.error(Diagnostic::InvalidNumber));
        }

        if self.peek() == Some('n') {
            let raw = self.source.get(self.start..self.pos).unwrap_or("");
            let value = raw.replace('_', "");
            self.advance();
            return Ok(TokenKind::BigInt(value));
        }

        let value = digits
            .chars()
            .filter_map(|ch| ch.to_digit(radix))
            .fold(0.0_f64, |acc, digit| acc * radix as f64 + digit as f64);
        Ok(TokenKind::Number(value))
    }

    /// `017` (legacy octal) or `089` (decimal with a leading zero). Neither
    /// may contain separators or carry a BigInt suffix.
    fn scan_leading_zero(&mut self) -> Result<TokenKind> {
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                '0'..='9' => {
                    digits.push(ch);
                    self.advance();
                }
                '_' => {
                    return Err(self.error_at(
                        Diagnostic::InvalidNumericSeparator,
                        self.pos,
                        self.pos + 1,
                    ));
                }
                _ => break,
            }
        }

        if digits.chars().all(|ch| ch < '8') {
            self.flags |= TokenFlags::LEGACY_OCTAL;
            if self.peek() == Some('n') {
                return Err(self.error_here(Diagnostic::InvalidBigInt));
            }
            let value = digits
                .chars()
                .filter_map(|ch| ch.to_digit(8))
                .fold(0.0_f64, |acc, digit| acc * 8.0 + digit as f64);
            return Ok(TokenKind::Number(value));
        }

        self.flags |= TokenFlags::LEADING_ZERO;
        let mut text = format!("0{}", digits);
        if self.peek() == Some('.') {
            self.advance();
            text.push('.');
            self.scan_digits(10, &mut text, false)?;
        }
        self.scan_exponent(&mut text)?;
        if self.peek() == Some('n') {
            return Err(self.error_here(Diagnostic::InvalidBigInt));
        }
        self.decimal_value(&text)
    }

    /// Optional `e[+-]digits`; returns whether an exponent was present
    fn scan_exponent(&mut self, text: &mut String) -> Result<bool> {
        if !matches!(self.peek(), Some('e' | 'E')) {
            return Ok(false);
        }
        self.advance();
        text.push('e');
        if let Some(sign @ ('+' | '-')) = self.peek() {
            self.advance();
            text.push(sign);
        }
        let before = text.len();
        self.scan_digits(10, text, false)?;
        if text.len() == before {
            return Err(self.error(Diagnostic::InvalidNumber));
        }
        Ok(true)
    }

    /// Append digits of `radix` to `digits`, skipping separators.
    ///
    /// A `_` must sit between two digits: `after_digit` tells whether the
    /// character just before the run was a digit.
    fn scan_digits(&mut self, radix: u32, digits: &mut String, after_digit: bool) -> Result<()> {
        let mut prev_digit = after_digit;
        let mut separator_at = None;
        while let Some(ch) = self.peek() {
            if ch == '_' {
                if !prev_digit {
                    return Err(self.error_at(
                        Diagnostic::InvalidNumericSeparator,
                        self.pos,
                        self.pos + 1,
                    ));
                }
                separator_at = Some(self.pos);
                prev_digit = false;
                self.advance();
            } else if ch.is_digit(radix) {
                digits.push(ch);
                prev_digit = true;
                separator_at = None;
                self.advance();
            } else {
                break;
            }
        }
        if let Some(pos) = separator_at {
            return Err(self.error_at(Diagnostic::InvalidNumericSeparator, pos, pos + 1));
        }
        Ok(())
    }

    fn decimal_value(&self, text: &str) -> Result<TokenKind> {
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| self.error(Diagnostic::InvalidNumber))
    }

    /// `3in` and `0b12` are errors, not two tokens
    fn check_after_number(&self) -> Result<()> {
        match self.peek() {
            Some(ch) if ch.is_ascii_digit() => Err(self.error_here(Diagnostic::InvalidNumber)),
            Some(ch) if ch == '\\' || is_id_start(ch) => {
                Err(self.error_here(Diagnostic::IdentifierAfterNumber))
            }
            _ => Ok(()),
        }
    }

    /// Error at the single character under the cursor
    fn error_here(&self, diagnostic: Diagnostic) -> crate::error::ParseError {
        let end = self.pos + self.peek().map_or(0, char::len_utf8);
        self.error_at(diagnostic, self.pos, end)
    }
}
