//! String and template literals, escape sequences

use super::{Lexer, TokenFlags, TokenKind, is_line_terminator};
use crate::error::{Diagnostic, Result};

impl<'a> Lexer<'a> {
    pub(super) fn scan_string(&mut self, quote: char) -> Result<TokenKind> {
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == quote => break,
                Some('\\') => {
                    let escape_start = self.pos - 1;
                    if self.peek().is_none() {
                        return Err(self.error(Diagnostic::UnterminatedString));
                    }
                    if let Err(diagnostic) = self.scan_escape(&mut value, false) {
                        return Err(self.error_at(diagnostic, escape_start, self.pos));
                    }
                }
                // U+2028 and U+2029 are allowed inside string literals
                Some('\n' | '\r') | None => {
                    return Err(self.error(Diagnostic::UnterminatedString));
                }
                Some(c) => value.push(c),
            }
        }

        Ok(TokenKind::String(value))
    }

    /// Scan one piece of a template literal: from just after the opening
    /// backtick (or the `}` closing a substitution) up to and including the
    /// closing backtick or `${`.
    pub(super) fn scan_template_part(&mut self) -> Result<TokenKind> {
        let content_start = self.pos;
        let mut cooked = Some(String::new());

        let (tail, content_end) = loop {
            let content_end = self.pos;
            match self.advance() {
                Some('`') => break (true, content_end),
                Some('$') if self.peek() == Some('{') => {
                    self.advance();
                    break (false, content_end);
                }
                Some('\\') => {
                    if self.peek().is_none() {
                        return Err(self.error(Diagnostic::UnterminatedTemplate));
                    }
                    let mut scratch = String::new();
                    let valid = self.scan_escape(&mut scratch, true).is_ok();
                    match (&mut cooked, valid) {
                        (Some(value), true) => value.push_str(&scratch),
                        _ => cooked = None,
                    }
                }
                Some('\r') => {
                    // CR and CRLF are both normalized to LF
                    self.match_char('\n');
                    if let Some(value) = &mut cooked {
                        value.push('\n');
                    }
                }
                Some(c) => {
                    if let Some(value) = &mut cooked {
                        value.push(c);
                    }
                }
                None => return Err(self.error(Diagnostic::UnterminatedTemplate)),
            }
        };

        let raw = self
            .source
            .get(content_start..content_end)
            .unwrap_or("")
            .replace("\r\n", "\n")
            .replace('\r', "\n");

        Ok(TokenKind::Template { cooked, raw, tail })
    }

    /// Decode the escape sequence after a backslash and append it to `value`.
    ///
    /// In strings, legacy octal and `\8`/`\9` escapes are accepted and
    /// flagged for the strict-mode check. In templates they are invalid, as
    /// are malformed `\x`/`\u` escapes; the caller decides whether an invalid
    /// template escape is an error.
    fn scan_escape(&mut self, value: &mut String, template: bool) -> std::result::Result<(), Diagnostic> {
        let Some(ch) = self.advance() else {
            return Err(Diagnostic::InvalidEscape);
        };

        match ch {
            'n' => value.push('\n'),
            'r' => value.push('\r'),
            't' => value.push('\t'),
            'b' => value.push('\u{0008}'),
            'f' => value.push('\u{000C}'),
            'v' => value.push('\u{000B}'),
            '\r' => {
                // Line continuation
                self.match_char('\n');
            }
            c if is_line_terminator(c) => {}
            '0' if !matches!(self.peek(), Some('0'..='9')) => value.push('\0'),
            '0'..='7' => {
                if template {
                    return Err(Diagnostic::InvalidTemplateEscape);
                }
                self.flags |= TokenFlags::OCTAL_ESCAPE;
                let mut code = ch.to_digit(8).unwrap_or(0);
                // \0-\3 take up to two more digits, \4-\7 one more
                let max_extra = if ch <= '3' { 2 } else { 1 };
                for _ in 0..max_extra {
                    match self.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            self.advance();
                        }
                        None => break,
                    }
                }
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            '8' | '9' => {
                if template {
                    return Err(Diagnostic::InvalidTemplateEscape);
                }
                self.flags |= TokenFlags::NON_OCTAL_DECIMAL_ESCAPE;
                value.push(ch);
            }
            'x' => {
                let code = self.scan_hex_digits(2).ok_or(Diagnostic::InvalidHexEscape)?;
                value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
            }
            'u' => {
                let code = self
                    .scan_unicode_escape_value()
                    .ok_or(Diagnostic::InvalidUnicodeEscape)?;
                self.push_code_point(value, code);
            }
            c => value.push(c),
        }
        Ok(())
    }

    /// Push a decoded `\u` escape, pairing a high surrogate with an
    /// immediately following `\u` low surrogate. Unpaired surrogates become
    /// U+FFFD since Rust strings cannot hold them.
    fn push_code_point(&mut self, value: &mut String, code: u32) {
        if (0xD800..=0xDBFF).contains(&code) {
            let checkpoint = self.pos;
            if self.rest_starts_with("\\u") {
                self.pos += 2;
                match self.scan_unicode_escape_value() {
                    Some(low @ 0xDC00..=0xDFFF) => {
                        let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                        value.push(char::from_u32(combined).unwrap_or('\u{FFFD}'));
                        return;
                    }
                    _ => self.pos = checkpoint,
                }
            }
        }
        value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
    }

    /// `XXXX` or `{X...}` after `\u`
    pub(super) fn scan_unicode_escape_value(&mut self) -> Option<u32> {
        if self.match_char('{') {
            let mut code: u32 = 0;
            let mut digits = 0;
            loop {
                match self.advance()? {
                    '}' if digits > 0 => return Some(code),
                    ch => {
                        let digit = ch.to_digit(16)?;
                        code = code.checked_mul(16)?.checked_add(digit)?;
                        if code > 0x10FFFF {
                            return None;
                        }
                        digits += 1;
                    }
                }
            }
        }
        self.scan_hex_digits(4)
    }

    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut code = 0;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            self.advance();
            code = code * 16 + digit;
        }
        Some(code)
    }
}
