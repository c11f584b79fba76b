//! Regular expression literals.
//!
//! The body is only delimited here (escapes, classes, line terminators);
//! its pattern syntax is left to the regular expression engine. Flags are
//! checked.

use super::{Lexer, TokenKind, is_id_continue, is_line_terminator};
use crate::error::{Diagnostic, Result};

impl<'a> Lexer<'a> {
    /// Scan a regular expression literal. The cursor sits on the opening `/`.
    pub(super) fn scan_regexp(&mut self) -> Result<TokenKind> {
        self.advance(); // /

        let body_start = self.pos;
        let mut in_class = false;
        let body_end = loop {
            let here = self.pos;
            match self.advance() {
                Some('/') if !in_class => break here,
                Some('[') => in_class = true,
                Some(']') => in_class = false,
                Some('\\') => match self.advance() {
                    Some(c) if !is_line_terminator(c) => {}
                    _ => return Err(self.error(Diagnostic::UnterminatedRegExp)),
                },
                Some(c) if is_line_terminator(c) => {
                    return Err(self.error(Diagnostic::UnterminatedRegExp));
                }
                Some(_) => {}
                None => return Err(self.error(Diagnostic::UnterminatedRegExp)),
            }
        };
        let pattern = self
            .source
            .get(body_start..body_end)
            .unwrap_or("")
            .to_string();

        let flags_start = self.pos;
        while let Some(ch) = self.peek() {
            if ch == '\\' {
                return Err(self.error_at(
                    Diagnostic::InvalidRegExpFlag('\\'),
                    self.pos,
                    self.pos + 1,
                ));
            }
            if !is_id_continue(ch) {
                break;
            }
            self.advance();
        }
        let flags = self
            .source
            .get(flags_start..self.pos)
            .unwrap_or("")
            .to_string();
        if let Err(diagnostic) = validate_regexp_flags(&flags) {
            return Err(self.error_at(diagnostic, flags_start, self.pos));
        }

        Ok(TokenKind::RegExp { pattern, flags })
    }
}

/// Only `dgimsuyv`, each at most once, and never both `u` and `v`
pub fn validate_regexp_flags(flags: &str) -> std::result::Result<(), Diagnostic> {
    let mut seen = [false; 8];
    for ch in flags.chars() {
        let slot = match "dgimsuyv".find(ch) {
            Some(slot) => slot,
            None => return Err(Diagnostic::InvalidRegExpFlag(ch)),
        };
        match seen.get_mut(slot) {
            Some(true) => return Err(Diagnostic::DuplicateRegExpFlag(ch)),
            Some(flag) => *flag = true,
            None => return Err(Diagnostic::InvalidRegExpFlag(ch)),
        }
    }
    if flags.contains('u') && flags.contains('v') {
        return Err(Diagnostic::IncompatibleRegExpFlags);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::{Lexer, TokenKind};
    use super::validate_regexp_flags;
    use crate::error::Diagnostic;

    fn regexp(source: &str) -> Result<TokenKind, Diagnostic> {
        let mut lexer = Lexer::new(source);
        let slash = match lexer.next_token() {
            Ok(token) => token,
            Err(err) => return Err(err.diagnostic),
        };
        lexer
            .rescan_as_regexp(&slash)
            .map(|token| token.kind)
            .map_err(|err| err.diagnostic)
    }

    #[test]
    fn test_regexp_body() {
        assert_eq!(
            regexp(r"/[/]\//gi"),
            Ok(TokenKind::RegExp {
                pattern: r"[/]\/".into(),
                flags: "gi".into(),
            })
        );
        assert_eq!(
            regexp("/=/"),
            Ok(TokenKind::RegExp {
                pattern: "=".into(),
                flags: String::new(),
            })
        );
    }

    #[test]
    fn test_unterminated_regexp() {
        assert_eq!(regexp("/abc"), Err(Diagnostic::UnterminatedRegExp));
        assert_eq!(regexp("/a\nb/"), Err(Diagnostic::UnterminatedRegExp));
        assert_eq!(regexp("/a\\\n/"), Err(Diagnostic::UnterminatedRegExp));
    }

    #[test]
    fn test_flags() {
        assert_eq!(validate_regexp_flags("dgimsuy"), Ok(()));
        assert_eq!(validate_regexp_flags("gv"), Ok(()));
        assert_eq!(validate_regexp_flags("gg"), Err(Diagnostic::DuplicateRegExpFlag('g')));
        assert_eq!(validate_regexp_flags("x"), Err(Diagnostic::InvalidRegExpFlag('x')));
        assert_eq!(validate_regexp_flags("uv"), Err(Diagnostic::IncompatibleRegExpFlags));
        assert_eq!(regexp("/a/gx"), Err(Diagnostic::InvalidRegExpFlag('x')));
    }
}
