//! Lexer for ECMAScript source code
//!
//! A pull-style scanner: the parser asks for one token at a time with
//! [`Lexer::next_token`]. Whether `/` starts a regular expression and where a
//! template literal continues after `}` depend on parser state, so the parser
//! re-reads those tokens through [`Lexer::rescan_as_regexp`] and
//! [`Lexer::rescan_template_continuation`].

mod numeric;
mod regexp;
mod string;
mod token;

pub use regexp::validate_regexp_flags;
pub use token::{Token, TokenFlags, TokenKind};

use crate::error::{Diagnostic, ParseError, Result};
use crate::span::Span;

/// Lexer state checkpoint for backtracking
#[derive(Debug, Clone, Copy)]
pub struct LexerCheckpoint {
    pos: usize,
    start: usize,
    saw_newline: bool,
    had_token: bool,
}

/// Lexer for tokenizing ECMAScript source code
pub struct Lexer<'a> {
    source: &'a str,
    /// Byte offset of the next unread character
    pos: usize,
    /// Start of the token being scanned
    start: usize,
    /// Tracks if a line terminator was skipped before the current token (for ASI)
    saw_newline: bool,
    /// At least one token has been produced (HTML close comments need a line start)
    had_token: bool,
    flags: TokenFlags,
    /// `<!--` and `-->` are comments (scripts with web compatibility)
    html_comments: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            start: 0,
            saw_newline: false,
            had_token: false,
            flags: TokenFlags::empty(),
            html_comments: false,
        }
    }

    /// Treat `<!--` and line-leading `-->` as single-line comments
    pub fn with_html_comments(mut self, enabled: bool) -> Self {
        self.html_comments = enabled;
        self
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Create a checkpoint of the current lexer state for backtracking
    pub fn checkpoint(&self) -> LexerCheckpoint {
        LexerCheckpoint {
            pos: self.pos,
            start: self.start,
            saw_newline: self.saw_newline,
            had_token: self.had_token,
        }
    }

    /// Restore the lexer state from a checkpoint
    pub fn restore(&mut self, checkpoint: LexerCheckpoint) {
        self.pos = checkpoint.pos;
        self.start = checkpoint.start;
        self.saw_newline = checkpoint.saw_newline;
        self.had_token = checkpoint.had_token;
    }

    /// Re-read a `/` or `/=` token as the start of a regular expression literal.
    /// Used when the parser is at a position where an expression may begin.
    pub fn rescan_as_regexp(&mut self, slash: &Token) -> Result<Token> {
        tracing::trace!(offset = slash.span.start, "rescanning slash as regexp");
        self.pos = slash.span.start;
        self.start = slash.span.start;
        let kind = self.scan_regexp()?;
        Ok(Token::new(kind, self.make_span(), slash.flags))
    }

    /// Re-read a `}` token as the continuation of a template literal
    pub fn rescan_template_continuation(&mut self, rbrace: &Token) -> Result<Token> {
        tracing::trace!(offset = rbrace.span.start, "rescanning template continuation");
        self.pos = rbrace.span.end;
        self.start = rbrace.span.start;
        let kind = self.scan_template_part()?;
        Ok(Token::new(kind, self.make_span(), rbrace.flags))
    }

    /// Get the next token from the source
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments()?;

        self.start = self.pos;
        self.flags = if self.saw_newline {
            TokenFlags::NEWLINE_BEFORE
        } else {
            TokenFlags::empty()
        };

        let Some(ch) = self.advance() else {
            return Ok(Token::new(TokenKind::Eof, Span::at(self.pos), self.flags));
        };
        self.had_token = true;

        let kind = match ch {
            // Single character tokens
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            '~' => TokenKind::Tilde,
            '@' => TokenKind::At,

            // Potentially multi-character tokens
            '.' => self.scan_dot()?,
            '+' => self.scan_plus(),
            '-' => self.scan_minus(),
            '*' => self.scan_star(),
            '/' => self.scan_slash(),
            '%' => self.scan_percent(),
            '=' => self.scan_equals(),
            '!' => self.scan_bang(),
            '<' => self.scan_less_than(),
            '>' => self.scan_greater_than(),
            '&' => self.scan_ampersand(),
            '|' => self.scan_pipe(),
            '^' => self.scan_caret(),
            '?' => self.scan_question(),
            '#' => self.scan_private_name()?,

            // String literals
            '"' | '\'' => self.scan_string(ch)?,

            // Template literals
            '`' => self.scan_template_part()?,

            // Numbers
            '0'..='9' => self.scan_number(ch)?,

            // Identifiers and keywords
            '\\' => self.scan_identifier_or_keyword(None)?,
            c if is_id_start(c) => self.scan_identifier_or_keyword(Some(c))?,

            // Invalid character
            c => return Err(self.error(Diagnostic::InvalidCharacter(c))),
        };

        Ok(Token::new(kind, self.make_span(), self.flags))
    }

    /// Check if there was a newline before the current token
    pub fn had_newline_before(&self) -> bool {
        self.saw_newline
    }

    // ============ CURSOR ============

    fn advance(&mut self) -> Option<char> {
        let ch = self.source.get(self.pos..)?.chars().next()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos..)?.chars().next()
    }

    fn peek_next(&self) -> Option<char> {
        let mut chars = self.source.get(self.pos..)?.chars();
        chars.next();
        chars.next()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn rest_starts_with(&self, text: &str) -> bool {
        self.source
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(text))
    }

    fn make_span(&self) -> Span {
        Span::new(self.start, self.pos)
    }

    /// Error spanning from the start of the current token to the cursor
    fn error(&self, diagnostic: Diagnostic) -> ParseError {
        ParseError::new(diagnostic, self.make_span(), self.source)
    }

    fn error_at(&self, diagnostic: Diagnostic, start: usize, end: usize) -> ParseError {
        ParseError::new(diagnostic, Span::new(start, end), self.source)
    }

    // ============ TRIVIA ============

    fn skip_whitespace_and_comments(&mut self) -> Result<()> {
        self.saw_newline = false;

        if self.pos == 0 && self.rest_starts_with("#!") {
            self.skip_line_comment();
        }

        while let Some(ch) = self.peek() {
            match ch {
                c if is_line_terminator(c) => {
                    self.saw_newline = true;
                    self.advance();
                }
                c if is_whitespace(c) => {
                    self.advance();
                }
                '/' => match self.peek_next() {
                    Some('/') => self.skip_line_comment(),
                    Some('*') => self.skip_block_comment()?,
                    _ => break,
                },
                '<' if self.html_comments && self.rest_starts_with("<!--") => {
                    self.skip_line_comment();
                }
                '-' if self.html_comments
                    && (self.saw_newline || !self.had_token)
                    && self.rest_starts_with("-->") =>
                {
                    self.skip_line_comment();
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Skip to (not past) the next line terminator
    fn skip_line_comment(&mut self) {
        while let Some(ch) = self.peek() {
            if is_line_terminator(ch) {
                break;
            }
            self.advance();
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        self.advance(); // /
        self.advance(); // *
        loop {
            match self.advance() {
                Some('*') if self.peek() == Some('/') => {
                    self.advance();
                    return Ok(());
                }
                Some(c) if is_line_terminator(c) => self.saw_newline = true,
                Some(_) => {}
                None => {
                    return Err(self.error_at(Diagnostic::UnterminatedComment, start, self.pos));
                }
            }
        }
    }

    // ============ PUNCTUATORS ============

    fn scan_dot(&mut self) -> Result<TokenKind> {
        if self.peek() == Some('.') && self.peek_next() == Some('.') {
            self.advance();
            self.advance();
            Ok(TokenKind::DotDotDot)
        } else if matches!(self.peek(), Some('0'..='9')) {
            // .123 style number
            self.scan_number('.')
        } else {
            Ok(TokenKind::Dot)
        }
    }

    fn scan_plus(&mut self) -> TokenKind {
        if self.match_char('+') {
            TokenKind::PlusPlus
        } else if self.match_char('=') {
            TokenKind::PlusEq
        } else {
            TokenKind::Plus
        }
    }

    fn scan_minus(&mut self) -> TokenKind {
        if self.match_char('-') {
            TokenKind::MinusMinus
        } else if self.match_char('=') {
            TokenKind::MinusEq
        } else {
            TokenKind::Minus
        }
    }

    fn scan_star(&mut self) -> TokenKind {
        if self.match_char('*') {
            if self.match_char('=') {
                TokenKind::StarStarEq
            } else {
                TokenKind::StarStar
            }
        } else if self.match_char('=') {
            TokenKind::StarEq
        } else {
            TokenKind::Star
        }
    }

    fn scan_slash(&mut self) -> TokenKind {
        if self.match_char('=') {
            TokenKind::SlashEq
        } else {
            TokenKind::Slash
        }
    }

    fn scan_percent(&mut self) -> TokenKind {
        if self.match_char('=') {
            TokenKind::PercentEq
        } else {
            TokenKind::Percent
        }
    }

    fn scan_equals(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::EqEqEq
            } else {
                TokenKind::EqEq
            }
        } else if self.match_char('>') {
            TokenKind::Arrow
        } else {
            TokenKind::Eq
        }
    }

    fn scan_bang(&mut self) -> TokenKind {
        if self.match_char('=') {
            if self.match_char('=') {
                TokenKind::BangEqEq
            } else {
                TokenKind::BangEq
            }
        } else {
            TokenKind::Bang
        }
    }

    fn scan_less_than(&mut self) -> TokenKind {
        if self.match_char('<') {
            if self.match_char('=') {
                TokenKind::LtLtEq
            } else {
                TokenKind::LtLt
            }
        } else if self.match_char('=') {
            TokenKind::LtEq
        } else {
            TokenKind::Lt
        }
    }

    fn scan_greater_than(&mut self) -> TokenKind {
        if self.match_char('>') {
            if self.match_char('>') {
                if self.match_char('=') {
                    TokenKind::GtGtGtEq
                } else {
                    TokenKind::GtGtGt
                }
            } else if self.match_char('=') {
                TokenKind::GtGtEq
            } else {
                TokenKind::GtGt
            }
        } else if self.match_char('=') {
            TokenKind::GtEq
        } else {
            TokenKind::Gt
        }
    }

    fn scan_ampersand(&mut self) -> TokenKind {
        if self.match_char('&') {
            if self.match_char('=') {
                TokenKind::AmpAmpEq
            } else {
                TokenKind::AmpAmp
            }
        } else if self.match_char('=') {
            TokenKind::AmpEq
        } else {
            TokenKind::Amp
        }
    }

    fn scan_pipe(&mut self) -> TokenKind {
        if self.match_char('|') {
            if self.match_char('=') {
                TokenKind::PipePipeEq
            } else {
                TokenKind::PipePipe
            }
        } else if self.match_char('=') {
            TokenKind::PipeEq
        } else {
            TokenKind::Pipe
        }
    }

    fn scan_caret(&mut self) -> TokenKind {
        if self.match_char('=') {
            TokenKind::CaretEq
        } else {
            TokenKind::Caret
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        if self.match_char('?') {
            if self.match_char('=') {
                TokenKind::QuestionQuestionEq
            } else {
                TokenKind::QuestionQuestion
            }
        } else if self.peek() == Some('.') && !matches!(self.peek_next(), Some('0'..='9')) {
            // `a?.5:b` is a conditional, not an optional chain
            self.advance();
            TokenKind::QuestionDot
        } else {
            TokenKind::Question
        }
    }

    // ============ IDENTIFIERS ============

    fn scan_private_name(&mut self) -> Result<TokenKind> {
        let first = match self.peek() {
            Some('\\') => {
                self.advance();
                None
            }
            Some(c) if is_id_start(c) => {
                self.advance();
                Some(c)
            }
            _ => return Err(self.error(Diagnostic::InvalidCharacter('#'))),
        };
        let name = self.scan_identifier_name(first)?;
        Ok(TokenKind::PrivateName(name))
    }

    /// `first` is the already consumed first character, or `None` when the
    /// identifier starts with a `\` escape (backslash already consumed).
    fn scan_identifier_or_keyword(&mut self, first: Option<char>) -> Result<TokenKind> {
        let name = self.scan_identifier_name(first)?;
        if self.flags.contains(TokenFlags::ESCAPED) {
            // Escaped reserved words stay identifiers; the parser rejects them
            // wherever a keyword or identifier would be required.
            return Ok(TokenKind::Identifier(name));
        }
        Ok(TokenKind::keyword(&name).unwrap_or(TokenKind::Identifier(name)))
    }

    fn scan_identifier_name(&mut self, first: Option<char>) -> Result<String> {
        let mut name = String::new();
        match first {
            Some(c) => name.push(c),
            None => {
                let escape_start = self.pos - 1;
                let c = self.scan_identifier_escape(escape_start)?;
                if !is_id_start(c) {
                    return Err(self.error_at(
                        Diagnostic::InvalidIdentifierEscape,
                        escape_start,
                        self.pos,
                    ));
                }
                name.push(c);
            }
        }

        while let Some(ch) = self.peek() {
            if ch == '\\' {
                let escape_start = self.pos;
                self.advance();
                let c = self.scan_identifier_escape(escape_start)?;
                if !is_id_continue(c) {
                    return Err(self.error_at(
                        Diagnostic::InvalidIdentifierEscape,
                        escape_start,
                        self.pos,
                    ));
                }
                name.push(c);
            } else if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        Ok(name)
    }

    /// `\uXXXX` or `\u{X...}` after the backslash
    fn scan_identifier_escape(&mut self, escape_start: usize) -> Result<char> {
        self.flags |= TokenFlags::ESCAPED;
        if !self.match_char('u') {
            return Err(self.error_at(
                Diagnostic::InvalidIdentifierEscape,
                escape_start,
                self.pos,
            ));
        }
        let code = self
            .scan_unicode_escape_value()
            .ok_or_else(|| self.error_at(Diagnostic::InvalidUnicodeEscape, escape_start, self.pos))?;
        char::from_u32(code)
            .ok_or_else(|| self.error_at(Diagnostic::InvalidIdentifierEscape, escape_start, self.pos))
    }
}

/// Check if a character can start an identifier
pub fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Check if a character can continue an identifier
pub fn is_id_continue(ch: char) -> bool {
    ch == '_'
        || ch == '$'
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

pub fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// ECMAScript WhiteSpace: tab, VT, FF, space, NBSP, BOM and the Zs category
pub fn is_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\u{000B}'
            | '\u{000C}'
            | ' '
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
    )
}
