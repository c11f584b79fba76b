#![no_main]

use esparse::lexer::{Lexer, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Limit input size to avoid timeout
    if source.len() > 100_000 {
        return;
    }

    let mut lexer = Lexer::new(source).with_html_comments(true);

    // Consume all tokens, rescanning the way the parser would - should never panic
    loop {
        let token = match lexer.next_token() {
            Ok(token) => token,
            Err(_) => break,
        };
        let rescanned = match token.kind {
            TokenKind::Eof => break,
            TokenKind::Slash | TokenKind::SlashEq => lexer.rescan_as_regexp(&token),
            TokenKind::RBrace => lexer.rescan_template_continuation(&token),
            _ => Ok(token),
        };
        if let Ok(token) = rescanned {
            assert!(token.span.start <= token.span.end);
            assert!(token.span.end <= source.len());
        }
    }
});
