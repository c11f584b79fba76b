//! Tests for the lexer
//!
//! These tests drive the scanner through its public API the way the parser
//! does: pulling tokens one at a time and rescanning `/` and `}` on request.

use esparse::ErrorCategory;
use esparse::lexer::{Lexer, Token, TokenKind};

fn tokens(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = vec![];
    loop {
        let token = match lexer.next_token() {
            Ok(token) => token,
            Err(err) => panic!("lex error in {:?}: {}", source, err),
        };
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}

fn lex(source: &str) -> Vec<TokenKind> {
    tokens(source).into_iter().map(|token| token.kind).collect()
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

#[test]
fn test_statement_tokens() {
    assert_eq!(
        lex("const total = a?.b ?? 10n;"),
        vec![
            TokenKind::Const,
            ident("total"),
            TokenKind::Eq,
            ident("a"),
            TokenKind::QuestionDot,
            ident("b"),
            TokenKind::QuestionQuestion,
            TokenKind::BigInt("10".into()),
            TokenKind::Semicolon,
        ]
    );
}

#[test]
fn test_number_literal_with_trailing_dot() {
    assert_eq!(
        lex("1..toString()"),
        vec![
            TokenKind::Number(1.0),
            TokenKind::Dot,
            ident("toString"),
            TokenKind::LParen,
            TokenKind::RParen,
        ]
    );
    assert_eq!(
        lex("1.5.toFixed"),
        vec![TokenKind::Number(1.5), TokenKind::Dot, ident("toFixed")]
    );
}

#[test]
fn test_reserved_words_and_contextual_keywords() {
    assert_eq!(
        lex("class extends super new typeof instanceof"),
        vec![
            TokenKind::Class,
            TokenKind::Extends,
            TokenKind::Super,
            TokenKind::New,
            TokenKind::Typeof,
            TokenKind::Instanceof,
        ]
    );
    assert_eq!(
        lex("static get set target meta from as"),
        vec![
            ident("static"),
            ident("get"),
            ident("set"),
            ident("target"),
            ident("meta"),
            ident("from"),
            ident("as"),
        ]
    );
    assert_eq!(TokenKind::keyword("while"), Some(TokenKind::While));
    assert_eq!(TokenKind::keyword("let"), None);
    assert_eq!(TokenKind::keyword("async"), None);
}

#[test]
fn test_keywords_are_identifier_names() {
    assert_eq!(TokenKind::Default.identifier_name(), Some("default"));
    assert_eq!(ident("foo").identifier_name(), Some("foo"));
    assert_eq!(TokenKind::Plus.identifier_name(), None);
    assert!(TokenKind::Typeof.is_keyword());
    assert!(!TokenKind::Arrow.is_keyword());
}

#[test]
fn test_unicode_identifiers() {
    assert_eq!(
        lex("π $x _y café"),
        vec![ident("π"), ident("$x"), ident("_y"), ident("café")]
    );
    let escaped = tokens(r"\u{76}ar");
    let Some(first) = escaped.first() else {
        panic!("one token expected");
    };
    assert_eq!(first.kind, ident("var"));
    assert!(first.is_escaped());
    assert!(!first.is_contextual("var"));
}

#[test]
fn test_token_spans() {
    let source = "let  answer\n= 42;";
    let spans: Vec<(usize, usize)> = tokens(source)
        .iter()
        .map(|token| (token.span.start, token.span.end))
        .collect();
    assert_eq!(spans, vec![(0, 3), (5, 11), (12, 13), (14, 16), (16, 17)]);

    let texts: Vec<&str> = tokens(source)
        .iter()
        .map(|token| token.span.slice(source))
        .collect();
    assert_eq!(texts, vec!["let", "answer", "=", "42", ";"]);
}

#[test]
fn test_spans_are_byte_offsets() {
    let spans: Vec<(usize, usize)> = tokens("'é' x")
        .iter()
        .map(|token| (token.span.start, token.span.end))
        .collect();
    assert_eq!(spans, vec![(0, 4), (5, 6)]);
}

#[test]
fn test_slash_is_division_until_rescanned() {
    assert_eq!(
        lex("a / b / c"),
        vec![ident("a"), TokenKind::Slash, ident("b"), TokenKind::Slash, ident("c")]
    );

    let mut lexer = Lexer::new("/ab+c/gi.test(s)");
    let Ok(slash) = lexer.next_token() else {
        panic!("slash expected");
    };
    assert_eq!(slash.kind, TokenKind::Slash);
    let Ok(regexp) = lexer.rescan_as_regexp(&slash) else {
        panic!("regexp expected");
    };
    assert_eq!(
        regexp.kind,
        TokenKind::RegExp {
            pattern: "ab+c".into(),
            flags: "gi".into(),
        }
    );
    assert_eq!((regexp.span.start, regexp.span.end), (0, 8));
    let Ok(dot) = lexer.next_token() else {
        panic!("dot expected");
    };
    assert_eq!(dot.kind, TokenKind::Dot);
}

#[test]
fn test_template_with_substitutions() {
    let mut lexer = Lexer::new("`a${b}c${d}e`");
    let mut parts = vec![];
    let mut token = match lexer.next_token() {
        Ok(token) => token,
        Err(err) => panic!("lex error: {}", err),
    };
    loop {
        token = match &token.kind {
            TokenKind::RBrace => match lexer.rescan_template_continuation(&token) {
                Ok(token) => token,
                Err(err) => panic!("rescan error: {}", err),
            },
            TokenKind::Eof => break,
            kind => {
                parts.push(kind.clone());
                match lexer.next_token() {
                    Ok(token) => token,
                    Err(err) => panic!("lex error: {}", err),
                }
            }
        };
    }
    let template = |text: &str, tail: bool| TokenKind::Template {
        cooked: Some(text.into()),
        raw: text.into(),
        tail,
    };
    assert_eq!(
        parts,
        vec![
            template("a", false),
            ident("b"),
            template("c", false),
            ident("d"),
            template("e", true),
        ]
    );
}

#[test]
fn test_line_terminators_before_tokens() {
    let flags: Vec<bool> = tokens("return\n1; x\r\ny")
        .iter()
        .map(|token| token.newline_before())
        .collect();
    assert_eq!(flags, vec![false, true, false, false, true]);
}

#[test]
fn test_hashbang_only_at_start() {
    assert_eq!(lex("#!/usr/bin/env node\n42"), vec![TokenKind::Number(42.0)]);
    let mut lexer = Lexer::new(" #!x");
    assert!(lexer.next_token().is_err());
}

#[test]
fn test_lexical_errors_are_categorized() {
    for source in ["'abc", "`abc", "/* open", "0x", "1__0", "3in", "\\u00"] {
        let mut lexer = Lexer::new(source);
        let err = loop {
            match lexer.next_token() {
                Ok(token) if token.kind == TokenKind::Eof => {
                    panic!("expected an error in {:?}", source)
                }
                Ok(_) => {}
                Err(err) => break err,
            }
        };
        assert_eq!(err.category(), ErrorCategory::Lexical, "source: {}", source);
    }
}
