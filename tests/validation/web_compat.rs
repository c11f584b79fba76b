//! Legacy sloppy-mode productions and the switch that turns them off

use super::{parse_with, script, script_error};
use esparse::{Diagnostic, ParseOptions};

fn without_web_compat(source: &str) -> Diagnostic {
    let options = ParseOptions::default().with_web_compat(false);
    match parse_with(source, &options) {
        Ok(_) => panic!("{:?} should not parse without web compatibility", source),
        Err(err) => err.diagnostic,
    }
}

#[test]
fn test_html_comments() {
    let program = script("a <!-- comment\n--> also a comment\nb");
    assert_eq!(program.body.len(), 2);
    script("<!-- only a comment");
    let options = ParseOptions::default().with_web_compat(false);
    assert!(parse_with("<!-- comment", &options).is_err());
    assert!(parse_with("<!-- comment", &ParseOptions::module()).is_err());
}

#[test]
fn test_legacy_numeric_literals() {
    script("010; 08; 09;");
    assert_eq!(without_web_compat("010"), Diagnostic::StrictOctalLiteral);
    assert_eq!(without_web_compat("08"), Diagnostic::StrictLeadingZero);
    assert_eq!(script_error("'use strict'; 010"), Diagnostic::StrictOctalLiteral);
}

#[test]
fn test_legacy_string_escapes() {
    script(r"'\1'; '\07'; '\8'; '\9';");
    assert_eq!(without_web_compat(r"'\1'"), Diagnostic::StrictOctalEscape);
    assert_eq!(without_web_compat(r"'\8'"), Diagnostic::StrictNonOctalDecimalEscape);
    script(r"'\0'; '\0a';");
}

#[test]
fn test_function_declarations_in_statement_positions() {
    script("if (a) function f() {} else function g() {}");
    script("label: function f() {}");
    assert_eq!(
        without_web_compat("if (a) function f() {}"),
        Diagnostic::FunctionInStatementPosition
    );
    assert_eq!(
        without_web_compat("label: function f() {}"),
        Diagnostic::LabelledFunction
    );
    assert_eq!(
        script_error("'use strict'; if (a) function f() {}"),
        Diagnostic::FunctionInStatementPosition
    );
    assert_eq!(
        script_error("while (a) function f() {}"),
        Diagnostic::FunctionInStatementPosition
    );
}

#[test]
fn test_block_function_redeclaration() {
    script("{ function f() {} function f() {} }");
    assert_eq!(
        without_web_compat("{ function f() {} function f() {} }"),
        Diagnostic::DuplicateBinding("f".into())
    );
    script("switch (a) { case 1: function f() {} default: function f() {} }");
}

#[test]
fn test_catch_parameter_redeclaration() {
    script("try {} catch (e) { var e; }");
    script("'use strict'; try {} catch (e) { var e; }");
    assert_eq!(
        without_web_compat("try {} catch (e) { var e; }"),
        Diagnostic::DuplicateBinding("e".into())
    );
    assert_eq!(
        script_error("try {} catch ([e]) { var e; }"),
        Diagnostic::DuplicateBinding("e".into())
    );
}

#[test]
fn test_for_in_var_initializer() {
    script("for (var a = 1 in b);");
    assert_eq!(
        without_web_compat("for (var a = 1 in b);"),
        Diagnostic::ForInOfInitializer("in")
    );
    assert_eq!(
        script_error("for (var [a] = 1 in b);"),
        Diagnostic::ForInOfInitializer("in")
    );
    assert_eq!(
        script_error("for (let a = 1 in b);"),
        Diagnostic::ForInOfInitializer("in")
    );
    assert_eq!(
        script_error("for (var a = 1 of b);"),
        Diagnostic::ForInOfInitializer("of")
    );
}
