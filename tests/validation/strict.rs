//! Strict mode: directives, implied strictness, and the rules it switches on

use super::{accepts, module_error, parse_with, script, script_error};
use esparse::{Diagnostic, ParseOptions};

#[test]
fn test_eval_binding_depends_on_strictness() {
    script("var eval; var arguments;");
    assert_eq!(
        script_error("'use strict'; var eval;"),
        Diagnostic::StrictEvalArguments("eval".into())
    );
    assert_eq!(
        script_error("'use strict'; [arguments] = a"),
        Diagnostic::StrictEvalArguments("arguments".into())
    );

    let options = ParseOptions::default().with_implied_strict(true);
    assert!(parse_with("var eval;", &options).is_err());
    assert!(parse_with("eval(x); arguments.length", &options).is_ok());
}

#[test]
fn test_function_level_directive() {
    script("function f() { 'use strict'; } var eval;");
    assert_eq!(
        script_error("function f() { 'use strict'; var arguments; }"),
        Diagnostic::StrictEvalArguments("arguments".into())
    );
    assert_eq!(
        script_error("function f() { 'use strict'; return function () { with (a) {} } }"),
        Diagnostic::StrictWith
    );
}

#[test]
fn test_directive_applies_retroactively() {
    assert_eq!(
        script_error("function f(a, a) { 'use strict' }"),
        Diagnostic::DuplicateParameter("a".into())
    );
    assert_eq!(
        script_error("function eval() { 'use strict' }"),
        Diagnostic::StrictEvalArguments("eval".into())
    );
    assert_eq!(
        script_error(r"function f() { '\07'; 'use strict'; }"),
        Diagnostic::StrictOctalEscape
    );
}

#[test]
fn test_only_a_lone_string_is_a_directive() {
    assert!(accepts("'use strict' + 1; with (a) {}"));
    assert!(accepts("('use strict'); var eval;"));
    assert!(accepts("a; 'use strict'; var eval;"));
}

#[test]
fn test_strict_reserved_words() {
    script("var public, static, implements, yield, let;");
    assert_eq!(
        script_error("'use strict'; var public;"),
        Diagnostic::StrictReservedWord("public".into())
    );
    assert_eq!(
        script_error("'use strict'; interface = 1;"),
        Diagnostic::StrictReservedWord("interface".into())
    );
    assert_eq!(
        module_error("var package;"),
        Diagnostic::StrictReservedWord("package".into())
    );
}

#[test]
fn test_legacy_literals() {
    script("010; 08; '\\07'; '\\8';");
    assert_eq!(script_error("'use strict'; 010"), Diagnostic::StrictOctalLiteral);
    assert_eq!(script_error("'use strict'; 08"), Diagnostic::StrictLeadingZero);
    assert_eq!(script_error("'use strict'; '\\07'"), Diagnostic::StrictOctalEscape);
    assert_eq!(
        script_error("'use strict'; '\\8'"),
        Diagnostic::StrictNonOctalDecimalEscape
    );
    script("'use strict'; 0; 0.5; '\\0';");
}

#[test]
fn test_delete_and_with() {
    script("delete x; with (a) b;");
    assert_eq!(script_error("'use strict'; delete x"), Diagnostic::StrictDelete);
    assert_eq!(script_error("'use strict'; with (a) b;"), Diagnostic::StrictWith);
    assert_eq!(module_error("with (a) b;"), Diagnostic::StrictWith);
    script("'use strict'; delete x.y; delete x[0];");
}

#[test]
fn test_class_bodies_are_strict() {
    assert_eq!(
        script_error("class A { m() { with (a) {} } }"),
        Diagnostic::StrictWith
    );
    assert_eq!(
        script_error("class A { m(a, a) {} }"),
        Diagnostic::DuplicateParameter("a".into())
    );
    script("class A {} with (a) {}");
}
