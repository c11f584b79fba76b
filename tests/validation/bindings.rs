//! Declared-name rules: lexical, var, function, parameter and catch bindings

use super::{module_error, rejects, script, script_error};
use esparse::Diagnostic;

fn duplicate(name: &str) -> Diagnostic {
    Diagnostic::DuplicateBinding(name.into())
}

#[test]
fn test_lexical_names_are_unique_per_scope() {
    assert_eq!(script_error("let a; let a;"), duplicate("a"));
    assert_eq!(script_error("const a = 1; let a;"), duplicate("a"));
    assert_eq!(script_error("class A {} let A;"), duplicate("A"));
    assert_eq!(script_error("let [a, a] = b;"), duplicate("a"));
    script("let a; { let a; } function f() { let a; }");
}

#[test]
fn test_var_reaches_up_to_the_function_boundary() {
    assert_eq!(script_error("let a; { { var a; } }"), duplicate("a"));
    assert_eq!(script_error("{ var a; } let a;"), duplicate("a"));
    script("let a; function f() { var a; }");
    script("var a; var a; function a() {}");
}

#[test]
fn test_switch_cases_share_a_scope() {
    assert_eq!(
        script_error("switch (x) { case 1: let a; break; case 2: let a; }"),
        duplicate("a")
    );
    script("switch (x) { case 1: { let a; } case 2: { let a; } }");
}

#[test]
fn test_block_functions() {
    script("{ function f() {} function f() {} }");
    assert_eq!(
        script_error("'use strict'; { function f() {} function f() {} }"),
        duplicate("f")
    );
    assert_eq!(script_error("{ function f() {} var f; }"), duplicate("f"));
    assert_eq!(script_error("{ function* g() {} function* g() {} }"), duplicate("g"));
    assert_eq!(script_error("{ async function f() {} function f() {} }"), duplicate("f"));
}

#[test]
fn test_module_top_level_functions_are_lexical() {
    assert_eq!(module_error("function f() {} function f() {}"), duplicate("f"));
    assert_eq!(module_error("function f() {} var f;"), duplicate("f"));
    script("function f() {} function f() {}");
}

#[test]
fn test_parameters_and_body() {
    assert_eq!(script_error("function f(a) { let a; }"), duplicate("a"));
    assert_eq!(script_error("function f(a) { const a = 1; }"), duplicate("a"));
    script("function f(a) { var a; function a() {} }");
    script("function f(a) { { let a; } }");
    assert_eq!(script_error("(a) => { let a; }"), duplicate("a"));
}

#[test]
fn test_catch_parameters() {
    script("try {} catch (e) { var e; }");
    script("try {} catch (e) { { let e; } }");
    assert_eq!(script_error("try {} catch (e) { let e; }"), duplicate("e"));
    assert_eq!(script_error("try {} catch ({e}) { var e; }"), duplicate("e"));
    assert_eq!(script_error("try {} catch ([e, e]) {}"), duplicate("e"));
}

#[test]
fn test_loop_heads_have_their_own_scope() {
    script("let i; for (let i = 0; i < 1; i++) {} for (const i of a) {}");
    assert_eq!(script_error("for (let i;;) { var i; }"), duplicate("i"));
    assert_eq!(script_error("for (const i of a) { var i; }"), duplicate("i"));
    script("for (var i;;) { var i; }");
}

#[test]
fn test_let_is_not_a_lexical_name() {
    assert_eq!(script_error("let let = 1;"), Diagnostic::LetInLexicalBinding);
    assert_eq!(script_error("const [let] = a;"), Diagnostic::LetInLexicalBinding);
    assert!(rejects("class let {}"));
    script("var let = 1; let\nfoo");
}
