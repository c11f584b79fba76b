//! Parameters, accessors, generators, async functions and arrows

use super::{accepts, module_error, rejects, script, script_error};
use esparse::Diagnostic;
use esparse::ast::{Expression, Statement};

#[test]
fn test_parameter_lists_that_must_be_unique() {
    script("function f(a, a) {} (function (b, b) {})");
    let duplicate = |name: &str| Diagnostic::DuplicateParameter(name.into());
    assert_eq!(script_error("'use strict'; function f(a, a) {}"), duplicate("a"));
    assert_eq!(script_error("function f(a, a = 1) {}"), duplicate("a"));
    assert_eq!(script_error("function f(a, ...a) {}"), duplicate("a"));
    assert_eq!(script_error("function* g(a, a) {}"), duplicate("a"));
    assert_eq!(script_error("async function f(a, a) {}"), duplicate("a"));
    assert_eq!(script_error("(a, a) => 1"), duplicate("a"));
    assert_eq!(script_error("class A { m(a, a) {} }"), duplicate("a"));
}

#[test]
fn test_use_strict_with_non_simple_parameters() {
    for source in [
        "function f(a = 1) { 'use strict' }",
        "function f({ a }) { 'use strict' }",
        "function f(...a) { 'use strict' }",
        "(a = 1) => { 'use strict' }",
    ] {
        assert_eq!(
            script_error(source),
            Diagnostic::UseStrictNonSimpleParameters,
            "source: {}",
            source
        );
    }
    script("function f(a, b) { 'use strict' }");
}

#[test]
fn test_accessor_arity() {
    assert_eq!(script_error("({ get a(x) {} })"), Diagnostic::GetterArity);
    assert_eq!(script_error("({ set a() {} })"), Diagnostic::SetterArity);
    assert_eq!(script_error("({ set a(x, y) {} })"), Diagnostic::SetterArity);
    assert_eq!(script_error("({ set a(...x) {} })"), Diagnostic::SetterRest);
    assert_eq!(script_error("class A { get a(x) {} }"), Diagnostic::GetterArity);
    script("({ get a() { return 1 }, set a([x, y] = []) {} })");
}

#[test]
fn test_yield_is_contextual() {
    script("var yield = 1; function yield() {} yield: ;");
    script("function* g() { yield; yield 1; yield* g(); var x = yield; }");
    assert_eq!(
        script_error("function* g() { var yield; }"),
        Diagnostic::ReservedWord("yield".into())
    );
    assert_eq!(
        script_error("'use strict'; var yield;"),
        Diagnostic::StrictReservedWord("yield".into())
    );
    assert_eq!(script_error("function* g(a = yield) {}"), Diagnostic::YieldInParameters);
    script("function* g() { function h() { var yield; } }");
}

#[test]
fn test_await_is_contextual() {
    script("var await = 1; await; function await() {}");
    script("async function f() { await 1; await await x; for await (const a of b) {} }");
    assert_eq!(
        script_error("async function f() { var await; }"),
        Diagnostic::ReservedWord("await".into())
    );
    assert_eq!(
        script_error("(async function await() {})"),
        Diagnostic::ReservedWord("await".into())
    );
    assert_eq!(
        script_error("async function f(a = await 1) {}"),
        Diagnostic::AwaitInParameters
    );
    assert_eq!(module_error("var await;"), Diagnostic::ReservedWord("await".into()));
    script("async function f() { function g() { var await; } }");
}

#[test]
fn test_new_target() {
    script("function f() { return new.target } function g() { return () => new.target }");
    assert_eq!(script_error("new.target"), Diagnostic::NewTargetOutsideFunction);
    assert_eq!(script_error("() => new.target"), Diagnostic::NewTargetOutsideFunction);
    assert!(rejects("function f() { new.foo }"));
}

#[test]
fn test_return_needs_a_function() {
    assert_eq!(script_error("return 1"), Diagnostic::IllegalReturn);
    assert_eq!(script_error("{ return }"), Diagnostic::IllegalReturn);
    script("function f() { if (a) return; return 1 } () => { return }");
}

#[test]
fn test_function_expression_names_follow_their_own_rules() {
    script("function* yield() {}");
    assert_eq!(
        script_error("(function* yield() {})"),
        Diagnostic::ReservedWord("yield".into())
    );
    assert_eq!(
        script_error("function eval() { 'use strict' }"),
        Diagnostic::StrictEvalArguments("eval".into())
    );
}

#[test]
fn test_arrow_forms() {
    let program = script("x => x; (a, b) => {}; async x => await x; async (a, ...b) => b; () => ({});");
    let arrows = program
        .body
        .iter()
        .filter(|statement| {
            matches!(statement, Statement::Expression(expr)
                if matches!(expr.expression, Expression::Arrow(_)))
        })
        .count();
    assert_eq!(arrows, 5);
    assert!(accepts("async\nfunction f() {}"));
    assert!(rejects("x\n=> x"));
    assert!(rejects("() => {} ()"));
    assert_eq!(script_error("(...a, b) => 1"), Diagnostic::RestNotLast);
}
