//! Expressions reinterpreted as patterns: assignment targets, arrow heads,
//! and `for-in`/`for-of` left-hand sides

use super::{accepts, rejects, script, script_error};
use esparse::Diagnostic;
use serde_json::{Value, json};

fn first_expression(source: &str) -> Value {
    let program = script(source);
    let Ok(json) = serde_json::to_value(&program) else {
        panic!("serialization failed");
    };
    json["body"][0]["expression"].clone()
}

#[test]
fn test_array_and_object_literals_become_patterns() {
    let expr = first_expression("[a, [b], ...c] = d");
    assert_eq!(expr["type"], json!("AssignmentExpression"));
    assert_eq!(expr["left"]["type"], json!("ArrayPattern"));
    assert_eq!(expr["left"]["elements"][1]["type"], json!("ArrayPattern"));
    assert_eq!(expr["left"]["elements"][2]["type"], json!("RestElement"));

    let expr = first_expression("({ a, b: c.d, e = 1, ...f } = g)");
    assert_eq!(expr["left"]["type"], json!("ObjectPattern"));
    assert_eq!(expr["left"]["properties"][1]["value"]["type"], json!("MemberExpression"));
    assert_eq!(expr["left"]["properties"][2]["value"]["type"], json!("AssignmentPattern"));
    assert_eq!(expr["left"]["properties"][3]["type"], json!("RestElement"));
}

#[test]
fn test_compound_assignment_needs_a_simple_target() {
    script("a += 1; a.b **= 2; a[b] ??= c; a ||= b; a &&= b;");
    assert_eq!(script_error("[a] += 1"), Diagnostic::InvalidAssignmentTarget);
    assert_eq!(script_error("({a} ||= 1)"), Diagnostic::InvalidAssignmentTarget);
    assert!(rejects("a?.b = 1"));
    assert!(rejects("this = 1"));
}

#[test]
fn test_shorthand_initializers_only_in_patterns() {
    script("({ a = 1 } = {}); [{ a = 1 }] = []; ({ a = 1 }) => a; for ({ a = 1 } of b);");
    assert_eq!(script_error("({ a = 1 })"), Diagnostic::CoverInitializedName);
    assert_eq!(script_error("({ a = 1 }, b)"), Diagnostic::CoverInitializedName);
    assert_eq!(script_error("[{ a = 1 }]"), Diagnostic::CoverInitializedName);
    assert!(rejects("({ a: { b = 1 } })"));
}

#[test]
fn test_arrow_heads() {
    script("([a, { b }], ...c) => a; ({ a: [b] = [] }) => b; async ({ a = 1 }) => a;");
    assert_eq!(script_error("(a.b) => 1"), Diagnostic::InvalidArrowParameters);
    assert_eq!(script_error("(1) => 1"), Diagnostic::InvalidArrowParameters);
    assert_eq!(script_error("((a)) => 1"), Diagnostic::InvalidArrowParameters);
    assert_eq!(script_error("(a, ...b, c) => 1"), Diagnostic::RestNotLast);
    assert!(rejects("(a, ...b,) => 1"));
    assert!(rejects("([a.b]) => 1"));
}

#[test]
fn test_duplicate_proto_only_matters_for_literals() {
    assert_eq!(
        script_error("({ __proto__: a, __proto__: b })"),
        Diagnostic::DuplicateProto
    );
    script("({ __proto__: a, __proto__: b } = c); ({ __proto__: a, __proto__: b }) => 1;");
    script("({ __proto__: a, ['__proto__']: b, __proto__() {} })");
}

#[test]
fn test_for_in_of_heads() {
    script("for ([a, b] of c); for ({ a } in b); for (a.b of c); for ((a) in b); for (let [a] of b);");
    assert_eq!(script_error("for (a() of b);"), Diagnostic::InvalidForInOfTarget("of"));
    assert!(rejects("for ([a + 1] of b);"));
    assert!(rejects("for (let a, b of c);"));
}

#[test]
fn test_sequence_in_for_head() {
    script("for (a, b; a < b; a++, b--);");
    script("for ([a] = c, b; ;);");
    assert!(rejects("for ({ a = 1 }, b; ;);"));
    assert!(rejects("for (a, { b = 1 }; ;);"));
    assert!(rejects("for (a, b in c);"));
}

#[test]
fn test_parenthesized_patterns_are_not_targets() {
    assert!(accepts("(a) = 1; (a.b) = 1; [(a)] = 1; [(a.b)] = 1;"));
    assert_eq!(script_error("({ a }) = 1"), Diagnostic::InvalidAssignmentTarget);
    assert!(rejects("([a]) = 1"));
    assert!(rejects("[([a])] = 1"));
}

#[test]
fn test_strict_targets() {
    assert!(accepts("eval = 1; [arguments] = a;"));
    assert_eq!(
        script_error("'use strict'; ({ a: eval } = b)"),
        Diagnostic::StrictEvalArguments("eval".into())
    );
    assert_eq!(
        script_error("'use strict'; arguments++"),
        Diagnostic::StrictEvalArguments("arguments".into())
    );
}
