//! Automatic semicolon insertion and the restricted productions

use super::{rejects, script, script_error};
use esparse::Diagnostic;
use serde_json::{Value, json};

fn tree(source: &str) -> Value {
    let program = script(source);
    match serde_json::to_value(&program) {
        Ok(json) => json,
        Err(err) => panic!("serialization failed: {}", err),
    }
}

fn statement_types(source: &str) -> Vec<String> {
    let json = tree(source);
    let Some(body) = json["body"].as_array() else {
        panic!("program body should be an array");
    };
    body.iter()
        .map(|statement| statement["type"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_semicolon_inserted_at_line_breaks() {
    assert_eq!(statement_types("a\nb\nc").len(), 3);
    assert_eq!(statement_types("var a = 1\nvar b = 2").len(), 2);
    assert_eq!(statement_types("{ a } b").len(), 2);
    assert_eq!(script_error("a b"), Diagnostic::MissingSemicolon);
    assert_eq!(script_error("var a = 1 var b = 2"), Diagnostic::MissingSemicolon);
}

#[test]
fn test_no_insertion_when_the_next_line_continues() {
    let json = tree("a = b\n(c)");
    assert_eq!(json["body"][0]["expression"]["right"]["type"], json!("CallExpression"));

    let json = tree("a = b\n[c]");
    assert_eq!(json["body"][0]["expression"]["right"]["type"], json!("MemberExpression"));

    let json = tree("a = b\n/c/g");
    assert_eq!(json["body"][0]["expression"]["right"]["type"], json!("BinaryExpression"));

    assert_eq!(statement_types("a\n.b\n.c()").len(), 1);
}

#[test]
fn test_restricted_productions() {
    let json = tree("function f() { return\n1 }");
    assert_eq!(json["body"][0]["body"]["body"][0]["argument"], json!(null));
    assert_eq!(json["body"][0]["body"]["body"].as_array().map(Vec::len), Some(2));

    let json = tree("a\n++b");
    assert_eq!(json["body"][1]["expression"]["type"], json!("UpdateExpression"));
    assert_eq!(json["body"][1]["expression"]["prefix"], json!(true));

    let json = tree("outer: for (;;) { break\nouter }");
    let Some(inner) = json["body"][0]["body"]["body"]["body"].as_array() else {
        panic!("loop body should be a block");
    };
    assert_eq!(inner.len(), 2);
    assert_eq!(inner.first().map(|s| s["label"].clone()), Some(json!(null)));

    assert_eq!(script_error("throw\nerror"), Diagnostic::NewlineAfterThrow);
    assert!(rejects("a\n++"));
}

#[test]
fn test_yield_stops_at_a_line_break() {
    let json = tree("function* g() { yield\nx }");
    let body = &json["body"][0]["body"]["body"];
    assert_eq!(body[0]["expression"]["type"], json!("YieldExpression"));
    assert_eq!(body[0]["expression"]["argument"], json!(null));
    assert_eq!(body[1]["expression"]["type"], json!("Identifier"));
}

#[test]
fn test_do_while_and_empty_statements() {
    assert_eq!(
        statement_types("do {} while (a) b"),
        vec!["DoWhileStatement", "ExpressionStatement"]
    );
    assert_eq!(
        statement_types("if (a);;"),
        vec!["IfStatement", "EmptyStatement"]
    );
}

#[test]
fn test_no_insertion_inside_for_heads() {
    assert!(rejects("for (a\nb) {}"));
    assert!(rejects("for (var i = 0\ni < 1\ni++) {}"));
}

#[test]
fn test_class_fields_end_at_line_breaks() {
    let json = tree("class A { a = 1\nb\n['c']\nstatic d }");
    assert_eq!(json["body"][0]["body"]["body"].as_array().map(Vec::len), Some(4));
    assert!(rejects("class A { a b }"));
}
