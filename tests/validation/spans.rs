//! Node spans, source locations and error positions

use super::parse_with;
use esparse::{ErrorCategory, ParseError, ParseOptions, Position, parse_script};
use serde_json::{Value, json};

fn tree(source: &str, options: &ParseOptions) -> Value {
    let program = match parse_with(source, options) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse {:?}: {}", source, err),
    };
    match serde_json::to_value(&program) {
        Ok(json) => json,
        Err(err) => panic!("serialization failed: {}", err),
    }
}

fn offsets(node: &Value) -> (Value, Value) {
    (node["start"].clone(), node["end"].clone())
}

fn failure(source: &str) -> ParseError {
    match parse_script(source, &ParseOptions::default()) {
        Ok(_) => panic!("{:?} should not parse", source),
        Err(err) => err,
    }
}

#[test]
fn test_declaration_spans() {
    let json = tree("var a = 1;", &ParseOptions::default());
    let declaration = &json["body"][0];
    assert_eq!(offsets(declaration), (json!(0), json!(10)));
    assert_eq!(offsets(&declaration["declarations"][0]), (json!(4), json!(9)));
    assert_eq!(offsets(&declaration["declarations"][0]["id"]), (json!(4), json!(5)));
    assert_eq!(offsets(&declaration["declarations"][0]["init"]), (json!(8), json!(9)));
}

#[test]
fn test_expression_spans() {
    let json = tree("(a + b) * c; async x => x; a?.b.c", &ParseOptions::default());
    let product = &json["body"][0]["expression"];
    assert_eq!(offsets(product), (json!(0), json!(11)));
    assert_eq!(product["left"]["type"], json!("ParenthesizedExpression"));
    assert_eq!(offsets(&product["left"]), (json!(0), json!(7)));
    assert_eq!(offsets(&product["left"]["expression"]), (json!(1), json!(6)));

    let arrow = &json["body"][1]["expression"];
    assert_eq!(arrow["type"], json!("ArrowFunctionExpression"));
    assert_eq!(offsets(arrow), (json!(13), json!(25)));

    let chain = &json["body"][2]["expression"];
    assert_eq!(chain["type"], json!("ChainExpression"));
    assert_eq!(offsets(chain), (json!(27), json!(33)));
}

#[test]
fn test_locations_across_line_terminators() {
    let options = ParseOptions::default().with_loc(true);
    let json = tree("a;\r\nbc;\u{2028}d", &options);
    assert_eq!(json["body"][1]["loc"]["start"], json!({ "line": 2, "column": 0 }));
    assert_eq!(json["body"][1]["loc"]["end"], json!({ "line": 2, "column": 3 }));
    assert_eq!(json["body"][2]["loc"]["start"], json!({ "line": 3, "column": 0 }));
}

#[test]
fn test_error_positions() {
    let err = failure("a b");
    assert_eq!((err.span.start, err.span.end), (2, 3));
    assert_eq!(err.location, Position { line: 1, column: 2 });

    let err = failure("let x = 1;\nlet x = 2;");
    assert_eq!(err.span.start, 15);
    assert_eq!(err.location, Position { line: 2, column: 4 });

    let err = failure("x = '日本' b");
    assert_eq!(err.span.start, 13);
    assert_eq!(err.location, Position { line: 1, column: 9 });

    let err = failure("a +");
    assert_eq!(err.location, Position { line: 1, column: 3 });
}

#[test]
fn test_error_categories() {
    assert_eq!(failure("'abc").category(), ErrorCategory::Lexical);
    assert_eq!(failure("a b").category(), ErrorCategory::Grammar);
    assert_eq!(failure("if (a) let b = 1").category(), ErrorCategory::Grammar);
    assert_eq!(failure("let a; let a;").category(), ErrorCategory::Early);
    assert_eq!(failure("break").category(), ErrorCategory::Early);
}

#[test]
fn test_rendered_errors_point_at_the_token() {
    let source = "let x = ;";
    let err = failure(source);
    let rendered = err.render(source);
    let mut lines = rendered.lines();
    assert_eq!(lines.next(), Some("SyntaxError: unexpected token ;"));
    assert!(rendered.contains("<input>:1:8"));
    assert!(rendered.contains("1 | let x = ;"));
    assert_eq!(rendered.lines().last(), Some(format!("  | {}^", " ".repeat(8)).as_str()));
}
