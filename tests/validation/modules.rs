//! Module goal: imports, exports and the module-only early errors

use super::{module, module_error, parse_with, script_error};
use esparse::ast::Statement;
use esparse::{Diagnostic, ParseOptions};
use serde_json::json;

#[test]
fn test_exported_names_are_unique() {
    let duplicate = |name: &str| Diagnostic::DuplicateExport(name.into());
    assert_eq!(module_error("export let [a, { b }] = x; export { b };"), duplicate("b"));
    assert_eq!(
        module_error("export function f() {} export { f as default }; export default 1;"),
        duplicate("default")
    );
    assert_eq!(
        module_error("export default function () {} export default class {}"),
        duplicate("default")
    );
    assert_eq!(module_error("export * as a from 'm'; export var a;"), duplicate("a"));
    module("export * from 'm'; export * from 'n'; export { a as b } from 'm'; export { a as c } from 'm';");
}

#[test]
fn test_exported_locals_must_exist_at_top_level() {
    module("import { a } from 'm'; export { a };");
    module("export { f, C, v, w as x }; function f() {} class C {} { var v; } let w;");
    assert_eq!(
        module_error("export { inner }; { let inner; }"),
        Diagnostic::UndefinedExport("inner".into())
    );
    assert_eq!(
        module_error("export { a as default };"),
        Diagnostic::UndefinedExport("a".into())
    );
}

#[test]
fn test_string_export_names() {
    module("var a; export { a as 'a b' }; export { 'x y' as z } from 'm'; export * as 'ns' from 'm';");
    assert_eq!(
        module_error("export { 'a' as b };"),
        Diagnostic::StringExportWithoutFrom
    );
}

#[test]
fn test_imports_bind_immutable_lexical_names() {
    module("import a, * as b from 'm'; import { c, d as e } from 'n';");
    assert_eq!(
        module_error("import a from 'm'; var a;"),
        Diagnostic::DuplicateBinding("a".into())
    );
    assert_eq!(
        module_error("import { a } from 'm'; function a() {}"),
        Diagnostic::DuplicateBinding("a".into())
    );
    assert_eq!(
        module_error("import { a as b, c as b } from 'm';"),
        Diagnostic::DuplicateBinding("b".into())
    );
}

#[test]
fn test_module_items_only_at_top_level() {
    assert_eq!(
        module_error("function f() { export var a; }"),
        Diagnostic::ModuleItemOutsideModule
    );
    assert_eq!(
        module_error("if (a) import 'm';"),
        Diagnostic::ModuleItemOutsideModule
    );
    assert_eq!(script_error("export var a;"), Diagnostic::ModuleItemOutsideModule);
}

#[test]
fn test_module_code_is_strict() {
    assert_eq!(module_error("delete x;"), Diagnostic::StrictDelete);
    assert_eq!(module_error("010;"), Diagnostic::StrictOctalLiteral);
    assert_eq!(module_error("var eval;"), Diagnostic::StrictEvalArguments("eval".into()));
    assert_eq!(
        module_error("function f(a, a) {}"),
        Diagnostic::DuplicateParameter("a".into())
    );
}

#[test]
fn test_top_level_await() {
    module("await x; const y = await import('m'); for await (const a of b) {}");
    assert_eq!(
        module_error("function f() { await x; }"),
        Diagnostic::ReservedWord("await".into())
    );
}

#[test]
fn test_import_meta_and_dynamic_import() {
    module("import.meta.url; import('m').then(f);");
    assert_eq!(script_error("import.meta"), Diagnostic::ImportMetaOutsideModule);
    assert_eq!(script_error("import()"), Diagnostic::InvalidImportCall);
    let options = ParseOptions::default().with_next(true);
    assert!(parse_with("import('m', { with: { type: 'json' } })", &options).is_ok());
    assert!(parse_with("import('m', ...rest)", &options).is_err());
}

#[test]
fn test_export_tree_shape() {
    let program = module("export { a as 'b c' } from 'm';");
    let Ok(json) = serde_json::to_value(&program) else {
        panic!("serialization failed");
    };
    assert_eq!(json["body"][0]["type"], json!("ExportNamedDeclaration"));
    assert_eq!(json["body"][0]["declaration"], json!(null));
    assert_eq!(json["body"][0]["source"]["value"], json!("m"));
    let specifier = &json["body"][0]["specifiers"][0];
    assert_eq!(specifier["type"], json!("ExportSpecifier"));
    assert_eq!(specifier["local"]["name"], json!("a"));
    assert_eq!(specifier["exported"]["type"], json!("Literal"));
    assert_eq!(specifier["exported"]["value"], json!("b c"));
}

#[test]
fn test_import_attributes_with_next() {
    let options = ParseOptions::module().with_next(true);
    let Ok(program) = parse_with(
        "import data from './data.json' with { type: 'json' }; export * from 'm' with { type: 'json' };",
        &options,
    ) else {
        panic!("import attributes should parse with next");
    };
    let Some(Statement::Import(import)) = program.body.first() else {
        panic!("expected import");
    };
    assert_eq!(import.attributes.len(), 1);
    assert_eq!(
        module_error("export * from 'm' with { type: 'json' };"),
        Diagnostic::StagedSyntaxDisabled("import attributes")
    );
}
