//! Class bodies: constructors, private names, fields, static blocks, `super`

use super::{parse_with, rejects, script, script_error};
use esparse::ast::{ClassElement, MethodKind, Statement};
use esparse::{Diagnostic, ParseOptions};

#[test]
fn test_one_plain_constructor() {
    assert_eq!(
        script_error("class A { constructor() {} 'constructor'() {} }"),
        Diagnostic::DuplicateConstructor
    );
    script("class A { constructor() {} static constructor() {} ['constructor']() {} }");
    assert_eq!(
        script_error("class A { *constructor() {} }"),
        Diagnostic::SpecialConstructor("a generator")
    );
    assert_eq!(
        script_error("class A { set constructor(v) {} }"),
        Diagnostic::SpecialConstructor("a setter")
    );
}

#[test]
fn test_constructor_is_classified() {
    let program = script("class A { constructor() {} m() {} get g() { return 1 } set s(v) {} }");
    let Some(Statement::Class(class)) = program.body.first() else {
        panic!("expected class");
    };
    let kinds: Vec<MethodKind> = class
        .body
        .body
        .iter()
        .filter_map(|element| match element {
            ClassElement::Method(method) => Some(method.kind),
            _ => None,
        })
        .collect();
    assert_eq!(
        kinds,
        vec![MethodKind::Constructor, MethodKind::Method, MethodKind::Get, MethodKind::Set]
    );
}

#[test]
fn test_field_names() {
    assert_eq!(script_error("class A { constructor }"), Diagnostic::ConstructorField);
    assert_eq!(script_error("class A { 'constructor' = 1 }"), Diagnostic::ConstructorField);
    assert_eq!(script_error("class A { static prototype }"), Diagnostic::StaticPrototype);
    script("class A { prototype = 1; static ['prototype'] = 2 }");
    assert_eq!(script_error("class A { static constructor = 3 }"), Diagnostic::ConstructorField);
}

#[test]
fn test_private_names() {
    script("class A { #a; #b() {} get #c() {} set #c(v) {} m() { return this.#a + this.#b() + this.#c } }");
    assert_eq!(
        script_error("class A { #a; #a() {} }"),
        Diagnostic::DuplicatePrivateName("a".into())
    );
    assert_eq!(
        script_error("class A { static get #a() {} set #a(v) {} }"),
        Diagnostic::DuplicatePrivateName("a".into())
    );
    assert_eq!(
        script_error("class A { get #a() {} get #a() {} }"),
        Diagnostic::DuplicatePrivateName("a".into())
    );
    assert_eq!(
        script_error("this.#a"),
        Diagnostic::UndeclaredPrivateName("a".into())
    );
    assert_eq!(
        script_error("class A { m() { class B { #b; } return this.#b } }"),
        Diagnostic::UndeclaredPrivateName("b".into())
    );
}

#[test]
fn test_private_names_resolve_through_nesting() {
    script("class A { m() { return class { n() { return this.#x } } } #x }");
    script("class A { #x; static has(o) { return #x in o } }");
    assert_eq!(
        script_error("class A { #x; m() { delete this?.#x } }"),
        Diagnostic::DeletePrivateField
    );
}

#[test]
fn test_super_placement() {
    script("class A extends B { constructor() { super(); (() => super())(); } }");
    script("class A { m() { return super.m() } static s() { super.s } x = super.x }");
    script("({ m() { return super.x } })");
    assert_eq!(
        script_error("({ m: function () { return super.x } })"),
        Diagnostic::InvalidSuperProperty
    );
    assert_eq!(
        script_error("class A extends B { m() { super() } }"),
        Diagnostic::InvalidSuperCall
    );
    assert_eq!(
        script_error("class A extends B { x = super() }"),
        Diagnostic::InvalidSuperCall
    );
    assert!(rejects("super.x"));
}

#[test]
fn test_super_property_is_not_private() {
    assert_eq!(
        script_error("class C { #x; m() { super.#x } }"),
        Diagnostic::UnexpectedToken("#x".into())
    );
    assert!(rejects("class C { #x; m() { super.#x = 1 } }"));
    script("class C { #x; m() { super.x; super['#x']; this.#x } }");
}

#[test]
fn test_field_initializers() {
    assert_eq!(script_error("class A { x = arguments }"), Diagnostic::ArgumentsInClassInit);
    assert_eq!(
        script_error("class A { x = () => arguments }"),
        Diagnostic::ArgumentsInClassInit
    );
    script("class A { x = function () { return arguments } }");
    script("class A { x = new.target; y = this }");
}

#[test]
fn test_static_blocks() {
    script("class A { static { this.x = 1; var a; let b; } static {} }");
    assert_eq!(script_error("class A { static { return } }"), Diagnostic::IllegalReturn);
    assert_eq!(script_error("class A { static { await } }"), Diagnostic::AwaitInStaticBlock);
    assert_eq!(
        script_error("class A { static { arguments } }"),
        Diagnostic::ArgumentsInClassInit
    );
    assert_eq!(
        script_error("class A { static { let a; var a; } }"),
        Diagnostic::DuplicateBinding("a".into())
    );
    assert!(rejects("class A { static { super() } }"));
}

#[test]
fn test_heritage_and_names() {
    script("class A extends (B, C) {} class D extends f() {} (class extends null {})");
    assert!(rejects("class A extends B, C {}"));
    assert_eq!(
        script_error("(class yield {})"),
        Diagnostic::StrictReservedWord("yield".into())
    );
    assert!(rejects("class {}"));
}

#[test]
fn test_decorators_need_next() {
    let source = "@dec class A { @dec.x(1) m() {} @(expr) static y = 1 }";
    assert_eq!(
        script_error(source),
        Diagnostic::StagedSyntaxDisabled("decorators")
    );
    let options = ParseOptions::default().with_next(true);
    let Ok(program) = parse_with(source, &options) else {
        panic!("decorators with next enabled");
    };
    let Some(Statement::Class(class)) = program.body.first() else {
        panic!("expected class");
    };
    assert_eq!(class.decorators.len(), 1);
    assert!(class.body.body.iter().all(|element| match element {
        ClassElement::Method(method) => method.decorators.len() == 1,
        ClassElement::Property(property) => property.decorators.len() == 1,
        ClassElement::StaticBlock(_) => false,
    }));
    assert!(parse_with("class A { @dec static {} }", &options).is_err());
}
