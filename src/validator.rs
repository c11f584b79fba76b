//! Early-error rules
//!
//! The checks here need more than the grammar: they depend on the
//! [`Context`] a name appears in, on names declared elsewhere in a class
//! body, or on the whole module. The parser calls them at fixed points (an
//! identifier is parsed, a parameter list is complete, a class body or module
//! ends) and converts the [`EarlyError`] they return into a parse error.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::Pattern;
use crate::context::Context;
use crate::error::{Diagnostic, EarlyError};
use crate::lexer::TokenKind;
use crate::span::Span;

/// Identifiers reserved only in strict mode code
pub const STRICT_RESERVED: [&str; 9] = [
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

/// How an identifier is being used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierUse {
    /// A plain reference or label
    Reference,
    /// Target of an assignment or update
    Assignment,
    /// `var`, function, parameter or catch binding
    Binding,
    /// `let`, `const`, class or import binding
    LexicalBinding,
}

impl IdentifierUse {
    fn binds(self) -> bool {
        self != IdentifierUse::Reference
    }
}

pub fn is_reserved_word(name: &str) -> bool {
    TokenKind::keyword(name).is_some()
}

pub fn is_strict_reserved_word(name: &str) -> bool {
    STRICT_RESERVED.contains(&name)
}

/// Reject `name` where the context reserves it
pub fn check_identifier(
    name: &str,
    span: Span,
    ctx: Context,
    usage: IdentifierUse,
) -> Result<(), EarlyError> {
    let fail = |diagnostic| Err(EarlyError::new(diagnostic, span));
    match name {
        "yield" if ctx.in_generator() => return fail(Diagnostic::ReservedWord(name.to_string())),
        "await" if ctx.in_static_block() => return fail(Diagnostic::AwaitInStaticBlock),
        "await" if ctx.await_is_reserved() => {
            return fail(Diagnostic::ReservedWord(name.to_string()));
        }
        "arguments" if ctx.in_class_field() => return fail(Diagnostic::ArgumentsInClassInit),
        _ => {}
    }

    if ctx.is_strict() {
        if is_strict_reserved_word(name) {
            return fail(Diagnostic::StrictReservedWord(name.to_string()));
        }
        if usage.binds() && matches!(name, "eval" | "arguments") {
            return fail(Diagnostic::StrictEvalArguments(name.to_string()));
        }
    }

    if usage == IdentifierUse::LexicalBinding && name == "let" {
        return fail(Diagnostic::LetInLexicalBinding);
    }
    Ok(())
}

/// Check every name bound by a formal parameter list.
///
/// `unique` is set for the lists that may not repeat a name: strict code,
/// arrows, methods, generators, async functions and non-simple lists.
pub fn check_parameters(params: &[Pattern], ctx: Context, unique: bool) -> Result<(), EarlyError> {
    let mut seen = FxHashSet::default();
    for param in params {
        for ident in param.bound_names() {
            check_identifier(&ident.name, ident.span, ctx, IdentifierUse::Binding)?;
            if !seen.insert(ident.name.as_str()) && unique {
                return Err(EarlyError::new(
                    Diagnostic::DuplicateParameter(ident.name.clone()),
                    ident.span,
                ));
            }
        }
    }
    Ok(())
}

pub fn is_simple_parameter_list(params: &[Pattern]) -> bool {
    params.iter().all(Pattern::is_simple)
}

// ============ PRIVATE NAMES ============

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivateKind {
    Field,
    Method,
    Getter,
    Setter,
    /// A getter and a setter sharing one name
    Accessor,
}

#[derive(Debug, Default)]
struct PrivateScope {
    declared: FxHashMap<String, (PrivateKind, bool)>,
    used: Vec<(String, Span)>,
}

/// Private names declared and referenced in the enclosing class bodies.
///
/// A reference may come before the declaration it resolves to, so uses are
/// collected and resolved when the class body closes; unresolved ones move
/// to the enclosing class, and are an error once no class is left.
#[derive(Debug, Default)]
pub struct PrivateNames {
    classes: Vec<PrivateScope>,
}

impl PrivateNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_class(&mut self) {
        self.classes.push(PrivateScope::default());
    }

    pub fn in_class(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn declare(
        &mut self,
        name: &str,
        kind: PrivateKind,
        is_static: bool,
        span: Span,
    ) -> Result<(), EarlyError> {
        let Some(class) = self.classes.last_mut() else {
            return Ok(());
        };
        let merged = match class.declared.get(name) {
            None => kind,
            Some(&(PrivateKind::Getter, was_static))
                if kind == PrivateKind::Setter && was_static == is_static =>
            {
                PrivateKind::Accessor
            }
            Some(&(PrivateKind::Setter, was_static))
                if kind == PrivateKind::Getter && was_static == is_static =>
            {
                PrivateKind::Accessor
            }
            Some(_) => {
                return Err(EarlyError::new(
                    Diagnostic::DuplicatePrivateName(name.to_string()),
                    span,
                ));
            }
        };
        class.declared.insert(name.to_string(), (merged, is_static));
        Ok(())
    }

    /// Record a `#name` reference
    pub fn reference(&mut self, name: &str, span: Span) -> Result<(), EarlyError> {
        match self.classes.last_mut() {
            Some(class) => {
                class.used.push((name.to_string(), span));
                Ok(())
            }
            None => Err(EarlyError::new(
                Diagnostic::UndeclaredPrivateName(name.to_string()),
                span,
            )),
        }
    }

    pub fn exit_class(&mut self) -> Result<(), EarlyError> {
        let Some(class) = self.classes.pop() else {
            return Ok(());
        };
        for (name, span) in class.used {
            if class.declared.contains_key(&name) {
                continue;
            }
            match self.classes.last_mut() {
                Some(parent) => parent.used.push((name, span)),
                None => {
                    return Err(EarlyError::new(Diagnostic::UndeclaredPrivateName(name), span));
                }
            }
        }
        Ok(())
    }
}

// ============ EXPORTS ============

/// Exported names of a module, plus the local bindings that `export { a }`
/// lists refer to. Locals are checked once the whole module body is known.
#[derive(Debug, Default)]
pub struct ExportTracker {
    exported: IndexSet<String>,
    locals: IndexMap<String, Span>,
}

impl ExportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export(&mut self, name: &str, span: Span) -> Result<(), EarlyError> {
        if self.exported.insert(name.to_string()) {
            Ok(())
        } else {
            Err(EarlyError::new(
                Diagnostic::DuplicateExport(name.to_string()),
                span,
            ))
        }
    }

    pub fn require_local(&mut self, name: &str, span: Span) {
        self.locals.entry(name.to_string()).or_insert(span);
    }

    pub fn exported_names(&self) -> impl Iterator<Item = &str> {
        self.exported.iter().map(String::as_str)
    }

    /// Fail on the first exported local that `declared` does not know
    pub fn finish(&self, declared: impl Fn(&str) -> bool) -> Result<(), EarlyError> {
        match self.locals.iter().find(|(name, _)| !declared(name.as_str())) {
            Some((name, span)) => Err(EarlyError::new(
                Diagnostic::UndefinedExport(name.clone()),
                *span,
            )),
            None => Ok(()),
        }
    }
}
