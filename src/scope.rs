//! Declared-name bookkeeping for the redeclaration early errors
//!
//! This is not a symbol table: a scope only remembers which names were
//! declared in it and how, which is enough to reject `let a; var a;` and
//! friends while the parse is running. Scopes are pushed and popped by the
//! parser around function bodies, blocks, catch clauses and static blocks.

use bitflags::bitflags;
use rustc_hash::FxHashSet;

use crate::error::Diagnostic;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScopeFlags: u8 {
        /// Script or module top level
        const TOP = 1 << 0;
        /// Function body (parameters are declared here too)
        const FUNCTION = 1 << 1;
        const ARROW = 1 << 2;
        /// Catch clause whose parameter is a plain identifier
        const SIMPLE_CATCH = 1 << 3;
        const STATIC_BLOCK = 1 << 4;

        /// Scopes that stop `var` hoisting
        const VAR = Self::TOP.bits() | Self::FUNCTION.bits() | Self::STATIC_BLOCK.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// `var` declarations (hoisted to the nearest var scope)
    Var,
    /// `let`, `const`, `class` and imports
    Lexical,
    /// Sloppy-mode plain function declaration
    Function,
    /// Parameter of a catch clause that is a plain identifier
    SimpleCatch,
    /// Formal parameter. Duplicates are checked separately
    Parameter,
}

#[derive(Debug)]
struct Scope {
    flags: ScopeFlags,
    var: FxHashSet<String>,
    lexical: FxHashSet<String>,
    functions: FxHashSet<String>,
    catch_param: Option<String>,
}

impl Scope {
    fn new(flags: ScopeFlags) -> Self {
        Self {
            flags,
            var: FxHashSet::default(),
            lexical: FxHashSet::default(),
            functions: FxHashSet::default(),
            catch_param: None,
        }
    }
}

#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    module: bool,
    /// `catch (e) { var e; }` is allowed
    catch_redeclaration: bool,
}

impl ScopeStack {
    pub fn new(module: bool, catch_redeclaration: bool) -> Self {
        Self {
            scopes: Vec::new(),
            module,
            catch_redeclaration,
        }
    }

    pub fn enter(&mut self, flags: ScopeFlags) {
        self.scopes.push(Scope::new(flags));
    }

    pub fn exit(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Function declarations directly in a function body (or at the top of a
    /// script) are var-scoped rather than lexical
    pub fn treats_functions_as_var(&self) -> bool {
        self.scopes
            .last()
            .is_some_and(|scope| self.functions_as_var_in(scope))
    }

    fn functions_as_var_in(&self, scope: &Scope) -> bool {
        scope.flags.contains(ScopeFlags::FUNCTION)
            || scope.flags.contains(ScopeFlags::STATIC_BLOCK)
            || (!self.module && scope.flags.contains(ScopeFlags::TOP))
    }

    /// Record a declaration, failing if it collides with an earlier one
    pub fn declare(&mut self, name: &str, kind: BindingKind) -> Result<(), Diagnostic> {
        let redeclared = match kind {
            BindingKind::Lexical => {
                let Some(scope) = self.scopes.last_mut() else {
                    return Ok(());
                };
                let clash = scope.lexical.contains(name)
                    || scope.functions.contains(name)
                    || scope.var.contains(name);
                scope.lexical.insert(name.to_string());
                clash
            }
            BindingKind::SimpleCatch => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.lexical.insert(name.to_string());
                    scope.catch_param = Some(name.to_string());
                }
                false
            }
            BindingKind::Function => {
                let as_var = self.treats_functions_as_var();
                let Some(scope) = self.scopes.last_mut() else {
                    return Ok(());
                };
                let clash = if as_var {
                    scope.lexical.contains(name)
                } else {
                    scope.lexical.contains(name) || scope.var.contains(name)
                };
                scope.functions.insert(name.to_string());
                clash
            }
            BindingKind::Parameter => {
                if let Some(scope) = self.scopes.last_mut() {
                    scope.var.insert(name.to_string());
                }
                false
            }
            BindingKind::Var => self.declare_var(name),
        };

        if redeclared {
            Err(Diagnostic::DuplicateBinding(name.to_string()))
        } else {
            Ok(())
        }
    }

    /// Walk outward to the nearest var scope, checking every lexical scope
    /// on the way
    fn declare_var(&mut self, name: &str) -> bool {
        let module = self.module;
        let catch_redeclaration = self.catch_redeclaration;
        let mut redeclared = false;
        for scope in self.scopes.iter_mut().rev() {
            let catch_param = scope.flags.contains(ScopeFlags::SIMPLE_CATCH)
                && scope.catch_param.as_deref() == Some(name);
            let lexical_clash = scope.lexical.contains(name) && !(catch_param && catch_redeclaration);
            let functions_as_var = scope.flags.contains(ScopeFlags::FUNCTION)
                || scope.flags.contains(ScopeFlags::STATIC_BLOCK)
                || (!module && scope.flags.contains(ScopeFlags::TOP));
            if lexical_clash || (!functions_as_var && scope.functions.contains(name)) {
                redeclared = true;
            }
            scope.var.insert(name.to_string());
            if scope.flags.intersects(ScopeFlags::VAR) {
                break;
            }
        }
        redeclared
    }

    /// Whether `name` is declared by any kind of binding at the top level
    pub fn top_level_declares(&self, name: &str) -> bool {
        self.scopes.first().is_some_and(|scope| {
            scope.lexical.contains(name) || scope.var.contains(name) || scope.functions.contains(name)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script() -> ScopeStack {
        let mut scopes = ScopeStack::new(false, true);
        scopes.enter(ScopeFlags::TOP);
        scopes
    }

    #[test]
    fn test_lexical_conflicts() {
        let mut scopes = script();
        assert_eq!(scopes.declare("a", BindingKind::Lexical), Ok(()));
        assert_eq!(
            scopes.declare("a", BindingKind::Lexical),
            Err(Diagnostic::DuplicateBinding("a".into()))
        );
        assert!(scopes.declare("a", BindingKind::Var).is_err());
    }

    #[test]
    fn test_var_hoists_through_blocks() {
        let mut scopes = script();
        assert_eq!(scopes.declare("x", BindingKind::Lexical), Ok(()));
        scopes.enter(ScopeFlags::empty());
        // var x in a nested block still reaches the top-level let x
        assert!(scopes.declare("x", BindingKind::Var).is_err());
        assert_eq!(scopes.declare("y", BindingKind::Var), Ok(()));
        scopes.exit();
        assert!(scopes.declare("y", BindingKind::Lexical).is_err());
    }

    #[test]
    fn test_function_boundary_stops_var() {
        let mut scopes = script();
        assert_eq!(scopes.declare("x", BindingKind::Lexical), Ok(()));
        scopes.enter(ScopeFlags::FUNCTION);
        assert_eq!(scopes.declare("x", BindingKind::Var), Ok(()));
        scopes.exit();
    }

    #[test]
    fn test_sloppy_functions() {
        let mut scopes = script();
        assert_eq!(scopes.declare("f", BindingKind::Function), Ok(()));
        assert_eq!(scopes.declare("f", BindingKind::Function), Ok(()));
        assert_eq!(scopes.declare("f", BindingKind::Var), Ok(()));

        scopes.enter(ScopeFlags::empty());
        assert_eq!(scopes.declare("g", BindingKind::Function), Ok(()));
        assert!(scopes.declare("g", BindingKind::Var).is_err());
    }

    #[test]
    fn test_simple_catch_parameter() {
        let mut scopes = script();
        scopes.enter(ScopeFlags::SIMPLE_CATCH);
        assert_eq!(scopes.declare("e", BindingKind::SimpleCatch), Ok(()));
        assert_eq!(scopes.declare("e", BindingKind::Var), Ok(()));
        assert!(scopes.declare("e", BindingKind::Lexical).is_err());
    }

    #[test]
    fn test_catch_redeclaration_can_be_disabled() {
        let mut scopes = ScopeStack::new(false, false);
        scopes.enter(ScopeFlags::TOP);
        scopes.enter(ScopeFlags::SIMPLE_CATCH);
        assert_eq!(scopes.declare("e", BindingKind::SimpleCatch), Ok(()));
        assert!(scopes.declare("e", BindingKind::Var).is_err());
    }

    #[test]
    fn test_module_top_level_functions_are_lexical() {
        let mut scopes = ScopeStack::new(true, true);
        scopes.enter(ScopeFlags::TOP);
        assert!(!scopes.treats_functions_as_var());
        assert_eq!(scopes.declare("f", BindingKind::Lexical), Ok(()));
        assert!(scopes.top_level_declares("f"));
        assert!(!scopes.top_level_declares("g"));
    }
}
