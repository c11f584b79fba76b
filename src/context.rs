//! Grammar context threaded through every production
//!
//! [`Context`] is a `Copy` bitmask: a production receives it by value and
//! hands a modified copy to its children, so a flag set for one subtree can
//! never leak into a sibling. Statement labels live in a separate immutable
//! chain ([`Labels`]) that borrows from the caller's stack frame.

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Context: u32 {
        /// Strict mode code
        const STRICT = 1 << 0;
        /// Module goal (implies strict, `await` reserved)
        const MODULE = 1 << 1;
        /// Inside a function body: `return` allowed
        const IN_FUNCTION = 1 << 2;
        /// `super.x` / `super[x]` allowed (methods, accessors, fields)
        const ALLOW_SUPER_PROPERTY = 1 << 3;
        /// `super()` allowed (constructor of a derived class)
        const ALLOW_SUPER_CALL = 1 << 4;
        /// `new.target` allowed (any non-arrow function, inherited by arrows)
        const ALLOW_NEW_TARGET = 1 << 5;
        /// `yield` is an operator
        const IN_GENERATOR = 1 << 6;
        /// `await` is an operator
        const IN_ASYNC = 1 << 7;
        /// Unlabelled `continue` allowed
        const IN_ITERATION = 1 << 8;
        /// Unlabelled `break` allowed (with IN_ITERATION)
        const IN_SWITCH = 1 << 9;
        /// Class static initialization block
        const IN_STATIC_BLOCK = 1 << 10;
        /// Class field initializer: `arguments` forbidden
        const IN_CLASS_FIELD = 1 << 11;
        /// Formal parameter list: `yield`/`await` expressions forbidden
        const IN_FORMAL_PARAMETERS = 1 << 12;
        /// `for (x in ...)` head: the `in` operator is not a binary operator
        const DISALLOW_IN = 1 << 13;
        /// Top level of a script or module, outside any function
        const TOP_LEVEL = 1 << 14;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::TOP_LEVEL
    }
}

impl Context {
    #[inline]
    pub fn is_strict(self) -> bool {
        self.contains(Self::STRICT)
    }

    #[inline]
    pub fn is_module(self) -> bool {
        self.contains(Self::MODULE)
    }

    #[inline]
    pub fn in_function(self) -> bool {
        self.contains(Self::IN_FUNCTION)
    }

    #[inline]
    pub fn in_generator(self) -> bool {
        self.contains(Self::IN_GENERATOR)
    }

    #[inline]
    pub fn in_async(self) -> bool {
        self.contains(Self::IN_ASYNC)
    }

    #[inline]
    pub fn in_static_block(self) -> bool {
        self.contains(Self::IN_STATIC_BLOCK)
    }

    #[inline]
    pub fn in_class_field(self) -> bool {
        self.contains(Self::IN_CLASS_FIELD)
    }

    #[inline]
    pub fn in_parameters(self) -> bool {
        self.contains(Self::IN_FORMAL_PARAMETERS)
    }

    #[inline]
    pub fn allows_in(self) -> bool {
        !self.contains(Self::DISALLOW_IN)
    }

    #[inline]
    pub fn is_top_level(self) -> bool {
        self.contains(Self::TOP_LEVEL)
    }

    /// `await` parses as an operator: async functions and the module top level
    #[inline]
    pub fn await_is_operator(self) -> bool {
        self.in_async() || (self.is_module() && self.is_top_level())
    }

    /// `await` may not be used as an identifier here
    #[inline]
    pub fn await_is_reserved(self) -> bool {
        self.is_module() || self.in_async() || self.in_static_block()
    }

    /// `yield` may not be used as an identifier here
    #[inline]
    pub fn yield_is_reserved(self) -> bool {
        self.is_strict() || self.in_generator()
    }

    #[inline]
    pub fn with(self, flag: Self, set: bool) -> Self {
        if set { self | flag } else { self - flag }
    }

    #[inline]
    pub fn with_strict(self, set: bool) -> Self {
        self.with(Self::STRICT, set)
    }

    #[inline]
    pub fn with_in(self, allow: bool) -> Self {
        self.with(Self::DISALLOW_IN, !allow)
    }

    /// Context for the body of a non-arrow function.
    ///
    /// Resets everything that does not cross a function boundary and sets up
    /// `yield`/`await`/`return` for the new function kind. Super flags are
    /// supplied by the caller (methods and constructors grant them).
    pub fn enter_function(self, is_async: bool, is_generator: bool, super_flags: Self) -> Self {
        let inherited = self & (Self::STRICT | Self::MODULE);
        let mut ctx = inherited | Self::IN_FUNCTION | Self::ALLOW_NEW_TARGET;
        ctx = ctx.with(Self::IN_ASYNC, is_async);
        ctx = ctx.with(Self::IN_GENERATOR, is_generator);
        ctx | (super_flags & (Self::ALLOW_SUPER_PROPERTY | Self::ALLOW_SUPER_CALL))
    }

    /// Context for an arrow function body.
    ///
    /// Arrows inherit `super`, `new.target` and the class-field `arguments`
    /// restriction from the enclosing code but get their own `await` and never
    /// allow `yield` as an operator.
    pub fn enter_arrow(self, is_async: bool) -> Self {
        let keep = Self::STRICT
            | Self::MODULE
            | Self::ALLOW_SUPER_PROPERTY
            | Self::ALLOW_SUPER_CALL
            | Self::ALLOW_NEW_TARGET
            | Self::IN_CLASS_FIELD;
        let ctx = (self & keep) | Self::IN_FUNCTION;
        ctx.with(Self::IN_ASYNC, is_async)
    }

    /// Context for a class field initializer or static block
    pub fn enter_class_initializer(self, static_block: bool) -> Self {
        let inherited = self & Self::MODULE;
        let mut ctx = inherited
            | Self::STRICT
            | Self::ALLOW_SUPER_PROPERTY
            | Self::ALLOW_NEW_TARGET
            | Self::IN_CLASS_FIELD;
        if static_block {
            ctx |= Self::IN_STATIC_BLOCK;
        }
        ctx
    }

    /// Context for statements nested in a loop or switch body
    pub fn enter_breakable(self, iteration: bool) -> Self {
        if iteration {
            self | Self::IN_ITERATION
        } else {
            self | Self::IN_SWITCH
        }
    }
}

/// Where a statement appears, for the rules about which declarations are
/// allowed as the body of `if`, loops and labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementPosition {
    /// A block, function body or module/script body
    List,
    If,
    Label,
    Loop,
    With,
}

impl StatementPosition {
    pub fn is_single_statement(self) -> bool {
        self != Self::List
    }
}

/// Immutable chain of labels active around a statement.
///
/// Each labelled statement pushes a link that lives on the parser's call
/// stack; inner productions see every enclosing label without any shared
/// mutable state.
#[derive(Debug, Clone, Copy)]
pub struct Labels<'a> {
    name: Option<&'a str>,
    /// The label is attached to an iteration statement (valid `continue` target)
    iteration: bool,
    /// Enclosing label; function bodies start over from [`Labels::root`]
    parent: Option<&'a Labels<'a>>,
}

impl<'a> Labels<'a> {
    /// An empty chain, used at the top level and at every function boundary
    pub const fn root() -> Labels<'static> {
        Labels {
            name: None,
            iteration: false,
            parent: None,
        }
    }

    pub fn push(&'a self, name: &'a str, iteration: bool) -> Labels<'a> {
        Labels {
            name: Some(name),
            iteration,
            parent: Some(self),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Labels<'a>> {
        std::iter::successors(Some(self), |labels| labels.parent)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|labels| labels.name == Some(name))
    }

    /// `Some(true)` if `name` labels an iteration statement, `Some(false)` if it
    /// labels anything else, `None` if no such label is active.
    pub fn is_iteration_label(&self, name: &str) -> Option<bool> {
        self.iter()
            .find(|labels| labels.name == Some(name))
            .map(|labels| labels.iteration)
    }
}
