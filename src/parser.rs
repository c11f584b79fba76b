//! Parser for ECMAScript source code
//!
//! Recursive descent for statements, precedence climbing for binary
//! operators. The grammar [`Context`] is passed by value into every
//! production; the only mutable state shared across productions is the
//! token cursor, the declared-name scopes, the private-name and export
//! trackers, and the cover-grammar bookkeeping in [`CoverState`].
//!
//! The productions are spread over submodules by area:
//!
//! - `expression`: operators, calls, members, templates, arrows
//! - `object`: object and array literals, property keys
//! - `pattern`: binding patterns and the cover-grammar conversion
//! - `function`: parameters and bodies of every function kind
//! - `class`: class declarations, expressions and elements
//! - `statement`: statements and declarations
//! - `module`: `import` and `export`

mod class;
mod expression;
mod function;
mod module;
mod object;
mod pattern;
mod statement;

use crate::ast::*;
use crate::builder::NodeBuilder;
use crate::context::{Context, Labels, StatementPosition};
use crate::error::{Diagnostic, EarlyError, ParseError, Result};
use crate::lexer::{Lexer, Token, TokenFlags, TokenKind};
use crate::options::{ParseOptions, SourceType};
use crate::scope::{BindingKind, ScopeFlags, ScopeStack};
use crate::span::Span;
use crate::validator::{ExportTracker, PrivateNames};
use crate::web_compat::{WebCompat, WebCompatRule};

/// Remaining native stack below which a nested production moves to a new segment
const STACK_RED_ZONE: usize = 256 * 1024;

/// Size of each stack segment allocated once the red zone is reached
const STACK_SEGMENT: usize = 4 * 1024 * 1024;

/// Bookkeeping for expressions that may later be reinterpreted as patterns.
///
/// `({a = 1})` is only valid if the object ends up as a destructuring
/// target, and `(a = yield) => {}` is only invalid once the `=>` shows up.
/// Productions that parse such a cover record what they saw here; whoever
/// decides what the cover was either resolves the entries or reports them.
#[derive(Debug, Default)]
struct CoverState {
    /// Errors that stand unless the enclosing expression becomes a pattern.
    /// Keyed by the span of the offending property.
    pending: Vec<(Span, Diagnostic)>,
    /// First `yield` or `await` expression seen since the cover began
    yield_await: Option<EarlyError>,
    /// Targets written as `(a)` inside a destructuring assignment; they are
    /// fine there but not in arrow parameters
    parenthesized: Vec<Span>,
    /// First `await` used as an identifier, which async arrow parameters reject
    await_identifier: Option<Span>,
}

impl CoverState {
    /// Fold the state of a finished inner cover that stayed an expression
    fn absorb(&mut self, inner: CoverState) {
        if self.yield_await.is_none() {
            self.yield_await = inner.yield_await;
        }
        if self.await_identifier.is_none() {
            self.await_identifier = inner.await_identifier;
        }
        self.parenthesized.extend(inner.parenthesized);
    }
}

/// The directive prologue of a script, module or function body
struct Prologue {
    body: Vec<Statement>,
    ctx: Context,
    /// Span of a `"use strict"` directive, if there was one
    use_strict: Option<Span>,
}

/// Parser for ECMAScript source code
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    source: &'a str,
    options: &'a ParseOptions,
    source_type: SourceType,
    builder: NodeBuilder<'a>,
    web_compat: WebCompat,
    current: Token,
    /// End offset of the last consumed token
    prev_end: usize,
    depth: u32,
    cover: CoverState,
    scopes: ScopeStack,
    private_names: PrivateNames,
    exports: ExportTracker,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, options: &'a ParseOptions, source_type: SourceType) -> Self {
        let web_compat = WebCompat::new(options, source_type);
        let module = source_type == SourceType::Module;
        let catch_redeclaration =
            web_compat.allows(WebCompatRule::CatchParameterRedeclaration, Context::default());
        Self {
            lexer: Lexer::new(source).with_html_comments(web_compat.html_comments()),
            source,
            options,
            source_type,
            builder: NodeBuilder::new(source, options),
            web_compat,
            current: Token::eof(0),
            prev_end: 0,
            depth: 0,
            cover: CoverState::default(),
            scopes: ScopeStack::new(module, catch_redeclaration),
            private_names: PrivateNames::new(),
            exports: ExportTracker::new(),
        }
    }

    /// Parse a complete script or module
    pub fn parse_program(mut self) -> Result<Program> {
        self.current = self.lexer.next_token()?;

        let module = self.source_type == SourceType::Module;
        let mut ctx = Context::default();
        if module {
            ctx |= Context::MODULE | Context::STRICT;
        }
        if self.options.implied_strict {
            ctx |= Context::STRICT;
        }

        self.scopes.enter(ScopeFlags::TOP);
        let prologue = self.parse_directives(ctx)?;
        let ctx = prologue.ctx;
        let mut body = prologue.body;
        while !self.check(&TokenKind::Eof) {
            let statement = if module {
                self.parse_module_item(ctx)?
            } else {
                self.parse_statement(ctx, &Labels::root(), StatementPosition::List)?
            };
            body.push(statement);
        }

        if module {
            let scopes = &self.scopes;
            self.exports
                .finish(|name| scopes.top_level_declares(name))
                .map_err(|err| err.into_parse_error(self.source))?;
        }
        self.scopes.exit();

        Ok(Program {
            span: self.builder.span(0, self.source.len()),
            body,
            source_type: self.source_type,
        })
    }

    /// Parse the string-literal statements at the start of a body.
    ///
    /// A `"use strict"` entry makes the rest of the body strict, and also the
    /// entries before it: a legacy octal escape in an earlier directive is an
    /// error once the directive shows up.
    fn parse_directives(&mut self, mut ctx: Context) -> Result<Prologue> {
        let mut body = Vec::new();
        let mut use_strict = None;
        let mut legacy_escape: Option<(Span, Diagnostic)> = None;

        while let TokenKind::String(_) = self.current.kind {
            let token = self.current.clone();
            let mut statement = self.parse_statement(ctx, &Labels::root(), StatementPosition::List)?;

            let Statement::Expression(expr) = &mut statement else {
                body.push(statement);
                break;
            };
            let is_directive = matches!(
                &expr.expression,
                Expression::Literal(lit) if lit.span.start == token.span.start && lit.span.end == token.span.end
            );
            if !is_directive {
                body.push(statement);
                break;
            }

            let raw = token.span.slice(self.source);
            let text = raw.get(1..raw.len().saturating_sub(1)).unwrap_or("");
            expr.directive = Some(text.to_string());

            if legacy_escape.is_none() {
                if token.flags.contains(TokenFlags::OCTAL_ESCAPE) {
                    legacy_escape = Some((token.span, Diagnostic::StrictOctalEscape));
                } else if token.flags.contains(TokenFlags::NON_OCTAL_DECIMAL_ESCAPE) {
                    legacy_escape = Some((token.span, Diagnostic::StrictNonOctalDecimalEscape));
                }
            }
            if text == "use strict" {
                if let Some((span, diagnostic)) = legacy_escape.take() {
                    return Err(self.error_at(diagnostic, span));
                }
                use_strict = Some(token.span);
                ctx = ctx.with_strict(true);
            }
            body.push(statement);
        }

        Ok(Prologue {
            body,
            ctx,
            use_strict,
        })
    }

    // ============ TOKENS ============

    /// Move to the next token, returning the one just consumed
    fn advance(&mut self) -> Result<Token> {
        let next = self.lexer.next_token()?;
        let previous = std::mem::replace(&mut self.current, next);
        self.prev_end = previous.span.end;
        Ok(previous)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.current.kind) == std::mem::discriminant(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: &TokenKind) -> Result<Token> {
        if self.check(kind) {
            return self.advance();
        }
        Err(self.expected(kind.as_str().unwrap_or("token")))
    }

    /// Current token is the unescaped identifier `name`
    fn at_contextual(&self, name: &str) -> bool {
        self.current.is_contextual(name)
    }

    fn expect_contextual(&mut self, name: &'static str) -> Result<()> {
        if !self.at_contextual(name) {
            return Err(self.expected(name));
        }
        self.advance()?;
        Ok(())
    }

    /// Whether a `get`/`set`/`static`/`async` prefix of a property is a
    /// modifier rather than the property name itself
    fn modifier_applies(&mut self, same_line: bool) -> Result<bool> {
        let next = self.peek()?;
        if same_line && next.newline_before() {
            return Ok(false);
        }
        Ok(!matches!(
            next.kind,
            TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::LParen
                | TokenKind::RBrace
                | TokenKind::Eq
                | TokenKind::Semicolon
                | TokenKind::Eof
        ))
    }

    /// Look at the token after the current one without consuming anything
    fn peek(&mut self) -> Result<Token> {
        let checkpoint = self.lexer.checkpoint();
        let next = self.lexer.next_token();
        self.lexer.restore(checkpoint);
        next
    }

    fn start(&self) -> usize {
        self.current.span.start
    }

    /// Span of a node that began at `start` and ends with the last consumed token
    fn finish(&self, start: usize) -> Span {
        self.builder.span(start, self.prev_end)
    }

    /// Automatic semicolon insertion: a `;` is optional before `}`, at the
    /// end of input and after a line break
    fn consume_semicolon(&mut self) -> Result<()> {
        if self.eat(&TokenKind::Semicolon)? {
            return Ok(());
        }
        if matches!(self.current.kind, TokenKind::RBrace | TokenKind::Eof)
            || self.current.newline_before()
        {
            return Ok(());
        }
        Err(self.error_at(Diagnostic::MissingSemicolon, self.current.span))
    }

    /// Guard against unbounded recursion. Every successful call must be
    /// paired with `leave_nested`.
    fn enter_nested(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            tracing::debug!(depth = self.depth, "nesting limit reached");
            return Err(self.error_at(Diagnostic::NestingTooDeep, self.current.span));
        }
        Ok(())
    }

    fn leave_nested(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    /// Run a recursive production one level deeper. The native stack is
    /// extended on the heap when less than [`STACK_RED_ZONE`] remains, so
    /// the depth limit is what ends runaway nesting.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.enter_nested()?;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, || parse(self));
        self.leave_nested();
        result
    }

    /// Report the first cover error recorded since `mark`, if any
    fn raise_pending(&mut self, mark: usize) -> Result<()> {
        let first = self.cover.pending.drain(mark..).next();
        match first {
            Some((span, diagnostic)) => Err(self.error_at(diagnostic, span)),
            None => Ok(()),
        }
    }

    fn resolve_pending(&mut self, span: Span) {
        self.cover
            .pending
            .retain(|(pending, _)| !(pending.start == span.start && pending.end == span.end));
    }

    fn declare_name(&mut self, ident: &Identifier, kind: BindingKind) -> Result<()> {
        self.scopes
            .declare(&ident.name, kind)
            .map_err(|diagnostic| self.error_at(diagnostic, ident.span))
    }

    // ============ ERRORS ============

    fn error_at(&self, diagnostic: Diagnostic, span: Span) -> ParseError {
        ParseError::new(diagnostic, span, self.source)
    }

    fn early(&self, error: EarlyError) -> ParseError {
        error.into_parse_error(self.source)
    }

    /// Map a validator result onto a parse error
    fn validate<T>(&self, result: std::result::Result<T, EarlyError>) -> Result<T> {
        result.map_err(|err| self.early(err))
    }

    fn expected(&self, expected: &'static str) -> ParseError {
        if self.check(&TokenKind::Eof) {
            return self.error_at(Diagnostic::UnexpectedEof, self.current.span);
        }
        self.error_at(
            Diagnostic::Expected {
                expected,
                found: self.current.kind.to_string(),
            },
            self.current.span,
        )
    }

    fn unexpected(&self) -> ParseError {
        if self.check(&TokenKind::Eof) {
            return self.error_at(Diagnostic::UnexpectedEof, self.current.span);
        }
        let text: String = self.current.span.slice(self.source).chars().take(24).collect();
        self.error_at(Diagnostic::UnexpectedToken(text), self.current.span)
    }

    /// Numeric and string literals with legacy octal syntax are only allowed
    /// in sloppy code with web compatibility on
    fn check_legacy_octal(&self, token: &Token, ctx: Context) -> Result<()> {
        if !token.has_legacy_octal() {
            return Ok(());
        }
        let (rule, diagnostic) = if token.flags.contains(TokenFlags::LEGACY_OCTAL) {
            (WebCompatRule::LegacyOctalLiteral, Diagnostic::StrictOctalLiteral)
        } else if token.flags.contains(TokenFlags::LEADING_ZERO) {
            (WebCompatRule::LegacyOctalLiteral, Diagnostic::StrictLeadingZero)
        } else if token.flags.contains(TokenFlags::OCTAL_ESCAPE) {
            (WebCompatRule::LegacyOctalEscape, Diagnostic::StrictOctalEscape)
        } else {
            (
                WebCompatRule::LegacyOctalEscape,
                Diagnostic::StrictNonOctalDecimalEscape,
            )
        };
        if self.web_compat.allows(rule, ctx) {
            Ok(())
        } else {
            Err(self.error_at(diagnostic, token.span))
        }
    }
}
