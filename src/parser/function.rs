//! Functions of every kind: declarations, expressions, methods and arrows

use super::Parser;
use crate::ast::*;
use crate::context::{Context, Labels, StatementPosition};
use crate::error::{Diagnostic, Result};
use crate::lexer::TokenKind;
use crate::scope::{BindingKind, ScopeFlags};
use crate::validator::{self, IdentifierUse};
use crate::web_compat::WebCompatRule;

/// Function flavor that decides parameter rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FunctionKind {
    Plain,
    Method,
}

impl<'a> Parser<'a> {
    /// `function` declaration, after any `async` prefix. The name may only
    /// be omitted under `export default`.
    pub(super) fn parse_function_declaration(
        &mut self,
        ctx: Context,
        start: usize,
        is_async: bool,
        name_required: bool,
    ) -> Result<Function> {
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star)?;

        let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
            let id = self.parse_binding_identifier(ctx, IdentifierUse::Binding)?;
            let kind = self.function_binding_kind(ctx, !is_async && !is_generator);
            self.declare_name(&id, kind)?;
            Some(id)
        } else if name_required {
            return Err(self.unexpected());
        } else {
            None
        };

        let (function, body_ctx) = self.parse_function_rest(
            ctx,
            start,
            id,
            is_async,
            is_generator,
            FunctionType::FunctionDeclaration,
            Context::empty(),
            FunctionKind::Plain,
        )?;
        if body_ctx.is_strict() && !ctx.is_strict() {
            if let Some(id) = &function.id {
                self.validate(validator::check_identifier(
                    &id.name,
                    id.span,
                    ctx.with_strict(true),
                    IdentifierUse::Binding,
                ))?;
            }
        }
        Ok(function)
    }

    /// How a function declaration's name binds in the current scope
    fn function_binding_kind(&self, ctx: Context, plain: bool) -> BindingKind {
        let sloppy_plain = plain && !ctx.is_strict();
        if self.scopes.treats_functions_as_var() {
            if sloppy_plain {
                BindingKind::Function
            } else {
                BindingKind::Var
            }
        } else if sloppy_plain && self.web_compat.allows(WebCompatRule::BlockFunctionRedeclaration, ctx) {
            BindingKind::Function
        } else {
            BindingKind::Lexical
        }
    }

    /// `function` expression, after any `async` prefix. Its name is bound
    /// inside the function itself, so it follows the function's own
    /// `yield`/`await` rules.
    pub(super) fn parse_function_expression(&mut self, ctx: Context, start: usize, is_async: bool) -> Result<Expression> {
        self.expect(&TokenKind::Function)?;
        let is_generator = self.eat(&TokenKind::Star)?;
        let own_ctx = ctx.enter_function(is_async, is_generator, Context::empty());
        let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
            Some(self.parse_binding_identifier(own_ctx, IdentifierUse::Binding)?)
        } else {
            None
        };

        let (function, body_ctx) = self.parse_function_rest(
            ctx,
            start,
            id,
            is_async,
            is_generator,
            FunctionType::FunctionExpression,
            Context::empty(),
            FunctionKind::Plain,
        )?;
        if body_ctx.is_strict() && !ctx.is_strict() {
            if let Some(id) = &function.id {
                self.validate(validator::check_identifier(
                    &id.name,
                    id.span,
                    body_ctx,
                    IdentifierUse::Binding,
                ))?;
            }
        }
        Ok(Expression::Function(Box::new(function)))
    }

    /// Object or class method starting at its parameter list. Accessors
    /// get their arity checked.
    pub(super) fn parse_method(
        &mut self,
        ctx: Context,
        is_async: bool,
        is_generator: bool,
        kind: PropertyKind,
        super_flags: Context,
    ) -> Result<Function> {
        let start = self.start();
        let (function, _) = self.parse_function_rest(
            ctx,
            start,
            None,
            is_async,
            is_generator,
            FunctionType::FunctionExpression,
            super_flags,
            FunctionKind::Method,
        )?;
        match kind {
            PropertyKind::Get if !function.params.is_empty() => {
                Err(self.error_at(Diagnostic::GetterArity, function.span))
            }
            PropertyKind::Set if function.params.len() != 1 => {
                Err(self.error_at(Diagnostic::SetterArity, function.span))
            }
            PropertyKind::Set if matches!(function.params.first(), Some(Pattern::Rest(_))) => {
                Err(self.error_at(Diagnostic::SetterRest, function.span))
            }
            _ => Ok(function),
        }
    }

    /// Parameters and body. Returns the function and the context its body
    /// was parsed in.
    #[allow(clippy::too_many_arguments)]
    fn parse_function_rest(
        &mut self,
        ctx: Context,
        start: usize,
        id: Option<Identifier>,
        is_async: bool,
        is_generator: bool,
        node_type: FunctionType,
        super_flags: Context,
        kind: FunctionKind,
    ) -> Result<(Function, Context)> {
        let fn_ctx = ctx.enter_function(is_async, is_generator, super_flags);
        let saved = std::mem::take(&mut self.cover);
        self.scopes.enter(ScopeFlags::FUNCTION);

        let params = self.parse_formal_parameters(fn_ctx)?;
        self.declare_parameters(&params)?;
        let (body, body_ctx) = self.parse_function_body(fn_ctx, &params)?;

        self.scopes.exit();
        self.cover = saved;

        let unique = body_ctx.is_strict()
            || kind == FunctionKind::Method
            || is_async
            || is_generator
            || !validator::is_simple_parameter_list(&params);
        self.validate(validator::check_parameters(&params, body_ctx, unique))?;

        let function = Function {
            node_type,
            span: self.finish(start),
            id,
            expression: false,
            generator: is_generator,
            async_: is_async,
            params,
            body,
        };
        Ok((function, body_ctx))
    }

    /// `( a, b = 1, [c], ...d )`
    fn parse_formal_parameters(&mut self, fn_ctx: Context) -> Result<Vec<Pattern>> {
        let ctx = fn_ctx | Context::IN_FORMAL_PARAMETERS;
        self.expect(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::DotDotDot) {
                let start = self.start();
                self.advance()?;
                let argument = self.parse_binding_target(ctx, IdentifierUse::Binding)?;
                if self.check(&TokenKind::Eq) {
                    return Err(self.error_at(Diagnostic::RestWithInitializer, self.current.span));
                }
                params.push(Pattern::Rest(Box::new(RestElement {
                    span: self.finish(start),
                    argument,
                })));
                if self.check(&TokenKind::Comma) {
                    return Err(self.error_at(Diagnostic::RestNotLast, self.current.span));
                }
                break;
            }
            params.push(self.parse_binding_element(ctx, IdentifierUse::Binding)?);
            if !self.check(&TokenKind::RParen) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RParen)?;
        Ok(params)
    }

    fn declare_parameters(&mut self, params: &[Pattern]) -> Result<()> {
        for param in params {
            for ident in param.bound_names() {
                self.declare_name(ident, BindingKind::Parameter)?;
            }
        }
        Ok(())
    }

    /// `{ ... }` of a function. A `"use strict"` directive applies to the
    /// whole function, parameters included, and needs a simple parameter list.
    fn parse_function_body(&mut self, ctx: Context, params: &[Pattern]) -> Result<(BlockStatement, Context)> {
        let start = self.start();
        self.expect(&TokenKind::LBrace)?;
        let prologue = self.parse_directives(ctx)?;
        if let Some(span) = prologue.use_strict {
            if !validator::is_simple_parameter_list(params) {
                return Err(self.error_at(Diagnostic::UseStrictNonSimpleParameters, span));
            }
        }
        let body_ctx = prologue.ctx;
        let mut body = prologue.body;
        while !self.check(&TokenKind::RBrace) {
            body.push(self.parse_statement(body_ctx, &Labels::root(), StatementPosition::List)?);
        }
        self.advance()?;
        Ok((
            BlockStatement {
                span: self.finish(start),
                body,
            },
            body_ctx,
        ))
    }

    /// Body of an arrow whose parameters (and `=>`) are already consumed
    pub(super) fn parse_arrow_body(
        &mut self,
        ctx: Context,
        start: usize,
        params: Vec<Pattern>,
        is_async: bool,
    ) -> Result<Expression> {
        let arrow_ctx = ctx.enter_arrow(is_async);
        let saved = std::mem::take(&mut self.cover);
        self.scopes.enter(ScopeFlags::FUNCTION | ScopeFlags::ARROW);
        self.declare_parameters(&params)?;

        let (body, expression, body_ctx) = if self.check(&TokenKind::LBrace) {
            let (block, body_ctx) = self.parse_function_body(arrow_ctx, &params)?;
            (ArrowBody::Block(Box::new(block)), false, body_ctx)
        } else {
            let expr = self.parse_assignment(arrow_ctx.with_in(ctx.allows_in()))?;
            (ArrowBody::Expression(expr), true, arrow_ctx)
        };

        self.scopes.exit();
        self.cover = saved;
        self.validate(validator::check_parameters(&params, body_ctx, true))?;

        Ok(Expression::Arrow(Box::new(ArrowFunctionExpression {
            span: self.finish(start),
            id: None,
            expression,
            generator: false,
            async_: is_async,
            params,
            body,
        })))
    }
}
