//! Class declarations and expressions, class elements and decorators

use super::Parser;
use crate::ast::*;
use crate::context::{Context, Labels, StatementPosition};
use crate::error::{Diagnostic, Result};
use crate::lexer::TokenKind;
use crate::scope::{BindingKind, ScopeFlags};
use crate::validator::{IdentifierUse, PrivateKind};

impl<'a> Parser<'a> {
    /// `@a @b.c @d(e) @(f)` in front of a class or class element
    pub(super) fn parse_decorators(&mut self, ctx: Context) -> Result<Vec<Decorator>> {
        let mut decorators = Vec::new();
        while self.check(&TokenKind::At) {
            if !self.options.next {
                return Err(self.error_at(Diagnostic::StagedSyntaxDisabled("decorators"), self.current.span));
            }
            let start = self.start();
            self.advance()?;
            let expression = self.parse_decorator_expression(ctx)?;
            decorators.push(Decorator {
                span: self.finish(start),
                expression,
            });
        }
        Ok(decorators)
    }

    fn parse_decorator_expression(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        if self.eat(&TokenKind::LParen)? {
            let expression = self.parse_expression(ctx.with_in(true))?;
            self.expect(&TokenKind::RParen)?;
            return Ok(Expression::Parenthesized(Box::new(ParenthesizedExpression {
                span: self.finish(start),
                expression,
            })));
        }

        let ident = self.parse_identifier_reference(ctx)?;
        let mut expr = Expression::Identifier(Box::new(ident));
        while self.eat(&TokenKind::Dot)? {
            let property = self.parse_member_property()?;
            expr = self.member(start, expr, property, false, false);
        }
        if self.check(&TokenKind::LParen) {
            let arguments = self.parse_arguments(ctx)?;
            expr = self.call(start, expr, arguments, false);
        }
        Ok(expr)
    }

    /// `class` onward. Declarations must be named.
    pub(super) fn parse_class(
        &mut self,
        ctx: Context,
        start: usize,
        node_type: ClassType,
        decorators: Vec<Decorator>,
    ) -> Result<Class> {
        let name_required = node_type == ClassType::ClassDeclaration;
        self.parse_class_with_name(ctx, start, node_type, decorators, name_required)
    }

    /// Same as [`Parser::parse_class`], with the name optional for
    /// `export default class {}`
    pub(super) fn parse_class_with_name(
        &mut self,
        ctx: Context,
        start: usize,
        node_type: ClassType,
        decorators: Vec<Decorator>,
        name_required: bool,
    ) -> Result<Class> {
        self.expect(&TokenKind::Class)?;
        let class_ctx = ctx.with_strict(true);

        let id = if matches!(self.current.kind, TokenKind::Identifier(_)) {
            let id = self.parse_binding_identifier(class_ctx, IdentifierUse::LexicalBinding)?;
            if node_type == ClassType::ClassDeclaration {
                self.declare_name(&id, BindingKind::Lexical)?;
            }
            Some(id)
        } else if name_required {
            return Err(self.unexpected());
        } else {
            None
        };

        let super_class = if self.eat(&TokenKind::Extends)? {
            let mark = self.cover.pending.len();
            let heritage = self.parse_lhs(class_ctx)?;
            self.raise_pending(mark)?;
            self.check_operand(&heritage)?;
            Some(heritage)
        } else {
            None
        };

        let body = self.parse_class_body(class_ctx, super_class.is_some())?;
        Ok(Class {
            node_type,
            span: self.finish(start),
            id,
            super_class,
            body,
            decorators,
        })
    }

    /// `{ ... }`. Private names are resolved when the body closes.
    fn parse_class_body(&mut self, ctx: Context, derived: bool) -> Result<ClassBody> {
        let start = self.start();
        self.expect(&TokenKind::LBrace)?;
        self.private_names.enter_class();
        let elements = self.parse_class_elements(ctx, derived);
        let resolved = self.private_names.exit_class();
        let body = elements?;
        self.validate(resolved)?;
        Ok(ClassBody {
            span: self.finish(start),
            body,
        })
    }

    fn parse_class_elements(&mut self, ctx: Context, derived: bool) -> Result<Vec<ClassElement>> {
        let mut elements = Vec::new();
        let mut has_constructor = false;
        loop {
            if self.eat(&TokenKind::Semicolon)? {
                continue;
            }
            if self.eat(&TokenKind::RBrace)? {
                return Ok(elements);
            }
            let element = self.parse_class_element(ctx, derived)?;
            if let ClassElement::Method(method) = &element {
                if method.kind == MethodKind::Constructor {
                    if has_constructor {
                        return Err(self.error_at(Diagnostic::DuplicateConstructor, method.key.span()));
                    }
                    has_constructor = true;
                }
            }
            elements.push(element);
        }
    }

    fn parse_class_element(&mut self, ctx: Context, derived: bool) -> Result<ClassElement> {
        let start = self.start();
        let decorators = self.parse_decorators(ctx)?;

        let mut is_static = false;
        if self.at_contextual("static") && self.modifier_applies(false)? {
            self.advance()?;
            if self.check(&TokenKind::LBrace) {
                if !decorators.is_empty() {
                    return Err(self.unexpected());
                }
                return self.parse_static_block(ctx, start);
            }
            is_static = true;
        }

        let is_async = self.at_contextual("async") && self.modifier_applies(true)?;
        if is_async {
            self.advance()?;
        }
        let is_generator = self.eat(&TokenKind::Star)?;
        let mut kind = MethodKind::Method;
        if !is_async && !is_generator {
            let accessor = if self.at_contextual("get") {
                Some(MethodKind::Get)
            } else if self.at_contextual("set") {
                Some(MethodKind::Set)
            } else {
                None
            };
            if let Some(accessor) = accessor {
                if self.modifier_applies(false)? {
                    self.advance()?;
                    kind = accessor;
                }
            }
        }

        let (key, computed) = self.parse_property_key(ctx, true)?;
        let name = if computed {
            None
        } else {
            key.static_name().map(str::to_string)
        };
        let private = match &key {
            PropertyKey::PrivateName(private) => Some((private.name.clone(), private.span)),
            _ => None,
        };
        if let Some((private_name, span)) = &private {
            if private_name == "constructor" {
                return Err(self.error_at(Diagnostic::PrivateConstructor, *span));
            }
        }
        if is_static && name.as_deref() == Some("prototype") {
            return Err(self.error_at(Diagnostic::StaticPrototype, key.span()));
        }

        if is_async || is_generator || kind != MethodKind::Method || self.check(&TokenKind::LParen) {
            let is_constructor = !is_static && name.as_deref() == Some("constructor");
            if is_constructor {
                let special = match kind {
                    MethodKind::Get => Some("a getter"),
                    MethodKind::Set => Some("a setter"),
                    _ if is_generator => Some("a generator"),
                    _ if is_async => Some("an async method"),
                    _ => None,
                };
                if let Some(special) = special {
                    return Err(self.error_at(Diagnostic::SpecialConstructor(special), key.span()));
                }
                kind = MethodKind::Constructor;
            }

            if let Some((private_name, span)) = private {
                let private_kind = match kind {
                    MethodKind::Get => PrivateKind::Getter,
                    MethodKind::Set => PrivateKind::Setter,
                    _ => PrivateKind::Method,
                };
                let declared = self.private_names.declare(&private_name, private_kind, is_static, span);
                self.validate(declared)?;
            }

            let mut super_flags = Context::ALLOW_SUPER_PROPERTY;
            if is_constructor && derived {
                super_flags |= Context::ALLOW_SUPER_CALL;
            }
            let property_kind = match kind {
                MethodKind::Get => PropertyKind::Get,
                MethodKind::Set => PropertyKind::Set,
                _ => PropertyKind::Init,
            };
            let value = self.parse_method(ctx, is_async, is_generator, property_kind, super_flags)?;
            return Ok(ClassElement::Method(Box::new(MethodDefinition {
                span: self.finish(start),
                static_: is_static,
                computed,
                key,
                kind,
                value,
                decorators,
            })));
        }

        if name.as_deref() == Some("constructor") {
            return Err(self.error_at(Diagnostic::ConstructorField, key.span()));
        }
        if let Some((private_name, span)) = private {
            let declared = self
                .private_names
                .declare(&private_name, PrivateKind::Field, is_static, span);
            self.validate(declared)?;
        }

        let value = if self.eat(&TokenKind::Eq)? {
            let init_ctx = ctx.enter_class_initializer(false).with_in(true);
            Some(self.parse_assignment(init_ctx)?)
        } else {
            None
        };
        self.consume_semicolon()?;
        Ok(ClassElement::Property(Box::new(PropertyDefinition {
            span: self.finish(start),
            static_: is_static,
            computed,
            key,
            value,
            decorators,
        })))
    }

    /// `static { ... }` once `static` is consumed
    fn parse_static_block(&mut self, ctx: Context, start: usize) -> Result<ClassElement> {
        let block_ctx = ctx.enter_class_initializer(true);
        self.expect(&TokenKind::LBrace)?;
        let saved = std::mem::take(&mut self.cover);
        self.scopes.enter(ScopeFlags::STATIC_BLOCK);
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            body.push(self.parse_statement(block_ctx, &Labels::root(), StatementPosition::List)?);
        }
        self.advance()?;
        self.scopes.exit();
        self.cover = saved;
        Ok(ClassElement::StaticBlock(Box::new(StaticBlock {
            span: self.finish(start),
            body,
        })))
    }
}
