//! Object and array literals, property keys, shorthand names

use super::Parser;
use crate::ast::*;
use crate::context::Context;
use crate::error::{Diagnostic, Result};
use crate::lexer::{Token, TokenKind};
use crate::validator::{self, IdentifierUse};

impl<'a> Parser<'a> {
    pub(super) fn parse_array_literal(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        self.advance()?;
        let ctx = ctx.with_in(true);
        let mut elements = Vec::new();
        let mut trailing_comma = None;
        loop {
            match self.current.kind {
                TokenKind::RBracket => break,
                TokenKind::Comma => {
                    self.advance()?;
                    elements.push(None);
                    continue;
                }
                _ => {}
            }
            let element_start = self.start();
            let element = if self.eat(&TokenKind::DotDotDot)? {
                let argument = self.parse_assignment_cover(ctx)?;
                Expression::Spread(Box::new(SpreadElement {
                    span: self.finish(element_start),
                    argument,
                }))
            } else {
                self.parse_assignment_cover(ctx)?
            };
            elements.push(Some(element));
            if self.check(&TokenKind::RBracket) {
                break;
            }
            let comma = self.expect(&TokenKind::Comma)?;
            if self.check(&TokenKind::RBracket) {
                trailing_comma = Some(comma.span);
            }
        }
        self.advance()?;
        Ok(Expression::Array(Box::new(ArrayExpression {
            span: self.finish(start),
            elements,
            trailing_comma,
        })))
    }

    pub(super) fn parse_object_literal(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        self.advance()?;
        let ctx = ctx.with_in(true);
        let mut properties = Vec::new();
        let mut trailing_comma = None;
        let mut has_proto = false;

        while !self.check(&TokenKind::RBrace) {
            let member_start = self.start();
            let member = if self.eat(&TokenKind::DotDotDot)? {
                let argument = self.parse_assignment_cover(ctx)?;
                ObjectMember::Spread(Box::new(SpreadElement {
                    span: self.finish(member_start),
                    argument,
                }))
            } else {
                let property = self.parse_object_property(ctx)?;
                let proto = property.kind == PropertyKind::Init
                    && !property.computed
                    && !property.shorthand
                    && !property.method
                    && property.key.static_name() == Some("__proto__");
                if proto {
                    if has_proto {
                        self.cover.pending.push((property.span, Diagnostic::DuplicateProto));
                    }
                    has_proto = true;
                }
                ObjectMember::Property(Box::new(property))
            };
            properties.push(member);

            if !self.check(&TokenKind::RBrace) {
                let comma = self.expect(&TokenKind::Comma)?;
                if self.check(&TokenKind::RBrace) {
                    trailing_comma = Some(comma.span);
                }
            }
        }
        self.advance()?;
        Ok(Expression::Object(Box::new(ObjectExpression {
            span: self.finish(start),
            properties,
            trailing_comma,
        })))
    }

    fn parse_object_property(&mut self, ctx: Context) -> Result<Property> {
        let start = self.start();

        let is_async = self.at_contextual("async") && self.modifier_applies(true)?;
        if is_async {
            self.advance()?;
        }
        let is_generator = self.eat(&TokenKind::Star)?;
        let mut kind = PropertyKind::Init;
        if !is_async && !is_generator {
            let accessor = if self.at_contextual("get") {
                Some(PropertyKind::Get)
            } else if self.at_contextual("set") {
                Some(PropertyKind::Set)
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

        let key_token = self.current.clone();
        let (key, computed) = self.parse_property_key(ctx, false)?;

        if is_async || is_generator || kind != PropertyKind::Init || self.check(&TokenKind::LParen) {
            let value = self.parse_method(ctx, is_async, is_generator, kind, Context::ALLOW_SUPER_PROPERTY)?;
            return Ok(Property {
                span: self.finish(start),
                method: kind == PropertyKind::Init,
                shorthand: false,
                computed,
                key,
                value: Expression::Function(Box::new(value)),
                kind,
            });
        }

        if self.eat(&TokenKind::Colon)? {
            let value = self.parse_assignment_cover(ctx)?;
            return Ok(Property {
                span: self.finish(start),
                method: false,
                shorthand: false,
                computed,
                key,
                value,
                kind,
            });
        }

        let ident = self.shorthand_identifier(&key_token, computed, ctx, IdentifierUse::Reference)?;
        let value = if self.check(&TokenKind::Eq) {
            // `{a = 1}` is only valid once the object becomes a pattern
            self.validate(validator::check_identifier(
                &ident.name,
                ident.span,
                ctx,
                IdentifierUse::Assignment,
            ))?;
            self.advance()?;
            let right = self.parse_assignment(ctx)?;
            let span = self.finish(start);
            self.cover.pending.push((span, Diagnostic::CoverInitializedName));
            Expression::Assignment(Box::new(AssignmentExpression {
                span,
                operator: AssignmentOp::Assign,
                left: Pattern::Identifier(Box::new(ident)),
                right,
            }))
        } else {
            Expression::Identifier(Box::new(ident))
        };
        Ok(Property {
            span: self.finish(start),
            method: false,
            shorthand: true,
            computed: false,
            key,
            value,
            kind,
        })
    }

    /// Property name: identifier name, string, number, `[expr]` or (in
    /// classes) a private name. Returns the key and whether it is computed.
    pub(super) fn parse_property_key(&mut self, ctx: Context, allow_private: bool) -> Result<(PropertyKey, bool)> {
        let span = self.builder.restamp(self.current.span);
        match &self.current.kind {
            TokenKind::LBracket => {
                self.advance()?;
                let expr = self.parse_assignment(ctx.with_in(true))?;
                self.expect(&TokenKind::RBracket)?;
                Ok((PropertyKey::Computed(expr), true))
            }
            TokenKind::String(_) | TokenKind::Number(_) | TokenKind::BigInt(_) => {
                let literal = self.parse_literal(ctx)?;
                Ok((PropertyKey::Literal(Box::new(literal)), false))
            }
            TokenKind::PrivateName(name) if allow_private => {
                let name = name.clone();
                self.advance()?;
                Ok((
                    PropertyKey::PrivateName(Box::new(PrivateIdentifier { span, name })),
                    false,
                ))
            }
            kind => {
                let Some(name) = kind.identifier_name() else {
                    return Err(self.unexpected());
                };
                let name = name.to_string();
                self.advance()?;
                Ok((PropertyKey::Identifier(Box::new(Identifier { span, name })), false))
            }
        }
    }

    /// The binding or reference behind a shorthand property `{a}`
    pub(super) fn shorthand_identifier(
        &mut self,
        key_token: &Token,
        computed: bool,
        ctx: Context,
        usage: IdentifierUse,
    ) -> Result<Identifier> {
        if computed {
            return Err(self.unexpected());
        }
        if key_token.kind.is_keyword() {
            let name = key_token.kind.as_str().unwrap_or_default().to_string();
            return Err(self.error_at(Diagnostic::InvalidShorthandProperty(name), key_token.span));
        }
        if !matches!(key_token.kind, TokenKind::Identifier(_)) {
            return Err(self.unexpected());
        }
        self.identifier_from_token(key_token, ctx, usage)
    }

    /// Check an already-consumed identifier token for `usage`
    pub(super) fn identifier_from_token(&mut self, token: &Token, ctx: Context, usage: IdentifierUse) -> Result<Identifier> {
        let span = self.builder.restamp(token.span);
        match &token.kind {
            TokenKind::Identifier(name) => {
                if token.is_escaped() && validator::is_reserved_word(name) {
                    return Err(self.error_at(Diagnostic::EscapedKeyword, span));
                }
                if usage == IdentifierUse::Reference && name == "await" {
                    self.cover.await_identifier.get_or_insert(span);
                }
                self.validate(validator::check_identifier(name, span, ctx, usage))?;
                Ok(Identifier {
                    span,
                    name: name.clone(),
                })
            }
            kind if kind.is_keyword() => {
                let name = kind.as_str().unwrap_or_default().to_string();
                Err(self.error_at(Diagnostic::ReservedWord(name), span))
            }
            _ => {
                let text = token.span.slice(self.source).to_string();
                Err(self.error_at(Diagnostic::UnexpectedToken(text), span))
            }
        }
    }
}
