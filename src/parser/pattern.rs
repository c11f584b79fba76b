//! Binding patterns, and reinterpretation of already-parsed expressions as
//! assignment targets or arrow parameters

use super::Parser;
use crate::ast::*;
use crate::context::Context;
use crate::error::{Diagnostic, EarlyError, Result};
use crate::lexer::TokenKind;
use crate::span::Span;
use crate::validator::{self, IdentifierUse};

/// What a cover expression is being turned into
#[derive(Debug, Clone, Copy)]
enum Target<'p> {
    /// Left side of `=` or of a for-in/of head
    Assignment,
    /// Arrow parameters. Carries the spans of targets that were written in
    /// parentheses, which are fine in assignments but not in bindings.
    Binding(&'p [Span]),
}

fn same_range(a: Span, b: Span) -> bool {
    a.start == b.start && a.end == b.end
}

impl<'a> Parser<'a> {
    // ============ BINDING PATTERNS ============

    /// Identifier, `[...]` or `{...}` in a declaration or parameter list
    pub(super) fn parse_binding_target(&mut self, ctx: Context, usage: IdentifierUse) -> Result<Pattern> {
        match self.current.kind {
            TokenKind::LBracket | TokenKind::LBrace => {
                self.nested(|parser| {
                    if parser.check(&TokenKind::LBracket) {
                        parser.parse_array_binding(ctx, usage)
                    } else {
                        parser.parse_object_binding(ctx, usage)
                    }
                })
            }
            _ => Ok(Pattern::Identifier(Box::new(
                self.parse_binding_identifier(ctx, usage)?,
            ))),
        }
    }

    /// Binding target with an optional `= default`
    pub(super) fn parse_binding_element(&mut self, ctx: Context, usage: IdentifierUse) -> Result<Pattern> {
        let start = self.start();
        let target = self.parse_binding_target(ctx, usage)?;
        if !self.eat(&TokenKind::Eq)? {
            return Ok(target);
        }
        let right = self.parse_assignment(ctx.with_in(true))?;
        Ok(Pattern::Assignment(Box::new(AssignmentPattern {
            span: self.finish(start),
            left: target,
            right,
        })))
    }

    /// `...target` as the last element of a binding list; the caller is
    /// positioned on `...`
    fn parse_binding_rest(&mut self, ctx: Context, usage: IdentifierUse, close: &TokenKind) -> Result<Pattern> {
        let start = self.start();
        self.advance()?;
        let argument = self.parse_binding_target(ctx, usage)?;
        if self.check(&TokenKind::Eq) {
            return Err(self.error_at(Diagnostic::RestWithInitializer, self.current.span));
        }
        if self.check(&TokenKind::Comma) {
            return Err(self.error_at(Diagnostic::RestNotLast, self.current.span));
        }
        if !self.check(close) {
            return Err(self.unexpected());
        }
        Ok(Pattern::Rest(Box::new(RestElement {
            span: self.finish(start),
            argument,
        })))
    }

    fn parse_array_binding(&mut self, ctx: Context, usage: IdentifierUse) -> Result<Pattern> {
        let start = self.start();
        self.advance()?;
        let mut elements = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::RBracket => break,
                TokenKind::Comma => {
                    self.advance()?;
                    elements.push(None);
                    continue;
                }
                TokenKind::DotDotDot => {
                    elements.push(Some(self.parse_binding_rest(ctx, usage, &TokenKind::RBracket)?));
                    break;
                }
                _ => {}
            }
            elements.push(Some(self.parse_binding_element(ctx, usage)?));
            if !self.check(&TokenKind::RBracket) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBracket)?;
        Ok(Pattern::Array(Box::new(ArrayPattern {
            span: self.finish(start),
            elements,
        })))
    }

    fn parse_object_binding(&mut self, ctx: Context, usage: IdentifierUse) -> Result<Pattern> {
        let start = self.start();
        self.advance()?;
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.check(&TokenKind::DotDotDot) {
                if !matches!(self.peek()?.kind, TokenKind::Identifier(_)) {
                    let span = self.current.span;
                    return Err(self.error_at(Diagnostic::InvalidObjectRest, span));
                }
                let Pattern::Rest(rest) = self.parse_binding_rest(ctx, usage, &TokenKind::RBrace)? else {
                    return Err(self.unexpected());
                };
                properties.push(ObjectPatternMember::Rest(rest));
                break;
            }

            let property_start = self.start();
            let key_token = self.current.clone();
            let (key, computed) = self.parse_property_key(ctx, false)?;
            let (value, shorthand) = if self.eat(&TokenKind::Colon)? {
                (self.parse_binding_element(ctx, usage)?, false)
            } else {
                let ident = self.shorthand_identifier(&key_token, computed, ctx, usage)?;
                let mut value = Pattern::Identifier(Box::new(ident));
                if self.eat(&TokenKind::Eq)? {
                    let right = self.parse_assignment(ctx.with_in(true))?;
                    value = Pattern::Assignment(Box::new(AssignmentPattern {
                        span: self.finish(property_start),
                        left: value,
                        right,
                    }));
                }
                (value, true)
            };
            properties.push(ObjectPatternMember::Property(Box::new(AssignmentProperty {
                span: self.finish(property_start),
                method: false,
                shorthand,
                computed,
                key,
                value,
                kind: PropertyKind::Init,
            })));
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.expect(&TokenKind::RBrace)?;
        Ok(Pattern::Object(Box::new(ObjectPattern {
            span: self.finish(start),
            properties,
        })))
    }

    // ============ COVER CONVERSION ============

    /// Reinterpret the left side of `=`
    pub(super) fn assignment_target(&mut self, expr: Expression, ctx: Context) -> Result<Pattern> {
        let pattern = self.to_pattern(expr, ctx, Target::Assignment, true);
        self.validate(pattern)
    }

    /// Reinterpret the expression before `in`/`of` in a for head
    pub(super) fn for_target(&mut self, expr: Expression, ctx: Context, kind: &'static str) -> Result<Pattern> {
        match self.to_pattern(expr, ctx, Target::Assignment, true) {
            Ok(pattern) => Ok(pattern),
            Err(err) if err.diagnostic == Diagnostic::InvalidAssignmentTarget => {
                Err(self.error_at(Diagnostic::InvalidForInOfTarget(kind), err.span))
            }
            Err(err) => Err(self.early(err)),
        }
    }

    /// Target of a compound assignment: only identifiers and member
    /// expressions, possibly parenthesized
    pub(super) fn simple_assignment_target(&mut self, expr: Expression, ctx: Context) -> Result<Pattern> {
        match expr {
            Expression::Identifier(ident) => {
                self.validate(validator::check_identifier(
                    &ident.name,
                    ident.span,
                    ctx,
                    IdentifierUse::Assignment,
                ))?;
                Ok(Pattern::Identifier(ident))
            }
            Expression::Member(member) => Ok(Pattern::Member(member)),
            Expression::Parenthesized(paren)
                if matches!(
                    paren.expression.unparenthesized(),
                    Expression::Identifier(_) | Expression::Member(_)
                ) =>
            {
                self.simple_assignment_target(paren.expression, ctx)
            }
            other => Err(self.error_at(Diagnostic::InvalidAssignmentTarget, other.span())),
        }
    }

    /// Operand of `++`/`--`
    pub(super) fn check_simple_target(&self, expr: &Expression, ctx: Context, diagnostic: Diagnostic) -> Result<()> {
        match expr.unparenthesized() {
            Expression::Identifier(ident) => self.validate(validator::check_identifier(
                &ident.name,
                ident.span,
                ctx,
                IdentifierUse::Assignment,
            )),
            Expression::Member(_) => Ok(()),
            _ => Err(self.error_at(diagnostic, expr.span())),
        }
    }

    /// Reinterpret the items of `( ... )` or `async( ... )` as arrow parameters
    pub(super) fn arrow_parameters(
        &mut self,
        items: Vec<Expression>,
        trailing_comma: Option<Span>,
        ctx: Context,
        parenthesized: &[Span],
    ) -> Result<Vec<Pattern>> {
        let target = Target::Binding(parenthesized);
        let count = items.len();
        let mut params = Vec::with_capacity(count);
        for (index, item) in items.into_iter().enumerate() {
            let param = match item {
                Expression::Spread(spread) => {
                    if index + 1 != count || trailing_comma.is_some() {
                        return Err(self.error_at(Diagnostic::RestNotLast, spread.span));
                    }
                    self.rest_to_pattern(*spread, ctx, target)
                }
                other => self.element_to_pattern(other, ctx, target),
            };
            params.push(self.validate(param)?);
        }
        Ok(params)
    }

    fn to_pattern(
        &mut self,
        expr: Expression,
        ctx: Context,
        target: Target<'_>,
        top: bool,
    ) -> std::result::Result<Pattern, EarlyError> {
        let invalid = |span| {
            let diagnostic = match target {
                Target::Binding(_) => Diagnostic::InvalidArrowParameters,
                Target::Assignment if top => Diagnostic::InvalidAssignmentTarget,
                Target::Assignment => Diagnostic::InvalidDestructuringTarget,
            };
            EarlyError::new(diagnostic, span)
        };

        match (expr, target) {
            (Expression::Identifier(ident), Target::Assignment) => {
                validator::check_identifier(&ident.name, ident.span, ctx, IdentifierUse::Assignment)?;
                Ok(Pattern::Identifier(ident))
            }
            (Expression::Identifier(ident), Target::Binding(parenthesized)) => {
                if parenthesized.iter().any(|span| same_range(*span, ident.span)) {
                    return Err(invalid(ident.span));
                }
                validator::check_identifier(&ident.name, ident.span, ctx, IdentifierUse::Binding)?;
                Ok(Pattern::Identifier(ident))
            }
            (Expression::Member(member), Target::Assignment) => Ok(Pattern::Member(member)),
            (Expression::Parenthesized(paren), Target::Assignment) => {
                let inner = paren.expression.unparenthesized();
                if !matches!(inner, Expression::Identifier(_) | Expression::Member(_)) {
                    return Err(invalid(paren.span));
                }
                self.cover.parenthesized.push(inner.span());
                self.to_pattern(paren.expression, ctx, target, top)
            }
            (Expression::Array(array), _) => self.array_to_pattern(*array, ctx, target),
            (Expression::Object(object), _) => self.object_to_pattern(*object, ctx, target),
            (other, _) => Err(invalid(other.span())),
        }
    }

    fn array_to_pattern(
        &mut self,
        array: ArrayExpression,
        ctx: Context,
        target: Target<'_>,
    ) -> std::result::Result<Pattern, EarlyError> {
        let count = array.elements.len();
        let mut elements = Vec::with_capacity(count);
        for (index, element) in array.elements.into_iter().enumerate() {
            let pattern = match element {
                None => None,
                Some(Expression::Spread(spread)) => {
                    if index + 1 != count || array.trailing_comma.is_some() {
                        return Err(EarlyError::new(Diagnostic::RestNotLast, spread.span));
                    }
                    Some(self.rest_to_pattern(*spread, ctx, target)?)
                }
                Some(expr) => Some(self.element_to_pattern(expr, ctx, target)?),
            };
            elements.push(pattern);
        }
        Ok(Pattern::Array(Box::new(ArrayPattern {
            span: array.span,
            elements,
        })))
    }

    fn object_to_pattern(
        &mut self,
        object: ObjectExpression,
        ctx: Context,
        target: Target<'_>,
    ) -> std::result::Result<Pattern, EarlyError> {
        let count = object.properties.len();
        let mut properties = Vec::with_capacity(count);
        for (index, member) in object.properties.into_iter().enumerate() {
            match member {
                ObjectMember::Spread(spread) => {
                    if index + 1 != count || object.trailing_comma.is_some() {
                        return Err(EarlyError::new(Diagnostic::RestNotLast, spread.span));
                    }
                    let SpreadElement { span, argument } = *spread;
                    if matches!(argument, Expression::Assignment(_)) {
                        return Err(EarlyError::new(Diagnostic::RestWithInitializer, argument.span()));
                    }
                    if !matches!(
                        argument,
                        Expression::Identifier(_) | Expression::Member(_) | Expression::Parenthesized(_)
                    ) {
                        return Err(EarlyError::new(Diagnostic::InvalidObjectRest, argument.span()));
                    }
                    let argument = self.to_pattern(argument, ctx, target, false)?;
                    properties.push(ObjectPatternMember::Rest(Box::new(RestElement { span, argument })));
                }
                ObjectMember::Property(property) => {
                    let Property {
                        span,
                        method,
                        shorthand,
                        computed,
                        key,
                        value,
                        kind,
                    } = *property;
                    if method || kind != PropertyKind::Init {
                        let diagnostic = match target {
                            Target::Binding(_) => Diagnostic::InvalidArrowParameters,
                            Target::Assignment => Diagnostic::InvalidDestructuringTarget,
                        };
                        return Err(EarlyError::new(diagnostic, span));
                    }
                    if let Target::Assignment = target {
                        self.resolve_pending(span);
                    }
                    let value = self.element_to_pattern(value, ctx, target)?;
                    properties.push(ObjectPatternMember::Property(Box::new(AssignmentProperty {
                        span,
                        method: false,
                        shorthand,
                        computed,
                        key,
                        value,
                        kind: PropertyKind::Init,
                    })));
                }
            }
        }
        Ok(Pattern::Object(Box::new(ObjectPattern {
            span: object.span,
            properties,
        })))
    }

    /// Array element or property value: a target with an optional default
    fn element_to_pattern(
        &mut self,
        expr: Expression,
        ctx: Context,
        target: Target<'_>,
    ) -> std::result::Result<Pattern, EarlyError> {
        match expr {
            Expression::Assignment(assign) if assign.operator == AssignmentOp::Assign => {
                let AssignmentExpression { span, left, right, .. } = *assign;
                if let Target::Binding(parenthesized) = target {
                    check_binding_pattern(&left, ctx, parenthesized)?;
                }
                Ok(Pattern::Assignment(Box::new(AssignmentPattern { span, left, right })))
            }
            other => self.to_pattern(other, ctx, target, false),
        }
    }

    fn rest_to_pattern(
        &mut self,
        spread: SpreadElement,
        ctx: Context,
        target: Target<'_>,
    ) -> std::result::Result<Pattern, EarlyError> {
        if matches!(spread.argument, Expression::Assignment(_)) {
            return Err(EarlyError::new(Diagnostic::RestWithInitializer, spread.argument.span()));
        }
        let argument = self.to_pattern(spread.argument, ctx, target, false)?;
        Ok(Pattern::Rest(Box::new(RestElement {
            span: spread.span,
            argument,
        })))
    }
}

/// The left side of a default inside arrow parameters was converted as an
/// assignment target when `=` was parsed; recheck it as a binding
fn check_binding_pattern(pattern: &Pattern, ctx: Context, parenthesized: &[Span]) -> std::result::Result<(), EarlyError> {
    match pattern {
        Pattern::Identifier(ident) => {
            if parenthesized.iter().any(|span| same_range(*span, ident.span)) {
                return Err(EarlyError::new(Diagnostic::InvalidArrowParameters, ident.span));
            }
            validator::check_identifier(&ident.name, ident.span, ctx, IdentifierUse::Binding)
        }
        Pattern::Member(member) => Err(EarlyError::new(Diagnostic::InvalidArrowParameters, member.span)),
        Pattern::Object(object) => object.properties.iter().try_for_each(|member| match member {
            ObjectPatternMember::Property(property) => check_binding_pattern(&property.value, ctx, parenthesized),
            ObjectPatternMember::Rest(rest) => check_binding_pattern(&rest.argument, ctx, parenthesized),
        }),
        Pattern::Array(array) => array
            .elements
            .iter()
            .flatten()
            .try_for_each(|element| check_binding_pattern(element, ctx, parenthesized)),
        Pattern::Rest(rest) => check_binding_pattern(&rest.argument, ctx, parenthesized),
        Pattern::Assignment(assign) => check_binding_pattern(&assign.left, ctx, parenthesized),
    }
}
