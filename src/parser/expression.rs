//! Expressions: assignment and operators down to primary expressions,
//! member access, calls, templates and arrow functions

use super::{CoverState, Parser};
use crate::ast::*;
use crate::context::Context;
use crate::error::{Diagnostic, EarlyError, Result};
use crate::lexer::TokenKind;
use crate::span::Span;
use crate::validator::IdentifierUse;

/// A binary or logical operator with its precedence
#[derive(Debug, Clone, Copy)]
enum Operator {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

impl<'a> Parser<'a> {
    /// Comma-separated expression
    pub(super) fn parse_expression(&mut self, ctx: Context) -> Result<Expression> {
        self.parse_sequence(ctx, Self::parse_assignment)
    }

    /// Comma-separated expression whose cover errors are left for the
    /// caller; used for `for (...)` heads that may turn out to be targets
    pub(super) fn parse_expression_cover(&mut self, ctx: Context) -> Result<Expression> {
        self.parse_sequence(ctx, Self::parse_assignment_cover)
    }

    /// `first` parses the leading item; the rest are plain assignment expressions
    fn parse_sequence(
        &mut self,
        ctx: Context,
        first: fn(&mut Self, Context) -> Result<Expression>,
    ) -> Result<Expression> {
        let start = self.start();
        let first = first(self, ctx)?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat(&TokenKind::Comma)? {
            expressions.push(self.parse_assignment(ctx)?);
        }
        Ok(Expression::Sequence(Box::new(SequenceExpression {
            span: self.finish(start),
            expressions,
        })))
    }

    /// Assignment expression in a position that can only be an expression
    pub(super) fn parse_assignment(&mut self, ctx: Context) -> Result<Expression> {
        let mark = self.cover.pending.len();
        let parenthesized = self.cover.parenthesized.len();
        let expr = self.parse_assignment_cover(ctx)?;
        self.cover.parenthesized.truncate(parenthesized);
        self.raise_pending(mark)?;
        Ok(expr)
    }

    /// Assignment expression that may still become a pattern: array
    /// elements, property values, parenthesized items and arguments
    pub(super) fn parse_assignment_cover(&mut self, ctx: Context) -> Result<Expression> {
        self.nested(|parser| parser.parse_assignment_inner(ctx))
    }

    fn parse_assignment_inner(&mut self, ctx: Context) -> Result<Expression> {
        if ctx.in_generator()
            && matches!(&self.current.kind, TokenKind::Identifier(name) if name == "yield")
        {
            return self.parse_yield(ctx);
        }

        let start = self.start();
        let left = self.parse_conditional(ctx)?;
        let Some(operator) = self.assignment_operator() else {
            return Ok(left);
        };
        let left = if operator == AssignmentOp::Assign {
            self.assignment_target(left, ctx)?
        } else {
            self.simple_assignment_target(left, ctx)?
        };
        self.advance()?;
        let right = self.parse_assignment(ctx)?;
        Ok(Expression::Assignment(Box::new(AssignmentExpression {
            span: self.finish(start),
            operator,
            left,
            right,
        })))
    }

    fn assignment_operator(&self) -> Option<AssignmentOp> {
        let op = match self.current.kind {
            TokenKind::Eq => AssignmentOp::Assign,
            TokenKind::PlusEq => AssignmentOp::AddAssign,
            TokenKind::MinusEq => AssignmentOp::SubAssign,
            TokenKind::StarEq => AssignmentOp::MulAssign,
            TokenKind::SlashEq => AssignmentOp::DivAssign,
            TokenKind::PercentEq => AssignmentOp::ModAssign,
            TokenKind::StarStarEq => AssignmentOp::ExpAssign,
            TokenKind::AmpEq => AssignmentOp::BitAndAssign,
            TokenKind::PipeEq => AssignmentOp::BitOrAssign,
            TokenKind::CaretEq => AssignmentOp::BitXorAssign,
            TokenKind::LtLtEq => AssignmentOp::LShiftAssign,
            TokenKind::GtGtEq => AssignmentOp::RShiftAssign,
            TokenKind::GtGtGtEq => AssignmentOp::URShiftAssign,
            TokenKind::AmpAmpEq => AssignmentOp::AndAssign,
            TokenKind::PipePipeEq => AssignmentOp::OrAssign,
            TokenKind::QuestionQuestionEq => AssignmentOp::NullishAssign,
            _ => return None,
        };
        Some(op)
    }

    fn parse_yield(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        if self.current.is_escaped() {
            return Err(self.error_at(Diagnostic::EscapedKeyword, self.current.span));
        }
        if ctx.in_parameters() {
            return Err(self.error_at(Diagnostic::YieldInParameters, self.current.span));
        }
        self.advance()?;

        let mut delegate = false;
        let mut argument = None;
        if !self.current.newline_before() {
            if self.eat(&TokenKind::Star)? {
                delegate = true;
                argument = Some(self.parse_assignment(ctx)?);
            } else if self.starts_expression() {
                argument = Some(self.parse_assignment(ctx)?);
            }
        }

        let span = self.finish(start);
        self.cover
            .yield_await
            .get_or_insert_with(|| EarlyError::new(Diagnostic::YieldInParameters, span));
        Ok(Expression::Yield(Box::new(YieldExpression {
            span,
            delegate,
            argument,
        })))
    }

    /// Whether the current token can begin an expression (decides whether
    /// `yield` has an operand)
    fn starts_expression(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Identifier(_)
                | TokenKind::PrivateName(_)
                | TokenKind::Number(_)
                | TokenKind::BigInt(_)
                | TokenKind::String(_)
                | TokenKind::Template { .. }
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Bang
                | TokenKind::Tilde
                | TokenKind::PlusPlus
                | TokenKind::MinusMinus
                | TokenKind::Slash
                | TokenKind::SlashEq
                | TokenKind::At
                | TokenKind::Function
                | TokenKind::Class
                | TokenKind::New
                | TokenKind::This
                | TokenKind::Super
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Typeof
                | TokenKind::Void
                | TokenKind::Delete
                | TokenKind::Import
        )
    }

    fn parse_conditional(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        let test = self.parse_binary(ctx, 0)?;
        if matches!(test, Expression::Arrow(_)) || !self.check(&TokenKind::Question) {
            return Ok(test);
        }
        self.advance()?;
        let consequent = self.parse_assignment(ctx.with_in(true))?;
        self.expect(&TokenKind::Colon)?;
        let alternate = self.parse_assignment(ctx)?;
        Ok(Expression::Conditional(Box::new(ConditionalExpression {
            span: self.finish(start),
            test,
            consequent,
            alternate,
        })))
    }

    fn binary_operator(&self, ctx: Context) -> Option<(Operator, u8)> {
        use Operator::{Binary, Logical};
        let op = match self.current.kind {
            TokenKind::QuestionQuestion => (Logical(LogicalOp::NullishCoalescing), 4),
            TokenKind::PipePipe => (Logical(LogicalOp::Or), 4),
            TokenKind::AmpAmp => (Logical(LogicalOp::And), 5),
            TokenKind::Pipe => (Binary(BinaryOp::BitOr), 6),
            TokenKind::Caret => (Binary(BinaryOp::BitXor), 7),
            TokenKind::Amp => (Binary(BinaryOp::BitAnd), 8),
            TokenKind::EqEq => (Binary(BinaryOp::Eq), 9),
            TokenKind::BangEq => (Binary(BinaryOp::NotEq), 9),
            TokenKind::EqEqEq => (Binary(BinaryOp::StrictEq), 9),
            TokenKind::BangEqEq => (Binary(BinaryOp::StrictNotEq), 9),
            TokenKind::Lt => (Binary(BinaryOp::Lt), 10),
            TokenKind::LtEq => (Binary(BinaryOp::LtEq), 10),
            TokenKind::Gt => (Binary(BinaryOp::Gt), 10),
            TokenKind::GtEq => (Binary(BinaryOp::GtEq), 10),
            TokenKind::Instanceof => (Binary(BinaryOp::Instanceof), 10),
            TokenKind::In if ctx.allows_in() => (Binary(BinaryOp::In), 10),
            TokenKind::LtLt => (Binary(BinaryOp::LShift), 11),
            TokenKind::GtGt => (Binary(BinaryOp::RShift), 11),
            TokenKind::GtGtGt => (Binary(BinaryOp::URShift), 11),
            TokenKind::Plus => (Binary(BinaryOp::Add), 12),
            TokenKind::Minus => (Binary(BinaryOp::Sub), 12),
            TokenKind::Star => (Binary(BinaryOp::Mul), 13),
            TokenKind::Slash => (Binary(BinaryOp::Div), 13),
            TokenKind::Percent => (Binary(BinaryOp::Mod), 13),
            TokenKind::StarStar => (Binary(BinaryOp::Exp), 14),
            _ => return None,
        };
        Some(op)
    }

    /// Precedence climbing over binary and logical operators. `**` is
    /// right-associative, everything else left-associative.
    fn parse_binary(&mut self, ctx: Context, min_precedence: u8) -> Result<Expression> {
        let start = self.start();
        let mut left = self.parse_unary(ctx)?;
        if matches!(left, Expression::Arrow(_)) {
            return Ok(left);
        }

        while let Some((operator, precedence)) = self.binary_operator(ctx) {
            if precedence < min_precedence {
                break;
            }
            let exponent = matches!(operator, Operator::Binary(BinaryOp::Exp));
            if let Expression::PrivateName(name) = &left {
                if !matches!(operator, Operator::Binary(BinaryOp::In)) {
                    return Err(self.error_at(
                        Diagnostic::UnexpectedToken(format!("#{}", name.name)),
                        name.span,
                    ));
                }
            }
            if exponent && matches!(left, Expression::Unary(_) | Expression::Await(_)) {
                return Err(self.error_at(Diagnostic::UnaryBeforeExponent, left.span()));
            }
            self.advance()?;

            let next_min = if exponent { precedence } else { precedence + 1 };
            let right = self.nested(|parser| parser.parse_binary(ctx, next_min))?;
            self.check_operand(&right)?;
            let span = self.finish(start);

            left = match operator {
                Operator::Binary(operator) => Expression::Binary(Box::new(BinaryExpression {
                    span,
                    left,
                    operator,
                    right,
                })),
                Operator::Logical(operator) => {
                    let coalesce = operator == LogicalOp::NullishCoalescing;
                    let mixes = |expr: &Expression| {
                        matches!(expr, Expression::Logical(inner)
                            if (inner.operator == LogicalOp::NullishCoalescing) != coalesce)
                    };
                    if mixes(&left) || mixes(&right) {
                        return Err(self.error_at(Diagnostic::MixedCoalesce, span));
                    }
                    Expression::Logical(Box::new(LogicalExpression {
                        span,
                        left,
                        operator,
                        right,
                    }))
                }
            };
        }
        Ok(left)
    }

    /// Arrow functions and `#x` only stand on their own; neither can be
    /// the operand of an operator
    pub(super) fn check_operand(&self, expr: &Expression) -> Result<()> {
        match expr {
            Expression::Arrow(arrow) => Err(self.error_at(
                Diagnostic::UnexpectedToken("=>".to_string()),
                arrow.span,
            )),
            Expression::PrivateName(name) => Err(self.error_at(
                Diagnostic::UnexpectedToken(format!("#{}", name.name)),
                name.span,
            )),
            _ => Ok(()),
        }
    }

    fn unary_operator(&self) -> Option<UnaryOp> {
        let op = match self.current.kind {
            TokenKind::Minus => UnaryOp::Minus,
            TokenKind::Plus => UnaryOp::Plus,
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Tilde => UnaryOp::BitNot,
            TokenKind::Typeof => UnaryOp::Typeof,
            TokenKind::Void => UnaryOp::Void,
            TokenKind::Delete => UnaryOp::Delete,
            _ => return None,
        };
        Some(op)
    }

    pub(super) fn parse_unary(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();

        if let Some(operator) = self.unary_operator() {
            self.advance()?;
            let argument = self.parse_nested_unary(ctx)?;
            let span = self.finish(start);
            if operator == UnaryOp::Delete {
                self.check_delete(&argument, span, ctx)?;
            }
            return Ok(Expression::Unary(Box::new(UnaryExpression {
                span,
                operator,
                prefix: true,
                argument,
            })));
        }

        let update = match self.current.kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(operator) = update {
            self.advance()?;
            let argument = self.parse_nested_unary(ctx)?;
            self.check_simple_target(&argument, ctx, Diagnostic::InvalidUpdateTarget("prefix"))?;
            return Ok(Expression::Update(Box::new(UpdateExpression {
                span: self.finish(start),
                operator,
                prefix: true,
                argument,
            })));
        }

        if let TokenKind::PrivateName(_) = self.current.kind {
            return self.parse_private_in(ctx);
        }
        if ctx.await_is_operator()
            && matches!(&self.current.kind, TokenKind::Identifier(name) if name == "await")
        {
            return self.parse_await(ctx);
        }
        self.parse_postfix(ctx)
    }

    fn parse_nested_unary(&mut self, ctx: Context) -> Result<Expression> {
        let argument = self.nested(|parser| parser.parse_unary(ctx))?;
        self.check_operand(&argument)?;
        Ok(argument)
    }

    fn check_delete(&self, argument: &Expression, span: Span, ctx: Context) -> Result<()> {
        let target = argument.unparenthesized();
        if ctx.is_strict() && matches!(target, Expression::Identifier(_)) {
            return Err(self.error_at(Diagnostic::StrictDelete, span));
        }
        let private_member = |expr: &Expression| {
            matches!(expr, Expression::Member(member)
                if matches!(member.property, Expression::PrivateName(_)))
        };
        let private = match target {
            Expression::Chain(chain) => private_member(&chain.expression),
            other => private_member(other),
        };
        if private {
            return Err(self.error_at(Diagnostic::DeletePrivateField, span));
        }
        Ok(())
    }

    fn parse_await(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        if self.current.is_escaped() {
            return Err(self.error_at(Diagnostic::EscapedKeyword, self.current.span));
        }
        if ctx.in_parameters() {
            return Err(self.error_at(Diagnostic::AwaitInParameters, self.current.span));
        }
        self.advance()?;
        let argument = self.parse_nested_unary(ctx)?;
        let span = self.finish(start);
        self.cover
            .yield_await
            .get_or_insert_with(|| EarlyError::new(Diagnostic::AwaitInParameters, span));
        Ok(Expression::Await(Box::new(AwaitExpression { span, argument })))
    }

    /// `#x in obj`: a private name is only an expression as the left side of `in`
    fn parse_private_in(&mut self, ctx: Context) -> Result<Expression> {
        let TokenKind::PrivateName(name) = self.current.kind.clone() else {
            return Err(self.unexpected());
        };
        let span = self.builder.restamp(self.current.span);
        self.advance()?;
        if !(self.check(&TokenKind::In) && ctx.allows_in()) {
            return Err(self.error_at(Diagnostic::UnexpectedToken(format!("#{name}")), span));
        }
        let reference = self.private_names.reference(&name, span);
        self.validate(reference)?;
        Ok(Expression::PrivateName(Box::new(PrivateIdentifier { span, name })))
    }

    fn parse_postfix(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        let expr = self.parse_lhs(ctx)?;
        if matches!(expr, Expression::Arrow(_)) || self.current.newline_before() {
            return Ok(expr);
        }
        let operator = match self.current.kind {
            TokenKind::PlusPlus => UpdateOp::Increment,
            TokenKind::MinusMinus => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        self.check_simple_target(&expr, ctx, Diagnostic::InvalidUpdateTarget("postfix"))?;
        self.advance()?;
        Ok(Expression::Update(Box::new(UpdateExpression {
            span: self.finish(start),
            operator,
            prefix: false,
            argument: expr,
        })))
    }

    /// Left-hand-side expression: `new`, calls and member accesses
    pub(super) fn parse_lhs(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        let expr = if self.check(&TokenKind::New) {
            self.parse_new(ctx)?
        } else {
            self.parse_primary(ctx, false)?
        };
        if matches!(expr, Expression::Arrow(_)) {
            return Ok(expr);
        }
        self.parse_subscripts(ctx, start, expr, false)
    }

    fn parse_new(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        let keyword = self.advance()?;

        if self.eat(&TokenKind::Dot)? {
            let property = self.parse_meta_property("new", "target")?;
            let span = self.finish(start);
            if !ctx.contains(Context::ALLOW_NEW_TARGET) {
                return Err(self.error_at(Diagnostic::NewTargetOutsideFunction, span));
            }
            return Ok(Expression::MetaProperty(Box::new(MetaProperty {
                span,
                meta: Identifier {
                    span: self.builder.restamp(keyword.span),
                    name: "new".to_string(),
                },
                property,
            })));
        }

        let callee = self.nested(|parser| parser.parse_new_callee(ctx))?;
        let arguments = if self.check(&TokenKind::LParen) {
            self.parse_arguments(ctx)?
        } else {
            Vec::new()
        };
        Ok(Expression::New(Box::new(NewExpression {
            span: self.finish(start),
            callee,
            arguments,
        })))
    }

    /// The constructor part of `new C(...)`: member accesses but no calls
    fn parse_new_callee(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        let callee = if self.check(&TokenKind::New) {
            self.parse_new(ctx)?
        } else {
            self.parse_primary(ctx, true)?
        };
        self.check_operand(&callee)?;
        self.parse_subscripts(ctx, start, callee, true)
    }

    /// `.x`, `?.x`, `[x]`, calls and tagged templates after `expr`
    pub(super) fn parse_subscripts(
        &mut self,
        ctx: Context,
        start: usize,
        mut expr: Expression,
        no_call: bool,
    ) -> Result<Expression> {
        let mut chained = false;
        loop {
            match self.current.kind {
                TokenKind::Dot => {
                    self.advance()?;
                    let property = self.parse_member_property()?;
                    expr = self.member(start, expr, property, false, false);
                }
                TokenKind::QuestionDot => {
                    if no_call {
                        return Err(self.error_at(Diagnostic::OptionalChainNew, self.current.span));
                    }
                    self.advance()?;
                    chained = true;
                    expr = match self.current.kind {
                        TokenKind::LParen => {
                            let arguments = self.parse_arguments(ctx)?;
                            self.call(start, expr, arguments, true)
                        }
                        TokenKind::LBracket => {
                            let property = self.parse_computed_member(ctx)?;
                            self.member(start, expr, property, true, true)
                        }
                        TokenKind::Template { .. } => {
                            return Err(self.error_at(
                                Diagnostic::OptionalChainTemplate,
                                self.current.span,
                            ));
                        }
                        _ => {
                            let property = self.parse_member_property()?;
                            self.member(start, expr, property, false, true)
                        }
                    };
                }
                TokenKind::LBracket => {
                    let property = self.parse_computed_member(ctx)?;
                    expr = self.member(start, expr, property, true, false);
                }
                TokenKind::Template { .. } => {
                    if chained {
                        return Err(self.error_at(Diagnostic::OptionalChainTemplate, self.current.span));
                    }
                    let quasi = self.parse_template(ctx, true)?;
                    expr = Expression::TaggedTemplate(Box::new(TaggedTemplateExpression {
                        span: self.finish(start),
                        tag: expr,
                        quasi,
                    }));
                }
                TokenKind::LParen if !no_call => {
                    let arguments = self.parse_arguments(ctx)?;
                    expr = self.call(start, expr, arguments, false);
                }
                _ => break,
            }
        }

        if chained {
            expr = Expression::Chain(Box::new(ChainExpression {
                span: self.finish(start),
                expression: expr,
            }));
        }
        Ok(expr)
    }

    pub(super) fn member(
        &self,
        start: usize,
        object: Expression,
        property: Expression,
        computed: bool,
        optional: bool,
    ) -> Expression {
        Expression::Member(Box::new(MemberExpression {
            span: self.finish(start),
            object,
            property,
            computed,
            optional,
        }))
    }

    pub(super) fn call(&self, start: usize, callee: Expression, arguments: Vec<Expression>, optional: bool) -> Expression {
        Expression::Call(Box::new(CallExpression {
            span: self.finish(start),
            callee,
            arguments,
            optional,
        }))
    }

    fn parse_computed_member(&mut self, ctx: Context) -> Result<Expression> {
        self.expect(&TokenKind::LBracket)?;
        let property = self.parse_expression(ctx.with_in(true))?;
        self.expect(&TokenKind::RBracket)?;
        Ok(property)
    }

    /// Name after `.` or `?.`: any identifier name, or a private name
    /// declared by an enclosing class
    pub(super) fn parse_member_property(&mut self) -> Result<Expression> {
        let span = self.builder.restamp(self.current.span);
        if let TokenKind::PrivateName(name) = &self.current.kind {
            let name = name.clone();
            let reference = self.private_names.reference(&name, span);
            self.validate(reference)?;
            self.advance()?;
            return Ok(Expression::PrivateName(Box::new(PrivateIdentifier { span, name })));
        }
        let Some(name) = self.current.kind.identifier_name() else {
            return Err(self.unexpected());
        };
        let name = name.to_string();
        self.advance()?;
        Ok(Expression::Identifier(Box::new(Identifier { span, name })))
    }

    /// `meta.property` after the dot, e.g. `new.target` and `import.meta`
    fn parse_meta_property(&mut self, meta: &'static str, property: &'static str) -> Result<Identifier> {
        let span = self.builder.restamp(self.current.span);
        let Some(name) = self.current.kind.identifier_name() else {
            return Err(self.unexpected());
        };
        if name != property {
            return Err(self.error_at(
                Diagnostic::InvalidMetaProperty {
                    meta: meta.to_string(),
                    property: name.to_string(),
                },
                span,
            ));
        }
        if self.current.is_escaped() {
            return Err(self.error_at(Diagnostic::EscapedKeyword, span));
        }
        self.advance()?;
        Ok(Identifier {
            span,
            name: property.to_string(),
        })
    }

    pub(super) fn parse_arguments(&mut self, ctx: Context) -> Result<Vec<Expression>> {
        Ok(self.parse_argument_list(ctx, false)?.0)
    }

    /// `( a, ...b, )`. With `cover`, items may still become arrow
    /// parameters. Also returns the span of a trailing comma.
    pub(super) fn parse_argument_list(
        &mut self,
        ctx: Context,
        cover: bool,
    ) -> Result<(Vec<Expression>, Option<Span>)> {
        self.expect(&TokenKind::LParen)?;
        let ctx = ctx.with_in(true);
        let mut arguments = Vec::new();
        let mut trailing_comma = None;
        while !self.check(&TokenKind::RParen) {
            let start = self.start();
            let spread = self.eat(&TokenKind::DotDotDot)?;
            let argument = if cover {
                self.parse_assignment_cover(ctx)?
            } else {
                self.parse_assignment(ctx)?
            };
            arguments.push(if spread {
                Expression::Spread(Box::new(SpreadElement {
                    span: self.finish(start),
                    argument,
                }))
            } else {
                argument
            });
            if !self.check(&TokenKind::RParen) {
                let comma = self.expect(&TokenKind::Comma)?;
                if self.check(&TokenKind::RParen) {
                    trailing_comma = Some(comma.span);
                }
            }
        }
        self.advance()?;
        Ok((arguments, trailing_comma))
    }

    // ============ PRIMARY ============

    /// Primary expression. `no_call` is set for the callee of `new`, where
    /// `async(...)` and `import(...)` can not start a call.
    pub(super) fn parse_primary(&mut self, ctx: Context, no_call: bool) -> Result<Expression> {
        let start = self.start();
        match self.current.kind {
            TokenKind::Identifier(_) => {
                if self.at_contextual("async") {
                    return self.parse_async_primary(ctx, no_call);
                }
                let ident = self.parse_identifier_reference(ctx)?;
                if self.check(&TokenKind::Arrow) {
                    return self.parse_arrow_from_identifier(ctx, start, ident, false);
                }
                Ok(Expression::Identifier(Box::new(ident)))
            }
            TokenKind::Number(_)
            | TokenKind::BigInt(_)
            | TokenKind::String(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => Ok(Expression::Literal(Box::new(self.parse_literal(ctx)?))),
            TokenKind::Slash | TokenKind::SlashEq => {
                self.current = self.lexer.rescan_as_regexp(&self.current)?;
                Ok(Expression::Literal(Box::new(self.parse_literal(ctx)?)))
            }
            TokenKind::Template { .. } => {
                Ok(Expression::Template(Box::new(self.parse_template(ctx, false)?)))
            }
            TokenKind::This => {
                let token = self.advance()?;
                Ok(Expression::This(Box::new(ThisExpression {
                    span: self.builder.restamp(token.span),
                })))
            }
            TokenKind::LParen => self.parse_parenthesized(ctx),
            TokenKind::LBracket => self.parse_array_literal(ctx),
            TokenKind::LBrace => self.parse_object_literal(ctx),
            TokenKind::Function => self.parse_function_expression(ctx, start, false),
            TokenKind::Class | TokenKind::At => {
                let decorators = self.parse_decorators(ctx)?;
                let class = self.parse_class(ctx, start, ClassType::ClassExpression, decorators)?;
                Ok(Expression::Class(Box::new(class)))
            }
            TokenKind::Super => self.parse_super(ctx, no_call),
            TokenKind::Import => self.parse_import_expression(ctx, no_call),
            _ => Err(self.unexpected()),
        }
    }

    /// `super` must be followed by a call (in derived constructors) or a
    /// property access (in methods)
    fn parse_super(&mut self, ctx: Context, no_call: bool) -> Result<Expression> {
        let token = self.advance()?;
        let span = self.builder.restamp(token.span);
        match self.current.kind {
            TokenKind::LParen if !no_call => {
                if !ctx.contains(Context::ALLOW_SUPER_CALL) {
                    return Err(self.error_at(Diagnostic::InvalidSuperCall, span));
                }
            }
            TokenKind::Dot | TokenKind::LBracket => {
                if !ctx.contains(Context::ALLOW_SUPER_PROPERTY) {
                    return Err(self.error_at(Diagnostic::InvalidSuperProperty, span));
                }
                if self.check(&TokenKind::Dot) {
                    let next = self.peek()?;
                    if let TokenKind::PrivateName(name) = &next.kind {
                        return Err(self.error_at(
                            Diagnostic::UnexpectedToken(format!("#{}", name)),
                            next.span,
                        ));
                    }
                }
            }
            _ => return Err(self.error_at(Diagnostic::InvalidSuperProperty, span)),
        }
        Ok(Expression::Super(Box::new(Super { span })))
    }

    /// `import(source[, options])` and `import.meta`
    fn parse_import_expression(&mut self, ctx: Context, no_call: bool) -> Result<Expression> {
        let start = self.start();
        let keyword = self.advance()?;

        if self.eat(&TokenKind::Dot)? {
            let property = self.parse_meta_property("import", "meta")?;
            let span = self.finish(start);
            if !ctx.is_module() {
                return Err(self.error_at(Diagnostic::ImportMetaOutsideModule, span));
            }
            return Ok(Expression::MetaProperty(Box::new(MetaProperty {
                span,
                meta: Identifier {
                    span: self.builder.restamp(keyword.span),
                    name: "import".to_string(),
                },
                property,
            })));
        }

        if no_call || !self.check(&TokenKind::LParen) {
            return Err(self.unexpected());
        }
        self.advance()?;
        let inner = ctx.with_in(true);
        if matches!(self.current.kind, TokenKind::RParen | TokenKind::DotDotDot) {
            return Err(self.error_at(Diagnostic::InvalidImportCall, self.current.span));
        }
        let source = self.parse_assignment(inner)?;

        let mut options = None;
        if self.eat(&TokenKind::Comma)? && !self.check(&TokenKind::RParen) {
            if !self.options.next {
                return Err(self.error_at(
                    Diagnostic::StagedSyntaxDisabled("import attributes"),
                    self.current.span,
                ));
            }
            if self.check(&TokenKind::DotDotDot) {
                return Err(self.error_at(Diagnostic::InvalidImportCall, self.current.span));
            }
            options = Some(self.parse_assignment(inner)?);
            self.eat(&TokenKind::Comma)?;
        }
        if !self.check(&TokenKind::RParen) {
            return Err(self.error_at(Diagnostic::InvalidImportCall, self.current.span));
        }
        self.advance()?;

        Ok(Expression::Import(Box::new(ImportExpression {
            span: self.finish(start),
            source,
            options,
        })))
    }

    /// Number, bigint, string, boolean, null or (already rescanned) regexp
    pub(super) fn parse_literal(&mut self, ctx: Context) -> Result<Literal> {
        let token = self.advance()?;
        self.check_legacy_octal(&token, ctx)?;
        let span = self.builder.restamp(token.span);
        let raw = token.span.slice(self.source).to_string();
        let value = match token.kind {
            TokenKind::Number(value) => LiteralValue::Number(value),
            TokenKind::BigInt(digits) => LiteralValue::BigInt(digits),
            TokenKind::String(value) => LiteralValue::String(value),
            TokenKind::True => LiteralValue::Boolean(true),
            TokenKind::False => LiteralValue::Boolean(false),
            TokenKind::Null => LiteralValue::Null,
            TokenKind::RegExp { pattern, flags } => LiteralValue::RegExp { pattern, flags },
            _ => return Err(self.error_at(Diagnostic::UnexpectedToken(raw), span)),
        };
        Ok(Literal { span, value, raw })
    }

    /// Template literal. Untagged templates may not contain malformed
    /// escapes; tagged ones get a `null` cooked value instead.
    pub(super) fn parse_template(&mut self, ctx: Context, tagged: bool) -> Result<TemplateLiteral> {
        let start = self.start();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();
        loop {
            let TokenKind::Template { cooked, raw, tail } = self.current.kind.clone() else {
                return Err(self.unexpected());
            };
            let token_span = self.current.span;
            if cooked.is_none() && !tagged {
                return Err(self.error_at(Diagnostic::InvalidTemplateEscape, token_span));
            }
            // Quasi spans exclude the delimiters: ` or } before, ` or ${ after
            let closing = if tail { 1 } else { 2 };
            let end = token_span.end.saturating_sub(closing).max(token_span.start + 1);
            quasis.push(TemplateElement {
                span: self.builder.span(token_span.start + 1, end),
                value: TemplateValue { raw, cooked },
                tail,
            });
            self.advance()?;
            if tail {
                break;
            }

            expressions.push(self.parse_expression(ctx.with_in(true))?);
            if !self.check(&TokenKind::RBrace) {
                return Err(self.expected("}"));
            }
            self.current = self.lexer.rescan_template_continuation(&self.current)?;
        }
        Ok(TemplateLiteral {
            span: self.finish(start),
            expressions,
            quasis,
        })
    }

    // ============ IDENTIFIERS ============

    pub(super) fn parse_identifier_reference(&mut self, ctx: Context) -> Result<Identifier> {
        self.parse_binding_identifier(ctx, IdentifierUse::Reference)
    }

    /// Consume an identifier token and check it for `usage`
    pub(super) fn parse_binding_identifier(&mut self, ctx: Context, usage: IdentifierUse) -> Result<Identifier> {
        if !matches!(self.current.kind, TokenKind::Identifier(_)) {
            return Err(self.unexpected());
        }
        let token = self.advance()?;
        self.identifier_from_token(&token, ctx, usage)
    }

    // ============ PARENTHESES AND ARROWS ============

    /// `( ... )`: either a parenthesized expression or arrow parameters
    fn parse_parenthesized(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        let outer = std::mem::take(&mut self.cover);
        let items = self.parse_argument_list(ctx, true);
        let inner = std::mem::replace(&mut self.cover, outer);
        let (mut items, trailing_comma) = items?;
        let closing = Span::new(self.prev_end.saturating_sub(1), self.prev_end);

        if self.check(&TokenKind::Arrow) {
            if self.current.newline_before() {
                return Err(self.error_at(Diagnostic::LineBreakBeforeArrow, self.current.span));
            }
            if let Some(err) = inner.yield_await {
                return Err(self.early(err));
            }
            let params = self.arrow_parameters(items, trailing_comma, ctx, &inner.parenthesized)?;
            self.advance()?;
            return self.parse_arrow_body(ctx, start, params, false);
        }

        if let Some((span, diagnostic)) = inner.pending.first() {
            return Err(self.error_at(diagnostic.clone(), *span));
        }
        if items.is_empty() {
            return Err(self.expected("=>"));
        }
        if trailing_comma.is_some() {
            return Err(self.error_at(Diagnostic::UnexpectedToken(")".to_string()), closing));
        }
        if let Some(spread) = items.iter().find(|item| matches!(item, Expression::Spread(_))) {
            return Err(self.error_at(Diagnostic::UnexpectedToken("...".to_string()), spread.span()));
        }
        self.cover.absorb(inner);

        let expression = if items.len() == 1 {
            items.pop().ok_or_else(|| self.expected("expression"))?
        } else {
            let first = items.first().map_or(start, |item| item.span().start);
            let last = items.last().map_or(start, |item| item.span().end);
            Expression::Sequence(Box::new(SequenceExpression {
                span: self.builder.span(first, last),
                expressions: items,
            }))
        };
        Ok(Expression::Parenthesized(Box::new(ParenthesizedExpression {
            span: self.finish(start),
            expression,
        })))
    }

    /// `x => ...` once `x` is parsed
    fn parse_arrow_from_identifier(
        &mut self,
        ctx: Context,
        start: usize,
        param: Identifier,
        is_async: bool,
    ) -> Result<Expression> {
        if self.current.newline_before() {
            return Err(self.error_at(Diagnostic::LineBreakBeforeArrow, self.current.span));
        }
        self.advance()?;
        self.parse_arrow_body(ctx, start, vec![Pattern::Identifier(Box::new(param))], is_async)
    }

    /// Everything that starts with the identifier `async`: async functions,
    /// async arrows, or a plain reference/call
    fn parse_async_primary(&mut self, ctx: Context, no_call: bool) -> Result<Expression> {
        let start = self.start();
        let next = self.peek()?;
        if !next.newline_before() {
            match next.kind {
                TokenKind::Function => {
                    self.advance()?;
                    return self.parse_function_expression(ctx, start, true);
                }
                TokenKind::Identifier(_) => {
                    self.advance()?;
                    let param = self.parse_identifier_reference(ctx)?;
                    if !self.check(&TokenKind::Arrow) {
                        return Err(self.expected("=>"));
                    }
                    return self.parse_arrow_from_identifier(ctx, start, param, true);
                }
                TokenKind::LParen if !no_call => return self.parse_async_call(ctx),
                _ => {}
            }
        }

        let ident = self.parse_identifier_reference(ctx)?;
        if self.check(&TokenKind::Arrow) {
            return self.parse_arrow_from_identifier(ctx, start, ident, false);
        }
        Ok(Expression::Identifier(Box::new(ident)))
    }

    /// `async(...)`: a call, unless `=>` follows
    fn parse_async_call(&mut self, ctx: Context) -> Result<Expression> {
        let start = self.start();
        let callee = self.parse_identifier_reference(ctx)?;
        let outer = std::mem::take(&mut self.cover);
        let arguments = self.parse_argument_list(ctx, true);
        let inner: CoverState = std::mem::replace(&mut self.cover, outer);
        let (arguments, trailing_comma) = arguments?;

        if self.check(&TokenKind::Arrow) {
            if self.current.newline_before() {
                return Err(self.error_at(Diagnostic::LineBreakBeforeArrow, self.current.span));
            }
            if let Some(err) = inner.yield_await {
                return Err(self.early(err));
            }
            if let Some(span) = inner.await_identifier {
                return Err(self.error_at(Diagnostic::ReservedWord("await".to_string()), span));
            }
            let params = self.arrow_parameters(arguments, trailing_comma, ctx, &inner.parenthesized)?;
            self.advance()?;
            return self.parse_arrow_body(ctx, start, params, true);
        }

        if let Some((span, diagnostic)) = inner.pending.first() {
            return Err(self.error_at(diagnostic.clone(), *span));
        }
        self.cover.absorb(inner);
        Ok(self.call(start, Expression::Identifier(Box::new(callee)), arguments, false))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::{Diagnostic, ParseError};
    use crate::options::{ParseOptions, SourceType};
    use crate::parser::Parser;

    fn parse_with(source: &str, source_type: SourceType) -> Result<Program, ParseError> {
        let options = ParseOptions::default();
        Parser::new(source, &options, source_type).parse_program()
    }

    fn expr(source: &str) -> Expression {
        let Ok(program) = parse_with(source, SourceType::Script) else {
            panic!("failed to parse {source:?}");
        };
        let Some(Statement::Expression(stmt)) = program.body.into_iter().next() else {
            panic!("expected an expression statement in {source:?}");
        };
        stmt.expression
    }

    fn error(source: &str) -> Diagnostic {
        match parse_with(source, SourceType::Script) {
            Ok(_) => panic!("{source:?} should not parse"),
            Err(err) => err.diagnostic,
        }
    }

    #[test]
    fn test_precedence() {
        let Expression::Binary(add) = expr("1 + 2 * 3") else {
            panic!("expected binary");
        };
        assert_eq!(add.operator, BinaryOp::Add);
        assert!(matches!(&add.right, Expression::Binary(mul) if mul.operator == BinaryOp::Mul));
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let Expression::Binary(outer) = expr("2 ** 3 ** 2") else {
            panic!("expected binary");
        };
        assert!(matches!(outer.left, Expression::Literal(_)));
        assert!(matches!(&outer.right, Expression::Binary(inner) if inner.operator == BinaryOp::Exp));
    }

    #[test]
    fn test_unary_before_exponent() {
        assert_eq!(error("-2 ** 2"), Diagnostic::UnaryBeforeExponent);
        let Expression::Binary(ok) = expr("(-2) ** 2") else {
            panic!("parenthesized operand is fine");
        };
        assert!(matches!(ok.left, Expression::Parenthesized(_)));
    }

    #[test]
    fn test_nullish_mixing() {
        assert_eq!(error("a ?? b || c"), Diagnostic::MixedCoalesce);
        assert_eq!(error("a && b ?? c"), Diagnostic::MixedCoalesce);
        assert!(matches!(expr("(a && b) ?? c"), Expression::Logical(_)));
        assert!(matches!(expr("a ?? b ?? c"), Expression::Logical(_)));
    }

    #[test]
    fn test_conditional_and_sequence() {
        assert!(matches!(expr("a ? b : c"), Expression::Conditional(_)));
        let Expression::Sequence(seq) = expr("a, b, c") else {
            panic!("expected sequence");
        };
        assert_eq!(seq.expressions.len(), 3);
    }

    #[test]
    fn test_member_and_call_chain() {
        let Expression::Call(call) = expr("a.b[c](d, ...e)") else {
            panic!("expected call");
        };
        assert_eq!(call.arguments.len(), 2);
        assert!(matches!(call.arguments.get(1), Some(Expression::Spread(_))));
        let Expression::Member(member) = &call.callee else {
            panic!("expected member callee");
        };
        assert!(member.computed);
    }

    #[test]
    fn test_optional_chain() {
        let Expression::Chain(chain) = expr("a?.b.c") else {
            panic!("expected chain");
        };
        let Expression::Member(outer) = &chain.expression else {
            panic!("expected member");
        };
        assert!(!outer.optional);
        assert!(matches!(&outer.object, Expression::Member(inner) if inner.optional));
        assert_eq!(error("a?.b`t`"), Diagnostic::OptionalChainTemplate);
        assert_eq!(error("new a?.b()"), Diagnostic::OptionalChainNew);
    }

    #[test]
    fn test_new_with_member_callee() {
        let Expression::Member(member) = expr("new a.b(c).d") else {
            panic!("expected member");
        };
        let Expression::New(new) = &member.object else {
            panic!("expected new");
        };
        assert!(matches!(new.callee, Expression::Member(_)));
        assert_eq!(new.arguments.len(), 1);
    }

    #[test]
    fn test_new_target_needs_function() {
        assert_eq!(error("new.target"), Diagnostic::NewTargetOutsideFunction);
        let Ok(_) = parse_with("function f() { return new.target; }", SourceType::Script) else {
            panic!("new.target inside a function");
        };
    }

    #[test]
    fn test_templates() {
        let Expression::Template(template) = expr("`a${b}c`") else {
            panic!("expected template");
        };
        assert_eq!(template.quasis.len(), 2);
        assert_eq!(template.expressions.len(), 1);
        assert_eq!(template.quasis.first().map(|q| q.value.raw.as_str()), Some("a"));
        assert_eq!(error(r"`\unicode`"), Diagnostic::InvalidTemplateEscape);

        let Expression::TaggedTemplate(tagged) = expr(r"tag`\unicode`") else {
            panic!("tagged template");
        };
        assert_eq!(tagged.quasi.quasis.first().and_then(|q| q.value.cooked.clone()), None);
    }

    #[test]
    fn test_regexp_after_operator() {
        let Expression::Binary(binary) = expr("a / /b/g") else {
            panic!("expected division");
        };
        assert!(matches!(
            &binary.right,
            Expression::Literal(lit) if matches!(&lit.value, LiteralValue::RegExp { flags, .. } if flags == "g")
        ));
    }

    #[test]
    fn test_arrows() {
        assert!(matches!(expr("x => x"), Expression::Arrow(_)));
        let Expression::Arrow(arrow) = expr("(a, [b], {c} = {}, ...d) => {}") else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.params.len(), 4);
        assert!(matches!(arrow.params.last(), Some(Pattern::Rest(_))));

        let Expression::Arrow(arrow) = expr("async (a) => await a") else {
            panic!("expected async arrow");
        };
        assert!(arrow.async_);
        assert!(arrow.expression);
    }

    #[test]
    fn test_arrow_parameter_errors() {
        assert_eq!(error("(a, b) \n => 1"), Diagnostic::LineBreakBeforeArrow);
        assert_eq!(error("(...a, b) => 1"), Diagnostic::RestNotLast);
        assert_eq!(error("(a + b) => 1"), Diagnostic::InvalidArrowParameters);
        assert_eq!(error("((a)) => 1"), Diagnostic::InvalidArrowParameters);
        assert_eq!(error("async (await) => 1"), Diagnostic::ReservedWord("await".into()));
        assert_eq!(
            error("function* g() { (a = yield) => 1 }"),
            Diagnostic::YieldInParameters
        );
    }

    #[test]
    fn test_async_call_stays_a_call() {
        let Expression::Call(call) = expr("async(a, b)") else {
            panic!("expected call");
        };
        assert!(matches!(&call.callee, Expression::Identifier(id) if id.name == "async"));
    }

    #[test]
    fn test_parenthesized_is_preserved() {
        let Expression::Parenthesized(paren) = expr("(a, b)") else {
            panic!("expected parenthesized");
        };
        assert!(matches!(paren.expression, Expression::Sequence(_)));
        assert!(matches!(error("(a,)"), Diagnostic::UnexpectedToken(_)));
        assert!(matches!(error("()"), Diagnostic::Expected { .. } | Diagnostic::UnexpectedEof));
    }

    #[test]
    fn test_update_targets() {
        assert!(matches!(expr("a.b++"), Expression::Update(_)));
        assert_eq!(error("++a()"), Diagnostic::InvalidUpdateTarget("prefix"));
        assert_eq!(error("1--"), Diagnostic::InvalidUpdateTarget("postfix"));
    }

    #[test]
    fn test_delete_rules() {
        assert!(matches!(expr("delete x"), Expression::Unary(_)));
        assert_eq!(error("'use strict'; delete x"), Diagnostic::StrictDelete);
        assert_eq!(error("'use strict'; delete ((x))"), Diagnostic::StrictDelete);
        assert_eq!(
            error("class A { #x; m() { delete this.#x } }"),
            Diagnostic::DeletePrivateField
        );
    }

    #[test]
    fn test_private_in() {
        let Ok(_) = parse_with("class A { #x; m(o) { return #x in o } }", SourceType::Script) else {
            panic!("#x in o");
        };
        assert!(matches!(
            error("class A { #x; m(o) { return #x + 1 } }"),
            Diagnostic::UnexpectedToken(_)
        ));
    }

    #[test]
    fn test_super_rules() {
        assert_eq!(error("function f() { super.x }"), Diagnostic::InvalidSuperProperty);
        assert_eq!(error("class A { constructor() { super() } }"), Diagnostic::InvalidSuperCall);
        let Ok(_) = parse_with(
            "class A extends B { constructor() { super(); super.x; } }",
            SourceType::Script,
        ) else {
            panic!("super in a derived constructor");
        };
    }

    #[test]
    fn test_import_expressions() {
        assert!(matches!(expr("import('a')"), Expression::Import(_)));
        assert_eq!(error("import()"), Diagnostic::InvalidImportCall);
        assert_eq!(error("import.meta"), Diagnostic::ImportMetaOutsideModule);
        assert_eq!(
            error("import('a', {})"),
            Diagnostic::StagedSyntaxDisabled("import attributes")
        );
        let Ok(_) = parse_with("import.meta.url", SourceType::Module) else {
            panic!("import.meta in a module");
        };
    }

    #[test]
    fn test_await_and_yield() {
        let Ok(_) = parse_with("async function f() { await x; }", SourceType::Script) else {
            panic!("await in async function");
        };
        let Ok(_) = parse_with("await x;", SourceType::Module) else {
            panic!("top-level await in module");
        };
        let Ok(_) = parse_with("function* g() { yield; yield* a; yield\nb }", SourceType::Script) else {
            panic!("yield forms");
        };
        assert!(matches!(expr("await"), Expression::Identifier(_)));
    }
}
