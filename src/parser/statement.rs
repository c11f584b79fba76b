//! Statements and declarations

use super::Parser;
use crate::ast::*;
use crate::context::{Context, Labels, StatementPosition};
use crate::error::{Diagnostic, Result};
use crate::lexer::TokenKind;
use crate::options::SourceType;
use crate::scope::{BindingKind, ScopeFlags};
use crate::validator::IdentifierUse;
use crate::web_compat::WebCompatRule;

impl<'a> Parser<'a> {
    /// Parse one statement or declaration. `position` says whether it sits
    /// in a statement list or is the lone body of `if`, a loop or a label.
    pub(super) fn parse_statement(
        &mut self,
        ctx: Context,
        labels: &Labels<'_>,
        position: StatementPosition,
    ) -> Result<Statement> {
        self.nested(|parser| parser.parse_statement_inner(ctx, labels, position))
    }

    fn parse_statement_inner(
        &mut self,
        ctx: Context,
        labels: &Labels<'_>,
        position: StatementPosition,
    ) -> Result<Statement> {
        let start = self.start();
        let single = position.is_single_statement();
        match &self.current.kind {
            TokenKind::LBrace => Ok(Statement::Block(Box::new(self.parse_block_statement(ctx, labels)?))),
            TokenKind::Semicolon => {
                let token = self.advance()?;
                Ok(Statement::Empty(Box::new(EmptyStatement {
                    span: self.builder.restamp(token.span),
                })))
            }
            TokenKind::Var => self.parse_variable_statement(ctx, VariableKind::Var),
            TokenKind::Const => {
                if single {
                    return Err(self.error_at(
                        Diagnostic::DeclarationInStatementPosition("lexical"),
                        self.current.span,
                    ));
                }
                self.parse_variable_statement(ctx, VariableKind::Const)
            }
            TokenKind::Function => self.parse_function_statement(ctx, start, false, position),
            TokenKind::Class | TokenKind::At => {
                if single {
                    return Err(self.error_at(
                        Diagnostic::DeclarationInStatementPosition("class"),
                        self.current.span,
                    ));
                }
                let decorators = self.parse_decorators(ctx)?;
                let class = self.parse_class(ctx, start, ClassType::ClassDeclaration, decorators)?;
                Ok(Statement::Class(Box::new(class)))
            }
            TokenKind::If => self.parse_if(ctx, labels),
            TokenKind::While => self.parse_while(ctx, labels),
            TokenKind::Do => self.parse_do_while(ctx, labels),
            TokenKind::For => self.parse_for(ctx, labels),
            TokenKind::Continue => self.parse_continue(ctx, labels),
            TokenKind::Break => self.parse_break(ctx, labels),
            TokenKind::Return => self.parse_return(ctx),
            TokenKind::With => self.parse_with(ctx, labels),
            TokenKind::Switch => self.parse_switch(ctx, labels),
            TokenKind::Throw => self.parse_throw(ctx),
            TokenKind::Try => self.parse_try(ctx, labels),
            TokenKind::Debugger => {
                self.advance()?;
                self.consume_semicolon()?;
                Ok(Statement::Debugger(Box::new(DebuggerStatement {
                    span: self.finish(start),
                })))
            }
            TokenKind::Import => {
                let next = self.peek()?;
                if matches!(next.kind, TokenKind::LParen | TokenKind::Dot) {
                    self.parse_expression_statement(ctx)
                } else {
                    Err(self.error_at(Diagnostic::ModuleItemOutsideModule, self.current.span))
                }
            }
            TokenKind::Export => Err(self.error_at(Diagnostic::ModuleItemOutsideModule, self.current.span)),
            TokenKind::Identifier(name) if name == "let" && !self.current.is_escaped() => {
                if !self.let_starts_declaration(single)? {
                    return self.parse_expression_statement(ctx);
                }
                if single {
                    return Err(self.error_at(
                        Diagnostic::DeclarationInStatementPosition("lexical"),
                        self.current.span,
                    ));
                }
                self.parse_variable_statement(ctx, VariableKind::Let)
            }
            TokenKind::Identifier(name) if name == "async" && !self.current.is_escaped() => {
                let next = self.peek()?;
                if next.kind == TokenKind::Function && !next.newline_before() {
                    if single {
                        return Err(self.error_at(
                            Diagnostic::DeclarationInStatementPosition("async function"),
                            self.current.span,
                        ));
                    }
                    self.advance()?;
                    let function = self.parse_function_declaration(ctx, start, true, true)?;
                    return Ok(Statement::Function(Box::new(function)));
                }
                self.parse_identifier_statement(ctx, labels, position)
            }
            TokenKind::Identifier(_) => self.parse_identifier_statement(ctx, labels, position),
            _ => self.parse_expression_statement(ctx),
        }
    }

    /// `let` followed by `[` always starts a declaration. Followed by `{` or
    /// a name it does too, except that in a single-statement position a
    /// line break in between leaves `let` an identifier.
    fn let_starts_declaration(&mut self, single: bool) -> Result<bool> {
        let next = self.peek()?;
        Ok(match next.kind {
            TokenKind::LBracket => true,
            TokenKind::LBrace | TokenKind::Identifier(_) => !(single && next.newline_before()),
            _ => false,
        })
    }

    /// A statement starting with a plain identifier: a label or an expression
    fn parse_identifier_statement(
        &mut self,
        ctx: Context,
        labels: &Labels<'_>,
        position: StatementPosition,
    ) -> Result<Statement> {
        if self.peek()?.kind == TokenKind::Colon {
            return self.parse_labelled(ctx, labels, position);
        }
        self.parse_expression_statement(ctx)
    }

    fn parse_expression_statement(&mut self, ctx: Context) -> Result<Statement> {
        let start = self.start();
        let expression = self.parse_expression(ctx.with_in(true))?;
        self.consume_semicolon()?;
        Ok(Statement::Expression(Box::new(ExpressionStatement {
            span: self.finish(start),
            expression,
            directive: None,
        })))
    }

    // ============ BLOCKS AND DECLARATIONS ============

    pub(super) fn parse_block_statement(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<BlockStatement> {
        self.scopes.enter(ScopeFlags::empty());
        let block = self.parse_block_body(ctx, labels)?;
        self.scopes.exit();
        Ok(block)
    }

    /// `{ ... }` in the scope that is already current
    fn parse_block_body(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<BlockStatement> {
        let start = self.start();
        self.expect(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            body.push(self.parse_statement(ctx, labels, StatementPosition::List)?);
        }
        self.advance()?;
        Ok(BlockStatement {
            span: self.finish(start),
            body,
        })
    }

    /// `var`, `let` or `const` statement, keyword included
    pub(super) fn parse_variable_statement(&mut self, ctx: Context, kind: VariableKind) -> Result<Statement> {
        let mut declaration = self.parse_variable_declaration(ctx.with_in(true), kind, false)?;
        self.consume_semicolon()?;
        declaration.span = self.finish(declaration.span.start);
        Ok(Statement::Variable(Box::new(declaration)))
    }

    fn parse_variable_declaration(
        &mut self,
        ctx: Context,
        kind: VariableKind,
        in_for_head: bool,
    ) -> Result<VariableDeclaration> {
        let start = self.start();
        self.advance()?;
        let declarations = self.parse_declarators(ctx, kind, in_for_head)?;
        Ok(VariableDeclaration {
            span: self.finish(start),
            declarations,
            kind,
        })
    }

    /// `a = 1, [b] = c`. In a for head the initializer check waits until it
    /// is known whether the loop is a for-in/of.
    fn parse_declarators(
        &mut self,
        ctx: Context,
        kind: VariableKind,
        in_for_head: bool,
    ) -> Result<Vec<VariableDeclarator>> {
        let (usage, binding) = match kind {
            VariableKind::Var => (IdentifierUse::Binding, BindingKind::Var),
            VariableKind::Let | VariableKind::Const => (IdentifierUse::LexicalBinding, BindingKind::Lexical),
        };
        let mut declarations = Vec::new();
        loop {
            let start = self.start();
            let id = self.parse_binding_target(ctx, usage)?;
            for name in id.bound_names() {
                self.declare_name(name, binding)?;
            }
            let init = if self.eat(&TokenKind::Eq)? {
                Some(self.parse_assignment(ctx)?)
            } else {
                None
            };
            let declarator = VariableDeclarator {
                span: self.finish(start),
                id,
                init,
            };
            if !in_for_head {
                self.check_missing_initializer(kind, &declarator)?;
            }
            declarations.push(declarator);
            if !self.eat(&TokenKind::Comma)? {
                return Ok(declarations);
            }
        }
    }

    fn check_missing_initializer(&self, kind: VariableKind, declarator: &VariableDeclarator) -> Result<()> {
        if declarator.init.is_some() {
            return Ok(());
        }
        if kind == VariableKind::Const {
            return Err(self.error_at(Diagnostic::MissingInitializer("const"), declarator.span));
        }
        if !matches!(declarator.id, Pattern::Identifier(_)) {
            return Err(self.error_at(Diagnostic::MissingInitializer("destructuring"), declarator.span));
        }
        Ok(())
    }

    /// `function` in statement position. Outside statement lists only plain
    /// functions are allowed, and only where a legacy rule permits them.
    fn parse_function_statement(
        &mut self,
        ctx: Context,
        start: usize,
        is_async: bool,
        position: StatementPosition,
    ) -> Result<Statement> {
        if position.is_single_statement() {
            if self.peek()?.kind == TokenKind::Star {
                return Err(self.error_at(
                    Diagnostic::DeclarationInStatementPosition("generator"),
                    self.current.span,
                ));
            }
            let allowed = match position {
                StatementPosition::Label => {
                    if !self.web_compat.allows(WebCompatRule::LabelledFunction, ctx) {
                        return Err(self.error_at(Diagnostic::LabelledFunction, self.current.span));
                    }
                    true
                }
                StatementPosition::If => self.web_compat.allows(WebCompatRule::IfFunctionDeclaration, ctx),
                _ => false,
            };
            if !allowed {
                return Err(self.error_at(Diagnostic::FunctionInStatementPosition, self.current.span));
            }
        }

        // `if (x) function f() {}` behaves as if the function sat in a block
        let own_scope = position == StatementPosition::If;
        if own_scope {
            self.scopes.enter(ScopeFlags::empty());
        }
        let function = self.parse_function_declaration(ctx, start, is_async, true)?;
        if own_scope {
            self.scopes.exit();
        }
        Ok(Statement::Function(Box::new(function)))
    }

    // ============ CONTROL FLOW ============

    fn parse_if(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        self.advance()?;
        let test = self.parse_parenthesized_condition(ctx)?;
        let consequent = self.parse_statement(ctx, labels, StatementPosition::If)?;
        let alternate = if self.eat(&TokenKind::Else)? {
            Some(self.parse_statement(ctx, labels, StatementPosition::If)?)
        } else {
            None
        };
        Ok(Statement::If(Box::new(IfStatement {
            span: self.finish(start),
            test,
            consequent,
            alternate,
        })))
    }

    fn parse_parenthesized_condition(&mut self, ctx: Context) -> Result<Expression> {
        self.expect(&TokenKind::LParen)?;
        let test = self.parse_expression(ctx.with_in(true))?;
        self.expect(&TokenKind::RParen)?;
        Ok(test)
    }

    fn parse_while(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        self.advance()?;
        let test = self.parse_parenthesized_condition(ctx)?;
        let body = self.parse_statement(ctx.enter_breakable(true), labels, StatementPosition::Loop)?;
        Ok(Statement::While(Box::new(WhileStatement {
            span: self.finish(start),
            test,
            body,
        })))
    }

    fn parse_do_while(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        self.advance()?;
        let body = self.parse_statement(ctx.enter_breakable(true), labels, StatementPosition::Loop)?;
        self.expect(&TokenKind::While)?;
        let test = self.parse_parenthesized_condition(ctx)?;
        // the `;` after `do ... while (x)` is always optional
        self.eat(&TokenKind::Semicolon)?;
        Ok(Statement::DoWhile(Box::new(DoWhileStatement {
            span: self.finish(start),
            body,
            test,
        })))
    }

    fn parse_continue(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        let keyword = self.advance()?;
        let label = self.parse_jump_label(ctx)?;
        match &label {
            Some(label) => match labels.is_iteration_label(&label.name) {
                None => return Err(self.error_at(Diagnostic::UndefinedLabel(label.name.clone()), label.span)),
                Some(false) => {
                    return Err(self.error_at(Diagnostic::IllegalContinueLabel(label.name.clone()), label.span));
                }
                Some(true) => {}
            },
            None if !ctx.contains(Context::IN_ITERATION) => {
                return Err(self.error_at(Diagnostic::IllegalContinue, keyword.span));
            }
            None => {}
        }
        self.consume_semicolon()?;
        Ok(Statement::Continue(Box::new(ContinueStatement {
            span: self.finish(start),
            label,
        })))
    }

    fn parse_break(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        let keyword = self.advance()?;
        let label = self.parse_jump_label(ctx)?;
        match &label {
            Some(label) if !labels.contains(&label.name) => {
                return Err(self.error_at(Diagnostic::UndefinedLabel(label.name.clone()), label.span));
            }
            None if !ctx.intersects(Context::IN_ITERATION | Context::IN_SWITCH) => {
                return Err(self.error_at(Diagnostic::IllegalBreak, keyword.span));
            }
            _ => {}
        }
        self.consume_semicolon()?;
        Ok(Statement::Break(Box::new(BreakStatement {
            span: self.finish(start),
            label,
        })))
    }

    /// Label of `break`/`continue`, which must be on the same line
    fn parse_jump_label(&mut self, ctx: Context) -> Result<Option<Identifier>> {
        if self.current.newline_before() || !matches!(self.current.kind, TokenKind::Identifier(_)) {
            return Ok(None);
        }
        Ok(Some(self.parse_identifier_reference(ctx)?))
    }

    fn parse_return(&mut self, ctx: Context) -> Result<Statement> {
        let start = self.start();
        let keyword = self.advance()?;
        let global = self.options.global_return
            && self.source_type == SourceType::Script
            && ctx.is_top_level();
        if !ctx.in_function() && !global {
            return Err(self.error_at(Diagnostic::IllegalReturn, keyword.span));
        }
        let argument = if self.current.newline_before()
            || matches!(
                self.current.kind,
                TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
            ) {
            None
        } else {
            Some(self.parse_expression(ctx.with_in(true))?)
        };
        self.consume_semicolon()?;
        Ok(Statement::Return(Box::new(ReturnStatement {
            span: self.finish(start),
            argument,
        })))
    }

    fn parse_with(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        if ctx.is_strict() {
            return Err(self.error_at(Diagnostic::StrictWith, self.current.span));
        }
        self.advance()?;
        let object = self.parse_parenthesized_condition(ctx)?;
        let body = self.parse_statement(ctx, labels, StatementPosition::With)?;
        Ok(Statement::With(Box::new(WithStatement {
            span: self.finish(start),
            object,
            body,
        })))
    }

    fn parse_switch(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        self.advance()?;
        let discriminant = self.parse_parenthesized_condition(ctx)?;
        self.expect(&TokenKind::LBrace)?;

        self.scopes.enter(ScopeFlags::empty());
        let case_ctx = ctx.enter_breakable(false);
        let mut cases = Vec::new();
        let mut has_default = false;
        while !self.eat(&TokenKind::RBrace)? {
            let case_start = self.start();
            let test = match self.current.kind {
                TokenKind::Case => {
                    self.advance()?;
                    Some(self.parse_expression(ctx.with_in(true))?)
                }
                TokenKind::Default => {
                    if has_default {
                        return Err(self.error_at(Diagnostic::MultipleDefaults, self.current.span));
                    }
                    has_default = true;
                    self.advance()?;
                    None
                }
                _ => return Err(self.expected("case")),
            };
            self.expect(&TokenKind::Colon)?;
            let mut consequent = Vec::new();
            while !matches!(
                self.current.kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace
            ) {
                consequent.push(self.parse_statement(case_ctx, labels, StatementPosition::List)?);
            }
            cases.push(SwitchCase {
                span: self.finish(case_start),
                test,
                consequent,
            });
        }
        self.scopes.exit();

        Ok(Statement::Switch(Box::new(SwitchStatement {
            span: self.finish(start),
            discriminant,
            cases,
        })))
    }

    fn parse_throw(&mut self, ctx: Context) -> Result<Statement> {
        let start = self.start();
        self.advance()?;
        if self.current.newline_before() {
            return Err(self.error_at(Diagnostic::NewlineAfterThrow, self.current.span));
        }
        let argument = self.parse_expression(ctx.with_in(true))?;
        self.consume_semicolon()?;
        Ok(Statement::Throw(Box::new(ThrowStatement {
            span: self.finish(start),
            argument,
        })))
    }

    fn parse_try(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        let keyword = self.advance()?;
        let block = self.parse_block_statement(ctx, labels)?;

        let handler = if self.check(&TokenKind::Catch) {
            Some(self.parse_catch(ctx, labels)?)
        } else {
            None
        };
        let finalizer = if self.eat(&TokenKind::Finally)? {
            Some(self.parse_block_statement(ctx, labels)?)
        } else {
            None
        };
        if handler.is_none() && finalizer.is_none() {
            return Err(self.error_at(Diagnostic::MissingCatchOrFinally, keyword.span));
        }
        Ok(Statement::Try(Box::new(TryStatement {
            span: self.finish(start),
            block,
            handler,
            finalizer,
        })))
    }

    /// `catch (param) { ... }`. The parameter and the block share a scope.
    fn parse_catch(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<CatchClause> {
        let start = self.start();
        self.advance()?;
        let param = if self.eat(&TokenKind::LParen)? {
            let param = if matches!(self.current.kind, TokenKind::Identifier(_)) {
                self.scopes.enter(ScopeFlags::SIMPLE_CATCH);
                let ident = self.parse_binding_identifier(ctx, IdentifierUse::Binding)?;
                self.declare_name(&ident, BindingKind::SimpleCatch)?;
                Pattern::Identifier(Box::new(ident))
            } else {
                self.scopes.enter(ScopeFlags::empty());
                let pattern = self.parse_binding_target(ctx, IdentifierUse::Binding)?;
                for name in pattern.bound_names() {
                    self.declare_name(name, BindingKind::Lexical)?;
                }
                pattern
            };
            self.expect(&TokenKind::RParen)?;
            Some(param)
        } else {
            self.scopes.enter(ScopeFlags::empty());
            None
        };
        let body = self.parse_block_body(ctx, labels)?;
        self.scopes.exit();
        Ok(CatchClause {
            span: self.finish(start),
            param,
            body,
        })
    }

    // ============ LABELS ============

    fn parse_labelled(
        &mut self,
        ctx: Context,
        labels: &Labels<'_>,
        position: StatementPosition,
    ) -> Result<Statement> {
        let start = self.start();
        let label = self.parse_identifier_reference(ctx)?;
        if labels.contains(&label.name) {
            return Err(self.error_at(Diagnostic::DuplicateLabel(label.name.clone()), label.span));
        }
        self.expect(&TokenKind::Colon)?;

        let iteration = self.labels_iteration();
        let body_position = match position {
            StatementPosition::List | StatementPosition::Label => StatementPosition::Label,
            _ => StatementPosition::Loop,
        };
        let inner = labels.push(&label.name, iteration);
        let body = self.parse_statement(ctx, &inner, body_position)?;
        Ok(Statement::Labeled(Box::new(LabeledStatement {
            span: self.finish(start),
            label,
            body,
        })))
    }

    /// Whether the statement after a label (skipping further labels) is a
    /// loop, which makes the label a valid `continue` target
    fn labels_iteration(&mut self) -> bool {
        let checkpoint = self.lexer.checkpoint();
        let mut kind = self.current.kind.clone();
        let iteration = loop {
            match kind {
                TokenKind::For | TokenKind::While | TokenKind::Do => break true,
                TokenKind::Identifier(_) => {
                    let colon = self.lexer.next_token().map(|token| token.kind == TokenKind::Colon);
                    if !matches!(colon, Ok(true)) {
                        break false;
                    }
                    match self.lexer.next_token() {
                        Ok(next) => kind = next.kind,
                        Err(_) => break false,
                    }
                }
                _ => break false,
            }
        };
        self.lexer.restore(checkpoint);
        iteration
    }

    // ============ FOR ============

    fn parse_for(&mut self, ctx: Context, labels: &Labels<'_>) -> Result<Statement> {
        let start = self.start();
        self.advance()?;
        let is_await = self.at_contextual("await");
        if is_await {
            if !ctx.await_is_operator() {
                return Err(self.unexpected());
            }
            self.advance()?;
        }
        self.expect(&TokenKind::LParen)?;

        // bindings of the head are visible in the whole statement
        self.scopes.enter(ScopeFlags::empty());
        let statement = self.parse_for_head(ctx.with_in(true), labels, start, is_await)?;
        self.scopes.exit();
        Ok(statement)
    }

    fn parse_for_head(
        &mut self,
        ctx: Context,
        labels: &Labels<'_>,
        start: usize,
        is_await: bool,
    ) -> Result<Statement> {
        let head_ctx = ctx.with_in(false);

        if self.check(&TokenKind::Semicolon) {
            if is_await {
                return Err(self.expected("of"));
            }
            return self.parse_for_loop(ctx, labels, start, None);
        }

        let declaration_kind = match &self.current.kind {
            TokenKind::Var => Some(VariableKind::Var),
            TokenKind::Const => Some(VariableKind::Const),
            TokenKind::Identifier(name) if name == "let" && !self.current.is_escaped() => {
                let next = self.peek()?;
                matches!(
                    next.kind,
                    TokenKind::LBracket | TokenKind::LBrace | TokenKind::Identifier(_)
                )
                .then_some(VariableKind::Let)
            }
            _ => None,
        };

        if let Some(kind) = declaration_kind {
            let declaration = self.parse_variable_declaration(head_ctx, kind, true)?;
            if let Some(is_of) = self.for_in_of_keyword() {
                let keyword = if is_of { "of" } else { "in" };
                if is_await && !is_of {
                    return Err(self.expected("of"));
                }
                if declaration.declarations.len() != 1 {
                    return Err(self.error_at(Diagnostic::ForInOfMultipleBindings(keyword), declaration.span));
                }
                if let Some(declarator) = declaration.declarations.first() {
                    let legacy = !is_of
                        && kind == VariableKind::Var
                        && matches!(declarator.id, Pattern::Identifier(_))
                        && self.web_compat.allows(WebCompatRule::ForInVarInitializer, ctx);
                    if declarator.init.is_some() && !legacy {
                        return Err(self.error_at(Diagnostic::ForInOfInitializer(keyword), declarator.span));
                    }
                }
                let left = ForTarget::Variable(Box::new(declaration));
                return self.parse_for_in_of(ctx, labels, start, is_of, is_await, left);
            }
            for declarator in &declaration.declarations {
                self.check_missing_initializer(kind, declarator)?;
            }
            if is_await {
                return Err(self.expected("of"));
            }
            let init = ForInit::Variable(Box::new(declaration));
            return self.parse_for_loop(ctx, labels, start, Some(init));
        }

        if !is_await && self.at_contextual("async") && self.async_of_ahead() {
            return Err(self.error_at(Diagnostic::ForOfAsync, self.current.span));
        }
        let starts_with_let = self.at_contextual("let");
        let mark = self.cover.pending.len();
        let parenthesized = self.cover.parenthesized.len();
        let expr = self.parse_expression_cover(head_ctx)?;

        if let Some(is_of) = self.for_in_of_keyword() {
            let keyword = if is_of { "of" } else { "in" };
            if is_of && starts_with_let {
                return Err(self.error_at(Diagnostic::ForOfLet, expr.span()));
            }
            if is_await && !is_of {
                return Err(self.expected("of"));
            }
            let target = self.for_target(expr, ctx, keyword)?;
            self.cover.parenthesized.truncate(parenthesized);
            self.raise_pending(mark)?;
            let left = ForTarget::Pattern(target);
            return self.parse_for_in_of(ctx, labels, start, is_of, is_await, left);
        }

        self.cover.parenthesized.truncate(parenthesized);
        self.raise_pending(mark)?;
        if is_await {
            return Err(self.expected("of"));
        }
        self.parse_for_loop(ctx, labels, start, Some(ForInit::Expression(expr)))
    }

    /// `Some(false)` before `in`, `Some(true)` before `of`
    fn for_in_of_keyword(&self) -> Option<bool> {
        if self.check(&TokenKind::In) {
            Some(false)
        } else if self.at_contextual("of") {
            Some(true)
        } else {
            None
        }
    }

    /// `async of` not followed by `=>`: the start of a forbidden
    /// `for (async of ...)`
    fn async_of_ahead(&mut self) -> bool {
        let checkpoint = self.lexer.checkpoint();
        let of = self.lexer.next_token().is_ok_and(|token| token.is_contextual("of"));
        let arrow = of
            && self
                .lexer
                .next_token()
                .is_ok_and(|token| token.kind == TokenKind::Arrow);
        self.lexer.restore(checkpoint);
        of && !arrow
    }

    fn parse_for_loop(
        &mut self,
        ctx: Context,
        labels: &Labels<'_>,
        start: usize,
        init: Option<ForInit>,
    ) -> Result<Statement> {
        self.expect(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression(ctx)?)
        };
        self.expect(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression(ctx)?)
        };
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_statement(ctx.enter_breakable(true), labels, StatementPosition::Loop)?;
        Ok(Statement::For(Box::new(ForStatement {
            span: self.finish(start),
            init,
            test,
            update,
            body,
        })))
    }

    fn parse_for_in_of(
        &mut self,
        ctx: Context,
        labels: &Labels<'_>,
        start: usize,
        is_of: bool,
        is_await: bool,
        left: ForTarget,
    ) -> Result<Statement> {
        self.advance()?;
        let right = if is_of {
            self.parse_assignment(ctx)?
        } else {
            self.parse_expression(ctx)?
        };
        self.expect(&TokenKind::RParen)?;
        let body = self.parse_statement(ctx.enter_breakable(true), labels, StatementPosition::Loop)?;
        let span = self.finish(start);
        Ok(if is_of {
            Statement::ForOf(Box::new(ForOfStatement {
                span,
                await_: is_await,
                left,
                right,
                body,
            }))
        } else {
            Statement::ForIn(Box::new(ForInStatement {
                span,
                left,
                right,
                body,
            }))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::error::{Diagnostic, ParseError};
    use crate::options::{ParseOptions, SourceType};
    use crate::parser::Parser;

    fn parse_with(source: &str, options: &ParseOptions) -> Result<Program, ParseError> {
        Parser::new(source, options, options.source_type).parse_program()
    }

    fn parse(source: &str) -> Result<Program, ParseError> {
        parse_with(source, &ParseOptions::default())
    }

    fn first(source: &str) -> Statement {
        let Ok(program) = parse(source) else {
            panic!("failed to parse {source:?}");
        };
        let Some(statement) = program.body.into_iter().next() else {
            panic!("empty program");
        };
        statement
    }

    fn error(source: &str) -> Diagnostic {
        match parse(source) {
            Ok(_) => panic!("{source:?} should not parse"),
            Err(err) => err.diagnostic,
        }
    }

    #[test]
    fn test_variable_declarations() {
        let Statement::Variable(decl) = first("let a = 1, [b] = c, {d} = e;") else {
            panic!("expected declaration");
        };
        assert_eq!(decl.kind, VariableKind::Let);
        assert_eq!(decl.declarations.len(), 3);
        assert_eq!(decl.span.end, 28);
        assert_eq!(error("const a;"), Diagnostic::MissingInitializer("const"));
        assert_eq!(error("var [a];"), Diagnostic::MissingInitializer("destructuring"));
        assert_eq!(error("let let = 1;"), Diagnostic::LetInLexicalBinding);
    }

    #[test]
    fn test_redeclarations() {
        assert_eq!(error("let a; var a;"), Diagnostic::DuplicateBinding("a".into()));
        assert_eq!(error("let a; { var a; }"), Diagnostic::DuplicateBinding("a".into()));
        assert_eq!(error("const a = 1; function a() {}"), Diagnostic::DuplicateBinding("a".into()));
        let Ok(_) = parse("var a; var a; function a() {} { let a; }") else {
            panic!("var and function redeclarations are allowed");
        };
    }

    #[test]
    fn test_let_as_identifier() {
        let Statement::Expression(_) = first("let;") else {
            panic!("let alone is an identifier");
        };
        let Ok(program) = parse("if (a) let\nx = 1") else {
            panic!("let followed by a line break in an if body");
        };
        assert_eq!(program.body.len(), 2);
        assert_eq!(
            error("if (a) let [x] = 1;"),
            Diagnostic::DeclarationInStatementPosition("lexical")
        );
        assert_eq!(
            error("while (a) const b = 1;"),
            Diagnostic::DeclarationInStatementPosition("lexical")
        );
    }

    #[test]
    fn test_asi() {
        let Statement::Block(block) = first("{ a\n1 }") else {
            panic!("expected block");
        };
        assert_eq!(block.body.len(), 2);
        let Ok(program) = parse("function f() { return\n1 }") else {
            panic!("return followed by a line break");
        };
        let Some(Statement::Function(function)) = program.body.first() else {
            panic!("expected function");
        };
        assert!(matches!(
            function.body.body.first(),
            Some(Statement::Return(ret)) if ret.argument.is_none()
        ));
        assert_eq!(error("a b"), Diagnostic::MissingSemicolon);
        let Ok(_) = parse("do x; while (0) y") else {
            panic!("semicolon after do-while is optional");
        };
    }

    #[test]
    fn test_return_placement() {
        assert_eq!(error("return 1"), Diagnostic::IllegalReturn);
        let options = ParseOptions::default().with_global_return(true);
        let Ok(_) = parse_with("return 1", &options) else {
            panic!("global return");
        };
    }

    #[test]
    fn test_labels() {
        let Ok(_) = parse("a: b: while (1) { continue a; } c: { break c; }") else {
            panic!("labels");
        };
        assert_eq!(error("a: a: ;"), Diagnostic::DuplicateLabel("a".into()));
        assert_eq!(error("while (1) break b;"), Diagnostic::UndefinedLabel("b".into()));
        assert_eq!(
            error("a: { while (1) continue a; }"),
            Diagnostic::IllegalContinueLabel("a".into())
        );
        assert_eq!(error("continue;"), Diagnostic::IllegalContinue);
        assert_eq!(error("break;"), Diagnostic::IllegalBreak);
        assert_eq!(
            error("a: while (1) { function f() { break a; } }"),
            Diagnostic::UndefinedLabel("a".into())
        );
    }

    #[test]
    fn test_function_positions() {
        let Ok(_) = parse("if (a) function f() {} l: function g() {}") else {
            panic!("legacy function positions");
        };
        assert_eq!(
            error("'use strict'; if (a) function f() {}"),
            Diagnostic::FunctionInStatementPosition
        );
        assert_eq!(error("'use strict'; l: function f() {}"), Diagnostic::LabelledFunction);
        assert_eq!(error("while (a) function f() {}"), Diagnostic::FunctionInStatementPosition);
        assert_eq!(
            error("if (a) function* g() {}"),
            Diagnostic::DeclarationInStatementPosition("generator")
        );
        assert_eq!(
            error("if (a) async function f() {}"),
            Diagnostic::DeclarationInStatementPosition("async function")
        );
        assert_eq!(
            error("if (a) class C {}"),
            Diagnostic::DeclarationInStatementPosition("class")
        );
    }

    #[test]
    fn test_switch_and_try() {
        let Statement::Switch(switch) = first("switch (a) { case 1: b; default: c; case 2: }") else {
            panic!("expected switch");
        };
        assert_eq!(switch.cases.len(), 3);
        assert_eq!(
            error("switch (a) { default: default: }"),
            Diagnostic::MultipleDefaults
        );
        assert_eq!(error("try {}"), Diagnostic::MissingCatchOrFinally);
        assert_eq!(error("throw\na"), Diagnostic::NewlineAfterThrow);
        let Statement::Try(stmt) = first("try {} catch {} finally {}") else {
            panic!("expected try");
        };
        assert!(stmt.handler.as_ref().is_some_and(|handler| handler.param.is_none()));
    }

    #[test]
    fn test_catch_parameter_scope() {
        let Ok(_) = parse("try {} catch (e) { var e; }") else {
            panic!("var may redeclare a simple catch parameter");
        };
        assert_eq!(error("try {} catch (e) { let e; }"), Diagnostic::DuplicateBinding("e".into()));
        assert_eq!(error("try {} catch ([e]) { var e; }"), Diagnostic::DuplicateBinding("e".into()));
        assert_eq!(error("try {} catch ([e, e]) {}"), Diagnostic::DuplicateBinding("e".into()));
    }

    #[test]
    fn test_with() {
        let Statement::With(_) = first("with (a) b;") else {
            panic!("expected with");
        };
        assert_eq!(error("'use strict'; with (a) b;"), Diagnostic::StrictWith);
    }

    #[test]
    fn test_for_forms() {
        assert!(matches!(first("for (;;) {}"), Statement::For(_)));
        assert!(matches!(first("for (var i = 0, j; i < 1; i++) {}"), Statement::For(_)));
        assert!(matches!(first("for (const [a, b] of c) {}"), Statement::ForOf(_)));
        assert!(matches!(first("for (a.b in c) {}"), Statement::ForIn(_)));
        assert!(matches!(first("for ([a, b] of c) {}"), Statement::ForOf(_)));
        assert!(matches!(first("for (let in a) {}"), Statement::ForIn(_)));
        assert!(matches!(first("for (var a = 1 in b) {}"), Statement::ForIn(_)));
        assert!(matches!(first("for (async of => {};;) {}"), Statement::For(_)));
        assert!(matches!(first("for ((a) in b) {}"), Statement::ForIn(_)));
    }

    #[test]
    fn test_for_errors() {
        assert_eq!(error("for (let a, b of c) {}"), Diagnostic::ForInOfMultipleBindings("of"));
        assert_eq!(error("for (let a = 1 of c) {}"), Diagnostic::ForInOfInitializer("of"));
        assert_eq!(error("for (let a = 1 in c) {}"), Diagnostic::ForInOfInitializer("in"));
        assert_eq!(
            error("'use strict'; for (var a = 1 in b) {}"),
            Diagnostic::ForInOfInitializer("in")
        );
        assert_eq!(error("for (let.x of y) {}"), Diagnostic::ForOfLet);
        assert_eq!(error("for (async of x) {}"), Diagnostic::ForOfAsync);
        assert_eq!(error("for (a() of b) {}"), Diagnostic::InvalidForInOfTarget("of"));
        assert_eq!(error("for (const a;;) {}"), Diagnostic::MissingInitializer("const"));
        assert_eq!(error("for (let a;;) { var a; }"), Diagnostic::DuplicateBinding("a".into()));
    }

    #[test]
    fn test_for_await() {
        let options = ParseOptions::module();
        let Ok(program) = parse_with("for await (const a of b) {}", &options) else {
            panic!("for await at module top level");
        };
        assert!(matches!(
            program.body.first(),
            Some(Statement::ForOf(stmt)) if stmt.await_
        ));
        let Ok(_) = parse("async function f() { for await (a of b) {} }") else {
            panic!("for await in async function");
        };
        assert!(parse("function f() { for await (a of b) {} }").is_err());
        assert!(parse("async function f() { for await (a in b) {} }").is_err());
    }

    #[test]
    fn test_module_items_in_scripts() {
        assert_eq!(error("import a from 'a';"), Diagnostic::ModuleItemOutsideModule);
        assert_eq!(error("export var a;"), Diagnostic::ModuleItemOutsideModule);
        let Ok(_) = parse("import('a');") else {
            panic!("dynamic import in a script");
        };
    }
}
