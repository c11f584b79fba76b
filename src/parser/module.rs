//! `import` and `export` declarations

use super::Parser;
use crate::ast::*;
use crate::context::{Context, Labels, StatementPosition};
use crate::error::{Diagnostic, Result};
use crate::lexer::TokenKind;
use crate::scope::BindingKind;
use crate::span::Span;
use crate::validator::{self, IdentifierUse};
use rustc_hash::FxHashSet;

impl<'a> Parser<'a> {
    /// One item of a module body: an import or export declaration, or any
    /// statement
    pub(super) fn parse_module_item(&mut self, ctx: Context) -> Result<Statement> {
        let start = self.start();
        match self.current.kind {
            TokenKind::Import => {
                let next = self.peek()?;
                if matches!(next.kind, TokenKind::LParen | TokenKind::Dot) {
                    return self.parse_statement(ctx, &Labels::root(), StatementPosition::List);
                }
                self.parse_import_declaration(ctx)
            }
            TokenKind::Export => self.parse_export(ctx, start, Vec::new()),
            TokenKind::At => {
                let decorators = self.parse_decorators(ctx)?;
                if self.check(&TokenKind::Export) {
                    return self.parse_export(ctx, start, decorators);
                }
                let class = self.parse_class(ctx, start, ClassType::ClassDeclaration, decorators)?;
                Ok(Statement::Class(Box::new(class)))
            }
            _ => self.parse_statement(ctx, &Labels::root(), StatementPosition::List),
        }
    }

    // ============ IMPORT ============

    fn parse_import_declaration(&mut self, ctx: Context) -> Result<Statement> {
        let start = self.start();
        self.expect(&TokenKind::Import)?;

        let mut specifiers = Vec::new();
        if !matches!(self.current.kind, TokenKind::String(_)) {
            if matches!(self.current.kind, TokenKind::Identifier(_)) {
                let local = self.parse_import_binding(ctx)?;
                specifiers.push(ImportSpecifierKind::Default(Box::new(ImportDefaultSpecifier {
                    span: local.span,
                    local,
                })));
                if self.eat(&TokenKind::Comma)? && !matches!(self.current.kind, TokenKind::Star | TokenKind::LBrace) {
                    return Err(self.unexpected());
                }
            }
            match self.current.kind {
                TokenKind::Star => {
                    let namespace_start = self.start();
                    self.advance()?;
                    self.expect_contextual("as")?;
                    let local = self.parse_import_binding(ctx)?;
                    specifiers.push(ImportSpecifierKind::Namespace(Box::new(ImportNamespaceSpecifier {
                        span: self.finish(namespace_start),
                        local,
                    })));
                }
                TokenKind::LBrace => self.parse_named_imports(ctx, &mut specifiers)?,
                _ if specifiers.is_empty() => return Err(self.unexpected()),
                _ => {}
            }
            self.expect_contextual("from")?;
        }

        let source = self.parse_module_source(ctx)?;
        let attributes = self.parse_import_attributes(ctx)?;
        self.consume_semicolon()?;
        Ok(Statement::Import(Box::new(ImportDeclaration {
            span: self.finish(start),
            specifiers,
            source,
            attributes,
        })))
    }

    /// `{ a, b as c, "d" as e }`
    fn parse_named_imports(&mut self, ctx: Context, specifiers: &mut Vec<ImportSpecifierKind>) -> Result<()> {
        self.expect(&TokenKind::LBrace)?;
        while !self.check(&TokenKind::RBrace) {
            let start = self.start();
            let imported_token = self.current.clone();
            let imported = self.parse_module_export_name(ctx)?;
            let local = if self.at_contextual("as") {
                self.advance()?;
                self.parse_import_binding(ctx)?
            } else {
                if let ModuleExportName::String(_) = imported {
                    return Err(self.expected("as"));
                }
                let local = self.identifier_from_token(&imported_token, ctx, IdentifierUse::LexicalBinding)?;
                self.declare_name(&local, BindingKind::Lexical)?;
                local
            };
            specifiers.push(ImportSpecifierKind::Named(Box::new(ImportSpecifier {
                span: self.finish(start),
                imported,
                local,
            })));
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.advance()?;
        Ok(())
    }

    /// Local name bound by an import; imports are lexical declarations
    fn parse_import_binding(&mut self, ctx: Context) -> Result<Identifier> {
        let local = self.parse_binding_identifier(ctx, IdentifierUse::LexicalBinding)?;
        self.declare_name(&local, BindingKind::Lexical)?;
        Ok(local)
    }

    /// Identifier name or string literal in an import/export list
    fn parse_module_export_name(&mut self, ctx: Context) -> Result<ModuleExportName> {
        if let TokenKind::String(_) = self.current.kind {
            return Ok(ModuleExportName::String(self.parse_literal(ctx)?));
        }
        let span = self.builder.restamp(self.current.span);
        let Some(name) = self.current.kind.identifier_name() else {
            return Err(self.unexpected());
        };
        let name = name.to_string();
        self.advance()?;
        Ok(ModuleExportName::Identifier(Identifier { span, name }))
    }

    fn parse_module_source(&mut self, ctx: Context) -> Result<Literal> {
        if !matches!(self.current.kind, TokenKind::String(_)) {
            return Err(self.expected("module specifier"));
        }
        self.parse_literal(ctx)
    }

    /// `with { type: "json" }` after a module specifier
    fn parse_import_attributes(&mut self, ctx: Context) -> Result<Vec<ImportAttribute>> {
        if !self.check(&TokenKind::With) {
            return Ok(Vec::new());
        }
        if !self.options.next {
            return Err(self.error_at(
                Diagnostic::StagedSyntaxDisabled("import attributes"),
                self.current.span,
            ));
        }
        self.advance()?;
        self.expect(&TokenKind::LBrace)?;
        let mut attributes = Vec::new();
        let mut keys = FxHashSet::default();
        while !self.check(&TokenKind::RBrace) {
            let start = self.start();
            let key = self.parse_module_export_name(ctx)?;
            if !keys.insert(key.name().to_string()) {
                return Err(self.error_at(
                    Diagnostic::DuplicateImportAttribute(key.name().to_string()),
                    key.span(),
                ));
            }
            self.expect(&TokenKind::Colon)?;
            if !matches!(self.current.kind, TokenKind::String(_)) {
                return Err(self.expected("string"));
            }
            let value = self.parse_literal(ctx)?;
            attributes.push(ImportAttribute {
                span: self.finish(start),
                key,
                value,
            });
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.advance()?;
        Ok(attributes)
    }

    // ============ EXPORT ============

    /// `export ...`. `decorators` were written before `export` and apply to
    /// the exported class.
    fn parse_export(&mut self, ctx: Context, start: usize, decorators: Vec<Decorator>) -> Result<Statement> {
        self.expect(&TokenKind::Export)?;
        let takes_class = matches!(
            self.current.kind,
            TokenKind::Class | TokenKind::At | TokenKind::Default
        );
        if !decorators.is_empty() && !takes_class {
            return Err(self.unexpected());
        }

        match self.current.kind {
            TokenKind::Star => self.parse_export_all(ctx, start),
            TokenKind::Default => self.parse_export_default(ctx, start, decorators),
            TokenKind::LBrace => self.parse_export_list(ctx, start),
            _ => self.parse_export_declaration(ctx, start, decorators),
        }
    }

    fn register_export(&mut self, name: &str, span: Span) -> Result<()> {
        let result = self.exports.export(name, span);
        self.validate(result)
    }

    /// `export * from "m"` and `export * as ns from "m"`
    fn parse_export_all(&mut self, ctx: Context, start: usize) -> Result<Statement> {
        self.expect(&TokenKind::Star)?;
        let exported = if self.at_contextual("as") {
            self.advance()?;
            Some(self.parse_module_export_name(ctx)?)
        } else {
            None
        };
        self.expect_contextual("from")?;
        let source = self.parse_module_source(ctx)?;
        let attributes = self.parse_import_attributes(ctx)?;
        self.consume_semicolon()?;
        if let Some(name) = &exported {
            self.register_export(name.name(), name.span())?;
        }
        Ok(Statement::ExportAll(Box::new(ExportAllDeclaration {
            span: self.finish(start),
            exported,
            source,
            attributes,
        })))
    }

    fn parse_export_default(&mut self, ctx: Context, start: usize, mut decorators: Vec<Decorator>) -> Result<Statement> {
        let keyword = self.expect(&TokenKind::Default)?;
        let item_start = self.start();

        let is_async_function = if self.at_contextual("async") {
            let next = self.peek()?;
            next.kind == TokenKind::Function && !next.newline_before()
        } else {
            false
        };
        let class_follows = matches!(self.current.kind, TokenKind::Class | TokenKind::At);
        if !decorators.is_empty() && !class_follows {
            return Err(self.unexpected());
        }

        let declaration = if self.check(&TokenKind::Function) || is_async_function {
            if is_async_function {
                self.advance()?;
            }
            let function = self.parse_function_declaration(ctx, item_start, is_async_function, false)?;
            ExportDefaultKind::Function(Box::new(function))
        } else if class_follows {
            decorators.extend(self.parse_decorators(ctx)?);
            let class_start = if decorators.is_empty() { item_start } else { start };
            let class = self.parse_class_with_name(ctx, class_start, ClassType::ClassDeclaration, decorators, false)?;
            ExportDefaultKind::Class(Box::new(class))
        } else {
            let expression = self.parse_assignment(ctx.with_in(true))?;
            self.consume_semicolon()?;
            ExportDefaultKind::Expression(expression)
        };

        self.register_export("default", self.builder.restamp(keyword.span))?;
        Ok(Statement::ExportDefault(Box::new(ExportDefaultDeclaration {
            span: self.finish(start),
            declaration,
        })))
    }

    /// `export { a, b as c }` with an optional `from` clause
    fn parse_export_list(&mut self, ctx: Context, start: usize) -> Result<Statement> {
        self.expect(&TokenKind::LBrace)?;
        let mut specifiers = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let specifier_start = self.start();
            let local = self.parse_module_export_name(ctx)?;
            let exported = if self.at_contextual("as") {
                self.advance()?;
                self.parse_module_export_name(ctx)?
            } else {
                local.clone()
            };
            specifiers.push(ExportSpecifier {
                span: self.finish(specifier_start),
                local,
                exported,
            });
            if !self.check(&TokenKind::RBrace) {
                self.expect(&TokenKind::Comma)?;
            }
        }
        self.advance()?;

        let (source, attributes) = if self.at_contextual("from") {
            self.advance()?;
            let source = self.parse_module_source(ctx)?;
            (Some(source), self.parse_import_attributes(ctx)?)
        } else {
            (None, Vec::new())
        };
        self.consume_semicolon()?;

        if source.is_none() {
            // without `from` the list names local bindings
            for specifier in &specifiers {
                match &specifier.local {
                    ModuleExportName::String(literal) => {
                        return Err(self.error_at(Diagnostic::StringExportWithoutFrom, literal.span));
                    }
                    ModuleExportName::Identifier(ident) => {
                        if validator::is_reserved_word(&ident.name) {
                            return Err(self.error_at(Diagnostic::ReservedWord(ident.name.clone()), ident.span));
                        }
                        self.validate(validator::check_identifier(
                            &ident.name,
                            ident.span,
                            ctx,
                            IdentifierUse::Reference,
                        ))?;
                        self.exports.require_local(&ident.name, ident.span);
                    }
                }
            }
        }
        for specifier in &specifiers {
            self.register_export(specifier.exported.name(), specifier.exported.span())?;
        }

        Ok(Statement::ExportNamed(Box::new(ExportNamedDeclaration {
            span: self.finish(start),
            declaration: None,
            specifiers,
            source,
            attributes,
        })))
    }

    /// `export var|let|const|function|async function|class ...`
    fn parse_export_declaration(&mut self, ctx: Context, start: usize, mut decorators: Vec<Decorator>) -> Result<Statement> {
        let item_start = self.start();
        let declaration = match &self.current.kind {
            TokenKind::Var => self.parse_variable_statement(ctx, VariableKind::Var)?,
            TokenKind::Const => self.parse_variable_statement(ctx, VariableKind::Const)?,
            TokenKind::Identifier(name) if name == "let" && !self.current.is_escaped() => {
                self.parse_variable_statement(ctx, VariableKind::Let)?
            }
            TokenKind::Function => {
                let function = self.parse_function_declaration(ctx, item_start, false, true)?;
                Statement::Function(Box::new(function))
            }
            TokenKind::Identifier(name) if name == "async" && !self.current.is_escaped() => {
                let next = self.peek()?;
                if next.kind != TokenKind::Function || next.newline_before() {
                    return Err(self.unexpected());
                }
                self.advance()?;
                let function = self.parse_function_declaration(ctx, item_start, true, true)?;
                Statement::Function(Box::new(function))
            }
            TokenKind::Class | TokenKind::At => {
                decorators.extend(self.parse_decorators(ctx)?);
                let class_start = if decorators.is_empty() { item_start } else { start };
                let class = self.parse_class(ctx, class_start, ClassType::ClassDeclaration, decorators)?;
                Statement::Class(Box::new(class))
            }
            _ => return Err(self.unexpected()),
        };

        let names: Vec<(String, Span)> = match &declaration {
            Statement::Variable(variable) => variable
                .declarations
                .iter()
                .flat_map(|declarator| declarator.id.bound_names())
                .map(|ident| (ident.name.clone(), ident.span))
                .collect(),
            Statement::Function(function) => function.id.iter().map(|id| (id.name.clone(), id.span)).collect(),
            Statement::Class(class) => class.id.iter().map(|id| (id.name.clone(), id.span)).collect(),
            _ => Vec::new(),
        };
        for (name, span) in names {
            self.register_export(&name, span)?;
        }

        Ok(Statement::ExportNamed(Box::new(ExportNamedDeclaration {
            span: self.finish(start),
            declaration: Some(declaration),
            specifiers: Vec::new(),
            source: None,
            attributes: Vec::new(),
        })))
    }
}
