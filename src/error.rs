//! Error types for the parser
//!
//! Every failure is a [`ParseError`]: a [`Diagnostic`] (the rule that was
//! violated, with a stable message) plus the span and line/column where it
//! happened. Parsing stops at the first error.

use thiserror::Error;

use crate::span::{LineIndex, Position, Span};

/// Broad class of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Malformed literal, unterminated construct, invalid character or escape
    Lexical,
    /// Unexpected or missing token, malformed production
    Grammar,
    /// Static-semantic rule violation on a well-formed production
    Early,
}

/// One variant per rule the parser enforces.
///
/// The `Display` text is stable and safe to assert on in tests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    // ============ LEXICAL ============
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated template literal")]
    UnterminatedTemplate,
    #[error("unterminated regular expression literal")]
    UnterminatedRegExp,
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("invalid or unexpected character '{}'", .0.escape_debug())]
    InvalidCharacter(char),
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid hexadecimal escape sequence")]
    InvalidHexEscape,
    #[error("invalid Unicode escape sequence")]
    InvalidUnicodeEscape,
    #[error("invalid escaped character in identifier")]
    InvalidIdentifierEscape,
    #[error("malformed numeric literal")]
    InvalidNumber,
    #[error("numeric separators are not allowed here")]
    InvalidNumericSeparator,
    #[error("identifier starts immediately after numeric literal")]
    IdentifierAfterNumber,
    #[error("invalid BigInt literal")]
    InvalidBigInt,
    #[error("invalid regular expression flag '{0}'")]
    InvalidRegExpFlag(char),
    #[error("duplicate regular expression flag '{0}'")]
    DuplicateRegExpFlag(char),
    #[error("regular expression flags 'u' and 'v' cannot be combined")]
    IncompatibleRegExpFlags,

    // ============ GRAMMAR ============
    #[error("unexpected token {0}")]
    UnexpectedToken(String),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("expected {expected} but found {found}")]
    Expected {
        expected: &'static str,
        found: String,
    },
    #[error("missing semicolon after statement")]
    MissingSemicolon,
    #[error("invalid arrow function parameters")]
    InvalidArrowParameters,
    #[error("line terminator not permitted before arrow")]
    LineBreakBeforeArrow,
    #[error("illegal newline after throw")]
    NewlineAfterThrow,
    #[error("nullish coalescing operator cannot be mixed with '&&' or '||' without parentheses")]
    MixedCoalesce,
    #[error(
        "unary operator used immediately before exponentiation expression; parentheses are required"
    )]
    UnaryBeforeExponent,
    #[error("rest element must be last element")]
    RestNotLast,
    #[error("rest element may not have a default initializer")]
    RestWithInitializer,
    #[error("rest element of an object pattern must be an identifier")]
    InvalidObjectRest,
    #[error("more than one default clause in switch statement")]
    MultipleDefaults,
    #[error("missing catch or finally after try")]
    MissingCatchOrFinally,
    #[error("for-{0} loop variable declaration may not have an initializer")]
    ForInOfInitializer(&'static str),
    #[error("only a single binding is allowed in a for-{0} loop")]
    ForInOfMultipleBindings(&'static str),
    #[error("the left-hand side of a for-of loop may not be 'async'")]
    ForOfAsync,
    #[error("the left-hand side of a for-of loop may not start with 'let'")]
    ForOfLet,
    #[error("missing initializer in {0} declaration")]
    MissingInitializer(&'static str),
    #[error("{0} declaration cannot appear in a single-statement context")]
    DeclarationInStatementPosition(&'static str),
    #[error("in strict mode code, functions can only be declared at top level or inside a block")]
    FunctionInStatementPosition,
    #[error("tagged template cannot be used in optional chain")]
    OptionalChainTemplate,
    #[error("invalid optional chain from new expression")]
    OptionalChainNew,
    #[error("invalid escape sequence in template literal")]
    InvalidTemplateEscape,
    #[error("getter must not have any formal parameters")]
    GetterArity,
    #[error("setter must have exactly one formal parameter")]
    SetterArity,
    #[error("setter parameter must not be a rest parameter")]
    SetterRest,
    #[error("'{0}' cannot be used as a shorthand property")]
    InvalidShorthandProperty(String),
    #[error("invalid shorthand property initializer")]
    CoverInitializedName,
    #[error("'import' and 'export' may only appear at the top level of a module")]
    ModuleItemOutsideModule,
    #[error("cannot use 'import.meta' outside a module")]
    ImportMetaOutsideModule,
    #[error("'{meta}.{property}' is not a valid meta property")]
    InvalidMetaProperty { meta: String, property: String },
    #[error("dynamic import requires exactly one specifier argument")]
    InvalidImportCall,
    #[error("string literal export names require a 'from' clause")]
    StringExportWithoutFrom,
    #[error("{0} are not enabled; set the `next` option to parse them")]
    StagedSyntaxDisabled(&'static str),
    #[error("keyword must not contain escaped characters")]
    EscapedKeyword,
    #[error("maximum nesting depth exceeded")]
    NestingTooDeep,

    // ============ EARLY ============
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    #[error("invalid destructuring assignment target")]
    InvalidDestructuringTarget,
    #[error("invalid left-hand side in for-{0} loop")]
    InvalidForInOfTarget(&'static str),
    #[error("invalid left-hand side expression in {0} operation")]
    InvalidUpdateTarget(&'static str),
    #[error("'{0}' cannot be used as a binding or assignment target in strict mode")]
    StrictEvalArguments(String),
    #[error("unexpected strict mode reserved word '{0}'")]
    StrictReservedWord(String),
    #[error("unexpected reserved word '{0}'")]
    ReservedWord(String),
    #[error("'let' cannot be used as a lexically bound name")]
    LetInLexicalBinding,
    #[error("octal literals are not allowed in strict mode")]
    StrictOctalLiteral,
    #[error("decimals with leading zeros are not allowed in strict mode")]
    StrictLeadingZero,
    #[error("octal escape sequences are not allowed in strict mode")]
    StrictOctalEscape,
    #[error("\\8 and \\9 are not allowed in strict mode")]
    StrictNonOctalDecimalEscape,
    #[error("strict mode code may not include a with statement")]
    StrictWith,
    #[error("delete of an unqualified identifier in strict mode")]
    StrictDelete,
    #[error("duplicate parameter name '{0}' not allowed in this context")]
    DuplicateParameter(String),
    #[error("identifier '{0}' has already been declared")]
    DuplicateBinding(String),
    #[error("'use strict' not allowed in function with non-simple parameters")]
    UseStrictNonSimpleParameters,
    #[error("'super' keyword unexpected here")]
    InvalidSuperProperty,
    #[error("'super' call is only valid in derived class constructors")]
    InvalidSuperCall,
    #[error("new.target expression is not allowed here")]
    NewTargetOutsideFunction,
    #[error("yield expression not allowed in formal parameters")]
    YieldInParameters,
    #[error("await expression not allowed in formal parameters")]
    AwaitInParameters,
    #[error("'await' is not allowed in class static initialization blocks")]
    AwaitInStaticBlock,
    #[error("'arguments' is not allowed in class field initializers or static initialization blocks")]
    ArgumentsInClassInit,
    #[error("illegal return statement")]
    IllegalReturn,
    #[error("illegal break statement")]
    IllegalBreak,
    #[error("illegal continue statement: no surrounding iteration statement")]
    IllegalContinue,
    #[error("illegal continue statement: '{0}' does not denote an iteration statement")]
    IllegalContinueLabel(String),
    #[error("undefined label '{0}'")]
    UndefinedLabel(String),
    #[error("label '{0}' has already been declared")]
    DuplicateLabel(String),
    #[error("labelled function declarations are not allowed here")]
    LabelledFunction,
    #[error("a class may only have one constructor")]
    DuplicateConstructor,
    #[error("class constructor may not be {0}")]
    SpecialConstructor(&'static str),
    #[error("classes may not have a field named 'constructor'")]
    ConstructorField,
    #[error("classes may not have a static property named 'prototype'")]
    StaticPrototype,
    #[error("classes may not have a private element named '#constructor'")]
    PrivateConstructor,
    #[error("private name '#{0}' has already been declared")]
    DuplicatePrivateName(String),
    #[error("private name '#{0}' must be declared in an enclosing class")]
    UndeclaredPrivateName(String),
    #[error("private fields can not be deleted")]
    DeletePrivateField,
    #[error("duplicate __proto__ fields are not allowed in object literals")]
    DuplicateProto,
    #[error("duplicate export of '{0}'")]
    DuplicateExport(String),
    #[error("export '{0}' is not defined in module")]
    UndefinedExport(String),
    #[error("import attribute '{0}' is given more than once")]
    DuplicateImportAttribute(String),
}

impl Diagnostic {
    pub fn category(&self) -> ErrorCategory {
        use Diagnostic::*;
        match self {
            UnterminatedString
            | UnterminatedTemplate
            | UnterminatedRegExp
            | UnterminatedComment
            | InvalidCharacter(_)
            | InvalidEscape
            | InvalidHexEscape
            | InvalidUnicodeEscape
            | InvalidIdentifierEscape
            | InvalidNumber
            | InvalidNumericSeparator
            | IdentifierAfterNumber
            | InvalidBigInt
            | InvalidRegExpFlag(_)
            | DuplicateRegExpFlag(_)
            | IncompatibleRegExpFlags => ErrorCategory::Lexical,

            UnexpectedToken(_)
            | UnexpectedEof
            | Expected { .. }
            | MissingSemicolon
            | InvalidArrowParameters
            | LineBreakBeforeArrow
            | NewlineAfterThrow
            | MixedCoalesce
            | UnaryBeforeExponent
            | RestNotLast
            | RestWithInitializer
            | InvalidObjectRest
            | MultipleDefaults
            | MissingCatchOrFinally
            | ForInOfInitializer(_)
            | ForInOfMultipleBindings(_)
            | ForOfAsync
            | ForOfLet
            | MissingInitializer(_)
            | DeclarationInStatementPosition(_)
            | FunctionInStatementPosition
            | OptionalChainTemplate
            | OptionalChainNew
            | InvalidTemplateEscape
            | GetterArity
            | SetterArity
            | SetterRest
            | InvalidShorthandProperty(_)
            | CoverInitializedName
            | ModuleItemOutsideModule
            | ImportMetaOutsideModule
            | InvalidMetaProperty { .. }
            | InvalidImportCall
            | StringExportWithoutFrom
            | StagedSyntaxDisabled(_)
            | EscapedKeyword
            | NestingTooDeep => ErrorCategory::Grammar,

            _ => ErrorCategory::Early,
        }
    }
}

/// A diagnostic anchored at a source position
#[derive(Debug, Clone, PartialEq, Error)]
#[error("SyntaxError: {diagnostic} ({})", format_location(.file, .location))]
pub struct ParseError {
    pub diagnostic: Diagnostic,
    pub span: Span,
    pub location: Position,
    pub file: Option<String>,
}

fn format_location(file: &Option<String>, location: &Position) -> String {
    match file {
        Some(file) => format!("{}:{}", file, location),
        None => location.to_string(),
    }
}

impl ParseError {
    /// Build an error, resolving the line/column of `span.start` in `source`
    pub fn new(diagnostic: Diagnostic, span: Span, source: &str) -> Self {
        let location = LineIndex::new(source).position(source, span.start);
        Self {
            diagnostic,
            span: Span::new(span.start, span.end),
            location,
            file: None,
        }
    }

    pub fn with_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn category(&self) -> ErrorCategory {
        self.diagnostic.category()
    }

    /// The bare message, without the `SyntaxError:` prefix or location
    pub fn message(&self) -> String {
        self.diagnostic.to_string()
    }

    /// Caret-style rendering of the error against the source it came from:
    ///
    /// ```text
    /// SyntaxError: unexpected token ;
    ///  --> main.js:1:8
    ///   |
    /// 1 | let x = ;
    ///   |         ^
    /// ```
    pub fn render(&self, source: &str) -> String {
        let index = LineIndex::new(source);
        let line_start = index.line_start(self.location.line).unwrap_or(0);
        let line_text: String = source
            .get(line_start..)
            .unwrap_or("")
            .chars()
            .take_while(|ch| !matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
            .collect();

        let width = source
            .get(self.span.start..self.span.end)
            .map_or(1, |text| {
                text.chars()
                    .take_while(|ch| !matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}'))
                    .count()
            })
            .max(1);

        let gutter = self.location.line.to_string();
        let pad = " ".repeat(gutter.len());
        let file = self.file.as_deref().unwrap_or("<input>");

        let mut out = String::new();
        out.push_str(&format!("SyntaxError: {}\n", self.diagnostic));
        out.push_str(&format!("{} --> {}:{}\n", pad, file, self.location));
        out.push_str(&format!("{} |\n", pad));
        out.push_str(&format!("{} | {}\n", gutter, line_text));
        out.push_str(&format!(
            "{} | {}{}",
            pad,
            " ".repeat(self.location.column as usize),
            "^".repeat(width)
        ));
        out
    }
}

/// A diagnostic with its span, before line/column resolution.
///
/// Produced by the cover-grammar conversion and by the early-error rules in
/// [`crate::validator`]; the parser turns it into a [`ParseError`].
#[derive(Debug, Clone, PartialEq)]
pub struct EarlyError {
    pub diagnostic: Diagnostic,
    pub span: Span,
}

impl EarlyError {
    pub fn new(diagnostic: Diagnostic, span: Span) -> Self {
        Self { diagnostic, span }
    }

    /// Resolve against the source text
    pub fn into_parse_error(self, source: &str) -> ParseError {
        ParseError::new(self.diagnostic, self.span, source)
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_location() {
        let source = "let x;\nlet x = ;";
        let error = ParseError::new(Diagnostic::UnexpectedToken(";".into()), Span::new(15, 16), source);
        assert_eq!(error.location, Position { line: 2, column: 8 });
        assert_eq!(error.to_string(), "SyntaxError: unexpected token ; (2:8)");

        let error = error.with_file(Some("main.js".into()));
        assert_eq!(error.to_string(), "SyntaxError: unexpected token ; (main.js:2:8)");
    }

    #[test]
    fn test_render_points_at_span() {
        let source = "let x;\nlet x = ;";
        let error = ParseError::new(Diagnostic::UnexpectedToken(";".into()), Span::new(15, 16), source);
        let rendered = error.render(source);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.first().copied(), Some("SyntaxError: unexpected token ;"));
        assert_eq!(lines.get(3).copied(), Some("2 | let x = ;"));
        assert_eq!(lines.get(4).copied(), Some("  |         ^"));
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            Diagnostic::UnterminatedString.category(),
            ErrorCategory::Lexical
        );
        assert_eq!(Diagnostic::UnexpectedEof.category(), ErrorCategory::Grammar);
        assert_eq!(
            Diagnostic::DuplicateParameter("a".into()).category(),
            ErrorCategory::Early
        );
    }
}
