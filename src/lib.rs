//! ECMAScript parser producing ESTree-shaped syntax trees
//!
//! # Example
//!
//! ```
//! use esparse::{parse_script, ParseOptions};
//! use esparse::ast::Statement;
//!
//! let program = parse_script("let answer = 6 * 7;", &ParseOptions::default()).unwrap();
//! assert_eq!(program.body.len(), 1);
//! assert!(matches!(program.body.first(), Some(Statement::Variable(_))));
//!
//! let error = parse_script("let answer = ;", &ParseOptions::default()).unwrap_err();
//! assert_eq!(error.to_string(), "SyntaxError: unexpected token ; (1:13)");
//! ```
//!
//! Trees serialize to ESTree JSON through `serde`:
//!
//! ```
//! let program = esparse::parse_module("export default 1", &esparse::ParseOptions::module()).unwrap();
//! let json = serde_json::to_value(&program).unwrap();
//! assert_eq!(json["sourceType"], "module");
//! assert_eq!(json["body"][0]["type"], "ExportDefaultDeclaration");
//! ```

pub mod ast;
mod builder;
pub mod context;
pub mod error;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod scope;
pub mod span;
pub mod validator;
pub mod web_compat;

pub use ast::Program;
pub use error::{Diagnostic, ErrorCategory, ParseError};
pub use options::{ParseOptions, SourceType};
pub use parser::Parser;
pub use span::{Position, SourceLocation, Span};

/// Parse `source` as a classic script, ignoring `options.source_type`
pub fn parse_script(source: &str, options: &ParseOptions) -> Result<Program, ParseError> {
    run(source, options, SourceType::Script)
}

/// Parse `source` as an ES module, ignoring `options.source_type`
pub fn parse_module(source: &str, options: &ParseOptions) -> Result<Program, ParseError> {
    run(source, options, SourceType::Module)
}

/// Parse `source` with the goal symbol named by `options.source_type`
pub fn parse(source: &str, options: &ParseOptions) -> Result<Program, ParseError> {
    run(source, options, options.source_type)
}

fn run(source: &str, options: &ParseOptions, source_type: SourceType) -> Result<Program, ParseError> {
    tracing::debug!(
        source_type = source_type.as_str(),
        len = source.len(),
        file = options.source_file.as_deref(),
        "parse start"
    );

    let result = Parser::new(source, options, source_type)
        .parse_program()
        .map_err(|err| err.with_file(options.source_file.clone()));

    match &result {
        Ok(program) => tracing::debug!(statements = program.body.len(), "parse finished"),
        Err(err) => tracing::debug!(error = %err, "parse failed"),
    }
    result
}
