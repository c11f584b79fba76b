//! Early-error and grammar validation tests, organized by rule family
//!
//! Each module feeds small programs through the public entry points and
//! checks that valid code parses and invalid code fails with the expected
//! [`Diagnostic`].

mod asi;
mod bindings;
mod classes;
mod cover;
mod functions;
mod modules;
mod spans;
mod strict;
mod web_compat;

use esparse::{Diagnostic, ParseError, ParseOptions, Program, parse_module, parse_script};

/// Parse a script with default options, panicking on failure
pub fn script(source: &str) -> Program {
    match parse_script(source, &ParseOptions::default()) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse script {:?}: {}", source, err),
    }
}

/// Parse a module with default options, panicking on failure
pub fn module(source: &str) -> Program {
    match parse_module(source, &ParseOptions::module()) {
        Ok(program) => program,
        Err(err) => panic!("failed to parse module {:?}: {}", source, err),
    }
}

/// Parse with explicit options, honouring `options.source_type`
pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Program, ParseError> {
    esparse::parse(source, options)
}

/// The diagnostic a script is rejected with
pub fn script_error(source: &str) -> Diagnostic {
    match parse_script(source, &ParseOptions::default()) {
        Ok(_) => panic!("script {:?} should not parse", source),
        Err(err) => err.diagnostic,
    }
}

/// The diagnostic a module is rejected with
pub fn module_error(source: &str) -> Diagnostic {
    match parse_module(source, &ParseOptions::module()) {
        Ok(_) => panic!("module {:?} should not parse", source),
        Err(err) => err.diagnostic,
    }
}

pub fn rejects(source: &str) -> bool {
    parse_script(source, &ParseOptions::default()).is_err()
}

pub fn accepts(source: &str) -> bool {
    parse_script(source, &ParseOptions::default()).is_ok()
}
