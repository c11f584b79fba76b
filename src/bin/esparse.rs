//! CLI tool for parsing ECMAScript files with esparse
//!
//! Usage: esparse [options] <file.js>
//!
//! Options:
//!   --module           Parse as an ES module (default for .mjs files)
//!   --script           Parse as a classic script
//!   --options <file>   Load parse options from a JSON file
//!   --loc              Attach line/column locations to every node
//!   --ranges           Attach [start, end] ranges to every node
//!   --next             Enable staged syntax (decorators, import attributes)
//!   --strict           Parse scripts as strict code
//!   --no-web-compat    Disable the legacy sloppy-mode productions
//!   --max-depth <n>    Maximum nesting depth before giving up
//!   --compact          Print the tree on a single line
//!
//! Prints the ESTree JSON of the program, or a caret diagnostic on stderr
//! (exit status 1) when the source does not parse.

use esparse::{ParseOptions, SourceType};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// CLI configuration
struct Config {
    input: PathBuf,
    options_file: Option<PathBuf>,
    source_type: Option<SourceType>,
    loc: bool,
    ranges: bool,
    next: bool,
    strict: bool,
    no_web_compat: bool,
    max_depth: Option<u32>,
    compact: bool,
}

fn usage(program_name: &str) -> String {
    format!(
        "Usage: {} [--module | --script] [--options <file>] [--loc] [--ranges] [--next] \
         [--strict] [--no-web-compat] [--max-depth <n>] [--compact] <file.js>",
        program_name
    )
}

fn parse_args() -> Result<Config, String> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map_or("esparse", |s| s.as_str());

    let mut config = Config {
        input: PathBuf::new(),
        options_file: None,
        source_type: None,
        loc: false,
        ranges: false,
        next: false,
        strict: false,
        no_web_compat: false,
        max_depth: None,
        compact: false,
    };
    let mut input: Option<&str> = None;

    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args.get(i) else {
            break;
        };
        match arg.as_str() {
            "--help" | "-h" => return Err(usage(program_name)),
            "--module" => config.source_type = Some(SourceType::Module),
            "--script" => config.source_type = Some(SourceType::Script),
            "--options" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or_else(|| "--options requires a file".to_string())?;
                config.options_file = Some(PathBuf::from(path));
            }
            "--max-depth" => {
                i += 1;
                config.max_depth = Some(
                    args.get(i)
                        .ok_or_else(|| "--max-depth requires a value".to_string())?
                        .parse::<u32>()
                        .map_err(|_| "--max-depth must be a positive integer".to_string())?,
                );
            }
            "--loc" => config.loc = true,
            "--ranges" => config.ranges = true,
            "--next" => config.next = true,
            "--strict" => config.strict = true,
            "--no-web-compat" => config.no_web_compat = true,
            "--compact" => config.compact = true,
            _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            _ => input = Some(arg),
        }
        i += 1;
    }

    config.input = PathBuf::from(input.ok_or_else(|| usage(program_name))?);
    Ok(config)
}

/// Start from the options file (if any) and apply the command-line flags on top
fn build_options(config: &Config) -> Result<ParseOptions, Box<dyn std::error::Error>> {
    let mut options = match &config.options_file {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
            ParseOptions::from_json(&json)
                .map_err(|e| format!("Invalid options file {}: {}", path.display(), e))?
        }
        None => ParseOptions::default().with_source_type(guess_source_type(&config.input)),
    };

    if let Some(source_type) = config.source_type {
        options.source_type = source_type;
    }
    options.loc |= config.loc;
    options.ranges |= config.ranges;
    options.next |= config.next;
    options.implied_strict |= config.strict;
    options.disable_web_compat |= config.no_web_compat;
    if let Some(depth) = config.max_depth {
        options.max_depth = depth;
    }
    if options.source_file.is_none() {
        options.source_file = Some(config.input.display().to_string());
    }
    Ok(options)
}

fn guess_source_type(path: &Path) -> SourceType {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("mjs") => SourceType::Module,
        _ => SourceType::Script,
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match parse_args() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let options = build_options(&config)?;
    let source = fs::read_to_string(&config.input)
        .map_err(|e| format!("Cannot read {}: {}", config.input.display(), e))?;

    let started = Instant::now();
    let program = match esparse::parse(&source, &options) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{}", err.render(&source));
            std::process::exit(1);
        }
    };
    let elapsed = started.elapsed();

    let json = if config.compact {
        serde_json::to_string(&program)?
    } else {
        serde_json::to_string_pretty(&program)?
    };
    println!("{}", json);

    if env::var_os("ESPARSE_TIMING").is_some() {
        eprintln!(
            "parsed {} ({} bytes) in {:.3}ms",
            config.input.display(),
            source.len(),
            elapsed.as_secs_f64() * 1000.0
        );
    }
    Ok(())
}
