//! Test262 syntax conformance runner for esparse
//!
//! Parses every test file under a test262 checkout and checks that files
//! marked `negative: { phase: parse }` are rejected and every other file is
//! accepted. Nothing is executed.
//!
//! Usage:
//!   test262-parser [OPTIONS] [TEST_PATH]
//!
//! Options:
//!   --test262-dir <PATH>   Path to test262 directory (default: ./test262)
//!   --filter <PATTERN>     Filter tests by path pattern
//!   --skip-features <LIST> Skip tests requiring these features (comma-separated)
//!   --verbose              Show detailed output for each test
//!   --stop-on-fail         Stop on first failure
//!
//! Examples:
//!   test262-parser language/expressions/class
//!   test262-parser --filter "async" language/statements

use esparse::{ParseError, ParseOptions, SourceType};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::io::{self, Write as IoWrite};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Staged features that need `ParseOptions::next`
const STAGED_FEATURES: &[&str] = &["decorators", "import-attributes"];

/// Features whose syntax the parser does not implement
const DEFAULT_SKIP: &[&str] = &[
    "import-assertions",
    "source-phase-imports",
    "import-defer",
    "explicit-resource-management",
    "regexp-modifiers",
];

/// The parts of the YAML frontmatter that matter for parsing
#[derive(Debug, Default)]
struct TestMetadata {
    features: Vec<String>,
    flags: HashSet<String>,
    /// `negative.phase`, when the test expects an error
    negative_phase: Option<String>,
}

impl TestMetadata {
    fn expects_parse_error(&self) -> bool {
        self.negative_phase.as_deref() == Some("parse")
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum TestResult {
    Pass,
    Fail,
    Skip,
}

#[derive(Debug)]
struct TestOutcome {
    result: TestResult,
    mode: &'static str,
    error: Option<String>,
}

impl TestOutcome {
    fn skip(reason: String) -> Self {
        Self {
            result: TestResult::Skip,
            mode: "n/a",
            error: Some(reason),
        }
    }
}

struct TestRunner {
    skip_features: HashSet<String>,
}

impl TestRunner {
    fn should_skip(&self, meta: &TestMetadata) -> Option<String> {
        meta.features
            .iter()
            .find(|feature| self.skip_features.contains(feature.as_str()))
            .map(|feature| format!("skipped feature: {}", feature))
    }

    fn run_test(&self, test_path: &Path) -> Vec<TestOutcome> {
        let source = match fs::read_to_string(test_path) {
            Ok(s) => s,
            Err(e) => {
                return vec![TestOutcome {
                    result: TestResult::Fail,
                    mode: "n/a",
                    error: Some(format!("Failed to read test: {}", e)),
                }];
            }
        };

        let meta = parse_metadata(&source);
        if let Some(reason) = self.should_skip(&meta) {
            return vec![TestOutcome::skip(reason)];
        }

        let next = meta
            .features
            .iter()
            .any(|feature| STAGED_FEATURES.contains(&feature.as_str()));
        let base = ParseOptions::default()
            .with_next(next)
            .with_source_file(test_path.display().to_string());

        if meta.flags.contains("module") {
            let options = base.with_source_type(SourceType::Module);
            return vec![self.run_mode(&source, &options, &meta, "module")];
        }

        let mut outcomes = Vec::new();
        if !meta.flags.contains("onlyStrict") {
            outcomes.push(self.run_mode(&source, &base, &meta, "non-strict"));
        }
        if !meta.flags.contains("noStrict") && !meta.flags.contains("raw") {
            let options = base.with_implied_strict(true);
            outcomes.push(self.run_mode(&source, &options, &meta, "strict"));
        }
        outcomes
    }

    fn run_mode(
        &self,
        source: &str,
        options: &ParseOptions,
        meta: &TestMetadata,
        mode: &'static str,
    ) -> TestOutcome {
        let result = esparse::parse(source, options);
        match (meta.expects_parse_error(), result) {
            (true, Err(_)) | (false, Ok(_)) => TestOutcome {
                result: TestResult::Pass,
                mode,
                error: None,
            },
            (true, Ok(_)) => TestOutcome {
                result: TestResult::Fail,
                mode,
                error: Some("expected a SyntaxError, but parsing succeeded".to_string()),
            },
            (false, Err(err)) => TestOutcome {
                result: TestResult::Fail,
                mode,
                error: Some(format_error(&err)),
            },
        }
    }
}

fn format_error(err: &ParseError) -> String {
    format!("{} at {}..{}", err, err.span.start, err.span.end)
}

/// Pull `features`, `flags` and `negative.phase` out of the `/*--- ---*/` block
fn parse_metadata(source: &str) -> TestMetadata {
    let mut meta = TestMetadata::default();

    let Some(start) = source.find("/*---").map(|i| i + 5) else {
        return meta;
    };
    let Some(yaml) = source
        .get(start..)
        .and_then(|rest| rest.find("---*/").and_then(|end| rest.get(..end)))
    else {
        return meta;
    };

    let mut current_key = String::new();
    for line in yaml.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(item) = trimmed.strip_prefix("- ") {
            let item = item.trim().to_string();
            match current_key.as_str() {
                "features" => meta.features.push(item),
                "flags" => {
                    meta.flags.insert(item);
                }
                _ => {}
            }
            continue;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        // `phase` and `type` are nested under `negative`; everything else
        // at this indentation starts a new top-level key
        if key == "phase" && line.starts_with(char::is_whitespace) {
            meta.negative_phase = Some(value.to_string());
            continue;
        }
        if line.starts_with(char::is_whitespace) {
            continue;
        }

        current_key = key.to_string();
        match key {
            "features" => meta.features.extend(parse_yaml_array(value)),
            "flags" => meta.flags.extend(parse_yaml_array(value)),
            _ => {}
        }
    }

    meta
}

/// Parse YAML array format: [a, b, c] or a single inline value
fn parse_yaml_array(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        inner
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    } else if !trimmed.is_empty() {
        vec![trimmed.to_string()]
    } else {
        Vec::new()
    }
}

/// Collect test files from a directory, skipping `_FIXTURE` helpers
fn collect_tests(path: &Path, pattern: Option<&str>) -> Vec<PathBuf> {
    let mut tests = Vec::new();

    let accept = |path: &Path| {
        let path_str = path.to_string_lossy();
        path.extension().is_some_and(|e| e == "js")
            && !path_str.contains("_FIXTURE")
            && pattern.is_none_or(|pat| path_str.contains(pat))
    };

    if path.is_file() {
        if accept(path) {
            tests.push(path.to_path_buf());
        }
        return tests;
    }

    if let Ok(entries) = fs::read_dir(path) {
        for entry in entries.flatten() {
            let entry_path = entry.path();
            if entry_path.is_dir() {
                tests.extend(collect_tests(&entry_path, pattern));
            } else if accept(&entry_path) {
                tests.push(entry_path);
            }
        }
    }

    tests.sort();
    tests
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} [OPTIONS] [TEST_PATH]

Test262 syntax conformance runner for esparse

Arguments:
  [TEST_PATH]  Path to test file or directory (relative to test262/test/, default: language)

Options:
  --test262-dir <PATH>     Path to test262 directory (default: ./test262)
  --filter <PATTERN>       Filter tests by path pattern
  --skip-features <LIST>   Skip tests requiring these features (comma-separated)
  --verbose                Show detailed output for each test
  --stop-on-fail           Stop on first failure
  --help                   Show this help message",
        program
    );
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("test262-parser", |s| s.as_str());

    let mut test262_dir = PathBuf::from("test262");
    let mut filter: Option<String> = None;
    let mut skip_features: HashSet<String> =
        DEFAULT_SKIP.iter().map(|f| f.to_string()).collect();
    let mut verbose = false;
    let mut stop_on_fail = false;
    let mut test_path = String::from("language");

    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args.get(i) else {
            break;
        };
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage(program);
                return Ok(());
            }
            "--test262-dir" => {
                i += 1;
                test262_dir = PathBuf::from(args.get(i).ok_or("Missing value for --test262-dir")?);
            }
            "--filter" => {
                i += 1;
                filter = Some(args.get(i).ok_or("Missing value for --filter")?.clone());
            }
            "--skip-features" => {
                i += 1;
                let features_str = args.get(i).ok_or("Missing value for --skip-features")?;
                for f in features_str.split(',') {
                    skip_features.insert(f.trim().to_string());
                }
            }
            "--verbose" | "-v" => verbose = true,
            "--stop-on-fail" => stop_on_fail = true,
            _ if !arg.starts_with('-') => test_path = arg.clone(),
            _ => return Err(format!("Unknown option: {}", arg).into()),
        }
        i += 1;
    }

    let full_test_path = if Path::new(&test_path).is_absolute() {
        PathBuf::from(&test_path)
    } else {
        test262_dir.join("test").join(&test_path)
    };
    if !full_test_path.exists() {
        return Err(format!("Test path not found: {}", full_test_path.display()).into());
    }

    let tests = collect_tests(&full_test_path, filter.as_deref());
    if tests.is_empty() {
        println!("No tests found matching criteria");
        return Ok(());
    }
    println!("Found {} test files", tests.len());

    let runner = TestRunner { skip_features };
    let mut pass_count = 0usize;
    let mut fail_count = 0usize;
    let mut skip_count = 0usize;
    let total_start = Instant::now();

    for (idx, path) in tests.iter().enumerate() {
        let relative_path = path.strip_prefix(&test262_dir).unwrap_or(path);
        let outcomes = runner.run_test(path);

        let mut test_passed = true;
        for outcome in &outcomes {
            match outcome.result {
                TestResult::Pass => pass_count += 1,
                TestResult::Fail => {
                    fail_count += 1;
                    test_passed = false;
                }
                TestResult::Skip => skip_count += 1,
            }
        }
        let all_skipped = outcomes.iter().all(|o| o.result == TestResult::Skip);

        if verbose {
            let status = if all_skipped {
                "SKIP"
            } else if test_passed {
                "PASS"
            } else {
                "FAIL"
            };
            println!("[{}/{}] {} ... {}", idx + 1, tests.len(), relative_path.display(), status);
            for outcome in outcomes.iter().filter(|o| o.result == TestResult::Fail) {
                if let Some(err) = &outcome.error {
                    println!("  [{}] {}", outcome.mode, err);
                }
            }
        } else {
            let c = if all_skipped {
                'S'
            } else if test_passed {
                '.'
            } else {
                'F'
            };
            print!("{}", c);
            if (idx + 1) % 80 == 0 {
                println!(" [{}/{}]", idx + 1, tests.len());
            }
            io::stdout().flush().ok();
        }

        if stop_on_fail && !test_passed {
            println!("\n\nStopping on first failure.");
            println!("Failed test: {}", relative_path.display());
            for outcome in &outcomes {
                if let Some(err) = &outcome.error {
                    println!("  [{}] {}", outcome.mode, err);
                }
            }
            break;
        }
    }

    let total_duration = total_start.elapsed();
    let run_count = pass_count + fail_count;

    println!("\n");
    println!("═══════════════════════════════════════════════════════════════");
    println!("                     PARSER TEST RESULTS");
    println!("═══════════════════════════════════════════════════════════════");
    println!("  Passed:   {:>6}", pass_count);
    println!("  Failed:   {:>6}", fail_count);
    println!("  Skipped:  {:>6}", skip_count);
    println!("───────────────────────────────────────────────────────────────");
    println!("  Total:    {:>6}", run_count + skip_count);
    println!(
        "  Pass rate: {:>5.1}% (excluding skipped)",
        if run_count > 0 {
            100.0 * pass_count as f64 / run_count as f64
        } else {
            0.0
        }
    );
    println!("  Duration: {:>5.2}s", total_duration.as_secs_f64());
    println!("═══════════════════════════════════════════════════════════════");

    if fail_count > 0 {
        std::process::exit(1);
    }

    Ok(())
}
