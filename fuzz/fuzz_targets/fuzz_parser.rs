#![no_main]

use esparse::{ParseOptions, parse_module, parse_script};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Only process valid UTF-8
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    // Limit input size to avoid timeout
    if source.len() > 100_000 {
        return;
    }

    // Parse should return Ok or Err, never panic
    let options = ParseOptions::default().with_loc(true).with_next(true);
    if let Ok(program) = parse_script(source, &options) {
        let _ = serde_json::to_string(&program);
    }
    if let Err(err) = parse_module(source, &options) {
        let _ = err.render(source);
    }
});
