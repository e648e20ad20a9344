//! Fuzz target for JSON-aware line handling.
//!
//! Wraps fuzz input in JSON-looking shells so both the parse path and the
//! plain-text fallback are exercised. Valid JSON input must stay valid JSON.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use logsan_redact::{SanitizationConfig, SanitizationEngine};

#[derive(Debug, Arbitrary)]
struct Input {
    body: String,
    as_string_leaf: bool,
    hashing: bool,
}

fuzz_target!(|input: Input| {
    let Ok(engine) = SanitizationEngine::new(SanitizationConfig {
        salt: "fuzz".to_string(),
        enable_hashing: input.hashing,
        ..Default::default()
    }) else {
        return;
    };

    let line = if input.as_string_leaf {
        match serde_json::to_string(&input.body) {
            Ok(s) => format!("{{\"message\":{}}}", s),
            Err(_) => return,
        }
    } else {
        input.body.replace('\n', " ")
    };

    let out = engine.sanitize_line(&line);
    if serde_json::from_str::<serde_json::Value>(&line).is_ok() && line.trim_start().starts_with('{') {
        assert!(serde_json::from_str::<serde_json::Value>(&out).is_ok());
    }
});
