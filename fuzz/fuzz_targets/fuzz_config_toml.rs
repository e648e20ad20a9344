//! Fuzz target for sanitization config parsing.
//!
//! Parsing, validation and engine construction must never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logsan_redact::{SanitizationConfig, SanitizationEngine};

fuzz_target!(|data: &str| {
    let Ok(mut config) = toml::from_str::<SanitizationConfig>(data) else {
        return;
    };
    // Keep runs deterministic.
    config.salt = "fuzz".to_string();
    if config.validate().is_ok() {
        let _ = SanitizationEngine::new(config);
    }
});
