//! Fuzz target for free-text line sanitization.
//!
//! Arbitrary text must never panic or gain a line break, and every token the
//! first run emits must survive a second run.

#![no_main]

use libfuzzer_sys::fuzz_target;
use logsan_redact::detect::RE_PROTECTED;
use logsan_redact::{SanitizationConfig, SanitizationEngine};
use std::sync::OnceLock;

fn engine() -> &'static SanitizationEngine {
    static ENGINE: OnceLock<SanitizationEngine> = OnceLock::new();
    ENGINE.get_or_init(|| {
        SanitizationEngine::new(SanitizationConfig {
            salt: "fuzz".to_string(),
            detect_json: false,
            site_code_literals: vec!["PS1".to_string()],
            ..Default::default()
        })
        .expect("default config is valid")
    })
}

fuzz_target!(|data: &str| {
    if data.contains('\n') {
        return;
    }
    let once = engine().sanitize_line(data);
    assert!(!once.contains('\n'));
    let twice = engine().sanitize_line(&once);
    for token in RE_PROTECTED.find_iter(&once) {
        assert!(
            twice.contains(token.as_str()),
            "token {} lost: {:?} -> {:?}",
            token.as_str(),
            once,
            twice
        );
    }
});
