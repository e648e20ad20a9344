//! JSON-aware line handling.
//!
//! JSON-shaped lines are parsed and only string leaves are rewritten, so
//! keys, numbers and structure survive sanitization. Lines that look like
//! JSON but fail to parse are rewritten as plain text.

use crate::rewrite::ContentRewriter;
use serde_json::Value;
use tracing::debug;

/// Trimmed line is an object (`{...}`) or array (`[...]`).
pub fn is_json_candidate(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 2
        && ((trimmed.starts_with('{') && trimmed.ends_with('}'))
            || (trimmed.starts_with('[') && trimmed.ends_with(']')))
}

/// Sanitize one line.
pub fn sanitize_line(line: &str, rewriter: &ContentRewriter, detect_json: bool) -> String {
    if line.trim().is_empty() {
        return line.to_string();
    }
    if detect_json && is_json_candidate(line) {
        match rewrite_json(line, rewriter) {
            Ok(out) => return out,
            Err(e) => {
                debug!(
                    error = %e,
                    line_len = line.len(),
                    "JSON-shaped line did not parse; rewriting as text"
                );
            }
        }
    }
    rewriter.rewrite(line)
}

/// Parse `line`, rewrite every string leaf and serialize compactly.
///
/// Returns the input unchanged when no leaf was modified.
pub fn rewrite_json(line: &str, rewriter: &ContentRewriter) -> serde_json::Result<String> {
    let mut value: Value = serde_json::from_str(line)?;
    if !rewrite_value(&mut value, rewriter) {
        return Ok(line.to_string());
    }
    serde_json::to_string(&value)
}

fn rewrite_value(value: &mut Value, rewriter: &ContentRewriter) -> bool {
    match value {
        Value::String(s) => {
            let rewritten = rewriter.rewrite(s);
            if rewritten == *s {
                false
            } else {
                *s = rewritten;
                true
            }
        }
        // Keys are never rewritten.
        Value::Object(map) => map
            .values_mut()
            .fold(false, |changed, v| rewrite_value(v, rewriter) | changed),
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |changed, v| rewrite_value(v, rewriter) | changed),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SanitizationConfig;
    use crate::hash::TokenGenerator;
    use crate::PiiCategory;

    fn rewriter(hashing: bool) -> ContentRewriter {
        let config = SanitizationConfig {
            enable_hashing: hashing,
            ..Default::default()
        };
        let tokens =
            TokenGenerator::new("json-salt", config.enable_hashing, &config.mask_placeholder)
                .unwrap();
        ContentRewriter::new(&config, tokens).unwrap()
    }

    #[test]
    fn test_candidate_shapes() {
        assert!(is_json_candidate(r#"{"a":1}"#));
        assert!(is_json_candidate(r#"  [1, 2]  "#));
        assert!(!is_json_candidate("{"));
        assert!(!is_json_candidate("plain text"));
        assert!(!is_json_candidate("{ unbalanced"));
    }

    #[test]
    fn test_email_leaf_with_placeholder() {
        let rw = rewriter(false);
        let out = sanitize_line(r#"{"email": "test@example.com", "count": 42}"#, &rw, true);
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["email"], "[REDACTED]");
        assert_eq!(parsed["count"], 42);
    }

    #[test]
    fn test_keys_never_rewritten() {
        let rw = rewriter(true);
        let out = sanitize_line(r#"{"10.0.0.1": "10.0.0.1"}"#, &rw, true);
        let parsed: Value = serde_json::from_str(&out).unwrap();
        let obj = parsed.as_object().unwrap();
        assert!(obj.contains_key("10.0.0.1"));
        assert!(obj["10.0.0.1"].as_str().unwrap().starts_with("[IP4-"));
    }

    #[test]
    fn test_nested_structures() {
        let rw = rewriter(true);
        let out = sanitize_line(
            r#"{"a":{"b":["x", "fe80::1", 3.14159265358979323846]},"ok":true,"n":null}"#,
            &rw,
            true,
        );
        assert!(out.contains("[IP6-"), "{}", out);
        assert!(out.contains("3.14159265358979323846"), "{}", out);
        assert!(out.contains(r#""ok":true"#));
        assert!(out.contains(r#""n":null"#));
    }

    #[test]
    fn test_member_order_preserved() {
        let rw = rewriter(true);
        let out = sanitize_line(r#"{"z":"a@b.com","a":"x"}"#, &rw, true);
        assert!(out.find("\"z\"").unwrap() < out.find("\"a\"").unwrap(), "{}", out);
    }

    #[test]
    fn test_unchanged_tree_returns_original_bytes() {
        let rw = rewriter(true);
        let line = r#"{ "level" : "info",   "n": 1.50 }"#;
        assert_eq!(sanitize_line(line, &rw, true), line);
    }

    #[test]
    fn test_malformed_falls_back_to_text() {
        let rw = rewriter(true);
        let out = sanitize_line(r#"{"ip": "10.0.0.1", broken}"#, &rw, true);
        assert!(out.contains("[IP4-"), "{}", out);
        assert!(!out.contains("10.0.0.1"));
    }

    #[test]
    fn test_detection_disabled_treats_as_text() {
        let rw = rewriter(true);
        let out = sanitize_line(r#"{"ip":"10.0.0.1"}"#, &rw, false);
        assert!(out.starts_with(r#"{"ip":"[IP4-"#), "{}", out);
    }

    #[test]
    fn test_blank_lines_unchanged() {
        let rw = rewriter(true);
        assert_eq!(sanitize_line("", &rw, true), "");
        assert_eq!(sanitize_line("   \t", &rw, true), "   \t");
    }

    #[test]
    fn test_array_line() {
        let config = SanitizationConfig::default().with_targets([PiiCategory::Email]);
        let tokens = TokenGenerator::new("s", true, "[REDACTED]").unwrap();
        let rw = ContentRewriter::new(&config, tokens).unwrap();
        let out = sanitize_line(r#"["a@b.com", 1]"#, &rw, true);
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert!(parsed[0].as_str().unwrap().starts_with("[EMAIL-"));
        assert_eq!(parsed[1], 1);
    }
}
