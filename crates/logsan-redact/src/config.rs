//! Sanitization configuration.
//!
//! Built by the caller before engine construction and read-only afterwards.
//! Every field has a serde default so partial configuration files load.

use crate::error::{Result, SanitizeError};
use crate::PiiCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Default static replacement when hashing is disabled.
pub const DEFAULT_PLACEHOLDER: &str = "[REDACTED]";

/// Options for one processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizationConfig {
    /// Categories to detect.
    pub targets: BTreeSet<PiiCategory>,

    /// Replacement used for category matches when hashing is off.
    pub mask_placeholder: String,

    /// Replace category matches with `[CODE-XXXXXX]` tokens.
    pub enable_hashing: bool,

    /// Hash salt. Empty means a random salt per engine instance.
    pub salt: String,

    /// Extensions considered by directory processing, e.g. `.log`.
    /// Empty means every file.
    pub allowed_extensions: Vec<String>,

    /// Rewrite JSON-shaped lines leaf by leaf.
    pub detect_json: bool,

    /// Permit replacing existing output files.
    pub overwrite_output: bool,

    /// Whole-word literals replaced by `[SITE-CODE]`.
    pub site_code_literals: Vec<String>,
}

impl Default for SanitizationConfig {
    fn default() -> Self {
        Self {
            targets: PiiCategory::ALL.into_iter().collect(),
            mask_placeholder: DEFAULT_PLACEHOLDER.to_string(),
            enable_hashing: true,
            salt: String::new(),
            allowed_extensions: vec![".log".to_string(), ".txt".to_string()],
            detect_json: true,
            overwrite_output: false,
            site_code_literals: Vec::new(),
        }
    }
}

impl SanitizationConfig {
    /// Builder-style target selection.
    pub fn with_targets<I>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = PiiCategory>,
    {
        self.targets = targets.into_iter().collect();
        self
    }

    /// Whether a category is active.
    pub fn targets_category(&self, category: PiiCategory) -> bool {
        self.targets.contains(&category)
    }

    /// Check invariants the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.mask_placeholder.is_empty() {
            return Err(SanitizeError::Config(
                "mask_placeholder must not be empty".to_string(),
            ));
        }
        for ext in &self.allowed_extensions {
            let bare = ext.trim().trim_start_matches('.');
            if bare.is_empty() || bare.contains(['/', '\\', '.']) || bare.contains(char::is_whitespace) {
                return Err(SanitizeError::Config(format!(
                    "invalid file extension: {:?}",
                    ext
                )));
            }
        }
        for literal in &self.site_code_literals {
            if literal.trim().is_empty() {
                return Err(SanitizeError::Config(
                    "site_code_literals must not contain empty entries".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Extensions as `.ext`, lowercase, deduplicated.
    pub fn normalized_extensions(&self) -> BTreeSet<String> {
        self.allowed_extensions
            .iter()
            .map(|ext| normalize_extension(ext))
            .filter(|ext| ext.len() > 1)
            .collect()
    }

    /// Whether directory processing should pick up `path`.
    pub fn is_allowed_extension(&self, path: &Path) -> bool {
        let allowed = self.normalized_extensions();
        if allowed.is_empty() {
            return true;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => allowed.contains(&normalize_extension(ext)),
            None => false,
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    format!(".{}", ext.trim().trim_start_matches('.').to_lowercase())
}
