//! Sanitization engine.
//!
//! One engine instance is one processing run: it owns the compiled stage
//! list and the token cache, so every file processed through it shares a
//! salt and yields identical tokens for identical values.

use crate::config::SanitizationConfig;
use crate::error::Result;
use crate::hash::TokenGenerator;
use crate::json;
use crate::rewrite::ContentRewriter;
use tracing::debug;

/// Entry point for line, file and directory sanitization.
#[derive(Debug)]
pub struct SanitizationEngine {
    config: SanitizationConfig,
    rewriter: ContentRewriter,
}

impl SanitizationEngine {
    /// Validate `config` and build the detector set and token cache.
    ///
    /// An empty salt is replaced by a random one for this instance.
    pub fn new(config: SanitizationConfig) -> Result<Self> {
        config.validate()?;

        let tokens = TokenGenerator::new(
            &config.salt,
            config.enable_hashing,
            &config.mask_placeholder,
        )?;
        let rewriter = ContentRewriter::new(&config, tokens)?;

        debug!(
            passes = ?rewriter.pass_names(),
            targets = config.targets.len(),
            hashing = config.enable_hashing,
            random_salt = config.salt.is_empty(),
            "sanitization engine ready"
        );

        Ok(Self { config, rewriter })
    }

    /// Sanitize a single line of text (without its terminator).
    pub fn sanitize_line(&self, line: &str) -> String {
        json::sanitize_line(line, &self.rewriter, self.config.detect_json)
    }

    /// Configuration this engine was built with.
    pub fn config(&self) -> &SanitizationConfig {
        &self.config
    }

    /// Number of distinct values tokenized so far.
    pub fn cached_tokens(&self) -> usize {
        self.rewriter.tokens().cached_tokens()
    }
}

impl Drop for SanitizationEngine {
    fn drop(&mut self) {
        debug!(
            cached_tokens = self.cached_tokens(),
            "sanitization engine released"
        );
    }
}
