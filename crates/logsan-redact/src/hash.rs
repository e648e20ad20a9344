//! Salted, cached token generation.
//!
//! Tokens have the shape `[CODE-XXXXXX]` where `XXXXXX` is the first three
//! bytes of `SHA-256(value || salt)` in uppercase hex. Three bytes is enough
//! to correlate values inside one log while staying short; it is not meant
//! to resist brute force.

use crate::error::{Result, SanitizeError};
use dashmap::DashMap;
use sha2::{Digest, Sha256};

/// Number of digest bytes rendered into a token.
pub const TOKEN_DIGEST_BYTES: usize = 3;

/// Bytes of randomness in a generated salt.
const GENERATED_SALT_BYTES: usize = 16;

/// Generate a random per-run salt, hex encoded.
pub fn generate_salt() -> Result<String> {
    let mut bytes = [0u8; GENERATED_SALT_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| SanitizeError::Salt(format!("failed to generate random salt: {}", e)))?;
    Ok(hex::encode(bytes))
}

/// Compute a token without touching any cache.
pub fn compute_token(code: &str, value: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.update(salt.as_bytes());
    let digest = hasher.finalize();
    format!(
        "[{}-{}]",
        code,
        hex::encode_upper(&digest[..TOKEN_DIGEST_BYTES])
    )
}

/// Deterministic value-to-token mapping for one processing run.
///
/// The cache is shared by every worker of a batch. Two workers racing on the
/// same key compute the same token, so whichever insert wins is correct.
pub struct TokenGenerator {
    salt: String,
    hashing_enabled: bool,
    placeholder: String,
    cache: DashMap<String, String>,
}

impl TokenGenerator {
    /// Create a generator. An empty `salt` is replaced by a random one.
    pub fn new(salt: &str, hashing_enabled: bool, placeholder: &str) -> Result<Self> {
        let salt = if salt.is_empty() {
            generate_salt()?
        } else {
            salt.to_string()
        };

        Ok(Self {
            salt,
            hashing_enabled,
            placeholder: placeholder.to_string(),
            cache: DashMap::new(),
        })
    }

    /// Replacement for a value detected under a category code.
    ///
    /// Returns the static placeholder when hashing is disabled.
    pub fn token(&self, code: &str, value: &str) -> String {
        if !self.hashing_enabled {
            return self.placeholder.clone();
        }
        self.cached(code, value)
    }

    /// Replacement for a structural field, namespaced by `prefix`
    /// (`SITE`, `DB`, `SRV`, `DN`). Always a hashed token.
    pub fn keyed_token(&self, prefix: &str, value: &str) -> String {
        self.cached(prefix, value)
    }

    fn cached(&self, code: &str, value: &str) -> String {
        let key = format!("{}|{}", code, value);
        if let Some(token) = self.cache.get(&key) {
            return token.clone();
        }
        let token = compute_token(code, value, &self.salt);
        self.cache.entry(key).or_insert(token).clone()
    }

    /// Number of distinct values tokenized so far.
    pub fn cached_tokens(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for TokenGenerator {
    // The salt stays out of debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGenerator")
            .field("hashing_enabled", &self.hashing_enabled)
            .field("placeholder", &self.placeholder)
            .field("cached_tokens", &self.cache.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn token_shape() -> Regex {
        Regex::new(r"^\[[A-Z0-9]{2,5}-[0-9A-F]{6}\]$").unwrap()
    }

    #[test]
    fn test_token_format() {
        let token = compute_token("IP4", "192.168.1.100", "salt");
        assert!(token.starts_with("[IP4-"));
        assert!(token_shape().is_match(&token), "bad token {}", token);
    }

    #[test]
    fn test_token_stability() {
        let generator = TokenGenerator::new("fixed", true, "[REDACTED]").unwrap();
        let first = generator.token("EMAIL", "user@example.com");
        let second = generator.token("EMAIL", "user@example.com");
        assert_eq!(first, second);
        assert_eq!(generator.cached_tokens(), 1);
    }

    #[test]
    fn test_salt_changes_token() {
        assert_ne!(
            compute_token("IP4", "10.0.0.1", "a"),
            compute_token("IP4", "10.0.0.1", "b")
        );
    }

    #[test]
    fn test_same_salt_same_token_across_generators() {
        let a = TokenGenerator::new("run-salt", true, "***").unwrap();
        let b = TokenGenerator::new("run-salt", true, "***").unwrap();
        assert_eq!(a.token("IP4", "10.0.0.1"), b.token("IP4", "10.0.0.1"));
    }

    #[test]
    fn test_hashing_disabled_uses_placeholder() {
        let generator = TokenGenerator::new("s", false, "***").unwrap();
        assert_eq!(generator.token("EMAIL", "a@b.com"), "***");
        assert_eq!(generator.cached_tokens(), 0);
    }

    #[test]
    fn test_keyed_token_ignores_hashing_flag() {
        let generator = TokenGenerator::new("s", false, "***").unwrap();
        let token = generator.keyed_token("SITE", "GYC");
        assert!(token.starts_with("[SITE-"));
        assert!(token_shape().is_match(&token));
    }

    #[test]
    fn test_keyed_namespaces_differ() {
        let generator = TokenGenerator::new("s", true, "***").unwrap();
        let db = generator.keyed_token("DB", "CM_GYC");
        let srv = generator.keyed_token("SRV", "CM_GYC");
        assert_ne!(db, srv);
        assert_eq!(db[db.len() - 7..], srv[srv.len() - 7..]);
    }

    #[test]
    fn test_generated_salts_differ() {
        let a = generate_salt().unwrap();
        let b = generate_salt().unwrap();
        assert_eq!(a.len(), GENERATED_SALT_BYTES * 2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_concurrent_inserts_converge() {
        let generator = TokenGenerator::new("shared", true, "***").unwrap();
        let tokens: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| generator.token("HOST", "PRODSRV01")))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(tokens.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(generator.cached_tokens(), 1);
    }
}
