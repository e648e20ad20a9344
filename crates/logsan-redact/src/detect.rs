//! Pattern library: one detector per PII category plus the structural
//! patterns used by the rewrite passes.
//!
//! The `regex` crate guarantees linear-time matching but has no look-around,
//! so boundary rules that a backtracking engine would express inline are
//! applied as acceptance predicates over the haystack around each match.

use crate::PiiCategory;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::net::Ipv6Addr;
use std::ops::Range;

/// Capture groups holding the part of a match to replace, in priority order.
const VALUE_GROUPS: &[&str] = &["value", "value_dq", "value_sq"];

/// Detector for a single category.
#[derive(Clone, Copy)]
pub struct Detector {
    category: PiiCategory,
    pattern: &'static Lazy<Regex>,
    accept: fn(&str, Range<usize>) -> bool,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("category", &self.category)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

impl Detector {
    /// Build the detector for a category.
    pub fn for_category(category: PiiCategory) -> Self {
        let (pattern, accept): (&'static Lazy<Regex>, fn(&str, Range<usize>) -> bool) =
            match category {
                PiiCategory::Ipv4 => (&RE_IPV4, accept_ipv4),
                PiiCategory::Ipv6 => (&RE_IPV6_CANDIDATE, accept_ipv6),
                PiiCategory::Email => (&RE_EMAIL, accept_any),
                PiiCategory::CreditCard => (&RE_CREDIT_CARD, accept_not_hyphen_joined),
                PiiCategory::Ssn => (&RE_SSN, accept_not_hyphen_joined),
                PiiCategory::PhoneNumber => (&RE_PHONE, accept_not_digit_adjacent),
                PiiCategory::Iban => (&RE_IBAN, accept_any),
                PiiCategory::Hostname => (&RE_HOSTNAME, accept_any),
                PiiCategory::Fqdn => (&RE_FQDN, accept_fqdn),
                PiiCategory::DomainUser => (&RE_DOMAIN_USER, accept_any),
                PiiCategory::Username => (&RE_USERNAME, accept_username),
                PiiCategory::CertificateThumbprint => (&RE_THUMBPRINT, accept_any),
                PiiCategory::BearerToken => (&RE_BEARER, accept_any),
                PiiCategory::ConnectionStringSecret => (&RE_CONNECTION_SECRET, accept_any),
                PiiCategory::ApiKey => (&RE_API_KEY, accept_any),
            };

        Self {
            category,
            pattern,
            accept,
        }
    }

    /// Category this detector tags matches with.
    pub fn category(&self) -> PiiCategory {
        self.category
    }

    /// Byte ranges to replace in `text`.
    ///
    /// When the pattern has a value group (`value`, `value_dq` or `value_sq`)
    /// only the first one that participated is reported, trimmed of surrounding
    /// whitespace; empty values are dropped.
    pub fn find_spans(&self, text: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if !(self.accept)(text, whole.range()) {
                continue;
            }
            let target = VALUE_GROUPS
                .iter()
                .find_map(|name| caps.name(name))
                .unwrap_or(whole);
            if let Some(span) = trim_span(text, target.range()) {
                spans.push(span);
            }
        }
        spans
    }
}

/// Order in which non-identifier detectors run in the category pass.
/// Context-anchored secrets claim their values before generic shapes.
pub const CATEGORY_PASS_ORDER: &[PiiCategory] = &[
    PiiCategory::BearerToken,
    PiiCategory::ConnectionStringSecret,
    PiiCategory::ApiKey,
    PiiCategory::CertificateThumbprint,
    PiiCategory::Email,
    PiiCategory::Ipv4,
    PiiCategory::CreditCard,
    PiiCategory::Ssn,
    PiiCategory::Iban,
    PiiCategory::PhoneNumber,
];

/// Order in which identifier detectors run, after every other pass.
pub const IDENTIFIER_PASS_ORDER: &[PiiCategory] = &[
    PiiCategory::Hostname,
    PiiCategory::Fqdn,
    PiiCategory::DomainUser,
    PiiCategory::Username,
];

// ---------------------------------------------------------------------------
// Category patterns
// ---------------------------------------------------------------------------

static RE_IPV4: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\.){3}(?:25[0-5]|2[0-4][0-9]|1[0-9]{2}|[1-9]?[0-9])\b",
    )
    .unwrap()
});

// Broad candidate; structure is checked by `accept_ipv6`.
static RE_IPV6_CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:[0-9a-f]{0,4}:){2,7}[0-9a-f]{0,4}(?:%[0-9a-z]+)?").unwrap()
});

// TLD optional: intranet addresses like admin@internal are still PII.
static RE_EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*",
    )
    .unwrap()
});

static RE_CREDIT_CARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:[0-9][ -]?){12,15}[0-9]\b").unwrap());

static RE_SSN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9]{3}-[0-9]{2}-[0-9]{4}\b").unwrap());

// Turkish mobile form first, then the generic international shape.
static RE_PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:(?:\+90[ .-]?|0)?5[0-9]{2}[ .-]?[0-9]{3}[ .-]?[0-9]{2}[ .-]?[0-9]{2})|(?:(?:\+?[0-9]{1,3}[ .-]?)?\(?[0-9]{3}\)?[ .-]?[0-9]{3}[ .-]?[0-9]{4})",
    )
    .unwrap()
});

static RE_IBAN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z]{2}[0-9]{2}[A-Z0-9]{4}[0-9]{7}[A-Z0-9]{0,16}\b").unwrap()
});

static RE_HOSTNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b[a-z0-9-]*(?:sw|srv|server)[a-z0-9-]*\b").unwrap()
});

static RE_FQDN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\b").unwrap()
});

static RE_DOMAIN_USER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[a-zA-Z0-9-]{2,15}\\{1,2}[a-zA-Z0-9._-]{2,30}\b").unwrap()
});

static RE_USERNAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9-]{2,15}\\[a-zA-Z0-9._-]{2,30}").unwrap());

static RE_THUMBPRINT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[0-9a-fA-F]{40}\b").unwrap());

static RE_BEARER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bbearer\s+[A-Za-z0-9_\-.~+/]+=*").unwrap());

/// Quoted values keep their quotes and may contain `;`.
static RE_CONNECTION_SECRET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:password|pwd|user\s*id|uid)\s*=\s*(?:"(?P<value_dq>[^"]*)"|'(?P<value_sq>[^']*)'|["']?(?P<value>[^;"]*))"#,
    )
    .unwrap()
});

static RE_API_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:x-api-key|api[-_]?key)["']?\s*[:=]\s*["']?(?P<value>[A-Za-z0-9_\-.~+/]+)"#,
    )
    .unwrap()
});

// ---------------------------------------------------------------------------
// Structural patterns (rewrite passes 2-6 and 9)
// ---------------------------------------------------------------------------

/// `SMS_XXX` share names and `site_XXX` WMI namespaces.
pub static RE_WMI_SITE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?P<lead>sms_|site_)(?P<value>[a-z0-9]{3})\b").unwrap());

/// LDAP domain component with a tight `DC=` separator.
pub static RE_LDAP_DC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\b(?P<lead>dc=)(?P<value>[^,;\s\[\]"'=]+)"#).unwrap()
});

/// Key/value fields naming a site, database or server.
pub static RE_KEY_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?P<lead>\[?["']?\b(?P<key>sitecode|site|databasename|database|catalog|sqlservername|server|source)\b["']?\]?\s*[:=]\s*["']?)\[?(?P<value>[^\s;,"'\[\]]+)\]?(?P<tail>["']?)"#,
    )
    .unwrap()
});

/// Distinguished-name components.
pub static RE_LDAP_DN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?P<lead>\b(?:cn|ou|dc)\s*=\s*)(?P<value>[^,;\[\]"=\r\n]*[^,;\[\]"=\s])"#)
        .unwrap()
});

/// Scope id or port left dangling behind an IPv6 token.
pub static RE_IPV6_RESIDUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<token>\[IP6-[0-9A-F]{6}\])(?:%[0-9A-Za-z._-]+|:[0-9]{1,5}\b)").unwrap()
});

/// Output the engine itself produces; never re-masked.
pub static RE_PROTECTED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[[A-Z0-9]{2,6}-[0-9A-F]{6}\]|\[DOMAIN\]|\[SITE-CODE\]").unwrap()
});

/// Keyed-token namespace for a key/value field name.
pub fn key_value_prefix(key: &str) -> &'static str {
    match key.to_ascii_lowercase().as_str() {
        "sitecode" | "site" => "SITE",
        "databasename" | "database" | "catalog" => "DB",
        _ => "SRV",
    }
}

// ---------------------------------------------------------------------------
// Allowlist for identifier-shaped matches
// ---------------------------------------------------------------------------

static ALLOWLIST: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "bin", "setup", "system", "system32", "microsoft", "windows", "ccm", "sms", "site",
        "code", "server", "client", "service", "services", "software", "program", "files",
        "programdata", "logs", "log", "temp", "users", "config", "configmgr", "sccm", "inbox",
        "inboxes", "data", "source", "root", "local", "localhost", "default", "admin",
        "password", "pwd", "answer", "switch", "swap", "update", "updates", "install",
        "installer", "driver", "drivers", "boot", "sysvol", "netlogon", "appdata", "roaming",
    ]
    .into_iter()
    .collect()
});

/// True when any sub-token of an identifier match is a common
/// infrastructure word, in which case the match is left alone.
pub fn is_allowlisted(matched: &str) -> bool {
    matched
        .split(|c: char| c.is_whitespace() || matches!(c, '\\' | '/' | '_'))
        .map(|part| {
            part.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase()
        })
        .any(|cleaned| !cleaned.is_empty() && ALLOWLIST.contains(cleaned.as_str()))
}

// ---------------------------------------------------------------------------
// Acceptance predicates
// ---------------------------------------------------------------------------

fn char_before(text: &str, idx: usize) -> Option<char> {
    text[..idx].chars().next_back()
}

fn char_after(text: &str, idx: usize) -> Option<char> {
    text[idx..].chars().next()
}

fn trim_span(text: &str, span: Range<usize>) -> Option<Range<usize>> {
    let slice = &text[span.clone()];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return None;
    }
    let start = span.start + leading;
    Some(start..start + trimmed.len())
}

fn accept_any(_text: &str, _span: Range<usize>) -> bool {
    true
}

fn accept_ipv4(text: &str, span: Range<usize>) -> bool {
    // Reject the tail of a longer dotted token (1.2.3.4.5, v.1.2.3.4).
    if char_before(text, span.start) == Some('.') {
        let before_dot = char_before(text, span.start - 1);
        if before_dot.is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
    }
    if char_after(text, span.end) == Some('.') {
        let after_dot = char_after(text, span.end + 1);
        if after_dot.is_some_and(|c| c.is_ascii_digit()) {
            return false;
        }
    }
    true
}

/// `HH:MM:SS`: exactly two colons, every segment at most two digits.
pub fn is_timestamp_like(candidate: &str) -> bool {
    let segments: Vec<&str> = candidate.split(':').collect();
    segments.len() == 3
        && segments
            .iter()
            .all(|s| !s.is_empty() && s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit()))
}

/// Guard plus structural check for an IPv6 candidate (scope id allowed).
pub fn is_ipv6_address(candidate: &str) -> bool {
    if candidate.len() <= 5 || !candidate.contains(':') || is_timestamp_like(candidate) {
        return false;
    }
    let address = candidate.split('%').next().unwrap_or(candidate);
    address.parse::<Ipv6Addr>().is_ok()
}

fn accept_ipv6(text: &str, span: Range<usize>) -> bool {
    if char_before(text, span.start).is_some_and(|c| c.is_ascii_alphanumeric() || c == ':') {
        return false;
    }
    if char_after(text, span.end).is_some_and(|c| c.is_ascii_alphanumeric()) {
        return false;
    }
    // Embedded IPv4 tails (::ffff:1.2.3.4) are not split in half.
    if char_after(text, span.end) == Some('.')
        && char_after(text, span.end + 1).is_some_and(|c| c.is_ascii_digit())
    {
        return false;
    }
    is_ipv6_address(&text[span])
}

fn accept_not_hyphen_joined(text: &str, span: Range<usize>) -> bool {
    char_before(text, span.start) != Some('-') && char_after(text, span.end) != Some('-')
}

fn accept_not_digit_adjacent(text: &str, span: Range<usize>) -> bool {
    !char_before(text, span.start).is_some_and(|c| c.is_ascii_digit())
        && !char_after(text, span.end).is_some_and(|c| c.is_ascii_digit())
}

const FILE_EXTENSIONS: &[&str] = &[
    "zip", "exe", "dll", "log", "txt", "png", "core", "json", "xml", "config", "ini", "cab",
    "msi", "sys", "cs", "html", "htm", "csv", "dat", "tmp", "bak", "ps1", "bat", "cmd", "sh",
    "jpg", "gif",
];

fn accept_fqdn(text: &str, span: Range<usize>) -> bool {
    let matched = &text[span];
    let last_label = matched.rsplit('.').next().unwrap_or(matched);
    !FILE_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(last_label))
}

fn accept_username(text: &str, span: Range<usize>) -> bool {
    let before_ok = char_before(text, span.start)
        .is_none_or(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'));
    let after_ok = char_after(text, span.end)
        .is_none_or(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | ']'));
    before_ok && after_ok
}
