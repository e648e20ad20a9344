//! Multi-pass content rewriter.
//!
//! A line goes through an ordered list of stages. Structural stages (WMI
//! paths, LDAP components, key/value fields) claim their substrings before
//! generic category detectors see the text, and identifier detectors run
//! last so the allowlist inspects raw text rather than earlier replacements.
//!
//! Every replacement a stage makes is recorded as a claimed span and carried
//! through later stages. A candidate overlapping a claimed span or an
//! existing token shape (`[CODE-XXXXXX]`, `[DOMAIN]`, `[SITE-CODE]`) is
//! skipped, so re-running the rewriter over its own output leaves tokens
//! intact while placeholder text in the input stays ordinary text.

use crate::config::SanitizationConfig;
use crate::detect::{
    self, Detector, CATEGORY_PASS_ORDER, IDENTIFIER_PASS_ORDER, RE_IPV6_RESIDUE, RE_KEY_VALUE,
    RE_LDAP_DC, RE_LDAP_DN, RE_PROTECTED, RE_WMI_SITE,
};
use crate::error::{Result, SanitizeError};
use crate::hash::TokenGenerator;
use crate::PiiCategory;
use regex::Regex;
use std::ops::Range;

/// Fixed replacement for tight `DC=` domain components.
pub const DOMAIN_LITERAL: &str = "[DOMAIN]";

/// Fixed replacement for configured site-code literals.
pub const SITE_CODE_LITERAL: &str = "[SITE-CODE]";

/// One rewrite stage.
#[derive(Debug)]
enum Pass {
    Ipv6(Detector),
    WmiSiteCode,
    LdapDomain,
    KeyValue,
    LdapDn,
    SiteLiteral(Regex),
    Categories(Vec<Detector>),
    Identifiers(Vec<Detector>),
    Ipv6Residue,
}

impl Pass {
    fn name(&self) -> &'static str {
        match self {
            Pass::Ipv6(_) => "ipv6",
            Pass::WmiSiteCode => "wmi_site_code",
            Pass::LdapDomain => "ldap_domain",
            Pass::KeyValue => "key_value",
            Pass::LdapDn => "ldap_dn",
            Pass::SiteLiteral(_) => "site_literal",
            Pass::Categories(_) => "categories",
            Pass::Identifiers(_) => "identifiers",
            Pass::Ipv6Residue => "ipv6_residue",
        }
    }
}

/// A single replacement within a stage's input.
struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// Sorted, disjoint spans that candidates must not overlap.
struct Guard {
    spans: Vec<Range<usize>>,
}

impl Guard {
    fn new(protected: impl Iterator<Item = Range<usize>>, claimed: &[Range<usize>]) -> Self {
        let mut all: Vec<Range<usize>> = protected.chain(claimed.iter().cloned()).collect();
        all.sort_unstable_by_key(|span| span.start);

        let mut spans: Vec<Range<usize>> = Vec::with_capacity(all.len());
        for span in all {
            match spans.last_mut() {
                Some(last) if span.start < last.end => last.end = last.end.max(span.end),
                _ => spans.push(span),
            }
        }
        Self { spans }
    }

    fn blocks(&self, range: &Range<usize>) -> bool {
        overlaps(&self.spans, range)
    }
}

/// Whether `range` overlaps any of the sorted, disjoint `spans`.
fn overlaps(spans: &[Range<usize>], range: &Range<usize>) -> bool {
    let idx = spans.partition_point(|span| span.end <= range.start);
    spans.get(idx).is_some_and(|span| span.start < range.end)
}

/// Text under rewrite plus the spans earlier stages replaced.
struct Draft {
    text: String,
    claimed: Vec<Range<usize>>,
}

impl Draft {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            claimed: Vec::new(),
        }
    }

    fn is_claimed(&self, range: &Range<usize>) -> bool {
        overlaps(&self.claimed, range)
    }

    fn guard(&self) -> Guard {
        Guard::new(
            RE_PROTECTED.find_iter(&self.text).map(|m| m.range()),
            &self.claimed,
        )
    }

    /// Apply sorted, non-overlapping edits that avoid every claimed span,
    /// shifting the claimed spans and claiming each non-empty replacement.
    fn apply(&mut self, edits: Vec<Edit>) {
        if edits.is_empty() {
            return;
        }
        let mut text = String::with_capacity(self.text.len());
        let mut claimed = Vec::with_capacity(self.claimed.len() + edits.len());
        let mut previous = std::mem::take(&mut self.claimed).into_iter().peekable();
        let mut cursor = 0;

        for edit in edits {
            while let Some(span) = previous.next_if(|span| span.end <= edit.range.start) {
                let start = text.len() + (span.start - cursor);
                claimed.push(start..start + span.len());
            }
            text.push_str(&self.text[cursor..edit.range.start]);
            let start = text.len();
            text.push_str(&edit.replacement);
            if text.len() > start {
                claimed.push(start..text.len());
            }
            cursor = edit.range.end;
        }
        for span in previous {
            let start = text.len() + (span.start - cursor);
            claimed.push(start..start + span.len());
        }
        text.push_str(&self.text[cursor..]);

        self.text = text;
        self.claimed = claimed;
    }
}

/// Applies the ordered stage list to text.
#[derive(Debug)]
pub struct ContentRewriter {
    passes: Vec<Pass>,
    tokens: TokenGenerator,
}

impl ContentRewriter {
    /// Build the stage list for `config`.
    pub fn new(config: &SanitizationConfig, tokens: TokenGenerator) -> Result<Self> {
        let active = |category: &&PiiCategory| config.targets_category(**category);
        let mut passes = Vec::new();

        if config.targets_category(PiiCategory::Ipv6) {
            passes.push(Pass::Ipv6(Detector::for_category(PiiCategory::Ipv6)));
        }
        passes.push(Pass::WmiSiteCode);
        passes.push(Pass::LdapDomain);
        passes.push(Pass::KeyValue);
        passes.push(Pass::LdapDn);
        if let Some(literals) = site_literal_pattern(&config.site_code_literals)? {
            passes.push(Pass::SiteLiteral(literals));
        }

        let categories: Vec<Detector> = CATEGORY_PASS_ORDER
            .iter()
            .filter(active)
            .map(|c| Detector::for_category(*c))
            .collect();
        if !categories.is_empty() {
            passes.push(Pass::Categories(categories));
        }

        let identifiers: Vec<Detector> = IDENTIFIER_PASS_ORDER
            .iter()
            .filter(active)
            .map(|c| Detector::for_category(*c))
            .collect();
        if !identifiers.is_empty() {
            passes.push(Pass::Identifiers(identifiers));
        }

        if config.targets_category(PiiCategory::Ipv6) {
            passes.push(Pass::Ipv6Residue);
        }

        Ok(Self { passes, tokens })
    }

    /// Names of the active stages, in order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(Pass::name).collect()
    }

    /// Token generator backing this rewriter.
    pub fn tokens(&self) -> &TokenGenerator {
        &self.tokens
    }

    /// Run every stage over `text`.
    pub fn rewrite(&self, text: &str) -> String {
        let mut draft = Draft::new(text);
        for pass in &self.passes {
            let edits = match pass {
                Pass::Ipv6(detector) => self.detector_edits(&draft, detector),
                Pass::WmiSiteCode => self.keyed_group(&draft, &RE_WMI_SITE, "SITE"),
                Pass::LdapDomain => ldap_domain(&draft),
                Pass::KeyValue => self.key_value(&draft),
                Pass::LdapDn => self.keyed_group(&draft, &RE_LDAP_DN, "DN"),
                Pass::SiteLiteral(pattern) => site_literal(&draft, pattern),
                Pass::Categories(detectors) | Pass::Identifiers(detectors) => {
                    for detector in detectors {
                        let edits = self.detector_edits(&draft, detector);
                        draft.apply(edits);
                    }
                    continue;
                }
                Pass::Ipv6Residue => ipv6_residue(&draft),
            };
            draft.apply(edits);
        }
        draft.text
    }

    fn detector_edits(&self, draft: &Draft, detector: &Detector) -> Vec<Edit> {
        let text = draft.text.as_str();
        let guard = draft.guard();
        let code = detector.category().code();
        let allowlisted = detector.category().is_identifier();
        detector
            .find_spans(text)
            .into_iter()
            .filter(|span| !guard.blocks(span))
            .filter(|span| !(allowlisted && detect::is_allowlisted(&text[span.clone()])))
            .map(|span| Edit {
                replacement: self.tokens.token(code, &text[span.clone()]),
                range: span,
            })
            .collect()
    }

    /// Replace the `value` group of every match with a keyed token.
    fn keyed_group(&self, draft: &Draft, pattern: &Regex, prefix: &str) -> Vec<Edit> {
        let guard = draft.guard();
        let mut edits = Vec::new();
        for caps in pattern.captures_iter(&draft.text) {
            let Some(value) = caps.name("value") else {
                continue;
            };
            let range = value.range();
            if guard.blocks(&range) {
                continue;
            }
            edits.push(Edit {
                replacement: self.tokens.keyed_token(prefix, value.as_str()),
                range,
            });
        }
        edits
    }

    /// Key/value fields: the value, including optional surrounding
    /// brackets, becomes a keyed token chosen by the key name. The whole
    /// field, key included, is claimed so later stages leave it alone; a
    /// field whose value is already a token is claimed unchanged.
    fn key_value(&self, draft: &Draft) -> Vec<Edit> {
        let guard = draft.guard();
        let mut edits = Vec::new();
        for caps in RE_KEY_VALUE.captures_iter(&draft.text) {
            let (Some(lead), Some(key), Some(value), Some(tail)) = (
                caps.name("lead"),
                caps.name("key"),
                caps.name("value"),
                caps.name("tail"),
            ) else {
                continue;
            };
            let range = lead.start()..tail.end();
            if draft.is_claimed(&range) {
                continue;
            }
            let replacement = if guard.blocks(&value.range()) {
                draft.text[range.clone()].to_string()
            } else if guard.blocks(&range) {
                continue;
            } else {
                let prefix = detect::key_value_prefix(key.as_str());
                let token = self.tokens.keyed_token(prefix, value.as_str());
                format!("{}{}{}", lead.as_str(), token, tail.as_str())
            };
            edits.push(Edit { range, replacement });
        }
        edits
    }
}

fn ldap_domain(draft: &Draft) -> Vec<Edit> {
    let guard = draft.guard();
    RE_LDAP_DC
        .captures_iter(&draft.text)
        .filter_map(|caps| caps.name("value"))
        .map(|value| value.range())
        .filter(|range| !guard.blocks(range))
        .map(|range| Edit {
            range,
            replacement: DOMAIN_LITERAL.to_string(),
        })
        .collect()
}

fn site_literal(draft: &Draft, pattern: &Regex) -> Vec<Edit> {
    let guard = draft.guard();
    pattern
        .find_iter(&draft.text)
        .map(|m| m.range())
        .filter(|range| !guard.blocks(range))
        .map(|range| Edit {
            range,
            replacement: SITE_CODE_LITERAL.to_string(),
        })
        .collect()
}

/// Drop `%scope` or `:port` left directly behind an `IP6` token.
fn ipv6_residue(draft: &Draft) -> Vec<Edit> {
    let guard = draft.guard();
    RE_IPV6_RESIDUE
        .captures_iter(&draft.text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let token = caps.name("token")?;
            Some(token.end()..whole.end())
        })
        .filter(|range| !guard.blocks(range))
        .map(|range| Edit {
            range,
            replacement: String::new(),
        })
        .collect()
}

fn site_literal_pattern(literals: &[String]) -> Result<Option<Regex>> {
    let alternatives: Vec<String> = literals
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .map(regex::escape)
        .collect();
    if alternatives.is_empty() {
        return Ok(None);
    }
    let source = format!(r"\b(?:{})\b", alternatives.join("|"));
    Regex::new(&source)
        .map(Some)
        .map_err(|e| SanitizeError::Pattern(format!("site code literals: {}", e)))
}
