//! Abbreviated count parsing ("1.2M views" → 1 200 000).
//!
//! The parser never fails. Anything it cannot read yields `0`, which callers
//! must treat as "unknown", never as "literally zero".
//!
//! # Accepted forms
//!
//! - digits with optional thousands commas: `1,200 views`
//! - fractional literals with a magnitude suffix: `1.2M`, `3.4k watching`
//! - suffixes `K` (10³), `M` (10⁶), `B` (10⁹), case-insensitive
//! - an optional unit word after the number (`view`, `views`, `play`, `plays`, `watching`)
//!
//! Fractional results are floored. Arithmetic is done on the decimal digits
//! directly so `1.2M` is exactly `1_200_000`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Number followed by an optional suffix and a unit word.
static UNIT_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(?:\.(\d+))?\s*([kmb])?\s*(?:views?|plays?|watching)\b")
        .expect("unit count pattern is valid")
});

/// Bare number with an optional standalone suffix (`1.2M`, but not `1 Monkey`).
static BARE_COUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(?:\.(\d+))?(?:\s*([kmb])\b)?").expect("bare count pattern is valid")
});

/// Digits beyond this many in a fraction cannot change a floored count.
const MAX_FRACTION_DIGITS: usize = 18;

/// Whether a count must be followed by a unit word to be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitPolicy {
    /// A unit-bearing count is preferred, but a bare number is accepted.
    #[default]
    Optional,
    /// Only counts followed by a unit word are recognized.
    Required,
}

/// Parses abbreviated human-readable counts into integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuantityParser {
    policy: UnitPolicy,
}

impl QuantityParser {
    #[must_use]
    pub const fn new(policy: UnitPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub const fn policy(&self) -> UnitPolicy {
        self.policy
    }

    /// Parses `text` into a count, `0` when nothing recognizable is present.
    ///
    /// # Example
    ///
    /// ```
    /// use feedsieve::filter::{QuantityParser, UnitPolicy};
    ///
    /// let parser = QuantityParser::default();
    /// assert_eq!(parser.parse("1.2M views"), 1_200_000);
    /// assert_eq!(parser.parse("1,200 views"), 1_200);
    /// assert_eq!(parser.parse("500"), 500);
    /// assert_eq!(parser.parse(""), 0);
    ///
    /// let strict = QuantityParser::new(UnitPolicy::Required);
    /// assert_eq!(strict.parse("500"), 0);
    /// ```
    #[must_use]
    pub fn parse(&self, text: &str) -> u64 {
        let normalized = normalize(text);
        if normalized.trim().is_empty() {
            return 0;
        }

        let captures = UNIT_COUNT.captures(&normalized).or_else(|| match self.policy {
            UnitPolicy::Optional => BARE_COUNT.captures(&normalized),
            UnitPolicy::Required => None,
        });

        let Some(captures) = captures else {
            tracing::trace!(text = %text, policy = ?self.policy, "no count recognized");
            return 0;
        };

        let whole = captures.get(1).map_or("", |m| m.as_str());
        let fraction = captures.get(2).map_or("", |m| m.as_str());
        let multiplier = captures
            .get(3)
            .map_or(1, |m| suffix_multiplier(m.as_str()));

        scale(whole, fraction, multiplier)
    }
}

/// Parses `text` with the default (bare numbers accepted) policy.
#[must_use]
pub fn parse_quantity(text: &str) -> u64 {
    QuantityParser::default().parse(text)
}

/// Drops thousands separators and folds non-breaking spaces into plain spaces.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ',')
        .map(|c| if matches!(c, '\u{a0}' | '\u{202f}') { ' ' } else { c })
        .collect()
}

fn suffix_multiplier(suffix: &str) -> u64 {
    match suffix {
        "k" | "K" => 1_000,
        "m" | "M" => 1_000_000,
        "b" | "B" => 1_000_000_000,
        _ => 1,
    }
}

/// Computes `whole.fraction * multiplier`, floored and saturated to `u64`.
fn scale(whole: &str, fraction: &str, multiplier: u64) -> u64 {
    let multiplier = u128::from(multiplier);
    let whole: u128 = whole.parse().unwrap_or(u128::from(u64::MAX));

    let fraction = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
    let fractional = if fraction.is_empty() {
        0
    } else {
        let digits: u128 = fraction.parse().unwrap_or(0);
        // at most 18 digits, fits in u32
        let denominator = 10u128.pow(fraction.len() as u32);
        digits * multiplier / denominator
    };

    let total = whole.saturating_mul(multiplier).saturating_add(fractional);
    u64::try_from(total).unwrap_or(u64::MAX)
}
