//! Pure policy evaluation: `(fields, criteria) -> Decision`.
//!
//! # Precedence
//!
//! Rules are checked in a fixed order and the first match wins. The order
//! decides which reason is shown when several rules apply.
//!
//! 1. Filtering disabled: pass unconditionally.
//! 2. Title contains a blocked keyword (case-insensitive substring).
//! 3. Channel name equals a blocked channel (case-insensitive, trimmed, exact).
//! 4. Parsed quantity is known (`> 0`) and below `min_quantity`.
//! 5. Otherwise pass.
//!
//! Absent or blank fields never match their rule.

use super::quantity::QuantityParser;
use crate::domain::{Decision, FilterCriteria, FilterReason, Fields};

/// Evaluates extracted fields against a criteria snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPolicyEvaluator {
    parser: QuantityParser,
}

impl FilterPolicyEvaluator {
    #[must_use]
    pub const fn new(parser: QuantityParser) -> Self {
        Self { parser }
    }

    /// Decides whether an item is filtered and why.
    ///
    /// # Example
    ///
    /// ```
    /// use feedsieve::domain::{Fields, FilterCriteria, FilterReason, PolicyRecord};
    /// use feedsieve::filter::FilterPolicyEvaluator;
    ///
    /// let criteria = FilterCriteria::from_record(&PolicyRecord {
    ///     blocked_keywords: vec!["spoiler".into()],
    ///     ..PolicyRecord::default()
    /// });
    /// let fields = Fields::absent().with_title("Finale SPOILERS inside");
    ///
    /// let decision = FilterPolicyEvaluator::default().evaluate(&fields, &criteria);
    /// assert_eq!(decision.reason, FilterReason::KeywordBlocked);
    /// ```
    #[must_use]
    pub fn evaluate(&self, fields: &Fields, criteria: &FilterCriteria) -> Decision {
        if !criteria.enabled {
            return Decision::PASS;
        }

        if keyword_blocked(fields, criteria) {
            return Decision::blocked(FilterReason::KeywordBlocked);
        }

        if channel_blocked(fields, criteria) {
            return Decision::blocked(FilterReason::ChannelBlocked);
        }

        let quantity = self.quantity_of(fields);
        if quantity > 0 && quantity < criteria.min_quantity {
            return Decision::blocked(FilterReason::LowQuantity);
        }

        Decision::PASS
    }

    /// Parsed quantity of an item, `0` when absent or unreadable.
    #[must_use]
    pub fn quantity_of(&self, fields: &Fields) -> u64 {
        fields.quantity_text().map_or(0, |text| self.parser.parse(text))
    }
}

/// Evaluates with the default quantity parser.
#[must_use]
pub fn evaluate(fields: &Fields, criteria: &FilterCriteria) -> Decision {
    FilterPolicyEvaluator::default().evaluate(fields, criteria)
}

fn keyword_blocked(fields: &Fields, criteria: &FilterCriteria) -> bool {
    let Some(title) = fields.title() else {
        return false;
    };
    let title = title.to_lowercase();
    criteria.blocked_keywords().any(|keyword| title.contains(keyword))
}

fn channel_blocked(fields: &Fields, criteria: &FilterCriteria) -> bool {
    fields
        .channel_name()
        .is_some_and(|channel| criteria.is_channel_blocked(&channel.trim().to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PolicyRecord;
    use crate::filter::UnitPolicy;

    fn criteria(record: PolicyRecord) -> FilterCriteria {
        FilterCriteria::from_record(&record)
    }

    fn strict_policy() -> FilterCriteria {
        criteria(PolicyRecord {
            blocked_keywords: vec!["reaction".into()],
            blocked_channels: vec!["Acme".into()],
            min_quantity: 1_000,
            ..PolicyRecord::default()
        })
    }

    #[test]
    fn disabled_policy_never_filters() {
        let mut record = PolicyRecord {
            blocked_keywords: vec!["reaction".into()],
            blocked_channels: vec!["Acme".into()],
            min_quantity: 1_000_000,
            ..PolicyRecord::default()
        };
        record.enabled = false;

        let fields = Fields::absent()
            .with_title("Reaction video")
            .with_channel("Acme")
            .with_quantity("12 views");

        assert_eq!(evaluate(&fields, &criteria(record)), Decision::PASS);
    }

    #[test]
    fn keyword_takes_precedence_over_channel_and_quantity() {
        let fields = Fields::absent()
            .with_title("My REACTION to the trailer")
            .with_channel("Acme")
            .with_quantity("12 views");

        assert_eq!(
            evaluate(&fields, &strict_policy()),
            Decision::blocked(FilterReason::KeywordBlocked)
        );
    }

    #[test]
    fn channel_takes_precedence_over_quantity() {
        let fields = Fields::absent()
            .with_title("Trailer")
            .with_channel("  acme ")
            .with_quantity("12 views");

        assert_eq!(
            evaluate(&fields, &strict_policy()),
            Decision::blocked(FilterReason::ChannelBlocked)
        );
    }

    #[test]
    fn channel_match_is_exact_not_substring() {
        let fields = Fields::absent().with_title("Trailer").with_channel("Acme Extras");
        assert_eq!(evaluate(&fields, &strict_policy()), Decision::PASS);
    }

    #[test]
    fn low_quantity_filters_known_counts_only() {
        let low = Fields::absent().with_title("Trailer").with_quantity("999 views");
        assert_eq!(
            evaluate(&low, &strict_policy()),
            Decision::blocked(FilterReason::LowQuantity)
        );

        let enough = Fields::absent().with_title("Trailer").with_quantity("1K views");
        assert_eq!(evaluate(&enough, &strict_policy()), Decision::PASS);

        let unknown = Fields::absent().with_quantity("garbage");
        assert_eq!(evaluate(&unknown, &strict_policy()), Decision::PASS);

        let missing = Fields::absent();
        assert_eq!(evaluate(&missing, &strict_policy()), Decision::PASS);
    }

    #[test]
    fn absent_fields_fail_open_per_rule() {
        // No title, but the channel rule still applies.
        let fields = Fields::absent().with_channel("Acme");
        assert_eq!(
            evaluate(&fields, &strict_policy()),
            Decision::blocked(FilterReason::ChannelBlocked)
        );
    }

    #[test]
    fn blank_keywords_never_match() {
        let policy = criteria(PolicyRecord {
            blocked_keywords: vec!["   ".into(), String::new()],
            blocked_channels: vec![" ".into()],
            ..PolicyRecord::default()
        });
        let fields = Fields::absent().with_title("anything at all").with_channel(" ");
        assert_eq!(evaluate(&fields, &policy), Decision::PASS);
    }

    #[test]
    fn quantity_rule_honors_unit_policy() {
        let policy = criteria(PolicyRecord {
            min_quantity: 1_000,
            ..PolicyRecord::default()
        });
        let fields = Fields::absent().with_quantity("500");

        let lenient = FilterPolicyEvaluator::new(QuantityParser::new(UnitPolicy::Optional));
        assert_eq!(
            lenient.evaluate(&fields, &policy),
            Decision::blocked(FilterReason::LowQuantity)
        );

        let strict = FilterPolicyEvaluator::new(QuantityParser::new(UnitPolicy::Required));
        assert_eq!(strict.evaluate(&fields, &policy), Decision::PASS);
    }
}
