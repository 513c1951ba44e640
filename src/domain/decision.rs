//! Filter decisions and their human-readable reasons.

use super::item::Fields;
use serde::{Deserialize, Serialize};

/// Why an item was filtered.
///
/// Informational only: [`Decision::filtered`] drives behavior, the reason is
/// what the overlay shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterReason {
    None,
    KeywordBlocked,
    ChannelBlocked,
    LowQuantity,
}

/// Outcome of evaluating one item against the current filter criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub filtered: bool,
    pub reason: FilterReason,
}

impl Decision {
    /// The item stays visible.
    pub const PASS: Self = Self {
        filtered: false,
        reason: FilterReason::None,
    };

    /// The item is filtered for the given reason.
    #[must_use]
    pub const fn blocked(reason: FilterReason) -> Self {
        Self {
            filtered: true,
            reason,
        }
    }

    /// Overlay text for a filtered item, `None` when the item passes.
    ///
    /// Low-quantity reasons quote the count text as displayed so the user sees
    /// what the threshold was compared against.
    #[must_use]
    pub fn label(&self, fields: &Fields) -> Option<String> {
        if !self.filtered {
            return None;
        }

        Some(match self.reason {
            FilterReason::KeywordBlocked => "Blocked keyword".to_string(),
            FilterReason::ChannelBlocked => "Blocked channel".to_string(),
            FilterReason::LowQuantity => format!(
                "Low views ({})",
                fields.quantity_text().map_or("", str::trim)
            ),
            FilterReason::None => "Filtered".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_reason() {
        let fields = Fields::absent().with_quantity(" 312 views ");

        assert_eq!(Decision::PASS.label(&fields), None);
        assert_eq!(
            Decision::blocked(FilterReason::KeywordBlocked).label(&fields).as_deref(),
            Some("Blocked keyword")
        );
        assert_eq!(
            Decision::blocked(FilterReason::ChannelBlocked).label(&fields).as_deref(),
            Some("Blocked channel")
        );
        assert_eq!(
            Decision::blocked(FilterReason::LowQuantity).label(&fields).as_deref(),
            Some("Low views (312 views)")
        );
    }
}
