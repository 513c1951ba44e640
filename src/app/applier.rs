//! Turning decisions into display directives.
//!
//! The applier is the only producer of [`Directive`]s. It owns no state: it
//! updates the engine's [`ItemStateStore`] and filtered counter that are
//! handed to it, and appends the resulting [`Action`]s to the caller's batch.

use super::actions::Action;
use super::store::ItemStateStore;
use crate::domain::{Decision, DisplayMode, Fields, ItemId};

/// Label of the overlay action that overrides a filtered item.
pub const SHOW_ANYWAY_LABEL: &str = "Show Anyway";

/// Overlay attached to a dimmed item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    /// Human-readable reason, e.g. `"Blocked channel"`.
    pub reason: String,
    /// Label of the override action.
    pub action_label: String,
}

/// Abstract visibility instruction for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Fully visible, no dimming and no overlay.
    Reveal,
    /// Dimmed with an overlay carrying the reason and the override action.
    Dim(Overlay),
    /// Removed from view.
    Hide,
}

/// Applies decisions and manual overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionApplier;

impl DecisionApplier {
    /// Directive for a decision under the given display mode.
    #[must_use]
    pub fn directive_for(decision: &Decision, fields: &Fields, mode: DisplayMode) -> Directive {
        let Some(reason) = decision.label(fields) else {
            return Directive::Reveal;
        };

        match mode {
            DisplayMode::Hide => Directive::Hide,
            DisplayMode::Dim => Directive::Dim(Overlay {
                reason,
                action_label: SHOW_ANYWAY_LABEL.to_string(),
            }),
        }
    }

    /// Records `decision` for `item` and returns the directive to apply.
    ///
    /// Adjusts the filtered counter by the difference between the previous
    /// and the new state, so re-settling an already counted item never
    /// double counts.
    pub fn settle(
        &self,
        store: &mut ItemStateStore,
        filtered: &mut usize,
        item: ItemId,
        fields: &Fields,
        decision: Decision,
        mode: DisplayMode,
    ) -> Action {
        let previous = store.record(item, decision);

        match (previous.is_filtered(), decision.filtered) {
            (false, true) => *filtered += 1,
            (true, false) => *filtered = filtered.saturating_sub(1),
            _ => {}
        }

        let directive = Self::directive_for(&decision, fields, mode);
        tracing::debug!(
            item = %item,
            filtered = decision.filtered,
            reason = ?decision.reason,
            directive = ?directive,
            "item settled"
        );
        Action::Apply { item, directive }
    }

    /// Handles "Show Anyway": `Evaluated(filtered)` → `Overridden`.
    ///
    /// Returns `false` without side effects for items that are not
    /// currently filtered (already overridden, passing, or unknown).
    pub fn override_item(
        &self,
        store: &mut ItemStateStore,
        filtered: &mut usize,
        item: ItemId,
        actions: &mut Vec<Action>,
    ) -> bool {
        if !store.override_item(item) {
            tracing::debug!(item = %item, state = ?store.get(item), "override ignored");
            return false;
        }

        *filtered = filtered.saturating_sub(1);
        tracing::debug!(item = %item, filtered_total = *filtered, "item overridden");
        actions.push(Action::Apply {
            item,
            directive: Directive::Reveal,
        });
        true
    }

    /// Global sweep used while filtering is disabled.
    pub fn clear_all(&self, store: &mut ItemStateStore, filtered: &mut usize, actions: &mut Vec<Action>) {
        store.clear();
        *filtered = 0;
        actions.push(Action::ClearAll);
    }

    /// Counter text shown to the user, `None` hides the counter.
    #[must_use]
    pub fn counter_label(filtered: usize) -> Option<String> {
        (filtered > 0).then(|| format!("Filtered: {filtered} videos"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilterReason;

    #[test]
    fn directive_depends_on_display_mode() {
        let fields = Fields::absent().with_quantity("12 views");
        let decision = Decision::blocked(FilterReason::LowQuantity);

        assert_eq!(
            DecisionApplier::directive_for(&decision, &fields, DisplayMode::Hide),
            Directive::Hide
        );
        assert_eq!(
            DecisionApplier::directive_for(&decision, &fields, DisplayMode::Dim),
            Directive::Dim(Overlay {
                reason: "Low views (12 views)".into(),
                action_label: "Show Anyway".into(),
            })
        );
        assert_eq!(
            DecisionApplier::directive_for(&Decision::PASS, &fields, DisplayMode::Hide),
            Directive::Reveal
        );
    }

    #[test]
    fn settle_and_override_keep_counter_consistent() {
        let applier = DecisionApplier;
        let mut store = ItemStateStore::new();
        let mut filtered = 0;
        let mut actions = Vec::new();
        let blocked = Decision::blocked(FilterReason::KeywordBlocked);

        for _ in 0..2 {
            let action = applier.settle(&mut store, &mut filtered, ItemId(1), &Fields::absent(), blocked, DisplayMode::Dim);
            assert!(matches!(action, Action::Apply { directive: Directive::Dim(_), .. }));
        }
        assert_eq!(filtered, 1);

        assert!(applier.override_item(&mut store, &mut filtered, ItemId(1), &mut actions));
        assert_eq!(filtered, 0);
        assert_eq!(
            actions.last(),
            Some(&Action::Apply { item: ItemId(1), directive: Directive::Reveal })
        );

        assert!(!applier.override_item(&mut store, &mut filtered, ItemId(1), &mut actions));
        assert_eq!(filtered, 0);
        assert_eq!(filtered, store.filtered_count());
    }

    #[test]
    fn counter_label_hides_at_zero() {
        assert_eq!(DecisionApplier::counter_label(0), None);
        assert_eq!(DecisionApplier::counter_label(3).as_deref(), Some("Filtered: 3 videos"));
    }
}
