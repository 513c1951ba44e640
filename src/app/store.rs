//! Per-item processing state.
//!
//! # State Machine
//!
//! ```text
//!            evaluate                  manual override
//! Unseen ───────────────► Evaluated(d) ──────────────────► Overridden
//!   ▲                          │                               │
//!   └──────────────── policy reset / full pass ────────────────┘
//! ```
//!
//! Only `Evaluated` items with a filtered decision can be overridden.
//! `Overridden` is terminal until the store is cleared.

use crate::domain::{Decision, ItemId};
use std::collections::{HashMap, HashSet};

/// Processing state of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemState {
    /// Not evaluated since the last reset.
    #[default]
    Unseen,
    /// Evaluated against the current policy generation.
    Evaluated(Decision),
    /// The user chose "Show Anyway" on a filtered item.
    Overridden,
}

impl ItemState {
    /// Whether the item currently counts toward the filtered total.
    #[must_use]
    pub const fn is_filtered(&self) -> bool {
        matches!(self, Self::Evaluated(d) if d.filtered)
    }
}

/// Item states keyed by item identity, exclusively owned by the engine.
///
/// Items the store has never seen read as [`ItemState::Unseen`].
#[derive(Debug, Default)]
pub struct ItemStateStore {
    states: HashMap<ItemId, ItemState>,
}

impl ItemStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, item: ItemId) -> ItemState {
        self.states.get(&item).copied().unwrap_or_default()
    }

    /// Records an evaluation, returning the previous state.
    pub fn record(&mut self, item: ItemId, decision: Decision) -> ItemState {
        self.states
            .insert(item, ItemState::Evaluated(decision))
            .unwrap_or_default()
    }

    /// Moves a filtered item to `Overridden`.
    ///
    /// Returns `false` (and changes nothing) unless the item is currently
    /// `Evaluated` with a filtered decision.
    pub fn override_item(&mut self, item: ItemId) -> bool {
        match self.states.get_mut(&item) {
            Some(state) if state.is_filtered() => {
                *state = ItemState::Overridden;
                true
            }
            _ => false,
        }
    }

    /// Forgets every item: the next pass sees them all as `Unseen`.
    pub fn clear(&mut self) {
        self.states.clear();
    }

    /// Forgets items that are no longer present in the feed.
    ///
    /// Returns how many of the forgotten items were counted as filtered.
    pub fn retain_present(&mut self, present: &HashSet<ItemId>) -> usize {
        let mut removed_filtered = 0;
        self.states.retain(|item, state| {
            let keep = present.contains(item);
            if !keep && state.is_filtered() {
                removed_filtered += 1;
            }
            keep
        });
        removed_filtered
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of items currently `Evaluated` with a filtered decision.
    #[must_use]
    pub fn filtered_count(&self) -> usize {
        self.states.values().filter(|s| s.is_filtered()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FilterReason;

    #[test]
    fn unknown_items_are_unseen() {
        let store = ItemStateStore::new();
        assert_eq!(store.get(ItemId(1)), ItemState::Unseen);
        assert!(store.is_empty());
    }

    #[test]
    fn only_filtered_items_can_be_overridden() {
        let mut store = ItemStateStore::new();
        store.record(ItemId(1), Decision::blocked(FilterReason::ChannelBlocked));
        store.record(ItemId(2), Decision::PASS);

        assert!(store.override_item(ItemId(1)));
        assert_eq!(store.get(ItemId(1)), ItemState::Overridden);

        assert!(!store.override_item(ItemId(2)));
        assert!(!store.override_item(ItemId(3)));
        assert!(!store.override_item(ItemId(1)), "override is terminal");
    }

    #[test]
    fn clear_resets_everything() {
        let mut store = ItemStateStore::new();
        store.record(ItemId(1), Decision::blocked(FilterReason::LowQuantity));
        store.override_item(ItemId(1));
        store.record(ItemId(2), Decision::blocked(FilterReason::LowQuantity));
        assert_eq!(store.filtered_count(), 1);

        store.clear();
        assert_eq!(store.get(ItemId(1)), ItemState::Unseen);
        assert_eq!(store.filtered_count(), 0);
    }

    #[test]
    fn removed_items_are_forgotten() {
        let mut store = ItemStateStore::new();
        store.record(ItemId(1), Decision::blocked(FilterReason::KeywordBlocked));
        store.record(ItemId(2), Decision::PASS);
        store.record(ItemId(3), Decision::blocked(FilterReason::LowQuantity));
        store.override_item(ItemId(3));
        store.record(ItemId(4), Decision::blocked(FilterReason::ChannelBlocked));

        let present = HashSet::from([ItemId(4)]);
        assert_eq!(store.retain_present(&present), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(ItemId(1)), ItemState::Unseen);
        assert_eq!(store.filtered_count(), 1);
    }
}
