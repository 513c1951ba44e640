//! The filter engine: criteria, item state and pass execution.
//!
//! [`FilterEngine`] exclusively owns the current criteria snapshot, the
//! [`ItemStateStore`] and the running filtered counter. Nothing else mutates
//! them; the service only feeds it events and executes the actions it returns.
//!
//! # Pass Semantics
//!
//! Every pass receives one immutable criteria snapshot, loaded before the
//! pass starts. Then:
//!
//! 1. If the snapshot differs from the previous one, the policy was replaced:
//!    all item state is cleared (overrides included).
//! 2. If filtering is disabled, a single clear-all sweep is issued on the
//!    transition to disabled and the pass ends.
//! 3. A [`PassKind::Full`] pass clears item state even without a policy change.
//!    Other passes forget items the feed no longer lists, so the counter only
//!    covers items that are still present.
//! 4. Each listed item is handled according to its state:
//!
//! | state          | incremental | periodic | full (after reset) |
//! |----------------|-------------|----------|--------------------|
//! | `Unseen`       | evaluate    | evaluate | evaluate           |
//! | `Evaluated(d)` | skip        | skip     | n/a                |
//! | `Overridden`   | skip        | skip     | n/a                |
//!
//! Only full passes re-extract fields of settled items.
//!
//! Every per-item step checks the current state first, so passes can
//! interleave in any order and a later pass is a no-op for items an earlier
//! one already settled.

use super::actions::Action;
use super::applier::DecisionApplier;
use super::observer::{ChangeObserver, ObserverTimings, PassKind};
use super::store::{ItemState, ItemStateStore};
use crate::adapter::FeedAdapter;
use crate::domain::{FilterCriteria, Fields, ItemId};
use crate::filter::FilterPolicyEvaluator;
use std::collections::HashSet;
use std::sync::Arc;

/// Summary of one pass, logged at debug level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub kind: PassKind,
    /// Items the adapter listed.
    pub listed: usize,
    /// Items whose fields were extracted and evaluated.
    pub evaluated: usize,
    /// Running filtered counter after the pass.
    pub filtered_total: usize,
    /// Whether the pass started with a policy reset.
    pub policy_reset: bool,
}

/// Orchestrates evaluation, state tracking and directive emission.
#[derive(Debug)]
pub struct FilterEngine {
    criteria: Option<Arc<FilterCriteria>>,
    store: ItemStateStore,
    filtered: usize,
    published: Option<usize>,
    evaluator: FilterPolicyEvaluator,
    applier: DecisionApplier,
    observer: ChangeObserver,
}

impl FilterEngine {
    #[must_use]
    pub fn new(evaluator: FilterPolicyEvaluator, timings: ObserverTimings) -> Self {
        Self {
            criteria: None,
            store: ItemStateStore::new(),
            filtered: 0,
            published: None,
            evaluator,
            applier: DecisionApplier,
            observer: ChangeObserver::new(timings),
        }
    }

    /// Criteria snapshot the last pass ran with.
    #[must_use]
    pub fn criteria(&self) -> Option<&FilterCriteria> {
        self.criteria.as_deref()
    }

    #[must_use]
    pub fn item_state(&self, item: ItemId) -> ItemState {
        self.store.get(item)
    }

    /// Running filtered counter.
    #[must_use]
    pub const fn filtered_count(&self) -> usize {
        self.filtered
    }

    #[must_use]
    pub const fn observer(&self) -> &ChangeObserver {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut ChangeObserver {
        &mut self.observer
    }

    /// Runs one pass against `snapshot` and returns the display actions.
    pub fn run_pass(
        &mut self,
        kind: PassKind,
        snapshot: FilterCriteria,
        adapter: &dyn FeedAdapter,
    ) -> (PassReport, Vec<Action>) {
        let _span = tracing::debug_span!("run_pass", pass_kind = ?kind).entered();
        let mut actions = Vec::new();

        let policy_reset = self.criteria.as_deref() != Some(&snapshot);
        let snapshot = if policy_reset {
            tracing::debug!(enabled = snapshot.enabled, "policy replaced, resetting item state");
            self.store.clear();
            self.filtered = 0;
            let snapshot = Arc::new(snapshot);
            self.criteria = Some(Arc::clone(&snapshot));
            snapshot
        } else {
            self.criteria
                .clone()
                .unwrap_or_else(|| Arc::new(snapshot))
        };

        let mut report = PassReport {
            kind,
            listed: 0,
            evaluated: 0,
            filtered_total: 0,
            policy_reset,
        };

        if !snapshot.enabled {
            if policy_reset {
                self.applier
                    .clear_all(&mut self.store, &mut self.filtered, &mut actions);
            }
            self.publish_counter(&mut actions);
            tracing::debug!(report = ?report, "filtering disabled");
            return (report, actions);
        }

        if kind == PassKind::Full && !policy_reset {
            self.store.clear();
            self.filtered = 0;
        }

        let items = match adapter.list_items() {
            Ok(items) => {
                if kind != PassKind::Full {
                    self.forget_removed(&items);
                }
                items
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not list feed items, treating feed as empty");
                Vec::new()
            }
        };
        report.listed = items.len();

        let mode = snapshot.display_mode();
        for item in items {
            if self.store.get(item) != ItemState::Unseen {
                continue;
            }

            let fields = Self::extract(adapter, item);
            let decision = self.evaluator.evaluate(&fields, &snapshot);
            report.evaluated += 1;

            actions.push(self.applier.settle(
                &mut self.store,
                &mut self.filtered,
                item,
                &fields,
                decision,
                mode,
            ));
        }

        report.filtered_total = self.filtered;
        self.publish_counter(&mut actions);
        tracing::debug!(report = ?report, directives = actions.len(), "pass complete");
        (report, actions)
    }

    /// Handles the overlay's "Show Anyway" action for `item`.
    pub fn show_anyway(&mut self, item: ItemId) -> Vec<Action> {
        let mut actions = Vec::new();
        if self
            .applier
            .override_item(&mut self.store, &mut self.filtered, item, &mut actions)
        {
            self.publish_counter(&mut actions);
        }
        actions
    }

    fn forget_removed(&mut self, items: &[ItemId]) {
        let present: HashSet<ItemId> = items.iter().copied().collect();
        let before = self.store.len();
        let removed_filtered = self.store.retain_present(&present);
        self.filtered = self.filtered.saturating_sub(removed_filtered);

        if self.store.len() < before {
            tracing::debug!(
                forgotten = before - self.store.len(),
                removed_filtered,
                "forgot items no longer in the feed"
            );
        }
    }

    /// Extracts fields, isolating adapter failures to the one item.
    fn extract(adapter: &dyn FeedAdapter, item: ItemId) -> Fields {
        adapter.extract_fields(item).unwrap_or_else(|e| {
            tracing::warn!(item = %item, error = %e, "field extraction failed, treating fields as absent");
            Fields::absent()
        })
    }

    fn publish_counter(&mut self, actions: &mut Vec<Action>) {
        if self.published == Some(self.filtered) {
            return;
        }

        self.published = Some(self.filtered);
        actions.push(Action::PublishCounter {
            filtered: self.filtered,
            label: DecisionApplier::counter_label(self.filtered),
        });
    }
}
