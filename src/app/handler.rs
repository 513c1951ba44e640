//! Event handling and state transition logic.
//!
//! This module implements the event handler that turns host signals, timer
//! ticks, control messages and policy I/O completions into engine state
//! changes and action sequences. It is the only place where events reach
//! the [`FilterEngine`].
//!
//! # Architecture
//!
//! The handler follows a unidirectional data flow pattern:
//! 1. Events arrive from the host, the timer or a finished policy operation
//! 2. [`handle_event`] pattern-matches the event type
//! 3. The observer or the engine is updated
//! 4. Actions are collected and returned for execution
//!
//! Policy I/O is asynchronous, so a pass is always split in two: a due pass
//! first yields [`Action::LoadPolicy`], and the pass itself runs when the
//! matching [`Event::PolicyLoaded`] comes back with the snapshot.
//!
//! # Event Types
//!
//! - **Host**: `Started`, `FeedMutated`, `Navigated`, `ShowAnyway`
//! - **Timer**: `Tick`
//! - **Control**: `Control` with a [`ControlMessage`]
//! - **Policy I/O**: `PolicyLoaded`, `PolicyPersisted`

use super::actions::{Action, PolicyChange};
use super::engine::FilterEngine;
use super::observer::PassKind;
use crate::adapter::FeedAdapter;
use crate::domain::{ControlMessage, FilterCriteria, ItemId, PolicyRecord};
use std::time::Instant;

/// Events processed by [`handle_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The feed page is ready. Triggers the initial full pass.
    Started {
        /// Location of the feed at startup, used to detect later navigations.
        location: Option<String>,
    },
    /// Items were appended to the live feed.
    FeedMutated,
    /// The host reports the feed's current location.
    Navigated { location: String },
    /// The scheduler's earliest deadline has passed.
    Tick,
    /// A control message from the settings surface.
    Control(ControlMessage),

    /// A policy load finished.
    PolicyLoaded {
        /// Pass the load was issued for.
        kind: PassKind,
        /// The stored record, or why it could not be read.
        outcome: Result<PolicyRecord, String>,
    },

    /// A policy read-modify-write finished.
    PolicyPersisted { outcome: Result<(), String> },

    /// The user chose "Show Anyway" on a dimmed item.
    ShowAnyway(ItemId),
}

/// Processes an event and returns the actions to execute in order.
///
/// `now` drives the observer's debounce windows. `adapter` is only read when
/// a pass runs.
///
/// # Tracing
///
/// Each call creates a debug-level span with the event type.
pub fn handle_event(
    engine: &mut FilterEngine,
    event: &Event,
    now: Instant,
    adapter: &dyn FeedAdapter,
) -> Vec<Action> {
    let _span = tracing::debug_span!("handle_event", event_type = ?event).entered();

    match event {
        Event::Started { location } => {
            tracing::debug!(location = ?location, "feed started");
            engine.observer_mut().start(location.clone(), now);
            vec![Action::LoadPolicy(PassKind::Full)]
        }
        Event::FeedMutated => {
            engine.observer_mut().feed_mutated(now);
            vec![]
        }
        Event::Navigated { location } => {
            engine.observer_mut().navigated(location, now);
            vec![]
        }
        Event::Tick => engine
            .observer_mut()
            .poll(now)
            .map(|kind| {
                tracing::trace!(pass_kind = ?kind, "pass due");
                vec![Action::LoadPolicy(kind)]
            })
            .unwrap_or_default(),
        Event::Control(message) => {
            tracing::debug!(message = ?message, "control message received");
            match message {
                ControlMessage::PolicyUpdated => vec![Action::LoadPolicy(PassKind::Full)],
                ControlMessage::ToggleHideMode => {
                    vec![Action::PersistPolicy(PolicyChange::ToggleHideMode)]
                }
                ControlMessage::SetEnabled { enabled } => {
                    vec![Action::PersistPolicy(PolicyChange::SetEnabled(*enabled))]
                }
            }
        }
        Event::PolicyPersisted { outcome } => {
            if let Err(e) = outcome {
                tracing::error!(error = %e, "failed to persist policy change");
            }
            vec![Action::LoadPolicy(PassKind::Full)]
        }
        Event::PolicyLoaded { kind, outcome } => {
            let snapshot = match outcome {
                Ok(record) => FilterCriteria::from_record(record),
                Err(e) => {
                    tracing::warn!(error = %e, "policy unavailable, filtering disabled for this pass");
                    FilterCriteria::disabled()
                }
            };
            let (_, actions) = engine.run_pass(*kind, snapshot, adapter);
            actions
        }
        Event::ShowAnyway(item) => engine.show_anyway(*item),
    }
}
