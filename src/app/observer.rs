//! Change observation and pass scheduling.
//!
//! The observer turns raw host signals into "run a pass" commands. It has
//! two debounced trigger channels plus a periodic safety timer:
//!
//! | channel     | trigger                         | default window | pass                |
//! |-------------|---------------------------------|----------------|---------------------|
//! | incremental | items appended to the live feed | 150 ms         | [`PassKind::Incremental`] |
//! | navigation  | the feed's location changed     | 1200 ms        | [`PassKind::Full`]        |
//! | periodic    | timer                           | 10 s           | [`PassKind::Periodic`]    |
//!
//! Each new signal on a debounced channel pushes its deadline back, so a
//! burst of mutations produces one pass after the burst settles.
//!
//! The observer holds no clock. Callers pass `now` in, which keeps the
//! schedule deterministic under test and lets the service drive it from
//! the async runtime's timer.

use std::time::{Duration, Instant};

/// What a pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    /// Evaluate only items that are still `Unseen`.
    Incremental,
    /// Clear all item state and evaluate every present item from scratch.
    Full,
    /// Safety net: evaluate `Unseen` items the triggers never reported.
    Periodic,
}

/// Shortest accepted window. Zero windows would keep a deadline pinned at `now`.
pub const MIN_WINDOW: Duration = Duration::from_millis(1);

/// Debounce windows and the periodic interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverTimings {
    pub incremental_debounce: Duration,
    pub navigation_debounce: Duration,
    pub rescan_interval: Duration,
}

impl ObserverTimings {
    /// Raises every window to at least [`MIN_WINDOW`].
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            incremental_debounce: self.incremental_debounce.max(MIN_WINDOW),
            navigation_debounce: self.navigation_debounce.max(MIN_WINDOW),
            rescan_interval: self.rescan_interval.max(MIN_WINDOW),
        }
    }
}

impl Default for ObserverTimings {
    fn default() -> Self {
        Self {
            incremental_debounce: Duration::from_millis(150),
            navigation_debounce: Duration::from_millis(1200),
            rescan_interval: Duration::from_secs(10),
        }
    }
}

/// Debounced scheduler for feed mutations, navigations and periodic rescans.
#[derive(Debug, Clone)]
pub struct ChangeObserver {
    timings: ObserverTimings,
    incremental_due: Option<Instant>,
    full_due: Option<Instant>,
    next_rescan: Option<Instant>,
    location: Option<String>,
}

impl ChangeObserver {
    #[must_use]
    pub fn new(timings: ObserverTimings) -> Self {
        Self {
            timings: timings.clamped(),
            incremental_due: None,
            full_due: None,
            next_rescan: None,
            location: None,
        }
    }

    #[must_use]
    pub const fn timings(&self) -> ObserverTimings {
        self.timings
    }

    /// Starts the periodic timer and remembers the initial feed location.
    pub fn start(&mut self, location: Option<String>, now: Instant) {
        self.location = location;
        self.next_rescan = Some(now + self.timings.rescan_interval);
    }

    /// New items appeared in the live feed.
    pub fn feed_mutated(&mut self, now: Instant) {
        self.incremental_due = Some(now + self.timings.incremental_debounce);
        tracing::trace!("incremental pass rescheduled");
    }

    /// The host reports the feed's current location.
    ///
    /// Returns `true` when the location differs from the last one seen and a
    /// full pass was scheduled.
    pub fn navigated(&mut self, location: &str, now: Instant) -> bool {
        if self.location.as_deref() == Some(location) {
            tracing::trace!(location = %location, "location unchanged");
            return false;
        }

        tracing::debug!(from = ?self.location, to = %location, "feed navigation detected");
        self.location = Some(location.to_string());
        self.full_due = Some(now + self.timings.navigation_debounce);
        true
    }

    /// Returns the pass that is due at `now`, if any.
    ///
    /// A due full pass absorbs any due incremental or periodic pass, and a due
    /// periodic pass absorbs a due incremental one, since each covers the
    /// other's items.
    pub fn poll(&mut self, now: Instant) -> Option<PassKind> {
        let incremental_due = take_due(&mut self.incremental_due, now);
        let periodic_due = self.next_rescan.is_some_and(|at| at <= now);

        if take_due(&mut self.full_due, now) {
            self.next_rescan = Some(now + self.timings.rescan_interval);
            return Some(PassKind::Full);
        }

        if periodic_due {
            self.next_rescan = Some(now + self.timings.rescan_interval);
            return Some(PassKind::Periodic);
        }

        incremental_due.then_some(PassKind::Incremental)
    }

    /// Earliest instant at which [`poll`](Self::poll) may return a pass.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        [self.incremental_due, self.full_due, self.next_rescan]
            .into_iter()
            .flatten()
            .min()
    }
}

fn take_due(slot: &mut Option<Instant>, now: Instant) -> bool {
    if slot.is_some_and(|at| at <= now) {
        *slot = None;
        true
    } else {
        false
    }
}
