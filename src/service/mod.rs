//! Async runtime driver for the filter engine.
//!
//! [`FilterService`] owns a [`FilterEngine`], the host (a [`FeedAdapter`] that
//! is also a [`DisplaySink`]) and a [`PolicyStore`]. It is the only component
//! that performs side effects: it feeds events to [`handle_event`], executes
//! the returned [`Action`]s, and turns finished policy I/O back into events.
//!
//! # Lifecycle
//!
//! ```text
//!   host ──HostSignal──▶ ServiceHandle ──mpsc──▶ run loop ◀── timer (observer deadline)
//!                                                   │
//!                                handle_event ◀─────┤
//!                                     │             │
//!                                  Actions ────────▶ PolicyStore / DisplaySink
//! ```
//!
//! Events are processed strictly one at a time, including the follow-up
//! events produced by policy I/O, so passes never interleave within one
//! service. The loop ends on [`HostSignal::Shutdown`] or when every
//! [`ServiceHandle`] is dropped.

use crate::adapter::{DisplaySink, FeedAdapter};
use crate::app::{handle_event, Action, Event, FilterEngine, PolicyChange};
use crate::domain::{ControlMessage, ItemId, Result, SieveError};
use crate::storage::PolicyStore;
use std::collections::VecDeque;
use tokio::sync::{mpsc, oneshot};

/// Completion of a control message, sent once its policy write finished.
type Ack = oneshot::Sender<Result<()>>;

/// Signals the host sends to a running service.
#[derive(Debug)]
pub enum HostSignal {
    /// Items were appended to the live feed.
    FeedMutated,
    /// The feed's current location, reported after any page change.
    Navigated(String),
    /// A decoded control message.
    Control(ControlMessage),
    /// A decoded control message whose completion is reported on `ack`.
    ///
    /// For toggles the acknowledgment carries the outcome of the policy
    /// write; other messages are acknowledged once handled.
    AckedControl { message: ControlMessage, ack: Ack },
    /// A raw JSON control message; malformed or unknown ones are ignored.
    ControlJson(String),
    /// "Show Anyway" was chosen on an item's overlay.
    ShowAnyway(ItemId),
    /// Stop the run loop.
    Shutdown,
}

/// Cloneable sender side of a [`FilterService`].
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    tx: mpsc::UnboundedSender<HostSignal>,
}

impl ServiceHandle {
    /// Sends a raw signal.
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::Channel`] once the service has stopped.
    pub fn send(&self, signal: HostSignal) -> Result<()> {
        self.tx
            .send(signal)
            .map_err(|e| SieveError::Channel(format!("filter service stopped, dropped {:?}", e.0)))
    }

    /// Sends a control message and waits until the service handled it.
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::Channel`] if the service stopped before
    /// answering, or the policy write error for toggles whose write failed.
    pub async fn control_acked(&self, message: ControlMessage) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(HostSignal::AckedControl { message, ack })?;
        done.await
            .map_err(|_| SieveError::Channel("filter service stopped before acknowledging".to_string()))?
    }

    /// # Errors
    ///
    /// Returns [`SieveError::Channel`] once the service has stopped.
    pub fn feed_mutated(&self) -> Result<()> {
        self.send(HostSignal::FeedMutated)
    }

    /// # Errors
    ///
    /// Returns [`SieveError::Channel`] once the service has stopped.
    pub fn navigated(&self, location: impl Into<String>) -> Result<()> {
        self.send(HostSignal::Navigated(location.into()))
    }

    /// # Errors
    ///
    /// Returns [`SieveError::Channel`] once the service has stopped.
    pub fn control(&self, message: ControlMessage) -> Result<()> {
        self.send(HostSignal::Control(message))
    }

    /// # Errors
    ///
    /// Returns [`SieveError::Channel`] once the service has stopped.
    pub fn control_json(&self, payload: impl Into<String>) -> Result<()> {
        self.send(HostSignal::ControlJson(payload.into()))
    }

    /// # Errors
    ///
    /// Returns [`SieveError::Channel`] once the service has stopped.
    pub fn show_anyway(&self, item: ItemId) -> Result<()> {
        self.send(HostSignal::ShowAnyway(item))
    }

    /// # Errors
    ///
    /// Returns [`SieveError::Channel`] if the service has already stopped.
    pub fn shutdown(&self) -> Result<()> {
        self.send(HostSignal::Shutdown)
    }
}

enum Wake {
    Signal(Option<HostSignal>),
    Deadline,
}

/// Drives a [`FilterEngine`] against a live host.
pub struct FilterService<H, S> {
    engine: FilterEngine,
    host: H,
    store: S,
    rx: mpsc::UnboundedReceiver<HostSignal>,
}

impl<H, S> FilterService<H, S>
where
    H: FeedAdapter + DisplaySink,
    S: PolicyStore,
{
    #[must_use]
    pub fn new(engine: FilterEngine, host: H, store: S) -> (Self, ServiceHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let service = Self {
            engine,
            host,
            store,
            rx,
        };
        (service, ServiceHandle { tx })
    }

    /// Runs until shutdown and hands the engine back.
    ///
    /// Starts with a full pass over the feed at `initial_location`.
    #[tracing::instrument(name = "filter_service", level = "debug", skip_all)]
    pub async fn run(mut self, initial_location: Option<String>) -> FilterEngine {
        tracing::debug!(location = ?initial_location, "filter service started");

        self.dispatch(
            Event::Started {
                location: initial_location,
            },
            None,
        )
        .await;

        loop {
            let deadline = self.engine.observer().next_deadline();

            let wake = tokio::select! {
                signal = self.rx.recv() => Wake::Signal(signal),
                () = sleep_until(deadline) => Wake::Deadline,
            };

            let (event, ack) = match wake {
                Wake::Deadline => (Event::Tick, None),
                Wake::Signal(None | Some(HostSignal::Shutdown)) => break,
                Wake::Signal(Some(HostSignal::AckedControl { message, ack })) => {
                    (Event::Control(message), Some(ack))
                }
                Wake::Signal(Some(signal)) => match Self::translate(signal) {
                    Some(event) => (event, None),
                    None => continue,
                },
            };

            self.dispatch(event, ack).await;
        }

        tracing::debug!(
            filtered_total = self.engine.filtered_count(),
            "filter service stopped"
        );
        self.engine
    }

    fn translate(signal: HostSignal) -> Option<Event> {
        match signal {
            HostSignal::FeedMutated => Some(Event::FeedMutated),
            HostSignal::Navigated(location) => Some(Event::Navigated { location }),
            HostSignal::Control(message) => Some(Event::Control(message)),
            HostSignal::ControlJson(payload) => ControlMessage::from_json(&payload).map(Event::Control),
            HostSignal::ShowAnyway(item) => Some(Event::ShowAnyway(item)),
            HostSignal::AckedControl { message, .. } => Some(Event::Control(message)),
            HostSignal::Shutdown => None,
        }
    }

    /// Handles `event` and every follow-up event its actions produce.
    ///
    /// `ack` fires when the first policy write completes, or after the last
    /// follow-up event when nothing was written.
    async fn dispatch(&mut self, event: Event, mut ack: Option<Ack>) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let now = tokio::time::Instant::now().into_std();
            let actions = handle_event(&mut self.engine, &event, now, &self.host);

            for action in actions {
                if let Some(follow_up) = self.execute_action(action, &mut ack).await {
                    queue.push_back(follow_up);
                }
            }
        }

        if let Some(ack) = ack {
            let _ = ack.send(Ok(()));
        }
    }

    async fn execute_action(&mut self, action: Action, ack: &mut Option<Ack>) -> Option<Event> {
        match action {
            Action::LoadPolicy(kind) => {
                let outcome = self.store.load().await.map_err(|e| e.to_string());
                Some(Event::PolicyLoaded { kind, outcome })
            }
            Action::PersistPolicy(change) => {
                tracing::debug!(change = ?change, "persisting policy change");
                let outcome = Self::persist(&self.store, change).await.map_err(|e| e.to_string());
                if let Some(ack) = ack.take() {
                    let _ = ack.send(outcome.clone().map_err(SieveError::Storage));
                }
                Some(Event::PolicyPersisted { outcome })
            }
            Action::Apply { item, directive } => {
                if let Err(e) = self.host.apply(item, &directive) {
                    tracing::warn!(item = %item, error = %e, "failed to apply directive");
                }
                None
            }
            Action::ClearAll => {
                tracing::debug!("clearing all directives");
                if let Err(e) = self.host.clear_all() {
                    tracing::warn!(error = %e, "failed to clear directives");
                }
                None
            }
            Action::PublishCounter { filtered, label } => {
                if let Err(e) = self.host.publish_counter(filtered, label.as_deref()) {
                    tracing::warn!(filtered_total = filtered, error = %e, "failed to publish counter");
                }
                None
            }
        }
    }

    /// Read-modify-write of one policy field.
    async fn persist(store: &S, change: PolicyChange) -> Result<()> {
        let mut record = store.load().await?;
        change.apply_to(&mut record);
        store.save(&record).await
    }
}

impl<H, S> std::fmt::Debug for FilterService<H, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterService")
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

async fn sleep_until(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}
