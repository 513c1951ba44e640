//! Application layer coordinating state, events, and actions.
//!
//! This module defines the core filtering logic, sitting between the filter
//! service (service/) and the domain/filter/adapter layers. It implements
//! the event-driven architecture that drives every pass.
//!
//! # Architecture
//!
//! The application layer follows a unidirectional data flow pattern:
//!
//! ```text
//! Host Signals → Events → Event Handler → Engine Mutations → Actions → Side Effects
//!                             ↑                                  ↓
//!                             └──────── Policy I/O Results ──────┘
//! ```
//!
//! # Modules
//!
//! - [`actions`]: Side effect commands emitted by the event handler
//! - [`applier`]: Decision → display directive translation
//! - [`engine`]: Criteria snapshot, item state and pass execution
//! - [`handler`]: Event processing logic and state transition coordinator
//! - [`observer`]: Debounced pass scheduling
//! - [`store`]: Per-item evaluation state
//!
//! # Example
//!
//! ```rust
//! use std::time::Instant;
//! use feedsieve::adapter::{LayoutVariant, MemoryFeed};
//! use feedsieve::app::{handle_event, Action, Event, FilterEngine, ObserverTimings, PassKind};
//! use feedsieve::filter::FilterPolicyEvaluator;
//!
//! let feed = MemoryFeed::new(LayoutVariant::Desktop);
//! let mut engine = FilterEngine::new(FilterPolicyEvaluator::default(), ObserverTimings::default());
//! let actions = handle_event(&mut engine, &Event::Started { location: None }, Instant::now(), &feed);
//! assert_eq!(actions, vec![Action::LoadPolicy(PassKind::Full)]);
//! ```

pub mod actions;
pub mod applier;
pub mod engine;
pub mod handler;
pub mod observer;
pub mod store;

pub use actions::{Action, PolicyChange};
pub use applier::{DecisionApplier, Directive, Overlay, SHOW_ANYWAY_LABEL};
pub use engine::{FilterEngine, PassReport};
pub use handler::{handle_event, Event};
pub use observer::{ChangeObserver, ObserverTimings, PassKind};
pub use store::{ItemState, ItemStateStore};
