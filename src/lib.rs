//! Feedsieve: a continuous filtering engine for live, lazily loaded feeds.
//!
//! Feedsieve watches a feed of items (videos, posts, listings) that grows
//! as the user scrolls and changes as they navigate, and decides for every
//! item whether it is shown, dimmed behind an overlay or hidden:
//! - Keyword rules matched against item titles
//! - Exact channel rules matched against the item's channel name
//! - A minimum view count parsed from abbreviated text such as `"1.2M views"`
//! - Per-item "Show Anyway" overrides that survive incremental passes
//! - Policy changes that reconcile the whole feed, including re-filtering
//!   items the user had revealed
//!
//! # Architecture
//!
//! The crate follows a layered architecture pattern:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Service (service/)                                 │  ← Async runtime driver
//! │  - Host signal channel, timer, action execution     │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling, pass scheduling                  │
//! │  - Item state, decisions → directives               │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Filter        │   │ Storage       │   │ Adapter       │
//! │ (filter/)     │   │ (storage/)    │   │ (adapter/)    │
//! │ - Quantities  │   │ - JSON policy │   │ - Feed access │
//! │ - Rules       │   │ - In-memory   │   │ - Layouts     │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Paths (infrastructure/)                          │
//! │  - Errors, items, decisions, policy (domain/)       │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry tracing, OTLP JSON file export     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`adapter`]: Host boundary traits, layout field extraction, in-memory feed
//! - [`app`]: Filter engine state machine with event/action model
//! - [`domain`]: Core domain types (items, decisions, policy, errors)
//! - [`filter`]: Quantity parsing and rule evaluation
//! - [`infrastructure`]: Platform-specific utilities (paths)
//! - [`service`]: Async driver executing actions against host and store
//! - [`storage`]: Policy persistence
//! - [`observability`]: Tracing subscriber and OTLP file export
//!
//! # Configuration
//!
//! ```toml
//! # feedsieve.toml
//! incremental_debounce_ms = 150
//! navigation_debounce_ms = 1200
//! rescan_interval_ms = 10000
//! require_quantity_unit = false
//! layout = "desktop"
//! policy_path = "~/.local/share/feedsieve/policy.json"
//! trace_level = "debug"
//! trace_file = "~/.local/share/feedsieve/feedsieve-otlp.json"
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration**: [`Config::from_file`], [`Config::from_toml_str`] or
//!    [`Config::from_map`] for string key/value host configuration
//! 2. **Tracing**: [`observability::init_tracing`] (optional)
//! 3. **Engine**: [`initialize`] builds a [`FilterEngine`]
//! 4. **Service**: [`FilterService::new`] pairs it with the host and the
//!    policy store; [`FilterService::run`] performs the initial full pass
//!    and then reacts to [`ServiceHandle`] signals and its own timers
//!
//! # Example
//!
//! ```rust
//! use feedsieve::adapter::{MemoryFeed, RawNode};
//! use feedsieve::storage::MemoryPolicyStore;
//! use feedsieve::{initialize, Config, FilterService, PolicyRecord};
//!
//! # async fn demo() -> feedsieve::Result<()> {
//! let config = Config::default();
//! let feed = MemoryFeed::new(config.layout);
//! let store = MemoryPolicyStore::new(PolicyRecord {
//!     blocked_keywords: vec!["spoiler".to_string()],
//!     ..PolicyRecord::default()
//! });
//!
//! let (service, handle) = FilterService::new(initialize(&config), feed.clone(), store);
//! let running = tokio::spawn(service.run(Some("/feed/home".to_string())));
//!
//! feed.push(RawNode::new().with_slot("video-title", "Finale spoilers"))?;
//! handle.feed_mutated()?;
//! handle.shutdown()?;
//! # let _ = running.await;
//! # Ok(())
//! # }
//! ```
//!
//! # Key Design Decisions
//!
//! ## Fail Open
//!
//! Nothing the engine depends on can hide content by failing: an unreadable
//! policy disables filtering for the pass, an unreadable item is evaluated
//! with absent fields, and an unparsable view count is zero, which never
//! filters.
//!
//! ## One Snapshot Per Pass
//!
//! The policy is loaded once before a pass and the pass only ever sees that
//! snapshot. A changed snapshot resets all item state, which is how policy
//! changes reach already-settled and overridden items.

#![allow(clippy::multiple_crate_versions)]

pub mod adapter;
pub mod app;
pub mod domain;
pub mod filter;
pub mod infrastructure;
pub mod observability;
pub mod service;
pub mod storage;

pub use adapter::{DisplaySink, FeedAdapter, LayoutVariant, MemoryFeed};
pub use app::{handle_event, Action, Directive, Event, FilterEngine, ObserverTimings, PassKind};
pub use domain::{
    ControlMessage, Decision, FilterCriteria, FilterReason, Fields, ItemId, PolicyRecord, Result,
    SieveError,
};
pub use filter::{FilterPolicyEvaluator, QuantityParser, UnitPolicy};
pub use service::{FilterService, HostSignal, ServiceHandle};
pub use storage::{JsonPolicyStore, MemoryPolicyStore, PolicyStore};

use infrastructure::expand_tilde;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Engine configuration.
///
/// Every key is optional; missing keys take the defaults below.
///
/// | key                       | default   |
/// |---------------------------|-----------|
/// | `incremental_debounce_ms` | `150`     |
/// | `navigation_debounce_ms`  | `1200`    |
/// | `rescan_interval_ms`      | `10000`   |
/// | `require_quantity_unit`   | `false`   |
/// | `layout`                  | `desktop` |
/// | `policy_path`             | data dir  |
/// | `trace_level`             | `info`    |
/// | `trace_file`              | none      |
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Debounce window for appended items.
    pub incremental_debounce_ms: u64,

    /// Debounce window after a navigation, giving the new page time to render.
    pub navigation_debounce_ms: u64,

    /// Period of the safety pass that catches items no trigger reported.
    pub rescan_interval_ms: u64,

    /// Only accept view counts followed by a unit word (`views`, `plays`, `watching`).
    pub require_quantity_unit: bool,

    /// Page structure the field extractor reads.
    pub layout: LayoutVariant,

    /// JSON policy file. `~` is expanded. Default: `<data dir>/policy.json`.
    pub policy_path: Option<PathBuf>,

    /// Tracing filter directive, e.g. `"debug"` or `"feedsieve=trace"`.
    pub trace_level: Option<String>,

    /// OTLP JSON trace output. Tracing goes to stderr when unset.
    pub trace_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        let timings = ObserverTimings::default();
        Self {
            incremental_debounce_ms: duration_ms(timings.incremental_debounce),
            navigation_debounce_ms: duration_ms(timings.navigation_debounce),
            rescan_interval_ms: duration_ms(timings.rescan_interval),
            require_quantity_unit: false,
            layout: LayoutVariant::default(),
            policy_path: None,
            trace_level: None,
            trace_file: None,
        }
    }
}

impl Config {
    /// Parses configuration from a string key/value map.
    ///
    /// Hosts that only pass strings (plugin manifests, query parameters,
    /// environment-style settings) use this. Values that fail to parse fall
    /// back to their defaults with a debug log; unknown keys are ignored.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::collections::BTreeMap;
    /// use feedsieve::{Config, LayoutVariant};
    ///
    /// let mut map = BTreeMap::new();
    /// map.insert("layout".to_string(), "mobile".to_string());
    /// map.insert("rescan_interval_ms".to_string(), "5000".to_string());
    ///
    /// let config = Config::from_map(&map);
    /// assert_eq!(config.layout, LayoutVariant::Mobile);
    /// assert_eq!(config.rescan_interval_ms, 5000);
    /// ```
    #[must_use]
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();

        Self {
            incremental_debounce_ms: parse_or(map, "incremental_debounce_ms", defaults.incremental_debounce_ms),
            navigation_debounce_ms: parse_or(map, "navigation_debounce_ms", defaults.navigation_debounce_ms),
            rescan_interval_ms: parse_or(map, "rescan_interval_ms", defaults.rescan_interval_ms),
            require_quantity_unit: parse_or(map, "require_quantity_unit", defaults.require_quantity_unit),
            layout: parse_or(map, "layout", defaults.layout),
            policy_path: non_blank(map, "policy_path").map(expand_tilde),
            trace_level: non_blank(map, "trace_level").map(String::from),
            trace_file: non_blank(map, "trace_file").map(expand_tilde),
        }
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::Config`] for malformed TOML, unknown keys or
    /// values of the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| SieveError::Config(format!("failed to parse TOML: {e}")))?;
        Ok(config.with_expanded_paths())
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`SieveError::Io`] if the file cannot be read and
    /// [`SieveError::Config`] if it cannot be parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = ?path, "loading configuration");
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Debounce windows and rescan period, each at least one millisecond.
    #[must_use]
    pub fn timings(&self) -> ObserverTimings {
        ObserverTimings {
            incremental_debounce: Duration::from_millis(self.incremental_debounce_ms),
            navigation_debounce: Duration::from_millis(self.navigation_debounce_ms),
            rescan_interval: Duration::from_millis(self.rescan_interval_ms),
        }
        .clamped()
    }

    #[must_use]
    pub const fn unit_policy(&self) -> UnitPolicy {
        if self.require_quantity_unit {
            UnitPolicy::Required
        } else {
            UnitPolicy::Optional
        }
    }

    /// Effective policy file location.
    #[must_use]
    pub fn policy_path(&self) -> PathBuf {
        self.policy_path
            .clone()
            .unwrap_or_else(infrastructure::default_policy_path)
    }

    /// JSON policy store at [`policy_path`](Self::policy_path).
    #[must_use]
    pub fn policy_store(&self) -> JsonPolicyStore {
        JsonPolicyStore::new(self.policy_path())
    }

    fn with_expanded_paths(mut self) -> Self {
        self.policy_path = self.policy_path.map(|p| expand_tilde(&p.to_string_lossy()));
        self.trace_file = self.trace_file.map(|p| expand_tilde(&p.to_string_lossy()));
        self
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn non_blank<'a>(map: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn parse_or<T>(map: &BTreeMap<String, String>, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = non_blank(map, key) else {
        return default;
    };

    raw.parse().unwrap_or_else(|e| {
        tracing::debug!(key = %key, value = %raw, error = %e, "invalid config value, using default");
        default
    })
}

/// Builds a filter engine from configuration.
///
/// The engine starts with no criteria and no item state; the first pass
/// loads both. Call [`observability::init_tracing`] first to see its logs.
///
/// # Example
///
/// ```rust
/// use feedsieve::{initialize, Config};
///
/// let engine = initialize(&Config::default());
/// assert_eq!(engine.filtered_count(), 0);
/// ```
#[must_use]
pub fn initialize(config: &Config) -> FilterEngine {
    tracing::debug!(
        layout = ?config.layout,
        unit_policy = ?config.unit_policy(),
        "initializing filter engine"
    );

    let evaluator = FilterPolicyEvaluator::new(QuantityParser::new(config.unit_policy()));
    FilterEngine::new(evaluator, config.timings())
}
