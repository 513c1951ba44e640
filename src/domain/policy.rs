//! Filter policy: the stored record and the immutable per-pass snapshot.
//!
//! [`PolicyRecord`] is the shape exchanged with the external configuration
//! store. It is deliberately lenient when reading: missing keys take the
//! installer defaults and malformed values degrade to empty lists or zero
//! instead of rejecting the whole document.
//!
//! [`FilterCriteria`] is derived from a record once per pass. Its keyword and
//! channel sets are pre-normalized (case-folded, blanks dropped) so evaluation
//! never re-normalizes the policy per item.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

/// Filter policy as persisted by the configuration store.
///
/// # Format
///
/// ```json
/// {
///   "enabled": true,
///   "hideFiltered": false,
///   "blockedKeywords": ["spoiler"],
///   "blockedChannels": ["Acme"],
///   "minQuantity": 1000
/// }
/// ```
///
/// The legacy key `minViewCount` is read when `minQuantity` is absent. A
/// record carrying both keys keeps `minQuantity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredPolicy")]
pub struct PolicyRecord {
    pub enabled: bool,
    pub hide_filtered: bool,
    pub blocked_keywords: Vec<String>,
    pub blocked_channels: Vec<String>,
    pub min_quantity: u64,
}

impl Default for PolicyRecord {
    fn default() -> Self {
        Self {
            enabled: true,
            hide_filtered: false,
            blocked_keywords: Vec::new(),
            blocked_channels: Vec::new(),
            min_quantity: 0,
        }
    }
}

/// Document shape as read from the store, before defaults are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredPolicy {
    enabled: Option<bool>,
    hide_filtered: Option<bool>,
    #[serde(deserialize_with = "lenient_list")]
    blocked_keywords: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    blocked_channels: Vec<String>,
    #[serde(deserialize_with = "lenient_optional_count")]
    min_quantity: Option<u64>,
    #[serde(deserialize_with = "lenient_optional_count")]
    min_view_count: Option<u64>,
}

impl From<StoredPolicy> for PolicyRecord {
    fn from(stored: StoredPolicy) -> Self {
        let defaults = Self::default();
        Self {
            enabled: stored.enabled.unwrap_or(defaults.enabled),
            hide_filtered: stored.hide_filtered.unwrap_or(defaults.hide_filtered),
            blocked_keywords: stored.blocked_keywords,
            blocked_channels: stored.blocked_channels,
            min_quantity: stored
                .min_quantity
                .or(stored.min_view_count)
                .unwrap_or(defaults.min_quantity),
        }
    }
}

/// Accepts any array, keeping only its string entries. Anything else is empty.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Accepts integers, non-negative floats (floored) and numeric strings.
/// `null` reads as absent; anything else is 0.
fn lenient_optional_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        Value::Number(n) => Some(n.as_u64().unwrap_or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                // saturating float-to-int cast
                .map_or(0, |f| f.floor() as u64)
        })),
        Value::String(s) => Some(s.trim().parse::<u64>().unwrap_or(0)),
        _ => Some(0),
    })
}

/// How filtered items are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Dim the item and attach an overlay with the reason and a "Show Anyway" action.
    Dim,
    /// Remove the item from view entirely.
    Hide,
}

/// Immutable filter policy snapshot captured at the start of a pass.
///
/// Replacing the snapshot is the only way criteria change; the engine
/// compares consecutive snapshots to detect a policy replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub enabled: bool,
    pub hide_filtered: bool,
    pub min_quantity: u64,
    /// Case-folded, non-blank keywords. Not trimmed: surrounding spaces are significant.
    blocked_keywords: BTreeSet<String>,
    /// Case-folded, trimmed, non-blank channel names.
    blocked_channels: BTreeSet<String>,
}

impl FilterCriteria {
    /// Builds a snapshot from a stored record.
    ///
    /// # Example
    ///
    /// ```
    /// use feedsieve::domain::{FilterCriteria, PolicyRecord};
    ///
    /// let record = PolicyRecord {
    ///     blocked_channels: vec!["  Acme ".to_string(), " ".to_string()],
    ///     ..PolicyRecord::default()
    /// };
    /// let criteria = FilterCriteria::from_record(&record);
    /// assert_eq!(criteria.blocked_channels().collect::<Vec<_>>(), vec!["acme"]);
    /// ```
    #[must_use]
    pub fn from_record(record: &PolicyRecord) -> Self {
        let blocked_keywords = record
            .blocked_keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| k.to_lowercase())
            .collect();

        let blocked_channels = record
            .blocked_channels
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_lowercase)
            .collect();

        Self {
            enabled: record.enabled,
            hide_filtered: record.hide_filtered,
            min_quantity: record.min_quantity,
            blocked_keywords,
            blocked_channels,
        }
    }

    /// Fail-safe snapshot used when the policy cannot be loaded: everything visible.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            hide_filtered: false,
            min_quantity: 0,
            blocked_keywords: BTreeSet::new(),
            blocked_channels: BTreeSet::new(),
        }
    }

    pub fn blocked_keywords(&self) -> impl Iterator<Item = &str> {
        self.blocked_keywords.iter().map(String::as_str)
    }

    pub fn blocked_channels(&self) -> impl Iterator<Item = &str> {
        self.blocked_channels.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_channel_blocked(&self, folded_channel: &str) -> bool {
        self.blocked_channels.contains(folded_channel)
    }

    #[must_use]
    pub const fn display_mode(&self) -> DisplayMode {
        if self.hide_filtered {
            DisplayMode::Hide
        } else {
            DisplayMode::Dim
        }
    }
}

impl From<&PolicyRecord> for FilterCriteria {
    fn from(record: &PolicyRecord) -> Self {
        Self::from_record(record)
    }
}
