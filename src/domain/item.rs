//! Feed items and the text fields extracted from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle identifying one feed entry.
///
/// Identity is assigned by the host environment and stays stable across
/// re-scans for as long as the host keeps the underlying entry alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Raw text fields of one item, as supplied by the feed adapter.
///
/// Any field may be absent. Fields are extracted fresh for every evaluation
/// and never cached, so edits to live content are picked up by the next
/// full or periodic pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    pub title: Option<String>,
    pub channel_name: Option<String>,
    pub quantity_text: Option<String>,
}

impl Fields {
    /// Fields with nothing extracted. Used when the adapter fails on an item.
    #[must_use]
    pub fn absent() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_channel(mut self, channel_name: impl Into<String>) -> Self {
        self.channel_name = Some(channel_name.into());
        self
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity_text: impl Into<String>) -> Self {
        self.quantity_text = Some(quantity_text.into());
        self
    }

    /// Returns the title if it has any non-whitespace content.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Returns the channel name if it has any non-whitespace content.
    #[must_use]
    pub fn channel_name(&self) -> Option<&str> {
        non_blank(self.channel_name.as_deref())
    }

    /// Returns the quantity text if it has any non-whitespace content.
    #[must_use]
    pub fn quantity_text(&self) -> Option<&str> {
        non_blank(self.quantity_text.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
