//! Per-layout field extraction from raw item nodes.
//!
//! A [`RawNode`] is the host's view of one item: named text slots (an element
//! id, a class, a test hook; whatever the host keys them by). Each layout
//! knows which slots carry which field and in which order to try them.
//! The first slot with non-blank text wins; text is trimmed.

use crate::domain::{Fields, SieveError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Named text slots of one item as rendered by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawNode {
    slots: HashMap<String, String>,
}

impl RawNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_slot(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.set_slot(name, text);
        self
    }

    pub fn set_slot(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.slots.insert(name.into(), text.into());
    }

    pub fn remove_slot(&mut self, name: &str) {
        self.slots.remove(name);
    }

    #[must_use]
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }

    /// Trimmed text of the first candidate slot with non-blank content.
    #[must_use]
    pub fn first_text(&self, candidates: &[&str]) -> Option<String> {
        candidates
            .iter()
            .filter_map(|name| self.slot(name))
            .map(str::trim)
            .find(|text| !text.is_empty())
            .map(String::from)
    }
}

/// Maps a raw node to the engine's field contract.
///
/// Implementations must not panic on partial nodes: missing slots are
/// absent fields.
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, node: &RawNode) -> Fields;
}

/// Desktop page structure: home grid, search results, watch sidebar,
/// channel grid and shorts shelf all share these slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopLayout;

impl DesktopLayout {
    const TITLE: &'static [&'static str] = &["video-title", "title-wrapper"];
    const CHANNEL: &'static [&'static str] = &[
        "channel-name",
        "text-container",
        "byline-container",
    ];
    const QUANTITY: &'static [&'static str] = &["metadata-line", "video-meta-block"];
}

impl FieldExtractor for DesktopLayout {
    fn extract(&self, node: &RawNode) -> Fields {
        Fields {
            title: node.first_text(Self::TITLE),
            channel_name: node.first_text(Self::CHANNEL),
            quantity_text: node.first_text(Self::QUANTITY),
        }
    }
}

/// Mobile page structure: compact media items.
///
/// The byline there reads `"Channel · 1.2M views · 2 days ago"`, so the
/// channel is its first segment and the count is looked for in the whole
/// byline when no dedicated metadata slot exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct MobileLayout;

impl MobileLayout {
    const TITLE: &'static [&'static str] = &["media-item-headline", "compact-media-headline"];
    const BYLINE: &'static [&'static str] = &["media-item-byline", "compact-media-byline"];
    const QUANTITY: &'static [&'static str] = &["media-item-metadata"];
    const SEPARATOR: char = '·';
}

impl FieldExtractor for MobileLayout {
    fn extract(&self, node: &RawNode) -> Fields {
        let byline = node.first_text(Self::BYLINE);

        let channel_name = byline
            .as_deref()
            .and_then(|b| b.split(Self::SEPARATOR).next())
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(String::from);

        let quantity_text = node.first_text(Self::QUANTITY).or_else(|| {
            byline
                .as_deref()
                .and_then(|b| b.split(Self::SEPARATOR).nth(1))
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(String::from)
        });

        Fields {
            title: node.first_text(Self::TITLE),
            channel_name,
            quantity_text,
        }
    }
}

/// Host layout families, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutVariant {
    #[default]
    Desktop,
    Mobile,
}

impl LayoutVariant {
    /// The extractor implementing this layout.
    #[must_use]
    pub fn extractor(self) -> Box<dyn FieldExtractor> {
        match self {
            Self::Desktop => Box::new(DesktopLayout),
            Self::Mobile => Box::new(MobileLayout),
        }
    }
}

impl FromStr for LayoutVariant {
    type Err = SieveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "mobile" => Ok(Self::Mobile),
            other => Err(SieveError::Config(format!("unknown layout: {other}"))),
        }
    }
}
