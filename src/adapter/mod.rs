//! Host environment boundary.
//!
//! The engine never touches markup. It sees the feed through two traits:
//!
//! - [`FeedAdapter`]: lists the items currently present and extracts their
//!   text fields.
//! - [`DisplaySink`]: receives visibility directives and the filtered counter.
//!
//! Field extraction for a concrete page structure is delegated to a
//! [`FieldExtractor`], with one implementation per [`LayoutVariant`] chosen
//! at startup. [`MemoryFeed`] is an in-process host built on those pieces,
//! used by embedders that already hold the feed as data and by the tests.
//!
//! # Modules
//!
//! - [`layout`]: raw item nodes and per-layout field extraction
//! - [`memory`]: in-memory feed host

pub mod layout;
pub mod memory;

pub use layout::{FieldExtractor, LayoutVariant, RawNode};
pub use memory::MemoryFeed;

use crate::app::Directive;
use crate::domain::{Fields, ItemId, Result};

/// Read access to the live feed.
///
/// Implementations are queried on every pass and must not cache item lists.
pub trait FeedAdapter {
    /// Items currently present, in feed order. May be empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be queried. The engine treats this
    /// as an empty feed for the pass.
    fn list_items(&self) -> Result<Vec<ItemId>>;

    /// Text fields of one item. Missing pieces are reported as absent fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be read at all. The engine treats
    /// this as full field absence for that item only.
    fn extract_fields(&self, item: ItemId) -> Result<Fields>;
}

/// Write access to item presentation.
pub trait DisplaySink {
    /// Applies a visibility directive to one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item cannot be updated.
    fn apply(&mut self, item: ItemId, directive: &Directive) -> Result<()>;

    /// Removes every directive from every item.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be updated.
    fn clear_all(&mut self) -> Result<()>;

    /// Publishes the filtered counter. `label` is `None` when it should be hidden.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot be updated.
    fn publish_counter(&mut self, filtered: usize, label: Option<&str>) -> Result<()>;
}
