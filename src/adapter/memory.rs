//! In-memory feed host.
//!
//! [`MemoryFeed`] holds the feed as a list of [`RawNode`]s and records every
//! directive written to it. Clones share the same feed, so one clone can be
//! handed to the service while another keeps mutating the feed and reading
//! back what was displayed.

use super::layout::{FieldExtractor, LayoutVariant, RawNode};
use super::{DisplaySink, FeedAdapter};
use crate::app::Directive;
use crate::domain::{Fields, ItemId, Result, SieveError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct FeedState {
    items: Vec<(ItemId, RawNode)>,
    next_id: u64,
    directives: HashMap<ItemId, Directive>,
    directive_writes: usize,
    counter: Option<String>,
    unreadable: HashSet<ItemId>,
}

/// Shared, mutable in-memory feed implementing both host traits.
#[derive(Clone)]
pub struct MemoryFeed {
    state: Arc<Mutex<FeedState>>,
    extractor: Arc<dyn FieldExtractor>,
}

impl MemoryFeed {
    #[must_use]
    pub fn new(layout: LayoutVariant) -> Self {
        Self::with_extractor(Arc::from(layout.extractor()))
    }

    #[must_use]
    pub fn with_extractor(extractor: Arc<dyn FieldExtractor>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState::default())),
            extractor,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, FeedState>> {
        self.state
            .lock()
            .map_err(|e| SieveError::Adapter(format!("feed state poisoned: {e}")))
    }

    /// Appends an item, as lazy loading or pagination would.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed state is poisoned.
    pub fn push(&self, node: RawNode) -> Result<ItemId> {
        let mut state = self.lock()?;
        state.next_id += 1;
        let id = ItemId(state.next_id);
        state.items.push((id, node));
        Ok(id)
    }

    /// Replaces the whole feed, as a navigation would. Old directives go with
    /// the old items.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed state is poisoned.
    pub fn replace(&self, nodes: Vec<RawNode>) -> Result<Vec<ItemId>> {
        let mut state = self.lock()?;
        state.items.clear();
        state.directives.clear();
        state.unreadable.clear();

        let mut ids = Vec::with_capacity(nodes.len());
        for node in nodes {
            state.next_id += 1;
            let id = ItemId(state.next_id);
            state.items.push((id, node));
            ids.push(id);
        }
        Ok(ids)
    }

    /// Removes one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed state is poisoned.
    pub fn remove(&self, item: ItemId) -> Result<()> {
        let mut state = self.lock()?;
        state.items.retain(|(id, _)| *id != item);
        state.directives.remove(&item);
        Ok(())
    }

    /// Edits one text slot of a live item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist or the state is poisoned.
    pub fn set_slot(&self, item: ItemId, slot: &str, text: &str) -> Result<()> {
        let mut state = self.lock()?;
        let node = state
            .items
            .iter_mut()
            .find(|(id, _)| *id == item)
            .map(|(_, node)| node)
            .ok_or_else(|| SieveError::Adapter(format!("no such item: {item}")))?;
        node.set_slot(slot, text);
        Ok(())
    }

    /// Makes field extraction fail for one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the feed state is poisoned.
    pub fn make_unreadable(&self, item: ItemId) -> Result<()> {
        self.lock()?.unreadable.insert(item);
        Ok(())
    }

    /// Last directive written for `item`, if any survives.
    #[must_use]
    pub fn directive(&self, item: ItemId) -> Option<Directive> {
        self.lock().ok()?.directives.get(&item).cloned()
    }

    /// Whether `item` is currently shown without dimming, overlay or hiding.
    #[must_use]
    pub fn is_visible(&self, item: ItemId) -> bool {
        matches!(self.directive(item), None | Some(Directive::Reveal))
    }

    /// Total number of directive writes since creation.
    #[must_use]
    pub fn directive_writes(&self) -> usize {
        self.lock().map_or(0, |s| s.directive_writes)
    }

    /// Currently published counter label.
    #[must_use]
    pub fn counter_label(&self) -> Option<String> {
        self.lock().ok()?.counter.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().map_or(0, |s| s.items.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FeedAdapter for MemoryFeed {
    fn list_items(&self) -> Result<Vec<ItemId>> {
        Ok(self.lock()?.items.iter().map(|(id, _)| *id).collect())
    }

    fn extract_fields(&self, item: ItemId) -> Result<Fields> {
        let state = self.lock()?;
        if state.unreadable.contains(&item) {
            return Err(SieveError::Adapter(format!("{item} could not be read")));
        }

        let node = state
            .items
            .iter()
            .find(|(id, _)| *id == item)
            .map(|(_, node)| node)
            .ok_or_else(|| SieveError::Adapter(format!("{item} is gone")))?;

        Ok(self.extractor.extract(node))
    }
}

impl DisplaySink for MemoryFeed {
    fn apply(&mut self, item: ItemId, directive: &Directive) -> Result<()> {
        let mut state = self.lock()?;
        state.directive_writes += 1;
        state.directives.insert(item, directive.clone());
        Ok(())
    }

    fn clear_all(&mut self) -> Result<()> {
        let mut state = self.lock()?;
        state.directive_writes += 1;
        state.directives.clear();
        Ok(())
    }

    fn publish_counter(&mut self, _filtered: usize, label: Option<&str>) -> Result<()> {
        self.lock()?.counter = label.map(String::from);
        Ok(())
    }
}

impl std::fmt::Debug for MemoryFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryFeed")
            .field("items", &self.len())
            .finish_non_exhaustive()
    }
}
