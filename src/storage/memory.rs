//! In-process policy store.

use crate::domain::{PolicyRecord, Result, SieveError};
use crate::storage::backend::PolicyStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Shared {
    record: Mutex<PolicyRecord>,
    failing: AtomicBool,
    loads: AtomicUsize,
}

/// Policy store kept in memory. Clones share the same record.
///
/// Lets embedders push policy changes without a file, and can be switched
/// into a failing mode to exercise the unavailable-policy path.
#[derive(Debug, Clone, Default)]
pub struct MemoryPolicyStore {
    shared: Arc<Shared>,
}

impl MemoryPolicyStore {
    #[must_use]
    pub fn new(record: PolicyRecord) -> Self {
        Self {
            shared: Arc::new(Shared {
                record: Mutex::new(record),
                ..Shared::default()
            }),
        }
    }

    /// Replaces the record without going through [`PolicyStore::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the record lock is poisoned.
    pub fn set(&self, record: PolicyRecord) -> Result<()> {
        *self.lock()? = record;
        Ok(())
    }

    /// Current record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record lock is poisoned.
    pub fn get(&self) -> Result<PolicyRecord> {
        Ok(self.lock()?.clone())
    }

    /// Makes every subsequent load and save fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.shared.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of load attempts so far.
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.shared.loads.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, PolicyRecord>> {
        self.shared
            .record
            .lock()
            .map_err(|e| SieveError::Storage(format!("policy lock poisoned: {e}")))
    }

    fn check_available(&self) -> Result<()> {
        if self.shared.failing.load(Ordering::SeqCst) {
            return Err(SieveError::Storage("policy store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PolicyStore for MemoryPolicyStore {
    async fn load(&self) -> Result<PolicyRecord> {
        self.shared.loads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.get()
    }

    async fn save(&self, record: &PolicyRecord) -> Result<()> {
        self.check_available()?;
        self.set(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_the_record() {
        let store = MemoryPolicyStore::default();
        let other = store.clone();

        let record = PolicyRecord {
            min_quantity: 10,
            ..PolicyRecord::default()
        };
        other.save(&record).await.unwrap();

        assert_eq!(store.load().await.unwrap(), record);
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn failing_store_rejects_io() {
        let store = MemoryPolicyStore::default();
        store.set_failing(true);
        assert!(store.load().await.is_err());
        assert!(store.save(&PolicyRecord::default()).await.is_err());

        store.set_failing(false);
        assert!(store.load().await.is_ok());
    }
}
