//! Policy store abstraction.
//!
//! This module defines the [`PolicyStore`] trait that abstracts over where the
//! filter policy lives. The engine never reads it directly: the filter service
//! loads one snapshot before each pass and performs the read-modify-write for
//! control messages.
//!
//! # Design Philosophy
//!
//! The trait is minimal and maps directly to the two things the service does
//! with the policy. Both operations are async because real stores sit behind
//! file or IPC boundaries.

use crate::domain::{PolicyRecord, Result};
use async_trait::async_trait;

/// Abstraction over persistent policy backends.
///
/// # Implementations
///
/// - [`JsonPolicyStore`](super::JsonPolicyStore): JSON file with atomic writes (default)
/// - [`MemoryPolicyStore`](super::MemoryPolicyStore): in-process, shared between clones
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Reads the current policy.
    ///
    /// A store that has never been written returns [`PolicyRecord::default`].
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or its contents cannot be
    /// parsed. The caller treats this as "filtering disabled" for the pass.
    async fn load(&self) -> Result<PolicyRecord>;

    /// Replaces the stored policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. The previous policy stays intact.
    async fn save(&self, record: &PolicyRecord) -> Result<()>;
}
