//! JSON file-based policy store.
//!
//! This module provides a simple, human-readable policy store using JSON
//! serialization. It uses atomic file writes (write-to-temp + rename) so a
//! crash never leaves a half-written policy behind.
//!
//! # File Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "savedAt": 1718000000,
//!   "enabled": true,
//!   "hideFiltered": false,
//!   "blockedKeywords": ["spoiler"],
//!   "blockedChannels": ["Acme"],
//!   "minQuantity": 1000
//! }
//! ```
//!
//! Files written by other tools may omit `version` and `savedAt`; a bare
//! policy record is read the same way.

use crate::domain::{PolicyRecord, Result, SieveError};
use crate::storage::backend::PolicyStore;
use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};

const FORMAT_VERSION: u32 = 1;

/// On-disk envelope around the policy record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PolicyFile<'a> {
    /// Version of the storage format for future migrations.
    version: u32,
    /// Unix timestamp of the last write.
    saved_at: i64,
    #[serde(flatten)]
    policy: &'a PolicyRecord,
}

/// JSON file policy store.
///
/// Holds no cached state: every [`load`](PolicyStore::load) reads the file,
/// so edits made by other processes are picked up on the next pass.
#[derive(Debug, Clone)]
pub struct JsonPolicyStore {
    file_path: PathBuf,
}

impl JsonPolicyStore {
    #[must_use]
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

#[async_trait]
impl PolicyStore for JsonPolicyStore {
    async fn load(&self) -> Result<PolicyRecord> {
        let contents = match tokio::fs::read_to_string(&self.file_path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?self.file_path, "no policy file, using defaults");
                return Ok(PolicyRecord::default());
            }
            Err(e) => return Err(e.into()),
        };

        let record: PolicyRecord = serde_json::from_str(&contents)
            .map_err(|e| SieveError::Storage(format!("failed to parse policy JSON: {e}")))?;

        tracing::trace!(
            enabled = record.enabled,
            keywords = record.blocked_keywords.len(),
            channels = record.blocked_channels.len(),
            "policy loaded"
        );
        Ok(record)
    }

    async fn save(&self, record: &PolicyRecord) -> Result<()> {
        tracing::debug!(path = ?self.file_path, "saving policy");

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = PolicyFile {
            version: FORMAT_VERSION,
            saved_at: chrono::Utc::now().timestamp(),
            policy: record,
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| SieveError::Storage(format!("failed to serialize policy JSON: {e}")))?;

        let tmp_path = self.file_path.with_extension("tmp");

        tracing::trace!(tmp_path = ?tmp_path, "writing to temporary file");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.file_path).await?;

        tracing::debug!("policy saved successfully");
        Ok(())
    }
}
