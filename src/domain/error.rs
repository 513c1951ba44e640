//! Error types for the feed filtering engine.
//!
//! This module defines the centralized error type [`SieveError`] and a type alias
//! [`Result`] used by the storage, adapter and configuration layers. The engine
//! itself never surfaces these to the host: every failure degrades to "show the
//! item" (see [`crate::app::engine`]).

use thiserror::Error;

/// The main error type for feedsieve operations.
///
/// # Examples
///
/// ```
/// use feedsieve::SieveError;
///
/// fn read_policy() -> Result<(), SieveError> {
///     Err(SieveError::Storage("policy file is locked".to_string()))
/// }
///
/// assert!(read_policy().is_err());
/// ```
#[derive(Debug, Error)]
pub enum SieveError {
    /// Reading or writing the filter policy failed.
    ///
    /// Also used for policy documents that cannot be (de)serialized.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The host environment could not list items or read an item's fields.
    ///
    /// Isolated to a single item (or a single pass) by the engine.
    #[error("Feed adapter error: {0}")]
    Adapter(String),

    /// The filter service is no longer running.
    #[error("Service channel error: {0}")]
    Channel(String),
}

/// A specialized `Result` type for feedsieve operations.
pub type Result<T> = std::result::Result<T, SieveError>;
