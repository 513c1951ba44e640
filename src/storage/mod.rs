//! Storage layer for the persistent filter policy.
//!
//! This module provides the storage abstraction the filter service reads the
//! policy from before every pass and writes control-message changes to.
//!
//! # Modules
//!
//! - `backend`: [`PolicyStore`] trait abstraction for backend implementations
//! - `json`: JSON file-based store with atomic writes
//! - `memory`: In-process store shared between clones

pub mod backend;
pub mod json;
pub mod memory;

pub use backend::PolicyStore;
pub use json::JsonPolicyStore;
pub use memory::MemoryPolicyStore;
