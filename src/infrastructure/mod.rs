//! Infrastructure layer for filesystem and environment interactions.
//!
//! This module provides path handling for the policy file and the trace
//! output: default data locations and tilde expansion for configured paths.

pub mod paths;

pub use paths::{data_dir, default_policy_path, expand_tilde};
