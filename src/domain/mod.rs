//! Domain layer for feedsieve.
//!
//! Core types shared by every other layer, independent of the host
//! environment, the policy store and the async runtime.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`item`]: Item handles and extracted text fields
//! - [`decision`]: Filter decisions and reason labels
//! - [`policy`]: Stored policy record and per-pass criteria snapshot
//! - [`control`]: Control messages from the settings surface

pub mod control;
pub mod decision;
pub mod error;
pub mod item;
pub mod policy;

pub use control::ControlMessage;
pub use decision::{Decision, FilterReason};
pub use error::{Result, SieveError};
pub use item::{Fields, ItemId};
pub use policy::{DisplayMode, FilterCriteria, PolicyRecord};
