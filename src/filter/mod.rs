//! Field classification: count parsing and policy evaluation.
//!
//! Both halves are pure and synchronous; they know nothing about item
//! identity, display state or scheduling.
//!
//! - [`quantity`]: abbreviated count parser
//! - [`evaluator`]: precedence-ordered policy evaluation

pub mod evaluator;
pub mod quantity;

pub use evaluator::{evaluate, FilterPolicyEvaluator};
pub use quantity::{parse_quantity, QuantityParser, UnitPolicy};
