//! Core traits and the rule-plus-type pair validators are built from.

mod traits;
mod typed_rule;

pub use traits::{SharedValidator, Validate, ValidatorFactory};
pub use typed_rule::TypedRule;
