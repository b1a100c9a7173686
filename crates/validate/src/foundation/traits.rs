//! Core traits for the validation system.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::reflect::Value;
use crate::registry::CompileContext;

use super::TypedRule;

// ============================================================================
// VALIDATE
// ============================================================================

/// A compiled validator.
///
/// Validators are built once per (type, rule) pair and shared across
/// threads. `Display` renders the canonical rule text, which parses back to a
/// rule with the same constraints.
///
/// `validate` takes the value mutably so optional fields can receive their
/// default in place.
///
/// # Examples
///
/// ```rust
/// use nebula_validate::prelude::*;
///
/// let registry = ValidatorRegistry::new();
/// let validator = registry.compile("@int[1,10]", &Type::of::<i32>(), None).unwrap();
///
/// assert!(validator.validate(&mut Value::Int(5)).is_ok());
/// assert!(validator.validate(&mut Value::Int(11)).is_err());
/// assert_eq!(validator.to_string(), "@int<32>[1,10]");
/// ```
pub trait Validate: fmt::Display + fmt::Debug + Send + Sync {
    fn validate(&self, value: &mut Value) -> Result<()>;
}

/// Validators are handed out behind an `Arc`.
pub type SharedValidator = Arc<dyn Validate>;

impl<V: Validate + ?Sized> Validate for Arc<V> {
    fn validate(&self, value: &mut Value) -> Result<()> {
        (**self).validate(value)
    }
}

// ============================================================================
// FACTORY
// ============================================================================

/// Builds validators for one or more rule names.
///
/// The registry looks factories up by rule name, so a factory reporting
/// `["int", "int8"]` handles both `@int` and `@int8`. The rule handed to
/// [`build`](Self::build) is already bound to the type the validator will
/// see: pointers are dereferenced and text-representable types appear as
/// `String`.
pub trait ValidatorFactory: Send + Sync {
    fn names(&self) -> Vec<String>;

    fn build(&self, rule: &TypedRule, ctx: &CompileContext<'_>) -> Result<SharedValidator>;
}
