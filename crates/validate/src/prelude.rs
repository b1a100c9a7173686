//! Prelude module for convenient imports.
//!
//! ```rust
//! use nebula_validate::prelude::*;
//!
//! let registry = ValidatorRegistry::new();
//! let loader = registry.compile("@string[1,]", &Type::of::<String>(), None).unwrap();
//! assert!(loader.validate(&mut Value::String("x".into())).is_ok());
//! ```

// ============================================================================
// FOUNDATION
// ============================================================================

pub use crate::error::{Result, ValidationError};
pub use crate::error_set::{ErrorSet, FieldError, KeyPath};
pub use crate::foundation::{Validate, ValidatorFactory};

// ============================================================================
// REGISTRY
// ============================================================================

pub use crate::loader::ValidatorLoader;
pub use crate::registry::{RegistryConfig, ValidatorRegistry};

// ============================================================================
// REFLECTION
// ============================================================================

pub use crate::reflect::{Kind, Reflect, StructField, Type, TypeKind, Value};
