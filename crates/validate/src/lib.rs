//! # nebula-validate
//!
//! Declarative validation of typed values driven by rule strings.
//!
//! ## Quick Start
//!
//! ```rust
//! use nebula_validate::prelude::*;
//! use nebula_validate::reflect_struct;
//!
//! reflect_struct! {
//!     #[derive(Debug, Default)]
//!     pub struct Account {
//!         #[tag(json = "name", validate = "@string[1,32]")]
//!         pub name: String,
//!         #[tag(json = "tags", validate = "@slice<@string{red,green}>[,3]")]
//!         pub tags: Vec<String>,
//!     }
//! }
//!
//! let registry = ValidatorRegistry::new();
//! let account = Account {
//!     name: String::new(),
//!     tags: vec!["blue".into()],
//! };
//!
//! let err = registry.validate(&account).unwrap_err();
//! let fields: Vec<String> = err
//!     .as_set()
//!     .unwrap()
//!     .flatten()
//!     .iter()
//!     .map(|e| e.path.to_string())
//!     .collect();
//! assert_eq!(fields, ["name", "tags[0]"]);
//! ```
//!
//! ## Layout
//!
//! - [`reflect`]: type descriptors ([`Type`](reflect::Type)) and dynamic
//!   values ([`Value`](reflect::Value))
//! - [`registry`]: [`ValidatorRegistry`], the factory table and compile cache
//! - [`loader`]: [`ValidatorLoader`](loader::ValidatorLoader), optionality,
//!   defaults and preprocessing around every compiled validator
//! - [`validators`]: one validator per rule family (`@int`, `@uint`,
//!   `@float`, `@string`, `@slice`, `@map`, `@struct`, string formats)
//! - [`error_set`]: path-addressed error aggregation

// ValidationError carries an ErrorSet inline; boxing it would put an
// allocation on every failing check.
#![allow(clippy::result_large_err)]

pub mod error;
pub mod error_set;
pub mod foundation;
pub mod loader;
mod macros;
pub mod prelude;
pub mod reflect;
pub mod registry;
pub mod validators;

pub use error::{OutOfRange, Result, ValidationError};
pub use error_set::{ErrorSet, FieldError, KeyPath, PathSegment};
pub use foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
pub use loader::{PreprocessStage, ValidatorLoader};
pub use registry::{CompileContext, RegistryBuilder, RegistryConfig, ValidatorRegistry};

pub use nebula_rule::{Rule, RuleLit, RuleNode, SyntaxError, parse_rule};
