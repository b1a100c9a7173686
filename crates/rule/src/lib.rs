//! # nebula-rule
//!
//! Scanner, parser and canonical printer for the rule language used by
//! `nebula-validate`.
//!
//! A rule is a single expression:
//!
//! ```text
//! @name<param,...>[min,max]{a,b}/regex/ = 'default'
//! ```
//!
//! - `<...>` positional parameters, each a literal or a nested `@rule`
//! - `[a,b]` / `(a,b)` inclusive or exclusive range, `[a]` pins both ends
//! - `{a,b}` enumeration, or `{%n}` for "multiple of n"
//! - `/regex/` pattern, `\/` escapes a slash
//! - `?` optional, `= value` optional with a default
//!
//! ```rust
//! use nebula_rule::parse_rule;
//!
//! let rule = parse_rule("@map<@string{A,B},@int[0,]>[,100]").unwrap();
//! assert_eq!(rule.name, "map");
//! assert_eq!(rule.params.len(), 2);
//! assert_eq!(rule.to_string(), "@map<@string{A,B},@int[0,]>[,100]");
//! ```

mod ast;
mod error;
pub mod quote;
mod scanner;

pub use ast::{Rule, RuleLit, RuleNode};
pub use error::{Result, SyntaxError};
pub use scanner::{RESERVED, parse_rule};
