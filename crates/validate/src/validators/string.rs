//! String validator.
//!
//! ```text
//! @string[1,10]           length between 1 and 10 bytes
//! @string<rune_count>[1,] at least one character
//! @string{A,B}            one of the values
//! @string/^\w+$/          matches the pattern
//! @char[1,3]              same as @string<rune_count>[1,3]
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexSet;
use nebula_rule::{Rule, RuleLit, RuleNode};
use regex::Regex;

use super::range::{length_lits, length_range};
use crate::error::{OutOfRange, Result, ValidationError};
use crate::foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
use crate::reflect::{Kind, Value};
use crate::registry::CompileContext;

const TARGET_VALUE: &str = "string value";
const TARGET_LENGTH: &str = "string length";

/// How string length is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthMode {
    /// UTF-8 byte length.
    #[default]
    Bytes,
    /// Number of code points.
    Runes,
}

impl LengthMode {
    fn parse(text: &str) -> Option<Self> {
        match text.to_ascii_lowercase().as_str() {
            "" | "length" => Some(Self::Bytes),
            "rune_count" => Some(Self::Runes),
            _ => None,
        }
    }

    pub fn measure(self, s: &str) -> u64 {
        let len = match self {
            Self::Bytes => s.len(),
            Self::Runes => s.chars().count(),
        };
        u64::try_from(len).unwrap_or(u64::MAX)
    }
}

impl fmt::Display for LengthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bytes => "length",
            Self::Runes => "rune_count",
        })
    }
}

#[derive(Debug, Clone)]
pub struct StringValidator {
    mode: LengthMode,
    enums: IndexSet<String>,
    pattern: Option<Regex>,
    min_length: u64,
    max_length: Option<u64>,
}

impl StringValidator {
    pub fn from_rule(rule: &Rule) -> Result<Self> {
        let (min_length, max_length) = length_range(rule)?;

        let mode = match rule.params.as_slice() {
            [] if rule.name == "char" => LengthMode::Runes,
            [] => LengthMode::Bytes,
            [RuleNode::Lit(lit)] => LengthMode::parse(lit.as_str()).ok_or_else(|| {
                ValidationError::invalid_rule(rule, format!("unsupported string length mode `{lit}`"))
            })?,
            [RuleNode::Rule(_)] => {
                return Err(ValidationError::invalid_rule(
                    rule,
                    "string parameter should be a length mode",
                ));
            }
            params => {
                return Err(ValidationError::invalid_rule(
                    rule,
                    format!("string should only 1 parameter, but got {}", params.len()),
                ));
            }
        };

        Ok(Self {
            mode,
            enums: rule.values.iter().map(|v| v.as_str().to_string()).collect(),
            pattern: rule.pattern.clone(),
            min_length,
            max_length,
        })
    }

    pub fn mode(&self) -> LengthMode {
        self.mode
    }

    fn check(&self, s: &str) -> Result<()> {
        if !self.enums.is_empty() {
            if self.enums.contains(s) {
                return Ok(());
            }
            return Err(ValidationError::not_in_enum(TARGET_VALUE, s, &self.enums));
        }

        if let Some(pattern) = &self.pattern {
            if pattern.is_match(s) {
                return Ok(());
            }
            return Err(ValidationError::not_match(TARGET_VALUE, pattern, s));
        }

        let length = self.mode.measure(s);
        let too_long = self.max_length.is_some_and(|max| length > max);
        if length < self.min_length || too_long {
            let mut err = OutOfRange::new(TARGET_LENGTH, length).minimum(self.min_length, false);
            if let Some(max) = self.max_length {
                err = err.maximum(max, false);
            }
            return Err(err.into());
        }

        Ok(())
    }
}

impl Validate for StringValidator {
    fn validate(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::String(s) => self.check(s),
            other => Err(ValidationError::unsupported_type(self, other.kind_name())),
        }
    }
}

impl fmt::Display for StringValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rule = Rule::new("string");
        rule.params = vec![RuleNode::Lit(RuleLit::new(self.mode.to_string()))];
        rule.values = self.enums.iter().map(|v| RuleLit::new(v.as_str())).collect();
        rule.pattern.clone_from(&self.pattern);
        rule.range = length_lits(self.min_length, self.max_length);
        write!(f, "{rule}")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringFactory;

impl ValidatorFactory for StringFactory {
    fn names(&self) -> Vec<String> {
        vec!["string".to_string(), "char".to_string()]
    }

    fn build(&self, rule: &TypedRule, _ctx: &CompileContext<'_>) -> Result<SharedValidator> {
        let validator = StringValidator::from_rule(rule.rule())?;
        if rule.ty().kind() != Kind::String {
            return Err(ValidationError::unsupported_type(rule, rule.ty().name()));
        }
        Ok(Arc::new(validator))
    }
}
