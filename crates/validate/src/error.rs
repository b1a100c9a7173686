//! Error taxonomy for compiling and running validators.
//!
//! Compile-time failures (`Syntax`, `InvalidRule`, `UnknownRule`,
//! `UnsupportedType`, `InvalidDefault`) abort building a validator.
//! Value-time failures describe why a concrete value was rejected and are
//! collected into an [`ErrorSet`] by composite validators.

use std::fmt;

use nebula_rule::SyntaxError;

use crate::error_set::ErrorSet;
use crate::reflect::ValueError;

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

// ============================================================================
// VALIDATION ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// Rule text could not be scanned.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Rule text scanned but its parameters make no sense for the validator.
    #[error("invalid rule `{rule}`: {message}")]
    InvalidRule { rule: String, message: String },

    /// The rule name has no registered validator.
    #[error("@{name} not match any validator")]
    UnknownRule { name: String },

    /// A validator was bound to, or handed, a value of the wrong kind.
    #[error("`{rule}` could not validate type {type_name}{}", .detail.as_deref().map(|d| format!("; {d}")).unwrap_or_default())]
    UnsupportedType {
        rule: String,
        type_name: String,
        detail: Option<String>,
    },

    /// A default value failed its own rule.
    #[error("default value `{value}` of `{rule}` is invalid: {source}")]
    InvalidDefault {
        rule: String,
        value: String,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("{0}")]
    OutOfRange(OutOfRange),

    #[error("{target} should be one of {}, but got invalid value {current}", .enums.join(", "))]
    NotInEnum {
        target: String,
        current: String,
        enums: Vec<String>,
    },

    #[error("{target} {pattern} not match {current}")]
    NotMatch {
        target: String,
        pattern: String,
        current: String,
    },

    #[error("{target} should be multiple of {multiple_of}, but got invalid value {current}")]
    MultipleOf {
        target: String,
        current: String,
        multiple_of: String,
    },

    #[error("missing required field")]
    MissingRequiredField,

    /// A closure-based string format rejected the value.
    #[error("invalid {format}")]
    InvalidFormat { format: String, current: String },

    /// Caller supplied replacement message.
    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error("{0}")]
    Set(ErrorSet),
}

impl ValidationError {
    pub fn invalid_rule(rule: impl fmt::Display, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.to_string(),
            message: message.into(),
        }
    }

    pub fn unsupported_type(rule: impl fmt::Display, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            rule: rule.to_string(),
            type_name: type_name.into(),
            detail: None,
        }
    }

    pub fn unsupported_type_with(
        rule: impl fmt::Display,
        type_name: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::UnsupportedType {
            rule: rule.to_string(),
            type_name: type_name.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn not_in_enum(
        target: impl Into<String>,
        current: impl fmt::Display,
        enums: impl IntoIterator<Item = impl fmt::Display>,
    ) -> Self {
        Self::NotInEnum {
            target: target.into(),
            current: current.to_string(),
            enums: enums.into_iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn not_match(target: impl Into<String>, pattern: &regex::Regex, current: impl fmt::Display) -> Self {
        Self::NotMatch {
            target: target.into(),
            pattern: pattern.as_str().to_string(),
            current: current.to_string(),
        }
    }

    pub fn multiple_of(
        target: impl Into<String>,
        current: impl fmt::Display,
        multiple_of: impl fmt::Display,
    ) -> Self {
        Self::MultipleOf {
            target: target.into(),
            current: current.to_string(),
            multiple_of: multiple_of.to_string(),
        }
    }

    /// `true` for the leaf kind emitted when a required value is absent.
    pub fn is_missing_required(&self) -> bool {
        matches!(self, Self::MissingRequiredField)
    }

    /// The nested set, if this error aggregates field failures.
    pub fn as_set(&self) -> Option<&ErrorSet> {
        match self {
            Self::Set(set) => Some(set),
            _ => None,
        }
    }
}

impl From<ErrorSet> for ValidationError {
    fn from(set: ErrorSet) -> Self {
        Self::Set(set)
    }
}

impl From<OutOfRange> for ValidationError {
    fn from(err: OutOfRange) -> Self {
        Self::OutOfRange(err)
    }
}

// ============================================================================
// OUT OF RANGE
// ============================================================================

/// A numeric bound or length bound was violated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutOfRange {
    pub target: String,
    pub current: String,
    pub minimum: Option<String>,
    pub maximum: Option<String>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
}

impl OutOfRange {
    pub fn new(target: impl Into<String>, current: impl fmt::Display) -> Self {
        Self {
            target: target.into(),
            current: current.to_string(),
            ..Self::default()
        }
    }

    pub fn minimum(mut self, bound: impl fmt::Display, exclusive: bool) -> Self {
        self.minimum = Some(bound.to_string());
        self.exclusive_minimum = exclusive;
        self
    }

    pub fn maximum(mut self, bound: impl fmt::Display, exclusive: bool) -> Self {
        self.maximum = Some(bound.to_string());
        self.exclusive_maximum = exclusive;
        self
    }
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} should be", self.target)?;

        if let Some(minimum) = &self.minimum {
            f.write_str(" larger")?;
            if !self.exclusive_minimum {
                f.write_str(" or equal")?;
            }
            write!(f, " than {minimum}")?;
        }

        if let Some(maximum) = &self.maximum {
            if self.minimum.is_some() {
                f.write_str(" and")?;
            }
            f.write_str(" less")?;
            if !self.exclusive_maximum {
                f.write_str(" or equal")?;
            }
            write!(f, " than {maximum}")?;
        }

        write!(f, ", but got invalid value {}", self.current)
    }
}

// ============================================================================
// TESTS
// ============================================================================
