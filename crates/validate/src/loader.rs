//! Preprocessing wrapper around compiled validators.
//!
//! Every validator handed out by the registry is a [`ValidatorLoader`]. The
//! loader decides whether a value is present, applies defaults to absent
//! optional values, and only then delegates to the kind validator.

use std::fmt;

use nebula_rule::quote::single_quote;

use crate::error::{Result, ValidationError};
use crate::foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
use crate::reflect::{Kind, Type, Value};
use crate::registry::CompileContext;

/// How a value is prepared before the inner validator sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessStage {
    Skip,
    /// The type has a canonical text form; the inner validator sees text.
    TextNormalize,
    /// The type is a pointer; the inner validator sees the pointee.
    PointerIndirect,
}

impl PreprocessStage {
    /// Stage for `ty` and the type the inner validator is built against.
    ///
    /// Text capability wins over pointer indirection.
    pub fn for_type(ty: &Type) -> (Self, Type) {
        if ty.is_text_through_pointers() {
            (Self::TextNormalize, Type::text())
        } else if ty.kind() == Kind::Pointer {
            (Self::PointerIndirect, ty.deref())
        } else {
            (Self::Skip, ty.clone())
        }
    }
}

/// Compiled validator with optionality, defaults and preprocessing.
#[derive(Debug)]
pub struct ValidatorLoader {
    inner: Option<SharedValidator>,
    stage: PreprocessStage,
    ty: Type,
    optional: bool,
    default_value: Option<(String, Value)>,
    error_message: Option<String>,
}

impl ValidatorLoader {
    /// Builds the loader for `rule`, compiling the inner validator with
    /// `factory` when the rule is named.
    ///
    /// A declared default is decoded into a value of the rule's type and
    /// must pass the loader itself.
    pub fn new(
        rule: TypedRule,
        factory: Option<&dyn ValidatorFactory>,
        ctx: &CompileContext<'_>,
    ) -> Result<Self> {
        let (stage, inner_ty) = PreprocessStage::for_type(rule.ty());

        let inner = match factory {
            Some(factory) => Some(factory.build(&rule.with_type(inner_ty), ctx)?),
            None => None,
        };

        let rule_text = rule.rule_text();
        let (rule, ty, error_message) = rule.into_parts();

        let mut loader = Self {
            inner,
            stage,
            ty,
            optional: rule.optional,
            default_value: None,
            error_message,
        };

        if let Some(text) = rule.default_value {
            let invalid = |source: ValidationError| ValidationError::InvalidDefault {
                rule: rule_text.clone(),
                value: text.clone(),
                source: Box::new(source),
            };

            let mut value = Value::decode(&loader.ty, &text, ctx.name_tag())
                .map_err(|e| invalid(e.into()))?;
            loader.check(&mut value).map_err(invalid)?;
            loader.default_value = Some((text, value));
        }

        Ok(loader)
    }

    pub fn stage(&self) -> PreprocessStage {
        self.stage
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Declared default text, if any.
    pub fn default_text(&self) -> Option<&str> {
        self.default_value.as_ref().map(|(text, _)| text.as_str())
    }

    pub fn inner(&self) -> Option<&SharedValidator> {
        self.inner.as_ref()
    }

    fn is_absent(&self, value: &Value) -> Result<bool> {
        match self.stage {
            PreprocessStage::TextNormalize => match value {
                Value::Null => Ok(true),
                Value::String(text) => Ok(text.is_empty()),
                other => Err(ValidationError::unsupported_type(self, other.kind_name())),
            },
            // a present pointer is present whatever it points at
            PreprocessStage::PointerIndirect => Ok(value.is_null()),
            PreprocessStage::Skip => Ok(value.is_empty_as(&self.ty)),
        }
    }

    fn check(&self, value: &mut Value) -> Result<()> {
        if self.is_absent(value)? {
            if !self.optional {
                return Err(ValidationError::MissingRequiredField);
            }
            if let Some((_, default)) = &self.default_value {
                *value = default.clone();
            }
            return Ok(());
        }

        match &self.inner {
            Some(inner) => inner.validate(value),
            None => Ok(()),
        }
    }
}

impl Validate for ValidatorLoader {
    fn validate(&self, value: &mut Value) -> Result<()> {
        self.check(value).map_err(|err| match &self.error_message {
            Some(message) => ValidationError::Message(message.clone()),
            None => err,
        })
    }
}

impl fmt::Display for ValidatorLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(inner) = &self.inner else {
            return Ok(());
        };

        write!(f, "{inner}")?;
        if self.optional {
            match &self.default_value {
                Some((text, _)) => write!(f, " = {}", single_quote(text))?,
                None => f.write_str("?")?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
