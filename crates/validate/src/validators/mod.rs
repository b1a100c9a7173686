//! Built-in validators, one module per value kind.

use std::sync::Arc;

use nebula_rule::{Rule, RuleNode};

use crate::error::{Result, ValidationError};
use crate::foundation::ValidatorFactory;
use crate::loader::ValidatorLoader;
use crate::reflect::{Kind, Type};
use crate::registry::CompileContext;

mod float;
mod int;
mod map;
pub(crate) mod range;
mod slice;
mod strfmt;
mod string;
mod structure;
mod uint;

pub use float::{FloatFactory, FloatValidator};
pub use int::{IntFactory, IntValidator};
pub use map::{MapFactory, MapValidator};
pub use slice::{SliceFactory, SliceValidator};
pub use strfmt::{StrfmtValidator, builtin_formats};
pub use string::{LengthMode, StringFactory, StringValidator};
pub use structure::{StructFactory, StructValidator};
pub use uint::{UintFactory, UintValidator};

/// Every factory a default registry starts with.
pub fn builtin_factories() -> Vec<Arc<dyn ValidatorFactory>> {
    let mut factories: Vec<Arc<dyn ValidatorFactory>> = vec![
        Arc::new(IntFactory),
        Arc::new(UintFactory),
        Arc::new(FloatFactory),
        Arc::new(StringFactory),
        Arc::new(SliceFactory),
        Arc::new(MapFactory),
        Arc::new(StructFactory),
    ];
    factories.extend(
        builtin_formats()
            .into_iter()
            .map(|format| Arc::new(format) as Arc<dyn ValidatorFactory>),
    );
    factories
}

/// Validator for the elements or keys of a collection.
#[derive(Debug, Clone)]
pub(crate) struct Nested {
    pub(crate) loader: Arc<ValidatorLoader>,
    /// Declared in the rule text rather than synthesized for a composite.
    pub(crate) explicit: bool,
}

impl Nested {
    /// Compiles the rule in a parameter slot for values of `ty`.
    ///
    /// An empty slot on a composite element still walks it, optionally, so
    /// rules declared deeper down apply.
    pub(crate) fn compile(
        ctx: &CompileContext<'_>,
        rule: &Rule,
        slot: Option<&RuleNode>,
        ty: &Type,
    ) -> Result<Option<Self>> {
        match slot {
            Some(RuleNode::Rule(nested)) => Ok(Some(Self {
                loader: ctx.compile(&nested.to_string(), ty)?,
                explicit: true,
            })),
            Some(RuleNode::Lit(lit)) if !lit.is_empty() => Err(ValidationError::invalid_rule(
                rule,
                format!("{} parameter should be a valid rule, but got `{lit}`", rule.name),
            )),
            _ => Self::implicit(ctx, ty),
        }
    }

    fn implicit(ctx: &CompileContext<'_>, ty: &Type) -> Result<Option<Self>> {
        let composite = matches!(
            ty.deref().kind(),
            Kind::Struct | Kind::Slice | Kind::Array | Kind::Map
        );
        if !composite || ty.is_text_through_pointers() {
            return Ok(None);
        }

        let loader = ctx.compile_with("", ty, &|rule| rule.set_optional(true))?;
        Ok(Some(Self {
            loader,
            explicit: false,
        }))
    }
}
