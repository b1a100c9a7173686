//! Struct field walker.
//!
//! ```text
//! @struct           fields named by the registry's name tag
//! @struct<yaml>     fields named by the `yaml` tag
//! ```
//!
//! Each exported field is compiled from its `validate` tag. Untagged struct,
//! slice and map fields are still walked so rules declared further down
//! apply. Embedded structs without a name tag contribute their fields to the
//! parent under the parent's path.

use std::fmt;
use std::sync::Arc;

use nebula_rule::{Rule, RuleNode};

use crate::error::{Result, ValidationError};
use crate::error_set::ErrorSet;
use crate::foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
use crate::loader::ValidatorLoader;
use crate::reflect::{Kind, Type, Value};
use crate::registry::CompileContext;

#[derive(Debug, Clone)]
enum FieldEntry {
    Field {
        /// Declared field name, the key inside [`Value::Struct`].
        name: String,
        /// Name failures are reported under.
        display: String,
        validator: Arc<ValidatorLoader>,
    },
    Embedded {
        name: String,
        ty: Type,
        fields: Vec<FieldEntry>,
    },
}

#[derive(Debug, Clone)]
pub struct StructValidator {
    name_tag: String,
    fields: Vec<FieldEntry>,
}

impl StructValidator {
    pub fn name_tag(&self) -> &str {
        &self.name_tag
    }

    /// Number of directly validated fields, embedded ones included.
    pub fn field_count(&self) -> usize {
        fn count(fields: &[FieldEntry]) -> usize {
            fields
                .iter()
                .map(|entry| match entry {
                    FieldEntry::Field { .. } => 1,
                    FieldEntry::Embedded { fields, .. } => count(fields),
                })
                .sum()
        }
        count(&self.fields)
    }

    fn validate_fields(&self, entries: &[FieldEntry], value: &mut Value, errors: &mut ErrorSet) -> Result<()> {
        if !matches!(value, Value::Struct(_)) {
            return Err(ValidationError::unsupported_type(self, value.kind_name()));
        }

        for entry in entries {
            match entry {
                FieldEntry::Field {
                    name,
                    display,
                    validator,
                } => {
                    let mut missing = Value::Null;
                    let slot = match value.field_mut(name) {
                        Some(slot) => slot,
                        None => &mut missing,
                    };
                    if let Err(err) = validator.validate(slot) {
                        errors.add(err, display.as_str());
                    }
                }
                FieldEntry::Embedded { name, ty, fields } => {
                    let outcome = match value.field_mut(name) {
                        Some(slot) if !slot.is_null() => self.validate_fields(fields, slot, errors),
                        _ => self.validate_fields(fields, &mut Value::zero(ty), errors),
                    };
                    if let Err(err) = outcome {
                        errors.add(err, name.as_str());
                    }
                }
            }
        }
        Ok(())
    }
}

impl Validate for StructValidator {
    fn validate(&self, value: &mut Value) -> Result<()> {
        let mut errors = ErrorSet::new();
        self.validate_fields(&self.fields, value, &mut errors)?;
        errors.into_result()
    }
}

impl fmt::Display for StructValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@struct<{}>", self.name_tag)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StructFactory;

impl StructFactory {
    fn collect_fields(
        ctx: &CompileContext<'_>,
        rule: &Rule,
        ty: &Type,
        errors: &mut ErrorSet,
    ) -> Vec<FieldEntry> {
        let config = ctx.registry().config();
        let mut entries = Vec::new();

        for field in ty.fields() {
            if !field.is_exported() {
                continue;
            }
            let display = field.display_name(ctx.name_tag());
            if display.name == "-" {
                continue;
            }

            let field_ty = field.ty();
            let target = field_ty.deref();
            let walks_struct = target.kind() == Kind::Struct && !field_ty.is_text_through_pointers();

            if field.is_embedded() && walks_struct && !display.tagged {
                match ctx.enter(&target, rule) {
                    Ok(inner) => entries.push(FieldEntry::Embedded {
                        name: field.name().to_string(),
                        fields: Self::collect_fields(&inner, rule, &target, errors),
                        ty: target,
                    }),
                    Err(err) => errors.add(err, field.name()),
                }
                continue;
            }

            let rule_text = field.tag_value(&config.rule_tag).unwrap_or_default();
            let default = field.tag_value(&config.default_tag);
            let message = field.tag_value(&config.error_tag);
            let post = |typed: &mut TypedRule| {
                if display.omit_empty {
                    typed.set_optional(true);
                }
                if let Some(default) = default {
                    typed.set_default_value(default);
                }
                if let Some(message) = message {
                    typed.set_error_message(message);
                }
            };

            match ctx.compile_with(rule_text, &field_ty, &post) {
                Ok(validator) => entries.push(FieldEntry::Field {
                    name: field.name().to_string(),
                    display: display.name.clone(),
                    validator,
                }),
                Err(err) => errors.add(err, field.name()),
            }
        }

        entries
    }
}

impl ValidatorFactory for StructFactory {
    fn names(&self) -> Vec<String> {
        vec!["struct".to_string()]
    }

    fn build(&self, typed: &TypedRule, ctx: &CompileContext<'_>) -> Result<SharedValidator> {
        let rule = typed.rule();
        let ty = typed.ty();

        if ty.kind() != Kind::Struct {
            return Err(ValidationError::unsupported_type(typed, ty.name()));
        }

        let name_tag = match rule.params.as_slice() {
            [] => ctx.name_tag().to_string(),
            [RuleNode::Lit(tag)] if tag.is_empty() => ctx.name_tag().to_string(),
            [RuleNode::Lit(tag)] => tag.as_str().to_string(),
            _ => {
                return Err(ValidationError::invalid_rule(
                    rule,
                    "struct should only declare the name tag",
                ));
            }
        };

        let ctx = ctx.enter(ty, rule)?.with_name_tag(name_tag.as_str());
        let mut errors = ErrorSet::new();
        let fields = Self::collect_fields(&ctx, rule, ty, &mut errors);
        errors.into_result()?;

        Ok(Arc::new(StructValidator { name_tag, fields }))
    }
}
