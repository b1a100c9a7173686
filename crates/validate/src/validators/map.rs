//! Map validator.
//!
//! ```text
//! @map<KEY_RULE,ELEM_RULE>[min,max]
//! @map<@string{A,B,C},@int[0]>[,100]
//! @map<,@int[0,]>
//! ```
//!
//! Key failures are reported under `"{key}/key"`, value failures under
//! `"{key}"`.

use std::fmt;
use std::sync::Arc;

use nebula_rule::{Rule, RuleLit, RuleNode};

use super::Nested;
use super::range::{length_lits, length_range};
use crate::error::{OutOfRange, Result, ValidationError};
use crate::error_set::ErrorSet;
use crate::foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
use crate::reflect::{TypeKind, Value};
use crate::registry::CompileContext;

const TARGET_SIZE: &str = "map size";

#[derive(Debug, Clone)]
pub struct MapValidator {
    key: Option<Nested>,
    elem: Option<Nested>,
    min_properties: u64,
    max_properties: Option<u64>,
}

impl MapValidator {
    fn check_size(&self, len: usize) -> Result<()> {
        let len = u64::try_from(len).unwrap_or(u64::MAX);
        let too_large = self.max_properties.is_some_and(|max| len > max);
        if len < self.min_properties || too_large {
            let mut err = OutOfRange::new(TARGET_SIZE, len).minimum(self.min_properties, false);
            if let Some(max) = self.max_properties {
                err = err.maximum(max, false);
            }
            return Err(err.into());
        }
        Ok(())
    }
}

impl Validate for MapValidator {
    fn validate(&self, value: &mut Value) -> Result<()> {
        let entries = match value {
            Value::Map(entries) => entries,
            Value::Null => return self.check_size(0),
            other => return Err(ValidationError::unsupported_type(self, other.kind_name())),
        };

        self.check_size(entries.len())?;

        if self.key.is_none() && self.elem.is_none() {
            return Ok(());
        }

        let mut errors = ErrorSet::new();
        for (key, elem) in entries.iter_mut() {
            if let Some(validator) = &self.key {
                // keys are checked on a copy so defaults never rewrite them
                if let Err(err) = validator.loader.validate(&mut key.clone()) {
                    errors.add(err, format!("{key}/key"));
                }
            }
            if let Some(validator) = &self.elem {
                if let Err(err) = validator.loader.validate(elem) {
                    errors.add(err, key.to_string());
                }
            }
        }
        errors.into_result()
    }
}

impl fmt::Display for MapValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = |nested: &Option<Nested>| {
            let text = nested
                .as_ref()
                .filter(|n| n.explicit)
                .map(|n| n.loader.to_string())
                .unwrap_or_default();
            RuleNode::Lit(RuleLit::new(text))
        };

        let mut rule = Rule::new("map");
        let explicit = |nested: &Option<Nested>| nested.as_ref().is_some_and(|n| n.explicit);
        if explicit(&self.key) || explicit(&self.elem) {
            rule.params = vec![slot(&self.key), slot(&self.elem)];
        }
        rule.range = length_lits(self.min_properties, self.max_properties);
        write!(f, "{rule}")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MapFactory;

impl ValidatorFactory for MapFactory {
    fn names(&self) -> Vec<String> {
        vec!["map".to_string()]
    }

    fn build(&self, typed: &TypedRule, ctx: &CompileContext<'_>) -> Result<SharedValidator> {
        let rule = typed.rule();
        let ty = typed.ty();

        let TypeKind::Map(key_ty, elem_ty) = ty.type_kind() else {
            return Err(ValidationError::unsupported_type(typed, ty.name()));
        };

        let (min_properties, max_properties) = length_range(rule)?;

        let (key_slot, elem_slot) = match rule.params.as_slice() {
            [] => (None, None),
            [key, elem] => (Some(key), Some(elem)),
            params => {
                return Err(ValidationError::invalid_rule(
                    rule,
                    format!("map should only 2 parameter, but got {}", params.len()),
                ));
            }
        };

        Ok(Arc::new(MapValidator {
            key: Nested::compile(ctx, rule, key_slot, key_ty)?,
            elem: Nested::compile(ctx, rule, elem_slot, elem_ty)?,
            min_properties,
            max_properties,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{Reflect, Type};
    use crate::registry::ValidatorRegistry;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::collections::BTreeMap;

    type StringMap = BTreeMap<String, String>;

    fn compile(text: &str, ty: &Type) -> Result<Arc<crate::loader::ValidatorLoader>> {
        ValidatorRegistry::new().compile(text, ty, None)
    }

    fn map(entries: &[(&str, &str)]) -> Value {
        Value::Map(
            entries
                .iter()
                .map(|(k, v)| (Value::String((*k).into()), Value::String((*v).into())))
                .collect(),
        )
    }

    #[rstest]
    #[case("@map[1,1000]", "@map[1,1000]")]
    #[case("@map<,@string[1,]>[1,]", "@map<,@string<length>[1,]>[1,]")]
    #[case("@map<@string[1,],>", "@map<@string<length>[1,],>")]
    #[case("@map<@string{A,B},@string[0,]>[,100]", "@map<@string<length>{A,B},@string<length>>[0,100]")]
    fn test_canonical_text(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(compile(text, &StringMap::type_info()).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("@map<1,>")]
    #[case("@map<@string>")]
    #[case("@map<@string,@string,@string>")]
    #[case("@map[2,1]")]
    #[case("@map(1,2)")]
    #[case("@map<@unknown,>")]
    fn test_invalid_rules(#[case] text: &str) {
        assert!(compile(text, &StringMap::type_info()).is_err());
    }

    #[test]
    fn test_not_a_map() {
        assert!(compile("@map", &Vec::<String>::type_info()).is_err());
    }

    #[test]
    fn test_key_and_value_paths() {
        let loader = compile("@map<@string[2,],@string[1,]>[1,]", &StringMap::type_info()).unwrap();
        let err = loader
            .validate(&mut map(&[("1", ""), ("11", "x")]))
            .unwrap_err();

        let flat = err.as_set().unwrap().flatten();
        let mut found: Vec<(String, bool)> = flat
            .iter()
            .map(|e| (e.path.to_string(), e.error.is_missing_required()))
            .collect();
        found.sort();
        assert_eq!(
            found,
            vec![("1".to_string(), true), ("1/key".to_string(), false)]
        );
    }

    #[test]
    fn test_size_bounds() {
        let loader = compile("@map[1,2]", &StringMap::type_info()).unwrap();
        assert!(loader.validate(&mut map(&[("a", "b")])).is_ok());
        let err = loader
            .validate(&mut map(&[("a", ""), ("b", ""), ("c", "")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "map size should be larger or equal than 1 and less or equal than 2, but got invalid value 3"
        );
    }
}
