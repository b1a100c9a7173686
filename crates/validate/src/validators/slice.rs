//! Slice and array validator.
//!
//! ```text
//! @slice<ELEM_RULE>[min,max]
//! @slice<@string{A,B,C}>[,100]
//! @array<ELEM_RULE>[length]
//! ```

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

const TARGET_LENGTH: &str = "slice length";

#[derive(Debug, Clone)]
pub struct SliceValidator {
    elem: Option<Nested>,
    min_items: u64,
    max_items: Option<u64>,
}

impl SliceValidator {
    pub fn min_items(&self) -> u64 {
        self.min_items
    }

    pub fn max_items(&self) -> Option<u64> {
        self.max_items
    }
}

impl Validate for SliceValidator {
    fn validate(&self, value: &mut Value) -> Result<()> {
        let items = match value {
            Value::Seq(items) => items,
            Value::Null => return self.check_length(0),
            other => return Err(ValidationError::unsupported_type(self, other.kind_name())),
        };

        self.check_length(items.len())?;

        let Some(elem) = &self.elem else {
            return Ok(());
        };

        let mut errors = ErrorSet::new();
        for (index, item) in items.iter_mut().enumerate() {
            if let Err(err) = elem.loader.validate(item) {
                errors.add(err, index);
            }
        }
        errors.into_result()
    }
}

impl SliceValidator {
    fn check_length(&self, len: usize) -> Result<()> {
        let len = u64::try_from(len).unwrap_or(u64::MAX);
        let too_long = self.max_items.is_some_and(|max| len > max);
        if len < self.min_items || too_long {
            let mut err = OutOfRange::new(TARGET_LENGTH, len).minimum(self.min_items, false);
            if let Some(max) = self.max_items {
                err = err.maximum(max, false);
            }
            return Err(err.into());
        }
        Ok(())
    }
}

impl fmt::Display for SliceValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rule = Rule::new("slice");
        if let Some(elem) = self.elem.as_ref().filter(|e| e.explicit) {
            rule.params = vec![RuleNode::Lit(RuleLit::new(elem.loader.to_string()))];
        }
        rule.range = length_lits(self.min_items, self.max_items);
        write!(f, "{rule}")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SliceFactory;

impl ValidatorFactory for SliceFactory {
    fn names(&self) -> Vec<String> {
        vec!["slice".to_string(), "array".to_string()]
    }

    fn build(&self, typed: &TypedRule, ctx: &CompileContext<'_>) -> Result<SharedValidator> {
        let rule = typed.rule();
        let ty = typed.ty();

        if rule.name == "array" && rule.range.len() > 1 {
            return Err(ValidationError::invalid_rule(rule, "array should declare length only"));
        }
        let (mut min_items, mut max_items) = length_range(rule)?;

        let elem_ty = match ty.type_kind() {
            TypeKind::Slice(elem) => elem,
            TypeKind::Array(elem, len) => {
                let len = u64::try_from(*len).unwrap_or(u64::MAX);
                if rule.range.is_empty() {
                    min_items = len;
                } else if min_items != len || max_items.is_some_and(|max| max != len) {
                    return Err(ValidationError::unsupported_type_with(
                        typed,
                        ty.name(),
                        format!("length of rule should equal length({len}) of array"),
                    ));
                }
                max_items = Some(len);
                elem
            }
            _ => return Err(ValidationError::unsupported_type(typed, ty.name())),
        };

        let slot = match rule.params.as_slice() {
            [] => None,
            [param] => Some(param),
            params => {
                return Err(ValidationError::invalid_rule(
                    rule,
                    format!("slice should only 1 parameter, but got {}", params.len()),
                ));
            }
        };

        Ok(Arc::new(SliceValidator {
            elem: Nested::compile(ctx, rule, slot, elem_ty)?,
            min_items,
            max_items,
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

    fn compile(text: &str, ty: &Type) -> Result<Arc<crate::loader::ValidatorLoader>> {
        ValidatorRegistry::new().compile(text, ty, None)
    }

    fn strings(items: &[&str]) -> Value {
        Value::Seq(items.iter().map(|s| Value::String((*s).to_string())).collect())
    }

    #[rstest]
    #[case("@slice[1,1000]", "@slice[1,1000]")]
    #[case("@slice<@string[1,2]>[1,]", "@slice<@string<length>[1,2]>[1,]")]
    #[case("@slice[1]", "@slice[1]")]
    #[case("@array[3]", "@slice[3]")]
    fn test_canonical_text(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(compile(text, &Vec::<String>::type_info()).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("@slice<1>")]
    #[case("@slice<1,2,4>")]
    #[case("@slice[1,0]")]
    #[case("@slice[1,-2]")]
    #[case("@slice[a,]")]
    #[case("@slice(1,1)")]
    #[case("@slice<@unknown>")]
    #[case("@array[1,2]")]
    fn test_invalid_rules(#[case] text: &str) {
        assert!(compile(text, &Vec::<String>::type_info()).is_err());
    }

    #[test]
    fn test_type_mismatch() {
        assert!(compile("@slice[2]", &String::type_info()).is_err());
        assert!(compile("@slice[2]", &<[String; 1]>::type_info()).is_err());
        assert!(compile("@slice[1]", &<[String; 1]>::type_info()).is_ok());
    }

    #[test]
    fn test_array_adopts_declared_length() {
        let loader = compile("@array", &<[i32; 2]>::type_info()).unwrap();
        assert_eq!(loader.to_string(), "@slice[2]");
    }

    #[test]
    fn test_element_failures_are_indexed() {
        let loader = compile("@slice<@string[1,]>", &Vec::<String>::type_info()).unwrap();
        let err = loader.validate(&mut strings(&["", ""])).unwrap_err();
        let set = err.as_set().unwrap().flatten();

        let paths: Vec<String> = set.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["[0]", "[1]"]);
        assert!(set.iter().all(|e| e.error.is_missing_required()));
    }

    #[test]
    fn test_length_bounds() {
        let loader = compile("@slice<@string[1,]>[2,4]", &Vec::<String>::type_info()).unwrap();
        assert!(loader.validate(&mut strings(&["a"])).is_err());
        assert!(loader.validate(&mut strings(&["a", "b"])).is_ok());
        assert!(loader.validate(&mut strings(&["a", "b", "c", "d", "e"])).is_err());
        assert!(loader.validate(&mut strings(&["a", ""])).is_err());
    }

    #[test]
    fn test_untagged_scalar_elements_are_not_required() {
        let loader = compile("@slice[1,]", &Vec::<String>::type_info()).unwrap();
        assert!(loader.validate(&mut strings(&[""])).is_ok());
    }
}
