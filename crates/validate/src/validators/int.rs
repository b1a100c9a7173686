//! Signed integer validator.
//!
//! ```text
//! @int[1,10]     1 <= v <= 10
//! @int(1,10]     1 <  v <= 10
//! @int{1,2,3}    one of the values
//! @int{%2}       multiple of 2
//! @int<53>       bit size, also @int8 @int16 @int32 @int64
//! ```

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use nebula_rule::{Rule, RuleLit, RuleNode, SyntaxError};

use super::range::{bit_size, int_bounds, int_range, range_lits};
use crate::error::{OutOfRange, Result, ValidationError};
use crate::foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
use crate::reflect::{Kind, Value};
use crate::registry::CompileContext;

const TARGET: &str = "int value";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntValidator {
    bits: u32,
    minimum: Option<i64>,
    maximum: Option<i64>,
    exclusive_minimum: bool,
    exclusive_maximum: bool,
    multiple_of: Option<i64>,
    enums: IndexMap<i64, String>,
}

impl IntValidator {
    pub fn from_rule(rule: &Rule) -> Result<Self> {
        let bits = bit_size(rule)?;
        let (minimum, maximum) = int_range(rule, bits)?;
        let (lo, hi) = int_bounds(bits);
        let parse = |text: &str| text.trim().parse::<i64>().ok().filter(|v| (lo..=hi).contains(v));

        let multiple_of = match rule.multiple_of() {
            Some(text) => match parse(text) {
                Some(m) if m != 0 => Some(m),
                _ => {
                    return Err(SyntaxError::detached(format!(
                        "multipleOf should be a valid int{bits} value, but got `{text}`"
                    ))
                    .into());
                }
            },
            None => None,
        };

        let mut enums = IndexMap::new();
        for lit in rule.enumeration().unwrap_or_default() {
            let value = parse(lit.as_str()).ok_or_else(|| {
                SyntaxError::detached(format!(
                    "enum should be a valid int{bits} value, but got `{lit}`"
                ))
            })?;
            enums.insert(value, lit.as_str().to_string());
        }

        Ok(Self {
            bits,
            minimum,
            maximum,
            exclusive_minimum: !rule.range.is_empty() && rule.exclusive_left,
            exclusive_maximum: !rule.range.is_empty() && rule.exclusive_right,
            multiple_of,
            enums,
        })
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    fn check(&self, value: i64) -> Result<()> {
        if !self.enums.is_empty() {
            if self.enums.contains_key(&value) {
                return Ok(());
            }
            return Err(ValidationError::not_in_enum(TARGET, value, self.enums.values()));
        }

        if let Some(m) = self.multiple_of {
            if value.checked_rem(m).unwrap_or(0) != 0 {
                return Err(ValidationError::multiple_of(TARGET, value, m));
            }
        }

        let (lo, hi) = int_bounds(self.bits);
        let minimum = self.minimum.unwrap_or(lo);
        let maximum = self.maximum.unwrap_or(hi);
        let below = value < minimum || (self.exclusive_minimum && value == minimum);
        let above = value > maximum || (self.exclusive_maximum && value == maximum);

        if below || above {
            return Err(OutOfRange::new(TARGET, value)
                .minimum(minimum, self.exclusive_minimum)
                .maximum(maximum, self.exclusive_maximum)
                .into());
        }

        Ok(())
    }
}

impl Validate for IntValidator {
    fn validate(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::Int(v) => self.check(*v),
            other => Err(ValidationError::unsupported_type(self, other.kind_name())),
        }
    }
}

impl fmt::Display for IntValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rule = Rule::new("int");
        rule.params = vec![RuleNode::Lit(RuleLit::new(self.bits.to_string()))];
        rule.range = range_lits(self.minimum, self.maximum);
        rule.exclusive_left = self.exclusive_minimum;
        rule.exclusive_right = self.exclusive_maximum;
        rule.values = match self.multiple_of {
            Some(m) => vec![RuleLit::new(format!("%{m}"))],
            None => self.enums.values().map(|v| RuleLit::new(v.as_str())).collect(),
        };
        write!(f, "{rule}")
    }
}

/// Builds [`IntValidator`]s for `@int` and its sized aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntFactory;

impl ValidatorFactory for IntFactory {
    fn names(&self) -> Vec<String> {
        ["int", "int8", "int16", "int32", "int64"].map(String::from).to_vec()
    }

    fn build(&self, rule: &TypedRule, _ctx: &CompileContext<'_>) -> Result<SharedValidator> {
        let validator = IntValidator::from_rule(rule.rule())?;
        let ty = rule.ty();

        if ty.kind() != Kind::Int {
            return Err(ValidationError::unsupported_type(rule, ty.name()));
        }
        if ty.bits().is_some_and(|bits| validator.bits > bits) {
            return Err(ValidationError::unsupported_type_with(
                rule,
                ty.name(),
                "bit size too large",
            ));
        }

        Ok(Arc::new(validator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn validator(text: &str) -> IntValidator {
        IntValidator::from_rule(&Rule::parse(text).unwrap()).unwrap()
    }

    #[rstest]
    #[case("@int8[1,]", "@int<8>[1,]")]
    #[case("@int[1,1000)", "@int<32>[1,1000)")]
    #[case("@int(1,1000]", "@int<32>(1,1000]")]
    #[case("@int[1]", "@int<32>[1]")]
    #[case("@int[,1]", "@int<32>[,1]")]
    #[case("@int16{1,2}", "@int<16>{1,2}")]
    #[case("@int16{%2}", "@int<16>{%2}")]
    #[case("@int<53>", "@int<53>")]
    fn test_canonical_text(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(validator(text).to_string(), expected);
    }

    #[rstest]
    #[case("@int[1,]", 1)]
    #[case("@int(1,3)", 2)]
    #[case("@int{1,2}", 2)]
    #[case("@int{%2}", -4)]
    #[case("@int8", 127)]
    fn test_accepts(#[case] text: &str, #[case] value: i64) {
        assert_eq!(validator(text).check(value), Ok(()));
    }

    #[rstest]
    #[case("@int[1,]", 0)]
    #[case("@int(1,3)", 3)]
    #[case("@int(1,3)", 1)]
    #[case("@int{1,2}", 3)]
    #[case("@int{%2}", 3)]
    #[case("@int8", 128)]
    fn test_rejects(#[case] text: &str, #[case] value: i64) {
        assert!(validator(text).check(value).is_err());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            validator("@int(1,3]").check(1).unwrap_err().to_string(),
            "int value should be larger than 1 and less or equal than 3, but got invalid value 1"
        );
        assert_eq!(
            validator("@int{%2}").check(3).unwrap_err().to_string(),
            "int value should be multiple of 2, but got invalid value 3"
        );
    }

    #[rstest]
    #[case("@int<8,16>")]
    #[case("@int<65>")]
    #[case("@int[2,1]")]
    #[case("@int8[1,300]")]
    #[case("@int{%0}")]
    #[case("@int{1,a}")]
    fn test_invalid_rules(#[case] text: &str) {
        assert!(IntValidator::from_rule(&Rule::parse(text).unwrap()).is_err());
    }

    #[test]
    fn test_rejects_wrong_value_kind() {
        let err = validator("@int").validate(&mut Value::String("1".into())).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }
}
