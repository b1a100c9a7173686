//! Unsigned integer validator, `@uint` with the same forms as `@int`.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use nebula_rule::{Rule, RuleLit, RuleNode, SyntaxError};

use super::range::{bit_size, range_lits, uint_max, uint_range};
use crate::error::{OutOfRange, Result, ValidationError};
use crate::foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
use crate::reflect::{Kind, Value};
use crate::registry::CompileContext;

const TARGET: &str = "uint value";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UintValidator {
    bits: u32,
    minimum: Option<u64>,
    maximum: Option<u64>,
    exclusive_minimum: bool,
    exclusive_maximum: bool,
    multiple_of: Option<u64>,
    enums: IndexMap<u64, String>,
}

impl UintValidator {
    pub fn from_rule(rule: &Rule) -> Result<Self> {
        let bits = bit_size(rule)?;
        let (minimum, maximum) = uint_range(rule, bits)?;
        let limit = uint_max(bits);
        let parse = |text: &str| text.trim().parse::<u64>().ok().filter(|v| *v <= limit);

        let multiple_of = match rule.multiple_of() {
            Some(text) => match parse(text) {
                Some(m) if m != 0 => Some(m),
                _ => {
                    return Err(SyntaxError::detached(format!(
                        "multipleOf should be a valid uint{bits} value, but got `{text}`"
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
                    "enum should be a valid uint{bits} value, but got `{lit}`"
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

    fn check(&self, value: u64) -> Result<()> {
        if !self.enums.is_empty() {
            if self.enums.contains_key(&value) {
                return Ok(());
            }
            return Err(ValidationError::not_in_enum(TARGET, value, self.enums.values()));
        }

        if let Some(m) = self.multiple_of {
            if value % m != 0 {
                return Err(ValidationError::multiple_of(TARGET, value, m));
            }
        }

        let minimum = self.minimum.unwrap_or(0);
        let maximum = self.maximum.unwrap_or_else(|| uint_max(self.bits));
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

impl Validate for UintValidator {
    fn validate(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::Uint(v) => self.check(*v),
            other => Err(ValidationError::unsupported_type(self, other.kind_name())),
        }
    }
}

impl fmt::Display for UintValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rule = Rule::new("uint");
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

#[derive(Debug, Clone, Copy, Default)]
pub struct UintFactory;

impl ValidatorFactory for UintFactory {
    fn names(&self) -> Vec<String> {
        ["uint", "uint8", "uint16", "uint32", "uint64"].map(String::from).to_vec()
    }

    fn build(&self, rule: &TypedRule, _ctx: &CompileContext<'_>) -> Result<SharedValidator> {
        let validator = UintValidator::from_rule(rule.rule())?;
        let ty = rule.ty();

        if ty.kind() != Kind::Uint {
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
