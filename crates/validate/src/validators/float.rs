//! Floating point validator.
//!
//! `@float<MAX_DIGITS,DECIMAL_DIGITS>` bounds the number of digits of every
//! value, and every literal in the rule must fit the same limits.
//! `@float32` and `@float` default to `<7,2>`, `@float64` and `@double` to
//! `<15,2>`.

use std::fmt;
use std::sync::Arc;

use nebula_rule::{Rule, RuleLit, RuleNode, SyntaxError};

use super::range::float_range;
use crate::error::{OutOfRange, Result, ValidationError};
use crate::foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
use crate::reflect::{Kind, Value};
use crate::registry::CompileContext;

const TARGET: &str = "float value";
const TARGET_TOTAL_DIGITS: &str = "total digits of float value";
const TARGET_DECIMAL_DIGITS: &str = "decimal digits of float value";

const DEFAULT_DECIMAL_DIGITS: u32 = 2;

/// A rule literal together with the number it denotes.
#[derive(Debug, Clone, PartialEq)]
struct Bound {
    value: f64,
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloatValidator {
    max_digits: u32,
    decimal_digits: u32,
    minimum: Option<Bound>,
    maximum: Option<Bound>,
    exclusive_minimum: bool,
    exclusive_maximum: bool,
    multiple_of: Option<Bound>,
    enums: Vec<Bound>,
}

/// Integer and fractional digit counts of the shortest decimal form.
fn digits_of(value: f64) -> (u32, u32) {
    let text = value.abs().to_string();
    let (int, frac) = text.split_once('.').unwrap_or((&text, ""));
    let count = |s: &str| u32::try_from(s.len()).unwrap_or(u32::MAX);
    (count(int) + count(frac), count(frac))
}

fn round(value: f64, decimals: u32) -> f64 {
    let decimals = decimals as usize;
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

impl FloatValidator {
    pub fn from_rule(rule: &Rule) -> Result<Self> {
        let mut max_digits = match rule.name.as_str() {
            "double" | "float64" => 15,
            _ => 7,
        };
        let mut decimal_digits = DEFAULT_DECIMAL_DIGITS;

        if rule.params.len() > 2 {
            return Err(ValidationError::invalid_rule(
                rule,
                format!("float should only 1 or 2 parameter, but got {}", rule.params.len()),
            ));
        }

        let param = |index: usize| -> Result<Option<u32>> {
            let text = match rule.param(index) {
                Some(RuleNode::Lit(lit)) if !lit.is_empty() => lit.as_str(),
                Some(RuleNode::Rule(nested)) => {
                    return Err(ValidationError::invalid_rule(
                        rule,
                        format!("float parameter should be a digit count, but got `{nested}`"),
                    ));
                }
                _ => return Ok(None),
            };
            match text.parse::<u32>() {
                Ok(n) if n < 16 => Ok(Some(n)),
                _ => Err(SyntaxError::detached(format!(
                    "digits should be a uint value which less than 16, but got `{text}`"
                ))
                .into()),
            }
        };

        if let Some(n) = param(0)? {
            max_digits = n;
        }
        if let Some(n) = param(1)? {
            if n >= max_digits {
                return Err(SyntaxError::detached(format!(
                    "decimal digits should be a uint value which less than {max_digits}, but got `{n}`"
                ))
                .into());
            }
            decimal_digits = n;
        }

        let mut validator = Self {
            max_digits,
            decimal_digits,
            minimum: None,
            maximum: None,
            exclusive_minimum: false,
            exclusive_maximum: false,
            multiple_of: None,
            enums: Vec::new(),
        };

        let (minimum, maximum) = float_range(rule, |text| validator.parse_literal(text))?;
        let bound = |b: Option<(f64, &str)>| b.map(|(value, text)| Bound { value, text: text.to_string() });
        validator.minimum = bound(minimum);
        validator.maximum = bound(maximum);
        validator.exclusive_minimum = !rule.range.is_empty() && rule.exclusive_left;
        validator.exclusive_maximum = !rule.range.is_empty() && rule.exclusive_right;

        if let Some(text) = rule.multiple_of() {
            match validator.parse_literal(text) {
                Some(value) if value != 0.0 => {
                    validator.multiple_of = Some(Bound {
                        value,
                        text: text.to_string(),
                    });
                }
                _ => {
                    return Err(SyntaxError::detached(format!(
                        "multipleOf should be a valid float<{max_digits}> value, but got `{text}`"
                    ))
                    .into());
                }
            }
        }

        for lit in rule.enumeration().unwrap_or_default() {
            let value = validator.parse_literal(lit.as_str()).ok_or_else(|| {
                SyntaxError::detached(format!(
                    "enum should be a valid float<{max_digits}> value, but got `{lit}`"
                ))
            })?;
            validator.enums.push(Bound {
                value,
                text: lit.as_str().to_string(),
            });
        }

        Ok(validator)
    }

    pub fn max_digits(&self) -> u32 {
        self.max_digits
    }

    pub fn decimal_digits(&self) -> u32 {
        self.decimal_digits
    }

    /// Parses a rule literal, rejecting text over the digit limits.
    fn parse_literal(&self, text: &str) -> Option<f64> {
        let text = text.trim();
        let plain = text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'));
        if !plain {
            return None;
        }

        let value = text.parse::<f64>().ok().filter(|v| v.is_finite())?;
        let unsigned = text.trim_start_matches(['-', '+']);
        let (int, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        let int = if int.is_empty() { "0" } else { int };

        let total = int.len() + frac.len();
        if total > self.max_digits as usize || frac.len() > self.decimal_digits as usize {
            return None;
        }
        Some(value)
    }

    fn check(&self, value: f64) -> Result<()> {
        let (total, decimals) = digits_of(value);
        if total > self.max_digits {
            return Err(OutOfRange::new(TARGET_TOTAL_DIGITS, value)
                .maximum(self.max_digits, false)
                .into());
        }
        if decimals > self.decimal_digits {
            return Err(OutOfRange::new(TARGET_DECIMAL_DIGITS, value)
                .maximum(self.decimal_digits, false)
                .into());
        }

        if !self.enums.is_empty() {
            if self.enums.iter().any(|e| e.value == value) {
                return Ok(());
            }
            return Err(ValidationError::not_in_enum(
                TARGET,
                value,
                self.enums.iter().map(|e| e.text.as_str()),
            ));
        }

        if let Some(min) = &self.minimum {
            if value < min.value || (self.exclusive_minimum && value == min.value) {
                return Err(OutOfRange::new(TARGET, value)
                    .minimum(&min.text, self.exclusive_minimum)
                    .into());
            }
        }

        if let Some(max) = &self.maximum {
            if value > max.value || (self.exclusive_maximum && value == max.value) {
                return Err(OutOfRange::new(TARGET, value)
                    .maximum(&max.text, self.exclusive_maximum)
                    .into());
            }
        }

        if let Some(multiple) = &self.multiple_of {
            let quotient = round(value / multiple.value, self.decimal_digits);
            if quotient != quotient.trunc() {
                return Err(ValidationError::multiple_of(TARGET, value, &multiple.text));
            }
        }

        Ok(())
    }
}

impl Validate for FloatValidator {
    fn validate(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::Float(v) if v.is_finite() => self.check(*v),
            Value::Float(v) => Err(ValidationError::unsupported_type_with(
                self,
                "float",
                format!("non-finite value {v}"),
            )),
            other => Err(ValidationError::unsupported_type(self, other.kind_name())),
        }
    }
}

impl fmt::Display for FloatValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = |b: &Option<Bound>| {
            b.as_ref()
                .map(|b| RuleLit::new(b.text.as_str()))
                .unwrap_or_default()
        };

        let mut rule = Rule::new("float");
        rule.params = vec![
            RuleNode::Lit(RuleLit::new(self.max_digits.to_string())),
            RuleNode::Lit(RuleLit::new(self.decimal_digits.to_string())),
        ];
        rule.range = match (&self.minimum, &self.maximum) {
            (None, None) => Vec::new(),
            (Some(lo), Some(hi)) if lo == hi => vec![RuleLit::new(lo.text.as_str())],
            _ => vec![text(&self.minimum), text(&self.maximum)],
        };
        rule.exclusive_left = self.exclusive_minimum;
        rule.exclusive_right = self.exclusive_maximum;
        rule.values = match &self.multiple_of {
            Some(m) => vec![RuleLit::new(format!("%{}", m.text))],
            None => self.enums.iter().map(|e| RuleLit::new(e.text.as_str())).collect(),
        };
        write!(f, "{rule}")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatFactory;

impl ValidatorFactory for FloatFactory {
    fn names(&self) -> Vec<String> {
        ["float", "double", "float32", "float64"].map(String::from).to_vec()
    }

    fn build(&self, rule: &TypedRule, _ctx: &CompileContext<'_>) -> Result<SharedValidator> {
        let validator = FloatValidator::from_rule(rule.rule())?;
        let ty = rule.ty();

        if ty.kind() != Kind::Float {
            return Err(ValidationError::unsupported_type(rule, ty.name()));
        }
        if ty.bits() == Some(32) && validator.max_digits > 7 {
            return Err(ValidationError::unsupported_type_with(
                rule,
                ty.name(),
                "max digits too large",
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

    fn validator(text: &str) -> FloatValidator {
        FloatValidator::from_rule(&Rule::parse(text).unwrap()).unwrap()
    }

    #[rstest]
    #[case("@float[1,1000]", "@float<7,2>[1,1000]")]
    #[case("@float64<10,4>[-1.1,]", "@float<10,4>[-1.1,]")]
    #[case("@double(1.1,2.2)", "@float<15,2>(1.1,2.2)")]
    #[case("@float{1.1,1.2}", "@float<7,2>{1.1,1.2}")]
    #[case("@float{%0.5}", "@float<7,2>{%0.5}")]
    #[case("@float<5,3>[1.5]", "@float<5,3>[1.5]")]
    fn test_canonical_text(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(validator(text).to_string(), expected);
    }

    #[rstest]
    #[case("@float[1,10]", 1.0, true)]
    #[case("@float(1,10]", 1.0, false)]
    #[case("@float[1,10)", 10.0, false)]
    #[case("@float<5,2>", 1.111, false)]
    #[case("@float<5,2>", 12345.6, false)]
    #[case("@float<5,2>", 123.45, true)]
    #[case("@float{1.1,1.2}", 1.2, true)]
    #[case("@float{1.1,1.2}", 1.3, false)]
    #[case("@float{%0.5}", 1.5, true)]
    #[case("@float{%0.5}", 1.2, false)]
    #[case("@float{%2.2}", 4.4, true)]
    fn test_check(#[case] text: &str, #[case] value: f64, #[case] ok: bool) {
        assert_eq!(validator(text).check(value).is_ok(), ok, "{text} {value}");
    }

    #[rstest]
    #[case("@float<1,2>")]
    #[case("@float<16>")]
    #[case("@float<5,2>[1.111,]")]
    #[case("@float<3,1>[,12345]")]
    #[case("@float[2,1]")]
    #[case("@float{%0}")]
    #[case("@float{1,x}")]
    #[case("@float<1,2,3>")]
    fn test_invalid_rules(#[case] text: &str) {
        assert!(FloatValidator::from_rule(&Rule::parse(text).unwrap()).is_err());
    }

    #[test]
    fn test_digit_error_message() {
        let err = validator("@float<5,2>").check(1.111).unwrap_err();
        assert_eq!(
            err.to_string(),
            "decimal digits of float value should be less or equal than 2, but got invalid value 1.111"
        );
    }

    #[test]
    fn test_non_finite_values_are_unsupported() {
        let err = validator("@float").validate(&mut Value::Float(f64::NAN)).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }
}
