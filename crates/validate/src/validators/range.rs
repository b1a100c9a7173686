//! Bound parsing shared by the numeric and length validators.

use std::fmt;

use nebula_rule::{Rule, RuleLit, RuleNode, SyntaxError};

use crate::error::{Result, ValidationError};

/// Smallest and largest signed value representable in `bits`.
pub(crate) const fn int_bounds(bits: u32) -> (i64, i64) {
    if bits >= 64 {
        (i64::MIN, i64::MAX)
    } else {
        (i64::MIN >> (64 - bits), i64::MAX >> (64 - bits))
    }
}

/// Largest unsigned value representable in `bits`.
pub(crate) const fn uint_max(bits: u32) -> u64 {
    if bits >= 64 { u64::MAX } else { u64::MAX >> (64 - bits) }
}

/// Bit size from the digits of the rule name, else its single parameter,
/// else 32. An explicit `0` also means 32.
pub(crate) fn bit_size(rule: &Rule) -> Result<u32> {
    let digits: String = rule.name.chars().filter(char::is_ascii_digit).collect();

    let text = if !digits.is_empty() {
        digits
    } else {
        match rule.params.as_slice() {
            [] => return Ok(32),
            [RuleNode::Lit(lit)] => lit.as_str().to_string(),
            params => {
                return Err(ValidationError::invalid_rule(
                    rule,
                    format!("{} should only 1 parameter, but got {}", rule.name, params.len()),
                ));
            }
        }
    };

    match text.parse::<u32>() {
        Ok(0) => Ok(32),
        Ok(bits) if bits <= 64 => Ok(bits),
        _ => Err(SyntaxError::detached(format!(
            "{} parameter should be valid bit size, but got `{text}`",
            rule.name
        ))
        .into()),
    }
}

/// `(`/`)` are only meaningful for numeric values.
pub(crate) fn reject_exclusive(rule: &Rule) -> Result<()> {
    if rule.has_exclusive_bound() {
        return Err(SyntaxError::detached(format!(
            "range mark of {} should not be `(` or `)`",
            rule.name
        ))
        .into());
    }
    Ok(())
}

/// Splits a range into its optional textual bounds; `[a]` is `a..=a`.
fn bounds(range: &[RuleLit]) -> (Option<&str>, Option<&str>) {
    fn lit(lit: &RuleLit) -> Option<&str> {
        (!lit.is_empty()).then(|| lit.as_str().trim())
    }

    match range {
        [only] => (lit(only), lit(only)),
        [min, max] => (lit(min), lit(max)),
        _ => (None, None),
    }
}

fn parse_bound<T>(rule: &Rule, side: &str, text: Option<&str>, parse: impl Fn(&str) -> Option<T>) -> Result<Option<T>> {
    text.map(|text| {
        parse(text).ok_or_else(|| {
            ValidationError::invalid_rule(rule, format!("{side} value `{text}` is not correct"))
        })
    })
    .transpose()
}

fn ordered<T: PartialOrd + fmt::Display>(rule: &Rule, min: Option<T>, max: Option<T>) -> Result<(Option<T>, Option<T>)> {
    if let (Some(lo), Some(hi)) = (&min, &max) {
        if hi < lo {
            return Err(ValidationError::invalid_rule(
                rule,
                format!("max value must be equal or larger than min value {lo}, current {hi}"),
            ));
        }
    }
    Ok((min, max))
}

/// Signed bounds restricted to `bits`.
pub(crate) fn int_range(rule: &Rule, bits: u32) -> Result<(Option<i64>, Option<i64>)> {
    let (lo, hi) = int_bounds(bits);
    let parse = |text: &str| text.parse::<i64>().ok().filter(|v| (lo..=hi).contains(v));
    let (min, max) = bounds(&rule.range);
    ordered(
        rule,
        parse_bound(rule, "min", min, parse)?,
        parse_bound(rule, "max", max, parse)?,
    )
}

/// Unsigned bounds restricted to `bits`.
pub(crate) fn uint_range(rule: &Rule, bits: u32) -> Result<(Option<u64>, Option<u64>)> {
    let limit = uint_max(bits);
    let parse = |text: &str| text.parse::<u64>().ok().filter(|v| *v <= limit);
    let (min, max) = bounds(&rule.range);
    ordered(
        rule,
        parse_bound(rule, "min", min, parse)?,
        parse_bound(rule, "max", max, parse)?,
    )
}

/// Length or size bounds; the minimum defaults to zero.
pub(crate) fn length_range(rule: &Rule) -> Result<(u64, Option<u64>)> {
    reject_exclusive(rule)?;
    let (min, max) = uint_range(rule, 64)?;
    Ok((min.unwrap_or(0), max))
}

/// Textual bounds of a float range, validated by `parse`.
pub(crate) fn float_range<'r>(
    rule: &'r Rule,
    parse: impl Fn(&str) -> Option<f64>,
) -> Result<(Option<(f64, &'r str)>, Option<(f64, &'r str)>)> {
    let bound = |side: &str, text: Option<&'r str>| -> Result<Option<(f64, &'r str)>> {
        text.map(|text| {
            parse(text).map(|value| (value, text)).ok_or_else(|| {
                ValidationError::invalid_rule(rule, format!("{side} value `{text}` is not correct"))
            })
        })
        .transpose()
    };

    let (min, max) = bounds(&rule.range);
    let (min, max) = (bound("min", min)?, bound("max", max)?);
    if let (Some((lo, _)), Some((hi, _))) = (min, max) {
        if hi < lo {
            return Err(ValidationError::invalid_rule(
                rule,
                format!("max value must be equal or larger than min value {lo}, current {hi}"),
            ));
        }
    }
    Ok((min, max))
}

/// Range literals rendering optional bounds; equal bounds collapse to `[n]`.
pub(crate) fn range_lits<T: PartialEq + fmt::Display>(min: Option<T>, max: Option<T>) -> Vec<RuleLit> {
    let lit = |v: Option<T>| v.map(|v| RuleLit::new(v.to_string())).unwrap_or_default();
    match (min, max) {
        (None, None) => Vec::new(),
        (Some(lo), Some(hi)) if lo == hi => vec![lit(Some(lo))],
        (lo, hi) => vec![lit(lo), lit(hi)],
    }
}

/// Length range literals; a zero minimum without maximum is no range.
pub(crate) fn length_lits(min: u64, max: Option<u64>) -> Vec<RuleLit> {
    if min == 0 && max.is_none() {
        return Vec::new();
    }
    range_lits(Some(min), max)
}
