//! Rule tree produced by the scanner.

use std::fmt;

use regex::Regex;

use crate::quote::{single_quote, slash};

// ============================================================================
// LITERAL
// ============================================================================

/// A raw text fragment of a rule.
///
/// Literals grow while scanning: `[1 2,3]` yields the literals `12` and `3`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RuleLit(String);

impl RuleLit {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn append(&mut self, text: &str) {
        self.0.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RuleLit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleLit {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

// ============================================================================
// NODE
// ============================================================================

/// One parameter slot of a rule.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleNode {
    Rule(Box<Rule>),
    Lit(RuleLit),
}

impl RuleNode {
    /// The nested rule, if the slot holds one.
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Self::Rule(rule) => Some(rule),
            Self::Lit(_) => None,
        }
    }

    /// The literal, if the slot holds one.
    pub fn as_lit(&self) -> Option<&RuleLit> {
        match self {
            Self::Lit(lit) => Some(lit),
            Self::Rule(_) => None,
        }
    }

    /// `true` for an empty literal slot, e.g. the first slot of `<,@int>`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Lit(lit) if lit.is_empty())
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule(rule) => write!(f, "{rule}"),
            Self::Lit(lit) => write!(f, "{lit}"),
        }
    }
}

// ============================================================================
// RULE
// ============================================================================

/// A parsed `@name<params>[range]{values}/pattern/ = 'default'` expression.
///
/// Equality is constraint equivalence: `raw` is ignored, patterns compare by
/// their source and the exclusivity flags only count when a range exists.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    pub name: String,
    pub params: Vec<RuleNode>,
    pub range: Vec<RuleLit>,
    pub exclusive_left: bool,
    pub exclusive_right: bool,
    pub values: Vec<RuleLit>,
    pub pattern: Option<Regex>,
    pub optional: bool,
    pub default_value: Option<String>,
    /// Source text this rule was scanned from.
    pub raw: String,
}

impl Rule {
    /// A rule with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// `true` for the rule produced from empty rule text.
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Parameter at `index`, if declared.
    pub fn param(&self, index: usize) -> Option<&RuleNode> {
        self.params.get(index)
    }

    /// The divisor of a `{%N}` marker.
    pub fn multiple_of(&self) -> Option<&str> {
        match self.values.as_slice() {
            [only] => only.as_str().strip_prefix('%'),
            _ => None,
        }
    }

    /// Enumerated values, unless the value list is a multiple-of marker.
    pub fn enumeration(&self) -> Option<&[RuleLit]> {
        if self.values.is_empty() || self.multiple_of().is_some() {
            None
        } else {
            Some(&self.values)
        }
    }

    pub fn has_exclusive_bound(&self) -> bool {
        !self.range.is_empty() && (self.exclusive_left || self.exclusive_right)
    }

    /// Marks the rule optional with the given default.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.optional = true;
        self.default_value = Some(value.into());
        self
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        let flags_match = self.range.is_empty()
            || (self.exclusive_left == other.exclusive_left
                && self.exclusive_right == other.exclusive_right);

        self.name == other.name
            && self.params == other.params
            && self.range == other.range
            && flags_match
            && self.values == other.values
            && self.pattern.as_ref().map(Regex::as_str) == other.pattern.as_ref().map(Regex::as_str)
            && self.optional == other.optional
            && self.default_value == other.default_value
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[impl fmt::Display]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }

        write!(f, "@{}", self.name)?;

        if !self.params.is_empty() {
            f.write_str("<")?;
            write_joined(f, &self.params)?;
            f.write_str(">")?;
        }

        if !self.range.is_empty() {
            f.write_str(if self.exclusive_left { "(" } else { "[" })?;
            write_joined(f, &self.range)?;
            f.write_str(if self.exclusive_right { ")" } else { "]" })?;
        }

        if !self.values.is_empty() {
            f.write_str("{")?;
            write_joined(f, &self.values)?;
            f.write_str("}")?;
        }

        if let Some(pattern) = &self.pattern {
            write!(f, "/{}/", slash(pattern.as_str()))?;
        }

        if self.optional {
            match &self.default_value {
                Some(value) => write!(f, " = {}", single_quote(value))?,
                None => f.write_str("?")?,
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_orders_sections() {
        let mut rule = Rule::new("string");
        rule.params.push(RuleNode::Lit("rune_count".into()));
        rule.range = vec!["1".into(), RuleLit::default()];
        rule.exclusive_left = true;
        rule.optional = true;

        assert_eq!(rule.to_string(), "@string<rune_count>(1,]?");
    }

    #[test]
    fn test_display_nested_and_default() {
        let mut inner = Rule::new("int");
        inner.range = vec!["0".into(), "10".into()];
        let mut rule = Rule::new("slice").with_default("it's");
        rule.params.push(RuleNode::Rule(Box::new(inner)));

        assert_eq!(rule.to_string(), "@slice<@int[0,10]> = 'it\\'s'");
    }

    #[test]
    fn test_multiple_of_and_enumeration_are_exclusive() {
        let mut rule = Rule::new("int");
        rule.values = vec!["%3".into()];
        assert_eq!(rule.multiple_of(), Some("3"));
        assert!(rule.enumeration().is_none());

        rule.values = vec!["%3".into(), "4".into()];
        assert_eq!(rule.multiple_of(), None);
        assert_eq!(rule.enumeration().map(<[RuleLit]>::len), Some(2));
    }

    #[test]
    fn test_equality_ignores_raw_and_flags_without_range() {
        let mut a = Rule::new("int");
        a.raw = "@int".into();
        let mut b = Rule::new("int");
        b.exclusive_left = true;
        assert_eq!(a, b);

        a.range = vec!["1".into()];
        b.range = vec!["1".into()];
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_rule_renders_nothing() {
        assert_eq!(Rule::default().to_string(), "");
    }
}
