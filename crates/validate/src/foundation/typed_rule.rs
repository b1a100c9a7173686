use std::fmt;

use nebula_rule::Rule;

use crate::reflect::Type;

/// A parsed rule bound to the type it will validate.
///
/// Post-processors passed to
/// [`CompileContext::compile_with`](crate::registry::CompileContext::compile_with)
/// receive a `TypedRule` and may adjust optionality, the default value or the
/// error message before the cache is consulted.
#[derive(Debug, Clone)]
pub struct TypedRule {
    rule: Rule,
    ty: Type,
    error_message: Option<String>,
}

impl TypedRule {
    pub fn new(rule: Rule, ty: Type) -> Self {
        Self {
            rule,
            ty,
            error_message: None,
        }
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn name(&self) -> &str {
        &self.rule.name
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.rule.optional
    }

    pub fn default_value(&self) -> Option<&str> {
        self.rule.default_value.as_deref()
    }

    pub fn set_optional(&mut self, optional: bool) {
        self.rule.optional = optional;
    }

    /// Sets the default and marks the rule optional.
    pub fn set_default_value(&mut self, value: impl Into<String>) {
        self.rule.optional = true;
        self.rule.default_value = Some(value.into());
    }

    pub fn set_error_message(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }

    /// The same rule bound to another type.
    pub fn with_type(&self, ty: Type) -> Self {
        Self {
            rule: self.rule.clone(),
            ty,
            error_message: self.error_message.clone(),
        }
    }

    /// Canonical rule text, keeping the optional marker of nameless rules.
    pub fn rule_text(&self) -> String {
        if !self.rule.is_empty() {
            return self.rule.to_string();
        }
        match (&self.rule.default_value, self.rule.optional) {
            (Some(value), _) => format!("= {}", nebula_rule::quote::single_quote(value)),
            (None, true) => "?".to_string(),
            (None, false) => String::new(),
        }
    }

    /// Key under which the compiled loader is cached when struct fields are
    /// named by `name_tag`.
    ///
    /// Parts are separated by NUL, which no type name or tag contains.
    pub fn cache_key(&self, name_tag: &str) -> String {
        format!(
            "{}\u{0}{}\u{0}{}\u{0}{}",
            self.ty.name(),
            name_tag,
            self.rule_text(),
            self.error_message.as_deref().unwrap_or_default()
        )
    }

    pub(crate) fn into_parts(self) -> (Rule, Type, Option<String>) {
        (self.rule, self.ty, self.error_message)
    }
}

impl fmt::Display for TypedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.rule_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::Reflect;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_implies_optional() {
        let mut rule = TypedRule::new(Rule::new("string"), String::type_info());
        rule.set_default_value("x");
        assert!(rule.is_optional());
        assert_eq!(rule.rule_text(), "@string = 'x'");
    }

    #[test]
    fn test_nameless_rule_keeps_markers() {
        let mut rule = TypedRule::new(Rule::default(), i32::type_info());
        assert_eq!(rule.rule_text(), "");
        rule.set_optional(true);
        assert_eq!(rule.rule_text(), "?");
        rule.set_default_value("1");
        assert_eq!(rule.rule_text(), "= '1'");
    }

    #[test]
    fn test_cache_key_includes_type_tag_and_message() {
        let mut rule = TypedRule::new(Rule::new("int"), i32::type_info());
        assert_eq!(rule.cache_key("json"), "i32\u{0}json\u{0}@int\u{0}");
        rule.set_error_message("bad");
        assert_eq!(rule.cache_key("json"), "i32\u{0}json\u{0}@int\u{0}bad");
        assert_ne!(rule.cache_key("json"), rule.cache_key("yaml"));
    }

    #[test]
    fn test_cache_key_parts_do_not_run_together() {
        let message_only = {
            let mut rule = TypedRule::new(Rule::default(), String::type_info());
            rule.set_error_message("?");
            rule
        };
        let mut optional = TypedRule::new(Rule::default(), String::type_info());
        optional.set_optional(true);
        assert_ne!(message_only.cache_key("json"), optional.cache_key("json"));
    }
}
