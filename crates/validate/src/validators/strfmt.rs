//! Named string formats: `@email`, `@uuid`, `@alpha` and friends.
//!
//! A format is either a regular expression or a predicate closure. Formats
//! register under a primary name plus any aliases and only accept text.

use std::fmt;
use std::net::Ipv4Addr;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::error::{Result, ValidationError};
use crate::foundation::{SharedValidator, TypedRule, Validate, ValidatorFactory};
use crate::reflect::{Kind, Value};
use crate::registry::CompileContext;

type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

#[derive(Clone)]
enum Check {
    Pattern(Regex),
    Func(Predicate),
}

/// Validator for a named string format.
///
/// # Examples
///
/// ```rust
/// use nebula_validate::prelude::*;
/// use nebula_validate::validators::StrfmtValidator;
///
/// let alpha = StrfmtValidator::regex("^[a-zA-Z]+$", "alpha", &[]).unwrap();
///
/// assert!(alpha.validate(&mut Value::String("abc".into())).is_ok());
/// let err = alpha.validate(&mut Value::String("1".into())).unwrap_err();
/// assert_eq!(err.to_string(), "alpha ^[a-zA-Z]+$ not match 1");
/// ```
#[derive(Clone)]
pub struct StrfmtValidator {
    names: Vec<String>,
    check: Check,
}

impl StrfmtValidator {
    /// Format backed by a regular expression.
    pub fn regex(pattern: &str, name: &str, aliases: &[&str]) -> Result<Self, regex::Error> {
        Ok(Self::from_regex(Regex::new(pattern)?, name, aliases))
    }

    pub fn from_regex(pattern: Regex, name: &str, aliases: &[&str]) -> Self {
        Self {
            names: names(name, aliases),
            check: Check::Pattern(pattern),
        }
    }

    /// Format backed by a predicate.
    pub fn new(
        check: impl Fn(&str) -> bool + Send + Sync + 'static,
        name: &str,
        aliases: &[&str],
    ) -> Self {
        Self {
            names: names(name, aliases),
            check: Check::Func(Arc::new(check)),
        }
    }

    /// Primary name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    fn check(&self, s: &str) -> Result<()> {
        match &self.check {
            Check::Pattern(pattern) if !pattern.is_match(s) => {
                Err(ValidationError::not_match(self.name(), pattern, s))
            }
            Check::Func(check) if !check(s) => Err(ValidationError::InvalidFormat {
                format: self.name().to_string(),
                current: s.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn names(name: &str, aliases: &[&str]) -> Vec<String> {
    std::iter::once(name)
        .chain(aliases.iter().copied())
        .map(str::to_string)
        .collect()
}

impl Validate for StrfmtValidator {
    fn validate(&self, value: &mut Value) -> Result<()> {
        match value {
            Value::String(s) => self.check(s),
            other => Err(ValidationError::unsupported_type(self, other.kind_name())),
        }
    }
}

impl fmt::Display for StrfmtValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name())
    }
}

impl fmt::Debug for StrfmtValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pattern = match &self.check {
            Check::Pattern(re) => Some(re.as_str()),
            Check::Func(_) => None,
        };
        f.debug_struct("StrfmtValidator")
            .field("names", &self.names)
            .field("pattern", &pattern)
            .finish()
    }
}

impl ValidatorFactory for StrfmtValidator {
    fn names(&self) -> Vec<String> {
        self.names.clone()
    }

    fn build(&self, rule: &TypedRule, _ctx: &CompileContext<'_>) -> Result<SharedValidator> {
        if rule.ty().kind() != Kind::String {
            return Err(ValidationError::unsupported_type(rule, rule.ty().name()));
        }
        Ok(Arc::new(self.clone()))
    }
}

// ============================================================================
// BUILT-IN FORMATS
// ============================================================================

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+(?:[/?#][^\s]*)?$").unwrap()
});

static HTTP_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[^\s/?#]+(?:[/?#][^\s]*)?$").unwrap());

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$")
        .unwrap()
});

static ALPHA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

static ALPHA_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9]+$").unwrap());

static NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?$").unwrap());

static HEXADECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:0[xX])?[0-9a-fA-F]+$").unwrap());

static BASE64: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$").unwrap()
});

/// Formats registered by default.
pub fn builtin_formats() -> Vec<StrfmtValidator> {
    let regex = |re: &LazyLock<Regex>, name: &str, aliases: &[&str]| {
        StrfmtValidator::from_regex(Regex::clone(re), name, aliases)
    };

    vec![
        regex(&EMAIL, "email", &[]),
        regex(&URL, "url", &[]),
        regex(&HTTP_URL, "http-url", &["httpURL"]),
        regex(&UUID, "uuid", &[]),
        StrfmtValidator::new(|s| s.parse::<Ipv4Addr>().is_ok(), "ipv4", &[]),
        regex(&HOSTNAME, "hostname", &[]),
        regex(&ALPHA, "alpha", &[]),
        regex(&ALPHA_NUMERIC, "alpha-numeric", &["alphaNumeric"]),
        regex(&NUMERIC, "numeric", &[]),
        regex(&HEXADECIMAL, "hexadecimal", &[]),
        regex(&BASE64, "base64", &[]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{Reflect, Type};
    use crate::registry::ValidatorRegistry;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn text(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[rstest]
    #[case("@email", "someone@example.com", true)]
    #[case("@email", "someone.example.com", false)]
    #[case("@url", "ftp://example.com/file", true)]
    #[case("@url", "example.com", false)]
    #[case("@httpURL", "https://example.com/a?b=c", true)]
    #[case("@http-url", "ftp://example.com", false)]
    #[case("@uuid", "67e55044-10b1-426f-9247-bb680e5fe0c8", true)]
    #[case("@uuid", "67e55044-10b1-426f-9247", false)]
    #[case("@ipv4", "192.168.0.1", true)]
    #[case("@ipv4", "192.168.0.256", false)]
    #[case("@hostname", "api.example.com", true)]
    #[case("@hostname", "-bad.example.com", false)]
    #[case("@alpha", "abc", true)]
    #[case("@alpha", "ab1", false)]
    #[case("@alphaNumeric", "ab1", true)]
    #[case("@alpha-numeric", "ab-1", false)]
    #[case("@numeric", "-1.5", true)]
    #[case("@numeric", "1e5", false)]
    #[case("@hexadecimal", "0xFF", true)]
    #[case("@hexadecimal", "0xFG", false)]
    #[case("@base64", "aGVsbG8=", true)]
    #[case("@base64", "aGVsbG8", false)]
    fn test_builtin_formats(#[case] rule: &str, #[case] value: &str, #[case] ok: bool) {
        let registry = ValidatorRegistry::new();
        let loader = registry.compile(rule, &String::type_info(), None).unwrap();
        assert_eq!(loader.validate(&mut text(value)).is_ok(), ok, "{rule} {value}");
    }

    #[test]
    fn test_display_uses_primary_name() {
        let registry = ValidatorRegistry::new();
        let loader = registry.compile("@httpURL", &String::type_info(), None).unwrap();
        assert_eq!(loader.to_string(), "@http-url");
    }

    #[test]
    fn test_predicate_failure_message() {
        let ipv4 = StrfmtValidator::new(|s| s.parse::<Ipv4Addr>().is_ok(), "ipv4", &[]);
        let err = ipv4.validate(&mut text("localhost")).unwrap_err();
        assert_eq!(err.to_string(), "invalid ipv4");
    }

    #[test]
    fn test_rejects_non_text() {
        let registry = ValidatorRegistry::new();
        assert!(registry.compile("@email", &i32::type_info(), None).is_err());

        let alpha = StrfmtValidator::regex("^[a-z]+$", "lower", &[]).unwrap();
        assert!(alpha.validate(&mut Value::Int(1)).is_err());
    }

    #[test]
    fn test_custom_format_registration() {
        let registry = ValidatorRegistry::new();
        registry.register(StrfmtValidator::regex(r"^\+\d{7,15}$", "phone", &["msisdn"]).unwrap());

        let ty = Type::of::<String>();
        let loader = registry.compile("@msisdn", &ty, None).unwrap();
        assert!(loader.validate(&mut text("+4915112345678")).is_ok());
        assert!(loader.validate(&mut text("015112345678")).is_err());
    }
}
