//! Validator registry and compile cache.
//!
//! The registry maps rule names to [`ValidatorFactory`] instances and
//! memoizes compiled [`ValidatorLoader`]s by type, rule text and error
//! override. It is an explicit value: create one, share it, and compile
//! through it.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use nebula_rule::{Rule, parse_rule};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Result, ValidationError};
use crate::foundation::{TypedRule, Validate, ValidatorFactory};
use crate::loader::ValidatorLoader;
use crate::reflect::{Kind, Reflect, Type};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tag keys and cache behaviour of a registry.
///
/// # Examples
///
/// ```rust
/// use nebula_validate::RegistryConfig;
///
/// let config: RegistryConfig = serde_json::from_str(r#"{"name_tag": "yaml"}"#).unwrap();
/// assert_eq!(config.name_tag, "yaml");
/// assert_eq!(config.rule_tag, "validate");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Tag holding a field's display name, e.g. `"name,omitempty"`.
    pub name_tag: String,
    /// Tag holding a field's rule text.
    pub rule_tag: String,
    /// Tag holding a field's default value.
    pub default_tag: String,
    /// Tag holding a replacement error message.
    pub error_tag: String,
    pub cache_enabled: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            name_tag: "json".to_string(),
            rule_tag: "validate".to_string(),
            default_tag: "default".to_string(),
            error_tag: "errMsg".to_string(),
            cache_enabled: true,
        }
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Post-processor applied to a rule before the cache is consulted.
pub type RuleProcessor<'f> = &'f dyn Fn(&mut TypedRule);

/// Maps rule names to factories and caches compiled validators.
///
/// # Examples
///
/// ```rust
/// use nebula_validate::prelude::*;
///
/// let registry = ValidatorRegistry::new();
/// let loader = registry
///     .compile("@slice<@string[1,]>[2,4]", &Type::of::<Vec<String>>(), None)
///     .unwrap();
///
/// let mut value = Value::Seq(vec![Value::String("a".into())]);
/// assert!(loader.validate(&mut value).is_err());
/// ```
pub struct ValidatorRegistry {
    factories: RwLock<IndexMap<String, Arc<dyn ValidatorFactory>>>,
    cache: DashMap<String, Arc<ValidatorLoader>>,
    config: RegistryConfig,
}

impl ValidatorRegistry {
    /// A registry with the built-in validators and default configuration.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Binds every name `factory` reports; later registrations win.
    pub fn register(&self, factory: impl ValidatorFactory + 'static) {
        self.register_shared(Arc::new(factory));
    }

    pub fn register_shared(&self, factory: Arc<dyn ValidatorFactory>) {
        let mut factories = self.factories.write();
        for name in factory.names() {
            if factories.insert(name.clone(), Arc::clone(&factory)).is_some() {
                warn!("Validator `@{}` re-registered, previous factory replaced", name);
            } else {
                debug!("Registered validator `@{}`", name);
            }
        }
    }

    /// Registered rule names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.factories.read().keys().cloned().collect()
    }

    pub fn factory(&self, name: &str) -> Option<Arc<dyn ValidatorFactory>> {
        self.factories.read().get(name).cloned()
    }

    /// Compiles `rule` for values of `ty`.
    ///
    /// `error_message` replaces every failure of the compiled validator.
    pub fn compile(
        &self,
        rule: &str,
        ty: &Type,
        error_message: Option<&str>,
    ) -> Result<Arc<ValidatorLoader>> {
        self.context().compile_inner(rule, ty, error_message, None)
    }

    /// Like [`compile`](Self::compile), running `post` on the parsed rule
    /// before the cache lookup.
    pub fn compile_with(
        &self,
        rule: &str,
        ty: &Type,
        error_message: Option<&str>,
        post: RuleProcessor<'_>,
    ) -> Result<Arc<ValidatorLoader>> {
        self.context().compile_inner(rule, ty, error_message, Some(post))
    }

    /// Root compile context using the configured name tag.
    pub fn context(&self) -> CompileContext<'_> {
        CompileContext {
            registry: self,
            name_tag: self.config.name_tag.clone(),
            chain: Vec::new(),
        }
    }

    /// Drops every cached validator.
    pub fn reset_cache(&self) {
        debug!("Clearing validator cache ({} entries)", self.cache.len());
        self.cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// The validator for `T` as described by its field tags.
    pub fn validator_for<T: Reflect>(&self) -> Result<Arc<ValidatorLoader>> {
        self.compile("", &T::type_info(), None)
    }

    /// Validates `value` against the rules declared on `T`.
    ///
    /// Defaults are applied to a temporary copy only; see
    /// [`validate_in_place`](Self::validate_in_place).
    pub fn validate<T: Reflect>(&self, value: &T) -> Result<()> {
        let loader = self.validator_for::<T>()?;
        loader.validate(&mut value.to_value())
    }

    /// Validates `value` and writes applied defaults back into it.
    pub fn validate_in_place<T: Reflect>(&self, value: &mut T) -> Result<()> {
        let loader = self.validator_for::<T>()?;
        let mut dynamic = value.to_value();
        let outcome = loader.validate(&mut dynamic);
        *value = T::from_value(dynamic)?;
        outcome
    }

    fn cached(&self, key: &str) -> Option<Arc<ValidatorLoader>> {
        if !self.config.cache_enabled {
            return None;
        }
        let hit = self.cache.get(key).map(|entry| Arc::clone(entry.value()));
        if hit.is_some() {
            trace!("Cache hit for key: {:?}", key);
        }
        hit
    }

    fn store(&self, key: String, loader: Arc<ValidatorLoader>) -> Arc<ValidatorLoader> {
        if !self.config.cache_enabled {
            return loader;
        }
        Arc::clone(self.cache.entry(key).or_insert(loader).value())
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("names", &self.names())
            .field("cached", &self.cache.len())
            .field("config", &self.config)
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`ValidatorRegistry`].
///
/// # Examples
///
/// ```rust
/// use nebula_validate::prelude::*;
///
/// let registry = ValidatorRegistry::builder()
///     .name_tag("yaml")
///     .without_caching()
///     .build();
///
/// assert_eq!(registry.config().name_tag, "yaml");
/// assert!(registry.names().contains(&"string".to_string()));
/// ```
#[must_use = "builder does nothing until .build() is called"]
pub struct RegistryBuilder {
    config: RegistryConfig,
    builtins: bool,
    factories: Vec<Arc<dyn ValidatorFactory>>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            config: RegistryConfig::default(),
            builtins: true,
            factories: Vec::new(),
        }
    }
}

impl RegistryBuilder {
    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name_tag(mut self, tag: impl Into<String>) -> Self {
        self.config.name_tag = tag.into();
        self
    }

    pub fn without_caching(mut self) -> Self {
        self.config.cache_enabled = false;
        self
    }

    /// Starts from an empty factory table.
    pub fn without_builtins(mut self) -> Self {
        self.builtins = false;
        self
    }

    /// Registers `factory` after the built-ins.
    pub fn register(mut self, factory: impl ValidatorFactory + 'static) -> Self {
        self.factories.push(Arc::new(factory));
        self
    }

    pub fn build(self) -> ValidatorRegistry {
        let registry = ValidatorRegistry {
            factories: RwLock::new(IndexMap::new()),
            cache: DashMap::new(),
            config: self.config,
        };

        if self.builtins {
            for factory in crate::validators::builtin_factories() {
                registry.register_shared(factory);
            }
        }
        for factory in self.factories {
            registry.register_shared(factory);
        }

        registry
    }
}

// ============================================================================
// COMPILE CONTEXT
// ============================================================================

/// State threaded through nested compilation.
///
/// Carries the registry, the name tag in effect for synthesized struct
/// rules, and the chain of struct types currently being compiled.
#[derive(Clone)]
pub struct CompileContext<'r> {
    registry: &'r ValidatorRegistry,
    name_tag: String,
    chain: Vec<String>,
}

impl<'r> CompileContext<'r> {
    pub fn registry(&self) -> &'r ValidatorRegistry {
        self.registry
    }

    pub fn name_tag(&self) -> &str {
        &self.name_tag
    }

    #[must_use]
    pub fn with_name_tag(mut self, tag: impl Into<String>) -> Self {
        self.name_tag = tag.into();
        self
    }

    /// Enters `ty`, failing if it is already being compiled further up.
    pub fn enter(&self, ty: &Type, rule: &Rule) -> Result<Self> {
        if self.chain.iter().any(|name| name == ty.name()) {
            return Err(ValidationError::unsupported_type_with(
                rule,
                ty.name(),
                "recursive type",
            ));
        }
        let mut next = self.clone();
        next.chain.push(ty.name().to_string());
        Ok(next)
    }

    pub fn compile(&self, rule: &str, ty: &Type) -> Result<Arc<ValidatorLoader>> {
        self.compile_inner(rule, ty, None, None)
    }

    pub fn compile_with(
        &self,
        rule: &str,
        ty: &Type,
        post: RuleProcessor<'_>,
    ) -> Result<Arc<ValidatorLoader>> {
        self.compile_inner(rule, ty, None, Some(post))
    }

    fn compile_inner(
        &self,
        text: &str,
        ty: &Type,
        error_message: Option<&str>,
        post: Option<RuleProcessor<'_>>,
    ) -> Result<Arc<ValidatorLoader>> {
        let text = text.trim();
        let synthesized = if text.is_empty() {
            self.default_rule(ty)
        } else {
            None
        };
        let text = synthesized.as_deref().unwrap_or(text);

        let rule = if text.is_empty() {
            Rule::default()
        } else {
            parse_rule(text)?
        };

        let mut typed = TypedRule::new(rule, ty.clone());
        if let Some(message) = error_message {
            typed.set_error_message(message);
        }
        if let Some(post) = post {
            post(&mut typed);
        }

        let key = typed.cache_key(&self.name_tag);
        if let Some(loader) = self.registry.cached(&key) {
            return Ok(loader);
        }

        let factory = if typed.rule().is_empty() {
            None
        } else {
            let factory = self.registry.factory(typed.name()).ok_or_else(|| {
                ValidationError::UnknownRule {
                    name: typed.name().to_string(),
                }
            })?;
            Some(factory)
        };

        let loader = Arc::new(ValidatorLoader::new(typed, factory.as_deref(), self)?);
        debug!("Compiled validator `{}` for {}", loader, ty.name());

        Ok(self.registry.store(key, loader))
    }

    /// Rule walked for an untagged composite so nested rules still apply.
    fn default_rule(&self, ty: &Type) -> Option<String> {
        if ty.is_text_through_pointers() {
            return None;
        }
        match ty.deref().kind() {
            Kind::Struct if self.name_tag == self.registry.config.name_tag => {
                Some("@struct".to_string())
            }
            Kind::Struct => Some(format!("@struct<{}>", self.name_tag)),
            Kind::Slice => Some("@slice".to_string()),
            Kind::Array => Some("@array".to_string()),
            Kind::Map => Some("@map".to_string()),
            _ => None,
        }
    }
}

impl fmt::Debug for CompileContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompileContext")
            .field("name_tag", &self.name_tag)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// TESTS
// ============================================================================
