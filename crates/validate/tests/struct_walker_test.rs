//! Struct walking through `reflect_struct!` types.

mod common;

use std::collections::HashMap;

use common::{MISSING, init_tracing, leaves, pair};
use nebula_validate::prelude::*;
use nebula_validate::{reflect_struct, reflect_text};
use pretty_assertions::assert_eq;

// ============================================================================
// FIXTURES
// ============================================================================

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Audit {
        #[tag(json = "createdBy", validate = "@string[1,]")]
        pub created_by: String,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Label {
        #[tag(json = "key", validate = "@string[1,16]")]
        pub key: String,
        #[tag(json = "value,omitempty", validate = "@string[,64]")]
        pub value: String,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Project {
        #[tag(embedded)]
        pub audit: Audit,
        #[tag(json = "name", validate = "@string[3,]")]
        pub name: String,
        #[tag(json = "labels")]
        pub labels: Vec<Label>,
        #[tag(json = "owner,omitempty")]
        pub owner: Option<Label>,
        #[tag(json = "quota,omitempty", validate = "@uint[1,100]", default = "10")]
        pub quota: u32,
        #[tag(json = "-", validate = "@string[1,]")]
        pub skipped: String,
        internal: String,
    }
}

fn valid_project() -> Project {
    Project {
        audit: Audit {
            created_by: "ci".into(),
        },
        name: "nebula".into(),
        labels: vec![Label {
            key: "tier".into(),
            value: String::new(),
        }],
        owner: None,
        quota: 5,
        skipped: String::new(),
        internal: String::new(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn valid_value_passes() {
    init_tracing();
    let registry = ValidatorRegistry::new();
    registry.validate(&valid_project()).unwrap();
}

#[test]
fn nested_failures_carry_full_paths() {
    let registry = ValidatorRegistry::new();
    let mut project = valid_project();
    project.audit.created_by.clear();
    project.name = "ab".into();
    project.labels.push(Label::default());
    project.owner = Some(Label {
        key: "x".repeat(17),
        value: String::new(),
    });

    let err = registry.validate(&project).unwrap_err();
    assert_eq!(
        leaves(&err),
        vec![
            pair("createdBy", MISSING),
            pair(
                "name",
                "string length should be larger or equal than 3, but got invalid value 2"
            ),
            pair("labels[1].key", MISSING),
            pair(
                "owner.key",
                "string length should be larger or equal than 1 and less or equal than 16, but got invalid value 17"
            ),
        ]
    );
}

#[test]
fn untagged_slice_field_is_required() {
    let registry = ValidatorRegistry::new();
    let mut project = valid_project();
    project.labels.clear();

    let err = registry.validate(&project).unwrap_err();
    assert_eq!(leaves(&err), vec![pair("labels", MISSING)]);
}

#[test]
fn default_is_written_back() {
    let registry = ValidatorRegistry::new();
    let mut project = valid_project();
    project.quota = 0;

    registry.validate_in_place(&mut project).unwrap();
    assert_eq!(project.quota, 10);
}

#[test]
fn error_set_serializes_as_field_messages() {
    let registry = ValidatorRegistry::new();
    let mut project = valid_project();
    project.name.clear();

    let err = registry.validate(&project).unwrap_err();
    let json = serde_json::to_value(err.as_set().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{ "field": "name", "msg": "missing required field" }])
    );
}

#[test]
fn struct_validator_text() {
    let registry = ValidatorRegistry::new();
    let loader = registry.validator_for::<Project>().unwrap();
    assert_eq!(loader.to_string(), "@struct<json>");
}

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Channel {
        #[tag(json = "jsonName", yaml = "yamlName", validate = "@string[1,]")]
        pub name: String,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Feed {
        #[tag(json = "jsonChannel", yaml = "yamlChannel", validate = "@struct")]
        pub channel: Channel,
    }
}

#[test]
fn nested_struct_rule_inherits_name_tag() {
    let registry = ValidatorRegistry::new();
    let mut value = Feed::default().to_value();

    let yaml = registry.compile("@struct<yaml>", &Feed::type_info(), None).unwrap();
    let err = yaml.validate(&mut value.clone()).unwrap_err();
    assert_eq!(leaves(&err), vec![pair("yamlChannel.yamlName", MISSING)]);

    let json = registry.validator_for::<Feed>().unwrap();
    let err = json.validate(&mut value).unwrap_err();
    assert_eq!(leaves(&err), vec![pair("jsonChannel.jsonName", MISSING)]);
}

// ============================================================================
// TEXT TYPES AND MAPS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Semver(String);

impl std::fmt::Display for Semver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Semver {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() == 3 && parts.iter().all(|p| p.parse::<u32>().is_ok()) {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("`{s}` is not a semantic version"))
        }
    }
}

reflect_text!(Semver);

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Release {
        #[tag(json = "version", validate = "@string/^1\\./ = '1.0.0'")]
        pub version: Semver,
        #[tag(json = "assets", validate = "@map<@string[1,],@string<rune_count>[1,8]>[,2]")]
        pub assets: HashMap<String, String>,
    }
}

#[test]
fn text_types_validate_as_strings() {
    let registry = ValidatorRegistry::new();
    let mut release = Release {
        version: Semver(String::new()),
        assets: HashMap::from([("linux".to_string(), "tar".to_string())]),
    };
    registry.validate_in_place(&mut release).unwrap();
    assert_eq!(release.version, Semver("1.0.0".into()));

    release.version = Semver("2.0.0".into());
    let err = registry.validate(&release).unwrap_err();
    assert_eq!(leaves(&err), vec![pair("version", "string value ^1\\. not match 2.0.0")]);
}

#[test]
fn map_value_paths_use_keys() {
    let registry = ValidatorRegistry::new();
    let release = Release {
        version: Semver("1.2.3".into()),
        assets: HashMap::from([("linux".to_string(), "compressed".to_string())]),
    };
    let err = registry.validate(&release).unwrap_err();
    assert_eq!(
        leaves(&err),
        vec![pair(
            "assets.linux",
            "string length should be larger or equal than 1 and less or equal than 8, but got invalid value 10"
        )]
    );
}

#[test]
fn invalid_default_fails_compilation() {
    reflect_struct! {
        #[derive(Debug, Default)]
        pub struct Broken {
            #[tag(json = "level", validate = "@int[1,3]", default = "9")]
            pub level: i32,
        }
    }

    let registry = ValidatorRegistry::new();
    let err = registry.validator_for::<Broken>().unwrap_err();
    let set = err.as_set().unwrap();
    let entry = set.iter().next().unwrap();
    assert_eq!(entry.path.to_string(), "level");
    assert!(matches!(entry.error, ValidationError::InvalidDefault { .. }));
}
