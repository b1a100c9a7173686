//! End-to-end scenarios: rule text in, compiled validator, values out.

mod common;

use std::collections::BTreeMap;

use common::{MISSING, init_tracing, leaves, pair};
use nebula_validate::prelude::*;
use nebula_validate::reflect_struct;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn compile<T: Reflect>(rule: &str) -> std::sync::Arc<ValidatorLoader> {
    init_tracing();
    ValidatorRegistry::new()
        .compile(rule, &Type::of::<T>(), None)
        .unwrap()
}

// ============================================================================
// SCALARS
// ============================================================================

#[rstest]
#[case::inside(5, true)]
#[case::lower_edge(1, true)]
#[case::upper_edge(10, true)]
#[case::above(11, false)]
#[case::negative(-3, false)]
fn int_inclusive_range(#[case] value: i64, #[case] ok: bool) {
    let loader = compile::<i32>("@int[1,10]");
    assert_eq!(loader.validate(&mut Value::Int(value)).is_ok(), ok);
}

#[rstest]
#[case::lower_edge(1, false)]
#[case::upper_edge(10, false)]
#[case::inside(9, true)]
fn int_exclusive_range(#[case] value: i64, #[case] ok: bool) {
    let loader = compile::<i64>("@int(1,10)");
    assert_eq!(loader.validate(&mut Value::Int(value)).is_ok(), ok);
}

#[test]
fn int_violation_reports_out_of_range() {
    let loader = compile::<i32>("@int[1,10]");
    let err = loader.validate(&mut Value::Int(11)).unwrap_err();
    assert!(matches!(err, ValidationError::OutOfRange(_)));
    assert_eq!(
        err.to_string(),
        "int value should be larger or equal than 1 and less or equal than 10, but got invalid value 11"
    );
}

#[test]
fn zero_int_is_missing_unless_optional() {
    let required = compile::<i32>("@int[-5,5]");
    assert!(required.validate(&mut Value::Int(0)).unwrap_err().is_missing_required());

    let optional = compile::<i32>("@int[-5,5]?");
    assert!(optional.validate(&mut Value::Int(0)).is_ok());
}

#[test]
fn rune_count_measures_code_points() {
    let loader = compile::<String>("@string<rune_count>[1,3]");

    let three = "日本語";
    assert_eq!(three.len(), 9);
    assert!(loader.validate(&mut Value::String(three.into())).is_ok());
    assert!(loader.validate(&mut Value::String("日本語だ".into())).is_err());
}

#[test]
fn uint_multiple_of() {
    let loader = compile::<u32>("@uint{%5}");
    assert!(loader.validate(&mut Value::Uint(25)).is_ok());
    let err = loader.validate(&mut Value::Uint(26)).unwrap_err();
    assert_eq!(err.to_string(), "uint value should be multiple of 5, but got invalid value 26");
}

#[test]
fn float_bounds() {
    let loader = compile::<f64>("@float64(0,1]");
    assert!(loader.validate(&mut Value::Float(0.5)).is_ok());
    assert!(loader.validate(&mut Value::Float(1.0)).is_ok());
    assert!(loader.validate(&mut Value::Float(1.5)).is_err());
    assert!(loader.validate(&mut Value::Float(-0.5)).is_err());
}

#[test]
fn string_format() {
    let loader = compile::<String>("@email");
    assert!(loader.validate(&mut Value::String("dev@example.org".into())).is_ok());
    assert!(loader.validate(&mut Value::String("dev".into())).is_err());
}

// ============================================================================
// COLLECTIONS
// ============================================================================

fn strings(items: &[&str]) -> Value {
    Value::Seq(items.iter().map(|s| Value::String((*s).into())).collect())
}

#[rstest]
#[case::too_short(&["a"], false)]
#[case::shortest(&["a", "b"], true)]
#[case::longest(&["a", "b", "c", "d"], true)]
#[case::too_long(&["a", "b", "c", "d", "e"], false)]
#[case::bad_element(&["a", ""], false)]
fn slice_length_and_elements(#[case] items: &[&str], #[case] ok: bool) {
    let loader = compile::<Vec<String>>("@slice<@string[1,]>[2,4]");
    assert_eq!(loader.validate(&mut strings(items)).is_ok(), ok);
}

#[test]
fn slice_element_failures_are_indexed() {
    let loader = compile::<Vec<String>>("@slice<@string[1,]>");
    let err = loader.validate(&mut strings(&["", ""])).unwrap_err();
    assert_eq!(leaves(&err), vec![pair("[0]", MISSING), pair("[1]", MISSING)]);
}

#[test]
fn map_key_and_value_failures() {
    let loader = compile::<BTreeMap<String, String>>("@map<@string[2,],@string[1,]>[1,]");
    let mut value = Value::Map(vec![
        (Value::String("1".into()), Value::String(String::new())),
        (Value::String("11".into()), Value::String("x".into())),
    ]);

    let err = loader.validate(&mut value).unwrap_err();
    let mut found = leaves(&err);
    found.sort();
    assert_eq!(
        found,
        vec![
            pair("1", MISSING),
            pair(
                "1/key",
                "string length should be larger or equal than 2, but got invalid value 1"
            ),
        ]
    );
}

// ============================================================================
// STRUCTS
// ============================================================================

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Person {
        #[tag(json = "Name", validate = "@string[1,]")]
        pub name: String,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Nickname {
        #[tag(json = "Name", validate = "@string[1,]?")]
        pub name: String,
    }
}

reflect_struct! {
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Settings {
        #[tag(json = "theme", validate = "@string{light,dark} = 'light'")]
        pub theme: String,
        #[tag(json = "retries", validate = "@int[1,5]", default = "3")]
        pub retries: i32,
    }
}

#[test]
fn empty_required_field_is_one_missing_leaf() {
    let registry = ValidatorRegistry::new();
    let err = registry.validate(&Person::default()).unwrap_err();
    assert_eq!(leaves(&err), vec![pair("Name", MISSING)]);
}

#[test]
fn optional_field_accepts_empty() {
    let registry = ValidatorRegistry::new();
    assert!(registry.validate(&Nickname::default()).is_ok());
}

#[test]
fn optional_empty_fields_receive_defaults() {
    let registry = ValidatorRegistry::new();
    let mut settings = Settings::default();
    registry.validate_in_place(&mut settings).unwrap();
    assert_eq!(
        settings,
        Settings {
            theme: "light".into(),
            retries: 3,
        }
    );
}

#[test]
fn validate_leaves_the_original_untouched() {
    let registry = ValidatorRegistry::new();
    let settings = Settings::default();
    registry.validate(&settings).unwrap();
    assert_eq!(settings, Settings::default());
}
