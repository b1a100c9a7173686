//! Property-based tests for the rule scanner.

use nebula_rule::{parse_rule, quote};
use proptest::prelude::*;

// ============================================================================
// GENERATORS
// ============================================================================

fn range_text() -> impl Strategy<Value = String> {
    (
        prop::bool::ANY,
        prop::collection::vec("-?[0-9]{0,3}", 1..=2),
        prop::bool::ANY,
    )
        .prop_map(|(left, bounds, right)| {
            format!(
                "{}{}{}",
                if left { "(" } else { "[" },
                bounds.join(", "),
                if right { ")" } else { "]" }
            )
        })
}

fn values_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Za-z0-9%]{0,3}", 1..4).prop_map(|v| format!("{{{}}}", v.join(",")))
}

fn pattern_text() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["^\\w+$", "a/b", "[0-9]{2}", "x|y", "\\d+\\.\\d*"])
        .prop_map(|p| format!("/{}/", quote::slash(p)))
}

fn optional_text() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("?".to_string()),
        "[a-z' \\\\]{0,4}".prop_map(|d| format!(" = {}", quote::single_quote(&d))),
        "[a-z0-9]{1,4}".prop_map(|d| format!(" = {d}")),
    ]
}

fn rule_text() -> impl Strategy<Value = String> {
    let leaf = ("[a-z]{1,6}", optional_text()).prop_map(|(name, opt)| format!("@{name}{opt}"));

    leaf.prop_recursive(3, 24, 3, |inner| {
        let param = prop_oneof![
            Just(String::new()),
            "[a-z0-9]{1,4}".prop_map(|s| s),
            inner,
        ];
        (
            "[a-z]{1,6}",
            prop::collection::vec(param, 0..3),
            prop::option::of(prop_oneof![range_text(), values_text(), pattern_text()]),
            optional_text(),
        )
            .prop_map(|(name, params, tail, opt)| {
                let mut text = format!("@{name}");
                if !params.is_empty() {
                    text.push('<');
                    text.push_str(&params.join(","));
                    text.push('>');
                }
                text.push_str(&tail.unwrap_or_default());
                text.push_str(&opt);
                text
            })
    })
}

// ============================================================================
// ROUND-TRIP
// ============================================================================

proptest! {
    #[test]
    fn canonical_form_reparses_to_same_rule(text in rule_text()) {
        let rule = parse_rule(&text).unwrap();
        let canonical = rule.to_string();
        let reparsed = parse_rule(&canonical).unwrap();
        prop_assert_eq!(&reparsed, &rule);
        prop_assert_eq!(reparsed.to_string(), canonical);
    }

    #[test]
    fn scanner_never_panics(text in "[@a-z0-9<>\\[\\](){},?=% /'\\\\]{0,24}") {
        if let Ok(rule) = parse_rule(&text) {
            let reparsed = parse_rule(&rule.to_string()).unwrap();
            prop_assert_eq!(reparsed, rule);
        }
    }

    #[test]
    fn syntax_error_offset_is_inside_input(text in "[@a-z<>\\[\\]{},]{0,16}") {
        if let Err(err) = parse_rule(&text) {
            prop_assert!(err.offset <= text.len());
            prop_assert_eq!(&text[err.offset..], err.fragment.as_str());
        }
    }
}
