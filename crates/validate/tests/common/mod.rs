//! Shared helpers for integration tests.

#![allow(dead_code)]

use nebula_validate::prelude::*;

/// Routes `tracing` output to the test harness; safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Flattened `(path, message)` pairs of a failed validation.
pub fn leaves(err: &ValidationError) -> Vec<(String, String)> {
    match err.as_set() {
        Some(set) => set
            .flatten()
            .iter()
            .map(|e| (e.path.to_string(), e.message()))
            .collect(),
        None => vec![(String::new(), err.to_string())],
    }
}

pub fn pair(path: &str, message: &str) -> (String, String) {
    (path.to_string(), message.to_string())
}

pub const MISSING: &str = "missing required field";
