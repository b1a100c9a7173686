//! Path-addressed aggregation of validation failures.
//!
//! Composite validators (structs, sequences, maps) run every child check and
//! append each failure to an [`ErrorSet`] under the child's [`KeyPath`].
//! Nested sets stay nested until [`ErrorSet::flatten`] inlines them.

use std::fmt;

use serde::ser::{SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};

use crate::error::ValidationError;

// ============================================================================
// KEY PATH
// ============================================================================

/// One step into a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Location of a failure, rendered as `name1.name2[idx].name3`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    /// `self` followed by every segment of `tail`.
    pub fn join(&self, tail: &KeyPath) -> KeyPath {
        let mut segments = self.0.clone();
        segments.extend(tail.0.iter().cloned());
        KeyPath(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<PathSegment> for KeyPath {
    fn from(segment: PathSegment) -> Self {
        KeyPath(vec![segment])
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        PathSegment::from(key).into()
    }
}

impl From<String> for KeyPath {
    fn from(key: String) -> Self {
        PathSegment::Key(key).into()
    }
}

impl From<usize> for KeyPath {
    fn from(index: usize) -> Self {
        PathSegment::Index(index).into()
    }
}

impl FromIterator<PathSegment> for KeyPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        KeyPath(iter.into_iter().collect())
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for KeyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ============================================================================
// FIELD ERROR
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub path: KeyPath,
    pub error: ValidationError,
}

impl FieldError {
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("FieldError", 2)?;
        state.serialize_field("field", &self.path)?;
        state.serialize_field("msg", &self.message())?;
        state.end()
    }
}

// ============================================================================
// ERROR SET
// ============================================================================

/// Ordered, append-only collection of path-tagged errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorSet {
    errors: Vec<FieldError>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: ValidationError, path: impl Into<KeyPath>) {
        self.errors.push(FieldError {
            path: path.into(),
            error,
        });
    }

    pub fn push(&mut self, entry: FieldError) {
        self.errors.push(entry);
    }

    /// Entries as added, nested sets not expanded.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of leaf errors after flattening.
    pub fn len(&self) -> usize {
        self.errors
            .iter()
            .map(|entry| match &entry.error {
                ValidationError::Set(nested) => nested.len(),
                _ => 1,
            })
            .sum()
    }

    /// Expands nested sets recursively, prefixing each inner path with the
    /// path the nested set was recorded under.
    pub fn flatten(&self) -> ErrorSet {
        let mut flat = ErrorSet::new();
        self.flatten_into(&KeyPath::new(), &mut flat);
        flat
    }

    fn flatten_into(&self, prefix: &KeyPath, out: &mut ErrorSet) {
        for entry in &self.errors {
            let path = prefix.join(&entry.path);
            match &entry.error {
                ValidationError::Set(nested) => nested.flatten_into(&path, out),
                error => out.push(FieldError {
                    path,
                    error: error.clone(),
                }),
            }
        }
    }

    /// `Ok(())` when empty, otherwise the set as a [`ValidationError::Set`].
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Set(self))
        }
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl IntoIterator for ErrorSet {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.flatten() {
            if entry.path.is_empty() {
                writeln!(f, "{}", entry.error)?;
            } else {
                writeln!(f, "{} {}", entry.path, entry.error)?;
            }
        }
        Ok(())
    }
}

impl Serialize for ErrorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flat = self.flatten();
        let mut seq = serializer.serialize_seq(Some(flat.errors.len()))?;
        for entry in &flat {
            seq.serialize_element(entry)?;
        }
        seq.end()
    }
}

// ============================================================================
// TESTS
// ============================================================================
