//! Syntax errors raised while scanning rule text.

/// A malformed rule.
///
/// `offset` is the byte offset in the source where scanning stopped and
/// `fragment` is the unconsumed input from that point on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid syntax: {message} at offset {offset}, near `{fragment}`")]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
    pub fragment: String,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        Self {
            message: message.into(),
            offset,
            fragment: source.get(offset..).unwrap_or_default().to_string(),
        }
    }

    /// An error that is not tied to a scanner position.
    pub fn detached(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            offset: 0,
            fragment: String::new(),
        }
    }
}

pub type Result<T, E = SyntaxError> = std::result::Result<T, E>;
