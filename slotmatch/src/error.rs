//! Error types for slot matching.

use thiserror::Error;

/// Errors raised by sequences, rule construction and value extraction.
///
/// A rule that simply does not fit a token is not an error: matching reports
/// that as `Ok(false)`, and an unsatisfied rule set yields no alignments.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    /// Index outside `[0, count)`.
    #[error("index {index} out of range for sequence of length {count}")]
    OutOfRange { index: usize, count: usize },

    /// `head()` on an empty sequence.
    #[error("empty collection")]
    EmptyCollection,

    /// Rule string does not follow `[text][type][->variable]`.
    #[error("malformed rule syntax: {0:?}")]
    MalformedRuleSyntax(String),

    /// Token text cannot be coerced into the value shape of the rule category.
    #[error("type mismatch: cannot read {text:?} as {category}")]
    TypeMismatch { category: String, text: String },

    /// Lexicon data could not be loaded.
    #[error("lexicon error: {0}")]
    Lexicon(String),
}

impl MatchError {
    /// Returns true for errors raised while extracting a matched value.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, MatchError::TypeMismatch { .. })
    }
}

/// Result type for slot matching operations.
pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = MatchError::OutOfRange { index: 5, count: 3 };
        assert_eq!(err.to_string(), "index 5 out of range for sequence of length 3");

        let err = MatchError::MalformedRuleSyntax("check noun".to_string());
        assert_eq!(err.to_string(), "malformed rule syntax: \"check noun\"");

        let err = MatchError::TypeMismatch {
            category: "number".to_string(),
            text: "lots".to_string(),
        };
        assert!(err.is_type_mismatch());
        assert_eq!(err.to_string(), "type mismatch: cannot read \"lots\" as number");
    }
}
