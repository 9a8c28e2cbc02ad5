//! Error types for classort.
//!
//! This module provides the crate-wide error type (`ClassortError`) plus the
//! narrower errors produced by individual subsystems:
//!
//! - [`PatternError`]: a `/pattern/flags` literal that cannot be compiled.
//!   Never escapes the matcher; the rule degrades to never-matching.
//! - [`OracleError`]: the ranking oracle could not answer. Never escapes the
//!   ranking adapter; every token degrades to an unknown rank.
//!
//! ## Design
//!
//! Only caller bugs surface as `ClassortError`: malformed change sets handed to
//! the splicer and invalid option blobs. Foreign content inside a token list
//! (interpolation markers) is not an error at all; it is returned unchanged.

use thiserror::Error;

use crate::patch::Span;

/// Unified error type for classort operations.
#[derive(Debug, Error)]
pub enum ClassortError {
    /// A change range reaches past the end of the buffer.
    #[error("change {span} is out of bounds for buffer of length {len}")]
    ChangeOutOfBounds { span: Span, len: usize },

    /// A change boundary splits a UTF-8 character.
    #[error("change {span} does not fall on a char boundary (line {line}, col {col})")]
    ChangeNotOnCharBoundary { span: Span, line: u32, col: u32 },

    /// The `before` text of a change does not match the buffer.
    #[error("change {span} expected {expected:?} but buffer has {actual:?} (line {line}, col {col})")]
    ChangeMismatch {
        span: Span,
        expected: String,
        actual: String,
        line: u32,
        col: u32,
    },

    /// Two changes partially overlap (neither disjoint nor nested).
    #[error("changes {first} and {second} partially overlap")]
    OverlappingChanges { first: Span, second: Span },

    /// Option blob could not be parsed.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },

    /// Ranking oracle failure that could not be degraded.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl From<serde_json::Error> for ClassortError {
    fn from(err: serde_json::Error) -> Self {
        ClassortError::InvalidOptions {
            message: err.to_string(),
        }
    }
}

/// Result alias for classort operations.
pub type Result<T> = std::result::Result<T, ClassortError>;

/// Error compiling a `/pattern/flags` literal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PatternError {
    /// The regex body failed to compile.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },

    /// An unsupported flag character follows the closing slash.
    #[error("unsupported flag '{flag}' in pattern '{pattern}'")]
    UnsupportedFlag { pattern: String, flag: char },
}

/// Error reported by a ranking oracle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// The oracle has no ranking context loaded.
    #[error("ranking context unavailable: {message}")]
    Unavailable { message: String },

    /// The oracle rejected the request.
    #[error("ranking oracle rejected request: {message}")]
    Rejected { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_changes_message_names_both_spans() {
        let err = ClassortError::OverlappingChanges {
            first: Span::new(2, 6),
            second: Span::new(4, 9),
        };
        assert_eq!(err.to_string(), "changes [2, 6) and [4, 9) partially overlap");
    }

    #[test]
    fn serde_error_becomes_invalid_options() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ClassortError = parse_err.into();
        assert!(matches!(err, ClassortError::InvalidOptions { .. }));
    }

    #[test]
    fn oracle_error_is_transparent() {
        let err: ClassortError = OracleError::Unavailable {
            message: "no config".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "ranking context unavailable: no config");
    }
}
