//! Decode error types
//!
//! Error codes:
//! - AGGS_STRUCTURAL_MISMATCH (manifest and response disagree)
//! - AGGS_TYPE_MISMATCH (JSON value has the wrong shape)
//! - AGGS_UNSUPPORTED_KIND (manifest names a kind with no decoding rule)
//! - AGGS_DEPTH_EXCEEDED (nesting deeper than the configured bound)
//!
//! All decode errors abort the whole decode. No partial collection is returned.

use std::fmt;

use thiserror::Error;

/// Stable classification of a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorCode {
    /// Manifest declares something the response lacks, or vice versa
    StructuralMismatch,
    /// A value is not of the expected JSON shape
    TypeMismatch,
    /// Unrecognized aggregation kind tag
    UnsupportedKind,
    /// Aggregation nesting exceeds the configured limit
    DepthExceeded,
}

impl DecodeErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            DecodeErrorCode::StructuralMismatch => "AGGS_STRUCTURAL_MISMATCH",
            DecodeErrorCode::TypeMismatch => "AGGS_TYPE_MISMATCH",
            DecodeErrorCode::UnsupportedKind => "AGGS_UNSUPPORTED_KIND",
            DecodeErrorCode::DepthExceeded => "AGGS_DEPTH_EXCEEDED",
        }
    }
}

impl fmt::Display for DecodeErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure while decoding an aggregation response.
///
/// Every variant carries the JSON path (e.g. `aggregations.colors.buckets[1].avg_price`)
/// at which decoding stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("AGGS_STRUCTURAL_MISMATCH at '{path}': {reason}")]
    StructuralMismatch { path: String, reason: String },

    #[error("AGGS_TYPE_MISMATCH at '{path}': expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("AGGS_UNSUPPORTED_KIND at '{path}': unrecognized aggregation kind '{kind}'")]
    UnsupportedKind { path: String, kind: String },

    #[error("AGGS_DEPTH_EXCEEDED at '{path}': nesting deeper than {limit}")]
    DepthExceeded { path: String, limit: usize },
}

impl DecodeError {
    /// Manifest entry has no counterpart in the response.
    pub fn missing_aggregation(path: impl Into<String>, name: &str) -> Self {
        DecodeError::StructuralMismatch {
            path: path.into(),
            reason: format!("aggregation '{}' declared in manifest but absent from response", name),
        }
    }

    /// Response carries aggregations that no manifest describes.
    pub fn unexpected_aggregations(path: impl Into<String>, count: usize) -> Self {
        DecodeError::StructuralMismatch {
            path: path.into(),
            reason: format!("{} aggregation(s) present but no manifest was supplied", count),
        }
    }

    /// A field the decoding rule cannot do without is absent.
    pub fn missing_field(path: impl Into<String>, field: &str) -> Self {
        DecodeError::StructuralMismatch {
            path: path.into(),
            reason: format!("required field '{}' is missing", field),
        }
    }

    pub fn type_mismatch(path: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        DecodeError::TypeMismatch {
            path: path.into(),
            expected,
            actual,
        }
    }

    pub fn unsupported_kind(path: impl Into<String>, kind: impl Into<String>) -> Self {
        DecodeError::UnsupportedKind {
            path: path.into(),
            kind: kind.into(),
        }
    }

    pub fn depth_exceeded(path: impl Into<String>, limit: usize) -> Self {
        DecodeError::DepthExceeded {
            path: path.into(),
            limit,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> DecodeErrorCode {
        match self {
            DecodeError::StructuralMismatch { .. } => DecodeErrorCode::StructuralMismatch,
            DecodeError::TypeMismatch { .. } => DecodeErrorCode::TypeMismatch,
            DecodeError::UnsupportedKind { .. } => DecodeErrorCode::UnsupportedKind,
            DecodeError::DepthExceeded { .. } => DecodeErrorCode::DepthExceeded,
        }
    }

    /// Returns the JSON path where decoding failed
    pub fn path(&self) -> &str {
        match self {
            DecodeError::StructuralMismatch { path, .. }
            | DecodeError::TypeMismatch { path, .. }
            | DecodeError::UnsupportedKind { path, .. }
            | DecodeError::DepthExceeded { path, .. } => path,
        }
    }
}

/// Result type for decode operations
pub type DecodeResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(DecodeErrorCode::StructuralMismatch.code(), "AGGS_STRUCTURAL_MISMATCH");
        assert_eq!(DecodeErrorCode::TypeMismatch.code(), "AGGS_TYPE_MISMATCH");
        assert_eq!(DecodeErrorCode::UnsupportedKind.code(), "AGGS_UNSUPPORTED_KIND");
        assert_eq!(DecodeErrorCode::DepthExceeded.code(), "AGGS_DEPTH_EXCEEDED");
    }

    #[test]
    fn test_error_display_includes_code_and_path() {
        let err = DecodeError::missing_aggregation("aggregations", "price_stats");
        let display = err.to_string();
        assert!(display.starts_with("AGGS_STRUCTURAL_MISMATCH"));
        assert!(display.contains("price_stats"));
        assert_eq!(err.path(), "aggregations");
    }

    #[test]
    fn test_type_mismatch_details() {
        let err = DecodeError::type_mismatch("aggregations.x", "object", "array");
        assert_eq!(err.code(), DecodeErrorCode::TypeMismatch);
        assert!(err.to_string().contains("expected object, got array"));
    }

    #[test]
    fn test_unsupported_kind_names_the_tag() {
        let err = DecodeError::unsupported_kind("aggregations.x", "bogus_kind");
        assert_eq!(err.code().code(), "AGGS_UNSUPPORTED_KIND");
        assert!(err.to_string().contains("bogus_kind"));
    }
}
