//! CLI-specific error types
//!
//! Library errors keep their own code strings; the CLI only adds codes for
//! its own I/O failures.

use std::fmt;
use std::io;

use crate::aggs::{DecodeError, ManifestError};
use crate::config::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Input file unreadable or not JSON
    InputError,
    /// stdout failure
    IoError,
    /// Configuration file error
    ConfigError,
    /// Manifest or request document malformed
    ManifestError,
    /// Decoding failed
    DecodeError(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::InputError => "AGGS_CLI_INPUT_ERROR",
            Self::IoError => "AGGS_CLI_IO_ERROR",
            Self::ConfigError => "AGGS_CONFIG_INVALID",
            Self::ManifestError => "AGGS_MANIFEST_INVALID",
            Self::DecodeError(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Input file error
    pub fn input_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InputError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Get the error code
    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<DecodeError> for CliError {
    fn from(e: DecodeError) -> Self {
        Self::new(CliErrorCode::DecodeError(e.code().code()), e.to_string())
    }
}

impl From<ManifestError> for CliError {
    fn from(e: ManifestError) -> Self {
        Self::new(CliErrorCode::ManifestError, e.to_string())
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_keeps_its_code() {
        let err: CliError = DecodeError::unsupported_kind("aggregations.x", "bogus").into();
        assert_eq!(err.code_str(), "AGGS_UNSUPPORTED_KIND");
        assert!(err.message().contains("bogus"));
    }

    #[test]
    fn test_display_prefixes_code() {
        let err = CliError::input_error("missing file");
        assert_eq!(err.to_string(), "AGGS_CLI_INPUT_ERROR: missing file");
    }

    #[test]
    fn test_config_error_code() {
        let err: CliError = ConfigError::Invalid("max_depth must be > 0".into()).into();
        assert_eq!(err.code(), CliErrorCode::ConfigError);
    }
}
