//! Error types for the coach gateway.
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Error context and chaining
//! - Exit codes for CLI

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Request validation errors (4xx)
    MissingField = 400,
    InvalidField = 401,

    // Orchestrator errors (5xx)
    OrchestratorUnavailable = 500,
    OrchestratorFailed = 501,
    OrchestratorMalformed = 502,

    // Internal errors (9xx)
    InternalError = 900,
    NotImplemented = 901,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10, // Config errors
            200..=299 => 20, // IO errors
            400..=499 => 40, // Validation errors
            500..=599 => 50, // Orchestrator errors
            900..=999 => 90, // Internal errors
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the gateway
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Request Validation Errors
    // ─────────────────────────────────────────────────────────────

    /// A required request field was missing or empty
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    /// A request field carried an unusable value
    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Orchestrator Errors
    // ─────────────────────────────────────────────────────────────

    /// Orchestrator could not be reached
    #[error("Orchestrator unreachable at {url}: {message}")]
    OrchestratorUnavailable { url: String, message: String },

    /// Orchestrator rejected or failed the delegated operation
    #[error("Orchestrator {operation} failed: {message}")]
    OrchestratorFailed { operation: &'static str, message: String },

    /// Orchestrator returned a payload the gateway could not decode
    #[error("Orchestrator {operation} returned a malformed response: {message}")]
    OrchestratorMalformed { operation: &'static str, message: String },

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Feature not implemented
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    // ─────────────────────────────────────────────────────────────
    // Error Classification
    // ─────────────────────────────────────────────────────────────

    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { .. } => ErrorCode::IoRead,
            Error::IoWrite { .. } => ErrorCode::IoWrite,
            Error::Io(e) => match e.kind() {
                std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
                std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
                _ => ErrorCode::IoRead,
            },
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::MissingField { .. } => ErrorCode::MissingField,
            Error::InvalidField { .. } => ErrorCode::InvalidField,

            Error::OrchestratorUnavailable { .. } => ErrorCode::OrchestratorUnavailable,
            Error::OrchestratorFailed { .. } => ErrorCode::OrchestratorFailed,
            Error::OrchestratorMalformed { .. } => ErrorCode::OrchestratorMalformed,

            Error::NotImplemented(_) => ErrorCode::NotImplemented,
            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Check if the error is a client-side request problem
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MissingField { .. } | Error::InvalidField { .. })
    }

    /// Check if the error is fatal (process should exit)
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ConfigNotFound { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigValidation { .. }
                | Error::Config(_)
                | Error::Internal(_)
        )
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    // ─────────────────────────────────────────────────────────────
    // User-Friendly Messages
    // ─────────────────────────────────────────────────────────────

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'coach-gateway config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'coach-gateway config validate' to see details."
            ),
            Error::ConfigValidation { .. } | Error::Config(_) => Some(
                "Review the configuration file and fix the invalid values. See documentation for valid options."
            ),

            Error::OrchestratorUnavailable { .. } => Some(
                "Check that the orchestrator service is running and [orchestrator] base_url is correct."
            ),
            Error::OrchestratorMalformed { .. } => Some(
                "The orchestrator and gateway versions may be out of sync. Check both deployments."
            ),

            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let code = self.code();
        let suggestion = self.suggestion();

        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            code.as_str(),
            self
        );

        if let Some(hint) = suggestion {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        let code = self.code();
        format!("[{}] {}", code.as_str(), self)
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors (for ergonomic error creation)
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a config parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Error::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a config validation error
    pub fn config_validation(message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: None,
        }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a missing-field validation error
    pub fn missing_field(field: &'static str) -> Self {
        Error::MissingField { field }
    }

    /// Create an orchestrator-unavailable error
    pub fn orchestrator_unavailable(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::OrchestratorUnavailable {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an orchestrator-failed error
    pub fn orchestrator_failed(operation: &'static str, message: impl Into<String>) -> Self {
        Error::OrchestratorFailed {
            operation,
            message: message.into(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::MissingField.as_str(), "E400");
        assert_eq!(ErrorCode::OrchestratorUnavailable.as_str(), "E500");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::MissingField.exit_code(), 40);
        assert_eq!(ErrorCode::OrchestratorFailed.exit_code(), 50);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_error_display() {
        let err = Error::ConfigNotFound {
            path: PathBuf::from("/path/to/gateway.toml"),
            source: None,
        };
        assert!(err.to_string().contains("/path/to/gateway.toml"));
    }

    #[test]
    fn test_error_codes() {
        let err = Error::config_not_found("/test");
        assert_eq!(err.code(), ErrorCode::ConfigNotFound);

        let err = Error::missing_field("message");
        assert_eq!(err.code(), ErrorCode::MissingField);

        let err = Error::orchestrator_unavailable("http://test", "refused");
        assert_eq!(err.code(), ErrorCode::OrchestratorUnavailable);
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::missing_field("user_id").is_client_error());
        assert!(!Error::orchestrator_failed("process_message", "boom").is_client_error());
        assert!(!Error::config_not_found("/test").is_client_error());
    }

    #[test]
    fn test_error_fatal() {
        assert!(Error::config_not_found("/test").is_fatal());
        assert!(Error::config_parse("bad toml").is_fatal());
        assert!(!Error::missing_field("message").is_fatal());
        assert!(!Error::orchestrator_failed("readiness", "boom").is_fatal());
    }

    #[test]
    fn test_error_suggestions() {
        let err = Error::config_not_found("/test");
        assert!(err.suggestion().is_some());
        assert!(err.suggestion().unwrap().contains("config init"));

        let err = Error::orchestrator_unavailable("http://test", "refused");
        assert!(err.suggestion().is_some());
        assert!(err.suggestion().unwrap().contains("base_url"));
    }

    #[test]
    fn test_format_for_terminal() {
        let err = Error::config_not_found("/test/gateway.toml");
        let formatted = err.format_for_terminal();

        // Should contain error code
        assert!(formatted.contains("E100"));
        // Should contain ANSI color codes
        assert!(formatted.contains("\x1b[31m"));
        // Should contain hint
        assert!(formatted.contains("Hint"));
    }

    #[test]
    fn test_format_for_log() {
        let err = Error::config_not_found("/test/gateway.toml");
        let formatted = err.format_for_log();

        // Should contain error code
        assert!(formatted.contains("[E100]"));
        // Should NOT contain ANSI codes
        assert!(!formatted.contains("\x1b["));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        assert_eq!(err.code(), ErrorCode::IoNotFound);
    }
}
