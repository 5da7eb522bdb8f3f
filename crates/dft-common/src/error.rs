//! Error types for transform config handling.
//!
//! Every error aborts the whole decode: there is no partially built config.
//! Errors carry:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Remediation hints for humans
//!
//! # Agent-Facing Output
//!
//! Errors serialize to structured JSON:
//! ```json
//! {
//!   "code": 20,
//!   "category": "forbidden_field",
//!   "message": "Found [headers], not allowed for strict parsing",
//!   "recoverable": false,
//!   "suggested_action": "remove_field",
//!   "context": { "field": "headers" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for transform config operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Payload does not match the expected schema.
    MalformedInput,
    /// External payload tried to set a server-owned field.
    ForbiddenField,
    /// Body id disagrees with the caller-supplied id.
    IdConflict,
    /// A value violates a field-level or sub-config invariant.
    Validation,
    /// File I/O errors (CLI only).
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::MalformedInput => write!(f, "malformed_input"),
            ErrorCategory::ForbiddenField => write!(f, "forbidden_field"),
            ErrorCategory::IdConflict => write!(f, "id_conflict"),
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Suggested actions for callers to take in response to errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    /// Fix the request body and resend it.
    FixRequest,
    /// Drop the offending field from the request body.
    RemoveField,
    /// Make the body id and the URL id agree (or drop one).
    ReconcileId,
    /// Retry the operation.
    Retry,
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestedAction::FixRequest => write!(f, "fix_request"),
            SuggestedAction::RemoveField => write!(f, "remove_field"),
            SuggestedAction::ReconcileId => write!(f, "reconcile_id"),
            SuggestedAction::Retry => write!(f, "retry"),
        }
    }
}

/// Unified error type for transform config handling.
#[derive(Error, Debug)]
pub enum Error {
    // Malformed input (10-19)
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("[id] must not be null")]
    MissingId,

    // Trust boundary (20-29)
    #[error("Found [{field}], not allowed for strict parsing")]
    ForbiddenField { field: String },

    // Identity (30-39)
    #[error("Inconsistent id; '{body_id}' specified in the body differs from '{external_id}' specified as a URL argument")]
    IdConflict {
        body_id: String,
        external_id: String,
    },

    // Validation (40-49)
    #[error("{0}")]
    Validation(String),

    // I/O (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedInput(err.to_string())
    }
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Malformed input
    /// - 20-29: Forbidden fields
    /// - 30-39: Identity conflicts
    /// - 40-49: Validation failures
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::MalformedInput(_) => 10,
            Error::MissingId => 11,
            Error::ForbiddenField { .. } => 20,
            Error::IdConflict { .. } => 30,
            Error::Validation(_) => 40,
            Error::Io(_) => 60,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::MalformedInput(_) | Error::MissingId => ErrorCategory::MalformedInput,
            Error::ForbiddenField { .. } => ErrorCategory::ForbiddenField,
            Error::IdConflict { .. } => ErrorCategory::IdConflict,
            Error::Validation(_) => ErrorCategory::Validation,
            Error::Io(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether retrying the same call could succeed.
    ///
    /// Input defects are never recoverable; only transient I/O is.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Io(_))
    }

    /// Returns the suggested action for callers.
    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            Error::MalformedInput(_) | Error::MissingId | Error::Validation(_) => {
                SuggestedAction::FixRequest
            }
            Error::ForbiddenField { .. } => SuggestedAction::RemoveField,
            Error::IdConflict { .. } => SuggestedAction::ReconcileId,
            Error::Io(_) => SuggestedAction::Retry,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::MalformedInput(_) => {
                "Check the body against the transform config schema: source, dest and pivot are required."
            }
            Error::MissingId => "Supply the transform id either in the body or as a URL argument.",
            Error::ForbiddenField { .. } => {
                "headers, create_time and version are set by the server. Remove them from the request."
            }
            Error::IdConflict { .. } => {
                "Use the same id in the body and the URL, or omit the id from the body."
            }
            Error::Validation(_) => "Fix the reported field and resend the request.",
            Error::Io(_) => "Check that the input file exists and is readable, then retry.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::MalformedInput(_) => "Malformed Transform Config",
            Error::MissingId => "Missing Transform Id",
            Error::ForbiddenField { .. } => "Server-Owned Field Rejected",
            Error::IdConflict { .. } => "Inconsistent Transform Id",
            Error::Validation(_) => "Validation Failed",
            Error::Io(_) => "I/O Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Suggested action for callers.
    pub suggested_action: SuggestedAction,

    /// Additional structured context (e.g., offending field).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for StructuredError {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::ForbiddenField { field } => {
                context.insert("field".to_string(), serde_json::json!(field));
            }
            Error::IdConflict {
                body_id,
                external_id,
            } => {
                context.insert("body_id".to_string(), serde_json::json!(body_id));
                context.insert("external_id".to_string(), serde_json::json!(external_id));
            }
            _ => {}
        }

        StructuredError {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            suggested_action: err.suggested_action(),
            context,
        }
    }
}

impl StructuredError {
    /// Add additional context to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.context.insert(key.into(), v);
        }
        self
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }

    /// Serialize to pretty JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}
