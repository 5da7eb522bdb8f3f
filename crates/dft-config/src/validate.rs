//! Validation errors and field-level validators.

use dft_common::Error;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Maximum description length, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Field-level and sub-config validation errors.
///
/// Messages use the `[field] reason` shape callers see verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("[{0}] must not be null")]
    MissingField(String),

    #[error("[{field}] {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidValue`].
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::MissingField(_) => 41,
            ValidationError::InvalidValue { .. } => 42,
        }
    }

    /// Dotted path of the offending field.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField(field) | ValidationError::InvalidValue { field, .. } => {
                Some(field)
            }
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err.to_string())
    }
}

/// Validate the optional description length.
pub fn validate_description(description: Option<&str>) -> ValidationResult<()> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => {
            Err(ValidationError::invalid(
                "description",
                format!(
                    "must be less than {} characters in length.",
                    MAX_DESCRIPTION_LENGTH
                ),
            ))
        }
        _ => Ok(()),
    }
}

static VERSION_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Validate the server-owned producing-system version.
pub fn validate_version(version: Option<&str>) -> ValidationResult<()> {
    let Some(version) = version else {
        return Ok(());
    };
    let pattern = VERSION_PATTERN.get_or_init(|| {
        Regex::new(r"^\d+\.\d+\.\d+(?:-[A-Za-z0-9.]+)?$").expect("static version pattern compiles")
    });
    if pattern.is_match(version) {
        Ok(())
    } else {
        Err(ValidationError::invalid(
            "version",
            format!(
                "must be a version of the form MAJOR.MINOR.PATCH, got [{}]",
                version
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_description_boundary() {
        let at_limit = "a".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(validate_description(Some(&at_limit)).is_ok());

        let over = "a".repeat(MAX_DESCRIPTION_LENGTH + 1);
        let err = validate_description(Some(&over)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "[description] must be less than 1000 characters in length."
        );
        assert_eq!(err.field(), Some("description"));
        assert!(validate_description(None).is_ok());
    }

    #[test]
    fn test_description_counts_chars_not_bytes() {
        let wide = "é".repeat(MAX_DESCRIPTION_LENGTH);
        assert!(validate_description(Some(&wide)).is_ok());
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(None).is_ok());
        assert!(validate_version(Some("7.3.0")).is_ok());
        assert!(validate_version(Some("8.0.0-SNAPSHOT")).is_ok());
        let err = validate_version(Some("seven")).unwrap_err();
        assert!(err.to_string().starts_with("[version] must be a version"));
    }

    #[test]
    fn test_into_common_error() {
        assert_eq!(ValidationError::MissingField("dest.index".into()).code(), 41);
        assert_eq!(ValidationError::invalid("dest.index", "bad").code(), 42);

        let err: Error = ValidationError::MissingField("dest.index".into()).into();
        assert!(matches!(err, Error::Validation(ref msg) if msg == "[dest.index] must not be null"));
    }
}
