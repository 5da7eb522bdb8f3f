//! Exit codes for the dft-core CLI.
//!
//! Exit code ranges:
//! - 0: Success
//! - 10-19: Rejected input (caller must fix the payload)
//! - 20-29: Environment errors

use dft_common::{Error, ErrorCategory};

/// Exit codes for dft-core operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Config decoded (and, where asked, encoded) successfully
    Clean = 0,

    /// Payload is not a well-formed transform config
    MalformedInput = 11,

    /// External payload set a server-owned field
    ForbiddenField = 12,

    /// Body id and `--id` disagree
    IdConflict = 13,

    /// A field or sub-config failed validation
    ValidationFailed = 14,

    /// Input could not be read
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Exit code reporting the given error.
    pub fn from_error(err: &Error) -> Self {
        match err.category() {
            ErrorCategory::MalformedInput => ExitCode::MalformedInput,
            ErrorCategory::ForbiddenField => ExitCode::ForbiddenField,
            ErrorCategory::IdConflict => ExitCode::IdConflict,
            ErrorCategory::Validation => ExitCode::ValidationFailed,
            ErrorCategory::Io => ExitCode::IoError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        // Every variant fits in a u8.
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}
