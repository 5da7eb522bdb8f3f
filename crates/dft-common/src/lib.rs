//! Data frame transform common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the dft crates:
//! - Transform identity type with format checks
//! - Unified error taxonomy with stable codes
//! - Output formats for the CLI

pub mod error;
pub mod id;
pub mod output;

pub use error::{format_error_human, Error, ErrorCategory, Result, StructuredError};
pub use id::TransformId;
pub use output::OutputFormat;

/// Schema version of the persisted transform config document.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
