//! Capability shared by the independently validated sub-configs.

use crate::validate::ValidationResult;
use dft_common::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// A sub-tree of the transform config that parses, validates and renders
/// on its own.
pub trait SubConfig: Sized + Serialize + DeserializeOwned {
    /// Field name of this sub-tree within its parent document.
    const FIELD: &'static str;

    /// Check structural validity.
    fn validate(&self) -> ValidationResult<()>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Parse the sub-tree. Parse failures surface as malformed input naming
    /// the sub-tree.
    fn from_json(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|err| {
            Error::MalformedInput(format!("failed to parse [{}]: {}", Self::FIELD, err))
        })
    }

    fn to_json(&self) -> Result<Value> {
        serde_json::to_value(self).map_err(Error::from)
    }
}
