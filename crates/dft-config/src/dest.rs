//! Destination sub-config.

use crate::sub_config::SubConfig;
use crate::validate::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};

/// Destination index and optional ingest pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestConfig {
    index: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pipeline: Option<String>,
}

impl DestConfig {
    pub fn new(index: impl Into<String>, pipeline: Option<String>) -> Self {
        DestConfig {
            index: index.into(),
            pipeline,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn pipeline(&self) -> Option<&str> {
        self.pipeline.as_deref()
    }
}

impl SubConfig for DestConfig {
    const FIELD: &'static str = "dest";

    fn validate(&self) -> ValidationResult<()> {
        if self.index.is_empty() {
            return Err(ValidationError::MissingField("dest.index".to_string()));
        }
        if matches!(self.pipeline.as_deref(), Some("")) {
            return Err(ValidationError::invalid(
                "dest.pipeline",
                "must not be empty when set",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_with_pipeline() {
        let dest = DestConfig::from_json(json!({"index": "dest", "pipeline": "enrich"})).unwrap();
        assert_eq!(dest.index(), "dest");
        assert_eq!(dest.pipeline(), Some("enrich"));
        assert!(dest.is_valid());
    }

    #[test]
    fn test_pipeline_omitted_when_absent() {
        let value = DestConfig::new("dest", None).to_json().unwrap();
        assert_eq!(value, json!({"index": "dest"}));
    }

    #[test]
    fn test_validation() {
        assert!(!DestConfig::new("", None).is_valid());
        assert!(!DestConfig::new("dest", Some(String::new())).is_valid());
    }

    #[test]
    fn test_index_required() {
        let err = DestConfig::from_json(json!({"pipeline": "p"})).unwrap_err();
        assert!(err.to_string().contains("[dest]"));
    }
}
