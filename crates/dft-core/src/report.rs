//! Reports printed by the CLI.

use std::io::Read;
use std::path::Path;

use dft_common::{Result, CONFIG_SCHEMA_VERSION};
use dft_config::{TransformConfig, TrustLevel};
use serde::{Deserialize, Serialize};

/// Outcome of `dft-core check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub schema_version: String,
    pub id: String,
    pub valid: bool,
    /// Whether the id follows the lowercase id naming rules.
    pub id_format_ok: bool,
    pub document_id: String,
    pub trust: TrustLevel,
    /// True when the source query is the implicit match-all.
    pub default_query: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description_length: Option<usize>,
    pub has_server_metadata: bool,
}

impl CheckReport {
    pub fn new(config: &TransformConfig, trust: TrustLevel) -> Self {
        CheckReport {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            id: config.id().to_string(),
            valid: config.is_valid(),
            id_format_ok: config.id().is_valid_format(),
            document_id: config.document_id(),
            trust,
            default_query: config.source().query().is_match_all(),
            description_length: config.description().map(|d| d.chars().count()),
            has_server_metadata: !config.metadata().is_empty(),
        }
    }

    /// One-line summary for `--format summary`.
    pub fn summary_line(&self) -> String {
        let mut line = format!(
            "{} {} ({})",
            if self.valid { "ok" } else { "invalid" },
            self.id,
            self.document_id
        );
        if !self.id_format_ok {
            line.push_str(" [id format not recommended]");
        }
        if self.has_server_metadata {
            line.push_str(" [server metadata]");
        }
        line
    }
}

/// Read a payload from a file path, or from stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dft_config::decode;

    const PAYLOAD: &str = r#"{
        "source": {"index": "src"},
        "dest": {"index": "dest"},
        "description": "héllo",
        "pivot": {
            "group_by": {"user": {"terms": {"field": "user_id"}}},
            "aggregations": {"avg_rating": {"avg": {"field": "stars"}}}
        }
    }"#;

    #[test]
    fn test_check_report() {
        let config = decode(PAYLOAD, Some("Reviews"), TrustLevel::External).unwrap();
        let report = CheckReport::new(&config, TrustLevel::External);

        assert_eq!(report.id, "Reviews");
        assert!(report.valid);
        assert!(!report.id_format_ok);
        assert_eq!(report.document_id, "data_frame_transform_config-Reviews");
        assert!(report.default_query);
        assert_eq!(report.description_length, Some(5));
        assert!(!report.has_server_metadata);
        assert_eq!(report.schema_version, CONFIG_SCHEMA_VERSION);
    }

    #[test]
    fn test_summary_line() {
        let config = decode(PAYLOAD, Some("reviews"), TrustLevel::External).unwrap();
        let report = CheckReport::new(&config, TrustLevel::External);
        assert_eq!(
            report.summary_line(),
            "ok reviews (data_frame_transform_config-reviews)"
        );
    }

    #[test]
    fn test_read_input_missing_file() {
        let err = read_input(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, dft_common::Error::Io(_)));
    }
}
