//! Source sub-config: which indices to read and which documents to select.

use crate::query::QueryConfig;
use crate::sub_config::SubConfig;
use crate::validate::{ValidationError, ValidationResult};
use serde::{Deserialize, Deserializer, Serialize};

/// Source indices and query.
///
/// `query` is never absent: a missing query is replaced by match-all when
/// the config is built, whether from JSON or in process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    #[serde(deserialize_with = "one_or_many")]
    index: Vec<String>,

    #[serde(default)]
    query: QueryConfig,
}

impl SourceConfig {
    /// Build a source config, substituting match-all for a missing query.
    pub fn new(index: Vec<String>, query: Option<QueryConfig>) -> Self {
        SourceConfig {
            index,
            query: query.unwrap_or_default(),
        }
    }

    /// Source reading a single index with the default query.
    pub fn single(index: impl Into<String>) -> Self {
        Self::new(vec![index.into()], None)
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn query(&self) -> &QueryConfig {
        &self.query
    }
}

impl SubConfig for SourceConfig {
    const FIELD: &'static str = "source";

    fn validate(&self) -> ValidationResult<()> {
        if self.index.is_empty() {
            return Err(ValidationError::MissingField("source.index".to_string()));
        }
        if self.index.iter().any(String::is_empty) {
            return Err(ValidationError::invalid(
                "source.index",
                "index names must not be empty",
            ));
        }
        self.query.validate()
    }
}

/// `index` may be written as a single string or an array of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(index) => vec![index],
        OneOrMany::Many(indices) => indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_query_defaults_to_match_all() {
        let source = SourceConfig::from_json(json!({"index": "src"})).unwrap();
        assert_eq!(source.index(), ["src".to_string()]);
        assert!(source.query().is_match_all());
        assert!(source.is_valid());
    }

    #[test]
    fn test_index_array_and_query() {
        let source = SourceConfig::from_json(json!({
            "index": ["logs-a", "logs-b"],
            "query": {"term": {"level": "error"}}
        }))
        .unwrap();
        assert_eq!(source.index().len(), 2);
        assert_eq!(source.query().query_type(), Some("term"));
    }

    #[test]
    fn test_in_process_construction_substitutes_query() {
        let source = SourceConfig::new(vec!["src".into()], None);
        assert!(source.query().is_valid());
        assert_eq!(source, SourceConfig::single("src"));
    }

    #[test]
    fn test_index_rules() {
        assert!(!SourceConfig::new(vec![], None).is_valid());
        assert!(!SourceConfig::new(vec!["".into()], None).is_valid());
    }

    #[test]
    fn test_unknown_field_is_malformed() {
        assert!(SourceConfig::from_json(json!({"index": "src", "size": 10})).is_err());
        assert!(SourceConfig::from_json(json!({"query": {"match_all": {}}})).is_err());
    }

    #[test]
    fn test_renders_index_as_array() {
        let value = SourceConfig::single("src").to_json().unwrap();
        assert_eq!(value, json!({"index": ["src"], "query": {"match_all": {}}}));
    }
}
