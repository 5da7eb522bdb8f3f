//! Source query sub-config.
//!
//! The query DSL itself is opaque here. Only its envelope is checked: one
//! query type keyed to an object body.

use crate::sub_config::SubConfig;
use crate::validate::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const FIELD_PATH: &str = "source.query";

/// Query selecting source documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryConfig(Map<String, Value>);

impl QueryConfig {
    /// Wrap a raw query object.
    pub fn new(query: Map<String, Value>) -> Self {
        QueryConfig(query)
    }

    /// The query matching every document: `{"match_all": {}}`.
    pub fn match_all() -> Self {
        let mut query = Map::new();
        query.insert("match_all".to_string(), Value::Object(Map::new()));
        QueryConfig(query)
    }

    /// The query type, when the envelope holds exactly one.
    pub fn query_type(&self) -> Option<&str> {
        if self.0.len() == 1 {
            self.0.keys().next().map(String::as_str)
        } else {
            None
        }
    }

    pub fn is_match_all(&self) -> bool {
        *self == QueryConfig::match_all()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig::match_all()
    }
}

impl SubConfig for QueryConfig {
    const FIELD: &'static str = "query";

    fn validate(&self) -> ValidationResult<()> {
        if self.0.len() != 1 {
            return Err(ValidationError::invalid(
                FIELD_PATH,
                format!("must contain exactly one query, found {}", self.0.len()),
            ));
        }
        for (query_type, body) in &self.0 {
            if query_type.is_empty() {
                return Err(ValidationError::invalid(
                    FIELD_PATH,
                    "query type must not be empty",
                ));
            }
            if !body.is_object() {
                return Err(ValidationError::invalid(
                    FIELD_PATH,
                    format!("[{}] query body must be an object", query_type),
                ));
            }
        }
        Ok(())
    }
}
