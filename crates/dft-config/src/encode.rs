//! Rendering a transform config for a given audience.
//!
//! Absent optionals never produce a key. The `doc_type` discriminator only
//! appears in the internal-storage view.

use crate::fields;
use crate::sub_config::SubConfig;
use crate::transform::TransformConfig;
use crate::DOC_TYPE;
use dft_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Audience of an encoded config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Returned to external API callers.
    Api,
    /// Persisted alongside other document types; carries `doc_type`.
    InternalStorage,
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            View::Api => write!(f, "api"),
            View::InternalStorage => write!(f, "internal"),
        }
    }
}

impl std::str::FromStr for View {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "api" | "external" => Ok(View::Api),
            "internal" | "internal_storage" | "storage" => Ok(View::InternalStorage),
            _ => Err(format!("unknown view: {}", s)),
        }
    }
}

/// Encode a config as a JSON value.
pub fn encode(config: &TransformConfig, view: View) -> Result<Value> {
    let mut doc = Map::new();
    doc.insert(fields::ID.to_string(), json!(config.id().as_str()));
    doc.insert(fields::SOURCE.to_string(), config.source().to_json()?);
    doc.insert(fields::DEST.to_string(), config.dest().to_json()?);
    doc.insert(fields::PIVOT.to_string(), config.pivot().to_json()?);

    if let Some(description) = config.description() {
        doc.insert(fields::DESCRIPTION.to_string(), json!(description));
    }
    if let Some(headers) = config.headers() {
        doc.insert(fields::HEADERS.to_string(), json!(headers));
    }
    if let Some(create_time) = config.create_time() {
        doc.insert(
            fields::CREATE_TIME.to_string(),
            json!(create_time.timestamp_millis()),
        );
    }
    if let Some(version) = config.version() {
        doc.insert(fields::VERSION.to_string(), json!(version));
    }

    if view == View::InternalStorage {
        doc.insert(fields::DOC_TYPE.to_string(), json!(DOC_TYPE));
    }

    Ok(Value::Object(doc))
}

/// Encode a config as compact JSON text.
pub fn encode_to_string(config: &TransformConfig, view: View) -> Result<String> {
    Ok(serde_json::to_string(&encode(config, view)?)?)
}
