//! Trust-aware decoding of transform config JSON.
//!
//! The trust level is consulted once, up front, against an explicit
//! allow-list:
//! - [`TrustLevel::External`] (API callers): strict. Server-owned fields are
//!   forbidden and any other unknown field is malformed input.
//! - [`TrustLevel::Internal`] (documents this system persisted): server-owned
//!   fields are read, the `doc_type` marker is checked and dropped, and
//!   unknown fields are ignored.

use crate::dest::DestConfig;
use crate::fields;
use crate::pivot::PivotConfig;
use crate::source::SourceConfig;
use crate::sub_config::SubConfig;
use crate::transform::{ServerMetadata, TransformConfig};
use crate::DOC_TYPE;
use chrono::{DateTime, Utc};
use dft_common::{Error, Result, TransformId};
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// Fields an external caller may set.
pub const EXTERNAL_FIELDS: &[&str] = &[
    fields::ID,
    fields::SOURCE,
    fields::DEST,
    fields::PIVOT,
    fields::DESCRIPTION,
];

/// Fields only the server may set.
pub const SERVER_OWNED_FIELDS: &[&str] = &[fields::HEADERS, fields::CREATE_TIME, fields::VERSION];

/// Where a payload comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrustLevel {
    /// Read back from internal persisted storage.
    Internal,
    /// Supplied by an external API caller.
    External,
}

impl TrustLevel {
    /// Whether the server-owned fields are accepted at this level.
    pub fn accepts_server_fields(self) -> bool {
        matches!(self, TrustLevel::Internal)
    }
}

impl std::fmt::Display for TrustLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrustLevel::Internal => write!(f, "internal"),
            TrustLevel::External => write!(f, "external"),
        }
    }
}

impl std::str::FromStr for TrustLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "internal" | "stored" => Ok(TrustLevel::Internal),
            "external" | "api" => Ok(TrustLevel::External),
            _ => Err(format!("unknown trust level: {}", s)),
        }
    }
}

/// Top-level JSON object that rejects repeated keys instead of keeping the
/// last one.
struct FieldBag(Map<String, Value>);

impl<'de> Deserialize<'de> for FieldBag {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FieldBagVisitor;

        impl<'de> Visitor<'de> for FieldBagVisitor {
            type Value = FieldBag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a transform config JSON object")
            }

            fn visit_map<A>(self, mut access: A) -> std::result::Result<FieldBag, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut bag = Map::new();
                while let Some(key) = access.next_key::<String>()? {
                    if bag.contains_key(&key) {
                        return Err(de::Error::custom(format_args!("duplicate field [{}]", key)));
                    }
                    let value: Value = access.next_value()?;
                    bag.insert(key, value);
                }
                Ok(FieldBag(bag))
            }
        }

        deserializer.deserialize_map(FieldBagVisitor)
    }
}

/// Decode a JSON document into a validated config.
///
/// `external_id` is the id supplied outside the body (e.g. a URL argument).
/// A top-level field given twice is malformed input.
pub fn decode(raw: &str, external_id: Option<&str>, trust: TrustLevel) -> Result<TransformConfig> {
    let FieldBag(bag) = serde_json::from_str(raw)?;
    decode_fields(bag, external_id, trust)
}

/// Decode raw bytes. Same rules as [`decode`].
pub fn decode_slice(
    raw: &[u8],
    external_id: Option<&str>,
    trust: TrustLevel,
) -> Result<TransformConfig> {
    let FieldBag(bag) = serde_json::from_slice(raw)?;
    decode_fields(bag, external_id, trust)
}

/// Decode an already parsed JSON value. Same rules as [`decode`].
pub fn decode_value(
    value: Value,
    external_id: Option<&str>,
    trust: TrustLevel,
) -> Result<TransformConfig> {
    match value {
        Value::Object(bag) => decode_fields(bag, external_id, trust),
        other => Err(Error::MalformedInput(format!(
            "transform config must be a JSON object, found {}",
            json_type(&other)
        ))),
    }
}

fn decode_fields(
    mut bag: Map<String, Value>,
    external_id: Option<&str>,
    trust: TrustLevel,
) -> Result<TransformConfig> {
    check_fields(&bag, trust)?;

    let body_id = take_string(&mut bag, fields::ID)?;
    let id = reconcile_id(body_id, external_id)?;

    let source: SourceConfig = take_required(&mut bag)?;
    let dest: DestConfig = take_required(&mut bag)?;
    let pivot: PivotConfig = take_required(&mut bag)?;
    let description = take_string(&mut bag, fields::DESCRIPTION)?;

    let metadata = if trust.accepts_server_fields() {
        ServerMetadata {
            headers: take_headers(&mut bag)?,
            create_time: take_create_time(&mut bag)?,
            version: take_string(&mut bag, fields::VERSION)?,
        }
    } else {
        ServerMetadata::default()
    };

    let config = TransformConfig::assemble(id, source, dest, pivot, description, metadata)?;
    debug!(id = %config.id(), trust = %trust, "decoded transform config");
    Ok(config)
}

fn check_fields(bag: &Map<String, Value>, trust: TrustLevel) -> Result<()> {
    match trust {
        TrustLevel::External => {
            if let Some(field) = SERVER_OWNED_FIELDS.iter().find(|f| bag.contains_key(**f)) {
                warn!(field = *field, "rejected server-owned field in external transform config");
                return Err(Error::ForbiddenField {
                    field: field.to_string(),
                });
            }
            if let Some(field) = bag.keys().find(|k| !EXTERNAL_FIELDS.contains(&k.as_str())) {
                return Err(Error::MalformedInput(format!("unknown field [{}]", field)));
            }
        }
        TrustLevel::Internal => {
            if let Some(doc_type) = bag.get(fields::DOC_TYPE) {
                if doc_type.as_str() != Some(DOC_TYPE) {
                    return Err(Error::MalformedInput(format!(
                        "stored document has [{}] {}, expected [{}]",
                        fields::DOC_TYPE,
                        doc_type,
                        DOC_TYPE
                    )));
                }
            }
            for field in bag.keys() {
                let known = EXTERNAL_FIELDS.contains(&field.as_str())
                    || SERVER_OWNED_FIELDS.contains(&field.as_str())
                    || field == fields::DOC_TYPE;
                if !known {
                    debug!(field = %field, "ignoring unknown field in stored transform config");
                }
            }
        }
    }
    Ok(())
}

fn reconcile_id(body_id: Option<String>, external_id: Option<&str>) -> Result<TransformId> {
    match (body_id, external_id) {
        (Some(body_id), Some(external_id)) if body_id != external_id => {
            warn!(body_id = %body_id, external_id = %external_id, "inconsistent transform id");
            Err(Error::IdConflict {
                body_id,
                external_id: external_id.to_string(),
            })
        }
        (Some(id), _) => TransformId::new(id),
        (None, Some(external_id)) => TransformId::new(external_id),
        (None, None) => Err(Error::MissingId),
    }
}

fn take_required<T: SubConfig>(bag: &mut Map<String, Value>) -> Result<T> {
    match bag.remove(T::FIELD) {
        None | Some(Value::Null) => Err(Error::MalformedInput(format!("Required [{}]", T::FIELD))),
        Some(value) => T::from_json(value),
    }
}

fn take_string(bag: &mut Map<String, Value>, field: &str) -> Result<Option<String>> {
    match bag.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(other) => Err(Error::MalformedInput(format!(
            "[{}] must be a string, found {}",
            field,
            json_type(&other)
        ))),
    }
}

fn take_headers(bag: &mut Map<String, Value>) -> Result<Option<BTreeMap<String, String>>> {
    match bag.remove(fields::HEADERS) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value).map(Some).map_err(|err| {
            Error::MalformedInput(format!("failed to parse [{}]: {}", fields::HEADERS, err))
        }),
    }
}

/// `create_time` is stored as epoch milliseconds; RFC 3339 text is accepted too.
fn take_create_time(bag: &mut Map<String, Value>) -> Result<Option<DateTime<Utc>>> {
    let invalid = |detail: String| {
        Error::MalformedInput(format!("failed to parse [{}]: {}", fields::CREATE_TIME, detail))
    };
    match bag.remove(fields::CREATE_TIME) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(millis)) => millis
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(Some)
            .ok_or_else(|| invalid(format!("[{}] is not epoch milliseconds", millis))),
        Some(Value::String(text)) => DateTime::parse_from_rfc3339(&text)
            .map(|time| Some(time.with_timezone(&Utc)))
            .map_err(|err| invalid(err.to_string())),
        Some(other) => Err(invalid(format!(
            "expected a number or string, found {}",
            json_type(&other)
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> Value {
        json!({
            "source": {"index": "src"},
            "dest": {"index": "dest"},
            "pivot": {
                "group_by": {"id": {"terms": {"field": "id"}}},
                "aggs": {"avg": {"avg": {"field": "points"}}}
            }
        })
    }

    #[test]
    fn test_trust_level_parse() {
        assert_eq!("external".parse::<TrustLevel>().unwrap(), TrustLevel::External);
        assert_eq!("Internal".parse::<TrustLevel>().unwrap(), TrustLevel::Internal);
        assert!("root".parse::<TrustLevel>().is_err());
        assert_eq!(TrustLevel::External.to_string(), "external");
    }

    #[test]
    fn test_reconcile_id() {
        assert_eq!(
            reconcile_id(Some("a".into()), Some("a")).unwrap().as_str(),
            "a"
        );
        assert_eq!(reconcile_id(Some("a".into()), None).unwrap().as_str(), "a");
        assert_eq!(reconcile_id(None, Some("b")).unwrap().as_str(), "b");
        assert!(matches!(reconcile_id(None, None), Err(Error::MissingId)));
        assert!(matches!(
            reconcile_id(Some("a".into()), Some("b")),
            Err(Error::IdConflict { .. })
        ));
    }

    #[test]
    fn test_non_object_is_malformed() {
        let err = decode_value(json!([1, 2]), Some("x"), TrustLevel::Internal).unwrap_err();
        assert!(err.to_string().contains("found array"));
    }

    #[test]
    fn test_missing_required_sub_config() {
        let mut value = body();
        value.as_object_mut().unwrap().remove("pivot");
        let err = decode_value(value, Some("x"), TrustLevel::External).unwrap_err();
        assert_eq!(err.to_string(), "malformed input: Required [pivot]");
    }

    #[test]
    fn test_forbidden_checked_before_unknown() {
        let mut value = body();
        value["zzz"] = json!(1);
        value["version"] = json!("7.3.0");
        let err = decode_value(value, Some("x"), TrustLevel::External).unwrap_err();
        assert!(matches!(err, Error::ForbiddenField { ref field } if field == "version"));
    }

    #[test]
    fn test_create_time_formats() {
        let mut value = body();
        value["create_time"] = json!(1_560_000_000_123_i64);
        let config = decode_value(value, Some("x"), TrustLevel::Internal).unwrap();
        assert_eq!(config.create_time().unwrap().timestamp_millis(), 1_560_000_000_123);

        let mut value = body();
        value["create_time"] = json!("2019-06-08T13:20:00.123Z");
        let config = decode_value(value, Some("x"), TrustLevel::Internal).unwrap();
        assert_eq!(config.create_time().unwrap().timestamp_millis(), 1_560_000_000_123);

        let mut value = body();
        value["create_time"] = json!(true);
        assert!(decode_value(value, Some("x"), TrustLevel::Internal).is_err());
    }

    #[test]
    fn test_duplicate_top_level_field_rejected() {
        let raw = r#"{
            "id": "a",
            "id": "b",
            "source": {"index": "src"},
            "dest": {"index": "dest"},
            "pivot": {
                "group_by": {"id": {"terms": {"field": "id"}}},
                "aggs": {"avg": {"avg": {"field": "points"}}}
            }
        }"#;
        for trust in [TrustLevel::External, TrustLevel::Internal] {
            let err = decode(raw, None, trust).unwrap_err();
            assert_eq!(err.category(), dft_common::ErrorCategory::MalformedInput);
            assert!(err.to_string().contains("duplicate field [id]"), "{err}");
        }
        assert!(decode_slice(raw.as_bytes(), None, TrustLevel::External).is_err());
    }

    #[test]
    fn test_non_object_text_is_malformed() {
        let err = decode("[1, 2]", Some("x"), TrustLevel::External).unwrap_err();
        assert!(matches!(err, Error::MalformedInput(_)));
    }

    #[test]
    fn test_description_type_checked() {
        let mut value = body();
        value["description"] = json!(42);
        let err = decode_value(value, Some("x"), TrustLevel::External).unwrap_err();
        assert_eq!(
            err.to_string(),
            "malformed input: [description] must be a string, found number"
        );
    }
}
