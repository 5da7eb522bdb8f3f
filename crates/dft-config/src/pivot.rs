//! Pivot sub-config: group-by sources and aggregations.
//!
//! Group sources are a closed, tagged set (`terms`, `histogram`,
//! `date_histogram`). Aggregation bodies are opaque beyond their envelope.

use crate::sub_config::SubConfig;
use crate::validate::{ValidationError, ValidationResult};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Smallest accepted `max_page_search_size`.
pub const MIN_PAGE_SEARCH_SIZE: u32 = 10;
/// Largest accepted `max_page_search_size`.
pub const MAX_PAGE_SEARCH_SIZE: u32 = 10_000;

/// Keys that may sit next to the aggregation type inside a definition.
const AGGREGATION_RESERVED_KEYS: &[&str] = &["meta", "aggs", "aggregations"];

const CALENDAR_INTERVALS: &[&str] = &[
    "1m", "minute", "1h", "hour", "1d", "day", "1w", "week", "1M", "month", "1q", "quarter",
    "1y", "year",
];

static FIXED_INTERVAL: OnceLock<Regex> = OnceLock::new();

fn fixed_interval_pattern() -> &'static Regex {
    FIXED_INTERVAL
        .get_or_init(|| Regex::new(r"^[1-9][0-9]*(ms|s|m|h|d)$").expect("static interval pattern compiles"))
}

/// Group-by and aggregation definitions.
///
/// Both maps keep the caller's key order: `group_by` order is the order of
/// the output bucket keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PivotConfig {
    group_by: IndexMap<String, GroupSource>,

    #[serde(alias = "aggs")]
    aggregations: IndexMap<String, Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_page_search_size: Option<u32>,
}

impl PivotConfig {
    pub fn new(
        group_by: IndexMap<String, GroupSource>,
        aggregations: IndexMap<String, Map<String, Value>>,
        max_page_search_size: Option<u32>,
    ) -> Self {
        PivotConfig {
            group_by,
            aggregations,
            max_page_search_size,
        }
    }

    pub fn group_by(&self) -> &IndexMap<String, GroupSource> {
        &self.group_by
    }

    pub fn aggregations(&self) -> &IndexMap<String, Map<String, Value>> {
        &self.aggregations
    }

    pub fn max_page_search_size(&self) -> Option<u32> {
        self.max_page_search_size
    }

    fn validate_aggregation(name: &str, definition: &Map<String, Value>) -> ValidationResult<()> {
        if name.is_empty() || name.contains(['[', ']', '>']) {
            return Err(ValidationError::invalid(
                "pivot.aggregations",
                format!(
                    "Invalid aggregation name [{}]. Aggregation names must be non-empty and can contain any character except '[', ']', and '>'",
                    name
                ),
            ));
        }
        let types = definition
            .keys()
            .filter(|key| !AGGREGATION_RESERVED_KEYS.contains(&key.as_str()))
            .count();
        if types != 1 {
            return Err(ValidationError::invalid(
                format!("pivot.aggregations.{}", name),
                format!("must define exactly one aggregation type, found {}", types),
            ));
        }
        Ok(())
    }
}

impl SubConfig for PivotConfig {
    const FIELD: &'static str = "pivot";

    fn validate(&self) -> ValidationResult<()> {
        if self.group_by.is_empty() {
            return Err(ValidationError::invalid(
                "pivot.group_by",
                "must define at least one group source",
            ));
        }
        for (name, source) in &self.group_by {
            if name.is_empty() {
                return Err(ValidationError::invalid(
                    "pivot.group_by",
                    "group source names must not be empty",
                ));
            }
            source.validate(name)?;
        }

        if self.aggregations.is_empty() {
            return Err(ValidationError::invalid(
                "pivot.aggregations",
                "must define at least one aggregation",
            ));
        }
        for (name, definition) in &self.aggregations {
            Self::validate_aggregation(name, definition)?;
        }

        if let Some(size) = self.max_page_search_size {
            if !(MIN_PAGE_SEARCH_SIZE..=MAX_PAGE_SEARCH_SIZE).contains(&size) {
                return Err(ValidationError::invalid(
                    "pivot.max_page_search_size",
                    format!(
                        "must be between {} and {}, got {}",
                        MIN_PAGE_SEARCH_SIZE, MAX_PAGE_SEARCH_SIZE, size
                    ),
                ));
            }
        }

        Ok(())
    }
}

/// How source documents are bucketed into one output field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSource {
    Terms(TermsGroupSource),
    Histogram(HistogramGroupSource),
    DateHistogram(DateHistogramGroupSource),
}

impl GroupSource {
    /// Source field this group reads.
    pub fn field(&self) -> &str {
        match self {
            GroupSource::Terms(source) => &source.field,
            GroupSource::Histogram(source) => &source.field,
            GroupSource::DateHistogram(source) => &source.field,
        }
    }

    fn validate(&self, name: &str) -> ValidationResult<()> {
        if self.field().is_empty() {
            return Err(ValidationError::MissingField(format!(
                "pivot.group_by.{}.field",
                name
            )));
        }
        match self {
            GroupSource::Terms(_) => Ok(()),
            GroupSource::Histogram(source) => {
                if source.interval.is_finite() && source.interval > 0.0 {
                    Ok(())
                } else {
                    Err(ValidationError::invalid(
                        format!("pivot.group_by.{}.interval", name),
                        format!("must be a positive number, got {}", source.interval),
                    ))
                }
            }
            GroupSource::DateHistogram(source) => source.validate(name),
        }
    }
}

/// Bucket by distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TermsGroupSource {
    pub field: String,
}

/// Bucket numeric values into fixed-width intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistogramGroupSource {
    pub field: String,
    pub interval: f64,
}

/// Bucket timestamps into calendar or fixed intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateHistogramGroupSource {
    pub field: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl DateHistogramGroupSource {
    fn validate(&self, name: &str) -> ValidationResult<()> {
        let path = format!("pivot.group_by.{}", name);
        match (&self.calendar_interval, &self.fixed_interval) {
            (Some(calendar), None) => {
                if CALENDAR_INTERVALS.contains(&calendar.as_str()) {
                    Ok(())
                } else {
                    Err(ValidationError::invalid(
                        format!("{}.calendar_interval", path),
                        format!("unknown calendar interval [{}]", calendar),
                    ))
                }
            }
            (None, Some(fixed)) => {
                if fixed_interval_pattern().is_match(fixed) {
                    Ok(())
                } else {
                    Err(ValidationError::invalid(
                        format!("{}.fixed_interval", path),
                        format!("invalid fixed interval [{}]", fixed),
                    ))
                }
            }
            (Some(_), Some(_)) => Err(ValidationError::invalid(
                path,
                "calendar_interval and fixed_interval are mutually exclusive",
            )),
            (None, None) => Err(ValidationError::invalid(
                path,
                "one of calendar_interval or fixed_interval is required",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pivot(value: Value) -> PivotConfig {
        PivotConfig::from_json(value).unwrap()
    }

    fn simple() -> Value {
        json!({
            "group_by": {"id": {"terms": {"field": "id"}}},
            "aggs": {"avg": {"avg": {"field": "points"}}}
        })
    }

    #[test]
    fn test_parse_aggs_alias() {
        let config = pivot(simple());
        assert!(config.is_valid());
        assert_eq!(config.group_by()["id"].field(), "id");
        assert!(config.aggregations().contains_key("avg"));
        let rendered = config.to_json().unwrap();
        assert!(rendered.get("aggregations").is_some());
        assert!(rendered.get("aggs").is_none());
    }

    #[test]
    fn test_caller_key_order_kept() {
        let config = pivot(json!({
            "group_by": {
                "zone": {"terms": {"field": "OriginZone"}},
                "airline": {"terms": {"field": "Carrier"}}
            },
            "aggregations": {
                "max_delay": {"max": {"field": "DelayMin"}},
                "avg_delay": {"avg": {"field": "DelayMin"}}
            }
        }));
        let groups: Vec<&str> = config.group_by().keys().map(String::as_str).collect();
        assert_eq!(groups, ["zone", "airline"]);

        let rendered = config.to_json().unwrap();
        let groups: Vec<&str> = rendered["group_by"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(groups, ["zone", "airline"]);
        let aggs: Vec<&str> = rendered["aggregations"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(aggs, ["max_delay", "avg_delay"]);
    }

    #[test]
    fn test_all_group_source_kinds() {
        let config = pivot(json!({
            "group_by": {
                "user": {"terms": {"field": "user.id"}},
                "price": {"histogram": {"field": "price", "interval": 5.0}},
                "day": {"date_histogram": {"field": "@timestamp", "calendar_interval": "1d"}},
                "slot": {"date_histogram": {"field": "@timestamp", "fixed_interval": "30m", "time_zone": "UTC"}}
            },
            "aggregations": {"max_price": {"max": {"field": "price"}}},
            "max_page_search_size": 500
        }));
        config.validate().unwrap();
        assert!(matches!(config.group_by()["price"], GroupSource::Histogram(_)));
        assert_eq!(config.max_page_search_size(), Some(500));
    }

    #[test]
    fn test_unknown_group_source_is_malformed() {
        let err = PivotConfig::from_json(json!({
            "group_by": {"id": {"geotile_grid": {"field": "loc"}}},
            "aggs": {"c": {"value_count": {"field": "id"}}}
        }))
        .unwrap_err();
        assert!(err.to_string().contains("failed to parse [pivot]"));
    }

    #[test]
    fn test_structural_rules() {
        let empty_groups = pivot(json!({"group_by": {}, "aggs": {"a": {"avg": {"field": "x"}}}}));
        assert_eq!(
            empty_groups.validate().unwrap_err().field(),
            Some("pivot.group_by")
        );

        let empty_aggs = pivot(json!({"group_by": {"id": {"terms": {"field": "id"}}}, "aggs": {}}));
        assert!(!empty_aggs.is_valid());

        let bad_name = pivot(json!({
            "group_by": {"id": {"terms": {"field": "id"}}},
            "aggs": {"a>b": {"avg": {"field": "x"}}}
        }));
        assert!(bad_name
            .validate()
            .unwrap_err()
            .to_string()
            .contains("Invalid aggregation name [a>b]"));

        let two_types = pivot(json!({
            "group_by": {"id": {"terms": {"field": "id"}}},
            "aggs": {"a": {"avg": {"field": "x"}, "max": {"field": "x"}}}
        }));
        assert!(!two_types.is_valid());

        let with_meta = pivot(json!({
            "group_by": {"id": {"terms": {"field": "id"}}},
            "aggs": {"a": {"avg": {"field": "x"}, "meta": {"owner": "ops"}}}
        }));
        assert!(with_meta.is_valid());
    }

    #[test]
    fn test_page_size_bounds() {
        let mut value = simple();
        value["max_page_search_size"] = json!(9);
        assert!(!pivot(value.clone()).is_valid());
        value["max_page_search_size"] = json!(10);
        assert!(pivot(value.clone()).is_valid());
        value["max_page_search_size"] = json!(10_001);
        assert!(!pivot(value).is_valid());
    }

    #[test]
    fn test_interval_rules() {
        let groups = |source: Value| {
            pivot(json!({"group_by": {"g": source}, "aggs": {"a": {"avg": {"field": "x"}}}}))
        };
        assert!(!groups(json!({"histogram": {"field": "x", "interval": 0.0}})).is_valid());
        assert!(!groups(json!({"date_histogram": {"field": "t"}})).is_valid());
        assert!(!groups(json!({"date_histogram": {"field": "t", "calendar_interval": "3d"}})).is_valid());
        assert!(!groups(json!({"date_histogram": {"field": "t", "fixed_interval": "0s"}})).is_valid());
        assert!(!groups(json!({
            "date_histogram": {"field": "t", "calendar_interval": "1d", "fixed_interval": "1d"}
        }))
        .is_valid());
        assert!(!groups(json!({"terms": {"field": ""}})).is_valid());
    }
}
