//! Data frame transform configuration model.
//!
//! This crate provides:
//! - Typed sub-configs for `source`, `dest` and `pivot` with structural validation
//! - A trust-aware decoder (external API callers vs. internally persisted documents)
//! - The immutable [`TransformConfig`] entity
//! - A dual-view encoder (external API vs. internal storage)
//!
//! # Example
//!
//! ```
//! use dft_config::{decode, encode_to_string, SubConfig, TrustLevel, View};
//!
//! let body = r#"{
//!     "source": {"index": "src"},
//!     "dest": {"index": "dest"},
//!     "pivot": {
//!         "group_by": {"id": {"terms": {"field": "id"}}},
//!         "aggs": {"avg": {"avg": {"field": "points"}}}
//!     }
//! }"#;
//!
//! let config = decode(body, Some("my-transform"), TrustLevel::External).unwrap();
//! assert!(config.source().query().is_valid());
//!
//! let stored = encode_to_string(&config, View::InternalStorage).unwrap();
//! assert!(stored.contains(r#""doc_type":"data_frame_transform_config""#));
//! ```

pub mod decode;
pub mod dest;
pub mod encode;
pub mod pivot;
pub mod query;
pub mod source;
pub mod sub_config;
pub mod transform;
pub mod validate;

pub use decode::{decode, decode_slice, decode_value, TrustLevel};
pub use dest::DestConfig;
pub use encode::{encode, encode_to_string, View};
pub use pivot::{DateHistogramGroupSource, GroupSource, HistogramGroupSource, PivotConfig, TermsGroupSource};
pub use query::QueryConfig;
pub use source::SourceConfig;
pub use sub_config::SubConfig;
pub use transform::{filter_security_headers, ServerMetadata, TransformConfig};
pub use validate::{validate_description, validate_version, ValidationError, ValidationResult};

/// Value of the `doc_type` discriminator in the internal-storage view.
pub const DOC_TYPE: &str = "data_frame_transform_config";

/// Version stamped into configs created by this build.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Top-level field names of the transform config document.
pub mod fields {
    pub const ID: &str = "id";
    pub const SOURCE: &str = "source";
    pub const DEST: &str = "dest";
    pub const PIVOT: &str = "pivot";
    pub const DESCRIPTION: &str = "description";
    pub const HEADERS: &str = "headers";
    pub const CREATE_TIME: &str = "create_time";
    pub const VERSION: &str = "version";
    pub const DOC_TYPE: &str = "doc_type";
}
