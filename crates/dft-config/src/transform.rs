//! The transform config entity.
//!
//! A [`TransformConfig`] only exists fully validated. Every way of obtaining
//! one (JSON decode at either trust level, in-process construction, stamping
//! server metadata) funnels through the same construction path, so the
//! in-process and wire paths cannot disagree on validity.

use crate::dest::DestConfig;
use crate::pivot::PivotConfig;
use crate::source::SourceConfig;
use crate::sub_config::SubConfig;
use crate::validate::{validate_description, validate_version};
use crate::CURRENT_VERSION;
use chrono::{DateTime, Utc};
use dft_common::{Result, TransformId};
use std::collections::BTreeMap;

/// Caller headers that carry security context and are kept on the config.
pub const SECURITY_HEADER_FILTERS: &[&str] =
    &["_xpack_security_authentication", "es-security-runas-user"];

/// Keep only the security-context headers of a caller request.
pub fn filter_security_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter(|(key, _)| SECURITY_HEADER_FILTERS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Server-owned fields. Never taken from external callers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerMetadata {
    pub headers: Option<BTreeMap<String, String>>,
    pub create_time: Option<DateTime<Utc>>,
    pub version: Option<String>,
}

impl ServerMetadata {
    /// Metadata for a config being created now on behalf of a caller.
    pub fn stamp(caller_headers: &BTreeMap<String, String>) -> Self {
        let headers = filter_security_headers(caller_headers);
        ServerMetadata {
            headers: (!headers.is_empty()).then_some(headers),
            create_time: Some(Utc::now()),
            version: Some(CURRENT_VERSION.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_none() && self.create_time.is_none() && self.version.is_none()
    }
}

/// Immutable, validated description of a data frame transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformConfig {
    id: TransformId,
    source: SourceConfig,
    dest: DestConfig,
    pivot: PivotConfig,
    description: Option<String>,
    headers: Option<BTreeMap<String, String>>,
    create_time: Option<DateTime<Utc>>,
    version: Option<String>,
}

impl TransformConfig {
    /// Trusted in-process construction without server metadata.
    pub fn new(
        id: impl Into<String>,
        source: SourceConfig,
        dest: DestConfig,
        pivot: PivotConfig,
        description: Option<String>,
    ) -> Result<Self> {
        Self::assemble(
            TransformId::new(id)?,
            source,
            dest,
            pivot,
            description,
            ServerMetadata::default(),
        )
    }

    /// A copy of this config carrying the given server metadata.
    pub fn with_metadata(self, metadata: ServerMetadata) -> Result<Self> {
        Self::assemble(
            self.id,
            self.source,
            self.dest,
            self.pivot,
            self.description,
            metadata,
        )
    }

    /// Single construction path shared by every constructor and the decoder.
    pub(crate) fn assemble(
        id: TransformId,
        source: SourceConfig,
        dest: DestConfig,
        pivot: PivotConfig,
        description: Option<String>,
        metadata: ServerMetadata,
    ) -> Result<Self> {
        validate_description(description.as_deref())?;
        source.validate()?;
        dest.validate()?;
        pivot.validate()?;
        validate_version(metadata.version.as_deref())?;

        Ok(TransformConfig {
            id,
            source,
            dest,
            pivot,
            description,
            headers: metadata.headers,
            // Millisecond precision, matching what the stored document keeps.
            create_time: metadata.create_time.map(truncate_to_millis),
            version: metadata.version,
        })
    }

    pub fn id(&self) -> &TransformId {
        &self.id
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    pub fn dest(&self) -> &DestConfig {
        &self.dest
    }

    pub fn pivot(&self) -> &PivotConfig {
        &self.pivot
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn headers(&self) -> Option<&BTreeMap<String, String>> {
        self.headers.as_ref()
    }

    pub fn create_time(&self) -> Option<DateTime<Utc>> {
        self.create_time
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Server-owned fields currently set.
    pub fn metadata(&self) -> ServerMetadata {
        ServerMetadata {
            headers: self.headers.clone(),
            create_time: self.create_time,
            version: self.version.clone(),
        }
    }

    /// Id of the document this config is persisted under.
    pub fn document_id(&self) -> String {
        self.id.document_id()
    }

    /// Whether all sub-configs pass validation.
    pub fn is_valid(&self) -> bool {
        self.source.is_valid() && self.dest.is_valid() && self.pivot.is_valid()
    }
}

fn truncate_to_millis(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(time.timestamp_millis()).unwrap_or(time)
}
