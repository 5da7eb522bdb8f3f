//! Transform identity type.
//!
//! A transform is identified by a non-empty string id. The id also keys the
//! persisted config document, see [`TransformId::document_id`].

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Maximum id length accepted by [`TransformId::is_valid_format`].
pub const ID_LENGTH_LIMIT: usize = 64;

/// Prefix of persisted config document ids.
pub const DOCUMENT_ID_PREFIX: &str = "data_frame_transform_config-";

static ID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn id_pattern() -> &'static Regex {
    ID_PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9](?:[a-z0-9_\-\.]*[a-z0-9])?$").expect("static id pattern compiles")
    })
}

/// Transform identifier.
///
/// Guaranteed non-empty. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransformId(String);

impl TransformId {
    /// Create a transform id, rejecting empty strings.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::MissingId);
        }
        Ok(TransformId(id))
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id follows the naming rules for newly created transforms.
    ///
    /// Lowercase alphanumerics plus `-`, `_` and `.`, starting and ending
    /// with an alphanumeric, at most [`ID_LENGTH_LIMIT`] characters. This is
    /// advisory: persisted configs may predate the rule.
    pub fn is_valid_format(&self) -> bool {
        self.0.len() <= ID_LENGTH_LIMIT && id_pattern().is_match(&self.0)
    }

    /// Id of the document the config is persisted under.
    pub fn document_id(&self) -> String {
        format!("{}{}", DOCUMENT_ID_PREFIX, self.0)
    }
}

impl fmt::Display for TransformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TransformId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        TransformId::new(value)
    }
}

impl From<TransformId> for String {
    fn from(id: TransformId) -> Self {
        id.0
    }
}

impl AsRef<str> for TransformId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
