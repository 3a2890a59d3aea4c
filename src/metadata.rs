use crate::PreviewError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

pub const OG_TITLE: &str = "og:title";
pub const OG_DESCRIPTION: &str = "og:description";
pub const OG_IMAGE: &str = "og:image";

/// Open Graph key/value data describing a linked page.
///
/// Every key is optional. The metadata service may return any set of keys,
/// so lookups go through [`PreviewMetadata::get`] or the `og_*` accessors,
/// which treat blank values as missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewMetadata {
    entries: BTreeMap<String, String>,
}

impl PreviewMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a metadata service body of the form `{ "data": { ... } }`.
    ///
    /// A body that is not JSON is an error. Any other shape degrades to
    /// whatever string entries can be recovered, possibly none.
    pub fn from_response_body(body: &str) -> Result<Self, PreviewError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| PreviewError::DecodeError(e.to_string()))?;
        Ok(Self::from_response_value(&value))
    }

    pub fn from_response_value(value: &Value) -> Self {
        let Some(data) = value.get("data").and_then(Value::as_object) else {
            debug!("Metadata response carried no data object");
            return Self::default();
        };

        let entries = data
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|s| (key.clone(), s.to_string())))
            .collect::<BTreeMap<_, _>>();

        debug!(keys = entries.len(), "Decoded metadata entries");
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn og_title(&self) -> Option<&str> {
        self.non_blank(OG_TITLE)
    }

    pub fn og_description(&self) -> Option<&str> {
        self.non_blank(OG_DESCRIPTION)
    }

    pub fn og_image(&self) -> Option<&str> {
        self.non_blank(OG_IMAGE)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for PreviewMetadata
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
