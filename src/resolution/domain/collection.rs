use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_COLLECTION_NAME_LEN: usize = 64;

/// CollectionName - validated name of a remote bulletin collection
///
/// Open-ended: new collections published upstream are accepted as long as
/// the name is lower-case ASCII letters, digits, `-`, `_` or `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    pub fn new(name: &str) -> Result<Self, String> {
        if name.is_empty() {
            return Err("collection name cannot be empty".to_string());
        }
        if name.len() > MAX_COLLECTION_NAME_LEN {
            return Err(format!(
                "collection name '{}' exceeds {} bytes",
                name, MAX_COLLECTION_NAME_LEN
            ));
        }
        let valid = name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'-' | b'_' | b'.'));
        if !valid {
            return Err(format!(
                "invalid collection name '{}': use lower-case letters, digits, '-', '_' or '.'",
                name
            ));
        }
        Ok(Self(name.to_string()))
    }

    /// The default collection synced when none is configured.
    pub fn cve() -> Self {
        Self("cve".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CollectionName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CollectionName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CollectionName> for String {
    fn from(value: CollectionName) -> Self {
        value.0
    }
}

/// Per-collection sync bookkeeping kept next to the cached bulletins.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMeta {
    pub collection: String,
    pub count: u64,
    pub synced_at: Option<DateTime<Utc>>,
}
