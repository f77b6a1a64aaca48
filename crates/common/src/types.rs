use std::fmt::Write as _;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Number of characters in the textual form of a [`RecordId`].
pub const RECORD_ID_LEN: usize = 24;

/// Opaque identifier for a stored record.
///
/// Always 24 lowercase hexadecimal characters. Freshly generated ids start
/// with the creation second, so they sort roughly by creation time.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordId(String);

/// Error returned when a string is not a well-formed [`RecordId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid record id {value:?}: expected {RECORD_ID_LEN} hexadecimal characters")]
pub struct InvalidRecordId {
    pub value: String,
}

impl RecordId {
    /// Creates a new record id from the current time and random bytes.
    pub fn new() -> Self {
        let seconds = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or_default();
        let random = Uuid::new_v4();

        let mut id = String::with_capacity(RECORD_ID_LEN);
        let _ = write!(id, "{seconds:08x}");
        for byte in &random.as_bytes()[..8] {
            let _ = write!(id, "{byte:02x}");
        }
        Self(id)
    }

    /// Parses a record id, normalising hex digits to lowercase.
    pub fn parse(value: &str) -> Result<Self, InvalidRecordId> {
        if value.len() != RECORD_ID_LEN || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(InvalidRecordId {
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = InvalidRecordId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RecordId {
    type Error = InvalidRecordId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> Self {
        id.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
