//! Callback record naming and content.
//!
//! Each ingested callback is stored as one JSON document named
//! `{timestampMillis}_{correlationId}.json`. The name is the only index, so
//! [`RecordKey`] must round-trip through [`RecordKey::file_name`] and
//! [`RecordKey::parse`].

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// File extension of stored records.
pub const RECORD_EXTENSION: &str = ".json";

/// Longest file name most filesystems accept, in bytes.
pub const MAX_FILE_NAME_BYTES: usize = 255;

/// Longest correlation id whose record name fits in [`MAX_FILE_NAME_BYTES`]
/// for any timestamp (up to 19 digits, `_`, then the extension).
pub const MAX_CORRELATION_ID_BYTES: usize =
    MAX_FILE_NAME_BYTES - 19 - 1 - RECORD_EXTENSION.len();

/// Identity of one stored callback record.
///
/// Ordering is by timestamp first, then correlation id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    /// Creation time in milliseconds since the Unix epoch.
    pub timestamp_millis: i64,
    /// Correlation id taken from the `correlation-context` header.
    pub correlation_id: String,
}

impl RecordKey {
    pub fn new(timestamp_millis: i64, correlation_id: impl Into<String>) -> Self {
        Self {
            timestamp_millis,
            correlation_id: correlation_id.into(),
        }
    }

    /// `{timestampMillis}_{correlationId}.json`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}{RECORD_EXTENSION}",
            self.timestamp_millis, self.correlation_id
        )
    }

    /// Parse a file name back into its key.
    ///
    /// The timestamp is everything before the first `_` and must be a
    /// non-negative integer that maps to a representable date. The
    /// correlation id is the rest of the stem and may itself contain `_`.
    /// Anything else is not a record and yields `None`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(RECORD_EXTENSION)?;
        let (timestamp, correlation_id) = stem.split_once('_')?;

        if timestamp.is_empty()
            || !timestamp.bytes().all(|b| b.is_ascii_digit())
            || correlation_id.is_empty()
        {
            return None;
        }

        let timestamp_millis: i64 = timestamp.parse().ok()?;
        DateTime::from_timestamp_millis(timestamp_millis)?;

        Some(Self::new(timestamp_millis, correlation_id))
    }

    /// The same correlation id, one millisecond later.
    pub fn successor(&self) -> Self {
        Self::new(self.timestamp_millis + 1, self.correlation_id.clone())
    }

    /// Creation time as a UTC datetime.
    pub fn created_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp_millis).unwrap_or_default()
    }

    /// Creation time as ISO-8601 with millisecond precision, e.g.
    /// `2024-01-01T01:23:45.000Z`.
    pub fn iso_timestamp(&self) -> String {
        to_iso8601(self.created_at())
    }
}

/// Format a datetime as ISO-8601 UTC with millisecond precision and a `Z`
/// suffix.
pub fn to_iso8601(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Persisted content of one inbound callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackRecord {
    /// Original request path and query.
    pub url: String,
    /// Request headers, lower-cased names.
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON body (`{}` when the request had none).
    pub body: serde_json::Value,
}
