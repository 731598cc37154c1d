//! Correlation id extraction from the `correlation-context` header.
//!
//! The header is a flat list of `Key=Value` segments separated by commas (or
//! semicolons), e.g.
//!
//! ```text
//! OrcId=1cb8..._0_4, ActionInstanceId=1cb8..._0_4-4, InstanceId=1cb8..._0_4, CorId=fdae...
//! ```
//!
//! Only a segment whose trimmed key is exactly `InstanceId` counts, so
//! look-alike keys such as `ActionInstanceId` never match. The first
//! `InstanceId` segment wins.

use crate::record::MAX_CORRELATION_ID_BYTES;

/// Header carrying the correlation context.
pub const CORRELATION_HEADER: &str = "correlation-context";

/// Key of the segment holding the correlation id.
pub const INSTANCE_ID_KEY: &str = "InstanceId";

/// Correlation id used when the header is absent or carries no usable id.
pub const EMPTY_CORRELATION_ID: &str = "empty";

/// Find the `InstanceId` value in a correlation-context header value.
///
/// Returns `None` when there is no `InstanceId` segment, or when its value is
/// empty or cannot be used as part of a record file name.
pub fn parse_instance_id(header: &str) -> Option<&str> {
    header
        .split(|c| c == ',' || c == ';')
        .filter_map(|segment| segment.split_once('='))
        .find(|(key, _)| key.trim() == INSTANCE_ID_KEY)
        .map(|(_, value)| value.trim())
        .filter(|value| is_file_name_safe(value))
}

/// Resolve the correlation id for an inbound callback.
///
/// Falls back to [`EMPTY_CORRELATION_ID`] when the header is missing or
/// unparsable. Never fails.
pub fn correlation_id(header: Option<&str>) -> String {
    header
        .and_then(parse_instance_id)
        .unwrap_or(EMPTY_CORRELATION_ID)
        .to_string()
}

/// Whether `value` can be embedded in a record file name as-is.
///
/// Rejects empty values, `.`/`..`, path separators, control characters and
/// values longer than [`MAX_CORRELATION_ID_BYTES`].
pub fn is_file_name_safe(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_CORRELATION_ID_BYTES
        && value != "."
        && value != ".."
        && !value
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
}
