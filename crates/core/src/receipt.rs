//! Async-callback registration: request parsing and receipt construction.
//!
//! A registration request is answered immediately with a [`CallbackReceipt`].
//! The same receipt is later POSTed to the caller's callback URL, so the
//! serialized shape is part of the external contract:
//!
//! ```text
//! {
//!   "receiptId": "<uuid v4>",
//!   "inputs":  { "headers": {...}, "body": {...}, "callbackUrl": "..." },
//!   "outputs": { "textOutput": ..., "callbackUrl": "...", "actualResultStatus": ... },
//!   "status":  { "status": ... },
//!   "error":   "..."          <- only present for a non-empty errorMessage
//! }
//! ```

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::CoreError;

/// Immediate status when the request does not ask for one.
pub const DEFAULT_INITIAL_STATUS: u16 = 202;

/// Query parameter holding the percent-encoded callback URL.
pub const CALLBACK_URL_PARAM: &str = "callbackUrl";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Recognised fields of a registration body.
///
/// Fields keep the raw JSON value so they can be echoed verbatim. A field that
/// is present with `null` is `Some(Value::Null)`; a missing field is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallbackRequest {
    pub text_input: Option<Value>,
    pub payload_status: Option<Value>,
    pub result_status: Option<Value>,
    pub error_message: Option<Value>,
    pub initial_status_code: Option<u16>,
}

impl CallbackRequest {
    /// Pick the recognised fields out of a request body.
    ///
    /// Non-object bodies carry no fields. `initialStatusCode` must be `null`
    /// or an integer in `200..=599`.
    pub fn from_body(body: &Value) -> Result<Self, CoreError> {
        let Some(fields) = body.as_object() else {
            return Ok(Self::default());
        };

        let initial_status_code = match fields.get("initialStatusCode") {
            None | Some(Value::Null) => None,
            Some(value) => Some(parse_status_code(value)?),
        };

        Ok(Self {
            text_input: fields.get("textInput").cloned(),
            payload_status: fields.get("payloadStatus").cloned(),
            result_status: fields.get("resultStatus").cloned(),
            error_message: fields.get("errorMessage").cloned(),
            initial_status_code,
        })
    }

    /// Status for the synchronous response.
    pub fn response_status(&self) -> u16 {
        self.initial_status_code.unwrap_or(DEFAULT_INITIAL_STATUS)
    }

    /// `resultStatus`, unless absent, `null` or `""`.
    pub fn result_status(&self) -> Option<&Value> {
        non_empty(self.result_status.as_ref())
    }

    /// `errorMessage`, unless absent, `null` or `""`.
    pub fn error_message(&self) -> Option<&Value> {
        non_empty(self.error_message.as_ref())
    }
}

fn non_empty(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    }
}

fn parse_status_code(value: &Value) -> Result<u16, CoreError> {
    value
        .as_u64()
        .and_then(|code| u16::try_from(code).ok())
        .filter(|code| (200..=599).contains(code))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "initialStatusCode must be an integer between 200 and 599, got {value}"
            ))
        })
}

// ---------------------------------------------------------------------------
// Callback URL handling
// ---------------------------------------------------------------------------

/// Percent-decode a raw `callbackUrl` query value.
///
/// Fails on a `%` not followed by two hex digits, or when the decoded bytes
/// are not UTF-8. `+` is kept literally.
pub fn decode_callback_url(raw: &str) -> Result<String, CoreError> {
    let bytes = raw.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(CoreError::Validation(format!(
                    "callbackUrl has malformed percent-encoding at byte {i}"
                )));
            }
        }
    }

    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CoreError::Validation(format!("callbackUrl is not valid UTF-8: {e}")))
}

/// Find a query parameter in a raw (still percent-encoded) query string.
pub fn raw_query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| match pair.split_once('=') {
            Some((key, value)) => Some((key, value)),
            None if !pair.is_empty() => Some((pair, "")),
            None => None,
        })
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}

/// URL the receipt is delivered to: the decoded callback URL, with
/// `&status=<resultStatus>` appended when a result status was requested.
pub fn delivery_url(base: &str, result_status: Option<&Value>) -> String {
    match result_status {
        Some(Value::String(status)) => format!("{base}&status={status}"),
        Some(other) => format!("{base}&status={other}"),
        None => base.to_string(),
    }
}

/// Fresh random receipt id.
pub fn new_receipt_id() -> Uuid {
    Uuid::new_v4()
}

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptInputs {
    pub headers: BTreeMap<String, String>,
    pub body: Value,
    pub callback_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptOutputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_output: Option<Value>,
    pub callback_url: Option<String>,
    /// Always serialized; `null` when no result status was requested.
    pub actual_result_status: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiptStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Value>,
}

/// Synchronous acknowledgement of a registration, and the payload of the
/// deferred delivery.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackReceipt {
    pub receipt_id: Uuid,
    pub inputs: ReceiptInputs,
    pub outputs: ReceiptOutputs,
    pub status: ReceiptStatus,
    /// Omitted entirely (not `null`) unless an error message was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl CallbackReceipt {
    /// Build the receipt for a parsed request.
    ///
    /// `callback_url` is the already-decoded callback URL, if any.
    pub fn new(
        receipt_id: Uuid,
        request: &CallbackRequest,
        headers: BTreeMap<String, String>,
        body: Value,
        callback_url: Option<String>,
    ) -> Self {
        let result_status = request.result_status();
        let output_url = callback_url
            .as_deref()
            .map(|base| delivery_url(base, result_status));

        Self {
            receipt_id,
            inputs: ReceiptInputs {
                headers,
                body,
                callback_url,
            },
            outputs: ReceiptOutputs {
                text_output: request.text_input.clone(),
                callback_url: output_url,
                actual_result_status: result_status.cloned(),
            },
            status: ReceiptStatus {
                status: request.payload_status.clone(),
            },
            error: request.error_message().cloned(),
        }
    }

    /// Where the deferred delivery goes, if anywhere.
    pub fn delivery_target(&self) -> Option<&str> {
        self.outputs.callback_url.as_deref()
    }
}
