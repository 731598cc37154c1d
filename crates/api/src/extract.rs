//! Request extractors and helpers shared by handlers.
//!
//! - [`JsonBody`] -- a lenient JSON body: an empty body reads as `{}`, a
//!   malformed one is rejected with 400.
//! - [`header_map_to_json`] -- request headers as a flat name/value map,
//!   minus [`GATEWAY_EVENT_HEADER`].

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::HeaderMap;
use serde_json::Value;

use crate::error::AppError;

/// Header injected by API gateways in front of the service. Never echoed or
/// stored.
pub const GATEWAY_EVENT_HEADER: &str = "x-apigateway-event";

/// JSON request body that tolerates a missing body.
///
/// An empty (or all-whitespace) body yields an empty object instead of a
/// rejection. The content type is not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Value::Object(Default::default())));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {e}")))
    }
}

/// Flatten request headers into `name -> value`.
///
/// Names are lower-case (as stored by `http`). Repeated headers are joined
/// with `", "`; non-UTF-8 bytes are replaced lossily.
pub fn header_map_to_json(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        if name.as_str() == GATEWAY_EVENT_HEADER {
            continue;
        }
        let value = String::from_utf8_lossy(value.as_bytes());
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    map
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::HeaderValue;
    use serde_json::json;

    use super::*;

    async fn extract(body: &'static str) -> Result<JsonBody, AppError> {
        let req = Request::builder().body(Body::from(body)).unwrap();
        JsonBody::from_request(req, &()).await
    }

    #[tokio::test]
    async fn empty_body_reads_as_empty_object() {
        assert_eq!(extract("").await.unwrap(), JsonBody(json!({})));
        assert_eq!(extract("  \n").await.unwrap(), JsonBody(json!({})));
    }

    #[tokio::test]
    async fn json_body_is_parsed() {
        assert_eq!(extract(r#"{"k1":"v1"}"#).await.unwrap(), JsonBody(json!({"k1": "v1"})));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        assert!(matches!(extract("{oops").await, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn repeated_headers_are_joined() {
        let mut headers = HeaderMap::new();
        headers.append("x-multi", HeaderValue::from_static("a"));
        headers.append("x-multi", HeaderValue::from_static("b"));
        headers.insert("Custom-Header", HeaderValue::from_static("Random-Value-123"));

        let map = header_map_to_json(&headers);

        assert_eq!(map["x-multi"], "a, b");
        assert_eq!(map["custom-header"], "Random-Value-123");
    }

    #[test]
    fn gateway_event_header_is_dropped() {
        let mut headers = HeaderMap::new();
        headers.insert(GATEWAY_EVENT_HEADER, HeaderValue::from_static("{\"huge\":true}"));
        headers.insert("x-kept", HeaderValue::from_static("yes"));

        let map = header_map_to_json(&headers);

        assert!(!map.contains_key(GATEWAY_EVENT_HEADER));
        assert_eq!(map["x-kept"], "yes");
    }
}
