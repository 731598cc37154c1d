//! Stateless request transformers.
//!
//! Small helpers that let client integrations check connectivity and see
//! exactly what the server received, without touching the callback log.

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::{OriginalUri, Path, Query};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::extract::header_map_to_json;

/// Largest array served by [`integer_array`].
pub const MAX_ARRAY_ELEMENTS: u32 = 100_000;

/// GET /api/hello
pub async fn hello() -> Json<Value> {
    Json(json!({ "hello": "world" }))
}

/// ANY /api/echo
pub async fn echo(
    method: Method,
    OriginalUri(uri): OriginalUri,
    Query(qs): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    Json(echo_document(&method, &uri.to_string(), qs, &headers, &body)).into_response()
}

/// ANY /api/echo/{status}
///
/// Echo answering with `status`; an unparsable status is a 400.
pub async fn echo_with_status(
    method: Method,
    Path(status): Path<String>,
    OriginalUri(uri): OriginalUri,
    Query(qs): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Response> {
    let status = status
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| AppError::BadRequest(format!("Invalid status code: {status}")))?;

    let document = echo_document(&method, &uri.to_string(), qs, &headers, &body);
    Ok((status, Json(document)).into_response())
}

fn echo_document(
    method: &Method,
    original_url: &str,
    qs: BTreeMap<String, String>,
    headers: &HeaderMap,
    body: &[u8],
) -> Value {
    let mut document = json!({
        "echo-method": method.as_str(),
        "echo-headers": header_map_to_json(headers),
        "echo-qs": qs,
        "echo-originalurl": original_url,
        "echo-body": echo_body(body),
    });

    if let Some(content_type) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
        document["echo-body-content-type"] = Value::String(content_type.to_string());
    }

    document
}

/// JSON bodies are echoed parsed, anything else as text, nothing as `{}`.
fn echo_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return json!({});
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[derive(Debug, Deserialize)]
pub struct IntegerArrayParams {
    pub elements: Option<u32>,
}

/// GET /api/data/array/integer?elements=N
///
/// Returns `[1, 2, ..., N]`.
pub async fn integer_array(Query(params): Query<IntegerArrayParams>) -> AppResult<Json<Vec<u32>>> {
    let count = params
        .elements
        .ok_or_else(|| AppError::BadRequest("elements query parameter is required".into()))?;

    if count > MAX_ARRAY_ELEMENTS {
        return Err(AppError::BadRequest(format!(
            "elements must be at most {MAX_ARRAY_ELEMENTS}"
        )));
    }

    Ok(Json((1..=count).collect()))
}
