//! Callback log: ingestion and lookup of webhook-style deliveries.
//!
//! Every POST is stored as one record keyed by creation time and the
//! `InstanceId` from the `correlation-context` header. GETs list all records
//! or the records of one correlation id.

use axum::extract::{OriginalUri, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hookecho_core::age::humanize_age;
use hookecho_core::correlation::{correlation_id, CORRELATION_HEADER};
use hookecho_core::record::CallbackRecord;
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::{header_map_to_json, JsonBody};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedResponse {
    pub file_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub datetime: String,
    pub file_age: String,
    pub file_name: String,
    pub instance_id: String,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedRecord {
    pub id: String,
    pub timestamp: String,
    pub file_name: String,
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub matches: usize,
    pub records: Vec<MatchedRecord>,
}

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// POST /api/callback
pub async fn record_callback(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    JsonBody(body): JsonBody,
) -> AppResult<Response> {
    let file_name = store_callback(&state, uri.to_string(), &headers, body).await?;
    Ok(Json(RecordedResponse { file_name }).into_response())
}

/// POST /api/callback/{status}
///
/// Same as [`record_callback`], answering with `status` when it parses as an
/// HTTP status code (200 otherwise).
pub async fn record_callback_with_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    JsonBody(body): JsonBody,
) -> AppResult<Response> {
    let file_name = store_callback(&state, uri.to_string(), &headers, body).await?;
    let status = parse_status_override(&status).unwrap_or(StatusCode::OK);
    Ok((status, Json(RecordedResponse { file_name })).into_response())
}

async fn store_callback(
    state: &AppState,
    url: String,
    headers: &HeaderMap,
    body: serde_json::Value,
) -> AppResult<String> {
    let header_value = headers
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok());
    let instance_id = correlation_id(header_value);

    let record = CallbackRecord {
        url,
        headers: header_map_to_json(headers),
        body,
    };

    let key = state.store.put(&instance_id, &record).await?;
    let file_name = key.file_name();

    tracing::info!(%file_name, instance_id = %key.correlation_id, "Callback recorded");

    Ok(file_name)
}

/// Parse a route-supplied status override.
pub fn parse_status_override(raw: &str) -> Option<StatusCode> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// GET /api/callback
///
/// Index of every stored record, oldest first.
pub async fn list_callbacks(State(state): State<AppState>) -> AppResult<Json<FileListResponse>> {
    let now = state.clock.now();
    let files = state
        .store
        .list()
        .await?
        .into_iter()
        .map(|key| FileEntry {
            datetime: key.iso_timestamp(),
            file_age: humanize_age(key.created_at(), now),
            file_name: key.file_name(),
            instance_id: key.correlation_id,
        })
        .collect();

    Ok(Json(FileListResponse { files }))
}

/// GET /api/callback/{id}
///
/// Records whose correlation id equals `id`. No match is not an error.
pub async fn query_callbacks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<QueryResponse>> {
    let records: Vec<MatchedRecord> = state
        .store
        .query_by_correlation(&id)
        .await?
        .into_iter()
        .map(|stored| MatchedRecord {
            timestamp: stored.key.iso_timestamp(),
            file_name: stored.key.file_name(),
            id: stored.key.correlation_id,
            data: stored.data,
        })
        .collect();

    tracing::debug!(%id, matches = records.len(), "Callback query");

    Ok(Json(QueryResponse {
        matches: records.len(),
        records,
    }))
}
