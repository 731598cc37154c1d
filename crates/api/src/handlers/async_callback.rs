//! Async-callback registration.
//!
//! The caller gets a receipt immediately. When a `callbackUrl` query
//! parameter is present, the same receipt is POSTed to that URL once the
//! configured delay has elapsed.

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use hookecho_core::receipt::{
    decode_callback_url, new_receipt_id, raw_query_param, CallbackReceipt, CallbackRequest,
    CALLBACK_URL_PARAM,
};
use hookecho_events::DeferredDelivery;

use crate::error::{AppError, AppResult};
use crate::extract::{header_map_to_json, JsonBody};
use crate::state::AppState;

/// POST /api/callback-register?callbackUrl=<percent-encoded url>
///
/// Also mounted at `/api/async-callback`.
pub async fn register_async_callback(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    JsonBody(body): JsonBody,
) -> AppResult<Response> {
    let request = CallbackRequest::from_body(&body)?;
    let status = StatusCode::from_u16(request.response_status())
        .map_err(|e| AppError::BadRequest(format!("Invalid initialStatusCode: {e}")))?;

    let callback_url = query
        .as_deref()
        .and_then(|q| raw_query_param(q, CALLBACK_URL_PARAM))
        .and_then(|raw| match decode_callback_url(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(raw, error = %e, "Ignoring undecodable callbackUrl");
                None
            }
        });

    let receipt = CallbackReceipt::new(
        new_receipt_id(),
        &request,
        header_map_to_json(&headers),
        body,
        callback_url,
    );

    if let Some(url) = receipt.delivery_target() {
        let payload = serde_json::to_value(&receipt)
            .map_err(|e| AppError::InternalError(format!("Receipt serialization failed: {e}")))?;
        state.scheduler.schedule(DeferredDelivery {
            url: url.to_string(),
            payload,
            delay: state.config.callback_delay,
        });
    }

    tracing::info!(
        receipt_id = %receipt.receipt_id,
        status = status.as_u16(),
        scheduled = receipt.delivery_target().is_some(),
        "Async callback registered",
    );

    Ok((status, Json(receipt)).into_response())
}
