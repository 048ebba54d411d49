use crate::api::api_error::APIError;
use crate::api::model::TransferRequest;
use crate::api::server::AppState;
use crate::error::Error;
use crate::xfr::TransferOutcome;
use axum::body::{Body, HttpBody};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Bytes of an `/axfr` request body that are decoded. Anything past this is ignored.
const MAX_REQUEST_BYTES: usize = 1024 * 1024;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/axfr", post(axfr).fallback(not_implemented))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

#[allow(clippy::unused_async)]
async fn not_implemented() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "Not implemented")
}

async fn axfr(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Json<TransferOutcome>, APIError> {
    let body = read_truncated(request.into_body(), MAX_REQUEST_BYTES).await?;
    let payload: TransferRequest = serde_json::from_slice(&body).map_err(Error::InvalidJSON)?;
    let outcome = state.client.transfer(&payload.zone, &payload.master).await;
    Ok(Json(outcome))
}

/// Buffer at most `limit` bytes of `body`, silently dropping the rest. An oversized document
/// is left to fail (or not) as JSON.
async fn read_truncated(mut body: Body, limit: usize) -> Result<Vec<u8>, hyper::Error> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        let room = limit - buf.len();
        buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if buf.len() == limit {
            break;
        }
    }
    Ok(buf)
}
