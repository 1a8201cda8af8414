use crate::server::app::AppState;
use crate::webhook::{StageOutcome, WebhookEvent};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "gitbuild",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Webhook endpoint. Once the pipeline lets a delivery through the answer is always 200.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let event = WebhookEvent::from_parts(&headers, body);

    if let StageOutcome::Respond(response) = state.pipeline.run(&event) {
        return response;
    }

    if let Err(e) = state.trigger.trigger(&event).await {
        warn!(
            "Failed to run build task for delivery {}: {}",
            event.delivery_id, e
        );
    }

    (StatusCode::OK, "accepted").into_response()
}
