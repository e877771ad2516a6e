//! HTTP endpoint handlers.
//!
//! These handlers are thin on purpose - the producer endpoint only gates on
//! channel readiness and forwards the payload, and the consumer endpoint only
//! snapshots the buffer. All broker resilience lives in the queue and consume
//! modules.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::consume::DeliveryBuffer;
use crate::queue::{Payload, PublishError, Publisher};

/// Shared state for the producer surface.
#[derive(Clone)]
pub struct ProducerState {
    pub publisher: Publisher,
}

impl ProducerState {
    pub fn new(publisher: Publisher) -> Self {
        Self { publisher }
    }
}

/// Shared state for the consumer surface.
#[derive(Clone)]
pub struct ConsumerState {
    pub buffer: DeliveryBuffer,
}

impl ConsumerState {
    pub fn new(buffer: DeliveryBuffer) -> Self {
        Self { buffer }
    }
}

/// Response for a successfully forwarded payload.
#[derive(Serialize)]
pub struct SendResponse {
    pub status: &'static str,
    pub data: Payload,
}

/// Error body carrying a human-readable detail message.
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Response listing everything received so far.
#[derive(Serialize)]
pub struct MessagesResponse {
    pub received_messages: Vec<Value>,
}

/// `POST /send` - forward a JSON object onto the data queue.
///
/// Returns 503 while no channel is ready; never blocks waiting for the link.
pub async fn send(
    State(state): State<ProducerState>,
    Json(payload): Json<Payload>,
) -> Response {
    match state.publisher.publish(&payload).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SendResponse {
                status: "Message sent",
                data: payload,
            }),
        )
            .into_response(),
        Err(e @ PublishError::NotReady) => {
            warn!("send_rejected_channel_not_ready");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    detail: e.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "send_publish_failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    detail: "failed to publish message".to_string(),
                }),
            )
                .into_response()
        }
    }
}

/// `GET /messages` - everything received so far, in arrival order.
pub async fn messages(State(state): State<ConsumerState>) -> Json<MessagesResponse> {
    Json(MessagesResponse {
        received_messages: state.buffer.snapshot().await,
    })
}
