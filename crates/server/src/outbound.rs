//! Manual free-text dispatch through the messaging gateway.
//!
//! Disabled unless `delivery.messaging.manual_send_enabled` is set, since it
//! relays arbitrary text to arbitrary numbers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::delivery::{DeliveryOutcome, DeliveryReport, MessageBody};
use crate::response::{request_id, ApiError};

const DEFAULT_PROBE_TEXT: &str = "🚀 Teste enviado via API de mensagens!";
const DEFAULT_POST_TEXT: &str = "Mensagem padrão";

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendMessageResponse {
    pub ok: bool,
    pub to: String,
    pub delivery: DeliveryReport,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/api/messages", get(send_probe).post(send_message)).with_state(state)
}

pub async fn send_probe(
    State(state): State<AppState>,
    Query(request): Query<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    dispatch(&state, request, DEFAULT_PROBE_TEXT).await
}

pub async fn send_message(
    State(state): State<AppState>,
    body: Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let Json(request) = body.map_err(ApiError::malformed_body)?;
    dispatch(&state, request, DEFAULT_POST_TEXT).await
}

async fn dispatch(
    state: &AppState,
    request: SendMessageRequest,
    fallback_text: &str,
) -> Result<Json<SendMessageResponse>, ApiError> {
    if !state.manual_send_enabled {
        return Err(ApiError::not_found("Manual message sending is disabled."));
    }

    let to = state
        .dispatcher
        .resolve_destination(request.to.as_deref())
        .map_err(|_| ApiError::bad_request("Recipient number is required.", Some("to")))?;
    let text = request
        .body
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| fallback_text.to_string());

    let correlation_id = request_id();
    info!(
        event_name = "messages.manual.requested",
        correlation_id = %correlation_id,
        "manual message requested"
    );

    let outcome =
        state.dispatcher.dispatch(Some(&to), MessageBody::Text(text), &correlation_id).await;
    if let DeliveryOutcome::Failed { error, .. } = &outcome {
        let interface = error.clone().into_application().into_interface(correlation_id);
        return Err(ApiError::from_interface(&interface));
    }

    Ok(Json(SendMessageResponse { ok: true, to, delivery: outcome.report() }))
}
