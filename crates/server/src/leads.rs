//! Lead endpoints.
//!
//! - `POST /api/quote`   validate and estimate, no delivery
//! - `POST /api/lead`    validate, estimate and deliver
//! - `POST /api/handoff` validate and return a click-to-chat link

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::routing::post;
use axum::{Json, Router};
use milesquote_core::{ApplicationError, Lead, LeadDraft, QuoteResult, ValidLeadInput};
use serde::Serialize;
use tracing::{info, warn};

use crate::app::AppState;
use crate::delivery::{Channel, DeliveryOutcome, DeliveryReport};
use crate::response::{request_id, ApiError};
use crate::templates::chat_link;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuoteResponse {
    pub ok: bool,
    pub airline: String,
    pub points: u64,
    pub estimate: String,
    pub rate: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeadResponse {
    pub ok: bool,
    pub lead_id: String,
    pub estimate: String,
    pub rate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryReport>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HandoffResponse {
    pub ok: bool,
    pub estimate: String,
    pub url: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/quote", post(quote))
        .route("/api/lead", post(submit_lead))
        .route("/api/handoff", post(handoff))
        .with_state(state)
}

fn validated(
    state: &AppState,
    body: Result<Json<LeadDraft>, JsonRejection>,
    correlation_id: &str,
) -> Result<(ValidLeadInput, QuoteResult), ApiError> {
    let Json(draft) = body.map_err(ApiError::malformed_body)?;
    let input = state.validator.validate(&draft, &state.rates).map_err(|error| {
        info!(
            event_name = "lead.validation.rejected",
            correlation_id,
            field = error.field(),
            "lead draft rejected"
        );
        ApiError::from_interface(&ApplicationError::from(error).into_interface(correlation_id))
    })?;
    let quote = state.calculator.quote(input.points, input.airline.as_str());
    Ok((input, quote))
}

pub async fn quote(
    State(state): State<AppState>,
    body: Result<Json<LeadDraft>, JsonRejection>,
) -> Result<Json<QuoteResponse>, ApiError> {
    let correlation_id = request_id();
    let (input, quote) = validated(&state, body, &correlation_id)?;

    Ok(Json(QuoteResponse {
        ok: true,
        airline: input.airline.to_string(),
        points: input.points,
        estimate: quote.display_value().to_string(),
        rate: quote.rate_used.normalize().to_string(),
    }))
}

pub async fn submit_lead(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<LeadDraft>, JsonRejection>,
) -> Result<Json<LeadResponse>, ApiError> {
    let intake_id = request_id();
    let (input, quote) = validated(&state, body, &intake_id)?;
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let lead = Lead::new(input, quote, user_agent);
    let correlation_id = lead.id.to_string();
    let estimate = lead.display_value().to_string();

    info!(
        event_name = "lead.submission.accepted",
        correlation_id = %correlation_id,
        airline = %lead.airline,
        points = lead.points,
        estimate = %estimate,
        channel = state.submitter.channel().as_str(),
        "lead accepted"
    );

    let outcome = state.submitter.submit(&lead).await;
    let delivery = match (&outcome, outcome.channel()) {
        // Webhook results stay internal; the estimate is what the visitor came for.
        (_, Channel::Webhook) => None,
        (DeliveryOutcome::Failed { error, .. }, Channel::Messaging) => {
            warn!(
                event_name = "lead.submission.delivery_failed",
                correlation_id = %correlation_id,
                error = %error,
                "lead accepted but message was not delivered"
            );
            let interface = error.clone().into_application().into_interface(correlation_id);
            return Err(ApiError::from_interface(&interface).with_estimate(estimate));
        }
        (_, Channel::Messaging) => Some(outcome.report()),
    };

    Ok(Json(LeadResponse {
        ok: true,
        lead_id: correlation_id,
        estimate,
        rate: lead.rate.normalize().to_string(),
        delivery,
    }))
}

pub async fn handoff(
    State(state): State<AppState>,
    body: Result<Json<LeadDraft>, JsonRejection>,
) -> Result<Json<HandoffResponse>, ApiError> {
    let correlation_id = request_id();
    let (input, quote) = validated(&state, body, &correlation_id)?;

    let Some(number) = state.public.sales_contact_number.as_deref() else {
        let interface = ApplicationError::Configuration(
            "public.sales_contact_number is not set".to_string(),
        )
        .into_interface(correlation_id);
        return Err(ApiError::from_interface(&interface));
    };

    let lead = Lead::new(input, quote, None);
    let text = state.renderer.render_lead_text(&lead).map_err(|error| {
        let interface =
            ApplicationError::Configuration(error.to_string()).into_interface(&correlation_id);
        ApiError::from_interface(&interface)
    })?;
    let url = chat_link(number, &text).map_err(|error| {
        let interface =
            ApplicationError::Configuration(error.to_string()).into_interface(&correlation_id);
        ApiError::from_interface(&interface)
    })?;

    info!(
        event_name = "lead.handoff.created",
        correlation_id = %correlation_id,
        airline = %lead.airline,
        "click-to-chat link created"
    );

    Ok(Json(HandoffResponse { ok: true, estimate: lead.display_value().to_string(), url }))
}
