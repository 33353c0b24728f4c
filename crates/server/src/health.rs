use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::app::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub rates: HealthCheck,
    pub delivery: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let delivery = delivery_check(&state);
    let ready = delivery.status != "misconfigured";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "milesquote-server runtime initialized".to_string(),
        },
        rates: HealthCheck {
            status: "ready",
            detail: format!("{} airlines loaded", state.rates.len()),
        },
        delivery,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn delivery_check(state: &AppState) -> HealthCheck {
    let channel = state.submitter.channel().as_str();
    if state.submitter.lacks_sales_destination() {
        HealthCheck {
            status: "misconfigured",
            detail: "recipient = \"sales\" but delivery.messaging.default_recipient is unset"
                .to_string(),
        }
    } else if state.submitter.is_simulated() {
        HealthCheck { status: "simulated", detail: format!("{channel} delivery is simulated") }
    } else {
        HealthCheck { status: "ready", detail: format!("{channel} delivery configured") }
    }
}
