use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use milesquote_core::RateTable;
use serde::Serialize;

use crate::app::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublicConfigResponse {
    pub sales_contact_number: Option<String>,
    pub continue_url: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/rates", get(rates))
        .route("/api/public-config", get(public_config))
        .with_state(state)
}

pub async fn rates(State(state): State<AppState>) -> Json<RateTable> {
    Json(RateTable::clone(&state.rates))
}

pub async fn public_config(State(state): State<AppState>) -> Json<PublicConfigResponse> {
    Json(PublicConfigResponse {
        sales_contact_number: state.public.sales_contact_number.clone(),
        continue_url: state.public.continue_url.clone(),
    })
}
