use std::sync::Arc;

use axum::Router;
use milesquote_core::config::PublicConfig;
use milesquote_core::{LeadValidator, QuoteCalculator, RateTable};

use crate::delivery::{LeadSubmitter, MessageDispatcher};
use crate::diagnostics::DiagnosticsReport;
use crate::templates::MessageRenderer;
use crate::{catalog, diagnostics, health, leads, outbound};

/// Everything a request needs, built once at startup and shared read-only.
#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<RateTable>,
    pub calculator: Arc<dyn QuoteCalculator>,
    pub validator: LeadValidator,
    pub submitter: LeadSubmitter,
    pub dispatcher: MessageDispatcher,
    pub renderer: MessageRenderer,
    pub public: PublicConfig,
    pub diagnostics: DiagnosticsReport,
    pub manual_send_enabled: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(catalog::router(state.clone()))
        .merge(leads::router(state.clone()))
        .merge(outbound::router(state.clone()))
        .merge(diagnostics::router(state.clone()))
        .merge(health::router(state))
}
