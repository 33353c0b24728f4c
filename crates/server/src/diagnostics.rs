use std::collections::BTreeMap;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use milesquote_core::config::{AppConfig, DeliveryStrategy};
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::app::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingStatus {
    Configured,
    Missing,
}

impl SettingStatus {
    fn of(present: bool) -> Self {
        if present {
            Self::Configured
        } else {
            Self::Missing
        }
    }
}

/// Presence of delivery settings, never their values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    pub delivery_strategy: DeliveryStrategy,
    pub simulated: bool,
    pub settings: BTreeMap<&'static str, SettingStatus>,
}

impl Default for DiagnosticsReport {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl DiagnosticsReport {
    pub fn from_config(config: &AppConfig) -> Self {
        let messaging = &config.delivery.messaging;
        let token = messaging
            .access_token
            .as_ref()
            .is_some_and(|token| !token.expose_secret().trim().is_empty());

        let settings = BTreeMap::from([
            ("messaging.access_token", SettingStatus::of(token)),
            ("messaging.phone_number_id", SettingStatus::of(messaging.phone_number_id.is_some())),
            (
                "messaging.default_recipient",
                SettingStatus::of(messaging.default_recipient.is_some()),
            ),
            ("webhook.url", SettingStatus::of(config.delivery.webhook.url.is_some())),
            (
                "public.sales_contact_number",
                SettingStatus::of(config.public.sales_contact_number.is_some()),
            ),
            ("public.continue_url", SettingStatus::of(config.public.continue_url.is_some())),
        ]);

        let simulated = match config.delivery.strategy {
            DeliveryStrategy::Messaging => !messaging.has_credentials(),
            DeliveryStrategy::Webhook => config.delivery.webhook.url.is_none(),
        };

        Self { delivery_strategy: config.delivery.strategy, simulated, settings }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/api/diagnostics", get(diagnostics)).with_state(state)
}

pub async fn diagnostics(State(state): State<AppState>) -> Json<DiagnosticsReport> {
    Json(state.diagnostics.clone())
}
