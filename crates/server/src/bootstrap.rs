use std::sync::Arc;
use std::time::Duration;

use milesquote_core::config::{AppConfig, ConfigError, DeliveryStrategy, LoadOptions};
use milesquote_core::{LeadValidator, RateTable, RateTableCalculator, RateTableError};
use reqwest::Client;
use thiserror::Error;
use tracing::info;

use crate::app::AppState;
use crate::delivery::{
    CloudApiGateway, HttpWebhookSink, LeadMessageComposer, LeadSubmitter, MessageDispatcher,
    MessagingGateway, WebhookSink,
};
use crate::diagnostics::DiagnosticsReport;
use crate::templates::{MessageRenderer, TemplateError};

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("rate table could not be loaded: {0}")]
    Rates(#[from] RateTableError),
    #[error(transparent)]
    Templates(#[from] TemplateError),
    #[error("http client could not be built: {0}")]
    HttpClient(#[source] reqwest::Error),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let rates = RateTable::from_config(&config.rates)?;
    info!(
        event_name = "system.bootstrap.rates_loaded",
        correlation_id = "bootstrap",
        airlines = rates.len(),
        source = rate_source(&config),
        "rate table loaded"
    );

    let timeout = Duration::from_secs(config.delivery.timeout_secs);
    let client = Client::builder().timeout(timeout).build().map_err(BootstrapError::HttpClient)?;
    let messaging = &config.delivery.messaging;
    let renderer =
        MessageRenderer::new(messaging.text_template.as_deref(), config.public.continue_url.clone())?;

    let gateway: Option<Arc<dyn MessagingGateway>> =
        match (&messaging.phone_number_id, &messaging.access_token) {
            (Some(phone_number_id), Some(access_token)) if messaging.has_credentials() => {
                Some(Arc::new(CloudApiGateway::new(
                    client.clone(),
                    messaging.api_base_url.clone(),
                    phone_number_id.clone(),
                    access_token.clone(),
                )))
            }
            _ => None,
        };
    let dispatcher =
        MessageDispatcher::new(gateway, messaging.default_recipient.clone(), timeout);

    let submitter = match config.delivery.strategy {
        DeliveryStrategy::Messaging => LeadSubmitter::Messaging {
            dispatcher: dispatcher.clone(),
            composer: LeadMessageComposer {
                recipient: messaging.recipient,
                message_type: messaging.message_type,
                template_name: messaging.template_name.clone(),
                template_language: messaging.template_language.clone(),
                phone_convention: config.lead.phone_convention,
                country_code: config.lead.country_code.clone(),
                renderer: renderer.clone(),
            },
        },
        DeliveryStrategy::Webhook => {
            let sink: Option<Arc<dyn WebhookSink>> = config
                .delivery
                .webhook
                .url
                .as_ref()
                .map(|url| Arc::new(HttpWebhookSink::new(client.clone(), url.clone())) as Arc<dyn WebhookSink>);
            LeadSubmitter::Webhook { sink, timeout }
        }
    };

    info!(
        event_name = "system.bootstrap.delivery_configured",
        correlation_id = "bootstrap",
        strategy = submitter.channel().as_str(),
        simulated = submitter.is_simulated(),
        phone_convention = config.lead.phone_convention.as_str(),
        "lead delivery configured"
    );

    let state = AppState {
        calculator: Arc::new(RateTableCalculator::new(rates.clone())),
        rates: Arc::new(rates),
        validator: LeadValidator::new(config.validator_settings()),
        submitter,
        dispatcher,
        renderer,
        public: config.public.clone(),
        diagnostics: DiagnosticsReport::from_config(&config),
        manual_send_enabled: messaging.manual_send_enabled,
    };

    Ok(Application { config, state })
}

fn rate_source(config: &AppConfig) -> &'static str {
    if config.rates.file.is_some() {
        "file"
    } else if !config.rates.table.is_empty() {
        "inline"
    } else {
        "builtin"
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use axum::http::StatusCode;
    use milesquote_core::config::{ConfigOverrides, DeliveryStrategy, LoadOptions};
    use serde_json::json;

    use crate::app::router;
    use crate::app::testing::{call, get, post_json};
    use crate::bootstrap::{bootstrap, BootstrapError};

    fn options(overrides: ConfigOverrides) -> LoadOptions {
        LoadOptions {
            config_path: Some("/nonexistent/milesquote.toml".into()),
            require_file: false,
            overrides,
        }
    }

    #[test]
    fn invalid_webhook_url_fails_fast() {
        let result = bootstrap(options(ConfigOverrides {
            webhook_url: Some("ftp://hooks.example.com".to_string()),
            ..ConfigOverrides::default()
        }));

        let message = result.err().expect("error").to_string();
        assert!(message.contains("webhook.url"));
    }

    #[test]
    fn unreadable_rate_file_fails_fast() {
        let result = bootstrap(options(ConfigOverrides {
            rates_file: Some("/nonexistent/rates.json".into()),
            ..ConfigOverrides::default()
        }));

        assert!(matches!(result, Err(BootstrapError::Rates(_))));
    }

    #[test]
    fn messaging_without_credentials_bootstraps_simulated() {
        let app = bootstrap(options(ConfigOverrides {
            delivery_strategy: Some(DeliveryStrategy::Messaging),
            ..ConfigOverrides::default()
        }))
        .expect("bootstrap");

        assert!(app.state.submitter.is_simulated());
        assert!(app.state.diagnostics.simulated);
    }

    #[tokio::test]
    async fn rate_file_drives_served_rates_and_quotes() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"LATAM": 26.5, "Azul": 20}}"#).expect("write rates");

        let app = bootstrap(options(ConfigOverrides {
            rates_file: Some(file.path().to_path_buf()),
            ..ConfigOverrides::default()
        }))
        .expect("bootstrap");
        let app_router = router(app.state);

        let (status, rates) = call(app_router.clone(), get("/api/rates")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rates, json!({ "Azul": 20, "LATAM": 26.5 }));

        let (status, quote) = call(
            app_router,
            post_json(
                "/api/quote",
                json!({
                    "airline": "LATAM",
                    "points": 10000,
                    "phone": "11987654321",
                    "email": "x@example.com",
                    "consent": true
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quote["estimate"], "265.00");
    }
}
