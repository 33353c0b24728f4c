use async_trait::async_trait;
use milesquote_core::Lead;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::DeliveryError;

/// JSON document POSTed to the workflow webhook.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadPayload {
    pub lead_id: String,
    pub airline: String,
    pub points: u64,
    pub phone: String,
    pub email: String,
    pub consent: bool,
    pub estimate: String,
    pub rate: String,
    pub submitted_at: String,
    pub user_agent: Option<String>,
}

impl From<&Lead> for LeadPayload {
    fn from(lead: &Lead) -> Self {
        Self {
            lead_id: lead.id.to_string(),
            airline: lead.airline.to_string(),
            points: lead.points,
            phone: lead.phone.clone(),
            email: lead.email.clone(),
            consent: lead.consent_given,
            estimate: lead.display_value().to_string(),
            rate: lead.rate.normalize().to_string(),
            submitted_at: lead.submitted_at.to_rfc3339(),
            user_agent: lead.user_agent.clone(),
        }
    }
}

#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn forward(&self, payload: &LeadPayload) -> Result<(), DeliveryError>;
}

pub struct HttpWebhookSink {
    client: Client,
    url: String,
}

impl HttpWebhookSink {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

#[async_trait]
impl WebhookSink for HttpWebhookSink {
    async fn forward(&self, payload: &LeadPayload) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|error| DeliveryError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Rejected {
                status: status.as_u16(),
                detail: format!("webhook answered {status}"),
            })
        }
    }
}
