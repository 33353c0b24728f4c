use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

use super::{DeliveryError, MessageBody, OutboundMessage};

const MAX_DETAIL_CHARS: usize = 300;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, DeliveryError>;
}

/// Client for the hosted messaging Cloud API `/{phone_number_id}/messages` call.
pub struct CloudApiGateway {
    client: Client,
    api_base_url: String,
    phone_number_id: String,
    access_token: SecretString,
}

impl CloudApiGateway {
    pub fn new(
        client: Client,
        api_base_url: impl Into<String>,
        phone_number_id: impl Into<String>,
        access_token: SecretString,
    ) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
            phone_number_id: phone_number_id.into(),
            access_token,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/{}/messages", self.api_base_url.trim_end_matches('/'), self.phone_number_id)
    }
}

pub fn request_body(message: &OutboundMessage) -> Value {
    match &message.body {
        MessageBody::Template { name, language, parameters } => json!({
            "messaging_product": "whatsapp",
            "to": message.to,
            "type": "template",
            "template": {
                "name": name,
                "language": { "code": language },
                "components": [{
                    "type": "body",
                    "parameters": parameters
                        .iter()
                        .map(|text| json!({ "type": "text", "text": text }))
                        .collect::<Vec<_>>(),
                }],
            },
        }),
        MessageBody::Text(text) => json!({
            "messaging_product": "whatsapp",
            "to": message.to,
            "type": "text",
            "text": { "body": text },
        }),
    }
}

fn truncate(detail: &str) -> String {
    if detail.chars().count() <= MAX_DETAIL_CHARS {
        return detail.to_string();
    }
    let mut short: String = detail.chars().take(MAX_DETAIL_CHARS).collect();
    short.push('…');
    short
}

#[async_trait]
impl MessagingGateway for CloudApiGateway {
    async fn send(&self, message: &OutboundMessage) -> Result<SendReceipt, DeliveryError> {
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.access_token.expose_secret())
            .json(&request_body(message))
            .send()
            .await
            .map_err(|error| DeliveryError::Transport(error.to_string()))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(DeliveryError::Rejected { status: status.as_u16(), detail: truncate(&text) });
        }

        let message_id = serde_json::from_str::<Value>(&text).ok().and_then(|payload| {
            payload
                .pointer("/messages/0/id")
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        Ok(SendReceipt { message_id })
    }
}
