//! Lead delivery to the external collaborators.
//!
//! A deployment picks exactly one strategy: direct messaging through the
//! gateway, or forwarding the lead to a workflow webhook. Both are bounded by
//! the configured timeout, and neither lets a collaborator failure escape as a
//! panic or an unhandled error.

pub mod gateway;
pub mod webhook;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use milesquote_core::config::{MessageType, RecipientMode};
use milesquote_core::{ApplicationError, Lead, PhoneConvention};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::templates::MessageRenderer;

pub use gateway::{CloudApiGateway, MessagingGateway, SendReceipt};
pub use webhook::{HttpWebhookSink, LeadPayload, WebhookSink};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("collaborator did not answer within {0:?}")]
    Timeout(Duration),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("collaborator rejected the request with status {status}: {detail}")]
    Rejected { status: u16, detail: String },
    #[error("no destination number: pass `to` or set delivery.messaging.default_recipient")]
    MissingDestination,
    #[error("message rendering failed: {0}")]
    Render(String),
}

impl DeliveryError {
    /// Operator-correctable failures, as opposed to transient collaborator ones.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingDestination | Self::Render(_))
    }

    pub fn into_application(self) -> ApplicationError {
        if self.is_configuration() {
            ApplicationError::Configuration(self.to_string())
        } else {
            ApplicationError::Delivery(self.to_string())
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Messaging,
    Webhook,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Messaging => "messaging",
            Self::Webhook => "webhook",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered { channel: Channel, reference: Option<String> },
    Simulated { channel: Channel, reason: String },
    Failed { channel: Channel, error: DeliveryError },
}

impl DeliveryOutcome {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Delivered { channel, .. }
            | Self::Simulated { channel, .. }
            | Self::Failed { channel, .. } => *channel,
        }
    }

    pub fn report(&self) -> DeliveryReport {
        match self {
            Self::Delivered { channel, reference } => DeliveryReport {
                status: "delivered",
                channel: *channel,
                reference: reference.clone(),
                detail: None,
            },
            Self::Simulated { channel, reason } => DeliveryReport {
                status: "simulated",
                channel: *channel,
                reference: None,
                detail: Some(reason.clone()),
            },
            Self::Failed { channel, .. } => DeliveryReport {
                status: "failed",
                channel: *channel,
                reference: None,
                detail: None,
            },
        }
    }
}

/// Visitor-safe summary of a delivery attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub status: &'static str,
    pub channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub to: String,
    pub body: MessageBody,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageBody {
    Template { name: String, language: String, parameters: Vec<String> },
    Text(String),
}

impl MessageBody {
    fn summary(&self) -> String {
        match self {
            Self::Template { name, parameters, .. } => {
                format!("template `{name}` with [{}]", parameters.join(", "))
            }
            Self::Text(text) => text.clone(),
        }
    }
}

pub(crate) async fn bounded<T, F>(timeout: Duration, future: F) -> Result<T, DeliveryError>
where
    F: Future<Output = Result<T, DeliveryError>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(DeliveryError::Timeout(timeout)),
    }
}

/// Sends messages through the gateway, or simulates the send when the
/// deployment has no messaging credentials.
#[derive(Clone)]
pub struct MessageDispatcher {
    gateway: Option<Arc<dyn MessagingGateway>>,
    default_recipient: Option<String>,
    timeout: Duration,
}

impl MessageDispatcher {
    pub fn new(
        gateway: Option<Arc<dyn MessagingGateway>>,
        default_recipient: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self { gateway, default_recipient, timeout }
    }

    pub fn is_simulated(&self) -> bool {
        self.gateway.is_none()
    }

    /// Explicit number first, then the deployment default.
    pub fn resolve_destination(&self, explicit: Option<&str>) -> Result<String, DeliveryError> {
        explicit
            .map(milesquote_core::validation::only_digits)
            .filter(|digits| !digits.is_empty())
            .or_else(|| self.default_recipient.clone())
            .ok_or(DeliveryError::MissingDestination)
    }

    pub async fn dispatch(
        &self,
        explicit_to: Option<&str>,
        body: MessageBody,
        correlation_id: &str,
    ) -> DeliveryOutcome {
        let channel = Channel::Messaging;
        let destination = self.resolve_destination(explicit_to);

        let Some(gateway) = &self.gateway else {
            let to = destination.as_deref().unwrap_or("<unresolved>");
            info!(
                event_name = "lead.delivery.simulated",
                correlation_id,
                to,
                message = %body.summary(),
                "messaging credentials absent; would send message"
            );
            return DeliveryOutcome::Simulated {
                channel,
                reason: "messaging credentials are not configured".to_string(),
            };
        };

        let to = match destination {
            Ok(to) => to,
            Err(error) => {
                warn!(
                    event_name = "lead.delivery.misconfigured",
                    correlation_id,
                    error = %error,
                    "message has no destination"
                );
                return DeliveryOutcome::Failed { channel, error };
            }
        };

        let message = OutboundMessage { to, body };
        match bounded(self.timeout, gateway.send(&message)).await {
            Ok(receipt) => {
                info!(
                    event_name = "lead.delivery.sent",
                    correlation_id,
                    message_id = receipt.message_id.as_deref().unwrap_or("unknown"),
                    "message accepted by gateway"
                );
                DeliveryOutcome::Delivered { channel, reference: receipt.message_id }
            }
            Err(error) => {
                warn!(
                    event_name = "lead.delivery.failed",
                    correlation_id,
                    channel = channel.as_str(),
                    error = %error,
                    "message delivery failed"
                );
                DeliveryOutcome::Failed { channel, error }
            }
        }
    }
}

/// Builds the message a lead produces under the messaging strategy.
#[derive(Clone, Debug)]
pub struct LeadMessageComposer {
    pub recipient: RecipientMode,
    pub message_type: MessageType,
    pub template_name: String,
    pub template_language: String,
    pub phone_convention: PhoneConvention,
    pub country_code: String,
    pub renderer: MessageRenderer,
}

impl LeadMessageComposer {
    /// Number to address, or `None` to fall back to the dispatcher default.
    pub fn recipient_for(&self, lead: &Lead) -> Option<String> {
        match self.recipient {
            RecipientMode::Sales => None,
            RecipientMode::Customer => match self.phone_convention {
                PhoneConvention::Local => Some(format!("{}{}", self.country_code, lead.phone)),
                PhoneConvention::International => Some(lead.phone.clone()),
            },
        }
    }

    pub fn body_for(&self, lead: &Lead) -> Result<MessageBody, DeliveryError> {
        match self.message_type {
            MessageType::Template => Ok(MessageBody::Template {
                name: self.template_name.clone(),
                language: self.template_language.clone(),
                parameters: vec![
                    lead.greeting_name().to_string(),
                    lead.points.to_string(),
                    lead.airline.to_string(),
                    lead.display_value().to_string(),
                ],
            }),
            MessageType::Text => self
                .renderer
                .render_lead_text(lead)
                .map(MessageBody::Text)
                .map_err(|error| DeliveryError::Render(error.to_string())),
        }
    }
}

#[derive(Clone)]
pub enum LeadSubmitter {
    Messaging { dispatcher: MessageDispatcher, composer: LeadMessageComposer },
    Webhook { sink: Option<Arc<dyn WebhookSink>>, timeout: Duration },
}

impl LeadSubmitter {
    pub fn channel(&self) -> Channel {
        match self {
            Self::Messaging { .. } => Channel::Messaging,
            Self::Webhook { .. } => Channel::Webhook,
        }
    }

    pub fn is_simulated(&self) -> bool {
        match self {
            Self::Messaging { dispatcher, .. } => dispatcher.is_simulated(),
            Self::Webhook { sink, .. } => sink.is_none(),
        }
    }

    /// True when every lead would be sent to the sales line but no sales
    /// number is configured, so each send is bound to fail.
    pub fn lacks_sales_destination(&self) -> bool {
        match self {
            Self::Messaging { dispatcher, composer } => {
                !dispatcher.is_simulated()
                    && composer.recipient == RecipientMode::Sales
                    && dispatcher.resolve_destination(None).is_err()
            }
            Self::Webhook { .. } => false,
        }
    }

    pub async fn submit(&self, lead: &Lead) -> DeliveryOutcome {
        let correlation_id = lead.id.to_string();
        match self {
            Self::Messaging { dispatcher, composer } => {
                let body = match composer.body_for(lead) {
                    Ok(body) => body,
                    Err(error) => {
                        warn!(
                            event_name = "lead.delivery.failed",
                            correlation_id = %correlation_id,
                            error = %error,
                            "could not build lead message"
                        );
                        return DeliveryOutcome::Failed { channel: Channel::Messaging, error };
                    }
                };
                let to = composer.recipient_for(lead);
                dispatcher.dispatch(to.as_deref(), body, &correlation_id).await
            }
            Self::Webhook { sink, timeout } => {
                let channel = Channel::Webhook;
                let payload = LeadPayload::from(lead);
                let Some(sink) = sink else {
                    info!(
                        event_name = "lead.delivery.simulated",
                        correlation_id = %correlation_id,
                        airline = %payload.airline,
                        points = payload.points,
                        estimate = %payload.estimate,
                        "webhook url absent; lead logged only"
                    );
                    return DeliveryOutcome::Simulated {
                        channel,
                        reason: "webhook url is not configured".to_string(),
                    };
                };

                match bounded(*timeout, sink.forward(&payload)).await {
                    Ok(()) => {
                        info!(
                            event_name = "lead.delivery.forwarded",
                            correlation_id = %correlation_id,
                            "lead forwarded to webhook"
                        );
                        DeliveryOutcome::Delivered { channel, reference: None }
                    }
                    Err(error) => {
                        warn!(
                            event_name = "lead.delivery.failed",
                            correlation_id = %correlation_id,
                            channel = channel.as_str(),
                            error = %error,
                            "webhook forward failed"
                        );
                        DeliveryOutcome::Failed { channel, error }
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use milesquote_core::config::{MessageType, RecipientMode};
    use milesquote_core::quote::QuoteResult;
    use milesquote_core::rates::AirlineId;
    use milesquote_core::validation::ValidLeadInput;
    use milesquote_core::{ApplicationError, Lead, PhoneConvention};
    use rust_decimal::Decimal;

    use super::testing::{FailingGateway, FailingSink, RecordingGateway, RecordingSink, SlowGateway};
    use super::{
        Channel, DeliveryError, DeliveryOutcome, LeadMessageComposer, LeadSubmitter,
        MessageBody, MessageDispatcher,
    };
    use crate::templates::MessageRenderer;

    fn lead() -> Lead {
        Lead::new(
            ValidLeadInput {
                airline: AirlineId("Smiles".to_string()),
                points: 50_000,
                phone: "11987654321".to_string(),
                email: "bruno@example.com".to_string(),
                consent_given: true,
            },
            QuoteResult { estimated_value: Decimal::from(1050), rate_used: Decimal::from(21) },
            Some("test-agent".to_string()),
        )
    }

    fn composer(recipient: RecipientMode, message_type: MessageType) -> LeadMessageComposer {
        LeadMessageComposer {
            recipient,
            message_type,
            template_name: "cotacao_milhas_aba".to_string(),
            template_language: "pt_BR".to_string(),
            phone_convention: PhoneConvention::Local,
            country_code: "55".to_string(),
            renderer: MessageRenderer::new(None, None).expect("renderer"),
        }
    }

    fn messaging(
        gateway: Option<Arc<dyn super::MessagingGateway>>,
        default_recipient: Option<&str>,
        recipient: RecipientMode,
    ) -> LeadSubmitter {
        LeadSubmitter::Messaging {
            dispatcher: MessageDispatcher::new(
                gateway,
                default_recipient.map(str::to_string),
                Duration::from_millis(200),
            ),
            composer: composer(recipient, MessageType::Template),
        }
    }

    #[tokio::test]
    async fn missing_credentials_simulate_success() {
        let submitter = messaging(None, None, RecipientMode::Customer);

        let outcome = submitter.submit(&lead()).await;

        assert!(matches!(outcome, DeliveryOutcome::Simulated { channel: Channel::Messaging, .. }));
        assert_eq!(outcome.report().status, "simulated");
        assert!(submitter.is_simulated());
    }

    #[tokio::test]
    async fn customer_template_message_carries_quote_parameters() {
        let gateway = Arc::new(RecordingGateway::default());
        let submitter = messaging(Some(gateway.clone()), None, RecipientMode::Customer);

        let outcome = submitter.submit(&lead()).await;

        assert_eq!(
            outcome,
            DeliveryOutcome::Delivered {
                channel: Channel::Messaging,
                reference: Some("wamid.test".to_string())
            }
        );
        let sent = gateway.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "5511987654321");
        assert_eq!(
            sent[0].body,
            MessageBody::Template {
                name: "cotacao_milhas_aba".to_string(),
                language: "pt_BR".to_string(),
                parameters: vec![
                    "bruno".to_string(),
                    "50000".to_string(),
                    "Smiles".to_string(),
                    "1050.00".to_string(),
                ],
            }
        );
    }

    #[tokio::test]
    async fn sales_recipient_uses_default_number() {
        let gateway = Arc::new(RecordingGateway::default());
        let submitter = messaging(Some(gateway.clone()), Some("5511900000000"), RecipientMode::Sales);

        submitter.submit(&lead()).await;

        assert_eq!(gateway.sent()[0].to, "5511900000000");
    }

    #[tokio::test]
    async fn sales_recipient_without_default_is_a_configuration_failure() {
        let gateway = Arc::new(RecordingGateway::default());
        let submitter = messaging(Some(gateway.clone()), None, RecipientMode::Sales);

        let outcome = submitter.submit(&lead()).await;

        let DeliveryOutcome::Failed { error, .. } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(error, DeliveryError::MissingDestination);
        assert!(matches!(error.into_application(), ApplicationError::Configuration(_)));
        assert!(gateway.sent().is_empty());
    }

    #[tokio::test]
    async fn gateway_rejection_is_reported_not_raised() {
        let submitter = messaging(Some(Arc::new(FailingGateway)), None, RecipientMode::Customer);

        let outcome = submitter.submit(&lead()).await;

        let DeliveryOutcome::Failed { error, .. } = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert!(matches!(error, DeliveryError::Rejected { status: 500, .. }));
        assert!(matches!(error.into_application(), ApplicationError::Delivery(_)));
    }

    #[tokio::test]
    async fn slow_gateway_times_out_as_delivery_failure() {
        let submitter = messaging(
            Some(Arc::new(SlowGateway(Duration::from_secs(5)))),
            None,
            RecipientMode::Customer,
        );

        let outcome = submitter.submit(&lead()).await;

        assert!(matches!(
            outcome,
            DeliveryOutcome::Failed { error: DeliveryError::Timeout(_), .. }
        ));
    }

    #[tokio::test]
    async fn text_message_is_rendered_from_template() {
        let gateway = Arc::new(RecordingGateway::default());
        let submitter = LeadSubmitter::Messaging {
            dispatcher: MessageDispatcher::new(
                Some(gateway.clone()),
                None,
                Duration::from_millis(200),
            ),
            composer: composer(RecipientMode::Customer, MessageType::Text),
        };

        submitter.submit(&lead()).await;

        let MessageBody::Text(text) = &gateway.sent()[0].body else {
            panic!("expected text body");
        };
        assert!(text.contains("R$ 1.050,00"));
    }

    #[test]
    fn international_convention_keeps_number_as_typed() {
        let mut composer = composer(RecipientMode::Customer, MessageType::Template);
        composer.phone_convention = PhoneConvention::International;
        let mut lead = lead();
        lead.phone = "5511987654321".to_string();

        assert_eq!(composer.recipient_for(&lead).as_deref(), Some("5511987654321"));
    }

    #[test]
    fn explicit_destination_wins_over_default() {
        let dispatcher =
            MessageDispatcher::new(None, Some("5511900000000".to_string()), Duration::from_secs(1));

        assert_eq!(dispatcher.resolve_destination(Some("+55 (11) 98888-7777")), Ok("5511988887777".to_string()));
        assert_eq!(dispatcher.resolve_destination(Some("  ")), Ok("5511900000000".to_string()));
        assert_eq!(dispatcher.resolve_destination(None), Ok("5511900000000".to_string()));

        let without_default = MessageDispatcher::new(None, None, Duration::from_secs(1));
        assert_eq!(without_default.resolve_destination(None), Err(DeliveryError::MissingDestination));
    }

    #[tokio::test]
    async fn webhook_forward_carries_lead_payload() {
        let sink = Arc::new(RecordingSink::default());
        let submitter =
            LeadSubmitter::Webhook { sink: Some(sink.clone()), timeout: Duration::from_secs(1) };

        let outcome = submitter.submit(&lead()).await;

        assert_eq!(outcome, DeliveryOutcome::Delivered { channel: Channel::Webhook, reference: None });
        let forwarded = sink.forwarded.lock().expect("lock");
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].airline, "Smiles");
        assert_eq!(forwarded[0].estimate, "1050.00");
        assert_eq!(forwarded[0].user_agent.as_deref(), Some("test-agent"));
    }

    #[tokio::test]
    async fn webhook_failure_is_contained() {
        let submitter =
            LeadSubmitter::Webhook { sink: Some(Arc::new(FailingSink)), timeout: Duration::from_secs(1) };

        let outcome = submitter.submit(&lead()).await;

        assert_eq!(outcome.channel(), Channel::Webhook);
        assert_eq!(outcome.report().status, "failed");
    }

    #[tokio::test]
    async fn webhook_without_url_is_simulated() {
        let submitter = LeadSubmitter::Webhook { sink: None, timeout: Duration::from_secs(1) };

        assert!(submitter.is_simulated());
        assert!(matches!(
            submitter.submit(&lead()).await,
            DeliveryOutcome::Simulated { channel: Channel::Webhook, .. }
        ));
    }
}
