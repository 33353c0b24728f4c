use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("delivery failure: {0}")]
    Delivery(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, field: Option<&'static str>, correlation_id: String },
    #[error("misconfigured: {message}")]
    Misconfigured { message: String, correlation_id: String },
    #[error("delivery failed: {message}")]
    DeliveryFailed { message: String, correlation_id: String },
}

impl InterfaceError {
    /// Message safe to show to the visitor. Validation messages are already
    /// user-facing; operator and upstream details are not.
    pub fn user_message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. } => message.as_str(),
            Self::Misconfigured { .. } => {
                "Lead delivery is not configured. Ask the site operator to configure the messaging channel."
            }
            Self::DeliveryFailed { .. } => {
                "We could not deliver your request right now. Please try again shortly."
            }
        }
    }

    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::BadRequest { field, .. } => *field,
            Self::Misconfigured { .. } | Self::DeliveryFailed { .. } => None,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Misconfigured { correlation_id, .. }
            | Self::DeliveryFailed { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Misconfigured { correlation_id: id, .. }
            | InterfaceError::DeliveryFailed { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Validation(error) => Self::BadRequest {
                message: error.to_string(),
                field: Some(error.field()),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Configuration(message) => {
                Self::Misconfigured { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Delivery(message) => {
                Self::DeliveryFailed { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, InterfaceError};
    use crate::validation::ValidationError;

    #[test]
    fn validation_error_maps_to_bad_request_with_field() {
        let interface =
            ApplicationError::from(ValidationError::ConsentRequired).into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest { ref correlation_id, field: Some("consent"), .. }
                if correlation_id == "req-1"
        ));
        assert_eq!(interface.user_message(), "Consent to data processing is required.");
        assert_eq!(interface.field(), Some("consent"));
    }

    #[test]
    fn configuration_error_hides_operator_detail() {
        let interface = ApplicationError::Configuration(
            "delivery.messaging.default_recipient is not set".to_owned(),
        )
        .into_interface("req-2");

        assert!(matches!(interface, InterfaceError::Misconfigured { .. }));
        assert!(!interface.user_message().contains("default_recipient"));
        assert!(interface.to_string().contains("default_recipient"));
    }

    #[test]
    fn delivery_error_maps_to_delivery_failed() {
        let interface =
            ApplicationError::Delivery("gateway returned 500".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::DeliveryFailed { .. }));
        assert_eq!(interface.correlation_id(), "req-3");
        assert_eq!(
            interface.user_message(),
            "We could not deliver your request right now. Please try again shortly."
        );
        assert_eq!(interface.field(), None);
    }
}
