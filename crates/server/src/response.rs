use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use milesquote_core::InterfaceError;
use serde::Serialize;
use uuid::Uuid;

/// Error envelope shared by every JSON endpoint: `{ "ok": false, "error": ... }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<String>,
    pub correlation_id: String,
}

#[derive(Clone, Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn from_interface(error: &InterfaceError) -> Self {
        let status = match error {
            InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            InterfaceError::Misconfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InterfaceError::DeliveryFailed { .. } => StatusCode::BAD_GATEWAY,
        };
        Self {
            status,
            body: ErrorBody {
                ok: false,
                error: error.user_message().to_string(),
                field: error.field(),
                estimate: None,
                correlation_id: error.correlation_id().to_string(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>, field: Option<&'static str>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                ok: false,
                error: message.into(),
                field,
                estimate: None,
                correlation_id: request_id(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        let mut error = Self::bad_request(message, None);
        error.status = StatusCode::NOT_FOUND;
        error
    }

    pub fn malformed_body(rejection: JsonRejection) -> Self {
        Self::bad_request(format!("Request body is not valid JSON: {}", rejection.body_text()), None)
    }

    /// Keeps the computed estimate visible when only delivery failed.
    pub fn with_estimate(mut self, estimate: impl Into<String>) -> Self {
        self.body.estimate = Some(estimate.into());
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

pub fn request_id() -> String {
    format!("req-{}", Uuid::new_v4())
}
