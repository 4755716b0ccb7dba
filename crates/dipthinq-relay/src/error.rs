//! HTTP mapping for relay failures.
//!
//! Every failure leaves the relay as a status code plus an [`ErrorBody`].
//! This is the only place that decides which.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use dipthinq_types::{ChatError, relay::ErrorBody};

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const MISSING_FIELDS: &str = "Message and agentId are required";
pub const INVALID_BODY: &str = "Invalid request body";
pub const MISSING_API_KEY: &str = "Server configuration error: API key not found";
pub const UPSTREAM_FAILED: &str = "Failed to get response from AI service";
pub const UNEXPECTED_FORMAT: &str = "Unexpected response format from AI service";
pub const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ErrorBody) -> Self {
        Self { status, body }
    }

    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, ErrorBody::new(METHOD_NOT_ALLOWED))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.body = self.body.with_model(model);
        self
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::InvalidRequest(msg) => {
                Self::new(StatusCode::BAD_REQUEST, ErrorBody::new(msg))
            }
            ChatError::Config(msg) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(MISSING_API_KEY).with_message(msg),
            ),
            ChatError::Upstream {
                status,
                details,
                message,
            } => Self::new(
                mirrored_status(status),
                ErrorBody::new(UPSTREAM_FAILED)
                    .with_details(details)
                    .with_message(message),
            ),
            ChatError::Relay { status, message } => Self::new(
                mirrored_status(status),
                ErrorBody::new(UPSTREAM_FAILED).with_message(message),
            ),
            ChatError::MalformedUpstreamResponse(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(UNEXPECTED_FORMAT),
            ),
            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody::new(INTERNAL_ERROR).with_message(other.to_string()),
            ),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ChatError::Network(err.to_string()).into()
    }
}

/// The upstream's own status, or 502 when it is not a usable error status.
fn mirrored_status(status: u16) -> StatusCode {
    StatusCode::from_u16(status)
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::BAD_GATEWAY)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
