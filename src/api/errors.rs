use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use super::dto::SubmitResponse;
use crate::readings::IngestError;

/// Error type for the JSON read endpoints. Details are logged; the client
/// only sees a generic message.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "Request failed");
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let body = Json(json!({ "error": "internal server error" }));
        (status, body).into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

pub const SUBMIT_OK: &str = "Weather data received and processed successfully";
pub const SUBMIT_STORE_FAILED: &str = "Failed to process weather data";

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::MalformedPayload(_) | IngestError::Validation(_) => StatusCode::BAD_REQUEST,
            IngestError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message for the device. Store failures stay generic.
    pub fn client_message(&self) -> String {
        match self {
            IngestError::MalformedPayload(detail) => {
                format!("Invalid JSON format or data type mismatch: {detail}")
            }
            IngestError::Validation(v) => v.to_string(),
            IngestError::Store(_) => SUBMIT_STORE_FAILED.to_owned(),
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = SubmitResponse::new(false, self.client_message());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        readings::validation::{FieldViolation, ValidationError, ViolationReason},
        store::StoreError,
    };

    #[test]
    fn statuses_follow_error_kind() {
        let malformed = IngestError::MalformedPayload("EOF".into());
        let invalid = IngestError::Validation(ValidationError {
            violations: vec![FieldViolation { field: "token", reason: ViolationReason::Missing }],
        });
        let store = IngestError::Store(StoreError::Unavailable("db down".into()));

        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.status(), StatusCode::INTERNAL_SERVER_ERROR);

        assert!(malformed.client_message().starts_with("Invalid JSON format"));
        assert_eq!(invalid.client_message(), "Validation failed: token: missing");
        assert_eq!(store.client_message(), SUBMIT_STORE_FAILED);
        assert!(!store.client_message().contains("db down"));
    }
}
