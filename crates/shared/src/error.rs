use serde_json::Value;
use thiserror::Error;

use crate::protocol::ApiResponse;

/// Failures the relay answers itself instead of passing the downstream reply through.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Payload sem certidao")]
    MissingCertidao { body: Value },
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("{0}")]
    UnreadableBody(String),
    #[error("{0}")]
    Upstream(String),
}

impl RelayError {
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::MethodNotAllowed => 405,
            RelayError::MissingCertidao { .. } | RelayError::UnreadableBody(_) => 400,
            RelayError::PayloadTooLarge => 413,
            RelayError::Upstream(_) => 500,
        }
    }
}

impl From<RelayError> for ApiResponse {
    fn from(value: RelayError) -> Self {
        let response = ApiResponse::failure(value.to_string());
        match value {
            RelayError::MissingCertidao { body } => response.with_body(body),
            RelayError::MethodNotAllowed
            | RelayError::PayloadTooLarge
            | RelayError::UnreadableBody(_)
            | RelayError::Upstream(_) => response,
        }
    }
}
