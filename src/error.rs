use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PinError {
    #[error("Numbering scheme not initialized")]
    NotInitialized,
    #[error("Invalid pin: {0}")]
    InvalidPin(u8),
    #[error("Invalid pin state: {0}")]
    InvalidPinState(String),
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("Hardware fault: {0}")]
    HardwareFault(String),
    #[error("Unknown pin: {0}")]
    UnknownPin(u8),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ResponseError for PinError {
    fn status_code(&self) -> StatusCode {
        match self {
            PinError::InvalidPin(_) | PinError::UnknownPin(_) => StatusCode::NOT_FOUND,
            PinError::InvalidPinState(_)
            | PinError::UnsupportedOperation(_)
            | PinError::InvalidValue(_) => StatusCode::BAD_REQUEST,
            PinError::NotInitialized => StatusCode::SERVICE_UNAVAILABLE,
            PinError::HardwareFault(_) | PinError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
