use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

/// Failures a relay handler can surface to the browser.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Vendor {
        status: Option<u16>,
        message: String,
        details: Option<String>,
    },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Internal server error")]
    Internal(String),
}

/// JSON body returned for every non-streaming failure.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RelayError {
    pub fn validation(message: impl Into<String>) -> Self {
        RelayError::Validation(message.into())
    }

    pub fn vendor(status: Option<u16>, message: impl Into<String>, details: Option<String>) -> Self {
        RelayError::Vendor {
            status,
            message: message.into(),
            details,
        }
    }

    /// A body the extractor refused to read, e.g. over the size limit.
    pub fn rejected_body(error: actix_web::Error) -> Self {
        RelayError::Validation(format!("Request body rejected: {}", error))
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            RelayError::Validation(message) => ErrorEnvelope {
                error: message.clone(),
                details: None,
            },
            RelayError::Vendor { message, details, .. } => ErrorEnvelope {
                error: message.clone(),
                details: details.clone(),
            },
            RelayError::Stream(message) => ErrorEnvelope {
                error: "Stream error".to_string(),
                details: Some(message.clone()),
            },
            RelayError::Internal(message) => ErrorEnvelope {
                error: "Internal server error".to_string(),
                details: if message.is_empty() { None } else { Some(message.clone()) },
            },
        }
    }
}

impl From<reqwest::Error> for RelayError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => RelayError::vendor(
                Some(status.as_u16()),
                "Vendor request failed",
                Some(error.to_string()),
            ),
            // Connection, body and decode failures never reached a vendor verdict.
            None => RelayError::Internal(error.to_string()),
        }
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            // Only forward statuses that actually describe a failure.
            RelayError::Vendor { status, .. } => status
                .and_then(|code| StatusCode::from_u16(code).ok())
                .filter(|code| code.is_client_error() || code.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            RelayError::Stream(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self.envelope())
    }
}

/// Failures on the sign-in boundary.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Sign-in is not configured")]
    NotConfigured,

    #[error("Invalid sign-in callback: {0}")]
    InvalidCallback(String),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Session error: {0}")]
    Session(String),
}

impl ResponseError for IdentityError {
    fn status_code(&self) -> StatusCode {
        match self {
            IdentityError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            IdentityError::InvalidCallback(_) => StatusCode::BAD_REQUEST,
            IdentityError::Provider(_) => StatusCode::BAD_GATEWAY,
            IdentityError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorEnvelope {
            error: self.to_string(),
            details: None,
        })
    }
}
