//! Error types shared by the handlers and the external service clients.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

/// Failures talking to the image host or the text generator.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} responded with {status}: {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0} returned an empty response")]
    EmptyResponse(&'static str),
}

/// Every handler resolves to `Result<HttpResponse, AppError>`; the error side
/// always renders as `{"success": false, "msg": ...}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("External service error: {0}")]
    External(#[from] ServiceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(msg) | AppError::Unauthorized(msg) | AppError::NotFound(msg) => {
                msg.clone()
            }
            AppError::Database(_) | AppError::Internal(_) => {
                "An internal error occurred".to_string()
            }
            AppError::External(_) => "An external service request failed".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::External(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("Request rejected ({}): {}", status.as_u16(), self);
        }

        HttpResponse::build(status).json(serde_json::json!({
            "success": false,
            "msg": self.client_message()
        }))
    }
}
