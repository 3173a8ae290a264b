//! Error types

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Failures reading or replacing the durable roster/cache documents
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Atomic replace of {path} failed: {source}")]
    Persist {
        path: String,
        #[source]
        source: tempfile::PersistError,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum RadarError {
    #[error("Invalid hardware address: '{0}'")]
    InvalidAddress(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The store lock was poisoned by a panicking writer
    #[error("State lock poisoned")]
    LockPoisoned,

    #[error("Blocking task failed: {0}")]
    Blocking(String),
}

pub type RadarResult<T> = Result<T, RadarError>;

/// Bad input never reaches a handler's error path (ingest skips what it cannot use),
/// so everything surfacing here is a server fault.
impl ResponseError for RadarError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        tracing::error!("Request failed: {}", self);
        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<actix_web::error::BlockingError> for RadarError {
    fn from(err: actix_web::error::BlockingError) -> Self {
        RadarError::Blocking(err.to_string())
    }
}
