use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

use crate::{pagination::PaginationError, storage::StoreError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("session expired or missing; sign in again")]
    Unauthorized,
    #[error("server returned {status}: {message}")]
    Api {
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("session store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("pagination error: {0}")]
    Pagination(#[from] PaginationError),
    #[error("not signed in")]
    NotSignedIn,
}

impl ClientError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        let ApiError { code, message } = ApiError::from_status(status, message);
        ClientError::Api {
            status,
            code,
            message,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::Unauthorized | ClientError::NotSignedIn => ErrorCode::Unauthorized,
            ClientError::Api { code, .. } => *code,
            ClientError::Pagination(_) => ErrorCode::Validation,
            _ => ErrorCode::Internal,
        }
    }
}
