use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::models::ErrorBody;
use crate::data_models::ErrorKind;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{message}")]
    Generation { kind: ErrorKind, message: String },

    #[error("Search error: {0}")]
    SearchProxy(String),
}

impl AppError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::InvalidInput(_) => Some(ErrorKind::InvalidInput),
            AppError::Generation { kind, .. } => Some(*kind),
            AppError::SearchProxy(_) => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::SearchProxy(_) => StatusCode::BAD_GATEWAY,
            _ => match self.kind() {
                Some(kind) => status_for(kind),
                None => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

/// Status code policy for each error kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::BackendError => StatusCode::BAD_GATEWAY,
        ErrorKind::MalformedResponse => StatusCode::BAD_GATEWAY,
        ErrorKind::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}
