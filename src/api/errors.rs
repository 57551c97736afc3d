use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

use crate::api::dtos::ErrorResponse;
use crate::export::ExportError;
use crate::runner::{ErrorKind, RunError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("No result for token {0}; it may have expired or already been downloaded")]
    NotFound(Uuid),

    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Run(e) => e.kind(),
            Self::Export(_) => ErrorKind::Serialization,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::BadRequest(_) => ErrorKind::Validation,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Fetch => StatusCode::BAD_GATEWAY,
            ErrorKind::Extraction => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Serialization => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(kind = self.kind().as_str(), error = %self, "request failed");
        } else {
            warn!(kind = self.kind().as_str(), error = %self, "request rejected");
        }

        let body = ErrorResponse {
            kind: self.kind(),
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
