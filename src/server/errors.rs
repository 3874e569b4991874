use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::orchestrator::OrchestrateError;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Orchestrate(#[from] OrchestrateError),
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let ConvertError::Orchestrate(inner) = self;
        let (status, message) = match &inner {
            OrchestrateError::ChapterNotFound(_) => (StatusCode::NOT_FOUND, inner.to_string()),
            OrchestrateError::Route(_) => (StatusCode::BAD_REQUEST, inner.to_string()),
            OrchestrateError::Browser(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, inner.to_string())
            }
        };
        error!(status = %status, %message, "convert request failed");
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
