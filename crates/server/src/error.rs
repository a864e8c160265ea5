//! Handler error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use contracts::ContractError;
use ingestion::IngestError;

/// Any failure surfaced by a request handler.
///
/// Serialized as `{"erro": "<message>"}`; an invalid sensor key is the
/// caller's mistake (400), everything else is ours (500).
#[derive(Debug)]
pub enum ApiError {
    Contract(ContractError),
    Ingest(IngestError),
}

impl From<ContractError> for ApiError {
    fn from(e: ContractError) -> Self {
        Self::Contract(e)
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        Self::Ingest(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Contract(e) if e.is_client_error() => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Contract(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Ingest(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        if status.is_server_error() {
            error!(error = %message, "request handler failed");
        }

        (status, Json(serde_json::json!({ "erro": message }))).into_response()
    }
}
