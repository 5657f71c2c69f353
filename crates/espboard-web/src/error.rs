//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use espboard_core::cores::UnknownCore;
use espboard_core::table::SortParseError;
use tracing::debug;

/// Errors returned by the API handlers.
///
/// Rendered as `{"error": "<message>"}` with the matching status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    UnknownCore(#[from] UnknownCore),

    #[error(transparent)]
    InvalidSort(#[from] SortParseError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::UnknownCore(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidSort(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(%status, error = %self, "Request rejected");
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
