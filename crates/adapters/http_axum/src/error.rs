//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use toxotes_domain::error::ToxotesError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ToxotesError`] to an HTTP response with appropriate status code.
pub struct ApiError(ToxotesError);

impl From<ToxotesError> for ApiError {
    fn from(err: ToxotesError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ToxotesError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            ToxotesError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            ToxotesError::Persistence(err) => {
                tracing::debug!(error = %err, "storage error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ToxotesError::Publish(err) => {
                tracing::debug!(error = %err, "publish error");
                (
                    StatusCode::BAD_GATEWAY,
                    "failed to publish relay command".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
