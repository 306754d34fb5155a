//! JSON REST handler for relay commands.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use toxotes_app::ports::{CommandPublisher, ThingRepository};
use toxotes_app::services::relay_service::InvocationReport;
use toxotes_domain::command::RawCommand;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the relay endpoint.
pub enum HandleResponse {
    Ok(Json<InvocationReport>),
}

impl IntoResponse for HandleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/relay`
///
/// Accepts the inbound message as-is; every field is optional at the JSON
/// level and normalized by the relay service.
pub async fn handle<R, P>(
    State(state): State<AppState<R, P>>,
    Json(raw): Json<RawCommand>,
) -> Result<HandleResponse, ApiError>
where
    R: ThingRepository + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let report = state.relay_service.handle(raw).await?;
    Ok(HandleResponse::Ok(Json(report)))
}
