//! JSON REST handler for things.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use toxotes_app::ports::{CommandPublisher, ThingRepository};
use toxotes_domain::thing::Thing;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Thing>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/things`
pub async fn list<R, P>(State(state): State<AppState<R, P>>) -> Result<ListResponse, ApiError>
where
    R: ThingRepository + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let things = state.relay_service.list_things().await?;
    Ok(ListResponse::Ok(Json(things)))
}
