//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod relay;
pub mod status;
#[allow(clippy::missing_errors_doc)]
pub mod things;

use axum::Router;
use axum::routing::{get, post};

use toxotes_app::ports::{CommandPublisher, ThingRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, P>() -> Router<AppState<R, P>>
where
    R: ThingRepository + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/relay", post(relay::handle::<R, P>))
        .route("/things", get(things::list::<R, P>))
        .route("/status", get(status::latest::<R, P>))
        .route("/status/stream", get(status::stream::<R, P>))
}
