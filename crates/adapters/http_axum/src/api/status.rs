//! Display status, as a snapshot or as a Server-Sent Events stream.

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::WatchStream;

use toxotes_app::ports::{CommandPublisher, ThingRepository};
use toxotes_domain::status::DisplayStatus;

use crate::state::AppState;

/// `GET /api/status`
pub async fn latest<R, P>(State(state): State<AppState<R, P>>) -> Json<DisplayStatus>
where
    R: ThingRepository + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    Json(state.status_board.latest())
}

/// `GET /api/status/stream`
///
/// Sends the current status first, then one JSON `data:` frame per change.
/// Intermediate values may be skipped when a subscriber is slow; the last
/// one is always delivered.
pub async fn stream<R, P>(
    State(state): State<AppState<R, P>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    R: ThingRepository + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    let status_stream =
        WatchStream::new(state.status_board.subscribe()).filter_map(|status| {
            match serde_json::to_string(&status) {
                Ok(json) => Some(Ok(Event::default().data(json))),
                Err(err) => {
                    tracing::warn!(%err, "failed to serialize status for SSE stream");
                    None
                }
            }
        });

    Sse::new(status_stream).keep_alive(KeepAlive::default())
}
