//! Shared application state for axum handlers.

use std::sync::Arc;

use toxotes_app::ports::{CommandPublisher, ThingRepository};
use toxotes_app::services::relay_service::RelayService;
use toxotes_app::status_board::InProcessStatusBoard;

/// Relay service reporting to the in-process status board.
pub type BoardRelayService<R, P> = RelayService<R, P, Arc<InProcessStatusBoard>>;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`, only the `Arc` wrappers are cloned.
pub struct AppState<R, P> {
    /// Relay command pipeline.
    pub relay_service: Arc<BoardRelayService<R, P>>,
    /// Latest status and its subscribers.
    pub status_board: Arc<InProcessStatusBoard>,
}

impl<R, P> Clone for AppState<R, P> {
    fn clone(&self) -> Self {
        Self {
            relay_service: Arc::clone(&self.relay_service),
            status_board: Arc::clone(&self.status_board),
        }
    }
}

impl<R, P> AppState<R, P>
where
    R: ThingRepository + Send + Sync + 'static,
    P: CommandPublisher + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc`s.
    ///
    /// The board must be the one the service reports to.
    pub fn new(
        relay_service: Arc<BoardRelayService<R, P>>,
        status_board: Arc<InProcessStatusBoard>,
    ) -> Self {
        Self {
            relay_service,
            status_board,
        }
    }
}
