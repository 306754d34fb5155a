//! In-process status board backed by a tokio watch channel.

use tokio::sync::watch;

use toxotes_domain::status::DisplayStatus;

use crate::ports::StatusReporter;

/// Holds the latest [`DisplayStatus`] and notifies subscribers of changes.
///
/// Reporting succeeds even when nobody is subscribed.
pub struct InProcessStatusBoard {
    sender: watch::Sender<DisplayStatus>,
}

impl Default for InProcessStatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl InProcessStatusBoard {
    /// Create a board showing [`DisplayStatus::idle`].
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(DisplayStatus::idle());
        Self { sender }
    }

    /// The most recently reported status.
    #[must_use]
    pub fn latest(&self) -> DisplayStatus {
        self.sender.borrow().clone()
    }

    /// Subscribe to status changes.
    ///
    /// The receiver starts out holding the current status.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DisplayStatus> {
        self.sender.subscribe()
    }
}

impl StatusReporter for InProcessStatusBoard {
    fn report(&self, status: DisplayStatus) {
        self.sender.send_replace(status);
    }
}
