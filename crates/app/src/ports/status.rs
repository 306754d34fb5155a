//! Status port — where display status updates go.

use toxotes_domain::status::DisplayStatus;

/// Receives the status line produced by each invocation.
pub trait StatusReporter {
    fn report(&self, status: DisplayStatus);
}

impl<T: StatusReporter> StatusReporter for std::sync::Arc<T> {
    fn report(&self, status: DisplayStatus) {
        (**self).report(status);
    }
}
