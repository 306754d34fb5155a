//! Publisher port — hands hardware commands to the pub/sub broker.

use std::future::Future;

use toxotes_domain::error::ToxotesError;
use toxotes_domain::power::PowerState;
use toxotes_domain::qos::Qos;

/// Sends one relay command to the broker.
pub trait CommandPublisher {
    /// Publish `payload` on `topic`.
    ///
    /// Resolves once the broker client accepted the message; failures are
    /// returned as [`ToxotesError::Publish`].
    fn publish(
        &self,
        topic: &str,
        payload: PowerState,
        qos: Qos,
        retain: bool,
    ) -> impl Future<Output = Result<(), ToxotesError>> + Send;
}

impl<T: CommandPublisher + Send + Sync> CommandPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: &str,
        payload: PowerState,
        qos: Qos,
        retain: bool,
    ) -> impl Future<Output = Result<(), ToxotesError>> + Send {
        (**self).publish(topic, payload, qos, retain)
    }
}
