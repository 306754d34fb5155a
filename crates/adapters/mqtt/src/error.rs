//! MQTT adapter error types.

use toxotes_domain::error::ToxotesError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused the request.
    #[error("{0}")]
    Client(#[from] rumqttc::ClientError),
    /// The broker has not acknowledged a connection.
    #[error("MQTT client not connected")]
    NotConnected,
}

impl From<MqttError> for ToxotesError {
    fn from(err: MqttError) -> Self {
        Self::Publish(Box::new(err))
    }
}
