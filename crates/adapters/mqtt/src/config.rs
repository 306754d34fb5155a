//! MQTT connection and topic configuration.

use serde::Deserialize;

use toxotes_domain::reconcile::TopicConvention;

/// Configuration for the MQTT publisher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Pause between reconnection attempts, in milliseconds.
    pub reconnect_delay_ms: u64,
    /// Outgoing requests buffered while the broker is unreachable.
    pub request_capacity: usize,
    /// Leading topic segment, before the host id.
    pub command_prefix: String,
    /// Trailing topic segment, after the host id.
    pub command_suffix: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        let topics = TopicConvention::default();
        Self {
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "toxotes".to_string(),
            keep_alive_secs: 30,
            reconnect_delay_ms: 1000,
            request_capacity: 64,
            command_prefix: topics.prefix,
            command_suffix: topics.suffix,
        }
    }
}

impl MqttConfig {
    /// Topic layout used to address things.
    #[must_use]
    pub fn topics(&self) -> TopicConvention {
        TopicConvention {
            prefix: self.command_prefix.clone(),
            suffix: self.command_suffix.clone(),
        }
    }
}
