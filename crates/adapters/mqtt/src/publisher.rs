//! rumqttc-backed [`CommandPublisher`].

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::task::AbortHandle;

use toxotes_app::ports::CommandPublisher;
use toxotes_domain::error::ToxotesError;
use toxotes_domain::power::PowerState;
use toxotes_domain::qos::Qos;

use crate::config::MqttConfig;
use crate::error::MqttError;

fn to_mqtt_qos(qos: Qos) -> QoS {
    match qos {
        Qos::AtMostOnce => QoS::AtMostOnce,
        Qos::AtLeastOnce => QoS::AtLeastOnce,
        Qos::ExactlyOnce => QoS::ExactlyOnce,
    }
}

/// Publishes relay commands through a long-lived MQTT connection.
///
/// Publishing only enqueues the request for the event loop. It fails
/// immediately while the broker connection is down, and when the request
/// buffer is full.
pub struct MqttCommandPublisher {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    event_loop: Option<AbortHandle>,
}

impl MqttCommandPublisher {
    /// Create the client and spawn its event loop on the current runtime.
    ///
    /// The connection is established in the background; commands published
    /// before the broker answers fail with [`MqttError::NotConnected`].
    #[must_use]
    pub fn connect(config: &MqttConfig) -> Self {
        let mut options = MqttOptions::new(&config.client_id, &config.broker_host, config.broker_port);
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));

        let (client, eventloop) = AsyncClient::new(options, config.request_capacity.max(1));
        let connected = Arc::new(AtomicBool::new(false));

        let handle = tokio::spawn(drive(
            eventloop,
            Arc::clone(&connected),
            Duration::from_millis(config.reconnect_delay_ms),
        ));
        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            client_id = %config.client_id,
            "MQTT client started"
        );

        Self {
            client,
            connected,
            event_loop: Some(handle.abort_handle()),
        }
    }

    /// Whether the broker acknowledged the current connection.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Disconnect from the broker and stop the event loop.
    pub async fn shutdown(&self) {
        if let Err(err) = self.client.disconnect().await {
            tracing::debug!(error = %err, "MQTT disconnect request not delivered");
        }
        if let Some(handle) = &self.event_loop {
            handle.abort();
        }
        self.connected.store(false, Ordering::Relaxed);
        tracing::info!("MQTT client stopped");
    }
}

async fn drive(mut eventloop: EventLoop, connected: Arc<AtomicBool>, reconnect_delay: Duration) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("MQTT connected");
                connected.store(true, Ordering::Relaxed);
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                connected.store(false, Ordering::Relaxed);
            }
            Ok(_) => {}
            Err(err) => {
                if connected.swap(false, Ordering::Relaxed) {
                    tracing::warn!(error = %err, "MQTT connection lost");
                } else {
                    tracing::debug!(error = %err, "MQTT connection attempt failed");
                }
                tokio::time::sleep(reconnect_delay).await;
            }
        }
    }
}

impl CommandPublisher for MqttCommandPublisher {
    fn publish(
        &self,
        topic: &str,
        payload: PowerState,
        qos: Qos,
        retain: bool,
    ) -> impl Future<Output = Result<(), ToxotesError>> + Send {
        let result: Result<(), MqttError> = if self.is_connected() {
            self.client
                .try_publish(topic, to_mqtt_qos(qos), retain, payload.as_payload())
                .map_err(MqttError::from)
        } else {
            tracing::warn!(%topic, "MQTT client not connected, dropping command");
            Err(MqttError::NotConnected)
        };
        let result = result.map_err(ToxotesError::from);
        async move { result }
    }
}
