//! MQTT alert publisher

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::AlertRelay;
use crate::config::MqttConfig;
use crate::error::{DashSrvError, Result};

const REQUEST_CAPACITY: usize = 64;
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

pub(crate) fn qos_from_level(level: u8) -> QoS {
    match level {
        0 => QoS::AtMostOnce,
        2 => QoS::ExactlyOnce,
        _ => QoS::AtLeastOnce,
    }
}

/// Publishes alert payloads to a broker
///
/// The rumqttc event loop runs on a background task that tracks connection
/// state and keeps reconnecting until the relay is dropped.
pub struct MqttAlertRelay {
    client: AsyncClient,
    qos: QoS,
    connected: Arc<AtomicBool>,
    event_task: JoinHandle<()>,
}

impl MqttAlertRelay {
    /// Create the client and spawn its event loop; must run inside a tokio runtime
    pub fn start(config: &MqttConfig) -> Self {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs.max(5)));
        options.set_clean_session(true);

        let (client, mut eventloop) = AsyncClient::new(options, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));

        let state = connected.clone();
        let broker = format!("{}:{}", config.host, config.port);
        let event_task = tokio::spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        state.store(true, Ordering::SeqCst);
                        info!(broker = %broker, "MQTT connected");
                    },
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        state.store(false, Ordering::SeqCst);
                        warn!(broker = %broker, "MQTT broker sent disconnect");
                    },
                    Ok(event) => debug!("MQTT event: {:?}", event),
                    Err(e) => {
                        if state.swap(false, Ordering::SeqCst) {
                            error!(broker = %broker, "MQTT connection lost: {}", e);
                        } else {
                            debug!(broker = %broker, "MQTT connect failed: {}", e);
                        }
                        tokio::time::sleep(RECONNECT_DELAY).await;
                    },
                }
            }
        });

        info!(
            host = %config.host,
            port = config.port,
            client_id = %config.client_id,
            "MQTT alert relay started"
        );

        Self {
            client,
            qos: qos_from_level(config.qos),
            connected,
            event_task,
        }
    }
}

impl Drop for MqttAlertRelay {
    fn drop(&mut self) {
        self.event_task.abort();
    }
}

#[async_trait]
impl AlertRelay for MqttAlertRelay {
    fn name(&self) -> &'static str {
        "mqtt"
    }

    async fn relay(&self, topic: &str, payload: Bytes) -> Result<()> {
        if !self.is_connected() {
            return Err(DashSrvError::relay("Broker disconnected"));
        }
        self.client
            .try_publish(topic, self.qos, false, payload.to_vec())
            .map_err(|e| DashSrvError::relay(format!("publish to {topic} failed: {e}")))?;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Send DISCONNECT to the broker and stop the event loop
    async fn shutdown(&self) {
        if let Err(e) = self.client.disconnect().await {
            debug!("MQTT disconnect failed: {}", e);
        }
        self.event_task.abort();
        self.connected.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_qos_mapping() {
        assert_eq!(qos_from_level(0), QoS::AtMostOnce);
        assert_eq!(qos_from_level(1), QoS::AtLeastOnce);
        assert_eq!(qos_from_level(2), QoS::ExactlyOnce);
    }

    #[tokio::test]
    async fn test_unreachable_broker_fails_relay() {
        let config = MqttConfig {
            host: "127.0.0.1".to_string(),
            // nothing listens on the discard port
            port: 9,
            client_id: "dashsrv-test".to_string(),
            qos: 1,
            keep_alive_secs: 5,
        };
        let relay = MqttAlertRelay::start(&config);
        assert!(!relay.is_connected());

        let err = relay
            .relay("x/y/z/alerts", Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashSrvError::Relay(_)));
        relay.shutdown().await;
    }
}
