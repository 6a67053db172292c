//! Simulated alert relay
//!
//! The simulator endpoint turns a [`ControlMessage`] into a topic and a JSON
//! payload and hands both to an [`AlertRelay`].

mod local;
mod mqtt;

pub use local::LocalAlertRelay;
pub use mqtt::MqttAlertRelay;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::Result;

const TOPIC_PREFIX: &str = "x/y/z";

/// Alert body accepted by the simulator endpoint and forwarded as payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlMessage {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub description: String,
    #[serde(default)]
    pub details: Map<String, Value>,
}

impl ControlMessage {
    pub fn to_payload(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

/// Machine addressed by an alert topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineAddress {
    pub fid: String,
    pub lid: String,
    pub mid: String,
}

/// `x/y/z/facilities/{fid}/lines/{lid}/machines/{mid}/alerts`
pub fn alert_topic(fid: &str, lid: &str, mid: &str) -> String {
    format!("{TOPIC_PREFIX}/facilities/{fid}/lines/{lid}/machines/{mid}/alerts")
}

/// Inverse of [`alert_topic`]; `None` when the topic has another shape
pub fn parse_alert_topic(topic: &str) -> Option<MachineAddress> {
    let rest = topic.strip_prefix(TOPIC_PREFIX)?.strip_prefix('/')?;
    let parts: Vec<&str> = rest.split('/').collect();
    match parts.as_slice() {
        ["facilities", fid, "lines", lid, "machines", mid, "alerts"] => Some(MachineAddress {
            fid: (*fid).to_string(),
            lid: (*lid).to_string(),
            mid: (*mid).to_string(),
        }),
        _ => None,
    }
}

/// Delivery of alert payloads to the alerting subsystem
#[async_trait]
pub trait AlertRelay: Send + Sync {
    /// Short label for logs and health output
    fn name(&self) -> &'static str;

    async fn relay(&self, topic: &str, payload: Bytes) -> Result<()>;

    fn is_connected(&self) -> bool;

    /// Release connections on service shutdown
    async fn shutdown(&self) {}
}

/// Build topic and payload for a machine and relay them
pub async fn forward_alert(
    relay: &dyn AlertRelay,
    fid: &str,
    lid: &str,
    mid: &str,
    message: &ControlMessage,
) -> Result<()> {
    let topic = alert_topic(fid, lid, mid);
    let payload = message.to_payload()?;
    relay.relay(&topic, payload).await?;
    info!(
        topic = %topic,
        relay = relay.name(),
        alert_type = %message.alert_type,
        "Alert relayed"
    );
    Ok(())
}
