use std::collections::HashMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A message to publish.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PubsubMessage {
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
}

impl PubsubMessage {
    pub fn new(data: impl Into<Vec<u8>>) -> PubsubMessage {
        Self {
            data: data.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub(crate) fn to_wire(&self) -> WireMessage {
        WireMessage {
            data: STANDARD.encode(&self.data),
            attributes: self.attributes.clone(),
            message_id: None,
            publish_time: None,
        }
    }
}

/// A message delivered by a pull, still waiting for its ack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub ack_id: String,
    pub message_id: String,
    pub data: Vec<u8>,
    pub attributes: HashMap<String, String>,
    pub publish_time: Option<DateTime<Utc>>,
}

impl ReceivedMessage {
    pub fn data_lossy(&self) -> String {
        String::from_utf8_lossy(&self.data).to_string()
    }

    /// Time spent between publish and now, if the emulator stamped the message.
    pub fn latency(&self) -> Option<chrono::Duration> {
        self.publish_time.map(|t| Utc::now() - t)
    }

    pub(crate) fn from_wire(received: WireReceivedMessage) -> Result<ReceivedMessage> {
        let message = received.message;
        Ok(Self {
            ack_id: received.ack_id,
            message_id: message.message_id.unwrap_or_default(),
            data: STANDARD.decode(message.data.as_bytes())?,
            attributes: message.attributes,
            publish_time: message
                .publish_time
                .as_deref()
                .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
                .map(|t| t.with_timezone(&Utc)),
        })
    }
}

// --- REST bodies ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireMessage {
    #[serde(default)]
    pub data: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublishRequest {
    pub messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PublishResponse {
    #[serde(default)]
    pub message_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullRequest {
    pub max_messages: u32,
    pub return_immediately: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireReceivedMessage {
    pub ack_id: String,
    pub message: WireMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PullResponse {
    #[serde(default)]
    pub received_messages: Vec<WireReceivedMessage>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AcknowledgeRequest<'a> {
    pub ack_ids: &'a [String],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ModifyAckDeadlineRequest<'a> {
    pub ack_ids: &'a [String],
    pub ack_deadline_seconds: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outgoing_message_is_base64_encoded() {
        let msg = PubsubMessage::new("Hello, Pub/Sub Emulator!");
        let wire = serde_json::to_value(msg.to_wire()).unwrap();
        assert_eq!(wire, json!({ "data": "SGVsbG8sIFB1Yi9TdWIgRW11bGF0b3Ih" }));
    }

    #[test]
    fn attributes_are_kept_on_the_wire() {
        let msg = PubsubMessage::new(b"x".to_vec()).with_attribute("origin", "users-service");
        let wire = serde_json::to_value(msg.to_wire()).unwrap();
        assert_eq!(wire["attributes"]["origin"], "users-service");
    }

    #[test]
    fn pull_reply_decodes() {
        let reply: PullResponse = serde_json::from_value(json!({
            "receivedMessages": [{
                "ackId": "projects/p/subscriptions/s:1",
                "message": {
                    "data": "aGk=",
                    "messageId": "7",
                    "publishTime": "2024-05-01T10:00:00.123Z"
                }
            }]
        }))
        .unwrap();
        let msg = ReceivedMessage::from_wire(reply.received_messages.into_iter().next().unwrap())
            .unwrap();
        assert_eq!(msg.data_lossy(), "hi");
        assert_eq!(msg.message_id, "7");
        assert_eq!(msg.ack_id, "projects/p/subscriptions/s:1");
        assert!(msg.publish_time.is_some());
        assert!(msg.latency().unwrap() > chrono::Duration::zero());
    }

    #[test]
    fn empty_pull_reply_has_no_messages() {
        let reply: PullResponse = serde_json::from_str("{}").unwrap();
        assert!(reply.received_messages.is_empty());
    }

    #[test]
    fn malformed_data_is_an_error() {
        let received = WireReceivedMessage {
            ack_id: "a".into(),
            message: WireMessage {
                data: "not base64!".into(),
                attributes: HashMap::new(),
                message_id: None,
                publish_time: None,
            },
        };
        assert!(ReceivedMessage::from_wire(received).is_err());
    }
}
