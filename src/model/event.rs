use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A domain event headed for a notification topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: Uuid,
    pub event_type: String,
    pub payload: Value,
}

impl Event {
    pub fn new(event_type: impl Into<String>, payload: Value) -> Event {
        Self {
            id: Uuid::new_v4(),
            event_type: event_type.into(),
            payload,
        }
    }

    /// JSON body published for this event: `{"type": ..., "payload": ...}`.
    pub fn envelope(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&Envelope {
            event_type: &self.event_type,
            payload: &self.payload,
        })
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    #[serde(rename = "type")]
    event_type: &'a str,
    payload: &'a Value,
}
