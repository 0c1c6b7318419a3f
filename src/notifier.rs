//! Publishes user domain events as notifications
//!
//! With Pub/Sub enabled, events are wrapped in a `{"type", "payload"}` JSON
//! envelope and tagged with fixed attributes so consumers can tell where they
//! came from. Only user lifecycle events have a topic; anything else is
//! refused. With Pub/Sub disabled, events are only logged.

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::{PubsubError, Result};
use crate::model::{event::Event, message::PubsubMessage};
use crate::pubsub::{Client, Topic};
use crate::util::init_log;

pub const ORIGIN: &str = "users-service";
pub const SOURCE: &str = "pubsub-notifier";

const USER_EVENTS: [&str; 3] = ["CreateUser", "UpdateUser", "DeleteUser"];

#[derive(Debug, Clone)]
pub enum Notifier {
    /// Publishes to the emulator.
    PubSub { users_topic: Topic },
    /// Writes events to the log, no network involved.
    Log,
}

impl Notifier {
    pub fn pubsub(client: &Client, users_topic: &str) -> Notifier {
        Notifier::PubSub {
            users_topic: client.topic(users_topic),
        }
    }

    pub fn log() -> Notifier {
        Notifier::Log
    }

    fn topic_for(&self, event_type: &str) -> Option<&Topic> {
        match self {
            Notifier::PubSub { users_topic } => {
                USER_EVENTS.contains(&event_type).then_some(users_topic)
            }
            Notifier::Log => None,
        }
    }

    /// Delivers `event`. Returns the message id when it was published, `None`
    /// when it was only logged.
    pub async fn publish(&self, event: &Event) -> Result<Option<String>> {
        if let Notifier::Log = self {
            info!(
                "Published: Type: {} | Payload: {}",
                event.event_type, event.payload
            );
            return Ok(None);
        }

        let Some(topic) = self.topic_for(&event.event_type) else {
            error!("Notifier has no topic for event type {}", event.event_type);
            return Err(PubsubError::UnknownEventType(event.event_type.clone()));
        };

        let message = PubsubMessage::new(event.envelope()?)
            .with_attribute("origin", ORIGIN)
            .with_attribute("source", SOURCE);

        let id = topic.publish(&message).await?;
        debug!(
            "Notifier published event {} ({}) as message {}",
            event.id, event.event_type, id
        );
        Ok(Some(id))
    }
}

/// Parses the optional JSON payload argument; a missing one is `{}`.
pub fn parse_payload(raw: Option<&str>) -> anyhow::Result<Value> {
    match raw {
        Some(raw) => serde_json::from_str(raw).context("payload is not valid JSON"),
        None => Ok(Value::Object(Default::default())),
    }
}

/// Builds the notifier `config` asks for and sends one event through it.
pub async fn send_event(
    config: &Config,
    event_type: &str,
    payload: Option<&str>,
) -> anyhow::Result<(Event, Option<String>)> {
    let event = Event::new(event_type, parse_payload(payload)?);

    let notifier = if config.pubsub_enabled {
        let client = Client::connect(config).await?;
        Notifier::pubsub(&client, &config.topic_id)
    } else {
        Notifier::log()
    };

    let id = notifier
        .publish(&event)
        .await
        .with_context(|| format!("publishing {} event", event.event_type))?;
    Ok((event, id))
}

/// `notify <EventType> [json-payload]`
#[tokio::main]
pub async fn notify(event_type: String, payload: Option<String>) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_log(&config.log_level);

    println!("HOST {} | PROJECT {}", config.emulator_host, config.project_id);

    match send_event(&config, &event_type, payload.as_deref()).await? {
        (event, Some(id)) => println!(
            "Published {} event {} as message ID: {}",
            event.event_type, event.id, id
        ),
        (event, None) => println!(
            "Pub/Sub disabled, logged {} event {}",
            event.event_type, event.id
        ),
    }
    Ok(())
}
