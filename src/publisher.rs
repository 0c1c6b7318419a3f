//! Publish service
//!
//! Publishes a single greeting to `PUBLISH_TOPIC_ID` and prints the id the
//! emulator assigned to it.

use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::model::message::PubsubMessage;
use crate::pubsub::Client;
use crate::util::init_log;

pub const GREETING: &str = "Hello, Pub/Sub Emulator!";

/// Connects and publishes [`GREETING`], returning the message id.
pub async fn publish_greeting(config: &Config) -> anyhow::Result<String> {
    let client = Client::connect(config).await?;
    let topic = client.topic(&config.topic_id);
    info!("Publishing to {}", topic.path());

    let id = topic
        .publish(&PubsubMessage::new(GREETING))
        .await
        .with_context(|| format!("publishing to {}", topic.path()))?;
    Ok(id)
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_log(&config.log_level);

    println!("HOST {} | PROJECT {}", config.emulator_host, config.project_id);

    let id = publish_greeting(&config).await?;
    println!("Published message ID: {}", id);
    Ok(())
}
