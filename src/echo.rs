//! Echo service
//!
//! Listens on `ECHO_SUBSCRIPTION`, prints every message it receives and
//! acknowledges it. Runs until Ctrl-C.

use std::future::Future;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::model::message::ReceivedMessage;
use crate::pubsub::{Client, Reply};
use crate::util::init_log;

/// Line printed for each received message.
pub fn render(message: &ReceivedMessage) -> String {
    format!("Received message: {}", message.data_lossy())
}

/// Connects, then echoes messages until `shutdown` resolves. Returns how many
/// messages were acknowledged.
pub async fn run<S>(config: &Config, shutdown: S) -> anyhow::Result<u64>
where
    S: Future<Output = ()>,
{
    let client = Client::connect(config).await?;
    let subscription = client.subscription(&config.subscription_id);

    println!("Listening for messages on {}...", subscription.path());

    let acked = subscription
        .subscribe(
            config.max_messages,
            |message| {
                println!("{}", render(message));
                if let Some(latency) = message.latency() {
                    debug!("Message {} latency: {}", message.message_id, latency);
                }
                Reply::Ack
            },
            shutdown,
        )
        .await?;
    Ok(acked)
}

#[tokio::main]
pub async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_log(&config.log_level);

    println!("HOST {} | PROJECT {}", config.emulator_host, config.project_id);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Ctrl-C received, shutting down");
    };

    let acked = run(&config, shutdown).await?;
    info!("Echo service acknowledged {} message(s)", acked);
    Ok(())
}
