use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::model::message::{
    AcknowledgeRequest, ModifyAckDeadlineRequest, PullRequest, PullResponse, ReceivedMessage,
    WireReceivedMessage,
};
use crate::pubsub::Client;

/// Pause after a pull that returned nothing.
const EMPTY_PULL_PAUSE: Duration = Duration::from_millis(250);
/// Pause after a failed pull before trying again.
const PULL_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// What a subscribe handler wants done with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ack,
    /// Make the message available for redelivery right away.
    Nack,
}

#[derive(Debug, Clone)]
pub struct Subscription {
    client: Client,
    path: String,
}

impl Subscription {
    pub(crate) fn new(client: Client, path: String) -> Subscription {
        Subscription { client, path }
    }

    /// Full resource name, `projects/{project}/subscriptions/{subscription}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Pulls up to `max_messages`. The emulator holds the request open for a
    /// while when nothing is pending, so an empty result is normal.
    ///
    /// Fails with `PubsubError::Decode` if any message in the batch carries
    /// malformed data.
    pub async fn pull(&self, max_messages: u32) -> Result<Vec<ReceivedMessage>> {
        self.pull_wire(max_messages)
            .await?
            .into_iter()
            .map(ReceivedMessage::from_wire)
            .collect()
    }

    async fn pull_wire(&self, max_messages: u32) -> Result<Vec<WireReceivedMessage>> {
        let request = PullRequest {
            max_messages,
            return_immediately: false,
        };
        let response: PullResponse = self.client.call(&self.path, "pull", &request).await?;
        Ok(response.received_messages)
    }

    pub async fn acknowledge(&self, ack_ids: &[String]) -> Result<()> {
        if ack_ids.is_empty() {
            return Ok(());
        }

        let _: serde::de::IgnoredAny = self
            .client
            .call(&self.path, "acknowledge", &AcknowledgeRequest { ack_ids })
            .await?;
        Ok(())
    }

    /// Resets the ack deadline of `ack_ids` to zero.
    pub async fn nack(&self, ack_ids: &[String]) -> Result<()> {
        if ack_ids.is_empty() {
            return Ok(());
        }

        let request = ModifyAckDeadlineRequest {
            ack_ids,
            ack_deadline_seconds: 0,
        };
        let _: serde::de::IgnoredAny = self
            .client
            .call(&self.path, "modifyAckDeadline", &request)
            .await?;
        Ok(())
    }

    /// Pulls until `shutdown` resolves, feeding every message to `handler`.
    ///
    /// Acks and nacks are sent once per batch, after the handler has seen
    /// every message in it. Messages whose data cannot be decoded never reach
    /// the handler; they are acked with the batch so they are not redelivered.
    /// Pull failures are logged and retried. Returns the number of messages
    /// the handler acknowledged.
    pub async fn subscribe<F, S>(&self, max_messages: u32, mut handler: F, shutdown: S) -> Result<u64>
    where
        F: FnMut(&ReceivedMessage) -> Reply,
        S: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut acked: u64 = 0;

        loop {
            let pulled = tokio::select! {
                _ = &mut shutdown => break,
                pulled = self.pull_wire(max_messages) => pulled,
            };

            let messages = match pulled {
                Ok(messages) => messages,
                Err(e) => {
                    warn!("Pull from {} failed: {}", self.path, e);
                    if pause(PULL_ERROR_PAUSE, &mut shutdown).await {
                        break;
                    }
                    continue;
                }
            };

            if messages.is_empty() {
                if pause(EMPTY_PULL_PAUSE, &mut shutdown).await {
                    break;
                }
                continue;
            }

            let mut to_ack = Vec::with_capacity(messages.len());
            let mut to_nack = Vec::new();
            let mut discarded = Vec::new();
            for wire in messages {
                let ack_id = wire.ack_id.clone();
                let message = match ReceivedMessage::from_wire(wire) {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Discarding undecodable message {} on {}: {}", ack_id, self.path, e);
                        discarded.push(ack_id);
                        continue;
                    }
                };
                match handler(&message) {
                    Reply::Ack => to_ack.push(message.ack_id),
                    Reply::Nack => to_nack.push(message.ack_id),
                }
            }

            let handled = to_ack.len() as u64;
            to_ack.append(&mut discarded);
            match self.acknowledge(&to_ack).await {
                Ok(()) => acked += handled,
                Err(e) => warn!("Ack of {} message(s) failed: {}", to_ack.len(), e),
            }
            if let Err(e) = self.nack(&to_nack).await {
                warn!("Nack of {} message(s) failed: {}", to_nack.len(), e);
            }
            debug!(
                "Batch done on {}: {} acked, {} nacked",
                self.path,
                to_ack.len(),
                to_nack.len()
            );
        }

        info!("Stopped listening on {} ({} acked)", self.path, acked);
        Ok(acked)
    }
}

/// Sleeps for `duration`; true if `shutdown` fired first.
async fn pause<S>(duration: Duration, shutdown: &mut Pin<&mut S>) -> bool
where
    S: Future<Output = ()>,
{
    tokio::select! {
        _ = shutdown => true,
        _ = sleep(duration) => false,
    }
}
