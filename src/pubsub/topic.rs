use tracing::debug;

use crate::error::{PubsubError, Result};
use crate::model::message::{PublishRequest, PublishResponse, PubsubMessage};
use crate::pubsub::Client;

/// A topic handle. Cheap to clone, shares the client's connection pool.
#[derive(Debug, Clone)]
pub struct Topic {
    client: Client,
    path: String,
}

impl Topic {
    pub(crate) fn new(client: Client, path: String) -> Topic {
        Topic { client, path }
    }

    /// Full resource name, `projects/{project}/topics/{topic}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Publishes one message and returns the id the server assigned to it.
    pub async fn publish(&self, message: &PubsubMessage) -> Result<String> {
        self.publish_batch(std::slice::from_ref(message))
            .await?
            .into_iter()
            .next()
            .ok_or(PubsubError::MissingMessageId)
    }

    /// Publishes all `messages` in one request. Ids come back in input order.
    pub async fn publish_batch(&self, messages: &[PubsubMessage]) -> Result<Vec<String>> {
        let request = PublishRequest {
            messages: messages.iter().map(PubsubMessage::to_wire).collect(),
        };
        let response: PublishResponse = self.client.call(&self.path, "publish", &request).await?;

        if response.message_ids.len() < messages.len() {
            return Err(PubsubError::MissingMessageId);
        }
        debug!("Published {} message(s) to {}", messages.len(), self.path);

        Ok(response.message_ids)
    }
}
