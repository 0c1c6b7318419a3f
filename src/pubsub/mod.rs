//! Client for the Pub/Sub emulator's REST surface
//!
//! The emulator speaks the same `v1` JSON API as the managed service, without
//! authentication. [`Client`] owns the HTTP connection pool and hands out
//! [`Topic`] and [`Subscription`] handles that share it.

use std::time::Duration;

use reqwest::Response;
use serde::{de::DeserializeOwned, Serialize};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{PubsubError, Result};

pub mod subscription;
pub mod topic;

pub use subscription::{Reply, Subscription};
pub use topic::Topic;

const PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
}

impl Client {
    /// Builds a client without touching the network.
    pub fn new(base_url: impl Into<String>, project_id: impl Into<String>) -> Result<Client> {
        // The emulator is always reached directly.
        let http = reqwest::Client::builder().no_proxy().build()?;
        Ok(Client {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
        })
    }

    /// Builds a client from `config` and waits for the emulator to answer.
    ///
    /// Pings up to `conn_attempts` times, pausing `conn_timeout` after each
    /// failure.
    pub async fn connect(config: &Config) -> Result<Client> {
        let client = Client::new(config.emulator_url(), &config.project_id)?;

        let mut attempts_left = config.conn_attempts;
        while attempts_left > 0 {
            if client.ping().await {
                info!("Connected to Pub/Sub emulator at {}", client.base_url);
                return Ok(client);
            }

            attempts_left -= 1;
            warn!(
                "PubSub is trying to connect, attempts left: {}",
                attempts_left
            );
            if attempts_left > 0 {
                sleep(config.conn_timeout).await;
            }
        }

        Err(PubsubError::Unreachable {
            attempts: config.conn_attempts,
        })
    }

    /// Returns true if listing the project's topics succeeds.
    pub async fn ping(&self) -> bool {
        let url = format!("{}/v1/projects/{}/topics", self.base_url, self.project_id);
        let result = self
            .http
            .get(&url)
            .query(&[("pageSize", "1")])
            .timeout(PING_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!("Ping {} answered {}", url, response.status());
                false
            }
            Err(e) => {
                debug!("Ping {} failed: {}", url, e);
                false
            }
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn topic_path(&self, topic_id: &str) -> String {
        topic_path(&self.project_id, topic_id)
    }

    pub fn subscription_path(&self, subscription_id: &str) -> String {
        subscription_path(&self.project_id, subscription_id)
    }

    pub fn topic(&self, topic_id: &str) -> Topic {
        Topic::new(self.clone(), self.topic_path(topic_id))
    }

    pub fn subscription(&self, subscription_id: &str) -> Subscription {
        Subscription::new(self.clone(), self.subscription_path(subscription_id))
    }

    /// `POST {base}/v1/{resource}:{action}` with a JSON body.
    pub(crate) async fn call<B, R>(&self, resource: &str, action: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/v1/{}:{}", self.base_url, resource, action);
        debug!("POST {}", url);

        let response = self.http.post(&url).json(body).send().await?;
        let text = check(response).await?.text().await?;

        // Some calls answer with an empty body instead of `{}`.
        let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
        Ok(serde_json::from_str(text)?)
    }
}

pub fn topic_path(project_id: &str, topic_id: &str) -> String {
    format!("projects/{project_id}/topics/{topic_id}")
}

pub fn subscription_path(project_id: &str, subscription_id: &str) -> String {
    format!("projects/{project_id}/subscriptions/{subscription_id}")
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(PubsubError::Status { status, body })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_paths() {
        assert_eq!(
            topic_path("users-project", "users"),
            "projects/users-project/topics/users"
        );
        assert_eq!(
            subscription_path("users-project", "my-subscription"),
            "projects/users-project/subscriptions/my-subscription"
        );
    }

    #[test]
    fn handles_share_the_project() {
        let client = Client::new("http://localhost:8085/", "demo").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8085");
        assert_eq!(client.topic("t").path(), "projects/demo/topics/t");
        assert_eq!(
            client.subscription("s").path(),
            "projects/demo/subscriptions/s"
        );
    }
}
