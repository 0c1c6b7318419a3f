//! Error type shared by the pubsub client, the config loader and the notifier.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PubsubError {
    #[error("config error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("emulator replied {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("emulator unreachable after {attempts} attempts")]
    Unreachable { attempts: u32 },

    #[error("publish reply carried no message id")]
    MissingMessageId,

    #[error("malformed message data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown event type: {0}")]
    UnknownEventType(String),
}

pub type Result<T> = std::result::Result<T, PubsubError>;
