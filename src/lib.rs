pub mod config;
pub mod echo;
pub mod error;
pub mod model;
pub mod notifier;
pub mod publisher;
pub mod pubsub;
pub mod util;

pub use config::Config;
pub use error::PubsubError;
pub use pubsub::{Client, Reply, Subscription, Topic};
