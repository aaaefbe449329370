use crate::config;

/// Startup errors. Every variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("failed to load configuration: {0}")]
  Config(#[from] config::Error),
  #[error("failed to initialize the event store: {0}")]
  Store(#[from] nostr_eventstore::Error),
  #[error("failed to listen for the shutdown signal: {0}")]
  Signal(#[source] std::io::Error),
}
