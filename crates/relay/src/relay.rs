use std::future::Future;

use log::{debug, info};
use nostr_eventstore::PostgresBackend;

use crate::{cli::Cli, config::Config, Error};

/// Runs the relay until Ctrl-C (or SIGTERM on unix).
pub async fn run(cli: Cli) -> Result<(), Error> {
  run_until(cli, shutdown_signal()).await
}

///
/// Startup sequence: load the configuration, bring the event store up,
/// keep it open until `shutdown` resolves and release it.
///
/// A configuration failure returns before the event store is touched.
///
pub async fn run_until<F>(cli: Cli, shutdown: F) -> Result<(), Error>
where
  F: Future<Output = Result<(), Error>>,
{
  info!("starting relay...");

  let config = Config::load(&cli.env)?;
  debug!("Loaded configuration from {}: {config:?}", cli.env.display());

  info!("starting internal db service...");
  let mut ndb = start_event_store(&config).await?;

  let result = shutdown.await;
  info!("Shutting down relay");
  ndb.close().await;

  result
}

/// Builds the backend from the configured connection string and initializes it.
pub async fn start_event_store(config: &Config) -> Result<PostgresBackend, Error> {
  info!("Connecting to postgres at {}", config.database_target());

  let mut ndb = PostgresBackend::new(config.connection_string());
  ndb.init().await?;

  Ok(ndb)
}

async fn shutdown_signal() -> Result<(), Error> {
  #[cfg(unix)]
  {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate()).map_err(Error::Signal)?;
    tokio::select! {
      result = tokio::signal::ctrl_c() => result.map_err(Error::Signal)?,
      _ = terminate.recv() => debug!("Received SIGTERM"),
    }
  }

  #[cfg(not(unix))]
  tokio::signal::ctrl_c().await.map_err(Error::Signal)?;

  Ok(())
}
