/// [`crate::PostgresBackend`] error
#[derive(thiserror::Error, Debug)]
pub enum Error {
  #[error(transparent)]
  Database(#[from] sqlx::Error),
  /// Error serializing or deserializing JSON data
  #[error(transparent)]
  Json(#[from] serde_json::Error),
  #[error("storage backend is not initialized")]
  NotInitialized,
  #[error("event already exists")]
  DuplicateEvent,
  #[error("too many ids in filter (max {0})")]
  TooManyIds(usize),
  #[error("too many authors in filter (max {0})")]
  TooManyAuthors(usize),
  #[error("too many kinds in filter (max {0})")]
  TooManyKinds(usize),
  #[error("too many tag values in filter (max {0})")]
  TooManyTagValues(usize),
  #[error("invalid filter: {0}")]
  InvalidFilter(String),
  #[error("kind {0} does not fit the storage column")]
  KindOutOfRange(u64),
  #[error("timestamp {0} does not fit the storage column")]
  TimestampOutOfRange(u64),
  #[error("Invalid data")]
  InvalidData,
}
