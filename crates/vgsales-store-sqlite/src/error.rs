//! Error type for `vgsales-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] vgsales_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A ledger update named an attempt id with no row.
  #[error("import attempt not found: {0}")]
  AttemptNotFound(i64),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
