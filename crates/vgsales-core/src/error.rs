//! Error types for `vgsales-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown file type: {0:?} (expected \"weekly\" or \"annual\")")]
  UnknownFileType(String),

  #[error("unknown import status: {0:?}")]
  UnknownImportStatus(String),

  #[error("unknown plan type: {0:?}")]
  UnknownPlanType(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
