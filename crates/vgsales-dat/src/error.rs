//! Error types for the vgsales-dat codec.
//!
//! Only whole-file failures are errors. Malformed lines are reported as
//! [`LineError`](crate::LineError) values inside a successful parse.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to read {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
