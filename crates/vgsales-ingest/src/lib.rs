//! Ingestion pipeline for property sales extracts.
//!
//! Walks a directory of extract files, skips the ones the import ledger has
//! already recorded as completed, parses the rest and loads each file's
//! records in one transaction through any [`SalesStore`] backend.
//!
//! [`SalesStore`]: vgsales_core::store::SalesStore

pub mod config;
pub mod error;
pub mod export;
pub mod orchestrator;

pub use config::IngestConfig;
pub use error::{Error, Result};
pub use orchestrator::{FileOutcome, FileReport, Ingestor, RunReport, UNKNOWN_DISTRICT};
