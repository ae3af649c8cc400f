//! SQLite backend for the property sales store and its import ledger.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod ledger;
mod sales;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::{DISTRICTS, ZONES};
pub use store::{ReferenceTable, SqliteStore};

#[cfg(test)]
mod tests;
