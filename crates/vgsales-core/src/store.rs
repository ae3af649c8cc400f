//! The `SalesStore` trait and supporting query types.
//!
//! Implemented by storage backends (e.g. `vgsales-store-sqlite`). The
//! ingestion orchestrator depends on this abstraction, not on a concrete
//! backend.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  import::{FileType, ImportAttempt, InsertCounts, NewImport},
  sale::SaleRecord,
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`SalesStore::query_sales`]. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct SaleQuery {
  /// Case-insensitive exact suburb match.
  pub suburb:        Option<String>,
  pub postcode:      Option<String>,
  /// Inclusive lower bound on `contract_date` (`YYYY-MM-DD`).
  pub contract_from: Option<String>,
  /// Inclusive upper bound on `contract_date` (`YYYY-MM-DD`).
  pub contract_to:   Option<String>,
  pub min_price:     Option<i64>,
  pub max_price:     Option<i64>,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

/// A sale as read back from storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSale {
  pub id:        i64,
  pub file_type: FileType,
  #[serde(flatten)]
  pub record:    SaleRecord,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a sales store backend, covering both the sale rows and
/// the import ledger.
///
/// Sale rows are insert-only. The ledger holds one row per
/// `(filename, district_code)` and is updated in place.
pub trait SalesStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Import ledger ─────────────────────────────────────────────────────

  /// Whether `(filename, district_code)` has a `completed` attempt.
  fn is_completed<'a>(
    &'a self,
    filename: &'a str,
    district_code: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// The ledger row for `(filename, district_code)`, if any.
  fn find_attempt<'a>(
    &'a self,
    filename: &'a str,
    district_code: &'a str,
  ) -> impl Future<Output = Result<Option<ImportAttempt>, Self::Error>> + Send + 'a;

  /// Move `(filename, district_code)` to `processing` and return its id.
  ///
  /// Creates the row when absent. When present, resets status, start time,
  /// counters and error so a forced re-run needs no manual cleanup.
  fn begin_import(
    &self,
    input: NewImport,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  /// Mark an attempt `completed` with its final counters.
  fn complete_import(
    &self,
    attempt_id: i64,
    counts: InsertCounts,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Mark an attempt `failed` with the error message.
  fn fail_import(
    &self,
    attempt_id: i64,
    message: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_attempt(
    &self,
    attempt_id: i64,
  ) -> impl Future<Output = Result<Option<ImportAttempt>, Self::Error>> + Send + '_;

  /// All ledger rows ordered by filename, then district.
  fn list_attempts(
    &self,
  ) -> impl Future<Output = Result<Vec<ImportAttempt>, Self::Error>> + Send + '_;

  // ── Sales ─────────────────────────────────────────────────────────────

  /// Insert one file's records with their children in a single transaction.
  ///
  /// Natural-key duplicates count as `skipped`; any other per-record failure
  /// counts as `errors` and leaves sibling records intact. `Err` is reserved
  /// for failures of the transaction itself.
  fn insert_sales(
    &self,
    file_type: FileType,
    sales: Vec<SaleRecord>,
  ) -> impl Future<Output = Result<InsertCounts, Self::Error>> + Send + '_;

  fn count_sales(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Read sales with their children, ordered by contract date then id.
  fn query_sales<'a>(
    &'a self,
    query: &'a SaleQuery,
  ) -> impl Future<Output = Result<Vec<StoredSale>, Self::Error>> + Send + 'a;
}
