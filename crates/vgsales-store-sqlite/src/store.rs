//! The SQLite implementation of [`SalesStore`].

use std::path::Path;

use chrono::Utc;
use vgsales_core::{
  import::{FileType, ImportAttempt, InsertCounts, NewImport},
  sale::SaleRecord,
  store::{SaleQuery, SalesStore, StoredSale},
};

use crate::{
  Error, Result,
  encode::{RawAttempt, RawSale, encode_dt},
  ledger, sales,
  schema::{DISTRICTS, SCHEMA},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A sales store backed by a single SQLite file.
///
/// Clones share one connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, creating the schema and seeding the
  /// zone and district reference tables.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Same as [`open`](Self::open) on a private in-memory database.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        sales::seed_zones(conn)?;
        sales::seed_districts(conn, DISTRICTS)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Add configured district names for codes not already present. Returns
  /// how many rows were added.
  pub async fn seed_districts(&self, districts: Vec<(String, String)>) -> Result<usize> {
    let added = self
      .conn
      .call(move |conn| Ok(sales::seed_districts(conn, &districts)?))
      .await?;
    Ok(added)
  }

  /// Number of rows in a reference table (`districts` or `zones`).
  pub async fn reference_count(&self, table: ReferenceTable) -> Result<u64> {
    let sql = match table {
      ReferenceTable::Districts => "SELECT COUNT(*) FROM districts",
      ReferenceTable::Zones => "SELECT COUNT(*) FROM zones",
    };
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |row| row.get(0))?))
      .await?;
    Ok(n.max(0) as u64)
  }
}

/// Static lookup tables seeded at initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceTable {
  Districts,
  Zones,
}

// ─── SalesStore impl ─────────────────────────────────────────────────────────

impl SalesStore for SqliteStore {
  type Error = Error;

  // ── Import ledger ─────────────────────────────────────────────────────────

  async fn is_completed(&self, filename: &str, district_code: &str) -> Result<bool> {
    let filename = filename.to_owned();
    let district_code = district_code.to_owned();
    let done = self
      .conn
      .call(move |conn| Ok(ledger::is_completed(conn, &filename, &district_code)?))
      .await?;
    Ok(done)
  }

  async fn find_attempt(
    &self,
    filename: &str,
    district_code: &str,
  ) -> Result<Option<ImportAttempt>> {
    let filename = filename.to_owned();
    let district_code = district_code.to_owned();
    let raw: Option<RawAttempt> = self
      .conn
      .call(move |conn| Ok(ledger::find(conn, &filename, &district_code)?))
      .await?;
    raw.map(RawAttempt::into_attempt).transpose()
  }

  async fn begin_import(&self, input: NewImport) -> Result<i64> {
    let started_at = encode_dt(Utc::now());
    let id = self
      .conn
      .call(move |conn| Ok(ledger::begin(conn, &input, &started_at)?))
      .await?;
    Ok(id)
  }

  async fn complete_import(&self, attempt_id: i64, counts: InsertCounts) -> Result<()> {
    let completed_at = encode_dt(Utc::now());
    let updated = self
      .conn
      .call(move |conn| Ok(ledger::complete(conn, attempt_id, counts, &completed_at)?))
      .await?;
    if updated == 0 {
      return Err(Error::AttemptNotFound(attempt_id));
    }
    Ok(())
  }

  async fn fail_import(&self, attempt_id: i64, message: String) -> Result<()> {
    let completed_at = encode_dt(Utc::now());
    let updated = self
      .conn
      .call(move |conn| Ok(ledger::fail(conn, attempt_id, &message, &completed_at)?))
      .await?;
    if updated == 0 {
      return Err(Error::AttemptNotFound(attempt_id));
    }
    Ok(())
  }

  async fn get_attempt(&self, attempt_id: i64) -> Result<Option<ImportAttempt>> {
    let raw: Option<RawAttempt> = self
      .conn
      .call(move |conn| Ok(ledger::get(conn, attempt_id)?))
      .await?;
    raw.map(RawAttempt::into_attempt).transpose()
  }

  async fn list_attempts(&self) -> Result<Vec<ImportAttempt>> {
    let raws: Vec<RawAttempt> = self
      .conn
      .call(|conn| Ok(ledger::list(conn)?))
      .await?;
    raws.into_iter().map(RawAttempt::into_attempt).collect()
  }

  // ── Sales ─────────────────────────────────────────────────────────────────

  async fn insert_sales(
    &self,
    file_type: FileType,
    records: Vec<SaleRecord>,
  ) -> Result<InsertCounts> {
    let imported_at = encode_dt(Utc::now());
    let counts = self
      .conn
      .call(move |conn| Ok(sales::insert_batch(conn, file_type, &records, &imported_at)?))
      .await?;
    Ok(counts)
  }

  async fn count_sales(&self) -> Result<u64> {
    let n = self
      .conn
      .call(|conn| Ok(sales::count(conn)?))
      .await?;
    Ok(n.max(0) as u64)
  }

  async fn query_sales(&self, query: &SaleQuery) -> Result<Vec<StoredSale>> {
    let query = query.clone();
    let raws: Vec<RawSale> = self
      .conn
      .call(move |conn| Ok(sales::query(conn, &query)?))
      .await?;
    raws.into_iter().map(RawSale::into_stored).collect()
  }
}
