//! Import ledger statements.
//!
//! Plain functions over a [`rusqlite::Connection`]; [`SqliteStore`] runs them
//! on the connection thread.
//!
//! [`SqliteStore`]: crate::SqliteStore

use rusqlite::{Connection, OptionalExtension as _, params};
use vgsales_core::import::{InsertCounts, NewImport};

use crate::encode::{ATTEMPT_COLUMNS, RawAttempt, from_count};

pub fn is_completed(
  conn: &Connection,
  filename: &str,
  district_code: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM import_attempts
         WHERE filename = ?1 AND district_code = ?2 AND status = 'completed'",
        params![filename, district_code],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

pub fn find(
  conn: &Connection,
  filename: &str,
  district_code: &str,
) -> rusqlite::Result<Option<RawAttempt>> {
  conn
    .query_row(
      &format!(
        "SELECT {ATTEMPT_COLUMNS} FROM import_attempts
         WHERE filename = ?1 AND district_code = ?2"
      ),
      params![filename, district_code],
      RawAttempt::from_row,
    )
    .optional()
}

pub fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<RawAttempt>> {
  conn
    .query_row(
      &format!("SELECT {ATTEMPT_COLUMNS} FROM import_attempts WHERE id = ?1"),
      params![id],
      RawAttempt::from_row,
    )
    .optional()
}

pub fn list(conn: &Connection) -> rusqlite::Result<Vec<RawAttempt>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {ATTEMPT_COLUMNS} FROM import_attempts ORDER BY filename, district_code"
  ))?;
  stmt
    .query_map([], RawAttempt::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()
}

/// Insert-or-reset to `processing` in one statement.
///
/// Before: no row, or a row in any state. After: exactly one row for the key,
/// `processing`, zeroed counters, no completion time or error.
pub fn begin(conn: &Connection, input: &NewImport, started_at: &str) -> rusqlite::Result<i64> {
  conn.query_row(
    "INSERT INTO import_attempts (
       filename, district_code, file_path, file_type, file_date, content_sha256,
       status, started_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'processing', ?7)
     ON CONFLICT (filename, district_code) DO UPDATE SET
       file_path         = excluded.file_path,
       file_type         = excluded.file_type,
       file_date         = excluded.file_date,
       content_sha256    = excluded.content_sha256,
       status            = 'processing',
       records_processed = 0,
       records_inserted  = 0,
       records_skipped   = 0,
       records_errored   = 0,
       started_at        = excluded.started_at,
       completed_at      = NULL,
       error_message     = NULL
     RETURNING id",
    params![
      input.filename,
      input.district_code,
      input.file_path,
      input.file_type.as_str(),
      input.file_date,
      input.content_sha256,
      started_at,
    ],
    |row| row.get(0),
  )
}

/// Returns the number of rows updated (0 when `id` is unknown).
pub fn complete(
  conn: &Connection,
  id: i64,
  counts: InsertCounts,
  completed_at: &str,
) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE import_attempts SET
       status            = 'completed',
       records_processed = ?2,
       records_inserted  = ?3,
       records_skipped   = ?4,
       records_errored   = ?5,
       completed_at      = ?6,
       error_message     = NULL
     WHERE id = ?1",
    params![
      id,
      from_count(counts.processed),
      from_count(counts.inserted),
      from_count(counts.skipped),
      from_count(counts.errors),
      completed_at,
    ],
  )
}

/// Returns the number of rows updated (0 when `id` is unknown).
pub fn fail(
  conn: &Connection,
  id: i64,
  message: &str,
  completed_at: &str,
) -> rusqlite::Result<usize> {
  conn.execute(
    "UPDATE import_attempts SET
       status        = 'failed',
       completed_at  = ?3,
       error_message = ?2
     WHERE id = ?1",
    params![id, message, completed_at],
  )
}
