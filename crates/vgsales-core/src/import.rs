//! Import ledger types.
//!
//! One [`ImportAttempt`] exists per `(filename, district_code)` pair. It is
//! audit metadata keyed by file identity and has no relationship to the sale
//! rows the file produced.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── File type ───────────────────────────────────────────────────────────────

/// Release cadence of a source extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
  #[default]
  Weekly,
  Annual,
}

impl FileType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Weekly => "weekly",
      Self::Annual => "annual",
    }
  }
}

impl FromStr for FileType {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s.to_ascii_lowercase().as_str() {
      "weekly" => Ok(Self::Weekly),
      "annual" => Ok(Self::Annual),
      _ => Err(Error::UnknownFileType(s.to_string())),
    }
  }
}

impl fmt::Display for FileType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// `pending → processing → completed | failed`.
///
/// A forced re-run moves a `completed` or `failed` attempt back to
/// `processing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
  Pending,
  Processing,
  Completed,
  Failed,
}

impl ImportStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Processing => "processing",
      Self::Completed => "completed",
      Self::Failed => "failed",
    }
  }
}

impl FromStr for ImportStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "pending" => Ok(Self::Pending),
      "processing" => Ok(Self::Processing),
      "completed" => Ok(Self::Completed),
      "failed" => Ok(Self::Failed),
      other => Err(Error::UnknownImportStatus(other.to_string())),
    }
  }
}

impl fmt::Display for ImportStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Counters ────────────────────────────────────────────────────────────────

/// Outcome counters for one file's insert batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InsertCounts {
  pub processed: u64,
  pub inserted:  u64,
  /// Records rejected as natural-key duplicates.
  pub skipped:   u64,
  pub errors:    u64,
}

impl std::ops::AddAssign for InsertCounts {
  fn add_assign(&mut self, rhs: Self) {
    self.processed += rhs.processed;
    self.inserted += rhs.inserted;
    self.skipped += rhs.skipped;
    self.errors += rhs.errors;
  }
}

// ─── Attempt ─────────────────────────────────────────────────────────────────

/// Input to [`SalesStore::begin_import`](crate::store::SalesStore::begin_import).
#[derive(Debug, Clone)]
pub struct NewImport {
  pub filename:       String,
  pub file_path:      String,
  pub file_type:      FileType,
  pub file_date:      Option<String>,
  pub district_code:  String,
  /// Hex SHA-256 of the file bytes at the time of this attempt.
  pub content_sha256: Option<String>,
}

/// A persisted ledger row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportAttempt {
  pub id:             i64,
  pub filename:       String,
  pub district_code:  String,
  pub file_path:      String,
  pub file_type:      FileType,
  pub file_date:      Option<String>,
  pub content_sha256: Option<String>,
  pub status:         ImportStatus,
  pub counts:         InsertCounts,
  pub started_at:     Option<DateTime<Utc>>,
  pub completed_at:   Option<DateTime<Utc>>,
  pub error_message:  Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn file_type_parses_case_insensitively() {
    assert_eq!("Weekly".parse::<FileType>().unwrap(), FileType::Weekly);
    assert_eq!("annual".parse::<FileType>().unwrap(), FileType::Annual);
    assert!("monthly".parse::<FileType>().is_err());
  }

  #[test]
  fn status_round_trips_through_str() {
    for s in [
      ImportStatus::Pending,
      ImportStatus::Processing,
      ImportStatus::Completed,
      ImportStatus::Failed,
    ] {
      assert_eq!(s.as_str().parse::<ImportStatus>().unwrap(), s);
    }
  }

  #[test]
  fn counts_accumulate() {
    let mut total = InsertCounts::default();
    total += InsertCounts { processed: 3, inserted: 2, skipped: 1, errors: 0 };
    total += InsertCounts { processed: 1, inserted: 0, skipped: 0, errors: 1 };
    assert_eq!(total, InsertCounts { processed: 4, inserted: 2, skipped: 1, errors: 1 });
  }
}
