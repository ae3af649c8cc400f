//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Enumerations are stored as
//! their short lowercase (or source-format) codes.

use chrono::{DateTime, Utc};
use vgsales_core::{
  import::{FileType, ImportAttempt, ImportStatus, InsertCounts},
  sale::{LegalDescription, PlanType, SaleRecord},
  store::StoredSale,
};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<&str>) -> Result<Option<DateTime<Utc>>> {
  s.map(decode_dt).transpose()
}

// ─── Counters ────────────────────────────────────────────────────────────────

fn to_count(n: i64) -> u64 { u64::try_from(n).unwrap_or(0) }

pub fn from_count(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `import_attempts` row.
pub struct RawAttempt {
  pub id:                i64,
  pub filename:          String,
  pub district_code:     String,
  pub file_path:         String,
  pub file_type:         String,
  pub file_date:         Option<String>,
  pub content_sha256:    Option<String>,
  pub status:            String,
  pub records_processed: i64,
  pub records_inserted:  i64,
  pub records_skipped:   i64,
  pub records_errored:   i64,
  pub started_at:        Option<String>,
  pub completed_at:      Option<String>,
  pub error_message:     Option<String>,
}

pub const ATTEMPT_COLUMNS: &str = "id, filename, district_code, file_path, file_type, file_date,
  content_sha256, status, records_processed, records_inserted, records_skipped,
  records_errored, started_at, completed_at, error_message";

impl RawAttempt {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                row.get(0)?,
      filename:          row.get(1)?,
      district_code:     row.get(2)?,
      file_path:         row.get(3)?,
      file_type:         row.get(4)?,
      file_date:         row.get(5)?,
      content_sha256:    row.get(6)?,
      status:            row.get(7)?,
      records_processed: row.get(8)?,
      records_inserted:  row.get(9)?,
      records_skipped:   row.get(10)?,
      records_errored:   row.get(11)?,
      started_at:        row.get(12)?,
      completed_at:      row.get(13)?,
      error_message:     row.get(14)?,
    })
  }

  pub fn into_attempt(self) -> Result<ImportAttempt> {
    Ok(ImportAttempt {
      id:             self.id,
      file_type:      self.file_type.parse::<FileType>()?,
      status:         self.status.parse::<ImportStatus>()?,
      counts:         InsertCounts {
        processed: to_count(self.records_processed),
        inserted:  to_count(self.records_inserted),
        skipped:   to_count(self.records_skipped),
        errors:    to_count(self.records_errored),
      },
      started_at:     decode_opt_dt(self.started_at.as_deref())?,
      completed_at:   decode_opt_dt(self.completed_at.as_deref())?,
      filename:       self.filename,
      district_code:  self.district_code,
      file_path:      self.file_path,
      file_date:      self.file_date,
      content_sha256: self.content_sha256,
      error_message:  self.error_message,
    })
  }
}

/// Raw values read from a `legal_descriptions` row.
pub struct RawLegal {
  pub raw:         String,
  pub lot_number:  Option<String>,
  pub plan_number: Option<String>,
  pub plan_type:   Option<String>,
}

impl RawLegal {
  fn into_legal(self) -> Result<LegalDescription> {
    Ok(LegalDescription {
      raw:         self.raw,
      lot_number:  self.lot_number,
      plan_number: self.plan_number,
      plan_type:   self
        .plan_type
        .as_deref()
        .map(str::parse::<PlanType>)
        .transpose()?,
    })
  }
}

/// A `sales` row plus its children. Enum columns are still raw strings.
pub struct RawSale {
  pub id:        i64,
  pub file_type: String,
  /// Everything except `legal_descriptions`, which is decoded separately.
  pub record:    SaleRecord,
  pub legal:     Vec<RawLegal>,
}

impl RawSale {
  pub fn into_stored(self) -> Result<StoredSale> {
    let mut record = self.record;
    record.legal_descriptions = self
      .legal
      .into_iter()
      .map(RawLegal::into_legal)
      .collect::<Result<_>>()?;
    Ok(StoredSale {
      id: self.id,
      file_type: self.file_type.parse::<FileType>()?,
      record,
    })
  }
}
