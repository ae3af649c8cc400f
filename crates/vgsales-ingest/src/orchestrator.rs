//! The ingestion run: discover files, consult the ledger, parse, load.

use std::{
  fmt,
  path::{Path, PathBuf},
};

use serde::Serialize;
use sha2::{Digest as _, Sha256};
use tracing::Instrument as _;
use uuid::Uuid;
use vgsales_core::{
  import::{FileType, ImportStatus, InsertCounts, NewImport},
  store::SalesStore,
};
use vgsales_dat::ParsedFile;

use crate::{Error, Result};

/// Ledger district for files whose name and header both lack one.
pub const UNKNOWN_DISTRICT: &str = "unknown";

// ─── Reports ─────────────────────────────────────────────────────────────────

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FileOutcome {
  /// Records were loaded and the ledger marked `completed`.
  Processed {
    counts:      InsertCounts,
    /// Lines the parser could not decode.
    line_errors: usize,
  },
  /// The ledger already had a `completed` attempt.
  Skipped,
  /// The file could not be read or loaded.
  Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
  pub filename:      String,
  pub district_code: Option<String>,
  #[serde(flatten)]
  pub outcome:       FileOutcome,
}

/// Summary of one [`Ingestor::process_directory`] call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
  pub run_id:      Uuid,
  pub total_files: usize,
  pub processed:   usize,
  pub skipped:     usize,
  pub failed:      usize,
  /// Record counters summed over every processed file.
  pub records:     InsertCounts,
  pub files:       Vec<FileReport>,
}

impl RunReport {
  fn new(run_id: Uuid) -> Self {
    Self {
      run_id,
      total_files: 0,
      processed: 0,
      skipped: 0,
      failed: 0,
      records: InsertCounts::default(),
      files: Vec::new(),
    }
  }

  fn record(&mut self, report: FileReport) {
    self.total_files += 1;
    match &report.outcome {
      FileOutcome::Processed { counts, .. } => {
        self.processed += 1;
        self.records += *counts;
      }
      FileOutcome::Skipped => self.skipped += 1,
      FileOutcome::Failed { .. } => self.failed += 1,
    }
    self.files.push(report);
  }

  /// Rows written to the sales table during this run.
  pub fn inserted(&self) -> u64 { self.records.inserted }
}

impl fmt::Display for RunReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "run {}", self.run_id)?;
    writeln!(f, "  files found:     {}", self.total_files)?;
    writeln!(f, "  files processed: {}", self.processed)?;
    writeln!(f, "  files skipped:   {}", self.skipped)?;
    writeln!(f, "  files failed:    {}", self.failed)?;
    writeln!(f, "  records read:    {}", self.records.processed)?;
    writeln!(f, "  records added:   {}", self.records.inserted)?;
    writeln!(f, "  duplicates:      {}", self.records.skipped)?;
    write!(f, "  record errors:   {}", self.records.errors)
  }
}

// ─── Discovery ───────────────────────────────────────────────────────────────

/// Entries of `dir` whose extension matches `extension` case-insensitively,
/// sorted by file name.
pub async fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
  match tokio::fs::metadata(dir).await {
    Ok(meta) if !meta.is_dir() => return Err(Error::NotADirectory(dir.to_path_buf())),
    Ok(_) => {}
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
      return Err(Error::SourceMissing(dir.to_path_buf()));
    }
    Err(e) => return Err(Error::io(dir, e)),
  }

  let mut entries = tokio::fs::read_dir(dir)
    .await
    .map_err(|e| Error::io(dir, e))?;
  let mut files = Vec::new();
  while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(dir, e))? {
    let path = entry.path();
    if path
      .extension()
      .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
    {
      files.push(path);
    }
  }
  files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
  Ok(files)
}

fn file_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn sha256_hex(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

/// File name first, then the header line, then [`UNKNOWN_DISTRICT`].
fn resolve_district(parsed: &ParsedFile) -> String {
  parsed
    .district_code
    .clone()
    .or_else(|| {
      parsed
        .header
        .as_ref()
        .and_then(|h| h.district_code.clone())
    })
    .unwrap_or_else(|| UNKNOWN_DISTRICT.to_string())
}

// ─── Ingestor ────────────────────────────────────────────────────────────────

/// Loads extract files into a [`SalesStore`], one transaction per file.
pub struct Ingestor<S> {
  store:     S,
  extension: String,
}

impl<S: SalesStore> Ingestor<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      extension: "DAT".to_string(),
    }
  }

  /// Match source files by `extension` instead of `DAT`.
  pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
    self.extension = extension.into();
    self
  }

  pub fn store(&self) -> &S { &self.store }

  /// Process every matching file in `dir` in file-name order.
  ///
  /// A missing or non-directory `dir` is an error. Failures of individual
  /// files are recorded in the report and do not stop the run.
  pub async fn process_directory(
    &self,
    dir: &Path,
    file_type: FileType,
    force: bool,
  ) -> Result<RunReport> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("ingest", %run_id, %file_type, dir = %dir.display());

    async {
      let files = discover_files(dir, &self.extension).await?;
      tracing::info!(count = files.len(), force, "discovered source files");

      let mut report = RunReport::new(run_id);
      for path in &files {
        let filename = file_name(path);
        let (district_code, outcome) = match self.ingest(path, file_type, force).await {
          Ok((district, outcome)) => (Some(district), outcome),
          Err(e) => {
            tracing::error!(file = %filename, error = %e, "file failed");
            (None, FileOutcome::Failed { message: e.to_string() })
          }
        };
        report.record(FileReport { filename, district_code, outcome });
      }

      tracing::info!(
        processed = report.processed,
        skipped = report.skipped,
        failed = report.failed,
        inserted = report.records.inserted,
        "ingestion finished"
      );
      Ok(report)
    }
    .instrument(span)
    .await
  }

  /// Process one file. An `Err` means the file failed; if a ledger attempt
  /// had been started it is marked `failed` first.
  pub async fn process_file(
    &self,
    path: &Path,
    file_type: FileType,
    force: bool,
  ) -> Result<FileOutcome> {
    self
      .ingest(path, file_type, force)
      .await
      .map(|(_, outcome)| outcome)
  }

  async fn ingest(
    &self,
    path: &Path,
    file_type: FileType,
    force: bool,
  ) -> Result<(String, FileOutcome)> {
    let filename = file_name(path);
    let bytes = tokio::fs::read(path)
      .await
      .map_err(|e| Error::io(path, e))?;
    let sha = sha256_hex(&bytes);
    let parsed = vgsales_dat::parse_bytes(&bytes, &filename);
    let district = resolve_district(&parsed);

    let span = tracing::info_span!("file", file = %filename, district = %district);
    async {
      if !force && self.skip_completed(&filename, &district, &sha).await? {
        tracing::info!("already imported, skipping");
        return Ok((district.clone(), FileOutcome::Skipped));
      }

      let line_errors = parsed.parse_errors.len();
      for e in &parsed.parse_errors {
        tracing::debug!(line = e.line_number, content = %e.content, "{}", e.message);
      }
      if line_errors > 0 {
        tracing::warn!(line_errors, "some lines could not be parsed");
      }

      let attempt_id = self
        .store
        .begin_import(NewImport {
          filename:       filename.clone(),
          file_path:      path.to_string_lossy().into_owned(),
          file_type,
          file_date:      parsed.file_date.clone(),
          district_code:  district.clone(),
          content_sha256: Some(sha.clone()),
        })
        .await
        .map_err(Error::store)?;

      match self.store.insert_sales(file_type, parsed.sales).await {
        Ok(counts) => {
          if let Err(e) = self.store.complete_import(attempt_id, counts).await {
            self.mark_failed(attempt_id, &e).await;
            return Err(Error::store(e));
          }
          tracing::info!(
            processed = counts.processed,
            inserted = counts.inserted,
            skipped = counts.skipped,
            errors = counts.errors,
            "file imported"
          );
          Ok((district.clone(), FileOutcome::Processed { counts, line_errors }))
        }
        Err(e) => {
          self.mark_failed(attempt_id, &e).await;
          Err(Error::store(e))
        }
      }
    }
    .instrument(span)
    .await
  }

  /// Record `error` against the attempt. If even that fails the row is left
  /// in `processing`, which the next non-forced run retries.
  async fn mark_failed(&self, attempt_id: i64, error: &S::Error) {
    if let Err(fail_err) = self.store.fail_import(attempt_id, error.to_string()).await {
      tracing::error!(
        attempt_id,
        error = %fail_err,
        "could not mark attempt failed; it stays in processing"
      );
    }
  }

  /// Whether the ledger already holds a completed attempt. Warns when the
  /// file content has changed since that attempt.
  async fn skip_completed(&self, filename: &str, district: &str, sha: &str) -> Result<bool> {
    let Some(attempt) = self
      .store
      .find_attempt(filename, district)
      .await
      .map_err(Error::store)?
    else {
      return Ok(false);
    };
    if attempt.status != ImportStatus::Completed {
      return Ok(false);
    }

    if attempt
      .content_sha256
      .as_deref()
      .is_some_and(|previous| previous != sha)
    {
      tracing::warn!("content changed since last import; rerun with --force to reload");
    }
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parsed(name_district: Option<&str>, header_district: Option<&str>) -> ParsedFile {
    ParsedFile {
      filename:      "x.DAT".into(),
      file_date:     None,
      district_code: name_district.map(str::to_string),
      header:        header_district.map(|d| vgsales_dat::Header {
        data_type:     "RTSALEDATA".into(),
        district_code: Some(d.into()),
        timestamp:     None,
        source_system: None,
      }),
      sales:         Vec::new(),
      parse_errors:  Vec::new(),
    }
  }

  #[test]
  fn district_prefers_filename_then_header() {
    assert_eq!(resolve_district(&parsed(Some("214"), Some("001"))), "214");
    assert_eq!(resolve_district(&parsed(None, Some("001"))), "001");
    assert_eq!(resolve_district(&parsed(None, None)), UNKNOWN_DISTRICT);
  }

  #[test]
  fn sha_is_lowercase_hex() {
    assert_eq!(
      sha256_hex(b""),
      "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
  }

  #[test]
  fn report_tallies_outcomes() {
    let mut report = RunReport::new(Uuid::nil());
    let counts = InsertCounts { processed: 3, inserted: 2, skipped: 1, errors: 0 };
    report.record(FileReport {
      filename:      "a.DAT".into(),
      district_code: Some("214".into()),
      outcome:       FileOutcome::Processed { counts, line_errors: 0 },
    });
    report.record(FileReport {
      filename:      "b.DAT".into(),
      district_code: Some("214".into()),
      outcome:       FileOutcome::Skipped,
    });
    report.record(FileReport {
      filename:      "c.DAT".into(),
      district_code: None,
      outcome:       FileOutcome::Failed { message: "boom".into() },
    });
    assert_eq!(
      (report.total_files, report.processed, report.skipped, report.failed),
      (3, 1, 1, 1)
    );
    assert_eq!(report.inserted(), 2);
  }
}
