//! Codec for the semicolon-delimited property sales extract ("DAT" files).
//!
//! Converts file content into [`vgsales_core::sale::SaleRecord`]s. Pure
//! synchronous; no database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use vgsales_dat::parse;
//!
//! let content = "B;214;2876965;1;20251215 01:08;;;84;MERRIVILLE RD;KELLYVILLE RIDGE;2155\n";
//! let parsed = parse(content, "214_SALES_DATA_15122025.DAT");
//! println!("{} sales, {} bad lines", parsed.sales.len(), parsed.parse_errors.len());
//! ```

mod batch;
pub mod error;
mod filename;
pub mod layout;
mod parse;

use std::path::Path;

pub use batch::{BatchParse, FileError, FileErrorKind, FileSummary, parse_files};
pub use error::{Error, Result};
pub use filename::{FileMeta, file_meta};
pub use parse::parse_legal_description;
use vgsales_core::sale::SaleRecord;

/// Maximum number of characters of an offending line kept in a [`LineError`].
pub const PREVIEW_CHARS: usize = 100;

// ─── Public types
// ─────────────────────────────────────────────────────────────

/// Contents of the optional `A` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
  pub data_type:     String,
  pub district_code: Option<String>,
  pub timestamp:     Option<String>,
  pub source_system: Option<String>,
}

/// A line that could not be decoded. Parsing continued past it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
  /// 1-based physical line number.
  pub line_number: usize,
  /// The offending line, truncated to [`PREVIEW_CHARS`].
  pub content:     String,
  pub message:     String,
}

/// The result of parsing one extract file.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFile {
  pub filename:      String,
  /// `YYYYMMDD` from the file name, if it carries one.
  pub file_date:     Option<String>,
  /// District code from the file name, if it carries one.
  pub district_code: Option<String>,
  pub header:        Option<Header>,
  pub sales:         Vec<SaleRecord>,
  pub parse_errors:  Vec<LineError>,
}

// ─── Public API
// ───────────────────────────────────────────────────────────────

/// Parse the content of one extract.
///
/// `filename` supplies the district code and file date and is recorded as
/// each sale's `source_file`. Never fails; malformed lines are collected in
/// [`ParsedFile::parse_errors`].
pub fn parse(content: &str, filename: &str) -> ParsedFile {
  parse::parse_content(content, filename)
}

/// Decode raw file bytes; invalid UTF-8 sequences are replaced rather than
/// rejected.
pub fn parse_bytes(bytes: &[u8], filename: &str) -> ParsedFile {
  parse(&String::from_utf8_lossy(bytes), filename)
}

/// Read and parse the file at `path`. Only I/O failures are errors.
pub fn parse_path(path: impl AsRef<Path>) -> Result<ParsedFile> {
  let path = path.as_ref();
  let bytes = std::fs::read(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(parse_bytes(&bytes, &display_name(path)))
}

/// The file name component of `path`, or the whole path if it has none.
pub(crate) fn display_name(path: &Path) -> String {
  path
    .file_name()
    .map(|n| n.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
