//! Parse many files at once, isolating per-file failures.

use std::path::Path;

use vgsales_core::sale::SaleRecord;

use crate::{LineError, display_name, parse_path};

/// What went wrong with one file of a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum FileErrorKind {
  /// The file could not be read at all.
  Unreadable(String),
  /// The file parsed, but some lines were rejected.
  Lines(Vec<LineError>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileError {
  pub filename: String,
  pub kind:     FileErrorKind,
}

/// Per-file tallies, in input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
  pub filename:    String,
  pub sales:       usize,
  pub line_errors: usize,
  pub readable:    bool,
}

/// Aggregate result of [`parse_files`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchParse {
  /// Sales of every readable file, concatenated in input order.
  pub sales:  Vec<SaleRecord>,
  pub files:  Vec<FileSummary>,
  pub errors: Vec<FileError>,
}

/// Parse each path independently. An unreadable file is recorded and the
/// remaining files are still parsed.
pub fn parse_files<P: AsRef<Path>>(paths: &[P]) -> BatchParse {
  let mut batch = BatchParse::default();

  for path in paths {
    let path = path.as_ref();
    let filename = display_name(path);

    match parse_path(path) {
      Ok(mut parsed) => {
        batch.files.push(FileSummary {
          filename:    filename.clone(),
          sales:       parsed.sales.len(),
          line_errors: parsed.parse_errors.len(),
          readable:    true,
        });
        if !parsed.parse_errors.is_empty() {
          batch.errors.push(FileError {
            filename,
            kind: FileErrorKind::Lines(std::mem::take(&mut parsed.parse_errors)),
          });
        }
        batch.sales.append(&mut parsed.sales);
      }
      Err(e) => {
        tracing::warn!(file = %filename, error = %e, "skipping unreadable file");
        batch.files.push(FileSummary {
          filename:    filename.clone(),
          sales:       0,
          line_errors: 0,
          readable:    false,
        });
        batch.errors.push(FileError {
          filename,
          kind: FileErrorKind::Unreadable(e.to_string()),
        });
      }
    }
  }

  batch
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  const SALE: &str = "B;214;100;1;;;;1;SMITH ST;ROUSE HILL;2155;600;M;20251001;;900000;R2;R;RESIDENCE;;R;;;AV1;";

  #[test]
  fn aggregates_sales_and_isolates_unreadable_files() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("214_A_01122025.DAT");
    let noisy = dir.path().join("214_B_08122025.DAT");
    let missing = dir.path().join("214_C_15122025.DAT");
    fs::write(&good, format!("{SALE}\n{}", SALE.replace(";100;", ";101;"))).unwrap();
    fs::write(&noisy, format!("{SALE}\nX;junk\n")).unwrap();

    let batch = parse_files(&[&good, &missing, &noisy]);

    assert_eq!(batch.sales.len(), 3);
    assert_eq!(batch.files.len(), 3);
    assert!(!batch.files[1].readable);
    assert_eq!(batch.files[2].line_errors, 1);

    assert_eq!(batch.errors.len(), 2);
    assert_eq!(batch.errors[0].filename, "214_C_15122025.DAT");
    assert!(matches!(batch.errors[0].kind, FileErrorKind::Unreadable(_)));
    let FileErrorKind::Lines(lines) = &batch.errors[1].kind else {
      panic!("expected line errors")
    };
    assert_eq!(lines[0].line_number, 2);
  }

  #[test]
  fn empty_batch() {
    let batch = parse_files::<&Path>(&[]);
    assert_eq!(batch, BatchParse::default());
  }
}
