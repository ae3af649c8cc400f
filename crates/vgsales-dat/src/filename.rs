//! Metadata carried by source file names.
//!
//! Convention: `<3-digit district>_<anything>_<DDMMYYYY>.<ext>`. Both parts
//! are optional; a name that does not match simply yields `None`.

/// District code and release date extracted from a file name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMeta {
  pub district_code: Option<String>,
  /// `YYYYMMDD`.
  pub file_date:     Option<String>,
}

/// Extract [`FileMeta`] from a bare file name or a path.
pub fn file_meta(filename: &str) -> FileMeta {
  let name = filename
    .rsplit(['/', '\\'])
    .next()
    .unwrap_or(filename);

  FileMeta {
    district_code: district_prefix(name),
    file_date:     date_suffix(name),
  }
}

/// Three digits followed by the first underscore.
fn district_prefix(name: &str) -> Option<String> {
  let (head, _) = name.split_once('_')?;
  (head.len() == 3 && head.bytes().all(|b| b.is_ascii_digit()))
    .then(|| head.to_string())
}

/// Eight digits immediately before the extension, `DDMMYYYY` → `YYYYMMDD`.
fn date_suffix(name: &str) -> Option<String> {
  let (stem, _ext) = name.rsplit_once('.')?;
  let digits = stem.get(stem.len().checked_sub(8)?..)?;
  if !digits.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  let (dd, rest) = digits.split_at(2);
  let (mm, yyyy) = rest.split_at(2);
  Some(format!("{yyyy}{mm}{dd}"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn conforming_name() {
    let meta = file_meta("214_SALES_DATA_NNME_15122025.DAT");
    assert_eq!(meta.district_code.as_deref(), Some("214"));
    assert_eq!(meta.file_date.as_deref(), Some("20251215"));
  }

  #[test]
  fn non_conforming_name() {
    assert_eq!(file_meta("data.DAT"), FileMeta::default());
  }

  #[test]
  fn directory_components_are_ignored() {
    let meta = file_meta("/srv/extracts/2025/001_SALES_DATA_01012025.dat");
    assert_eq!(meta.district_code.as_deref(), Some("001"));
    assert_eq!(meta.file_date.as_deref(), Some("20250101"));
  }

  #[test]
  fn partial_matches() {
    let meta = file_meta("2140_SALES_15122025.DAT");
    assert_eq!(meta.district_code, None);
    assert_eq!(meta.file_date.as_deref(), Some("20251215"));

    let meta = file_meta("214_SALES_1512202.DAT");
    assert_eq!(meta.district_code.as_deref(), Some("214"));
    assert_eq!(meta.file_date, None);
  }

  #[test]
  fn missing_extension_has_no_date() {
    assert_eq!(file_meta("214_SALES_15122025").file_date, None);
  }
}
