//! Runtime configuration, layered from an optional TOML file and
//! `VGSALES_*` environment variables.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use serde::Deserialize;

fn default_database_path() -> PathBuf { PathBuf::from("data/property_sales.db") }

fn default_source_extension() -> String { "DAT".to_string() }

/// Settings shared by every `vgsales` subcommand.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
  /// SQLite database file. A leading `~/` is expanded.
  #[serde(default = "default_database_path")]
  pub database_path:    PathBuf,
  /// Extension of source files, matched case-insensitively.
  #[serde(default = "default_source_extension")]
  pub source_extension: String,
  /// District code → name, added to the built-in `districts` table. Codes
  /// already present keep their built-in name.
  #[serde(default)]
  pub districts:        BTreeMap<String, String>,
}

impl Default for IngestConfig {
  fn default() -> Self {
    Self {
      database_path:    default_database_path(),
      source_extension: default_source_extension(),
      districts:        BTreeMap::new(),
    }
  }
}

impl IngestConfig {
  /// Read `file` (if it exists) and then `VGSALES_*` environment variables.
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("VGSALES"))
      .build()?
      .try_deserialize()
  }

  /// `database_path` with a leading `~` expanded to `$HOME`.
  pub fn resolved_database_path(&self) -> PathBuf { expand_tilde(&self.database_path) }

  pub fn district_seed(&self) -> Vec<(String, String)> {
    self
      .districts
      .iter()
      .map(|(code, name)| (code.clone(), name.clone()))
      .collect()
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  #[test]
  fn missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = IngestConfig::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.database_path, PathBuf::from("data/property_sales.db"));
    assert_eq!(cfg.source_extension, "DAT");
    assert!(cfg.districts.is_empty());
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vgsales.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(
      f,
      "database_path = \"/tmp/sales.db\"\nsource_extension = \"txt\"\n\n[districts]\n214 = \"Blacktown\"\n"
    )
    .unwrap();

    let cfg = IngestConfig::load(&path).unwrap();
    assert_eq!(cfg.database_path, PathBuf::from("/tmp/sales.db"));
    assert_eq!(cfg.source_extension, "txt");
    assert_eq!(cfg.district_seed(), vec![("214".to_string(), "Blacktown".to_string())]);
  }

  #[test]
  fn tilde_is_expanded() {
    let cfg = IngestConfig {
      database_path: PathBuf::from("~/sales.db"),
      ..Default::default()
    };
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(cfg.resolved_database_path(), PathBuf::from(home).join("sales.db"));
    }
  }
}
