//! `vgsales` command-line binary.
//!
//! Reads `vgsales.toml` (or the path given with `--config`) and `VGSALES_*`
//! environment variables, opens the SQLite store and runs one subcommand.
//!
//! ```text
//! vgsales init
//! vgsales ingest ./downloads/weekly --type weekly
//! vgsales status
//! vgsales export --suburb "ROUSE HILL" --from 2025-01-01 --out sales.json
//! ```

use std::{
  fs::File,
  io::BufWriter,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vgsales_core::{
  import::FileType,
  store::{SaleQuery, SalesStore as _},
};
use vgsales_dat::{FileErrorKind, parse_files};
use vgsales_ingest::{FileOutcome, IngestConfig, Ingestor, export, orchestrator::discover_files};
use vgsales_store_sqlite::{ReferenceTable, SqliteStore};

#[derive(Parser)]
#[command(author, version, about = "NSW property sales loader")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "vgsales.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create the database schema and seed reference tables.
  Init,
  /// Load every source file in a directory.
  Ingest {
    dir:       PathBuf,
    /// `weekly` or `annual`.
    #[arg(long = "type", default_value = "weekly")]
    file_type: FileType,
    /// Reload files the ledger already marks completed.
    #[arg(long)]
    force:     bool,
  },
  /// Parse a directory without touching the database.
  Parse { dir: PathBuf },
  /// Show the import ledger.
  Status,
  /// Write stored sales as JSON.
  Export {
    #[arg(long)]
    suburb:    Option<String>,
    #[arg(long)]
    postcode:  Option<String>,
    /// Earliest contract date, `YYYY-MM-DD`.
    #[arg(long)]
    from:      Option<String>,
    /// Latest contract date, `YYYY-MM-DD`.
    #[arg(long)]
    to:        Option<String>,
    #[arg(long)]
    min_price: Option<i64>,
    #[arg(long)]
    max_price: Option<i64>,
    #[arg(long)]
    limit:     Option<usize>,
    /// Output file; stdout when omitted.
    #[arg(short, long)]
    out:       Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  let cfg = IngestConfig::load(&cli.config).context("failed to read configuration")?;

  match cli.command {
    // Parsing needs no store.
    Command::Parse { dir } => dry_run(&cfg, &dir).await?,
    Command::Init => {
      let store = open_store(&cfg).await?;
      let zones = store.reference_count(ReferenceTable::Zones).await?;
      let districts = store.reference_count(ReferenceTable::Districts).await?;
      println!("database ready: {zones} zones, {districts} districts");
    }
    Command::Ingest { dir, file_type, force } => {
      let store = open_store(&cfg).await?;
      let ingestor = Ingestor::new(store).with_extension(cfg.source_extension.clone());
      let report = ingestor
        .process_directory(&dir, file_type, force)
        .await
        .with_context(|| format!("failed to ingest {dir:?}"))?;
      println!("{report}");
      for file in &report.files {
        if let FileOutcome::Failed { message } = &file.outcome {
          println!("  failed: {} ({message})", file.filename);
        }
      }
      let total = ingestor.store().count_sales().await?;
      println!("  sales in store:  {total}");
    }
    Command::Status => {
      let store = open_store(&cfg).await?;
      let attempts = store.list_attempts().await?;
      if attempts.is_empty() {
        println!("no imports recorded");
      }
      for a in attempts {
        let when = a
          .completed_at
          .or(a.started_at)
          .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
          .unwrap_or_default();
        println!(
          "{:<40} {:<8} {:<10} {:>8} inserted {:>8} skipped {:>6} errors  {when}",
          a.filename,
          a.district_code,
          a.status.as_str(),
          a.counts.inserted,
          a.counts.skipped,
          a.counts.errors,
        );
        if let Some(message) = a.error_message {
          println!("    {message}");
        }
      }
    }
    Command::Export {
      suburb,
      postcode,
      from,
      to,
      min_price,
      max_price,
      limit,
      out,
    } => {
      let query = SaleQuery {
        suburb,
        postcode,
        contract_from: from,
        contract_to: to,
        min_price,
        max_price,
        limit,
        offset: None,
      };
      let store = open_store(&cfg).await?;
      let sales = store.query_sales(&query).await?;
      let n = sales.len();
      match out {
        Some(path) => {
          let file =
            File::create(&path).with_context(|| format!("failed to create {path:?}"))?;
          export::write_json(BufWriter::new(file), sales)?;
          tracing::info!(count = n, path = %path.display(), "exported sales");
        }
        None => {
          export::write_json(std::io::stdout().lock(), sales)?;
          println!();
        }
      }
    }
  }

  Ok(())
}

async fn open_store(cfg: &IngestConfig) -> anyhow::Result<SqliteStore> {
  let path = cfg.resolved_database_path();
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))?;
  let added = store.seed_districts(cfg.district_seed()).await?;
  if added > 0 {
    tracing::info!(added, "seeded districts");
  }
  Ok(store)
}

async fn dry_run(cfg: &IngestConfig, dir: &Path) -> anyhow::Result<()> {
  let files = discover_files(dir, &cfg.source_extension).await?;
  let batch = parse_files(&files);

  for f in &batch.files {
    if f.readable {
      println!("{:<40} {:>8} sales {:>6} bad lines", f.filename, f.sales, f.line_errors);
    } else {
      println!("{:<40} unreadable", f.filename);
    }
  }
  for err in &batch.errors {
    match &err.kind {
      FileErrorKind::Unreadable(message) => println!("{}: {message}", err.filename),
      FileErrorKind::Lines(lines) => {
        for line in lines {
          println!("{}:{}: {} [{}]", err.filename, line.line_number, line.message, line.content);
        }
      }
    }
  }
  println!("{} files, {} sales", batch.files.len(), batch.sales.len());
  Ok(())
}
