//! `vetted`: inspect what moderation exposes for each configured kind.
//!
//! # Usage
//!
//! ```
//! vetted --config vetted.toml kinds
//! vetted visible article --limit 20
//! vetted status article 42
//! ```
//!
//! # Configuration
//!
//! ```toml
//! store_path = "~/.local/share/vetted/app.db"
//!
//! [kinds.article]
//! content_type = 1
//!
//! [kinds.comment]
//! content_type      = 2
//! visibility_column = "is_hidden"
//! ```

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use vetted_core::{
  accessor::ModeratedRecords,
  catalog::{KindCatalog, KindSettings},
  filter::{Moderated, VisibleSetFilter},
  query::{AllRecords, Collection},
  record::{RecordKind, RecordRef},
  registry::RecordSource,
  status::Strategy,
};
use vetted_store_sqlite::SqliteStore;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vetted", version, about = "Inspect moderated record visibility")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "vetted.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List configured kinds and how each is moderated.
  Kinds,

  /// Print the visible records of a kind as JSON lines.
  Visible {
    kind: String,

    #[arg(long)]
    limit: Option<usize>,

    #[arg(long)]
    offset: Option<usize>,
  },

  /// Print the moderation entry of one record.
  Status { kind: String, id: String },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the configuration file, after environment overrides.
#[derive(Deserialize, Debug)]
struct Settings {
  store_path: PathBuf,
  #[serde(default)]
  kinds:      BTreeMap<String, KindSettings>,
}

/// Read the config file, then apply `VETTED__*` overrides from `env` or, when
/// `None`, from the process environment.
fn load_settings(path: &Path, env: Option<config::Map<String, String>>) -> Result<Settings> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("VETTED").separator("__").source(env))
    .build()
    .context("failed to read config file")?
    .try_deserialize()
    .context("failed to deserialise settings")
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let settings = load_settings(&cli.config, None)?;

  let catalog = KindCatalog::from_settings(&settings.kinds).context("invalid kind settings")?;
  if catalog.is_empty() {
    tracing::warn!("no moderated kinds configured");
  }

  match cli.command {
    Command::Kinds => {
      list_kinds(&catalog);
      Ok(ExitCode::SUCCESS)
    }
    Command::Visible { kind, limit, offset } => {
      let store = open_store(&settings.store_path).await?;
      print_visible(&store, &catalog, kind.into(), limit, offset).await?;
      Ok(ExitCode::SUCCESS)
    }
    Command::Status { kind, id } => {
      let store = open_store(&settings.store_path).await?;
      print_status(store, &catalog, RecordRef::new(kind, id)).await
    }
  }
}

async fn open_store(path: &Path) -> Result<SqliteStore> {
  let path = expand_tilde(path);
  tracing::debug!(?path, "opening store");
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn list_kinds(catalog: &KindCatalog) {
  for (kind, id, config) in catalog.iter() {
    let strategy = match config.strategy() {
      Strategy::StatusRegistry => "status registry".to_owned(),
      Strategy::VisibilityColumn { column, hidden_value } => {
        format!("visibility column {column} (hidden when {hidden_value})")
      }
    };
    println!("{kind}\tcontent_type={id}\t{strategy}");
  }
}

async fn print_visible(
  store: &SqliteStore,
  catalog: &KindCatalog,
  kind: RecordKind,
  limit: Option<usize>,
  offset: Option<usize>,
) -> Result<()> {
  let filter = VisibleSetFilter::new(catalog, catalog);
  let collection = Moderated::new(AllRecords::new(kind.clone()), filter);

  let mut query = collection
    .query()
    .with_context(|| format!("cannot build visible query for {kind}"))?;
  if let Some(limit) = limit {
    query = query.with_limit(limit);
  }
  if let Some(offset) = offset {
    query = query.with_offset(offset);
  }

  let rows = store.fetch(&query).await.context("query failed")?;
  tracing::info!(%kind, count = rows.len(), "fetched visible records");

  for row in rows {
    println!("{}", serde_json::to_string(&row.values)?);
  }
  Ok(())
}

async fn print_status(
  store: SqliteStore,
  catalog: &KindCatalog,
  record: RecordRef,
) -> Result<ExitCode> {
  let records = ModeratedRecords::new(store, catalog);

  match records.get_for_record(&record).await {
    Ok(entry) => {
      tracing::info!(
        status = %entry.moderation_status,
        visible = entry.moderation_status.is_visible(),
        "found moderation entry"
      );
      println!("{}", serde_json::to_string_pretty(&entry)?);
      Ok(ExitCode::SUCCESS)
    }
    Err(e) if e.is_not_found() => {
      eprintln!("{e}");
      Ok(ExitCode::FAILURE)
    }
    Err(e) => Err(e).context("status lookup failed"),
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
