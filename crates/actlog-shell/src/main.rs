//! `actlog` — log activities and review them from the terminal.
//!
//! # Usage
//!
//! ```text
//! actlog log kind=click target=save count=3
//! actlog log --json '{"kind": "focus", "app": "editor"}'
//! actlog list --limit 20
//! actlog bridge < requests.jsonl
//! ```

use std::path::PathBuf;

use actlog_core::{Activity, NewActivity};
use actlog_shell::{Shell, ShellConfig, bridge};
use actlog_store_file::FileStore;
use anyhow::{Context as _, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio::io::BufReader;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "actlog", author, version, about = "Local activity log")]
struct Cli {
  /// Path to a TOML configuration file.
  #[arg(short, long, global = true, value_name = "FILE")]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Record one activity.
  Log {
    /// Fields as KEY=VALUE. Values that parse as JSON keep their type.
    #[arg(value_name = "KEY=VALUE")]
    fields: Vec<String>,

    /// A JSON object of fields; KEY=VALUE pairs are applied on top.
    #[arg(long, value_name = "OBJECT")]
    json: Option<String>,
  },

  /// Show stored activities, newest first.
  List {
    /// Show at most this many.
    #[arg(short, long)]
    limit: Option<usize>,
  },

  /// Serve JSON-line requests from stdin, replying on stdout.
  Bridge,

  /// Print the datafile location and exit.
  Path,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // stdout belongs to command output (and the bridge protocol).
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ShellConfig::load(cli.config.as_deref())
    .context("failed to load configuration")?;
  let Some(datafile) = cfg.datafile_path() else {
    bail!("no data directory available; set `data_dir` or ACTLOG_DATA_DIR");
  };

  if let Command::Path = cli.command {
    println!("{}", datafile.display());
    return Ok(());
  }

  let store = FileStore::open_with(&datafile, cfg.store_options())
    .await
    .with_context(|| format!("failed to open activity store at {datafile:?}"))?;
  let shell = Shell::new(store);

  let result = match cli.command {
    Command::Log { fields, json } => log(&shell, json.as_deref(), &fields).await,
    Command::List { limit } => list(&shell, limit).await,
    Command::Bridge => bridge::run(
      shell.clone(),
      BufReader::new(tokio::io::stdin()),
      tokio::io::stdout(),
    )
    .await
    .context("bridge i/o failed"),
    Command::Path => Ok(()),
  };

  shell.begin_teardown().await;
  result
}

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn log(
  shell: &Shell<FileStore>,
  json: Option<&str>,
  pairs: &[String],
) -> anyhow::Result<()> {
  let input = build_activity(json, pairs)?;
  let stored = shell.log_activity(input).await?;
  println!("{}", serde_json::to_string_pretty(&stored)?);
  Ok(())
}

async fn list(shell: &Shell<FileStore>, limit: Option<usize>) -> anyhow::Result<()> {
  let activities = shell.get_activities().await?;
  if activities.is_empty() {
    println!("no activities recorded");
    return Ok(());
  }
  for activity in activities.iter().take(limit.unwrap_or(usize::MAX)) {
    println!("{}", render(activity));
  }
  Ok(())
}

fn render(activity: &Activity) -> String {
  let when = activity.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
  let id = activity.id.simple().to_string();
  format!("{when}  {}  {}", &id[..8], Value::Object(activity.fields.clone()))
}

// ─── Field parsing ────────────────────────────────────────────────────────────

fn build_activity(json: Option<&str>, pairs: &[String]) -> anyhow::Result<NewActivity> {
  let mut input = match json {
    Some(raw) => {
      let value: Value = serde_json::from_str(raw).context("--json is not valid JSON")?;
      NewActivity::try_from(value)?
    }
    None => NewActivity::new(),
  };

  for pair in pairs {
    let (key, value) = parse_field(pair)?;
    input.insert(key, value);
  }
  Ok(input)
}

/// Split `KEY=VALUE`. The value is taken as JSON when it parses, otherwise
/// as a plain string.
fn parse_field(pair: &str) -> anyhow::Result<(String, Value)> {
  let Some((key, raw)) = pair.split_once('=') else {
    bail!("expected KEY=VALUE, got {pair:?}");
  };
  let key = key.trim();
  if key.is_empty() {
    bail!("empty field name in {pair:?}");
  }
  let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
  Ok((key.to_owned(), value))
}
