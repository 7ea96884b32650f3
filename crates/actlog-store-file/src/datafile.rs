//! Reading and rewriting the on-disk datafile.
//!
//! Format: UTF-8, one compact JSON [`Activity`] per line, `\n` terminated.
//! A record may appear more than once; the last occurrence of an `_id` wins.
//! Blank lines carry no meaning and are skipped.

use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

use actlog_core::Activity;
use tokio::{
  fs::{self, OpenOptions},
  io::AsyncWriteExt as _,
};
use uuid::Uuid;

use crate::Result;

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Serialise one record as a full datafile line, trailing newline included.
pub fn encode_line(activity: &Activity) -> Result<String> {
  let mut line = serde_json::to_string(activity)?;
  line.push('\n');
  Ok(line)
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// The in-memory view of the collection, in first-insert order.
#[derive(Debug, Default)]
pub struct Index {
  records:   Vec<Activity>,
  positions: HashMap<Uuid, usize>,
}

impl Index {
  pub fn len(&self) -> usize { self.records.len() }

  pub fn contains(&self, id: &Uuid) -> bool { self.positions.contains_key(id) }

  pub fn records(&self) -> &[Activity] { &self.records }

  /// Add a record, replacing any earlier record with the same `_id` in place.
  pub fn upsert(&mut self, activity: Activity) {
    match self.positions.get(&activity.id) {
      Some(&pos) => self.records[pos] = activity,
      None => {
        self.positions.insert(activity.id, self.records.len());
        self.records.push(activity);
      }
    }
  }
}

// ─── Load ────────────────────────────────────────────────────────────────────

/// Result of reading a datafile from disk.
#[derive(Debug)]
pub struct Loaded {
  pub index:        Index,
  /// Non-blank lines seen.
  pub total:        usize,
  /// Non-blank lines that did not decode as an [`Activity`].
  pub corrupt:      usize,
  /// The file is non-empty and its last byte is not `\n`.
  pub unterminated: bool,
}

impl Loaded {
  pub fn corrupt_ratio(&self) -> f64 {
    if self.total == 0 {
      0.0
    } else {
      self.corrupt as f64 / self.total as f64
    }
  }
}

/// Create `path` (and its parent directories) if absent, then read it.
///
/// Lines are decoded from raw bytes, so invalid UTF-8 counts against the
/// corrupt-line budget like any other unreadable line.
pub async fn load(path: &Path) -> Result<Loaded> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).await?;
  }
  OpenOptions::new().create(true).append(true).open(path).await?;

  let raw = fs::read(path).await?;
  let mut loaded = Loaded {
    index:        Index::default(),
    total:        0,
    corrupt:      0,
    unterminated: raw.last().is_some_and(|&b| b != b'\n'),
  };

  for (lineno, line) in raw.split(|&b| b == b'\n').enumerate() {
    if line.iter().all(u8::is_ascii_whitespace) {
      continue;
    }
    loaded.total += 1;
    match serde_json::from_slice::<Activity>(line) {
      Ok(activity) => loaded.index.upsert(activity),
      Err(e) => {
        loaded.corrupt += 1;
        tracing::warn!(
          path = %path.display(),
          line = lineno + 1,
          error = %e,
          "skipping unreadable datafile line"
        );
      }
    }
  }

  Ok(loaded)
}

// ─── Rewrite ─────────────────────────────────────────────────────────────────

/// Sibling path used while rewriting; renamed over the datafile on success.
fn temp_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push("~");
  path.with_file_name(name)
}

/// Replace the datafile with exactly one line per record.
///
/// The new content is written and fsynced to a temporary sibling first, then
/// renamed into place, so a crash leaves either the old file or the new one.
pub async fn rewrite(path: &Path, records: &[Activity]) -> Result<()> {
  let mut buf = String::new();
  for activity in records {
    buf.push_str(&encode_line(activity)?);
  }

  let tmp = temp_path(path);
  let mut file = OpenOptions::new()
    .create(true)
    .write(true)
    .truncate(true)
    .open(&tmp)
    .await?;
  file.write_all(buf.as_bytes()).await?;
  file.flush().await?;
  file.sync_all().await?;
  drop(file);

  fs::rename(&tmp, path).await?;
  Ok(())
}
