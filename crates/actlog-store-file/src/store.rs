//! [`FileStore`] — the datafile implementation of [`ActivityStore`].

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use actlog_core::{
  Activity, ActivityStore, NewActivity, store::sort_newest_first,
};
use chrono::Utc;
use serde::Deserialize;
use tokio::{
  fs::{File, OpenOptions},
  io::AsyncWriteExt as _,
  sync::Mutex,
};
use uuid::Uuid;

use crate::{
  Error, Result,
  datafile::{self, Index},
};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Tuning knobs for [`FileStore::open_with`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
  /// Largest fraction of unreadable lines tolerated when opening. Above this
  /// the open fails rather than silently dropping data.
  pub corrupt_alert_threshold: f64,
  /// Rewrite the datafile with one line per record after loading.
  pub compact_on_open:         bool,
  /// fsync after every appended record, before it becomes visible.
  pub sync_on_write:           bool,
}

impl Default for StoreOptions {
  fn default() -> Self {
    Self {
      corrupt_alert_threshold: 0.1,
      compact_on_open:         true,
      sync_on_write:           true,
    }
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// An activity store backed by a single newline-delimited datafile.
///
/// Cloning is cheap — clones share the same file handle and index.
#[derive(Clone)]
pub struct FileStore {
  path:    Arc<PathBuf>,
  options: StoreOptions,
  inner:   Arc<Mutex<Inner>>,
}

/// State guarded by the write lock. Holding the lock is the only way to
/// touch either the file or the index.
struct Inner {
  file:  File,
  /// Length of the datafile as of the last successful write.
  len:   u64,
  index: Index,
}

impl FileStore {
  /// Open (or create) a store at `path` with default options.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    Self::open_with(path, StoreOptions::default()).await
  }

  /// Open (or create) a store at `path`, loading every record into memory.
  pub async fn open_with(
    path: impl AsRef<Path>,
    options: StoreOptions,
  ) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let loaded = datafile::load(&path).await?;

    if loaded.corrupt_ratio() > options.corrupt_alert_threshold {
      return Err(Error::Corrupt {
        path,
        corrupt: loaded.corrupt,
        total: loaded.total,
      });
    }

    if options.compact_on_open {
      datafile::rewrite(&path, loaded.index.records()).await?;
    }

    let mut file = open_append(&path).await?;
    if loaded.unterminated && !options.compact_on_open {
      // Terminate the dangling last line so the next append starts fresh.
      file.write_all(b"\n").await?;
      file.flush().await?;
      file.sync_data().await?;
    }
    let len = file.metadata().await?.len();

    tracing::info!(
      path = %path.display(),
      records = loaded.index.len(),
      skipped = loaded.corrupt,
      "opened activity store"
    );

    Ok(Self {
      path: Arc::new(path),
      options,
      inner: Arc::new(Mutex::new(Inner { file, len, index: loaded.index })),
    })
  }

  /// Location of the datafile.
  pub fn path(&self) -> &Path { &self.path }

  /// Number of records currently stored.
  pub async fn len(&self) -> usize { self.inner.lock().await.index.len() }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }

  /// Rewrite the datafile with exactly one line per record.
  ///
  /// Writers are held off for the duration.
  pub async fn compact(&self) -> Result<()> {
    let mut inner = self.inner.lock().await;
    datafile::rewrite(&self.path, inner.index.records()).await?;

    // The old handle points at the replaced inode.
    inner.file = open_append(&self.path).await?;
    inner.len = inner.file.metadata().await?.len();

    tracing::debug!(
      path = %self.path.display(),
      records = inner.index.len(),
      "compacted datafile"
    );
    Ok(())
  }
}

async fn open_append(path: &Path) -> Result<File> {
  Ok(OpenOptions::new().create(true).append(true).open(path).await?)
}

#[cfg(test)]
impl FileStore {
  /// Swap the datafile handle for a read-only one so every append fails.
  pub(crate) async fn break_writes(&self) -> Result<()> {
    self.inner.lock().await.file = File::open(&*self.path).await?;
    Ok(())
  }
}

impl Inner {
  fn fresh_id(&self) -> Uuid {
    loop {
      let id = Uuid::new_v4();
      if !self.index.contains(&id) {
        return id;
      }
    }
  }

  /// Append `bytes` as one commit. On failure the file is cut back to its
  /// previous length so no torn line survives into the next load.
  async fn append(&mut self, bytes: &[u8], sync: bool) -> Result<()> {
    let written = async {
      self.file.write_all(bytes).await?;
      self.file.flush().await?;
      if sync {
        self.file.sync_data().await?;
      }
      Ok::<_, std::io::Error>(())
    }
    .await;

    match written {
      Ok(()) => {
        self.len += bytes.len() as u64;
        Ok(())
      }
      Err(e) => {
        if let Err(truncate_err) = self.file.set_len(self.len).await {
          tracing::error!(
            error = %truncate_err,
            "failed to roll back partial datafile write"
          );
        }
        Err(e.into())
      }
    }
  }
}

// ─── ActivityStore impl ──────────────────────────────────────────────────────

impl ActivityStore for FileStore {
  type Error = Error;

  async fn insert(&self, input: NewActivity) -> Result<Activity> {
    let mut inner = self.inner.lock().await;

    let activity = input.into_activity(inner.fresh_id(), Utc::now());
    let line = datafile::encode_line(&activity)?;
    inner.append(line.as_bytes(), self.options.sync_on_write).await?;
    inner.index.upsert(activity.clone());

    tracing::debug!(id = %activity.id, "inserted activity");
    Ok(activity)
  }

  async fn query_all(&self) -> Result<Vec<Activity>> {
    let mut activities = self.inner.lock().await.index.records().to_vec();
    sort_newest_first(&mut activities);
    Ok(activities)
  }
}
