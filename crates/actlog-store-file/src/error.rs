//! Error type for `actlog-store-file`.
//!
//! Every variant is a persistence failure from the caller's point of view.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("datafile i/o error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Too many unreadable lines to trust the rest of the file.
  #[error(
    "datafile {path:?} is corrupt: {corrupt} of {total} records could not be read"
  )]
  Corrupt {
    path:    PathBuf,
    corrupt: usize,
    total:   usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
