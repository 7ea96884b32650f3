//! Shell configuration.
//!
//! Layered lowest to highest: built-in defaults, an optional TOML file, then
//! `ACTLOG_*` environment variables. The defaults alone reproduce the stock
//! behaviour: `activities.db` in the per-user data directory.

use std::path::{Path, PathBuf};

use actlog_store_file::StoreOptions;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Fixed name of the datafile inside the data directory.
pub const DATAFILE_NAME: &str = "activities.db";

/// Per-installation directory name under the platform data/config roots.
pub const APP_DIR_NAME: &str = "actlog";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
  /// Overrides the platform data directory.
  pub data_dir:                Option<PathBuf>,
  pub corrupt_alert_threshold: f64,
  pub compact_on_open:         bool,
  pub sync_on_write:           bool,
}

impl Default for ShellConfig {
  fn default() -> Self {
    let store = StoreOptions::default();
    Self {
      data_dir:                None,
      corrupt_alert_threshold: store.corrupt_alert_threshold,
      compact_on_open:         store.compact_on_open,
      sync_on_write:           store.sync_on_write,
    }
  }
}

impl ShellConfig {
  /// Load configuration. An explicit `path` must exist; the default
  /// location is optional.
  pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
    let file = match path {
      Some(p) => Some(File::from(p.to_path_buf()).required(true)),
      None => default_config_path().map(|p| File::from(p).required(false)),
    };

    let mut builder = Config::builder();
    if let Some(file) = file {
      builder = builder.add_source(file);
    }
    builder
      .add_source(Environment::with_prefix("ACTLOG").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  /// The directory holding the datafile, or `None` if the platform has no
  /// data directory and none was configured.
  pub fn data_dir(&self) -> Option<PathBuf> {
    self
      .data_dir
      .clone()
      .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR_NAME)))
  }

  pub fn datafile_path(&self) -> Option<PathBuf> {
    self.data_dir().map(|d| d.join(DATAFILE_NAME))
  }

  pub fn store_options(&self) -> StoreOptions {
    StoreOptions {
      corrupt_alert_threshold: self.corrupt_alert_threshold,
      compact_on_open:         self.compact_on_open,
      sync_on_write:           self.sync_on_write,
    }
  }
}

/// `<platform config dir>/actlog/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
  dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("config.toml"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_match_store_defaults() {
    let cfg = ShellConfig::default();
    let opts = cfg.store_options();
    let stock = StoreOptions::default();
    assert_eq!(opts.corrupt_alert_threshold, stock.corrupt_alert_threshold);
    assert_eq!(opts.compact_on_open, stock.compact_on_open);
    assert_eq!(opts.sync_on_write, stock.sync_on_write);
  }

  #[test]
  fn file_values_override_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
      &path,
      "data_dir = \"/tmp/actlog-test\"\nsync_on_write = false\n",
    )
    .unwrap();

    let cfg = ShellConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/actlog-test")));
    assert!(!cfg.sync_on_write);
    assert!(cfg.compact_on_open);
    assert_eq!(
      cfg.datafile_path(),
      Some(PathBuf::from("/tmp/actlog-test").join(DATAFILE_NAME))
    );
  }

  #[test]
  fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ShellConfig::load(Some(dir.path().join("nope.toml").as_path())).is_err());
  }
}
