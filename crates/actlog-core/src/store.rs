//! The `ActivityStore` trait.
//!
//! Implemented by storage backends (e.g. `actlog-store-file`). The host shell
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::activity::{Activity, NewActivity};

/// Abstraction over an activity store backend.
///
/// Records are append-only: there is no update or delete. Implementations
/// must serialise writes internally; callers may issue any number of
/// concurrent `insert`s against a shared reference.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait ActivityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new activity and return it as stored.
  ///
  /// The store assigns `_id` and sets `timestamp` to the current time,
  /// overwriting any value the caller supplied. On error nothing is visible
  /// to later reads.
  fn insert(
    &self,
    input: NewActivity,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  /// Every stored activity, most recent `timestamp` first.
  ///
  /// Relative order of equal timestamps is unspecified. An empty store yields
  /// an empty vector.
  fn query_all(
    &self,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;
}

/// Sort activities newest first. Shared so every backend orders identically.
pub fn sort_newest_first(activities: &mut [Activity]) {
  activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
