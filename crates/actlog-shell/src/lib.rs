//! Host shell for the actlog activity store.
//!
//! Owns the store for the life of the process and exposes exactly two
//! endpoints to the presentation layer: log an activity and get activities.
//! The endpoints are served by an axum [`Router`] that is driven in-process;
//! nothing here ever binds a socket.
//!
//! # Driving the router
//!
//! ```rust,ignore
//! let app = actlog_shell::ipc_router(shell.clone());
//! let resp = app.oneshot(request).await?;
//! ```

pub mod activities;
pub mod bridge;
pub mod config;
pub mod error;
pub mod lifecycle;

use std::sync::Arc;

use actlog_core::{Activity, ActivityStore, NewActivity};
use axum::{
  Router,
  routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use config::ShellConfig;
pub use error::ShellError;
pub use lifecycle::{Lifecycle, Phase};

/// Channel for inserting one activity.
pub const LOG_ACTIVITY: &str = "/log-activity";

/// Channel for fetching every activity, newest first.
pub const GET_ACTIVITIES: &str = "/get-activities";

// ─── Shell ────────────────────────────────────────────────────────────────────

/// The one owner of the activity store.
///
/// Built from a store that is already open, so no request can ever reach a
/// store that is still loading. Cloning is cheap and shares both the store
/// and the lifecycle.
pub struct Shell<S> {
  store:     Arc<S>,
  lifecycle: Lifecycle,
}

impl<S> Clone for Shell<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), lifecycle: self.lifecycle.clone() }
  }
}

impl<S: ActivityStore> Shell<S> {
  pub fn new(store: S) -> Self {
    Self { store: Arc::new(store), lifecycle: Lifecycle::new() }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn lifecycle(&self) -> &Lifecycle { &self.lifecycle }

  /// "log-activity": delegate to [`ActivityStore::insert`].
  pub async fn log_activity(
    &self,
    input: NewActivity,
  ) -> Result<Activity, ShellError> {
    let _pass = self.lifecycle.enter().await?;
    tracing::debug!(fields = input.fields().len(), "log-activity");
    self.store.insert(input).await.map_err(ShellError::persistence)
  }

  /// "get-activities": delegate to [`ActivityStore::query_all`].
  pub async fn get_activities(&self) -> Result<Vec<Activity>, ShellError> {
    let _pass = self.lifecycle.enter().await?;
    let activities =
      self.store.query_all().await.map_err(ShellError::persistence)?;
    tracing::debug!(count = activities.len(), "get-activities");
    Ok(activities)
  }

  /// Stop serving requests; waits for in-flight ones to finish.
  pub async fn begin_teardown(&self) { self.lifecycle.begin_teardown().await }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the in-process request router for `shell`.
pub fn ipc_router<S>(shell: Shell<S>) -> Router
where
  S: ActivityStore + 'static,
{
  Router::new()
    .route(LOG_ACTIVITY, post(activities::log::<S>))
    .route(GET_ACTIVITIES, get(activities::list::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(shell)
}

#[cfg(test)]
mod tests;
