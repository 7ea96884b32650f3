//! Request gate tied to the shell's lifecycle.
//!
//! There is no "starting" phase: a [`crate::Shell`] can only be built from an
//! already-open store. The gate only has to stop requests once teardown
//! begins, and teardown has to wait for requests already inside.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

use crate::ShellError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Ready,
  TearingDown,
}

/// Shared lifecycle state. Clones observe the same phase.
#[derive(Debug, Clone)]
pub struct Lifecycle {
  phase: Arc<RwLock<Phase>>,
}

/// Held for the duration of one request. Teardown cannot complete while any
/// pass is alive.
pub type Pass<'a> = RwLockReadGuard<'a, Phase>;

impl Lifecycle {
  pub fn new() -> Self { Self { phase: Arc::new(RwLock::new(Phase::Ready)) } }

  pub async fn phase(&self) -> Phase { *self.phase.read().await }

  /// Admit a request, or refuse with [`ShellError::NotReady`].
  pub async fn enter(&self) -> Result<Pass<'_>, ShellError> {
    let pass = self.phase.read().await;
    match *pass {
      Phase::Ready => Ok(pass),
      Phase::TearingDown => Err(ShellError::NotReady),
    }
  }

  /// Stop admitting requests. Resolves once every in-flight request has
  /// finished. Idempotent.
  pub async fn begin_teardown(&self) {
    let mut phase = self.phase.write().await;
    if *phase != Phase::TearingDown {
      *phase = Phase::TearingDown;
      tracing::info!("shell teardown started");
    }
  }
}

impl Default for Lifecycle {
  fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::*;

  #[tokio::test]
  async fn refuses_after_teardown() {
    let lifecycle = Lifecycle::new();
    assert!(lifecycle.enter().await.is_ok());

    lifecycle.begin_teardown().await;
    assert_eq!(lifecycle.phase().await, Phase::TearingDown);
    assert!(matches!(lifecycle.enter().await, Err(ShellError::NotReady)));

    lifecycle.begin_teardown().await;
    assert_eq!(lifecycle.phase().await, Phase::TearingDown);
  }

  #[tokio::test]
  async fn teardown_waits_for_in_flight_requests() {
    let lifecycle = Lifecycle::new();
    let pass = lifecycle.enter().await.unwrap();

    let other = lifecycle.clone();
    let teardown = tokio::spawn(async move { other.begin_teardown().await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!teardown.is_finished());

    drop(pass);
    teardown.await.unwrap();
    assert_eq!(lifecycle.phase().await, Phase::TearingDown);
  }
}
