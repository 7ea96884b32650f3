//! Error types for `actlog-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Activities are schema-less but must still be a key/value mapping.
  #[error("activity payload must be a JSON object, got {0}")]
  NotAnObject(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
