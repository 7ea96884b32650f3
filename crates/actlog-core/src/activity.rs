//! Activity records — the only kind of document the store holds.
//!
//! An activity is an arbitrary, caller-shaped JSON object plus two keys the
//! store owns: `_id` (assigned once, at insert) and `timestamp` (the insert
//! instant). Callers never get to choose either; whatever they send under
//! those names is dropped before the record is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Reserved keys ───────────────────────────────────────────────────────────

/// Key under which the store-generated identifier is serialised.
pub const ID_KEY: &str = "_id";

/// Key under which the server-assigned insert time is serialised.
pub const TIMESTAMP_KEY: &str = "timestamp";

/// `true` if `key` is owned by the store rather than the caller.
pub fn is_reserved(key: &str) -> bool { key == ID_KEY || key == TIMESTAMP_KEY }

// ─── Activity ────────────────────────────────────────────────────────────────

/// A persisted activity record.
///
/// Serialises as one flat JSON object: `_id`, `timestamp`, then the caller's
/// fields in the order they were supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
  #[serde(rename = "_id")]
  pub id:        Uuid,
  /// Server-assigned; never the caller's value.
  pub timestamp: DateTime<Utc>,
  /// Everything else the caller sent. Never contains a reserved key.
  #[serde(flatten)]
  pub fields:    Map<String, Value>,
}

impl Activity {
  /// Look up a caller field by name.
  pub fn get(&self, key: &str) -> Option<&Value> { self.fields.get(key) }
}

// ─── NewActivity ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::ActivityStore::insert`].
///
/// Accepts any mapping. Reserved keys are tolerated on input and discarded
/// when the record is built.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewActivity {
  fields: Map<String, Value>,
}

impl NewActivity {
  pub fn new() -> Self { Self::default() }

  /// Builder-style helper, mostly for tests and the CLI.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.fields.insert(key.into(), value.into());
    self
  }

  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
    self.fields.insert(key.into(), value.into());
  }

  pub fn fields(&self) -> &Map<String, Value> { &self.fields }

  /// Stamp the input with its identity and insert time.
  ///
  /// Any caller-supplied `_id` or `timestamp` is removed first, so the
  /// returned record always carries the store's values.
  pub fn into_activity(self, id: Uuid, timestamp: DateTime<Utc>) -> Activity {
    let mut fields = self.fields;
    fields.retain(|key, _| !is_reserved(key));
    Activity { id, timestamp, fields }
  }
}

impl From<Map<String, Value>> for NewActivity {
  fn from(fields: Map<String, Value>) -> Self { Self { fields } }
}

impl TryFrom<Value> for NewActivity {
  type Error = Error;

  fn try_from(value: Value) -> Result<Self> {
    match value {
      Value::Object(fields) => Ok(Self { fields }),
      Value::Null => Err(Error::NotAnObject("null")),
      Value::Bool(_) => Err(Error::NotAnObject("a boolean")),
      Value::Number(_) => Err(Error::NotAnObject("a number")),
      Value::String(_) => Err(Error::NotAnObject("a string")),
      Value::Array(_) => Err(Error::NotAnObject("an array")),
    }
  }
}
