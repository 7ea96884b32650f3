//! Line-oriented bridge between a presentation process and the router.
//!
//! Each input line is a request envelope:
//!
//! ```json
//! {"id": 7, "channel": "log-activity", "payload": {"kind": "click"}}
//! {"channel": "get-activities"}
//! ```
//!
//! and produces exactly one output line, in order:
//!
//! ```json
//! {"id": 7, "ok": {"_id": "...", "timestamp": "...", "kind": "click"}}
//! {"error": "activity store is not ready"}
//! ```
//!
//! End of input means the presentation surface has gone away; the shell then
//! begins teardown.

use axum::{
  Router,
  body::Body,
  http::{Method, Request, header},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _};
use tower::ServiceExt as _;

use actlog_core::ActivityStore;

use crate::{GET_ACTIVITIES, LOG_ACTIVITY, Shell, ipc_router};

/// Responses larger than this are reported as errors rather than buffered.
const MAX_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

// ─── Envelopes ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope {
  /// Opaque correlation value, echoed back verbatim.
  #[serde(default)]
  id:      Option<Value>,
  channel: String,
  #[serde(default)]
  payload: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum Outcome {
  Ok(Value),
  Error(String),
}

#[derive(Debug, Serialize)]
struct Reply {
  #[serde(skip_serializing_if = "Option::is_none")]
  id:      Option<Value>,
  #[serde(flatten)]
  outcome: Outcome,
}

// ─── Loop ─────────────────────────────────────────────────────────────────────

/// Serve envelopes from `input` until it is exhausted, then tear the shell
/// down.
pub async fn run<S, R, W>(
  shell:  Shell<S>,
  input:  R,
  mut output: W,
) -> std::io::Result<()>
where
  S: ActivityStore + 'static,
  R: AsyncBufRead + Unpin,
  W: AsyncWrite + Unpin,
{
  let router = ipc_router(shell.clone());
  let mut lines = input.lines();

  while let Some(line) = lines.next_line().await? {
    if line.trim().is_empty() {
      continue;
    }

    let reply = match serde_json::from_str::<Envelope>(&line) {
      Ok(envelope) => {
        let id = envelope.id.clone();
        Reply { id, outcome: dispatch(&router, envelope).await }
      }
      Err(e) => Reply {
        id:      None,
        outcome: Outcome::Error(format!("malformed request: {e}")),
      },
    };

    let mut encoded = serde_json::to_string(&reply)?;
    encoded.push('\n');
    output.write_all(encoded.as_bytes()).await?;
    output.flush().await?;
  }

  tracing::debug!("bridge input closed");
  shell.begin_teardown().await;
  Ok(())
}

/// Map a channel name onto its route.
fn route_for(channel: &str) -> Option<(Method, &'static str)> {
  match channel.trim_start_matches('/') {
    "log-activity" => Some((Method::POST, LOG_ACTIVITY)),
    "get-activities" => Some((Method::GET, GET_ACTIVITIES)),
    _ => None,
  }
}

async fn dispatch(router: &Router, envelope: Envelope) -> Outcome {
  let Some((method, uri)) = route_for(&envelope.channel) else {
    return Outcome::Error(format!("unknown channel: {:?}", envelope.channel));
  };

  let body = if method == Method::POST {
    envelope
      .payload
      .map_or_else(|| Body::from("{}"), |payload| Body::from(payload.to_string()))
  } else {
    Body::empty()
  };

  let request = Request::builder()
    .method(method)
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(body);
  let request = match request {
    Ok(r) => r,
    Err(e) => return Outcome::Error(e.to_string()),
  };

  let response = match router.clone().oneshot(request).await {
    Ok(r) => r,
    Err(never) => match never {},
  };

  let status = response.status();
  let bytes =
    match axum::body::to_bytes(response.into_body(), MAX_RESPONSE_BYTES).await {
      Ok(b) => b,
      Err(e) => return Outcome::Error(format!("reading response: {e}")),
    };

  let value: Value = serde_json::from_slice(&bytes)
    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

  if status.is_success() {
    Outcome::Ok(value)
  } else {
    let reported = value.get("error").and_then(Value::as_str).map(str::to_owned);
    let message = match (reported, value) {
      (Some(m), _) => m,
      (None, Value::String(s)) if !s.is_empty() => s,
      (None, _) => status.to_string(),
    };
    Outcome::Error(message)
  }
}
