//! The two activity endpoints.
//!
//! | Method | Channel | Notes |
//! |--------|---------|-------|
//! | `POST` | `/log-activity` | Body: any JSON object; returns 201 + stored activity |
//! | `GET`  | `/get-activities` | All activities, newest first |

use actlog_core::{Activity, ActivityStore, NewActivity};
use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};

use crate::{Shell, error::ShellError};

// ─── Log ──────────────────────────────────────────────────────────────────────

/// `POST /log-activity` — returns 201 + the stored [`Activity`].
pub async fn log<S>(
  State(shell): State<Shell<S>>,
  Json(body): Json<NewActivity>,
) -> Result<impl IntoResponse, ShellError>
where
  S: ActivityStore,
{
  let activity = shell.log_activity(body).await?;
  Ok((StatusCode::CREATED, Json(activity)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /get-activities`
pub async fn list<S>(
  State(shell): State<Shell<S>>,
) -> Result<Json<Vec<Activity>>, ShellError>
where
  S: ActivityStore,
{
  Ok(Json(shell.get_activities().await?))
}
