//! HTTP endpoint handlers. These are thin wrappers over the matcher, the
//! trackers, and the storage facade. Each handler is instrumented and logs
//! parameters and basic result info.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::domain::{LevelProgressRecord, StreakRecord, User};
use crate::error::ApiError;
use crate::matcher;
use crate::progress;
use crate::protocol::*;
use crate::state::AppState;
use crate::streak;

#[instrument(level = "info", skip_all, fields(username = %body.username))]
pub async fn http_register(
  State(state): State<Arc<AppState>>,
  Json(body): Json<RegisterIn>,
) -> Result<impl IntoResponse, ApiError> {
  let username = body.username.trim().to_string();
  let email = body.email.trim().to_lowercase();

  if username.is_empty() || email.is_empty() || body.password.is_empty() {
    return Err(ApiError::Validation("username, email and password are required".into()));
  }
  if !email.contains('@') {
    return Err(ApiError::Validation("email is malformed".into()));
  }
  if body.password.chars().count() < auth::MIN_PASSWORD_LENGTH {
    return Err(ApiError::Validation(format!(
      "password must be at least {} characters",
      auth::MIN_PASSWORD_LENGTH
    )));
  }

  if state.store.find_user_by_email(&email).await?.is_some() {
    return Err(ApiError::Conflict("email is already registered".into()));
  }
  if state.store.find_user_by_username(&username).await?.is_some() {
    return Err(ApiError::Conflict("username is already taken".into()));
  }

  let password_hash = auth::hash_password(&body.password).map_err(|e| {
    error!(target: "brainrally_backend", error = %e, "Password hashing failed");
    ApiError::Internal
  })?;
  let user = User { id: Uuid::new_v4().to_string(), username, email, password_hash };
  state.store.insert_user(&user).await?;

  let token = state.tokens.issue(&user.id, Utc::now());
  info!(target: "brainrally_backend", user_id = %user.id, "User registered");
  Ok((StatusCode::CREATED, Json(AuthOut { token, user: (&user).into() })))
}

#[instrument(level = "info", skip_all)]
pub async fn http_login(
  State(state): State<Arc<AppState>>,
  Json(body): Json<LoginIn>,
) -> Result<Json<AuthOut>, ApiError> {
  let email = body.email.trim().to_lowercase();
  let user = state
    .store
    .find_user_by_email(&email)
    .await?
    .filter(|u| auth::verify_password(&body.password, &u.password_hash))
    .ok_or_else(|| ApiError::Auth("invalid email or password".into()))?;

  let token = state.tokens.issue(&user.id, Utc::now());
  info!(target: "brainrally_backend", user_id = %user.id, "User logged in");
  Ok(Json(AuthOut { token, user: (&user).into() }))
}

#[instrument(level = "info", skip(state, _auth), fields(category = ?q.category, level = ?q.level))]
pub async fn http_list_puzzles(
  State(state): State<Arc<AppState>>,
  _auth: AuthUser,
  Query(q): Query<PuzzlesQuery>,
) -> Json<PuzzlesOut> {
  let puzzles = state
    .catalog
    .list(q.category.as_deref(), q.level)
    .into_iter()
    .map(to_out)
    .collect();
  Json(PuzzlesOut { puzzles })
}

#[instrument(level = "info", skip(state, auth, body), fields(puzzle_id = %id, answer_len = body.answer.len()))]
pub async fn http_validate(
  State(state): State<Arc<AppState>>,
  auth: AuthUser,
  Path(id): Path<String>,
  Json(body): Json<ValidateIn>,
) -> Result<Json<ValidateOut>, ApiError> {
  let puzzle = state
    .catalog
    .get(&id)
    .cloned()
    .ok_or_else(|| ApiError::NotFound(format!("unknown puzzle id: {}", id)))?;

  let outcome =
    matcher::evaluate(&puzzle, &body.answer, state.openai.as_ref(), &state.prompts).await;
  let correct = outcome.via.is_correct();
  info!(target: "puzzle", %id, %correct, via = outcome.via.as_str(), "Answer evaluated");

  if correct {
    let now = Utc::now();
    // Hold the user's solve lock across both tracker updates so two
    // concurrent solves of the same new puzzle cannot double-count.
    let lock = state.user_lock(&auth.user_id).await;
    let _guard = lock.lock().await;
    streak::record_solve(&state.store, &auth.user_id, &puzzle.id, now).await;
    let level_size = state.catalog.level_size(&puzzle.category, puzzle.level);
    progress::record_solve(&state.store, &auth.user_id, &puzzle, level_size, now).await;
  }

  let message = if correct {
    "Correct!".to_string()
  } else {
    "Not quite. Try again!".to_string()
  };
  let explanation = if correct {
    outcome.external_explanation.or_else(|| puzzle.explanation.clone())
  } else {
    None
  };

  Ok(Json(ValidateOut { correct, matched_via: outcome.via.as_str(), message, explanation }))
}

#[instrument(level = "info", skip(state, _auth), fields(puzzle_id = %id))]
pub async fn http_hint(
  State(state): State<Arc<AppState>>,
  _auth: AuthUser,
  Path(id): Path<String>,
) -> Result<Json<HintOut>, ApiError> {
  let puzzle = state
    .catalog
    .get(&id)
    .ok_or_else(|| ApiError::NotFound(format!("unknown puzzle id: {}", id)))?;

  if let Some(hint) = &puzzle.hint {
    return Ok(Json(HintOut { hint: hint.clone() }));
  }
  if let Some(oa) = &state.openai {
    match oa.hint_for(&state.prompts, &puzzle.prompt).await {
      Ok(hint) => return Ok(Json(HintOut { hint })),
      Err(e) => {
        error!(target: "puzzle", %id, error = %e, "OpenAI hint failed; using generic hint");
      }
    }
  }
  Ok(Json(HintOut { hint: "Re-read the prompt carefully and rule out the obvious traps.".into() }))
}

#[instrument(level = "info", skip(state, _auth), fields(puzzle_id = %id))]
pub async fn http_skip(
  State(state): State<Arc<AppState>>,
  _auth: AuthUser,
  Path(id): Path<String>,
) -> Result<Json<SkipOut>, ApiError> {
  let puzzle = state
    .catalog
    .get(&id)
    .ok_or_else(|| ApiError::NotFound(format!("unknown puzzle id: {}", id)))?;

  // Skipping reveals the answer; it never touches streak or progress.
  let answer = puzzle.answers.first().cloned().unwrap_or_default();
  Ok(Json(SkipOut { answer, explanation: puzzle.explanation.clone() }))
}

#[instrument(level = "info", skip(state, auth))]
pub async fn http_stats(
  State(state): State<Arc<AppState>>,
  auth: AuthUser,
) -> Result<Json<StatsOut>, ApiError> {
  let record = state
    .store
    .find_streak(&auth.user_id)
    .await?
    .unwrap_or_else(|| StreakRecord::new(&auth.user_id));

  let weekly = streak::weekly_counts(&record, Utc::now().date_naive());
  Ok(Json(StatsOut {
    current_streak: record.current_streak,
    longest_streak: record.longest_streak,
    total_puzzles_solved: record.total_puzzles_solved,
    last_activity_date: record.last_activity_date,
    unique_puzzles_solved: record.solved_puzzle_ids.len() as u32,
    weekly_counts: weekly,
    total_time_spent: record.total_time_spent_secs,
  }))
}

#[instrument(level = "info", skip(state, auth), fields(total_time_spent = body.total_time_spent))]
pub async fn http_time_spent(
  State(state): State<Arc<AppState>>,
  auth: AuthUser,
  Json(body): Json<TimeIn>,
) -> Result<Json<OkOut>, ApiError> {
  // Same read-modify-write as a solve; take the user lock so a concurrent
  // solve landing between our read and our upsert is not erased.
  let lock = state.user_lock(&auth.user_id).await;
  let _guard = lock.lock().await;
  let mut record = state
    .store
    .find_streak(&auth.user_id)
    .await?
    .unwrap_or_else(|| StreakRecord::new(&auth.user_id));
  record.total_time_spent_secs = body.total_time_spent;
  state.store.upsert_streak(&record).await?;
  Ok(Json(OkOut { success: true }))
}

#[instrument(level = "info", skip(state, auth))]
pub async fn http_progress(
  State(state): State<Arc<AppState>>,
  auth: AuthUser,
) -> Result<Json<ProgressOut>, ApiError> {
  // The lock keeps the materializing upsert below from clobbering a record a
  // concurrent solve persisted after our find returned None.
  let lock = state.user_lock(&auth.user_id).await;
  let _guard = lock.lock().await;
  let mut entries = Vec::new();
  for (category, level, count) in state.catalog.levels() {
    let record = match state.store.find_progress(&auth.user_id, category, level).await? {
      Some(r) => r,
      None => {
        // Materialize (and persist) the default record for untouched levels.
        let r = LevelProgressRecord::new(&auth.user_id, category, level, count);
        state.store.upsert_progress(&r).await?;
        r
      }
    };
    entries.push(ProgressEntryOut {
      category: record.category,
      level: record.level,
      puzzles_solved: record.puzzles_solved,
      total_puzzles: record.total_puzzles,
      completed: record.completed,
      completed_at: record.completed_at,
      solved_puzzle_ids: record.solved_puzzle_ids.into_iter().collect(),
    });
  }
  Ok(Json(ProgressOut { progress: entries }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> Json<HealthOut> {
  Json(HealthOut {
    status: "ok",
    storage: state.store.backend_name(),
    puzzles: state.catalog.len(),
  })
}
