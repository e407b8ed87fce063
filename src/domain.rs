//! Domain models used by the backend: puzzles, users, and per-user
//! streak / level-progress records.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A static quiz puzzle. Loaded once at startup (built-in seeds plus an
/// optional TOML bank) and never mutated afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Puzzle {
  pub id: String,
  pub category: String,
  pub level: u32,
  /// Ordering within the level.
  pub position: u32,
  pub prompt: String,
  /// Accepted answers, compared case/whitespace-insensitively. Never empty.
  pub answers: Vec<String>,
  #[serde(default)] pub hint: Option<String>,
  #[serde(default)] pub explanation: Option<String>,
}

/// Registered user. The password is stored as an argon2 PHC string and is
/// never serialized back to clients (see `protocol::UserOut`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
  pub id: String,
  pub username: String,
  pub email: String,
  pub password_hash: String,
}

/// One history entry per newly solved puzzle.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SolvedEntry {
  pub puzzle_id: String,
  pub solved_at: DateTime<Utc>,
}

/// Per-user streak bookkeeping. One record per user, created lazily on the
/// first solve (or the first time-spent report).
///
/// Invariants after every update:
///   longest_streak >= current_streak
///   total_puzzles_solved == solved_history.len()
///   solved_puzzle_ids ⊆ ids found in solved_history
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StreakRecord {
  pub user_id: String,
  pub current_streak: u32,
  pub longest_streak: u32,
  /// Calendar day (UTC) of the last solve. Day granularity only.
  pub last_activity_date: Option<NaiveDate>,
  pub total_puzzles_solved: u32,
  pub solved_puzzle_ids: BTreeSet<String>,
  pub solved_history: Vec<SolvedEntry>,
  /// Client-reported cumulative seconds.
  pub total_time_spent_secs: u64,
}

impl StreakRecord {
  pub fn new(user_id: impl Into<String>) -> Self {
    Self {
      user_id: user_id.into(),
      current_streak: 0,
      longest_streak: 0,
      last_activity_date: None,
      total_puzzles_solved: 0,
      solved_puzzle_ids: BTreeSet::new(),
      solved_history: Vec::new(),
      total_time_spent_secs: 0,
    }
  }
}

/// Per (user, category, level) completion bookkeeping.
/// `completed` latches: once true it is never reverted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelProgressRecord {
  pub user_id: String,
  pub category: String,
  pub level: u32,
  pub solved_puzzle_ids: BTreeSet<String>,
  pub puzzles_solved: u32,
  /// Fixed target count for the level, taken from the catalog at creation.
  pub total_puzzles: u32,
  pub completed: bool,
  pub completed_at: Option<DateTime<Utc>>,
}

impl LevelProgressRecord {
  pub fn new(
    user_id: impl Into<String>,
    category: impl Into<String>,
    level: u32,
    total_puzzles: u32,
  ) -> Self {
    Self {
      user_id: user_id.into(),
      category: category.into(),
      level,
      solved_puzzle_ids: BTreeSet::new(),
      puzzles_solved: 0,
      total_puzzles,
      completed: false,
      completed_at: None,
    }
  }
}
