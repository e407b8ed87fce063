//! Level progress tracking: per (user, category, level) solved sets and the
//! completion latch.
//!
//! Same shape as the streak tracker: a pure update function plus a
//! store-backed entry point with swallow-and-log failure semantics.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument};

use crate::domain::{LevelProgressRecord, Puzzle};
use crate::store::Store;

/// Apply one solve. Returns false when the puzzle id was already counted for
/// this level. `completed` latches: it is set the first time the count
/// reaches the target and never cleared afterwards.
pub fn apply_solve(record: &mut LevelProgressRecord, puzzle_id: &str, now: DateTime<Utc>) -> bool {
  if !record.solved_puzzle_ids.insert(puzzle_id.to_string()) {
    return false;
  }
  record.puzzles_solved = record.solved_puzzle_ids.len() as u32;
  if !record.completed && record.puzzles_solved >= record.total_puzzles {
    record.completed = true;
    record.completed_at = Some(now);
  }
  true
}

/// Load-or-create the (user, category, level) record, apply, persist.
/// Fire-and-forget on storage failure.
#[instrument(level = "info", skip(store, puzzle), fields(%user_id, puzzle_id = %puzzle.id))]
pub async fn record_solve(
  store: &Store,
  user_id: &str,
  puzzle: &Puzzle,
  level_size: u32,
  now: DateTime<Utc>,
) {
  let mut record = match store.find_progress(user_id, &puzzle.category, puzzle.level).await {
    Ok(Some(r)) => r,
    Ok(None) => LevelProgressRecord::new(user_id, &puzzle.category, puzzle.level, level_size),
    Err(e) => {
      error!(target: "puzzle", %user_id, error = %e, "Progress load failed; skipping update");
      return;
    }
  };

  let was_completed = record.completed;
  if !apply_solve(&mut record, &puzzle.id, now) {
    debug!(target: "puzzle", %user_id, puzzle_id = %puzzle.id, "Puzzle already counted toward level progress");
    return;
  }
  if record.completed && !was_completed {
    info!(target: "puzzle", %user_id, category = %puzzle.category, level = puzzle.level, "Level completed");
  }

  if let Err(e) = store.upsert_progress(&record).await {
    error!(target: "puzzle", %user_id, error = %e, "Progress persist failed; update dropped");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn now() -> DateTime<Utc> {
    Utc::now()
  }

  #[test]
  fn completion_latches_when_count_reaches_target() {
    let mut r = LevelProgressRecord::new("u", "math", 1, 3);
    assert!(apply_solve(&mut r, "math-1-0", now()));
    assert!(apply_solve(&mut r, "math-1-1", now()));
    assert!(!r.completed);

    assert!(apply_solve(&mut r, "math-1-2", now()));
    assert!(r.completed);
    assert_eq!(r.puzzles_solved, 3);
    let stamped = r.completed_at;
    assert!(stamped.is_some());

    // Further solves never revert completion or restamp it.
    assert!(apply_solve(&mut r, "math-1-3", now()));
    assert!(r.completed);
    assert_eq!(r.completed_at, stamped);
  }

  #[test]
  fn duplicate_puzzle_is_a_noop() {
    let mut r = LevelProgressRecord::new("u", "math", 1, 3);
    assert!(apply_solve(&mut r, "math-1-0", now()));
    assert!(!apply_solve(&mut r, "math-1-0", now()));
    assert_eq!(r.puzzles_solved, 1);
  }

  #[tokio::test]
  async fn record_solve_scopes_records_per_level() {
    let store = Store::Memory(crate::store::MemoryStore::new());
    let p = Puzzle {
      id: "math-1-0".into(),
      category: "math".into(),
      level: 1,
      position: 0,
      prompt: "q".into(),
      answers: vec!["a".into()],
      hint: None,
      explanation: None,
    };
    record_solve(&store, "u", &p, 5, now()).await;
    record_solve(&store, "u", &p, 5, now()).await;

    let r = store.find_progress("u", "math", 1).await.unwrap().unwrap();
    assert_eq!(r.puzzles_solved, 1);
    assert_eq!(r.total_puzzles, 5);
    assert!(!r.completed);
    assert!(store.find_progress("u", "math", 2).await.unwrap().is_none());
  }
}
