//! Streak tracking: per-user current/longest streak and solve history at
//! calendar-day (UTC) granularity.
//!
//! The update rule itself is a pure function over the record so the date
//! arithmetic is testable without a store or a clock. The store-backed entry
//! point loads, applies, and persists; persistence failures are logged and
//! swallowed so bookkeeping never blocks an answer-validation response.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, error, instrument};

use crate::domain::{SolvedEntry, StreakRecord};
use crate::store::Store;

/// Apply one solve to the record. Returns false (and leaves the record
/// untouched) when the puzzle was already solved by this user: a puzzle
/// counts toward streak and totals exactly once, ever.
pub fn apply_solve(
  record: &mut StreakRecord,
  puzzle_id: &str,
  today: NaiveDate,
  now: DateTime<Utc>,
) -> bool {
  if record.solved_puzzle_ids.contains(puzzle_id) {
    return false;
  }

  match record.last_activity_date {
    // Already active today: streak counters stay put.
    Some(last) if last == today => {}
    Some(last) if last == today - Duration::days(1) => {
      record.current_streak += 1;
      record.last_activity_date = Some(today);
    }
    // Gap, or first solve ever.
    _ => {
      record.current_streak = 1;
      record.last_activity_date = Some(today);
    }
  }
  record.longest_streak = record.longest_streak.max(record.current_streak);

  record.total_puzzles_solved += 1;
  record.solved_puzzle_ids.insert(puzzle_id.to_string());
  record.solved_history.push(SolvedEntry { puzzle_id: puzzle_id.to_string(), solved_at: now });
  true
}

/// Solve counts per UTC day for the trailing week, oldest first, today last.
pub fn weekly_counts(record: &StreakRecord, today: NaiveDate) -> Vec<u32> {
  let mut counts = vec![0u32; 7];
  for entry in &record.solved_history {
    let day = entry.solved_at.date_naive();
    let age = (today - day).num_days();
    if (0..7).contains(&age) {
      counts[(6 - age) as usize] += 1;
    }
  }
  counts
}

/// Load-or-create, apply, persist. Fire-and-forget on storage failure.
#[instrument(level = "info", skip(store), fields(%user_id, %puzzle_id))]
pub async fn record_solve(store: &Store, user_id: &str, puzzle_id: &str, now: DateTime<Utc>) {
  let mut record = match store.find_streak(user_id).await {
    Ok(Some(r)) => r,
    Ok(None) => StreakRecord::new(user_id),
    Err(e) => {
      error!(target: "puzzle", %user_id, error = %e, "Streak load failed; skipping update");
      return;
    }
  };

  if !apply_solve(&mut record, puzzle_id, now.date_naive(), now) {
    debug!(target: "puzzle", %user_id, %puzzle_id, "Puzzle already counted toward streak");
    return;
  }

  if let Err(e) = store.upsert_streak(&record).await {
    error!(target: "puzzle", %user_id, error = %e, "Streak persist failed; update dropped");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, n).unwrap()
  }

  fn at(d: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&d.and_hms_opt(12, 0, 0).unwrap())
  }

  fn invariants(r: &StreakRecord) {
    assert!(r.longest_streak >= r.current_streak);
    assert_eq!(r.total_puzzles_solved as usize, r.solved_history.len());
    for id in &r.solved_puzzle_ids {
      assert!(r.solved_history.iter().any(|e| &e.puzzle_id == id));
    }
  }

  #[test]
  fn first_solve_starts_the_streak() {
    let mut r = StreakRecord::new("u");
    assert!(apply_solve(&mut r, "math-1-0", day(1), at(day(1))));
    assert_eq!(r.current_streak, 1);
    assert_eq!(r.longest_streak, 1);
    assert_eq!(r.total_puzzles_solved, 1);
    assert_eq!(r.last_activity_date, Some(day(1)));
    invariants(&r);
  }

  #[test]
  fn same_day_counts_puzzles_but_not_streak() {
    let mut r = StreakRecord::new("u");
    apply_solve(&mut r, "math-1-0", day(1), at(day(1)));
    apply_solve(&mut r, "math-1-1", day(1), at(day(1)));
    assert_eq!(r.current_streak, 1);
    assert_eq!(r.total_puzzles_solved, 2);
    invariants(&r);
  }

  #[test]
  fn consecutive_days_increment_and_gap_resets() {
    let mut r = StreakRecord::new("u");
    apply_solve(&mut r, "math-1-0", day(1), at(day(1)));
    apply_solve(&mut r, "math-1-1", day(2), at(day(2)));
    assert_eq!(r.current_streak, 2);
    apply_solve(&mut r, "math-1-2", day(3), at(day(3)));
    assert_eq!(r.current_streak, 3);
    assert_eq!(r.longest_streak, 3);

    // Skip day 4 entirely.
    apply_solve(&mut r, "math-1-3", day(5), at(day(5)));
    assert_eq!(r.current_streak, 1);
    assert_eq!(r.longest_streak, 3);
    invariants(&r);
  }

  #[test]
  fn resolving_the_same_puzzle_changes_nothing() {
    let mut r = StreakRecord::new("u");
    apply_solve(&mut r, "math-1-0", day(1), at(day(1)));
    let before = r.clone();

    assert!(!apply_solve(&mut r, "math-1-0", day(2), at(day(2))));
    assert_eq!(r.current_streak, before.current_streak);
    assert_eq!(r.total_puzzles_solved, before.total_puzzles_solved);
    assert_eq!(r.last_activity_date, before.last_activity_date);
    invariants(&r);
  }

  #[test]
  fn weekly_counts_buckets_by_day() {
    let mut r = StreakRecord::new("u");
    apply_solve(&mut r, "old", day(1), at(day(1)));
    apply_solve(&mut r, "a", day(10), at(day(10)));
    apply_solve(&mut r, "b", day(10), at(day(10)));
    apply_solve(&mut r, "c", day(12), at(day(12)));

    let counts = weekly_counts(&r, day(12));
    assert_eq!(counts.len(), 7);
    assert_eq!(counts[6], 1); // today (day 12)
    assert_eq!(counts[4], 2); // day 10
    assert_eq!(counts.iter().sum::<u32>(), 3); // day 1 is out of window
  }

  #[tokio::test]
  async fn record_solve_persists_through_the_store() {
    let store = Store::Memory(crate::store::MemoryStore::new());
    let now = at(day(1));
    record_solve(&store, "u", "math-1-0", now).await;
    record_solve(&store, "u", "math-1-0", now).await;

    let r = store.find_streak("u").await.unwrap().unwrap();
    assert_eq!(r.total_puzzles_solved, 1);
    assert_eq!(r.current_streak, 1);
  }
}
