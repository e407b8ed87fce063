//! Public request/response DTOs for the HTTP API (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.
//! Wire names are camelCase; accepted answers never appear in puzzle DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Puzzle, User};

//
// Auth
//

#[derive(Debug, Deserialize)]
pub struct RegisterIn {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginIn {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// User as returned to clients. Never carries the password hash.
#[derive(Debug, Serialize)]
pub struct UserOut {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserOut {
    fn from(u: &User) -> Self {
        Self { id: u.id.clone(), username: u.username.clone(), email: u.email.clone() }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthOut {
    pub token: String,
    pub user: UserOut,
}

//
// Puzzles
//

#[derive(Debug, Deserialize)]
pub struct PuzzlesQuery {
    pub category: Option<String>,
    pub level: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PuzzleOut {
    pub id: String,
    pub category: String,
    pub level: u32,
    pub position: u32,
    pub prompt: String,
}

pub fn to_out(p: &Puzzle) -> PuzzleOut {
    PuzzleOut {
        id: p.id.clone(),
        category: p.category.clone(),
        level: p.level,
        position: p.position,
        prompt: p.prompt.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct PuzzlesOut {
    pub puzzles: Vec<PuzzleOut>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateIn {
    #[serde(default)]
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ValidateOut {
    pub correct: bool,
    #[serde(rename = "matchedVia")]
    pub matched_via: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HintOut {
    pub hint: String,
}

#[derive(Debug, Serialize)]
pub struct SkipOut {
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

//
// Stats / progress
//

#[derive(Debug, Serialize)]
pub struct StatsOut {
    #[serde(rename = "currentStreak")]
    pub current_streak: u32,
    #[serde(rename = "longestStreak")]
    pub longest_streak: u32,
    #[serde(rename = "totalPuzzlesSolved")]
    pub total_puzzles_solved: u32,
    #[serde(rename = "lastActivityDate", skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<NaiveDate>,
    #[serde(rename = "uniquePuzzlesSolved")]
    pub unique_puzzles_solved: u32,
    #[serde(rename = "weeklyCounts")]
    pub weekly_counts: Vec<u32>,
    #[serde(rename = "totalTimeSpent")]
    pub total_time_spent: u64,
}

#[derive(Debug, Deserialize)]
pub struct TimeIn {
    #[serde(rename = "totalTimeSpent")]
    pub total_time_spent: u64,
}

#[derive(Debug, Serialize)]
pub struct OkOut {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct ProgressEntryOut {
    pub category: String,
    pub level: u32,
    #[serde(rename = "puzzlesSolved")]
    pub puzzles_solved: u32,
    #[serde(rename = "totalPuzzles")]
    pub total_puzzles: u32,
    pub completed: bool,
    #[serde(rename = "completedAt", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(rename = "solvedPuzzleIds")]
    pub solved_puzzle_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ProgressOut {
    pub progress: Vec<ProgressEntryOut>,
}

//
// Health
//

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub storage: &'static str,
    pub puzzles: usize,
}
