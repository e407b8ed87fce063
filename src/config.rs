//! Loading backend configuration (prompts + optional puzzle bank) from TOML.
//!
//! See `BankConfig` and `Prompts` for the expected schema.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct BankConfig {
  #[serde(default)]
  pub prompts: Prompts,
  #[serde(default)]
  pub puzzles: Vec<PuzzleCfg>,
}

/// Puzzle entry accepted in TOML configuration. Entries merge into the
/// built-in catalog at startup; `answers` must be non-empty.
#[derive(Clone, Debug, Deserialize)]
pub struct PuzzleCfg {
  #[serde(default)] pub id: Option<String>,
  pub category: String,
  pub level: u32,
  #[serde(default)] pub position: Option<u32>,
  pub prompt: String,
  #[serde(default)] pub answers: Vec<String>,
  #[serde(default)] pub hint: Option<String>,
  #[serde(default)] pub explanation: Option<String>,
}

/// Prompts used by the OpenAI client. Defaults are sensible for quiz answer
/// judging; override them in TOML if you need to tune tone/structure.
#[derive(Clone, Debug, Deserialize)]
pub struct Prompts {
  // Answer fallback validation
  pub validation_system: String,
  pub validation_user_template: String,
  // Hint generation when a puzzle carries no stored hint
  pub hint_system: String,
  pub hint_user_template: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      validation_system: "You judge quiz answers. Reply with a single leading token CORRECT or INCORRECT, optionally followed by one short sentence of explanation. No other output.".into(),
      validation_user_template: "Question: {prompt}\nAccepted answers: {accepted}\nUser answer: {answer}\nIs the user answer equivalent in meaning to one of the accepted answers?".into(),
      hint_system: "You are a puzzle coach. Give ONE concise hint (< 20 words) and never reveal the answer.".into(),
      hint_user_template: "Puzzle: {prompt}\nGive one hint.".into(),
    }
  }
}

/// Attempt to load `BankConfig` from PUZZLE_CONFIG_PATH. On any parsing/IO
/// error, returns None and the caller falls back to defaults.
pub fn load_bank_config_from_env() -> Option<BankConfig> {
  let path = std::env::var("PUZZLE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<BankConfig>(&s) {
      Ok(cfg) => {
        info!(target: "brainrally_backend", %path, puzzles = cfg.puzzles.len(), "Loaded puzzle config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "brainrally_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "brainrally_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_bank_with_prompts_override() {
    let toml_src = r#"
      [prompts]
      validation_system = "judge"
      validation_user_template = "{prompt} {accepted} {answer}"
      hint_system = "coach"
      hint_user_template = "{prompt}"

      [[puzzles]]
      category = "math"
      level = 3
      prompt = "What is 2 + 2?"
      answers = ["4", "four"]
      hint = "Count on your fingers."
    "#;
    let cfg: BankConfig = toml::from_str(toml_src).unwrap();
    assert_eq!(cfg.prompts.validation_system, "judge");
    assert_eq!(cfg.puzzles.len(), 1);
    assert_eq!(cfg.puzzles[0].category, "math");
    assert_eq!(cfg.puzzles[0].answers, vec!["4", "four"]);
    assert!(cfg.puzzles[0].id.is_none());
  }

  #[test]
  fn missing_sections_use_defaults() {
    let cfg: BankConfig = toml::from_str("").unwrap();
    assert!(cfg.puzzles.is_empty());
    assert!(cfg.prompts.validation_system.contains("CORRECT"));
  }
}
