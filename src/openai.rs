//! Minimal OpenAI client for our use-cases.
//!
//! We only call chat.completions and request plain text. Calls are
//! instrumented and log model names, latencies, and response sizes (not
//! contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short to
//! avoid PII leaks.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::Prompts;
use crate::util::fill_template;

// Verdict protocol: the model leads with one of these tokens, the rest of
// the line is an optional explanation.
const VERDICT_CORRECT: &str = "CORRECT";
const VERDICT_INCORRECT: &str = "INCORRECT";

#[derive(Clone)]
pub struct OpenAI {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
  pub fast_model: String,
}

impl OpenAI {
  /// Construct the client if we find OPENAI_API_KEY; otherwise return None.
  /// The request timeout bounds the only network call on the answer path.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("OPENAI_API_KEY").ok()?;
    let base_url =
      std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
    let fast_model =
      std::env::var("OPENAI_FAST_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(8))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url, fast_model })
  }

  /// Plain-text chat completion. Used for verdicts and hints.
  #[instrument(level = "info", skip(self, system, user), fields(model = %model))]
  async fn chat_plain(
    &self,
    model: &str,
    system: &str,
    user: &str,
    temperature: f32,
  ) -> Result<String, String> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: model.to_string(),
      messages: vec![
        ChatMessageReq { role: "system".into(), content: system.into() },
        ChatMessageReq { role: "user".into(), content: user.into() },
      ],
      temperature,
      max_tokens: None,
    };

    let res = self.client.post(&url)
      .header(USER_AGENT, "brainrally-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await.map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_openai_error(&body).unwrap_or(body);
      return Err(format!("OpenAI HTTP {}: {}", status, msg));
    }

    let body: ChatCompletionResponse = res.json().await.map_err(|e| e.to_string())?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.first()
      .and_then(|c| c.message.content.clone())
      .unwrap_or_default().trim().to_string();

    Ok(text)
  }

  /// Fallback answer validation. Sends the puzzle prompt, the accepted
  /// answers, and the raw user answer; expects a leading CORRECT/INCORRECT
  /// token. Returns (correct, explanation).
  #[instrument(level = "info", skip(self, prompts, prompt, accepted, raw_answer),
               fields(model = %self.fast_model, accepted = accepted.len(), answer_len = raw_answer.len()))]
  pub async fn validate_answer(
    &self,
    prompts: &Prompts,
    prompt: &str,
    accepted: &[String],
    raw_answer: &str,
  ) -> Result<(bool, String), String> {
    let accepted_joined = accepted.join(" | ");
    let user = fill_template(
      &prompts.validation_user_template,
      &[
        ("prompt", prompt),
        ("accepted", &accepted_joined),
        ("answer", raw_answer),
      ],
    );

    let start = std::time::Instant::now();
    let text = self.chat_plain(&self.fast_model, &prompts.validation_system, &user, 0.0).await?;
    info!(elapsed = ?start.elapsed(), reply_len = text.len(), "Validator verdict received");

    parse_verdict(&text).ok_or_else(|| format!("unrecognized verdict: {:?}", crate::util::trunc_for_log(&text, 80)))
  }

  /// Hint generation for puzzles that carry no stored hint.
  #[instrument(level = "info", skip(self, prompts, prompt), fields(model = %self.fast_model))]
  pub async fn hint_for(&self, prompts: &Prompts, prompt: &str) -> Result<String, String> {
    let user = fill_template(&prompts.hint_user_template, &[("prompt", prompt)]);
    self.chat_plain(&self.fast_model, &prompts.hint_system, &user, 0.2).await
  }
}

/// Parse the leading verdict token; the remainder (minus separators) is the
/// explanation. None when the reply doesn't start with a known token.
fn parse_verdict(text: &str) -> Option<(bool, String)> {
  let trimmed = text.trim();
  let (token, rest) = match trimmed.split_once(|c: char| c.is_whitespace() || c == ':' || c == '.') {
    Some((t, r)) => (t, r),
    None => (trimmed, ""),
  };
  let correct = match token.to_ascii_uppercase().as_str() {
    VERDICT_CORRECT => true,
    VERDICT_INCORRECT => false,
    _ => return None,
  };
  let explanation = rest.trim_start_matches([':', '-', '.', ' ']).trim().to_string();
  Some((correct, explanation))
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest {
  model: String,
  messages: Vec<ChatMessageReq>,
  temperature: f32,
  #[serde(skip_serializing_if = "Option::is_none")]
  max_tokens: Option<u32>,
}
#[derive(Serialize)]
struct ChatMessageReq { role: String, content: String }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_verdict_accepts_both_tokens() {
    assert_eq!(parse_verdict("CORRECT"), Some((true, String::new())));
    assert_eq!(parse_verdict("INCORRECT"), Some((false, String::new())));
  }

  #[test]
  fn parse_verdict_keeps_explanation() {
    let (ok, exp) = parse_verdict("CORRECT: synonyms of the accepted answer").unwrap();
    assert!(ok);
    assert_eq!(exp, "synonyms of the accepted answer");

    let (ok, exp) = parse_verdict("incorrect - wrong number").unwrap();
    assert!(!ok);
    assert_eq!(exp, "wrong number");
  }

  #[test]
  fn parse_verdict_rejects_anything_else() {
    assert_eq!(parse_verdict(""), None);
    assert_eq!(parse_verdict("maybe?"), None);
    assert_eq!(parse_verdict("The answer is CORRECT"), None);
  }
}
