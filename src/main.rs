//! BrainRally · Brain-Training Backend
//!
//! - Axum HTTP/JSON API (auth, puzzles, stats, progress)
//! - MongoDB persistence with transparent in-memory fallback
//! - Optional OpenAI answer-validation fallback (via environment variables)
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   MONGODB_URI       : enables the MongoDB backend if reachable
//!   MONGODB_DB        : database name (default "brainrally")
//!   AUTH_TOKEN_SECRET : bearer-token signing secret (random per process if unset)
//!   OPENAI_API_KEY    : enables OpenAI fallback validation if present
//!   OPENAI_BASE_URL   : default "https://api.openai.com/v1"
//!   OPENAI_FAST_MODEL : default "gpt-4o-mini"
//!   PUZZLE_CONFIG_PATH : path to TOML config (prompts + optional puzzle bank)
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod catalog;
mod matcher;
mod auth;
mod store;
mod streak;
mod progress;
mod state;
mod protocol;
mod openai;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (catalog, store, OpenAI client, keys).
  let state = Arc::new(AppState::new().await);

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "brainrally_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
