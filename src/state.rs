//! Application state: puzzle catalog, storage facade, prompts, OpenAI client,
//! token keys, and the per-user solve locks.
//!
//! Everything here is built once at startup from the environment. The catalog
//! is read-only afterwards; the store facade hides which backend was picked.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::auth::TokenKeys;
use crate::catalog::Catalog;
use crate::config::{load_bank_config_from_env, Prompts};
use crate::openai::OpenAI;
use crate::store::Store;

pub struct AppState {
    pub catalog: Catalog,
    pub store: Store,
    pub openai: Option<OpenAI>,
    pub prompts: Prompts,
    pub tokens: TokenKeys,
    // One lock per user serializes every streak/progress read-modify-write
    // (solve, time-spent, progress materialization), closing lost-update
    // races between concurrent requests.
    solve_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AppState {
    /// Build state from env: load config, build the catalog, pick the storage
    /// backend, init OpenAI and token keys.
    #[instrument(level = "info", skip_all)]
    pub async fn new() -> Self {
        let cfg_opt = load_bank_config_from_env();
        let prompts = cfg_opt
            .as_ref()
            .map(|c| c.prompts.clone())
            .unwrap_or_default();

        let catalog = Catalog::build(cfg_opt.as_ref());
        info!(target: "puzzle", total = catalog.len(), "Puzzle catalog ready");

        let store = Store::connect_from_env().await;

        let openai = OpenAI::from_env();
        if let Some(oa) = &openai {
            info!(target: "brainrally_backend", base_url = %oa.base_url, model = %oa.fast_model, "OpenAI fallback validator enabled");
        } else {
            info!(target: "brainrally_backend", "OpenAI disabled (no OPENAI_API_KEY); local matching only");
        }

        Self {
            catalog,
            store,
            openai,
            prompts,
            tokens: TokenKeys::from_env(),
            solve_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Per-user lock guarding streak/progress bookkeeping. The registry grows
    /// with the user set; entries are tiny and never removed.
    pub async fn user_lock(&self, user_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.solve_locks.lock().await;
        locks.entry(user_id.to_string()).or_default().clone()
    }
}
