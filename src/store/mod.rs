//! Storage facade: MongoDB when reachable, in-memory fallback otherwise.
//!
//! The backend is selected once at startup. Callers get one set of find /
//! insert / upsert operations and never branch on the backend type. The
//! in-memory fallback has no durability: data is lost on restart. That is a
//! documented limitation, not a bug.

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{LevelProgressRecord, StreakRecord, User};

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongodb error: {0}")]
    Mongo(#[from] mongodb::error::Error),
}

pub enum Store {
    Mongo(MongoStore),
    Memory(MemoryStore),
}

impl Store {
    /// Select the backend once: try MONGODB_URI (ping-checked), fall back to
    /// the in-memory store on any connection failure or when unset.
    pub async fn connect_from_env() -> Self {
        if let Ok(uri) = std::env::var("MONGODB_URI") {
            let db_name = std::env::var("MONGODB_DB").unwrap_or_else(|_| "brainrally".into());
            match MongoStore::connect(&uri, &db_name).await {
                Ok(store) => {
                    info!(target: "brainrally_backend", db = %db_name, "Connected to MongoDB");
                    return Store::Mongo(store);
                }
                Err(e) => {
                    warn!(target: "brainrally_backend", error = %e, "MongoDB unreachable; falling back to in-memory store");
                }
            }
        } else {
            info!(target: "brainrally_backend", "MONGODB_URI not set; using in-memory store (no durability)");
        }
        Store::Memory(MemoryStore::new())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Mongo(_) => "mongodb",
            Store::Memory(_) => "memory",
        }
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        match self {
            Store::Mongo(s) => s.find_user_by_id(id).await,
            Store::Memory(s) => Ok(s.find_user_by_id(id).await),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        match self {
            Store::Mongo(s) => s.find_user_by_email(email).await,
            Store::Memory(s) => Ok(s.find_user_by_email(email).await),
        }
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        match self {
            Store::Mongo(s) => s.find_user_by_username(username).await,
            Store::Memory(s) => Ok(s.find_user_by_username(username).await),
        }
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        match self {
            Store::Mongo(s) => s.insert_user(user).await,
            Store::Memory(s) => {
                s.insert_user(user).await;
                Ok(())
            }
        }
    }

    pub async fn find_streak(&self, user_id: &str) -> Result<Option<StreakRecord>, StoreError> {
        match self {
            Store::Mongo(s) => s.find_streak(user_id).await,
            Store::Memory(s) => Ok(s.find_streak(user_id).await),
        }
    }

    pub async fn upsert_streak(&self, record: &StreakRecord) -> Result<(), StoreError> {
        match self {
            Store::Mongo(s) => s.upsert_streak(record).await,
            Store::Memory(s) => {
                s.upsert_streak(record).await;
                Ok(())
            }
        }
    }

    pub async fn find_progress(
        &self,
        user_id: &str,
        category: &str,
        level: u32,
    ) -> Result<Option<LevelProgressRecord>, StoreError> {
        match self {
            Store::Mongo(s) => s.find_progress(user_id, category, level).await,
            Store::Memory(s) => Ok(s.find_progress(user_id, category, level).await),
        }
    }

    pub async fn upsert_progress(&self, record: &LevelProgressRecord) -> Result<(), StoreError> {
        match self {
            Store::Mongo(s) => s.upsert_progress(record).await,
            Store::Memory(s) => {
                s.upsert_progress(record).await;
                Ok(())
            }
        }
    }
}
