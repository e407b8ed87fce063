//! In-process fallback store: RwLock'd HashMaps, no durability.
//!
//! Lookups by email/username scan the user map; fine at fallback scale.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::domain::{LevelProgressRecord, StreakRecord, User};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    streaks: RwLock<HashMap<String, StreakRecord>>,
    progress: RwLock<HashMap<(String, String, u32), LevelProgressRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn find_user_by_id(&self, id: &str) -> Option<User> {
        self.users.read().await.get(id).cloned()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Option<User> {
        self.users.read().await.values().find(|u| u.email == email).cloned()
    }

    pub async fn find_user_by_username(&self, username: &str) -> Option<User> {
        self.users.read().await.values().find(|u| u.username == username).cloned()
    }

    pub async fn insert_user(&self, user: &User) {
        self.users.write().await.insert(user.id.clone(), user.clone());
    }

    pub async fn find_streak(&self, user_id: &str) -> Option<StreakRecord> {
        self.streaks.read().await.get(user_id).cloned()
    }

    pub async fn upsert_streak(&self, record: &StreakRecord) {
        self.streaks.write().await.insert(record.user_id.clone(), record.clone());
    }

    pub async fn find_progress(
        &self,
        user_id: &str,
        category: &str,
        level: u32,
    ) -> Option<LevelProgressRecord> {
        self.progress
            .read()
            .await
            .get(&(user_id.to_string(), category.to_string(), level))
            .cloned()
    }

    pub async fn upsert_progress(&self, record: &LevelProgressRecord) {
        self.progress.write().await.insert(
            (record.user_id.clone(), record.category.clone(), record.level),
            record.clone(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StreakRecord;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            username: format!("u-{}", id),
            email: format!("{}@example.com", id),
            password_hash: "phc".into(),
        }
    }

    #[tokio::test]
    async fn user_lookups_by_id_email_username() {
        let store = MemoryStore::new();
        store.insert_user(&user("a")).await;
        store.insert_user(&user("b")).await;

        assert_eq!(store.find_user_by_id("a").await.unwrap().id, "a");
        assert_eq!(store.find_user_by_email("b@example.com").await.unwrap().id, "b");
        assert_eq!(store.find_user_by_username("u-a").await.unwrap().id, "a");
        assert!(store.find_user_by_id("c").await.is_none());
    }

    #[tokio::test]
    async fn streak_upsert_replaces() {
        let store = MemoryStore::new();
        assert!(store.find_streak("a").await.is_none());

        let mut rec = StreakRecord::new("a");
        store.upsert_streak(&rec).await;
        rec.current_streak = 3;
        store.upsert_streak(&rec).await;

        assert_eq!(store.find_streak("a").await.unwrap().current_streak, 3);
    }

    #[tokio::test]
    async fn progress_is_keyed_per_category_and_level() {
        let store = MemoryStore::new();
        let rec = crate::domain::LevelProgressRecord::new("a", "math", 1, 5);
        store.upsert_progress(&rec).await;

        assert!(store.find_progress("a", "math", 1).await.is_some());
        assert!(store.find_progress("a", "math", 2).await.is_none());
        assert!(store.find_progress("a", "logic", 1).await.is_none());
        assert!(store.find_progress("b", "math", 1).await.is_none());
    }
}
