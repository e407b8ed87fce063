//! MongoDB-backed store. Documents are the domain records serialized through
//! serde/bson; upserts replace whole documents keyed by user (plus
//! category/level for progress).

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::{ClientOptions, ReplaceOptions};
use mongodb::{Client, Collection};

use crate::domain::{LevelProgressRecord, StreakRecord, User};
use crate::store::StoreError;

const USERS: &str = "users";
const STREAKS: &str = "streaks";
const PROGRESS: &str = "level_progress";

pub struct MongoStore {
    users: Collection<User>,
    streaks: Collection<StreakRecord>,
    progress: Collection<LevelProgressRecord>,
}

impl MongoStore {
    /// Connect and ping. A short server-selection timeout keeps startup from
    /// hanging when the database is down; the caller falls back to memory.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let mut opts = ClientOptions::parse(uri).await?;
        opts.server_selection_timeout = Some(Duration::from_secs(3));
        let client = Client::with_options(opts)?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }, None).await?;

        Ok(Self {
            users: db.collection(USERS),
            streaks: db.collection(STREAKS),
            progress: db.collection(PROGRESS),
        })
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(doc! { "id": id }, None).await?)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(doc! { "email": email }, None).await?)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.find_one(doc! { "username": username }, None).await?)
    }

    pub async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        self.users.insert_one(user, None).await?;
        Ok(())
    }

    pub async fn find_streak(&self, user_id: &str) -> Result<Option<StreakRecord>, StoreError> {
        Ok(self.streaks.find_one(doc! { "user_id": user_id }, None).await?)
    }

    pub async fn upsert_streak(&self, record: &StreakRecord) -> Result<(), StoreError> {
        let opts = ReplaceOptions::builder().upsert(true).build();
        self.streaks
            .replace_one(doc! { "user_id": &record.user_id }, record, opts)
            .await?;
        Ok(())
    }

    pub async fn find_progress(
        &self,
        user_id: &str,
        category: &str,
        level: u32,
    ) -> Result<Option<LevelProgressRecord>, StoreError> {
        let filter = doc! { "user_id": user_id, "category": category, "level": level as i32 };
        Ok(self.progress.find_one(filter, None).await?)
    }

    pub async fn upsert_progress(&self, record: &LevelProgressRecord) -> Result<(), StoreError> {
        let filter = doc! {
            "user_id": &record.user_id,
            "category": &record.category,
            "level": record.level as i32,
        };
        let opts = ReplaceOptions::builder().upsert(true).build();
        self.progress.replace_one(filter, record, opts).await?;
        Ok(())
    }
}
