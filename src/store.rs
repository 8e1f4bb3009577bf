use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{exercises::repo_types::Exercise, users::repo_types::User};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Fields of an exercise before it is persisted.
#[derive(Debug, Clone)]
pub struct NewExercise {
    pub user_id: Uuid,
    pub description: String,
    pub duration: f64,
    pub date: OffsetDateTime,
}

/// Selection for a user's exercise log. `from` is inclusive, `to` exclusive.
#[derive(Debug, Clone, Default)]
pub struct LogFilter {
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
    pub limit: Option<u32>,
}

/// Persistence for users and their exercises.
#[async_trait]
pub trait ExerciseStore: Send + Sync {
    async fn create_user(&self, username: &str) -> Result<User, StoreError>;
    /// All users in insertion order.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn create_exercise(&self, exercise: NewExercise) -> Result<Exercise, StoreError>;
    /// Exercises of `user_id` matching `filter`, oldest date first.
    async fn list_exercises(
        &self,
        user_id: Uuid,
        filter: &LogFilter,
    ) -> Result<Vec<Exercise>, StoreError>;
    /// Releases the underlying connections. Called once at shutdown.
    async fn close(&self);
}
