use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    exercises::repo_types::Exercise,
    store::{ExerciseStore, LogFilter, NewExercise, StoreError},
    users::repo_types::User,
};

/// PostgreSQL-backed store. The pool connects lazily, so the service comes
/// up even when the database does not.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn connect_lazy(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect_lazy(&config.database_url)?;
        Ok(Self { pool })
    }

    /// Applies the embedded migrations. Failure is logged and reported but
    /// does not stop the process.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        match sqlx::migrate!("./migrations").run(&self.pool).await {
            Ok(()) => {
                info!("database connection successful, schema up to date");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "database connection error");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl ExerciseStore for PgStore {
    async fn create_user(&self, username: &str) -> Result<User, StoreError> {
        Ok(User::create(&self.pool, username).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(User::list(&self.pool).await?)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn create_exercise(&self, exercise: NewExercise) -> Result<Exercise, StoreError> {
        Ok(Exercise::create(&self.pool, &exercise).await?)
    }

    async fn list_exercises(
        &self,
        user_id: Uuid,
        filter: &LogFilter,
    ) -> Result<Vec<Exercise>, StoreError> {
        Ok(Exercise::list_by_user(&self.pool, user_id, filter).await?)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("database pool closed");
    }
}
