use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Exercise record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Exercise {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub duration: f64,
    pub date: OffsetDateTime,
}
