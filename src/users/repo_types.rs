use sqlx::FromRow;
use uuid::Uuid;

/// User record in the database. Rows are ordered by their `created_at`
/// column, which stays in SQL.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}
