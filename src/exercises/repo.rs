use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    exercises::repo_types::Exercise,
    store::{LogFilter, NewExercise},
};

/// Log query; bounds and limit are only added to the SQL when present.
/// `from` is inclusive, `to` exclusive.
pub fn log_query(user_id: Uuid, filter: &LogFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(
        "SELECT id, user_id, description, duration, date \
         FROM exercises WHERE user_id = ",
    );
    query.push_bind(user_id);
    if let Some(from) = filter.from {
        query.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND date < ").push_bind(to);
    }
    query.push(" ORDER BY date ASC, created_at ASC");
    if let Some(limit) = filter.limit {
        query.push(" LIMIT ").push_bind(i64::from(limit));
    }
    query
}

impl Exercise {
    pub async fn create(db: &PgPool, new: &NewExercise) -> Result<Exercise, sqlx::Error> {
        sqlx::query_as::<_, Exercise>(
            r#"
            INSERT INTO exercises (id, user_id, description, duration, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, description, duration, date
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.description)
        .bind(new.duration)
        .bind(new.date)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        filter: &LogFilter,
    ) -> Result<Vec<Exercise>, sqlx::Error> {
        log_query(user_id, filter)
            .build_query_as::<Exercise>()
            .fetch_all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const SELECT: &str =
        "SELECT id, user_id, description, duration, date FROM exercises WHERE user_id = $1";

    #[test]
    fn unfiltered_log_orders_by_date_then_insertion() {
        let query = log_query(Uuid::new_v4(), &LogFilter::default());
        assert_eq!(
            query.sql(),
            format!("{SELECT} ORDER BY date ASC, created_at ASC")
        );
    }

    #[test]
    fn bounds_are_half_open_and_limit_is_last() {
        let filter = LogFilter {
            from: Some(datetime!(2023-01-01 0:00 UTC)),
            to: Some(datetime!(2023-06-01 0:00 UTC)),
            limit: Some(5),
        };
        let query = log_query(Uuid::new_v4(), &filter);
        assert_eq!(
            query.sql(),
            format!(
                "{SELECT} AND date >= $2 AND date < $3 \
                 ORDER BY date ASC, created_at ASC LIMIT $4"
            )
        );
    }

    #[test]
    fn single_bound_keeps_placeholders_in_sequence() {
        let filter = LogFilter {
            to: Some(datetime!(2023-06-01 0:00 UTC)),
            limit: Some(1),
            ..LogFilter::default()
        };
        let query = log_query(Uuid::new_v4(), &filter);
        assert_eq!(
            query.sql(),
            format!("{SELECT} AND date < $2 ORDER BY date ASC, created_at ASC LIMIT $3")
        );
    }
}
