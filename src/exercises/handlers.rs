use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    dates::{display_date, normalize_date},
    error::{not_found, AppError},
    exercises::{
        dto::{CreateExerciseRequest, ExerciseResponse, LogEntry, LogQuery, LogResponse},
        services::{build_filter, parse_duration, parse_user_id},
    },
    extract::{Params, Payload, QueryParams},
    state::AppState,
    store::NewExercise,
};

pub fn exercise_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users/:_id/exercises",
            post(create_exercise).fallback(not_found),
        )
        .route("/api/users/:_id/logs", get(get_logs).fallback(not_found))
}

#[instrument(skip(state, payload))]
pub async fn create_exercise(
    State(state): State<AppState>,
    Params(raw_id): Params<String>,
    Payload(payload): Payload<CreateExerciseRequest>,
) -> Result<Json<ExerciseResponse>, AppError> {
    let CreateExerciseRequest {
        description,
        duration,
        date,
    } = payload;
    let (Some(description), Some(duration)) = (
        description.filter(|d| !d.is_empty()),
        duration.filter(|d| !d.is_empty()),
    ) else {
        warn!("description or duration missing");
        return Err(AppError::bad_request("Description and Duration are required"));
    };
    let Some(duration) = parse_duration(&duration) else {
        warn!(%duration, "duration is not a number");
        return Err(AppError::bad_request("Duration should be a number"));
    };

    let user_id = parse_user_id(&raw_id)?;
    let user = state
        .store
        .find_user(user_id)
        .await
        .map_err(AppError::store("Failed to create exercise"))?
        .ok_or_else(AppError::user_not_found)?;

    let exercise = state
        .store
        .create_exercise(NewExercise {
            user_id: user.id,
            description,
            duration,
            date: normalize_date(date.as_deref()),
        })
        .await
        .map_err(AppError::store("Failed to create exercise"))?;

    info!(user_id = %exercise.user_id, exercise_id = %exercise.id, "exercise logged");
    Ok(Json(ExerciseResponse {
        username: user.username,
        description: exercise.description,
        duration: exercise.duration,
        date: display_date(exercise.date),
        user_id: user.id,
    }))
}

#[instrument(skip(state))]
pub async fn get_logs(
    State(state): State<AppState>,
    Params(raw_id): Params<String>,
    QueryParams(query): QueryParams<LogQuery>,
) -> Result<Json<LogResponse>, AppError> {
    let user_id = parse_user_id(&raw_id)?;
    let user = state
        .store
        .find_user(user_id)
        .await
        .map_err(AppError::store("Failed to get logs"))?
        .ok_or_else(AppError::user_not_found)?;

    let filter = build_filter(
        query.from.as_deref(),
        query.to.as_deref(),
        query.limit.as_deref(),
    )?;
    let exercises = state
        .store
        .list_exercises(user.id, &filter)
        .await
        .map_err(AppError::store("Failed to get logs"))?;

    let log: Vec<LogEntry> = exercises
        .into_iter()
        .map(|e| LogEntry {
            description: e.description,
            duration: e.duration,
            date: display_date(e.date),
        })
        .collect();
    Ok(Json(LogResponse {
        username: user.username,
        count: log.len(),
        user_id: user.id,
        log,
    }))
}
