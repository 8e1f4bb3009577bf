use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    error::{not_found, AppError},
    extract::Payload,
    state::AppState,
    users::dto::{CreateUserRequest, PublicUser},
};

pub fn user_routes() -> Router<AppState> {
    Router::new().route(
        "/api/users",
        post(create_user).get(list_users).fallback(not_found),
    )
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateUserRequest>,
) -> Result<Json<PublicUser>, AppError> {
    let Some(username) = payload.username.filter(|u| !u.is_empty()) else {
        warn!("username missing");
        return Err(AppError::bad_request("Username is required"));
    };

    let user = state
        .store
        .create_user(&username)
        .await
        .map_err(AppError::store("Failed to create user"))?;

    info!(user_id = %user.id, username = %user.username, "user created");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<PublicUser>>, AppError> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(AppError::store("Failed to fetch users"))?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}
