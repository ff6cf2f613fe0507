/*
 * Responsibility
 * - GET /api/idm/users, GET /api/idm/users/{user_id}
 * - Read-only view over the identity store; access is decided by the gate
 */
use axum::{
    Json,
    extract::{Path, State},
};

use crate::{api::idm::dto::users::UserResponse, error::AppError, state::AppState};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.directory.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state
        .directory
        .find_user(&user_id)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(user.into()))
}
