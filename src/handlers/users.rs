use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::dtos::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::startup::AppState;

#[tracing::instrument(skip(state, data))]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(data): ValidatedJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state.users.register_user(data).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

#[tracing::instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get_user(&id).await?;
    Ok(Json(UserResponse::from(user)))
}

// A well-formed id with no user behind it answers 200 with a null body, the
// same shape the store reports for a no-match update.
#[tracing::instrument(skip(state, data))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(data): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<Option<UserResponse>>, AppError> {
    let user = state.users.update_user_info(&id, data).await?;
    Ok(Json(user.map(UserResponse::from)))
}

#[tracing::instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.users.remove_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
