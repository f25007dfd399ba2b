use axum::{extract::State, routing::get, Json, Router};
use tracing::{info, instrument};

use crate::{
    auth::jwt::AuthUser,
    error::{ApiError, FieldError},
    profiles::{dto::UpsertProfileRequest, model::Profile},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(put_profile))
}

#[instrument(skip(state, user))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Profile>, ApiError> {
    let profile = Profile::find_by_user(&state.db, user.id)
        .await?
        .ok_or(ApiError::NotFound("Profile"))?;
    Ok(Json(profile))
}

#[instrument(skip(state, user, payload))]
pub async fn put_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpsertProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let mut errors = Vec::new();
    if payload.first_name.trim().is_empty() {
        errors.push(FieldError::new("firstName", "First name is required"));
    }
    if payload.last_name.trim().is_empty() {
        errors.push(FieldError::new("lastName", "Last name is required"));
    }
    if payload.bio.as_deref().map(|b| b.chars().count() > 500) == Some(true) {
        errors.push(FieldError::new("bio", "Bio must be at most 500 characters"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let profile = Profile::upsert(&state.db, user.id, payload).await?;
    info!(user_id = %user.id, "profile upserted");
    Ok(Json(profile))
}
