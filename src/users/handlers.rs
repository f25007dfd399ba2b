use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{dto::SignupRequest, jwt::AdminUser, password::hash_password, validate::validate_signup},
    error::ApiError,
    state::AppState,
    users::{
        dto::{CreateUserRequest, ListQuery, RoleFilter, UpdateUserRequest},
        model::User,
        repo::{NewUser, UserPatch},
    },
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", axum::routing::put(update_user).delete(delete_user))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = match query.filter() {
        RoleFilter::Any => User::list(&state.db, None).await?,
        RoleFilter::Only(role) => User::list(&state.db, Some(role)).await?,
        RoleFilter::Nothing => Vec::new(),
    };
    Ok(Json(users))
}

#[instrument(skip(state, admin, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let password = payload
        .password
        .clone()
        .unwrap_or_else(|| state.config.provisional_password.clone());

    // Directory entries obey the same field constraints as self-service
    // signup, provisional password included.
    let candidate = SignupRequest {
        name: payload.name,
        username: payload.username.trim().to_lowercase(),
        email: payload.email.trim().to_lowercase(),
        password,
        phone: payload.phone,
        role: payload.role,
        roll_number: payload.roll_number,
        teacher_id: payload.teacher_id,
    };
    let role = validate_signup(&candidate).map_err(|errors| {
        warn!(count = errors.len(), "directory create validation failed");
        ApiError::Validation(errors)
    })?;

    let password_hash = hash_password(&candidate.password)?;
    let user = User::create(
        &state.db,
        NewUser {
            name: candidate.name.trim().to_string(),
            username: candidate.username,
            email: candidate.email,
            password_hash,
            phone: candidate.phone.trim().to_string(),
            role,
        },
    )
    .await?;

    info!(admin_id = %admin.id, user_id = %user.id, "directory entry created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<User>, ApiError> {
    let patch = UserPatch {
        name: payload.name,
        username: payload.username.map(|u| u.trim().to_lowercase()),
        phone: payload.phone,
        roll_number: payload.roll_number,
        teacher_id: payload.teacher_id,
    };

    let user = User::update(&state.db, id, patch)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    info!(admin_id = %admin.id, user_id = %user.id, "directory entry updated");
    Ok(Json(user))
}

#[instrument(skip(state, admin))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User"));
    }
    info!(admin_id = %admin.id, user_id = %id, "directory entry deleted");
    Ok(Json(json!({ "message": "User deleted successfully" })))
}
