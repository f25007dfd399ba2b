use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, SignupRequest},
        jwt::{bearer_token, AuthUser, JwtKeys},
        password::{hash_password, verify_password},
        validate::validate_signup,
    },
    error::ApiError,
    state::AppState,
    users::model::{Role, User},
    users::repo::NewUser,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/verify", get(verify))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_lowercase();

    let role = validate_signup(&payload).map_err(|errors| {
        warn!(count = errors.len(), "signup validation failed");
        ApiError::Validation(errors)
    })?;

    let password_hash = hash_password(&payload.password)?;

    // Duplicate email/username/identifier comes back from the unique
    // indexes, so concurrent signups cannot slip past a pre-check read.
    let user = User::create(
        &state.db,
        NewUser {
            name: payload.name.trim().to_string(),
            username: payload.username,
            email: payload.email,
            password_hash,
            phone: payload.phone.trim().to_string(),
            role,
        },
    )
    .await?;

    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    // Unknown email, wrong role and wrong password are indistinguishable to
    // the caller: same status, same message.
    let role = payload
        .role
        .trim()
        .parse::<Role>()
        .map_err(|_| ApiError::InvalidCredentials)?;

    let user = match User::find_by_email_and_role(&state.db, &email, role).await? {
        Some(user) => user,
        None => {
            warn!(email = %email, role = %role, "login: no matching account");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login: password mismatch");
        return Err(ApiError::InvalidCredentials);
    }

    let user = User::touch_last_login(&state.db, user.id).await?;
    let token = JwtKeys::from_ref(&state).sign(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse { token, user }))
}

/// Echo the presented token together with the freshly loaded account, so the
/// client can restore a persisted session.
#[instrument(skip_all)]
pub async fn verify(
    headers: HeaderMap,
    AuthUser(user): AuthUser,
) -> Result<Json<AuthResponse>, ApiError> {
    let token = bearer_token(&headers)?.to_string();
    Ok(Json(AuthResponse { token, user }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::model::RoleDetails;
    use time::OffsetDateTime;
    use uuid::Uuid;

    #[test]
    fn auth_response_serialization_is_sanitized() {
        let response = AuthResponse {
            token: "tok".into(),
            user: User {
                id: Uuid::new_v4(),
                name: "A".into(),
                username: "abc".into(),
                email: "a@x.com".into(),
                password_hash: "hash".into(),
                phone: "1234567890".into(),
                role: RoleDetails::Student {
                    roll_number: "R1".into(),
                },
                created_at: OffsetDateTime::now_utc(),
                last_login: None,
            },
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token"], "tok");
        assert_eq!(json["user"]["rollNumber"], "R1");
        assert!(json["user"].get("passwordHash").is_none());
    }

    #[test]
    fn signup_request_accepts_wire_field_names() {
        let body = serde_json::json!({
            "name": "A",
            "username": "abc",
            "email": "a@x.com",
            "password": "secret1",
            "phone": "1234567890",
            "role": "student",
            "rollNumber": "R1"
        });
        let req: SignupRequest = serde_json::from_value(body).unwrap();
        assert_eq!(req.roll_number.as_deref(), Some("R1"));
        assert!(req.teacher_id.is_none());
    }
}
