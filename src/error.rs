use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::OnceLock;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// One violated constraint on one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Domain errors, mapped to status + JSON at the route boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),
    #[error("User with this email already exists")]
    DuplicateEmail,
    #[error("Username already taken")]
    DuplicateUsername,
    #[error("{0} already exists")]
    DuplicateIdentifier(&'static str),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Missing Authorization header")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    ExpiredToken,
    #[error("Access denied.")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::DuplicateEmail
            | ApiError::DuplicateUsername
            | ApiError::DuplicateIdentifier(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::MissingToken
            | ApiError::InvalidToken
            | ApiError::ExpiredToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// JSON body for the response; internal detail only when running in
    /// development.
    fn body(&self, dev_mode: bool) -> serde_json::Value {
        match self {
            ApiError::Validation(errors) => json!({
                "message": self.to_string(),
                "errors": errors,
            }),
            ApiError::Internal(e) if dev_mode => {
                json!({ "message": self.to_string(), "error": e.to_string() })
            }
            _ => json!({ "message": self.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(e) = &self {
            error!(error = %e, "internal error");
        }
        (self.status(), Json(self.body(dev_mode()))).into_response()
    }
}

static DEV_MODE: OnceLock<bool> = OnceLock::new();

/// Record the environment once at startup, from the injected configuration.
/// Until then responses behave as in production and hide internal detail.
pub fn set_dev_mode(dev: bool) {
    let _ = DEV_MODE.set(dev);
}

fn dev_mode() -> bool {
    DEV_MODE.get().copied().unwrap_or(false)
}

/// Unique-index violations carry the constraint name; everything else is a 500.
impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return match db.constraint() {
                    Some("users_email_key") => ApiError::DuplicateEmail,
                    Some("users_username_key") => ApiError::DuplicateUsername,
                    Some("users_roll_number_key") => ApiError::DuplicateIdentifier("Roll number"),
                    Some("users_teacher_id_key") => ApiError::DuplicateIdentifier("Teacher ID"),
                    _ => ApiError::Internal(e.into()),
                };
            }
            if db.is_check_violation() && db.constraint() == Some("users_role_identifier") {
                return ApiError::Validation(vec![FieldError::new(
                    "role",
                    "Identifier does not match role",
                )]);
            }
        }
        ApiError::Internal(e.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::Validation(vec![]).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::DuplicateEmail.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::DuplicateIdentifier("Roll number").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::ExpiredToken.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("User").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            ApiError::InvalidCredentials.to_string(),
            "Invalid credentials"
        );
        assert_eq!(
            ApiError::DuplicateIdentifier("Teacher ID").to_string(),
            "Teacher ID already exists"
        );
        assert_eq!(ApiError::NotFound("User").to_string(), "User not found");
    }

    #[test]
    fn internal_detail_rendered_only_in_development() {
        let err = ApiError::Internal(anyhow::anyhow!("db exploded"));
        let dev = err.body(true);
        assert_eq!(dev["message"], "Server error");
        assert_eq!(dev["error"], "db exploded");

        let prod = err.body(false);
        assert_eq!(prod["message"], "Server error");
        assert!(prod.get("error").is_none());
    }

    #[test]
    fn validation_body_carries_field_errors() {
        let err = ApiError::Validation(vec![FieldError::new("phone", "Phone number must be 10 digits")]);
        let body = err.body(false);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"][0]["field"], "phone");
        assert_eq!(body["errors"][0]["message"], "Phone number must be 10 digits");
    }
}
