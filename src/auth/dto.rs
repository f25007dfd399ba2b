use serde::{Deserialize, Serialize};

use crate::users::model::User;

/// Request body for self-service signup.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
}

/// Request body for login. The role-conditional identifiers are accepted for
/// compatibility with the client form but play no part in authentication.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
}

/// Returned by signup, login and verify: a bearer token plus the sanitized
/// user record.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}
