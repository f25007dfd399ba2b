use serde::Deserialize;

use crate::users::model::Role;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub role: Option<String>,
}

/// Role filter resolved from the query string. An empty value means no
/// filter; an unknown role matches no records instead of failing the
/// request, mirroring the lookup semantics of the directory store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFilter {
    Any,
    Only(Role),
    Nothing,
}

impl ListQuery {
    pub fn filter(&self) -> RoleFilter {
        match self.role.as_deref().map(str::trim) {
            None | Some("") => RoleFilter::Any,
            Some(value) => match value.parse::<Role>() {
                Ok(role) => RoleFilter::Only(role),
                Err(_) => RoleFilter::Nothing,
            },
        }
    }
}

/// Administrator-supplied record. The secret is optional; when absent the
/// configured provisional password is assigned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    pub phone: String,
    pub role: String,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
}

/// Directory patch. `password`, `role` and `email` have no field here, so a
/// request carrying them simply has those values dropped on deserialization;
/// they are immutable through this path.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub roll_number: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<String>,
}
