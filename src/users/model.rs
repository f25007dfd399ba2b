use anyhow::bail;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

/// Account role; drives both route authorization and the identifier variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "teacher" => Ok(Role::Teacher),
            "student" => Ok(Role::Student),
            other => bail!("unknown role: {other}"),
        }
    }
}

/// Role plus its role-conditional identifier. A student always carries a roll
/// number and a teacher always carries a teacher id; there is no way to build
/// a mismatched pair. Serializes flattened into the user as
/// `{"role": "student", "rollNumber": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleDetails {
    Admin,
    Teacher {
        #[serde(rename = "teacherId")]
        teacher_id: String,
    },
    Student {
        #[serde(rename = "rollNumber")]
        roll_number: String,
    },
}

impl RoleDetails {
    pub fn role(&self) -> Role {
        match self {
            RoleDetails::Admin => Role::Admin,
            RoleDetails::Teacher { .. } => Role::Teacher,
            RoleDetails::Student { .. } => Role::Student,
        }
    }

    pub fn roll_number(&self) -> Option<&str> {
        match self {
            RoleDetails::Student { roll_number } => Some(roll_number),
            _ => None,
        }
    }

    pub fn teacher_id(&self) -> Option<&str> {
        match self {
            RoleDetails::Teacher { teacher_id } => Some(teacher_id),
            _ => None,
        }
    }

    /// Rebuild the variant from the flat storage columns.
    pub fn from_columns(
        role: &str,
        roll_number: Option<String>,
        teacher_id: Option<String>,
    ) -> anyhow::Result<Self> {
        match role.parse::<Role>()? {
            Role::Admin => Ok(RoleDetails::Admin),
            Role::Teacher => match teacher_id {
                Some(teacher_id) => Ok(RoleDetails::Teacher { teacher_id }),
                None => bail!("teacher row without teacher_id"),
            },
            Role::Student => match roll_number {
                Some(roll_number) => Ok(RoleDetails::Student { roll_number }),
                None => bail!("student row without roll_number"),
            },
        }
    }
}

/// Raw storage shape of a user.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub role: String,
    pub roll_number: Option<String>,
    pub teacher_id: Option<String>,
    pub created_at: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
}

/// User record. The serialized form is the sanitized record: the password
/// hash never leaves the service boundary.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: String,
    #[serde(flatten)]
    pub role: RoleDetails,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = RoleDetails::from_columns(&row.role, row.roll_number, row.teacher_id)?;
        Ok(User {
            id: row.id,
            name: row.name,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            phone: row.phone,
            role,
            created_at: row.created_at,
            last_login: row.last_login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: RoleDetails) -> User {
        User {
            id: Uuid::new_v4(),
            name: "Test User".into(),
            username: "testuser".into(),
            email: "test@example.com".into(),
            password_hash: "$argon2id$fake".into(),
            phone: "1234567890".into(),
            role,
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
        }
    }

    #[test]
    fn serialized_user_never_contains_password() {
        let user = sample_user(RoleDetails::Student {
            roll_number: "R1".into(),
        });
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "student");
        assert_eq!(json["rollNumber"], "R1");
    }

    #[test]
    fn teacher_serializes_with_teacher_id() {
        let user = sample_user(RoleDetails::Teacher {
            teacher_id: "T42".into(),
        });
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["role"], "teacher");
        assert_eq!(json["teacherId"], "T42");
        assert!(json.get("rollNumber").is_none());
    }

    #[test]
    fn from_columns_enforces_role_identifier_pairing() {
        assert!(RoleDetails::from_columns("admin", None, None).is_ok());
        assert!(RoleDetails::from_columns("student", Some("R1".into()), None).is_ok());
        assert!(RoleDetails::from_columns("student", None, None).is_err());
        assert!(RoleDetails::from_columns("teacher", None, None).is_err());
        assert!(RoleDetails::from_columns("principal", None, None).is_err());
    }

    #[test]
    fn role_parses_and_displays() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!("superuser".parse::<Role>().is_err());
    }
}
