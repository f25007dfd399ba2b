use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::model::{Role, RoleDetails, User, UserRow};

const USER_COLUMNS: &str =
    "id, name, username, email, password_hash, phone, role, roll_number, teacher_id, \
     created_at, last_login";

/// Fields needed to insert a user; the secret arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub role: RoleDetails,
}

/// Partial update applied by the directory. Secret, role and email are
/// deliberately absent: they cannot change through this path.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub roll_number: Option<String>,
    pub teacher_id: Option<String>,
}

fn into_user(row: UserRow) -> Result<User, ApiError> {
    row.try_into().map_err(ApiError::Internal)
}

impl User {
    /// Insert a new user. Uniqueness of email, username and the role
    /// identifier is enforced by the database indexes; violations surface
    /// as the matching duplicate error.
    pub async fn create(db: &PgPool, new: NewUser) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, username, email, password_hash, phone, role, roll_number, teacher_id)
            VALUES ($1, lower($2), lower($3), $4, $5, $6, $7, $8)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(&new.name)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.phone)
        .bind(new.role.role().as_str())
        .bind(new.role.roll_number())
        .bind(new.role.teacher_id())
        .fetch_one(db)
        .await?;
        into_user(row)
    }

    /// Lookup by the exact (email, role) pair used at login.
    pub async fn find_by_email_and_role(
        db: &PgPool,
        email: &str,
        role: Role,
    ) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND role = $2",
        ))
        .bind(email)
        .bind(role.as_str())
        .fetch_optional(db)
        .await?;
        row.map(into_user).transpose()
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        row.map(into_user).transpose()
    }

    /// Stamp a successful login and return the refreshed record.
    pub async fn touch_last_login(db: &PgPool, id: Uuid) -> Result<User, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET last_login = now() WHERE id = $1 RETURNING {USER_COLUMNS}",
        ))
        .bind(id)
        .fetch_one(db)
        .await?;
        into_user(row)
    }

    pub async fn list(db: &PgPool, role: Option<Role>) -> Result<Vec<User>, ApiError> {
        let rows = match role {
            Some(role) => {
                sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC",
                ))
                .bind(role.as_str())
                .fetch_all(db)
                .await?
            }
            None => {
                sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC",
                ))
                .fetch_all(db)
                .await?
            }
        };
        rows.into_iter().map(into_user).collect()
    }

    /// Apply a partial update; absent fields keep their stored value.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        patch: UserPatch,
    ) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                name        = COALESCE($2, name),
                username    = COALESCE(lower($3), username),
                phone       = COALESCE($4, phone),
                roll_number = COALESCE($5, roll_number),
                teacher_id  = COALESCE($6, teacher_id)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(patch.name)
        .bind(patch.username)
        .bind(patch.phone)
        .bind(patch.roll_number)
        .bind(patch.teacher_id)
        .fetch_optional(db)
        .await?;
        row.map(into_user).transpose()
    }

    /// Permanent removal; reports whether a record existed.
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
