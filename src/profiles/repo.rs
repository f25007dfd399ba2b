use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiError;
use crate::profiles::dto::UpsertProfileRequest;
use crate::profiles::model::{Profile, ProfileRow};

const PROFILE_COLUMNS: &str =
    "id, user_id, first_name, last_name, phone_number, address, date_of_birth, gender, \
     profile_picture, bio, education, social_links, created_at, updated_at";

fn into_profile(row: ProfileRow) -> Result<Profile, ApiError> {
    row.try_into().map_err(ApiError::Internal)
}

impl Profile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> Result<Option<Profile>, ApiError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1",
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        row.map(into_profile).transpose()
    }

    /// Insert or fully replace the profile owned by `user_id`.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        req: UpsertProfileRequest,
    ) -> Result<Profile, ApiError> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            r#"
            INSERT INTO profiles (user_id, first_name, last_name, phone_number, address,
                                  date_of_birth, gender, profile_picture, bio, education,
                                  social_links)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (user_id) DO UPDATE SET
                first_name      = EXCLUDED.first_name,
                last_name       = EXCLUDED.last_name,
                phone_number    = EXCLUDED.phone_number,
                address         = EXCLUDED.address,
                date_of_birth   = EXCLUDED.date_of_birth,
                gender          = EXCLUDED.gender,
                profile_picture = EXCLUDED.profile_picture,
                bio             = EXCLUDED.bio,
                education       = EXCLUDED.education,
                social_links    = EXCLUDED.social_links,
                updated_at      = now()
            RETURNING {PROFILE_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&req.first_name)
        .bind(&req.last_name)
        .bind(&req.phone_number)
        .bind(req.address.map(Json))
        .bind(req.date_of_birth)
        .bind(req.gender.map(|g| g.as_str()))
        .bind(&req.profile_picture)
        .bind(&req.bio)
        .bind(req.education.map(Json))
        .bind(req.social_links.map(Json))
        .fetch_one(db)
        .await?;
        into_profile(row)
    }
}
