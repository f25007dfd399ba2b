use anyhow::bail;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::str::FromStr;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationEntry {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLinks {
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            v => bail!("unknown gender: {v}"),
        }
    }
}

/// Raw storage shape; free-form sections live in JSONB columns.
#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<Json<Address>>,
    pub date_of_birth: Option<OffsetDateTime>,
    pub gender: Option<String>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub education: Option<Json<Vec<EducationEntry>>>,
    pub social_links: Option<Json<SocialLinks>>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Extended personal data, one-to-one with a user. Optional for
/// authentication; fetched and replaced as a unit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: Option<String>,
    pub address: Option<Address>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub date_of_birth: Option<OffsetDateTime>,
    pub gender: Option<Gender>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub education: Option<Vec<EducationEntry>>,
    pub social_links: Option<SocialLinks>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = anyhow::Error;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let gender = row.gender.as_deref().map(Gender::from_str).transpose()?;
        Ok(Profile {
            id: row.id,
            user_id: row.user_id,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            address: row.address.map(|j| j.0),
            date_of_birth: row.date_of_birth,
            gender,
            profile_picture: row.profile_picture,
            bio: row.bio,
            education: row.education.map(|j| j.0),
            social_links: row.social_links.map(|j| j.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_parses_known_values_only() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("other".parse::<Gender>().unwrap(), Gender::Other);
        assert!("robot".parse::<Gender>().is_err());
    }

    #[test]
    fn address_uses_camel_case_wire_names() {
        let address: Address = serde_json::from_value(serde_json::json!({
            "street": "1 Main St",
            "zipCode": "12345"
        }))
        .unwrap();
        assert_eq!(address.zip_code.as_deref(), Some("12345"));
        let json = serde_json::to_value(&address).unwrap();
        assert_eq!(json["zipCode"], "12345");
    }
}
