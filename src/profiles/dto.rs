use serde::Deserialize;
use time::OffsetDateTime;

use crate::profiles::model::{Address, EducationEntry, Gender, SocialLinks};

/// PUT body; the stored profile is replaced as a unit, absent optional
/// sections become empty.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertProfileRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_of_birth: Option<OffsetDateTime>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub education: Option<Vec<EducationEntry>>,
    #[serde(default)]
    pub social_links: Option<SocialLinks>,
}
