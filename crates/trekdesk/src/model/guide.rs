//! Guide profiles.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::codec::{Fields, Record};

/// Languages given to a guide profile created at registration.
pub const DEFAULT_LANGUAGES: &str = "English, Nepali";

/// Certification given to a guide profile created at registration.
pub const DEFAULT_CERTIFICATIONS: &str = "Basic Guide Training";

/// Specialization given to a guide profile created at registration.
pub const DEFAULT_SPECIALIZATIONS: &str = "General Trekking";

/// A trekking guide, optionally linked to a user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guide {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub languages: String,
    pub years_of_experience: u32,
    pub certifications: String,
    pub specializations: String,
    pub available: bool,
}

/// Guide fields without id or account link.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuideDraft {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub languages: String,
    pub years_of_experience: u32,
    pub certifications: String,
    pub specializations: String,
    pub available: bool,
}

impl Guide {
    #[must_use]
    pub fn from_draft(id: String, user_id: Option<String>, draft: GuideDraft) -> Self {
        Self {
            id,
            user_id,
            name: draft.name,
            email: draft.email,
            phone_number: draft.phone_number,
            languages: draft.languages,
            years_of_experience: draft.years_of_experience,
            certifications: draft.certifications,
            specializations: draft.specializations,
            available: draft.available,
        }
    }

    #[must_use]
    pub fn to_draft(&self) -> GuideDraft {
        GuideDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            languages: self.languages.clone(),
            years_of_experience: self.years_of_experience,
            certifications: self.certifications.clone(),
            specializations: self.specializations.clone(),
            available: self.available,
        }
    }

    /// Profile created alongside a guide account.
    #[must_use]
    pub fn for_account(id: String, user_id: String, name: &str, email: &str, phone: &str) -> Self {
        Self {
            id,
            user_id: Some(user_id),
            name: name.to_string(),
            email: email.to_string(),
            phone_number: phone.to_string(),
            languages: DEFAULT_LANGUAGES.to_string(),
            years_of_experience: 0,
            certifications: DEFAULT_CERTIFICATIONS.to_string(),
            specializations: DEFAULT_SPECIALIZATIONS.to_string(),
            available: true,
        }
    }
}

impl Record for Guide {
    const FILE_NAME: &'static str = "guides.txt";
    const FIELD_NAMES: &'static [&'static str] = &[
        "id",
        "user_id",
        "name",
        "email",
        "phone_number",
        "languages",
        "years_of_experience",
        "certifications",
        "specializations",
        "available",
    ];
    const MIN_FIELDS: usize = 5;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.user_id.clone().unwrap_or_default(),
            self.name.clone(),
            self.email.clone(),
            self.phone_number.clone(),
            self.languages.clone(),
            self.years_of_experience.to_string(),
            self.certifications.clone(),
            self.specializations.clone(),
            self.available.to_string(),
        ]
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.text(0),
            user_id: fields.optional(1),
            name: fields.text(2),
            email: fields.text(3),
            phone_number: fields.text(4),
            languages: fields.text(5),
            years_of_experience: fields.parse_or(6, 0)?,
            certifications: fields.text(7),
            specializations: fields.text(8),
            available: fields.flag(9),
        })
    }
}
