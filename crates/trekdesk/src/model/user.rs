//! Accounts, roles and permissions.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::DATETIME_FORMAT;
use crate::error::{Error, Result};
use crate::store::codec::{Fields, Record};

/// Something a signed-in account may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewCatalog,
    ViewOwnProfile,
    ChangeOwnPassword,

    BookTreks,
    ManageOwnBookings,

    ViewAssignedTrips,

    ManageTreks,
    ManageGuides,
    ManageAllBookings,
    ManageUsers,
    ViewReports,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::ViewCatalog => "view the trek catalog",
            Self::ViewOwnProfile => "view their profile",
            Self::ChangeOwnPassword => "change their password",
            Self::BookTreks => "book treks",
            Self::ManageOwnBookings => "manage their bookings",
            Self::ViewAssignedTrips => "view assigned trips",
            Self::ManageTreks => "manage treks",
            Self::ManageGuides => "manage guides",
            Self::ManageAllBookings => "manage all bookings",
            Self::ManageUsers => "manage users",
            Self::ViewReports => "view reports",
        };
        f.write_str(text)
    }
}

static BASE_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ViewCatalog);
    permissions.insert(Permission::ViewOwnProfile);
    permissions.insert(Permission::ChangeOwnPassword);

    permissions
});

static TOURIST_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(BASE_PERMISSIONS.iter().copied());

    permissions.insert(Permission::BookTreks);
    permissions.insert(Permission::ManageOwnBookings);

    permissions
});

static GUIDE_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(BASE_PERMISSIONS.iter().copied());

    permissions.insert(Permission::ViewAssignedTrips);

    permissions
});

static ADMIN_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(BASE_PERMISSIONS.iter().copied());

    permissions.insert(Permission::ManageTreks);
    permissions.insert(Permission::ManageGuides);
    permissions.insert(Permission::ManageAllBookings);
    permissions.insert(Permission::ManageUsers);
    permissions.insert(Permission::ViewReports);

    permissions
});

/// Account role; decides which dashboard and operations are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Guide,
    Tourist,
}

impl Role {
    #[must_use]
    pub fn permissions(&self) -> &'static HashSet<Permission> {
        match self {
            Self::Admin => &ADMIN_PERMISSIONS,
            Self::Guide => &GUIDE_PERMISSIONS,
            Self::Tourist => &TOURIST_PERMISSIONS,
        }
    }

    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Guide => "GUIDE",
            Self::Tourist => "TOURIST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "GUIDE" => Ok(Self::Guide),
            "TOURIST" => Ok(Self::Tourist),
            _ => Err(Error::validation("role", format!("unknown role '{s}'"))),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: String,
    pub username: String,
    /// bcrypt hash, or plaintext on rows written before hashing.
    #[serde(skip_serializing)]
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub nationality: String,
    pub passport_number: Option<String>,
    pub emergency_contact: Option<String>,
    pub role: Role,
    pub registered_at: Option<NaiveDateTime>,
}

impl Record for User {
    const FILE_NAME: &'static str = "users.txt";
    const FIELD_NAMES: &'static [&'static str] = &[
        "id",
        "username",
        "password",
        "full_name",
        "email",
        "contact_number",
        "nationality",
        "passport_number",
        "emergency_contact",
        "role",
        "registration_date",
    ];
    const MIN_FIELDS: usize = 10;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.username.clone(),
            self.password.clone(),
            self.full_name.clone(),
            self.email.clone(),
            self.contact_number.clone(),
            self.nationality.clone(),
            self.passport_number.clone().unwrap_or_default(),
            self.emergency_contact.clone().unwrap_or_default(),
            self.role.to_string(),
            self.registered_at
                .map(|at| at.format(DATETIME_FORMAT).to_string())
                .unwrap_or_default(),
        ]
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        let role = fields
            .text(9)
            .parse()
            .map_err(|e: Error| Error::corrupt(Self::FILE_NAME, e.to_string()))?;
        let registered_at = match fields.optional(10) {
            Some(raw) => Some(
                NaiveDateTime::parse_from_str(raw.trim(), DATETIME_FORMAT).map_err(|_| {
                    Error::corrupt(Self::FILE_NAME, format!("bad registration date '{raw}'"))
                })?,
            ),
            None => None,
        };

        Ok(Self {
            id: fields.text(0),
            username: fields.text(1),
            password: fields.text(2),
            full_name: fields.text(3),
            email: fields.text(4),
            contact_number: fields.text(5),
            nationality: fields.text(6),
            passport_number: fields.optional(7),
            emergency_contact: fields.optional(8),
            role,
            registered_at,
        })
    }
}

/// Registration form.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// Derived from the email local part when not given.
    pub username: Option<String>,
    pub password: String,
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub nationality: String,
    pub passport_number: Option<String>,
    pub emergency_contact: String,
    pub role: Option<Role>,
}

impl NewUser {
    /// Username to register: explicit, or the part of the email before `@`.
    #[must_use]
    pub fn resolved_username(&self) -> String {
        match &self.username {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => self
                .email
                .trim()
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Admin edit of an account; password and registration date are kept.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub contact_number: String,
    pub nationality: String,
    pub passport_number: Option<String>,
    pub emergency_contact: Option<String>,
    pub role: Role,
}

impl UserUpdate {
    /// Pre-filled from an existing account.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            contact_number: user.contact_number.clone(),
            nationality: user.nationality.clone(),
            passport_number: user.passport_number.clone(),
            emergency_contact: user.emergency_contact.clone(),
            role: user.role,
        }
    }
}
