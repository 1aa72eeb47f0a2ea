//! First-run data.

use chrono::Local;
use tracing::info;

use super::FlatFileStore;
use crate::config::SeedConfig;
use crate::error::Result;
use crate::model::{new_id, Role, Trek, TrekDraft, User};
use crate::password;

/// Username of the demo tourist account.
pub const SAMPLE_TOURIST_USERNAME: &str = "tourist";

const SAMPLE_TOURIST_PASSWORD: &str = "tourist123";

/// Name, region, altitude, days, difficulty, price, description, best season.
const SAMPLE_TREKS: [(&str, &str, u32, u32, &str, f64, &str, &str); 5] = [
    (
        "Everest Base Camp Trek",
        "Khumbu",
        5364,
        14,
        "Difficult",
        1500.0,
        "Experience the world's highest peak up close",
        "Spring,Autumn",
    ),
    (
        "Annapurna Circuit",
        "Annapurna",
        5416,
        18,
        "Difficult",
        1800.0,
        "Complete circuit around the Annapurna massif",
        "Spring,Autumn",
    ),
    (
        "Langtang Valley",
        "Langtang",
        4600,
        7,
        "Moderate",
        900.0,
        "Beautiful valley trek with rich culture",
        "Spring,Autumn,Winter",
    ),
    (
        "Poon Hill Trek",
        "Annapurna",
        3210,
        5,
        "Easy",
        700.0,
        "Short trek with amazing mountain views",
        "All Year",
    ),
    (
        "Manaslu Circuit",
        "Manaslu",
        5115,
        16,
        "Very Difficult",
        1600.0,
        "Remote and challenging trek around Manaslu",
        "Spring,Autumn",
    ),
];

/// What a seeding pass created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub tourist_created: bool,
    pub treks_created: usize,
}

impl FlatFileStore {
    /// Insert the admin, demo tourist and sample treks that are missing.
    ///
    /// Safe to run on every start. The caller holds the write lock.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing or writing fails.
    pub fn seed(&self, seed: &SeedConfig, bcrypt_cost: u32) -> Result<SeedReport> {
        let mut report = SeedReport::default();
        if !seed.enabled {
            return Ok(report);
        }

        if self.find_user_by_username(&seed.admin_username)?.is_none() {
            self.users().append(&User {
                id: new_id(),
                username: seed.admin_username.clone(),
                password: password::hash(&seed.admin_password, bcrypt_cost)?,
                full_name: "System Administrator".to_string(),
                email: "admin@tripsewa.com".to_string(),
                contact_number: "9800000000".to_string(),
                nationality: "Nepal".to_string(),
                passport_number: None,
                emergency_contact: None,
                role: Role::Admin,
                registered_at: Some(Local::now().naive_local()),
            })?;
            info!(username = %seed.admin_username, "Created admin account");
            report.admin_created = true;
        }

        if seed.sample_tourist && self.find_user_by_username(SAMPLE_TOURIST_USERNAME)?.is_none() {
            self.users().append(&User {
                id: new_id(),
                username: SAMPLE_TOURIST_USERNAME.to_string(),
                password: password::hash(SAMPLE_TOURIST_PASSWORD, bcrypt_cost)?,
                full_name: "BibekDkl".to_string(),
                email: "tourist@example.com".to_string(),
                contact_number: "9800000001".to_string(),
                nationality: "Nepal".to_string(),
                passport_number: Some("T123456".to_string()),
                emergency_contact: Some("9800000002".to_string()),
                role: Role::Tourist,
                registered_at: Some(Local::now().naive_local()),
            })?;
            info!(username = SAMPLE_TOURIST_USERNAME, "Created sample tourist account");
            report.tourist_created = true;
        }

        if seed.sample_treks && self.treks().is_empty()? {
            for (name, region, altitude, days, difficulty, price, description, season) in
                SAMPLE_TREKS
            {
                self.treks().append(&Trek::from_draft(
                    new_id(),
                    TrekDraft {
                        name: name.to_string(),
                        region: region.to_string(),
                        max_altitude: altitude,
                        duration_days: days,
                        difficulty: difficulty.to_string(),
                        base_price: price,
                        description: description.to_string(),
                        seasonal: true,
                        best_season: Some(season.to_string()),
                    },
                ))?;
            }
            report.treks_created = SAMPLE_TREKS.len();
            info!(count = report.treks_created, "Created sample treks");
        }

        Ok(report)
    }
}
