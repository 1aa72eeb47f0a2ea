//! Business operations over the flat-file store.
//!
//! [`TrekDesk`] is the single entry point. Every public operation takes the
//! store lock exactly once (shared for reads, exclusive for writes) and
//! works on the tables underneath it; private helpers never lock.

mod auth;
mod bookings;
mod catalog;
mod reports;
mod users;

use tracing::debug;

pub use auth::Session;
pub use catalog::CatalogEntry;
pub use reports::{BookingStatistics, Dashboard, PopularTrek};
pub use users::DeletedUser;

use crate::config::Config;
use crate::error::Result;
use crate::pricing::FestivalCalendar;
use crate::store::{FlatFileStore, SeedReport};

/// The trekking agency's back office.
#[derive(Debug)]
pub struct TrekDesk {
    store: FlatFileStore,
    config: Config,
    calendar: FestivalCalendar,
}

impl TrekDesk {
    /// Open the data directory named by `config` and seed it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or seeded, or the
    /// festival calendar is malformed.
    pub fn open(config: Config) -> Result<Self> {
        let calendar = config.festival_calendar()?;
        let store = FlatFileStore::open(&config.data_dir())?;

        let desk = Self {
            store,
            config,
            calendar,
        };
        let report = desk.seed()?;
        debug!(?report, "Seeded data directory");
        Ok(desk)
    }

    fn seed(&self) -> Result<SeedReport> {
        let _lock = self.store.write_lock()?;
        self.store
            .seed(&self.config.seed, self.config.auth.bcrypt_cost)
    }

    #[must_use]
    pub fn store(&self) -> &FlatFileStore {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn calendar(&self) -> &FestivalCalendar {
        &self.calendar
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{GuideDraft, NewUser, Role, TrekDraft};

    pub const TEST_COST: u32 = 4;

    pub fn create_test_desk() -> (tempfile::TempDir, TrekDesk) {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());
        config.auth.bcrypt_cost = TEST_COST;
        config.seed.sample_treks = false;
        let desk = TrekDesk::open(config).unwrap();
        (dir, desk)
    }

    pub fn admin(desk: &TrekDesk) -> Session {
        desk.authenticate("admin", "admin123").unwrap()
    }

    pub fn tourist(desk: &TrekDesk) -> Session {
        desk.authenticate("tourist", "tourist123").unwrap()
    }

    pub fn form(username: &str, role: Role) -> NewUser {
        NewUser {
            username: Some(username.to_string()),
            password: "Namaste#2025".to_string(),
            full_name: format!("{username} Sherpa"),
            email: format!("{username}@example.com"),
            contact_number: "9841000000".to_string(),
            nationality: "Nepal".to_string(),
            passport_number: None,
            emergency_contact: "9841000001".to_string(),
            role: Some(role),
        }
    }

    /// Register a guide account and sign in as it.
    pub fn guide(desk: &TrekDesk, username: &str) -> Session {
        let form = form(username, Role::Guide);
        desk.register(form.clone(), &form.password).unwrap();
        desk.authenticate(username, &form.password).unwrap()
    }

    pub fn trek_draft(name: &str, difficulty: &str, price: f64) -> TrekDraft {
        TrekDraft {
            name: name.to_string(),
            region: "Annapurna".to_string(),
            max_altitude: 4000,
            duration_days: 7,
            difficulty: difficulty.to_string(),
            base_price: price,
            description: "Test trek".to_string(),
            seasonal: false,
            best_season: None,
        }
    }

    pub fn guide_draft(name: &str) -> GuideDraft {
        GuideDraft {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone_number: "9800000010".to_string(),
            languages: "English, Nepali".to_string(),
            years_of_experience: 5,
            certifications: "Licensed".to_string(),
            specializations: "High altitude".to_string(),
            available: true,
        }
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }
}
