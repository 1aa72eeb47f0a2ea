//! Trek catalog entries.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::codec::{Fields, Record};

/// A guided multi-day itinerary offered for booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trek {
    pub id: String,
    pub name: String,
    pub region: String,
    /// Highest point in metres.
    pub max_altitude: u32,
    /// Length in days.
    pub duration_days: u32,
    /// Free-text level, e.g. "Moderate" or "Very Difficult".
    pub difficulty: String,
    pub base_price: f64,
    pub description: String,
    pub seasonal: bool,
    /// Comma-separated seasons, e.g. "Spring,Autumn".
    pub best_season: Option<String>,
}

/// Trek fields without an id, used for create and update.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrekDraft {
    pub name: String,
    pub region: String,
    pub max_altitude: u32,
    pub duration_days: u32,
    pub difficulty: String,
    pub base_price: f64,
    pub description: String,
    pub seasonal: bool,
    pub best_season: Option<String>,
}

impl Trek {
    #[must_use]
    pub fn from_draft(id: String, draft: TrekDraft) -> Self {
        Self {
            id,
            name: draft.name,
            region: draft.region,
            max_altitude: draft.max_altitude,
            duration_days: draft.duration_days,
            difficulty: draft.difficulty,
            base_price: draft.base_price,
            description: draft.description,
            seasonal: draft.seasonal,
            best_season: draft.best_season,
        }
    }

    /// Current values as a draft, for partial edits.
    #[must_use]
    pub fn to_draft(&self) -> TrekDraft {
        TrekDraft {
            name: self.name.clone(),
            region: self.region.clone(),
            max_altitude: self.max_altitude,
            duration_days: self.duration_days,
            difficulty: self.difficulty.clone(),
            base_price: self.base_price,
            description: self.description.clone(),
            seasonal: self.seasonal,
            best_season: self.best_season.clone(),
        }
    }

    /// Whether the difficulty appears in `high_risk` (case-insensitive).
    #[must_use]
    pub fn is_high_risk(&self, high_risk: &[String]) -> bool {
        high_risk
            .iter()
            .any(|level| level.trim().eq_ignore_ascii_case(self.difficulty.trim()))
    }
}

impl Record for Trek {
    const FILE_NAME: &'static str = "treks.txt";
    const FIELD_NAMES: &'static [&'static str] = &[
        "id",
        "name",
        "region",
        "max_altitude",
        "duration",
        "difficulty",
        "base_price",
        "description",
        "seasonal",
        "best_season",
    ];
    const MIN_FIELDS: usize = 8;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.region.clone(),
            self.max_altitude.to_string(),
            self.duration_days.to_string(),
            self.difficulty.clone(),
            self.base_price.to_string(),
            self.description.clone(),
            self.seasonal.to_string(),
            self.best_season.clone().unwrap_or_default(),
        ]
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Self {
            id: fields.text(0),
            name: fields.text(1),
            region: fields.text(2),
            max_altitude: fields.parse(3)?,
            duration_days: fields.parse(4)?,
            difficulty: fields.text(5),
            base_price: fields.parse(6)?,
            description: fields.text(7),
            seasonal: fields.flag(8),
            best_season: fields.optional(9),
        })
    }
}
