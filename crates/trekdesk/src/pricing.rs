//! Festival discounts.
//!
//! A festival is a yearly window of calendar days. A booking dated inside a
//! window gets that festival's percentage off the trek base price; when
//! windows overlap the largest discount wins.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::config::FestivalConfig;
use crate::error::{Error, Result};

/// A day of the year, independent of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    /// Parse `MM-DD`. February 29 is accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a real calendar day.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || Error::validation("festival", format!("invalid day '{text}', expected MM-DD"));

        let (month, day) = text.trim().split_once('-').ok_or_else(invalid)?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let day: u32 = day.parse().map_err(|_| invalid())?;

        // 2024 is a leap year, so every valid month/day exists in it
        NaiveDate::from_ymd_opt(2024, month, day).ok_or_else(invalid)?;
        Ok(Self { month, day })
    }

    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }
}

/// A yearly discount window.
#[derive(Debug, Clone, PartialEq)]
pub struct Festival {
    pub name: String,
    pub start: MonthDay,
    pub end: MonthDay,
    pub discount_percent: f64,
}

impl Festival {
    /// Whether `date` falls inside the window, both ends included.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        let day = MonthDay::of(date);
        if self.start <= self.end {
            self.start <= day && day <= self.end
        } else {
            // Wraps the year end
            day >= self.start || day <= self.end
        }
    }
}

/// Price of a trek on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quote {
    pub base_price: f64,
    pub festival: Option<String>,
    pub discount_percent: f64,
    pub final_price: f64,
}

/// All configured festivals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FestivalCalendar {
    festivals: Vec<Festival>,
}

impl FestivalCalendar {
    #[must_use]
    pub fn new(festivals: Vec<Festival>) -> Self {
        Self { festivals }
    }

    /// Build from configuration entries.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the festival if a day is not
    /// `MM-DD` or the discount is outside `0..=100`.
    pub fn from_config(entries: &[FestivalConfig]) -> Result<Self> {
        let festivals = entries
            .iter()
            .map(|entry| {
                let invalid = |message: String| Error::ConfigValidation {
                    message: format!("festival '{}': {message}", entry.name),
                };
                if !(0.0..=100.0).contains(&entry.discount_percent) {
                    return Err(invalid(format!(
                        "discount_percent ({}) must be between 0 and 100",
                        entry.discount_percent
                    )));
                }
                Ok(Festival {
                    name: entry.name.clone(),
                    start: MonthDay::parse(&entry.start).map_err(|e| invalid(e.to_string()))?,
                    end: MonthDay::parse(&entry.end).map_err(|e| invalid(e.to_string()))?,
                    discount_percent: entry.discount_percent,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { festivals })
    }

    #[must_use]
    pub fn festivals(&self) -> &[Festival] {
        &self.festivals
    }

    /// The best-discount festival running on `date`.
    #[must_use]
    pub fn festival_on(&self, date: NaiveDate) -> Option<&Festival> {
        self.festivals
            .iter()
            .filter(|festival| festival.contains(date))
            .fold(None, |best: Option<&Festival>, festival| match best {
                Some(current) if current.discount_percent >= festival.discount_percent => {
                    Some(current)
                }
                _ => Some(festival),
            })
    }

    /// Price `base_price` for a booking dated `date`.
    #[must_use]
    pub fn quote(&self, base_price: f64, date: NaiveDate) -> Quote {
        match self.festival_on(date) {
            Some(festival) => Quote {
                base_price,
                festival: Some(festival.name.clone()),
                discount_percent: festival.discount_percent,
                final_price: round_cents(base_price * (1.0 - festival.discount_percent / 100.0)),
            },
            None => Quote {
                base_price,
                festival: None,
                discount_percent: 0.0,
                final_price: round_cents(base_price),
            },
        }
    }
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
