//! Statistics and role dashboards.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use super::{CatalogEntry, Session, TrekDesk};
use crate::error::Result;
use crate::model::{BookingStatus, BookingView, Guide, Permission, Role};

/// The trek booked most often.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopularTrek {
    pub trek_id: String,
    pub trek_name: String,
    pub bookings: usize,
}

/// Booking totals across the whole agency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingStatistics {
    pub total_bookings: usize,
    /// Every status, including those with no bookings.
    pub by_status: BTreeMap<BookingStatus, usize>,
    /// Sum of confirmed and completed booking prices.
    pub total_revenue: f64,
    pub most_popular: Option<PopularTrek>,
}

/// What each role sees after signing in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Admin {
        statistics: BookingStatistics,
        pending_bookings: usize,
        guides: usize,
        available_guides: usize,
        treks: usize,
    },
    Guide {
        profile: Option<Guide>,
        trips: Vec<BookingView>,
    },
    Tourist {
        bookings: Vec<BookingView>,
        catalog: Vec<CatalogEntry>,
    },
}

impl TrekDesk {
    /// # Errors
    ///
    /// Returns an error if the caller cannot view reports.
    pub fn booking_statistics(&self, session: &Session) -> Result<BookingStatistics> {
        session.require(Permission::ViewReports)?;

        let _lock = self.store.read_lock()?;
        self.statistics()
    }

    fn statistics(&self) -> Result<BookingStatistics> {
        let bookings = self.store.bookings().load()?;
        let trek_names: HashMap<String, String> = self
            .store
            .treks()
            .load()?
            .into_iter()
            .map(|trek| (trek.id, trek.name))
            .collect();

        let mut by_status: BTreeMap<BookingStatus, usize> =
            BookingStatus::ALL.iter().map(|status| (*status, 0)).collect();
        let mut total_revenue = 0.0;
        // Trek id and count in first-seen order, so ties go to the earliest.
        // Deleted treks are not ranked.
        let mut popularity: Vec<(String, usize)> = Vec::new();

        for booking in &bookings {
            *by_status.entry(booking.status).or_default() += 1;
            if booking.status.is_revenue() {
                total_revenue += booking.price;
            }
            if !trek_names.contains_key(&booking.trek_id) {
                continue;
            }
            match popularity.iter_mut().find(|(id, _)| *id == booking.trek_id) {
                Some((_, count)) => *count += 1,
                None => popularity.push((booking.trek_id.clone(), 1)),
            }
        }

        let mut most_popular: Option<(String, usize)> = None;
        for (trek_id, count) in popularity {
            let best = most_popular.as_ref().map_or(0, |(_, best)| *best);
            if count > best {
                most_popular = Some((trek_id, count));
            }
        }
        let most_popular = most_popular.map(|(trek_id, bookings)| PopularTrek {
            trek_name: trek_names.get(&trek_id).cloned().unwrap_or_default(),
            trek_id,
            bookings,
        });

        Ok(BookingStatistics {
            total_bookings: bookings.len(),
            by_status,
            total_revenue: (total_revenue * 100.0).round() / 100.0,
            most_popular,
        })
    }

    /// The signed-in role's summary, with catalog prices quoted for `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data files cannot be read.
    pub fn dashboard(&self, session: &Session, today: NaiveDate) -> Result<Dashboard> {
        let _lock = self.store.read_lock()?;

        match session.role() {
            Role::Admin => {
                let guides = self.store.guides().load()?;
                let statistics = self.statistics()?;
                Ok(Dashboard::Admin {
                    pending_bookings: statistics
                        .by_status
                        .get(&BookingStatus::Pending)
                        .copied()
                        .unwrap_or_default(),
                    statistics,
                    available_guides: guides.iter().filter(|guide| guide.available).count(),
                    guides: guides.len(),
                    treks: self.store.treks().count()?,
                })
            }
            Role::Guide => Ok(Dashboard::Guide {
                profile: self.store.find_guide_by_user(&session.user().id)?,
                trips: self.guide_trips(session)?,
            }),
            Role::Tourist => Ok(Dashboard::Tourist {
                bookings: self.own_bookings(session)?,
                catalog: self.priced_catalog(today)?,
            }),
        }
    }
}
