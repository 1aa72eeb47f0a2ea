//! Booking lifecycle.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

use super::{Session, TrekDesk};
use crate::error::{Error, Result};
use crate::model::{new_id, Booking, BookingStatus, BookingView, Permission, Role};

impl TrekDesk {
    /// Book trek `trek_id` for the signed-in tourist.
    ///
    /// The price is the trek's festival quote on `date`. High-risk treks
    /// need `acknowledge_high_risk`.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller cannot book, the trek does not exist,
    /// or the risk was not acknowledged.
    pub fn book_trek(
        &self,
        session: &Session,
        trek_id: &str,
        date: NaiveDate,
        acknowledge_high_risk: bool,
    ) -> Result<Booking> {
        session.require(Permission::BookTreks)?;

        let _lock = self.store.write_lock()?;
        let trek = self.find_trek(trek_id)?;

        if trek.is_high_risk(&self.config.booking.high_risk_difficulties) && !acknowledge_high_risk
        {
            return Err(Error::HighRiskNotAcknowledged {
                trek: trek.name,
                difficulty: trek.difficulty,
            });
        }

        let quote = self.calendar.quote(trek.base_price, date);
        let booking = Booking {
            id: new_id(),
            trek_id: trek.id.clone(),
            tourist_id: session.user().id.clone(),
            guide_id: None,
            booking_date: date,
            status: BookingStatus::Pending,
            price: quote.final_price,
            duration_days: trek.duration_days,
            high_risk_acknowledged: acknowledge_high_risk,
        };
        self.store.bookings().append(&booking)?;

        info!(
            id = %booking.id,
            trek = %trek.name,
            tourist = %session.user().username,
            price = booking.price,
            festival = quote.festival.as_deref().unwrap_or("-"),
            "Booked trek"
        );
        Ok(booking)
    }

    /// The signed-in tourist's bookings.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller has no bookings of their own to manage.
    pub fn my_bookings(&self, session: &Session) -> Result<Vec<BookingView>> {
        session.require(Permission::ManageOwnBookings)?;

        let _lock = self.store.read_lock()?;
        self.own_bookings(session)
    }

    pub(super) fn own_bookings(&self, session: &Session) -> Result<Vec<BookingView>> {
        let bookings = self
            .store
            .bookings()
            .filter(|booking| booking.tourist_id == session.user().id)?;
        self.views(bookings)
    }

    /// Bookings assigned to the signed-in guide.
    ///
    /// An account without a guide profile has no trips.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not a guide.
    pub fn assigned_trips(&self, session: &Session) -> Result<Vec<BookingView>> {
        session.require(Permission::ViewAssignedTrips)?;

        let _lock = self.store.read_lock()?;
        self.guide_trips(session)
    }

    pub(super) fn guide_trips(&self, session: &Session) -> Result<Vec<BookingView>> {
        let Some(profile) = self.store.find_guide_by_user(&session.user().id)? else {
            return Ok(Vec::new());
        };
        let bookings = self
            .store
            .bookings()
            .filter(|booking| booking.guide_id.as_deref() == Some(profile.id.as_str()))?;
        self.views(bookings)
    }

    /// Every booking, optionally only those with `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin.
    pub fn all_bookings(
        &self,
        session: &Session,
        status: Option<BookingStatus>,
    ) -> Result<Vec<BookingView>> {
        session.require(Permission::ManageAllBookings)?;

        let _lock = self.store.read_lock()?;
        let bookings = self
            .store
            .bookings()
            .filter(|booking| status.is_none() || status == Some(booking.status))?;
        self.views(bookings)
    }

    /// Cancel booking `id`.
    ///
    /// Tourists may only cancel their own bookings; admins any.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is missing, belongs to someone else,
    /// is completed or already cancelled.
    pub fn cancel_booking(&self, session: &Session, id: &str) -> Result<Booking> {
        if !session.can(Permission::ManageAllBookings) {
            session.require(Permission::ManageOwnBookings)?;
        }

        let _lock = self.store.write_lock()?;
        let mut booking = self.find_booking(id)?;
        check_owner(session, &booking)?;

        match booking.status {
            BookingStatus::Completed => {
                return Err(Error::invalid_booking_state(
                    booking.status,
                    "completed bookings cannot be cancelled",
                ))
            }
            BookingStatus::Cancelled => {
                return Err(Error::invalid_booking_state(
                    booking.status,
                    "booking is already cancelled",
                ))
            }
            BookingStatus::Pending | BookingStatus::Confirmed => {}
        }

        booking.status = BookingStatus::Cancelled;
        self.store.bookings().replace(&booking)?;
        info!(id, by = %session.user().username, "Cancelled booking");
        Ok(booking)
    }

    /// Move a pending booking to `date`, re-quoting the price.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is missing, belongs to someone else,
    /// is no longer pending, or its trek no longer exists.
    pub fn reschedule_booking(
        &self,
        session: &Session,
        id: &str,
        date: NaiveDate,
    ) -> Result<Booking> {
        session.require(Permission::ManageOwnBookings)?;

        let _lock = self.store.write_lock()?;
        let mut booking = self.find_booking(id)?;
        check_owner(session, &booking)?;

        if booking.status != BookingStatus::Pending {
            return Err(Error::invalid_booking_state(
                booking.status,
                "only pending bookings can be rescheduled",
            ));
        }

        let trek = self.find_trek(&booking.trek_id)?;
        booking.booking_date = date;
        booking.price = self.calendar.quote(trek.base_price, date).final_price;
        self.store.bookings().replace(&booking)?;

        info!(id, %date, price = booking.price, "Rescheduled booking");
        Ok(booking)
    }

    /// Set any status on booking `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the booking is missing.
    pub fn set_booking_status(
        &self,
        session: &Session,
        id: &str,
        status: BookingStatus,
    ) -> Result<Booking> {
        session.require(Permission::ManageAllBookings)?;

        let _lock = self.store.write_lock()?;
        let mut booking = self.find_booking(id)?;
        let previous = booking.status;
        booking.status = status;
        self.store.bookings().replace(&booking)?;

        info!(id, from = %previous, to = %status, "Changed booking status");
        Ok(booking)
    }

    /// Put guide `guide_id` on booking `booking_id` and confirm it.
    ///
    /// # Errors
    ///
    /// Returns an error if either record is missing, the guide is
    /// unavailable, or the booking is cancelled or completed.
    pub fn assign_guide(
        &self,
        session: &Session,
        booking_id: &str,
        guide_id: &str,
    ) -> Result<Booking> {
        session.require(Permission::ManageAllBookings)?;

        let _lock = self.store.write_lock()?;
        let mut booking = self.find_booking(booking_id)?;
        let guide = self
            .store
            .guides()
            .find(guide_id)?
            .ok_or_else(|| Error::not_found("guide", guide_id))?;

        if !guide.available {
            return Err(Error::GuideUnavailable(guide.name));
        }
        if !matches!(
            booking.status,
            BookingStatus::Pending | BookingStatus::Confirmed
        ) {
            return Err(Error::invalid_booking_state(
                booking.status,
                "guides can only be assigned to pending or confirmed bookings",
            ));
        }

        booking.guide_id = Some(guide.id);
        booking.status = BookingStatus::Confirmed;
        self.store.bookings().replace(&booking)?;

        info!(booking = booking_id, guide = %guide.name, "Assigned guide");
        Ok(booking)
    }

    fn find_booking(&self, id: &str) -> Result<Booking> {
        self.store
            .bookings()
            .find(id)?
            .ok_or_else(|| Error::not_found("booking", id))
    }

    /// Join bookings with trek, tourist and guide names.
    pub(super) fn views(&self, bookings: Vec<Booking>) -> Result<Vec<BookingView>> {
        let treks: HashMap<String, String> = self
            .store
            .treks()
            .load()?
            .into_iter()
            .map(|trek| (trek.id, trek.name))
            .collect();
        let tourists: HashMap<String, String> = self
            .store
            .users()
            .load()?
            .into_iter()
            .map(|user| (user.id, user.full_name))
            .collect();
        let guides: HashMap<String, String> = self
            .store
            .guides()
            .load()?
            .into_iter()
            .map(|guide| (guide.id, guide.name))
            .collect();

        Ok(bookings
            .into_iter()
            .map(|booking| BookingView {
                trek_name: treks.get(&booking.trek_id).cloned(),
                tourist_name: tourists.get(&booking.tourist_id).cloned(),
                guide_name: booking
                    .guide_id
                    .as_ref()
                    .and_then(|id| guides.get(id).cloned()),
                booking,
            })
            .collect())
    }
}

/// Tourists may only touch their own bookings.
fn check_owner(session: &Session, booking: &Booking) -> Result<()> {
    if session.role() == Role::Tourist && booking.tourist_id != session.user().id {
        return Err(Error::PermissionDenied {
            role: session.role().to_string(),
            permission: Permission::ManageAllBookings.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::model::Trek;

    fn setup() -> (tempfile::TempDir, TrekDesk, Trek, Trek) {
        let (dir, desk) = create_test_desk();
        let admin = admin(&desk);
        let easy = desk
            .add_trek(&admin, trek_draft("Poon Hill Trek", "Easy", 700.0))
            .unwrap();
        let risky = desk
            .add_trek(&admin, trek_draft("Manaslu Circuit", "Very Difficult", 1600.0))
            .unwrap();
        (dir, desk, easy, risky)
    }

    #[test]
    fn test_book_trek() {
        let (_dir, desk, easy, _) = setup();
        let session = tourist(&desk);

        let booking = desk
            .book_trek(&session, &easy.id, date(2025, 7, 29), false)
            .unwrap();

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.tourist_id, session.user().id);
        assert_eq!(booking.duration_days, 7);
        assert!((booking.price - 700.0).abs() < 1e-9);
        assert!(booking.guide_id.is_none());
    }

    #[test]
    fn test_book_trek_festival_price() {
        let (_dir, desk, easy, _) = setup();
        let booking = desk
            .book_trek(&tourist(&desk), &easy.id, date(2025, 10, 1), false)
            .unwrap();
        assert!((booking.price - 630.0).abs() < 1e-9);
    }

    #[test]
    fn test_high_risk_requires_acknowledgement() {
        let (_dir, desk, _, risky) = setup();
        let session = tourist(&desk);

        let err = desk
            .book_trek(&session, &risky.id, date(2025, 7, 29), false)
            .unwrap_err();
        assert!(matches!(err, Error::HighRiskNotAcknowledged { .. }));
        assert!(desk.store().bookings().is_empty().unwrap());

        let booking = desk
            .book_trek(&session, &risky.id, date(2025, 7, 29), true)
            .unwrap();
        assert!(booking.high_risk_acknowledged);
    }

    #[test]
    fn test_book_unknown_trek() {
        let (_dir, desk, _, _) = setup();
        let err = desk
            .book_trek(&tourist(&desk), "nope", date(2025, 7, 29), false)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_admin_cannot_book() {
        let (_dir, desk, easy, _) = setup();
        let err = desk
            .book_trek(&admin(&desk), &easy.id, date(2025, 7, 29), false)
            .unwrap_err();
        assert!(err.is_permission_error());
    }

    #[test]
    fn test_my_bookings_view() {
        let (_dir, desk, easy, _) = setup();
        let session = tourist(&desk);
        desk.book_trek(&session, &easy.id, date(2025, 7, 29), false)
            .unwrap();

        let other = form("dawa", Role::Tourist);
        desk.register(other.clone(), &other.password).unwrap();
        let other = desk.authenticate("dawa", &other.password).unwrap();
        desk.book_trek(&other, &easy.id, date(2025, 8, 2), false)
            .unwrap();

        let mine = desk.my_bookings(&session).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].trek_name.as_deref(), Some("Poon Hill Trek"));
        assert_eq!(mine[0].tourist_name.as_deref(), Some("BibekDkl"));
        assert!(mine[0].guide_name.is_none());
    }

    #[test]
    fn test_view_with_deleted_trek() {
        let (_dir, desk, easy, _) = setup();
        let session = tourist(&desk);
        desk.book_trek(&session, &easy.id, date(2025, 7, 29), false)
            .unwrap();
        desk.delete_trek(&admin(&desk), &easy.id).unwrap();

        let mine = desk.my_bookings(&session).unwrap();
        assert_eq!(mine.len(), 1);
        assert!(mine[0].trek_name.is_none());
    }

    #[test]
    fn test_cancel_own_booking() {
        let (_dir, desk, easy, _) = setup();
        let session = tourist(&desk);
        let booking = desk
            .book_trek(&session, &easy.id, date(2025, 7, 29), false)
            .unwrap();

        let cancelled = desk.cancel_booking(&session, &booking.id).unwrap();
        assert_eq!(cancelled.status, BookingStatus::Cancelled);

        let err = desk.cancel_booking(&session, &booking.id).unwrap_err();
        assert!(matches!(err, Error::InvalidBookingState { .. }));
    }

    #[test]
    fn test_cancel_someone_elses_booking() {
        let (_dir, desk, easy, _) = setup();
        let booking = desk
            .book_trek(&tourist(&desk), &easy.id, date(2025, 7, 29), false)
            .unwrap();

        let other = form("dawa", Role::Tourist);
        desk.register(other.clone(), &other.password).unwrap();
        let other = desk.authenticate("dawa", &other.password).unwrap();

        let err = desk.cancel_booking(&other, &booking.id).unwrap_err();
        assert!(err.is_permission_error());

        // Admins can cancel any booking
        desk.cancel_booking(&admin(&desk), &booking.id).unwrap();
    }

    #[test]
    fn test_cancel_completed_booking() {
        let (_dir, desk, easy, _) = setup();
        let session = tourist(&desk);
        let booking = desk
            .book_trek(&session, &easy.id, date(2025, 7, 29), false)
            .unwrap();
        desk.set_booking_status(&admin(&desk), &booking.id, BookingStatus::Completed)
            .unwrap();

        let err = desk.cancel_booking(&session, &booking.id).unwrap_err();
        assert!(err.to_string().contains("Completed"));
    }

    #[test]
    fn test_reschedule_requotes() {
        let (_dir, desk, easy, _) = setup();
        let session = tourist(&desk);
        let booking = desk
            .book_trek(&session, &easy.id, date(2025, 7, 29), false)
            .unwrap();

        let moved = desk
            .reschedule_booking(&session, &booking.id, date(2025, 10, 25))
            .unwrap();
        assert_eq!(moved.booking_date, date(2025, 10, 25));
        assert!((moved.price - 595.0).abs() < 1e-9);

        let stored = desk.store().bookings().find(&booking.id).unwrap().unwrap();
        assert_eq!(stored, moved);
    }

    #[test]
    fn test_reschedule_only_pending() {
        let (_dir, desk, easy, _) = setup();
        let session = tourist(&desk);
        let booking = desk
            .book_trek(&session, &easy.id, date(2025, 7, 29), false)
            .unwrap();
        desk.set_booking_status(&admin(&desk), &booking.id, BookingStatus::Confirmed)
            .unwrap();

        let err = desk
            .reschedule_booking(&session, &booking.id, date(2025, 8, 1))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidBookingState { .. }));
    }

    #[test]
    fn test_all_bookings_filter() {
        let (_dir, desk, easy, risky) = setup();
        let session = tourist(&desk);
        let first = desk
            .book_trek(&session, &easy.id, date(2025, 7, 29), false)
            .unwrap();
        desk.book_trek(&session, &risky.id, date(2025, 7, 30), true)
            .unwrap();
        let admin = admin(&desk);
        desk.cancel_booking(&admin, &first.id).unwrap();

        assert_eq!(desk.all_bookings(&admin, None).unwrap().len(), 2);
        let pending = desk
            .all_bookings(&admin, Some(BookingStatus::Pending))
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].trek_name.as_deref(), Some("Manaslu Circuit"));

        assert!(desk.all_bookings(&session, None).unwrap_err().is_permission_error());
    }

    #[test]
    fn test_assign_guide_confirms() {
        let (_dir, desk, easy, _) = setup();
        let booking = desk
            .book_trek(&tourist(&desk), &easy.id, date(2025, 7, 29), false)
            .unwrap();
        let guide_session = guide(&desk, "pasang");
        let profile = desk.guide_profile(&guide_session).unwrap();

        let assigned = desk
            .assign_guide(&admin(&desk), &booking.id, &profile.id)
            .unwrap();
        assert_eq!(assigned.status, BookingStatus::Confirmed);
        assert_eq!(assigned.guide_id.as_deref(), Some(profile.id.as_str()));

        let trips = desk.assigned_trips(&guide_session).unwrap();
        assert_eq!(trips.len(), 1);
        assert_eq!(trips[0].guide_name.as_deref(), Some("pasang Sherpa"));
    }

    #[test]
    fn test_assign_unavailable_guide() {
        let (_dir, desk, easy, _) = setup();
        let admin = admin(&desk);
        let booking = desk
            .book_trek(&tourist(&desk), &easy.id, date(2025, 7, 29), false)
            .unwrap();
        let mut draft = guide_draft("Mingma");
        draft.available = false;
        let guide = desk.add_guide(&admin, draft).unwrap();

        let err = desk.assign_guide(&admin, &booking.id, &guide.id).unwrap_err();
        assert!(matches!(err, Error::GuideUnavailable(_)));
    }

    #[test]
    fn test_assign_guide_to_cancelled_booking() {
        let (_dir, desk, easy, _) = setup();
        let admin = admin(&desk);
        let booking = desk
            .book_trek(&tourist(&desk), &easy.id, date(2025, 7, 29), false)
            .unwrap();
        desk.cancel_booking(&admin, &booking.id).unwrap();
        let guide = desk.add_guide(&admin, guide_draft("Mingma")).unwrap();

        let err = desk.assign_guide(&admin, &booking.id, &guide.id).unwrap_err();
        assert!(matches!(err, Error::InvalidBookingState { .. }));
    }

    #[test]
    fn test_assigned_trips_without_profile() {
        let (_dir, desk, _, _) = setup();
        let session = guide(&desk, "pasang");
        let profile = desk.guide_profile(&session).unwrap();
        desk.delete_guide(&admin(&desk), &profile.id).unwrap();

        assert!(desk.assigned_trips(&session).unwrap().is_empty());
    }
}
