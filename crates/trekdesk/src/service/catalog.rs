//! Treks, guides and quotes.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::{Session, TrekDesk};
use crate::error::{Error, Result};
use crate::model::{new_id, Guide, GuideDraft, Permission, Trek, TrekDraft};
use crate::pricing::Quote;
use crate::validation;

/// A trek with its price on a given day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub trek: Trek,
    pub quote: Quote,
}

impl TrekDesk {
    /// Every trek in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if `treks.txt` cannot be read.
    pub fn list_treks(&self) -> Result<Vec<Trek>> {
        let _lock = self.store.read_lock()?;
        self.store.treks().load()
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no trek has `id`.
    pub fn trek(&self, id: &str) -> Result<Trek> {
        let _lock = self.store.read_lock()?;
        self.find_trek(id)
    }

    pub(super) fn find_trek(&self, id: &str) -> Result<Trek> {
        self.store
            .treks()
            .find(id)?
            .ok_or_else(|| Error::not_found("trek", id))
    }

    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the draft is invalid.
    pub fn add_trek(&self, session: &Session, draft: TrekDraft) -> Result<Trek> {
        session.require(Permission::ManageTreks)?;
        validation::validate_trek(&draft)?;

        let trek = Trek::from_draft(new_id(), draft);
        let _lock = self.store.write_lock()?;
        self.store.treks().append(&trek)?;
        info!(id = %trek.id, name = %trek.name, "Added trek");
        Ok(trek)
    }

    /// Overwrite every field of trek `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin, the draft is invalid
    /// or the trek does not exist.
    pub fn update_trek(&self, session: &Session, id: &str, draft: TrekDraft) -> Result<Trek> {
        session.require(Permission::ManageTreks)?;
        validation::validate_trek(&draft)?;

        let trek = Trek::from_draft(id.to_string(), draft);
        let _lock = self.store.write_lock()?;
        if !self.store.treks().replace(&trek)? {
            return Err(Error::not_found("trek", id));
        }
        info!(id, name = %trek.name, "Updated trek");
        Ok(trek)
    }

    /// Remove trek `id`. Bookings that reference it are left in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the trek does not exist.
    pub fn delete_trek(&self, session: &Session, id: &str) -> Result<()> {
        session.require(Permission::ManageTreks)?;

        let _lock = self.store.write_lock()?;
        if !self.store.treks().remove(id)? {
            return Err(Error::not_found("trek", id));
        }
        info!(id, "Deleted trek");
        Ok(())
    }

    /// Price of trek `trek_id` for a booking dated `date`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the trek does not exist.
    pub fn quote_trek(&self, trek_id: &str, date: NaiveDate) -> Result<CatalogEntry> {
        let trek = self.trek(trek_id)?;
        let quote = self.calendar.quote(trek.base_price, date);
        Ok(CatalogEntry { trek, quote })
    }

    /// The whole catalog priced for `date`.
    pub(super) fn priced_catalog(&self, date: NaiveDate) -> Result<Vec<CatalogEntry>> {
        Ok(self
            .store
            .treks()
            .load()?
            .into_iter()
            .map(|trek| {
                let quote = self.calendar.quote(trek.base_price, date);
                CatalogEntry { trek, quote }
            })
            .collect())
    }

    /// Every guide in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if `guides.txt` cannot be read.
    pub fn list_guides(&self) -> Result<Vec<Guide>> {
        let _lock = self.store.read_lock()?;
        self.store.guides().load()
    }

    /// Guides currently taking trips.
    ///
    /// # Errors
    ///
    /// Returns an error if `guides.txt` cannot be read.
    pub fn available_guides(&self) -> Result<Vec<Guide>> {
        let _lock = self.store.read_lock()?;
        self.store.guides().filter(|guide| guide.available)
    }

    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no guide has `id`.
    pub fn guide(&self, id: &str) -> Result<Guide> {
        let _lock = self.store.read_lock()?;
        self.store
            .guides()
            .find(id)?
            .ok_or_else(|| Error::not_found("guide", id))
    }

    /// Add a guide not linked to any account.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the draft is invalid.
    pub fn add_guide(&self, session: &Session, draft: GuideDraft) -> Result<Guide> {
        session.require(Permission::ManageGuides)?;
        validation::validate_guide(&draft)?;

        let guide = Guide::from_draft(new_id(), None, draft);
        let _lock = self.store.write_lock()?;
        self.store.guides().append(&guide)?;
        info!(id = %guide.id, name = %guide.name, "Added guide");
        Ok(guide)
    }

    /// Overwrite guide `id`, keeping its account link.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin, the draft is invalid
    /// or the guide does not exist.
    pub fn update_guide(&self, session: &Session, id: &str, draft: GuideDraft) -> Result<Guide> {
        session.require(Permission::ManageGuides)?;
        validation::validate_guide(&draft)?;

        let _lock = self.store.write_lock()?;
        let existing = self
            .store
            .guides()
            .find(id)?
            .ok_or_else(|| Error::not_found("guide", id))?;

        let guide = Guide::from_draft(existing.id, existing.user_id, draft);
        self.store.guides().replace(&guide)?;
        info!(id, name = %guide.name, "Updated guide");
        Ok(guide)
    }

    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the guide does not exist.
    pub fn delete_guide(&self, session: &Session, id: &str) -> Result<()> {
        session.require(Permission::ManageGuides)?;

        let _lock = self.store.write_lock()?;
        if !self.store.guides().remove(id)? {
            return Err(Error::not_found("guide", id));
        }
        info!(id, "Deleted guide");
        Ok(())
    }

    /// The guide profile linked to the signed-in guide account.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not a guide or has no profile.
    pub fn guide_profile(&self, session: &Session) -> Result<Guide> {
        session.require(Permission::ViewAssignedTrips)?;

        let _lock = self.store.read_lock()?;
        self.store
            .find_guide_by_user(&session.user().id)?
            .ok_or_else(|| Error::not_found("guide profile", &session.user().username))
    }
}
