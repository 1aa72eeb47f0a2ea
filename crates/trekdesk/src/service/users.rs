//! Account administration.

use serde::Serialize;
use tracing::info;

use super::{Session, TrekDesk};
use crate::error::{Error, Result};
use crate::model::{new_id, BookingStatus, Guide, Permission, Role, User, UserUpdate};
use crate::validation;

/// What deleting an account removed along with it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedUser {
    pub user: User,
    pub guide_profile_removed: bool,
    pub bookings_cancelled: usize,
}

impl TrekDesk {
    /// Every account. Passwords are never serialized.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller cannot manage users.
    pub fn list_users(&self, session: &Session) -> Result<Vec<User>> {
        session.require(Permission::ManageUsers)?;

        let _lock = self.store.read_lock()?;
        self.store.users().load()
    }

    /// # Errors
    ///
    /// Returns an error if the caller cannot manage users or `id` is unknown.
    pub fn user(&self, session: &Session, id: &str) -> Result<User> {
        session.require(Permission::ManageUsers)?;

        let _lock = self.store.read_lock()?;
        self.store
            .users()
            .find(id)?
            .ok_or_else(|| Error::not_found("user", id))
    }

    /// Edit an account's details. Password and registration date stay.
    ///
    /// Becoming a guide creates a guide profile; leaving the role removes it.
    /// The seeded admin keeps its username and the admin role.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller cannot manage users, the account is
    /// unknown or protected, a field is invalid, or the new username is taken.
    pub fn update_user(&self, session: &Session, update: UserUpdate) -> Result<User> {
        session.require(Permission::ManageUsers)?;
        validation::require_not_blank("username", &update.username)?;
        validation::require_not_blank("full_name", &update.full_name)?;
        if !validation::is_valid_email(update.email.trim()) {
            return Err(Error::validation("email", "invalid email format"));
        }
        if !validation::is_valid_phone(update.contact_number.trim()) {
            return Err(Error::validation("contact_number", "invalid phone number format"));
        }

        let _lock = self.store.write_lock()?;
        let existing = self
            .store
            .users()
            .find(&update.id)?
            .ok_or_else(|| Error::not_found("user", &update.id))?;

        let username = update.username.trim().to_string();
        if existing.username == self.config.seed.admin_username
            && (username != existing.username || update.role != Role::Admin)
        {
            return Err(Error::ProtectedAccount(existing.username));
        }
        if username != existing.username {
            if let Some(other) = self.store.find_user_by_username(&username)? {
                if other.id != existing.id {
                    return Err(Error::DuplicateUsername(username));
                }
            }
        }

        let previous_role = existing.role;
        let user = User {
            id: existing.id,
            username,
            password: existing.password,
            full_name: update.full_name.trim().to_string(),
            email: update.email.trim().to_string(),
            contact_number: update.contact_number.trim().to_string(),
            nationality: update.nationality.trim().to_string(),
            passport_number: update.passport_number.filter(|p| !p.trim().is_empty()),
            emergency_contact: update.emergency_contact.filter(|e| !e.trim().is_empty()),
            role: update.role,
            registered_at: existing.registered_at,
        };
        self.store.users().replace(&user)?;
        self.sync_guide_profile(previous_role, &user)?;
        info!(id = %user.id, username = %user.username, "Updated user");
        Ok(user)
    }

    /// Give a new guide account its profile, or drop the profile of an
    /// account that stopped being a guide.
    fn sync_guide_profile(&self, previous_role: Role, user: &User) -> Result<()> {
        if previous_role != Role::Guide && user.role == Role::Guide {
            if self.store.find_guide_by_user(&user.id)?.is_none() {
                let profile = Guide::for_account(
                    new_id(),
                    user.id.clone(),
                    &user.full_name,
                    &user.email,
                    &user.contact_number,
                );
                self.store.guides().append(&profile)?;
                info!(username = %user.username, guide = %profile.id, "Created guide profile");
            }
        } else if previous_role == Role::Guide && user.role != Role::Guide {
            if let Some(profile) = self.store.find_guide_by_user(&user.id)? {
                self.store.guides().remove(&profile.id)?;
                info!(username = %user.username, guide = %profile.id, "Removed guide profile");
            }
        }
        Ok(())
    }

    /// Delete account `id`.
    ///
    /// A guide's profile goes with it; a tourist's bookings are cancelled.
    /// The seeded admin account cannot be deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller cannot manage users, the account is
    /// unknown or protected.
    pub fn delete_user(&self, session: &Session, id: &str) -> Result<DeletedUser> {
        session.require(Permission::ManageUsers)?;

        let _lock = self.store.write_lock()?;
        let user = self
            .store
            .users()
            .find(id)?
            .ok_or_else(|| Error::not_found("user", id))?;

        if user.username == self.config.seed.admin_username {
            return Err(Error::ProtectedAccount(user.username));
        }

        let mut guide_profile_removed = false;
        if user.role == Role::Guide {
            if let Some(profile) = self.store.find_guide_by_user(&user.id)? {
                guide_profile_removed = self.store.guides().remove(&profile.id)?;
            }
        }

        let mut bookings_cancelled = 0;
        if user.role == Role::Tourist {
            let open = self.store.bookings().filter(|booking| {
                booking.tourist_id == user.id && booking.status != BookingStatus::Cancelled
            })?;
            for mut booking in open {
                booking.status = BookingStatus::Cancelled;
                self.store.bookings().replace(&booking)?;
                bookings_cancelled += 1;
            }
        }

        self.store.users().remove(&user.id)?;
        info!(
            id = %user.id,
            username = %user.username,
            guide_profile_removed,
            bookings_cancelled,
            "Deleted user"
        );
        Ok(DeletedUser {
            user,
            guide_profile_removed,
            bookings_cancelled,
        })
    }
}
