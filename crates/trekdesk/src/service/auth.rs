//! Sign-in, registration and password changes.

use chrono::Local;
use tracing::{info, warn};

use super::TrekDesk;
use crate::error::{Error, Result};
use crate::model::{new_id, Guide, NewUser, Permission, Role, User};
use crate::password;
use crate::validation;

/// A signed-in account.
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
}

impl Session {
    pub(crate) fn new(user: User) -> Self {
        Self { user }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.user.role
    }

    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        self.user.role.has_permission(permission)
    }

    /// Fail unless the account's role grants `permission`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PermissionDenied`] otherwise.
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.can(permission) {
            Ok(())
        } else {
            Err(Error::PermissionDenied {
                role: self.user.role.to_string(),
                permission: permission.to_string(),
            })
        }
    }
}

impl TrekDesk {
    /// Sign in.
    ///
    /// Unknown usernames and wrong passwords fail the same way.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for blank input and
    /// [`Error::AuthenticationFailed`] for bad credentials.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
        validation::require_not_blank("username", username)?;
        validation::require_not_blank("password", password)?;

        let user = {
            let _lock = self.store.read_lock()?;
            self.store.find_user_by_username(username.trim())?
        };
        let Some(user) = user else {
            return Err(Error::AuthenticationFailed);
        };

        let matches = password::verify(password, &user.password).unwrap_or_else(|e| {
            warn!(username = %user.username, error = %e, "Stored password hash is unreadable");
            false
        });
        if !matches {
            return Err(Error::AuthenticationFailed);
        }

        if !password::is_hashed(&user.password) {
            warn!(
                username = %user.username,
                "Account still has a plaintext password; change it to store a hash"
            );
        }
        info!(username = %user.username, role = %user.role, "Signed in");
        Ok(Session::new(user))
    }

    /// Create a tourist or guide account.
    ///
    /// Guide accounts also get a guide profile with default details.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input or an admin role, and
    /// [`Error::DuplicateUsername`] if the username is taken.
    pub fn register(&self, form: NewUser, confirm_password: &str) -> Result<User> {
        validation::validate_registration(&form, confirm_password)?;

        let role = form.role.unwrap_or(Role::Tourist);
        if role == Role::Admin {
            return Err(Error::validation(
                "role",
                "only tourist and guide accounts can be registered",
            ));
        }
        let username = form.resolved_username();

        let _lock = self.store.write_lock()?;
        if self.store.find_user_by_username(&username)?.is_some() {
            return Err(Error::DuplicateUsername(username));
        }

        let user = User {
            id: new_id(),
            username,
            password: password::hash(&form.password, self.config.auth.bcrypt_cost)?,
            full_name: form.full_name.trim().to_string(),
            email: form.email.trim().to_string(),
            contact_number: form.contact_number.trim().to_string(),
            nationality: form.nationality.trim().to_string(),
            passport_number: form
                .passport_number
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
            emergency_contact: Some(form.emergency_contact.trim().to_string()),
            role,
            registered_at: Some(Local::now().naive_local()),
        };
        self.store.users().append(&user)?;

        if role == Role::Guide {
            let profile = Guide::for_account(
                new_id(),
                user.id.clone(),
                &user.full_name,
                &user.email,
                &user.contact_number,
            );
            self.store.guides().append(&profile)?;
        }

        info!(username = %user.username, role = %user.role, "Registered account");
        Ok(user)
    }

    /// Change the signed-in account's password.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] if `current` is wrong and a
    /// validation error if `new_password` is weak.
    pub fn change_password(
        &self,
        session: &Session,
        current: &str,
        new_password: &str,
    ) -> Result<()> {
        session.require(Permission::ChangeOwnPassword)?;
        validation::require_strong_password(new_password)?;

        let _lock = self.store.write_lock()?;
        let mut user = self
            .store
            .users()
            .find(&session.user().id)?
            .ok_or_else(|| Error::not_found("user", &session.user().id))?;

        if !password::verify(current, &user.password)? {
            return Err(Error::AuthenticationFailed);
        }

        user.password = password::hash(new_password, self.config.auth.bcrypt_cost)?;
        self.store.users().replace(&user)?;
        info!(username = %user.username, "Changed password");
        Ok(())
    }
}
