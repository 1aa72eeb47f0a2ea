//! Input checks for registration and catalog edits.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{GuideDraft, NewUser, TrekDraft};

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+$").expect("valid email regex"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+()-]{8,15}$").expect("valid phone regex"));

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && EMAIL_PATTERN.is_match(email)
}

/// 8 to 15 of digits, `+`, `(`, `)` and `-`.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    !phone.is_empty() && PHONE_PATTERN.is_match(phone)
}

/// At least [`MIN_PASSWORD_LEN`] characters with a letter, a digit and
/// something that is neither.
#[must_use]
pub fn is_strong_password(password: &str) -> bool {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return false;
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_other = password
        .chars()
        .any(|c| !c.is_alphabetic() && !c.is_ascii_digit());
    has_letter && has_digit && has_other
}

/// Fail with a validation error if `value` is blank.
///
/// # Errors
///
/// Returns [`Error::Validation`] naming `field`.
pub fn require_not_blank(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "is required"));
    }
    Ok(())
}

/// Check a password for strength.
///
/// # Errors
///
/// Returns [`Error::Validation`] if the password is weak.
pub fn require_strong_password(password: &str) -> Result<()> {
    if is_strong_password(password) {
        Ok(())
    } else {
        Err(Error::validation(
            "password",
            "must be at least 8 characters long and include letters, numbers, and special characters",
        ))
    }
}

/// Check a registration form. The first failing rule is reported.
///
/// # Errors
///
/// Returns [`Error::Validation`] for the first invalid field.
pub fn validate_registration(form: &NewUser, confirm_password: &str) -> Result<()> {
    require_not_blank("full_name", &form.full_name)?;
    require_not_blank("nationality", &form.nationality)?;
    require_not_blank("contact_number", &form.contact_number)?;
    require_not_blank("email", &form.email)?;
    require_not_blank("password", &form.password)?;
    require_not_blank("confirm_password", confirm_password)?;
    require_not_blank("emergency_contact", &form.emergency_contact)?;

    if !is_valid_email(form.email.trim()) {
        return Err(Error::validation("email", "invalid email format"));
    }
    if !is_valid_phone(form.contact_number.trim()) {
        return Err(Error::validation("contact_number", "invalid phone number format"));
    }
    if form.password != confirm_password {
        return Err(Error::validation("confirm_password", "passwords do not match"));
    }
    require_strong_password(&form.password)?;
    require_not_blank("username", &form.resolved_username())
}

/// Check a trek draft.
///
/// # Errors
///
/// Returns [`Error::Validation`] for the first invalid field.
pub fn validate_trek(draft: &TrekDraft) -> Result<()> {
    require_not_blank("name", &draft.name)?;
    require_not_blank("region", &draft.region)?;
    require_not_blank("difficulty", &draft.difficulty)?;
    if draft.max_altitude == 0 {
        return Err(Error::validation("max_altitude", "must be greater than 0"));
    }
    if draft.duration_days == 0 {
        return Err(Error::validation("duration", "must be greater than 0"));
    }
    if !draft.base_price.is_finite() || draft.base_price < 0.0 {
        return Err(Error::validation("base_price", "must be a non-negative number"));
    }
    Ok(())
}

/// Check a guide draft.
///
/// # Errors
///
/// Returns [`Error::Validation`] for the first invalid field.
pub fn validate_guide(draft: &GuideDraft) -> Result<()> {
    require_not_blank("name", &draft.name)?;
    require_not_blank("email", &draft.email)?;
    require_not_blank("phone_number", &draft.phone_number)?;
    require_not_blank("languages", &draft.languages)?;
    if !is_valid_email(draft.email.trim()) {
        return Err(Error::validation("email", "invalid email format"));
    }
    Ok(())
}
