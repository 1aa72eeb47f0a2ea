//! Domain records.
//!
//! Each persisted type implements [`Record`](crate::store::codec::Record),
//! which fixes its positional layout in the flat files.

mod booking;
mod guide;
mod trek;
mod user;

pub use booking::{Booking, BookingStatus, BookingView};
pub use guide::{
    Guide, GuideDraft, DEFAULT_CERTIFICATIONS, DEFAULT_LANGUAGES, DEFAULT_SPECIALIZATIONS,
};
pub use trek::{Trek, TrekDraft};
pub use user::{NewUser, Permission, Role, User, UserUpdate};

/// Timestamp layout used in the data files.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout used in the data files and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fresh random record id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
