//! `trekdesk` - Back office for a trekking agency
//!
//! This library keeps accounts, the trek catalog, guides and bookings in
//! pipe-delimited text files and exposes the agency's operations through
//! [`TrekDesk`], gated by the signed-in role.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod password;
pub mod pricing;
pub mod service;
pub mod store;
pub mod validation;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use pricing::{FestivalCalendar, Quote};
pub use service::{BookingStatistics, CatalogEntry, Dashboard, Session, TrekDesk};
pub use store::FlatFileStore;
