//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::model::{BookingStatus, Role, DATE_FORMAT};

/// Account credentials for commands that need a signed-in user.
#[derive(Debug, Clone, Args)]
pub struct Credentials {
    /// Username to sign in as
    #[arg(short, long, env = "TREKDESK_USER")]
    pub user: String,

    /// Password for the account
    #[arg(short, long, env = "TREKDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Registration arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Username (defaults to the part of the email before '@')
    #[arg(long)]
    pub username: Option<String>,

    /// Account password
    #[arg(long, env = "TREKDESK_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Password again
    #[arg(long)]
    pub confirm_password: String,

    #[arg(long)]
    pub full_name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub contact: String,

    #[arg(long)]
    pub nationality: String,

    #[arg(long)]
    pub passport: Option<String>,

    #[arg(long)]
    pub emergency_contact: String,

    /// Account type
    #[arg(long, value_enum, default_value = "tourist")]
    pub role: AccountRole,
}

/// Arguments for commands that only print something for the signed-in user.
#[derive(Debug, Args)]
pub struct ViewCommand {
    #[command(flatten)]
    pub credentials: Credentials,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Trek catalog commands.
#[derive(Debug, Subcommand)]
pub enum TrekCommand {
    /// List all treks
    List {
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Show one trek
    Show {
        id: String,

        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },

    /// Add a trek (admin)
    Add {
        #[command(flatten)]
        credentials: Credentials,

        #[command(flatten)]
        trek: NewTrek,
    },

    /// Change trek fields (admin)
    Update {
        #[command(flatten)]
        credentials: Credentials,

        id: String,

        #[command(flatten)]
        changes: TrekChanges,
    },

    /// Delete a trek (admin)
    Delete {
        #[command(flatten)]
        credentials: Credentials,

        id: String,
    },

    /// Price a trek for a date, applying festival discounts
    Quote {
        id: String,

        /// Booking date, YYYY-MM-DD (defaults to today)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value = "plain")]
        format: OutputFormat,
    },
}

/// Fields of a new trek.
#[derive(Debug, Args)]
pub struct NewTrek {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub region: String,

    /// Highest point in metres
    #[arg(long)]
    pub altitude: u32,

    /// Length in days
    #[arg(long)]
    pub duration: u32,

    #[arg(long)]
    pub difficulty: String,

    #[arg(long)]
    pub price: f64,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Only offered in some seasons
    #[arg(long)]
    pub seasonal: bool,

    /// Comma-separated seasons, e.g. "Spring,Autumn"
    #[arg(long)]
    pub best_season: Option<String>,
}

/// Trek fields to change; unset ones keep their value.
#[derive(Debug, Args)]
pub struct TrekChanges {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub region: Option<String>,

    #[arg(long)]
    pub altitude: Option<u32>,

    #[arg(long)]
    pub duration: Option<u32>,

    #[arg(long)]
    pub difficulty: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub seasonal: Option<bool>,

    #[arg(long)]
    pub best_season: Option<String>,
}

/// Guide commands.
#[derive(Debug, Subcommand)]
pub enum GuideCommand {
    /// List guides
    List {
        /// Only guides taking trips
        #[arg(short, long)]
        available: bool,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Add a guide (admin)
    Add {
        #[command(flatten)]
        credentials: Credentials,

        #[command(flatten)]
        guide: NewGuide,
    },

    /// Change guide fields (admin)
    Update {
        #[command(flatten)]
        credentials: Credentials,

        id: String,

        #[command(flatten)]
        changes: GuideChanges,
    },

    /// Delete a guide (admin)
    Delete {
        #[command(flatten)]
        credentials: Credentials,

        id: String,
    },

    /// Show your guide profile (guide)
    Profile(ViewCommand),

    /// Show trips assigned to you (guide)
    Trips(ViewCommand),
}

/// Fields of a new guide.
#[derive(Debug, Args)]
pub struct NewGuide {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long, default_value = crate::model::DEFAULT_LANGUAGES)]
    pub languages: String,

    #[arg(long, default_value = "0")]
    pub experience: u32,

    #[arg(long, default_value = crate::model::DEFAULT_CERTIFICATIONS)]
    pub certifications: String,

    #[arg(long, default_value = crate::model::DEFAULT_SPECIALIZATIONS)]
    pub specializations: String,

    /// Add the guide as not taking trips
    #[arg(long)]
    pub unavailable: bool,
}

/// Guide fields to change; unset ones keep their value.
#[derive(Debug, Args)]
pub struct GuideChanges {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub languages: Option<String>,

    #[arg(long)]
    pub experience: Option<u32>,

    #[arg(long)]
    pub certifications: Option<String>,

    #[arg(long)]
    pub specializations: Option<String>,

    #[arg(long)]
    pub available: Option<bool>,
}

/// Booking commands.
#[derive(Debug, Subcommand)]
pub enum BookingCommand {
    /// List bookings: all for admins, your own for tourists, assigned trips for guides
    List {
        #[command(flatten)]
        credentials: Credentials,

        /// Only bookings with this status
        #[arg(short, long, value_enum)]
        status: Option<StatusArg>,

        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Book a trek (tourist)
    Book {
        #[command(flatten)]
        credentials: Credentials,

        trek_id: String,

        /// Trek date, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,

        /// Accept the risks of a high-risk trek
        #[arg(long)]
        acknowledge_risk: bool,
    },

    /// Cancel a booking
    Cancel {
        #[command(flatten)]
        credentials: Credentials,

        id: String,
    },

    /// Move a pending booking to another date (tourist)
    Reschedule {
        #[command(flatten)]
        credentials: Credentials,

        id: String,

        /// New date, YYYY-MM-DD
        #[arg(short, long, value_parser = parse_date)]
        date: NaiveDate,
    },

    /// Set a booking's status (admin)
    Status {
        #[command(flatten)]
        credentials: Credentials,

        id: String,

        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Assign a guide and confirm the booking (admin)
    Assign {
        #[command(flatten)]
        credentials: Credentials,

        booking_id: String,

        guide_id: String,
    },
}

/// Account administration commands.
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List accounts (admin)
    List(ViewCommand),

    /// Change account details (admin)
    Update {
        #[command(flatten)]
        credentials: Credentials,

        id: String,

        #[command(flatten)]
        changes: UserChanges,
    },

    /// Delete an account (admin)
    Delete {
        #[command(flatten)]
        credentials: Credentials,

        id: String,
    },

    /// Change your own password
    Passwd {
        #[command(flatten)]
        credentials: Credentials,

        /// The new password
        #[arg(long, env = "TREKDESK_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },
}

/// Account fields to change; unset ones keep their value.
#[derive(Debug, Args)]
pub struct UserChanges {
    #[arg(long)]
    pub username: Option<String>,

    #[arg(long)]
    pub full_name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub contact: Option<String>,

    #[arg(long)]
    pub nationality: Option<String>,

    #[arg(long)]
    pub passport: Option<String>,

    #[arg(long)]
    pub emergency_contact: Option<String>,

    #[arg(long, value_enum)]
    pub role: Option<RoleArg>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Roles open to self-registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AccountRole {
    Tourist,
    Guide,
}

impl From<AccountRole> for Role {
    fn from(arg: AccountRole) -> Self {
        match arg {
            AccountRole::Tourist => Self::Tourist,
            AccountRole::Guide => Self::Guide,
        }
    }
}

/// Any account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Guide,
    Tourist,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Guide => Self::Guide,
            RoleArg::Tourist => Self::Tourist,
        }
    }
}

/// Booking status argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl From<StatusArg> for BookingStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Confirmed => Self::Confirmed,
            StatusArg::Completed => Self::Completed,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| format!("'{text}' is not a date in YYYY-MM-DD form"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_arg_conversion() {
        assert_eq!(BookingStatus::from(StatusArg::Pending), BookingStatus::Pending);
        assert_eq!(BookingStatus::from(StatusArg::Confirmed), BookingStatus::Confirmed);
        assert_eq!(BookingStatus::from(StatusArg::Completed), BookingStatus::Completed);
        assert_eq!(BookingStatus::from(StatusArg::Cancelled), BookingStatus::Cancelled);
    }

    #[test]
    fn test_role_arg_conversion() {
        assert_eq!(Role::from(RoleArg::Admin), Role::Admin);
        assert_eq!(Role::from(AccountRole::Guide), Role::Guide);
        assert_eq!(Role::from(AccountRole::Tourist), Role::Tourist);
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-10-03").unwrap(),
            NaiveDate::from_ymd_opt(2025, 10, 3).unwrap()
        );
        assert!(parse_date("03/10/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }
}
