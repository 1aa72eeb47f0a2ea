//! Command-line interface for trekdesk.
//!
//! This module provides the CLI structure and output rendering for the
//! `trekdesk` binary.

mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AccountRole, BookingCommand, ConfigCommand, Credentials, GuideChanges, GuideCommand,
    NewGuide, NewTrek, OutputFormat, RegisterCommand, RoleArg, StatusArg, TrekChanges,
    TrekCommand, UserChanges, UserCommand, ViewCommand,
};

/// trekdesk - Back office for a trekking agency
///
/// Manages treks, guides, bookings and accounts kept in plain
/// pipe-delimited text files.
#[derive(Debug, Parser)]
#[command(name = "trekdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the data files (overrides the configuration)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a tourist or guide account
    Register(RegisterCommand),

    /// Check credentials and show who you are
    Login(ViewCommand),

    /// Show the dashboard for your role
    Dashboard(ViewCommand),

    /// Show booking statistics (admin)
    Stats(ViewCommand),

    /// Browse and manage treks
    #[command(subcommand)]
    Trek(TrekCommand),

    /// Browse and manage guides
    #[command(subcommand)]
    Guide(GuideCommand),

    /// Book and manage bookings
    #[command(subcommand)]
    Booking(BookingCommand),

    /// Manage accounts
    #[command(subcommand)]
    User(UserCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
