//! `trekdesk` - CLI for the trekking agency back office
//!
//! This binary signs users in from their credentials and runs one
//! operation per invocation against the configured data directory.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use trekdesk::cli::{
    output, BookingCommand, Cli, Command, ConfigCommand, Credentials, GuideChanges, GuideCommand,
    NewGuide, NewTrek, RegisterCommand, TrekChanges, TrekCommand, UserChanges, UserCommand,
    ViewCommand,
};
use trekdesk::model::{BookingStatus, GuideDraft, NewUser, Role, TrekDraft, UserUpdate};
use trekdesk::{init_logging, Config, Session, TrekDesk};

/// Exit status for failures caused by the caller's input, such as bad
/// credentials, a missing record or a refused action.
const EXIT_USER_ERROR: u8 = 2;

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_status(&e))
        }
    }
}

fn exit_status(err: &anyhow::Error) -> u8 {
    if err
        .downcast_ref::<trekdesk::Error>()
        .is_some_and(trekdesk::Error::is_user_error)
    {
        EXIT_USER_ERROR
    } else {
        1
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(data_dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(data_dir);
    }

    // Only config commands run without opening the data directory
    match cli.command {
        Command::Config(cmd) => handle_config(&config, cli.config, cmd),
        Command::Register(cmd) => handle_register(&open(config)?, cmd),
        Command::Login(view) => handle_login(&open(config)?, &view),
        Command::Dashboard(view) => handle_dashboard(&open(config)?, &view),
        Command::Stats(view) => handle_stats(&open(config)?, &view),
        Command::Trek(cmd) => handle_trek(&open(config)?, cmd),
        Command::Guide(cmd) => handle_guide(&open(config)?, cmd),
        Command::Booking(cmd) => handle_booking(&open(config)?, cmd),
        Command::User(cmd) => handle_user(&open(config)?, cmd),
    }
}

fn open(config: Config) -> Result<TrekDesk> {
    TrekDesk::open(config).context("opening data directory")
}

fn handle_login(desk: &TrekDesk, view: &ViewCommand) -> Result<()> {
    let session = sign_in(desk, &view.credentials)?;
    print!("{}", output::user(session.user(), view.format)?);
    Ok(())
}

fn handle_dashboard(desk: &TrekDesk, view: &ViewCommand) -> Result<()> {
    let session = sign_in(desk, &view.credentials)?;
    let dashboard = desk.dashboard(&session, today())?;
    print!("{}", output::dashboard(&dashboard, view.format)?);
    Ok(())
}

fn handle_stats(desk: &TrekDesk, view: &ViewCommand) -> Result<()> {
    let session = sign_in(desk, &view.credentials)?;
    let stats = desk.booking_statistics(&session)?;
    print!("{}", output::statistics(&stats, view.format)?);
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn sign_in(desk: &TrekDesk, credentials: &Credentials) -> Result<Session> {
    desk.authenticate(&credentials.user, &credentials.password)
        .with_context(|| format!("signing in as '{}'", credentials.user))
}

fn handle_register(desk: &TrekDesk, cmd: RegisterCommand) -> Result<()> {
    let form = NewUser {
        username: cmd.username,
        password: cmd.password,
        full_name: cmd.full_name,
        email: cmd.email,
        contact_number: cmd.contact,
        nationality: cmd.nationality,
        passport_number: cmd.passport,
        emergency_contact: cmd.emergency_contact,
        role: Some(Role::from(cmd.role)),
    };
    let user = desk.register(form, &cmd.confirm_password)?;
    println!("Registered '{}' as {}.", user.username, user.role);
    Ok(())
}

fn handle_trek(desk: &TrekDesk, cmd: TrekCommand) -> Result<()> {
    match cmd {
        TrekCommand::List { format } => {
            print!("{}", output::treks(&desk.list_treks()?, format)?);
        }
        TrekCommand::Show { id, format } => {
            print!("{}", output::trek(&desk.trek(&id)?, format)?);
        }
        TrekCommand::Add { credentials, trek } => {
            let session = sign_in(desk, &credentials)?;
            let trek = desk.add_trek(&session, trek_draft(trek))?;
            println!("Added trek '{}' ({}).", trek.name, trek.id);
        }
        TrekCommand::Update {
            credentials,
            id,
            changes,
        } => {
            let session = sign_in(desk, &credentials)?;
            let mut draft = desk.trek(&id)?.to_draft();
            apply_trek_changes(&mut draft, changes);
            let trek = desk.update_trek(&session, &id, draft)?;
            println!("Updated trek '{}'.", trek.name);
        }
        TrekCommand::Delete { credentials, id } => {
            let session = sign_in(desk, &credentials)?;
            desk.delete_trek(&session, &id)?;
            println!("Deleted trek {id}.");
        }
        TrekCommand::Quote { id, date, format } => {
            let date = date.unwrap_or_else(today);
            let entry = desk.quote_trek(&id, date)?;
            print!("{}", output::quote(&entry, date, format)?);
        }
    }
    Ok(())
}

fn trek_draft(trek: NewTrek) -> TrekDraft {
    TrekDraft {
        name: trek.name,
        region: trek.region,
        max_altitude: trek.altitude,
        duration_days: trek.duration,
        difficulty: trek.difficulty,
        base_price: trek.price,
        description: trek.description,
        seasonal: trek.seasonal,
        best_season: trek.best_season,
    }
}

fn apply_trek_changes(draft: &mut TrekDraft, changes: TrekChanges) {
    if let Some(name) = changes.name {
        draft.name = name;
    }
    if let Some(region) = changes.region {
        draft.region = region;
    }
    if let Some(altitude) = changes.altitude {
        draft.max_altitude = altitude;
    }
    if let Some(duration) = changes.duration {
        draft.duration_days = duration;
    }
    if let Some(difficulty) = changes.difficulty {
        draft.difficulty = difficulty;
    }
    if let Some(price) = changes.price {
        draft.base_price = price;
    }
    if let Some(description) = changes.description {
        draft.description = description;
    }
    if let Some(seasonal) = changes.seasonal {
        draft.seasonal = seasonal;
    }
    if let Some(best_season) = changes.best_season {
        draft.best_season = Some(best_season).filter(|season| !season.is_empty());
    }
}

fn handle_guide(desk: &TrekDesk, cmd: GuideCommand) -> Result<()> {
    match cmd {
        GuideCommand::List { available, format } => {
            let guides = if available {
                desk.available_guides()?
            } else {
                desk.list_guides()?
            };
            print!("{}", output::guides(&guides, format)?);
        }
        GuideCommand::Add { credentials, guide } => {
            let session = sign_in(desk, &credentials)?;
            let guide = desk.add_guide(&session, guide_draft(guide))?;
            println!("Added guide '{}' ({}).", guide.name, guide.id);
        }
        GuideCommand::Update {
            credentials,
            id,
            changes,
        } => {
            let session = sign_in(desk, &credentials)?;
            let mut draft = desk.guide(&id)?.to_draft();
            apply_guide_changes(&mut draft, changes);
            let guide = desk.update_guide(&session, &id, draft)?;
            println!("Updated guide '{}'.", guide.name);
        }
        GuideCommand::Delete { credentials, id } => {
            let session = sign_in(desk, &credentials)?;
            desk.delete_guide(&session, &id)?;
            println!("Deleted guide {id}.");
        }
        GuideCommand::Profile(view) => {
            let session = sign_in(desk, &view.credentials)?;
            print!("{}", output::guide(&desk.guide_profile(&session)?, view.format)?);
        }
        GuideCommand::Trips(view) => {
            let session = sign_in(desk, &view.credentials)?;
            print!("{}", output::bookings(&desk.assigned_trips(&session)?, view.format)?);
        }
    }
    Ok(())
}

fn guide_draft(guide: NewGuide) -> GuideDraft {
    GuideDraft {
        name: guide.name,
        email: guide.email,
        phone_number: guide.phone,
        languages: guide.languages,
        years_of_experience: guide.experience,
        certifications: guide.certifications,
        specializations: guide.specializations,
        available: !guide.unavailable,
    }
}

fn apply_guide_changes(draft: &mut GuideDraft, changes: GuideChanges) {
    if let Some(name) = changes.name {
        draft.name = name;
    }
    if let Some(email) = changes.email {
        draft.email = email;
    }
    if let Some(phone) = changes.phone {
        draft.phone_number = phone;
    }
    if let Some(languages) = changes.languages {
        draft.languages = languages;
    }
    if let Some(experience) = changes.experience {
        draft.years_of_experience = experience;
    }
    if let Some(certifications) = changes.certifications {
        draft.certifications = certifications;
    }
    if let Some(specializations) = changes.specializations {
        draft.specializations = specializations;
    }
    if let Some(available) = changes.available {
        draft.available = available;
    }
}

fn handle_booking(desk: &TrekDesk, cmd: BookingCommand) -> Result<()> {
    match cmd {
        BookingCommand::List {
            credentials,
            status,
            format,
        } => {
            let session = sign_in(desk, &credentials)?;
            let status = status.map(BookingStatus::from);
            let views = match session.role() {
                Role::Admin => desk.all_bookings(&session, status)?,
                Role::Guide => desk.assigned_trips(&session)?,
                Role::Tourist => desk.my_bookings(&session)?,
            };
            let views: Vec<_> = views
                .into_iter()
                .filter(|view| status.is_none() || status == Some(view.booking.status))
                .collect();
            print!("{}", output::bookings(&views, format)?);
        }
        BookingCommand::Book {
            credentials,
            trek_id,
            date,
            acknowledge_risk,
        } => {
            let session = sign_in(desk, &credentials)?;
            let booking = desk.book_trek(&session, &trek_id, date, acknowledge_risk)?;
            println!(
                "Booked {} for {} at {:.2} (booking {}, {}).",
                trek_id, booking.booking_date, booking.price, booking.id, booking.status
            );
        }
        BookingCommand::Cancel { credentials, id } => {
            let session = sign_in(desk, &credentials)?;
            desk.cancel_booking(&session, &id)?;
            println!("Cancelled booking {id}.");
        }
        BookingCommand::Reschedule {
            credentials,
            id,
            date,
        } => {
            let session = sign_in(desk, &credentials)?;
            let booking = desk.reschedule_booking(&session, &id, date)?;
            println!(
                "Moved booking {id} to {} at {:.2}.",
                booking.booking_date, booking.price
            );
        }
        BookingCommand::Status {
            credentials,
            id,
            status,
        } => {
            let session = sign_in(desk, &credentials)?;
            let booking = desk.set_booking_status(&session, &id, status.into())?;
            println!("Booking {id} is now {}.", booking.status);
        }
        BookingCommand::Assign {
            credentials,
            booking_id,
            guide_id,
        } => {
            let session = sign_in(desk, &credentials)?;
            desk.assign_guide(&session, &booking_id, &guide_id)?;
            println!("Assigned guide {guide_id} to booking {booking_id}.");
        }
    }
    Ok(())
}

fn handle_user(desk: &TrekDesk, cmd: UserCommand) -> Result<()> {
    match cmd {
        UserCommand::List(view) => {
            let session = sign_in(desk, &view.credentials)?;
            print!("{}", output::users(&desk.list_users(&session)?, view.format)?);
        }
        UserCommand::Update {
            credentials,
            id,
            changes,
        } => {
            let session = sign_in(desk, &credentials)?;
            let mut update = UserUpdate::from_user(&desk.user(&session, &id)?);
            apply_user_changes(&mut update, changes);
            let user = desk.update_user(&session, update)?;
            println!("Updated account '{}'.", user.username);
        }
        UserCommand::Delete { credentials, id } => {
            let session = sign_in(desk, &credentials)?;
            let deleted = desk.delete_user(&session, &id)?;
            println!("Deleted account '{}'.", deleted.user.username);
            if deleted.guide_profile_removed {
                println!("  Removed linked guide profile.");
            }
            if deleted.bookings_cancelled > 0 {
                println!("  Cancelled {} booking(s).", deleted.bookings_cancelled);
            }
        }
        UserCommand::Passwd {
            credentials,
            new_password,
        } => {
            let session = sign_in(desk, &credentials)?;
            desk.change_password(&session, &credentials.password, &new_password)?;
            println!("Password changed.");
        }
    }
    Ok(())
}

fn apply_user_changes(update: &mut UserUpdate, changes: UserChanges) {
    if let Some(username) = changes.username {
        update.username = username;
    }
    if let Some(full_name) = changes.full_name {
        update.full_name = full_name;
    }
    if let Some(email) = changes.email {
        update.email = email;
    }
    if let Some(contact) = changes.contact {
        update.contact_number = contact;
    }
    if let Some(nationality) = changes.nationality {
        update.nationality = nationality;
    }
    if let Some(passport) = changes.passport {
        update.passport_number = Some(passport).filter(|p| !p.is_empty());
    }
    if let Some(emergency) = changes.emergency_contact {
        update.emergency_contact = Some(emergency).filter(|e| !e.is_empty());
    }
    if let Some(role) = changes.role {
        update.role = role.into();
    }
}

fn handle_config(
    config: &Config,
    config_path: Option<std::path::PathBuf>,
    cmd: ConfigCommand,
) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!();
                println!("[Auth]");
                println!("  bcrypt cost:        {}", config.auth.bcrypt_cost);
                println!();
                println!("[Seed]");
                println!("  Enabled:            {}", config.seed.enabled);
                println!("  Admin username:     {}", config.seed.admin_username);
                println!("  Sample tourist:     {}", config.seed.sample_tourist);
                println!("  Sample treks:       {}", config.seed.sample_treks);
                println!();
                println!("[Booking]");
                println!(
                    "  High-risk levels:   {}",
                    config.booking.high_risk_difficulties.join(", ")
                );
                for festival in &config.booking.festivals {
                    println!(
                        "  Festival:           {} {}..{} ({}% off)",
                        festival.name, festival.start, festival.end, festival.discount_percent
                    );
                }
            }
        }
        ConfigCommand::Path => {
            let path = config_path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
