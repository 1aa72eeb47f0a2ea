//! Rendering command results as plain text, tables or JSON.

use std::fmt::Write as _;

use serde::Serialize;

use super::OutputFormat;
use crate::error::Result;
use crate::model::{BookingView, Guide, Trek, User, DATETIME_FORMAT, DATE_FORMAT};
use crate::service::{BookingStatistics, CatalogEntry, Dashboard};

fn json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// Left-aligned columns sized to their widest cell.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &mut dyn Iterator<Item = &str>| {
        cells
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&mut headers.iter().copied()));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.push('\n');
    for row in rows {
        out.push_str(&line(&mut row.iter().map(String::as_str)));
        out.push('\n');
    }
    out
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn treks(treks: &[Trek], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(treks),
        OutputFormat::Table => Ok(table(
            &["ID", "NAME", "REGION", "ALT (m)", "DAYS", "DIFFICULTY", "PRICE"],
            &treks
                .iter()
                .map(|trek| {
                    vec![
                        trek.id.clone(),
                        trek.name.clone(),
                        trek.region.clone(),
                        trek.max_altitude.to_string(),
                        trek.duration_days.to_string(),
                        trek.difficulty.clone(),
                        money(trek.base_price),
                    ]
                })
                .collect::<Vec<_>>(),
        )),
        OutputFormat::Plain => Ok(treks.iter().fold(String::new(), |mut out, trek| {
            let _ = writeln!(
                out,
                "{}  {} ({}, {} days, {})",
                trek.id,
                trek.name,
                trek.region,
                trek.duration_days,
                money(trek.base_price)
            );
            out
        })),
    }
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn trek(trek: &Trek, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(trek);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{}", trek.name);
    let _ = writeln!(out, "  ID:           {}", trek.id);
    let _ = writeln!(out, "  Region:       {}", trek.region);
    let _ = writeln!(out, "  Max altitude: {} m", trek.max_altitude);
    let _ = writeln!(out, "  Duration:     {} days", trek.duration_days);
    let _ = writeln!(out, "  Difficulty:   {}", trek.difficulty);
    let _ = writeln!(out, "  Base price:   {}", money(trek.base_price));
    let _ = writeln!(out, "  Seasonal:     {}", trek.seasonal);
    let _ = writeln!(out, "  Best season:  {}", or_dash(trek.best_season.as_deref()));
    if !trek.description.is_empty() {
        let _ = writeln!(out, "  {}", trek.description);
    }
    Ok(out)
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn quote(
    entry: &CatalogEntry,
    date: chrono::NaiveDate,
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return json(entry);
    }
    let date = date.format(DATE_FORMAT);
    Ok(match &entry.quote.festival {
        Some(festival) => format!(
            "{} on {date}: {} ({}% {festival} discount from {})\n",
            entry.trek.name,
            money(entry.quote.final_price),
            entry.quote.discount_percent,
            money(entry.quote.base_price),
        ),
        None => format!(
            "{} on {date}: {}\n",
            entry.trek.name,
            money(entry.quote.final_price)
        ),
    })
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn guides(guides: &[Guide], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(guides),
        OutputFormat::Table => Ok(table(
            &["ID", "NAME", "EMAIL", "PHONE", "LANGUAGES", "YEARS", "AVAILABLE"],
            &guides
                .iter()
                .map(|guide| {
                    vec![
                        guide.id.clone(),
                        guide.name.clone(),
                        guide.email.clone(),
                        guide.phone_number.clone(),
                        guide.languages.clone(),
                        guide.years_of_experience.to_string(),
                        if guide.available { "yes" } else { "no" }.to_string(),
                    ]
                })
                .collect::<Vec<_>>(),
        )),
        OutputFormat::Plain => Ok(guides.iter().fold(String::new(), |mut out, guide| {
            let _ = writeln!(
                out,
                "{}  {} <{}>{}",
                guide.id,
                guide.name,
                guide.email,
                if guide.available { "" } else { " (unavailable)" }
            );
            out
        })),
    }
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn guide(guide: &Guide, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(guide);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{}", guide.name);
    let _ = writeln!(out, "  ID:              {}", guide.id);
    let _ = writeln!(out, "  Email:           {}", guide.email);
    let _ = writeln!(out, "  Phone:           {}", guide.phone_number);
    let _ = writeln!(out, "  Languages:       {}", guide.languages);
    let _ = writeln!(out, "  Experience:      {} years", guide.years_of_experience);
    let _ = writeln!(out, "  Certifications:  {}", guide.certifications);
    let _ = writeln!(out, "  Specializations: {}", guide.specializations);
    let _ = writeln!(out, "  Available:       {}", guide.available);
    Ok(out)
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn bookings(bookings: &[BookingView], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(bookings),
        OutputFormat::Table => Ok(table(
            &["ID", "TREK", "TOURIST", "GUIDE", "DATE", "STATUS", "PRICE", "RISK ACK"],
            &bookings
                .iter()
                .map(|view| {
                    vec![
                        view.booking.id.clone(),
                        or_dash(view.trek_name.as_deref()).to_string(),
                        or_dash(view.tourist_name.as_deref()).to_string(),
                        or_dash(view.guide_name.as_deref()).to_string(),
                        view.booking.booking_date.format(DATE_FORMAT).to_string(),
                        view.booking.status.to_string(),
                        money(view.booking.price),
                        if view.booking.high_risk_acknowledged { "yes" } else { "" }.to_string(),
                    ]
                })
                .collect::<Vec<_>>(),
        )),
        OutputFormat::Plain => Ok(bookings.iter().fold(String::new(), |mut out, view| {
            let _ = writeln!(
                out,
                "{}  {} on {} [{}] {}",
                view.booking.id,
                or_dash(view.trek_name.as_deref()),
                view.booking.booking_date.format(DATE_FORMAT),
                view.booking.status,
                money(view.booking.price)
            );
            out
        })),
    }
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn users(users: &[User], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json(users),
        OutputFormat::Table => Ok(table(
            &["ID", "USERNAME", "NAME", "EMAIL", "CONTACT", "ROLE", "REGISTERED"],
            &users
                .iter()
                .map(|user| {
                    vec![
                        user.id.clone(),
                        user.username.clone(),
                        user.full_name.clone(),
                        user.email.clone(),
                        user.contact_number.clone(),
                        user.role.to_string(),
                        user.registered_at
                            .map(|at| at.format(DATETIME_FORMAT).to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )),
        OutputFormat::Plain => Ok(users.iter().fold(String::new(), |mut out, user| {
            let _ = writeln!(
                out,
                "{}  {} ({}) {}",
                user.id, user.username, user.full_name, user.role
            );
            out
        })),
    }
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn user(user: &User, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(user);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", user.full_name, user.role);
    let _ = writeln!(out, "  ID:          {}", user.id);
    let _ = writeln!(out, "  Username:    {}", user.username);
    let _ = writeln!(out, "  Email:       {}", user.email);
    let _ = writeln!(out, "  Contact:     {}", user.contact_number);
    let _ = writeln!(out, "  Nationality: {}", user.nationality);
    Ok(out)
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn statistics(stats: &BookingStatistics, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(stats);
    }
    let mut out = String::new();
    let _ = writeln!(out, "Total bookings: {}", stats.total_bookings);
    for (status, count) in &stats.by_status {
        let _ = writeln!(out, "  {:<10} {count}", status.as_str());
    }
    let _ = writeln!(out, "Revenue:        {}", money(stats.total_revenue));
    match &stats.most_popular {
        Some(popular) => {
            let _ = writeln!(
                out,
                "Most popular:   {} ({} bookings)",
                popular.trek_name, popular.bookings
            );
        }
        None => {
            let _ = writeln!(out, "Most popular:   -");
        }
    }
    Ok(out)
}

/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn dashboard(dashboard: &Dashboard, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return json(dashboard);
    }
    let mut out = String::new();
    match dashboard {
        Dashboard::Admin {
            statistics: stats,
            pending_bookings,
            guides,
            available_guides,
            treks,
        } => {
            let _ = writeln!(out, "Admin dashboard");
            let _ = writeln!(
                out,
                "Treks: {treks}   Guides: {guides} ({available_guides} available)"
            );
            let _ = writeln!(out, "Pending bookings: {pending_bookings}");
            out.push('\n');
            out.push_str(&statistics(stats, format)?);
        }
        Dashboard::Guide { profile, trips } => {
            let _ = writeln!(out, "Guide dashboard");
            match profile {
                Some(profile) => out.push_str(&guide(profile, format)?),
                None => {
                    let _ = writeln!(out, "No guide profile is linked to this account.");
                }
            }
            let _ = writeln!(out, "\nAssigned trips ({})", trips.len());
            out.push_str(&bookings(trips, format)?);
        }
        Dashboard::Tourist { bookings: own, catalog } => {
            let _ = writeln!(out, "Tourist dashboard");
            let _ = writeln!(out, "Your bookings ({})", own.len());
            out.push_str(&bookings(own, format)?);
            let _ = writeln!(out, "\nTreks");
            for entry in catalog {
                let _ = writeln!(
                    out,
                    "{}  {} {}{}",
                    entry.trek.id,
                    entry.trek.name,
                    money(entry.quote.final_price),
                    entry
                        .quote
                        .festival
                        .as_deref()
                        .map(|name| format!(" ({name} price)"))
                        .unwrap_or_default()
                );
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::codec::decode;

    fn sample_treks() -> Vec<Trek> {
        vec![
            decode("t1|Poon Hill Trek|Annapurna|3210|5|Easy|700|Short trek|true|All Year").unwrap(),
            decode("t2|Manaslu Circuit|Manaslu|5115|16|Very Difficult|1600|Remote").unwrap(),
        ]
    }

    #[test]
    fn test_table_aligns_columns() {
        let text = table(
            &["ID", "NAME"],
            &[
                vec!["1".to_string(), "Short".to_string()],
                vec!["22".to_string(), "Longer name".to_string()],
            ],
        );
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID  NAME");
        assert_eq!(lines[1], "--  -----------");
        assert_eq!(lines[2], "1   Short");
        assert_eq!(lines[3], "22  Longer name");
    }

    #[test]
    fn test_treks_table() {
        let text = treks(&sample_treks(), OutputFormat::Table).unwrap();
        assert!(text.contains("Manaslu Circuit"));
        assert!(text.contains("1600.00"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn test_treks_json() {
        let text = treks(&sample_treks(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "Poon Hill Trek");
        assert_eq!(value[1]["best_season"], serde_json::Value::Null);
    }

    #[test]
    fn test_trek_detail() {
        let text = trek(&sample_treks()[1], OutputFormat::Plain).unwrap();
        assert!(text.starts_with("Manaslu Circuit\n"));
        assert!(text.contains("Best season:  -"));
    }

    #[test]
    fn test_users_never_show_passwords() {
        let user: User =
            decode("u1|admin|secret-hash|System Administrator|admin@tripsewa.com|9800000000|Nepal|||ADMIN|")
                .unwrap();
        for format in [OutputFormat::Plain, OutputFormat::Table, OutputFormat::Json] {
            let text = users(std::slice::from_ref(&user), format).unwrap();
            assert!(!text.contains("secret-hash"));
            assert!(text.contains("admin"));
        }
    }

    #[test]
    fn test_bookings_table_fills_missing_names() {
        let view = BookingView {
            booking: decode("b1|t9|u1||2025-07-29|Pending|700|5|false").unwrap(),
            trek_name: None,
            tourist_name: Some("BibekDkl".to_string()),
            guide_name: None,
        };
        let text = bookings(&[view], OutputFormat::Table).unwrap();
        let row = text.lines().nth(2).unwrap();
        assert!(row.contains("BibekDkl"));
        assert!(row.contains("2025-07-29"));
        assert!(row.contains(" - "));
    }
}
