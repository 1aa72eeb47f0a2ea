//! Bookings and their lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DATE_FORMAT;
use crate::error::{Error, Result};
use crate::store::codec::{Fields, Record};

/// Where a booking stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Statuses whose price counts as revenue.
    #[must_use]
    pub fn is_revenue(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Completed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation("status", format!("unknown booking status '{s}'")))
    }
}

/// A tourist's reservation on a trek.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub trek_id: String,
    pub tourist_id: String,
    pub guide_id: Option<String>,
    pub booking_date: NaiveDate,
    pub status: BookingStatus,
    pub price: f64,
    pub duration_days: u32,
    pub high_risk_acknowledged: bool,
}

impl Record for Booking {
    const FILE_NAME: &'static str = "bookings.txt";
    const FIELD_NAMES: &'static [&'static str] = &[
        "id",
        "trek_id",
        "tourist_id",
        "guide_id",
        "booking_date",
        "status",
        "price",
        "duration",
        "high_risk_acknowledged",
    ];
    const MIN_FIELDS: usize = 9;

    fn id(&self) -> &str {
        &self.id
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.trek_id.clone(),
            self.tourist_id.clone(),
            self.guide_id.clone().unwrap_or_default(),
            self.booking_date.format(DATE_FORMAT).to_string(),
            self.status.to_string(),
            self.price.to_string(),
            self.duration_days.to_string(),
            self.high_risk_acknowledged.to_string(),
        ]
    }

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        let raw_date = fields.text(4);
        let booking_date = NaiveDate::parse_from_str(raw_date.trim(), DATE_FORMAT)
            .map_err(|_| Error::corrupt(Self::FILE_NAME, format!("bad booking date '{raw_date}'")))?;
        let status = fields
            .text(5)
            .parse()
            .map_err(|e: Error| Error::corrupt(Self::FILE_NAME, e.to_string()))?;

        Ok(Self {
            id: fields.text(0),
            trek_id: fields.text(1),
            tourist_id: fields.text(2),
            guide_id: fields.optional(3),
            booking_date,
            status,
            price: fields.parse(6)?,
            duration_days: fields.parse(7)?,
            high_risk_acknowledged: fields.flag(8),
        })
    }
}

/// A booking joined with the names of what it references.
///
/// Names are `None` when the referenced row no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub trek_name: Option<String>,
    pub tourist_name: Option<String>,
    pub guide_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::codec::{decode, encode};

    #[test]
    fn test_status_parse() {
        assert_eq!("Pending".parse::<BookingStatus>().unwrap(), BookingStatus::Pending);
        assert_eq!("cancelled".parse::<BookingStatus>().unwrap(), BookingStatus::Cancelled);
        assert!("Refunded".parse::<BookingStatus>().is_err());
    }

    #[test]
    fn test_status_revenue() {
        assert!(BookingStatus::Confirmed.is_revenue());
        assert!(BookingStatus::Completed.is_revenue());
        assert!(!BookingStatus::Pending.is_revenue());
        assert!(!BookingStatus::Cancelled.is_revenue());
    }

    #[test]
    fn test_decode_booking_without_guide() {
        let booking: Booking = decode("b1|t1|u1||2025-07-29|Pending|1500.0|14|false").unwrap();
        assert!(booking.guide_id.is_none());
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.booking_date, NaiveDate::from_ymd_opt(2025, 7, 29).unwrap());
        assert_eq!(booking.duration_days, 14);
    }

    #[test]
    fn test_encode_booking() {
        let booking = Booking {
            id: "b2".to_string(),
            trek_id: "t1".to_string(),
            tourist_id: "u1".to_string(),
            guide_id: Some("g1".to_string()),
            booking_date: NaiveDate::from_ymd_opt(2025, 10, 3).unwrap(),
            status: BookingStatus::Confirmed,
            price: 1440.0,
            duration_days: 16,
            high_risk_acknowledged: true,
        };
        assert_eq!(
            encode(&booking).unwrap(),
            "b2|t1|u1|g1|2025-10-03|Confirmed|1440|16|true"
        );
    }

    #[test]
    fn test_decode_unknown_status_is_corrupt() {
        let err = decode::<Booking>("b1|t1|u1||2025-07-29|Lost|1|1|false").unwrap_err();
        assert!(matches!(err, Error::CorruptRecord { .. }));
    }

    #[test]
    fn test_decode_bad_date_is_corrupt() {
        assert!(decode::<Booking>("b1|t1|u1||29/07/2025|Pending|1|1|false").is_err());
    }

    #[test]
    fn test_view_serializes_flat() {
        let booking: Booking = decode("b1|t1|u1||2025-07-29|Pending|700|5|false").unwrap();
        let view = BookingView {
            booking,
            trek_name: Some("Poon Hill Trek".to_string()),
            tourist_name: None,
            guide_name: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["trek_id"], "t1");
        assert_eq!(json["trek_name"], "Poon Hill Trek");
        assert_eq!(json["status"], "Pending");
    }
}
