//! Route record types
//!
//! `RouteRow` is the raw shape read from the store; `RouteRecord` is the
//! normalized record the rest of the application works with.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use utoipa::ToSchema;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("static regex is valid"));

/// Columns read from the route table, in record field order
pub const ROUTE_COLUMNS: &str = "bustype, route_name, price, star_rating, seats_available, \
                                 departing_time, reaching_time, duration";

/// Raw row as stored (duration is free text)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RouteRow {
    pub bustype: String,
    pub route_name: String,
    pub price: f64,
    pub star_rating: Option<f64>,
    pub seats_available: i64,
    pub departing_time: String,
    pub reaching_time: String,
    pub duration: Option<String>,
}

/// One bus route offering with its duration normalized to whole hours
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RouteRecord {
    pub bustype: String,
    pub route_name: String,
    pub price: f64,
    pub star_rating: Option<f64>,
    pub seats_available: i64,
    /// Departure time of day (`HH:MM[:SS]`)
    pub departing_time: String,
    /// Arrival time of day (`HH:MM[:SS]`)
    pub reaching_time: String,
    /// Trip duration in hours
    pub duration: i64,
}

impl From<RouteRow> for RouteRecord {
    fn from(row: RouteRow) -> Self {
        Self {
            duration: normalize_duration(row.duration.as_deref()),
            bustype: row.bustype,
            route_name: row.route_name,
            price: row.price,
            star_rating: row.star_rating,
            seats_available: row.seats_available,
            departing_time: row.departing_time,
            reaching_time: row.reaching_time,
        }
    }
}

/// Extract the first run of ASCII digits from a free-text duration
/// ("11h 30m" -> 11).
///
/// Missing text or text without ASCII digits normalizes to 0. Numbers too
/// large for `i64` saturate to `i64::MAX`, as SQLite's integer CAST does, so
/// the store-side duration filter sees the same value.
pub fn normalize_duration(text: Option<&str>) -> i64 {
    match text.and_then(|t| FIRST_NUMBER.find(t)) {
        Some(m) => m.as_str().parse().unwrap_or(i64::MAX),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_duration_takes_first_number() {
        assert_eq!(normalize_duration(Some("approx 3 hrs 30 min")), 3);
        assert_eq!(normalize_duration(Some("11h 05m")), 11);
        assert_eq!(normalize_duration(Some("12.5 hours")), 12);
    }

    #[test]
    fn test_normalize_duration_without_digits() {
        assert_eq!(normalize_duration(Some("overnight")), 0);
        assert_eq!(normalize_duration(Some("")), 0);
        assert_eq!(normalize_duration(None), 0);
    }

    #[test]
    fn test_normalize_duration_overflow_saturates() {
        assert_eq!(normalize_duration(Some("99999999999999999999999 h")), i64::MAX);
        assert_eq!(normalize_duration(Some("9223372036854775807h")), i64::MAX);
    }

    #[test]
    fn test_normalize_duration_ignores_non_ascii_digits() {
        assert_eq!(normalize_duration(Some("\u{0661} then 5h")), 5);
        assert_eq!(normalize_duration(Some("\u{0663}h")), 0);
        assert_eq!(normalize_duration(Some("007h")), 7);
    }

    #[test]
    fn test_record_from_row() {
        let row = RouteRow {
            bustype: "A/C Sleeper (2+1)".to_string(),
            route_name: "Hyderabad to Vijayawada".to_string(),
            price: 850.0,
            star_rating: Some(4.2),
            seats_available: 12,
            departing_time: "22:30:00".to_string(),
            reaching_time: "04:45:00".to_string(),
            duration: Some("06h 15m".to_string()),
        };

        let record = RouteRecord::from(row);
        assert_eq!(record.duration, 6);
        assert_eq!(record.route_name, "Hyderabad to Vijayawada");
        assert_eq!(record.star_rating, Some(4.2));
    }
}
