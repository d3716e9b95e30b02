//! Deterministic parsing and matching of slot values from free text.

use chrono::NaiveDate;

use crate::domain::foundation::ValidationError;
use crate::domain::marketplace::GeoPoint;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// Calendar date in one of the accepted formats.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim().trim_end_matches('.');
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Strictly after `today`; a booking for today is too late.
pub fn parse_future_date(raw: &str, today: NaiveDate) -> Option<NaiveDate> {
    parse_date(raw).filter(|date| *date > today)
}

/// Positive, finite amount. Accepts an optional `AED` marker and thousands
/// separators, e.g. `200`, `AED 1,250.50`, `300 aed`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let lower = raw.trim().to_lowercase();
    let stripped = lower
        .strip_prefix("aed")
        .or_else(|| lower.strip_suffix("aed"))
        .unwrap_or(&lower);
    let cleaned: String = stripped.trim().chars().filter(|c| *c != ',').collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

/// `"<lat>, <lon>"` within WGS84 bounds.
pub fn parse_coordinates(raw: &str) -> Result<GeoPoint, ValidationError> {
    let parts: Vec<&str> = raw.trim().split(',').map(str::trim).collect();
    let [lat, lon] = parts.as_slice() else {
        return Err(ValidationError::invalid_format(
            "location",
            "expected 'latitude, longitude'",
        ));
    };
    let latitude = lat
        .parse::<f64>()
        .map_err(|_| ValidationError::invalid_format("latitude", "not a number"))?;
    let longitude = lon
        .parse::<f64>()
        .map_err(|_| ValidationError::invalid_format("longitude", "not a number"))?;
    GeoPoint::new(latitude, longitude)
}

/// The candidate equal to `reply` ignoring case and surrounding whitespace.
///
/// Used to validate language model output, which is never trusted as-is.
pub fn match_label<'a>(reply: &str, candidates: &'a [String]) -> Option<&'a str> {
    let reply = reply.trim();
    if reply.is_empty() {
        return None;
    }
    candidates
        .iter()
        .find(|c| c.to_lowercase() == reply.to_lowercase())
        .map(String::as_str)
}

/// Longest candidate mentioned as a whole phrase in `message`.
pub fn find_mentioned<'a>(message: &str, candidates: &'a [String]) -> Option<&'a str> {
    let haystack = message.to_lowercase();
    candidates
        .iter()
        .filter(|c| contains_phrase(&haystack, &c.to_lowercase()))
        .max_by_key(|c| c.len())
        .map(String::as_str)
}

/// `needle` occurs in `haystack` with no letter or digit directly on either side.
fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Whether free-text `input` picks out `label`: the label contains the
/// input, ignoring case.
pub fn refers_to(input: &str, label: &str) -> bool {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return false;
    }
    label.to_lowercase().contains(&input)
}
