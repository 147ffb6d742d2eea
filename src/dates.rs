use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

const LOCAL_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses what a user typed into a date field, or what was read back from a
/// shadow key. Returns `None` for anything that is not a usable instant.
///
/// Accepts RFC 3339 (any offset) and bare `datetime-local` values, which are
/// taken as UTC. The result is truncated to whole milliseconds.
pub fn parse_date_input(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let parsed = match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => LOCAL_INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())?
            .and_utc(),
    };

    truncate_to_millis(parsed)
}

pub fn truncate_to_millis(instant: DateTime<Utc>) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(instant.timestamp_millis())
}

/// `2024-01-01T00:00:00.000Z`
pub fn to_iso_string(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Value for a `datetime-local` input, minute precision.
pub fn to_input_value(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M").to_string()
}

/// `1/2/2024, 1:30:00 AM`
pub fn format_display_date(instant: DateTime<Utc>) -> String {
    instant.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
