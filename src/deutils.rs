// src/deutils.rs
use chrono::{NaiveTime, Weekday};

/// Converts signed seconds into a "MM:SS" string. Negative values clamp to 00:00,
/// minutes are not wrapped into hours.
pub fn seconds_to_mmss(total_seconds: i64) -> String {
    let total = total_seconds.max(0);
    let minutes = total / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Parses "HH:MM" into a `NaiveTime`, seconds zeroed.
pub fn parse_hh_mm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Parses a weekday name or three letter abbreviation, case-insensitive.
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse::<Weekday>().ok()
}

/// Expands a day token: a single weekday, "daily", "weekdays" or "weekends".
pub fn expand_days(token: &str) -> Option<Vec<Weekday>> {
    use Weekday::*;
    match token.trim().to_lowercase().as_str() {
        "daily" | "everyday" | "*" => Some(vec![Mon, Tue, Wed, Thu, Fri, Sat, Sun]),
        "weekdays" => Some(vec![Mon, Tue, Wed, Thu, Fri]),
        "weekends" => Some(vec![Sat, Sun]),
        other => parse_weekday(other).map(|d| vec![d]),
    }
}
