// Cell formatting for the performance table
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// Time of day the way the table shows it.
pub fn format_time_of_day<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%X").to_string()
}

/// Local time of day for a Unix timestamp; empty when absent or zero.
pub fn format_timestamp(secs: Option<f64>) -> String {
    format_timestamp_in(secs, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(secs: Option<f64>, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let Some(secs) = secs.filter(|s| *s != 0.0 && s.is_finite()) else {
        return String::new();
    };

    match DateTime::from_timestamp_millis((secs * 1000.0).round() as i64) {
        Some(at) => format_time_of_day(&at.with_timezone(tz)),
        None => String::new(),
    }
}

/// Rounded bits per second with thousands separators.
///
/// Zero renders like an absent reading, so an idle stream and one that has
/// not reported yet look the same.
pub fn format_rate(bps: Option<f64>) -> String {
    match bps {
        Some(bps) if bps != 0.0 && bps.is_finite() => group_thousands(bps.round() as i64),
        _ => String::new(),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if value < 0 {
        grouped.push('-');
    }
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Escape text for insertion into HTML element content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
