//! Formatting helpers shared by the renderer and the sinks.

use crate::constants::INSURANCE_EXPIRY_WARNING_DAYS;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Parses the date part of the loosely formatted timestamps found in record payloads.
///
/// Accepts RFC 3339 timestamps, naive `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps and plain
/// `YYYY-MM-DD` dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Parses a full timestamp, treating naive values and plain dates as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// `March 5, 2024`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// `March 5, 2024 at 14:30 UTC`
pub fn format_date_time(dt: DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y at %H:%M UTC").to_string()
}

/// `2024-03-05`, as used in export file names.
pub fn iso_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// Formats a payload date for display, keeping unparseable input verbatim.
pub fn display_date(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    Some(parse_date(raw).map(format_date).unwrap_or_else(|| raw.to_string()))
}

/// Completed years between `birth` and `on`. `None` if `birth` is in the future.
pub fn age_on(birth: NaiveDate, on: NaiveDate) -> Option<u32> {
    if birth > on {
        return None;
    }
    let mut years = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

fn currency_symbol(code: &str) -> Option<&'static str> {
    match code.to_ascii_uppercase().as_str() {
        "USD" => Some("$"),
        "GBP" => Some("£"),
        "EUR" => Some("€"),
        "NGN" => Some("₦"),
        "KES" => Some("KSh"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// Formats an amount with two decimals and thousands separators (`$1,234.50`).
///
/// Unknown currency codes are used as a prefix (`CHF 12.00`).
pub fn format_currency(amount: f64, currency: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    match currency_symbol(currency) {
        Some(symbol) => format!("{sign}{symbol}{grouped}.{fraction:02}"),
        None => format!("{sign}{} {grouped}.{fraction:02}", currency.trim()),
    }
}

/// Turns a form field key into a label: `bloodPressure` -> `Blood Pressure`,
/// `chief_complaint` -> `Chief complaint`.
pub fn humanize_key(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    let mut prev: Option<char> = None;
    for c in key.chars() {
        if c == '_' || c == '-' {
            spaced.push(' ');
        } else {
            if c.is_uppercase() && prev.is_some_and(|p| p.is_lowercase() || p.is_ascii_digit()) {
                spaced.push(' ');
            }
            spaced.push(c);
        }
        prev = Some(c);
    }

    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Validity of an insurance policy relative to a reference date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpiryStatus {
    Expired { days_ago: i64 },
    ExpiringSoon { days_left: i64 },
    Active { days_left: i64 },
    Unknown,
}

impl ExpiryStatus {
    pub fn label(&self) -> String {
        match self {
            ExpiryStatus::Expired { days_ago: 0 } => "Expired today".to_string(),
            ExpiryStatus::Expired { days_ago } => format!("Expired {days_ago} day(s) ago"),
            ExpiryStatus::ExpiringSoon { days_left: 0 } => "Expires today".to_string(),
            ExpiryStatus::ExpiringSoon { days_left } => {
                format!("Expiring soon ({days_left} day(s) left)")
            }
            ExpiryStatus::Active { .. } => "Active".to_string(),
            ExpiryStatus::Unknown => "Unknown".to_string(),
        }
    }
}

/// A policy is valid through its expiry date; it counts as expired from the following day.
pub fn expiry_status(expiry: Option<NaiveDate>, today: NaiveDate) -> ExpiryStatus {
    let Some(expiry) = expiry else {
        return ExpiryStatus::Unknown;
    };
    let days_left = (expiry - today).num_days();
    if days_left < 0 {
        ExpiryStatus::Expired {
            days_ago: -days_left - 1,
        }
    } else if days_left <= INSURANCE_EXPIRY_WARNING_DAYS {
        ExpiryStatus::ExpiringSoon { days_left }
    } else {
        ExpiryStatus::Active { days_left }
    }
}
