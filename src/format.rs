use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Formats an amount with two fraction digits and Indian digit grouping
/// (`1234567.5` -> `"12,34,567.50"`).
pub fn format_amount(amount: f64) -> String {
    let paise = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && paise > 0 { "-" } else { "" };
    let rupees = paise / 100;
    format!("{sign}{}.{:02}", rupees.to_formatted_string(&Locale::en_IN), paise % 100)
}

/// Reorders an input-native `YYYY-MM-DD` date into `DD-MM-YYYY` for display.
/// Anything that is not a date is handed back untouched.
pub fn display_date(value: &str) -> String {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%d-%m-%Y").to_string(),
        Err(_) => value.to_string(),
    }
}
