//! Conversions between API wire values and display strings.
//!
//! Money travels as integer cents and weights as integer pounds; dates
//! arrive as ISO-8601 strings. Every `format_*` function is total: missing
//! input renders as [`PLACEHOLDER`] instead of failing.

use super::errors::{FormatError, FormatResult};
use super::models::{Address, Cents, Pounds};
use chrono::{DateTime, NaiveDate};

/// Rendered in place of a value that is not known yet.
pub const PLACEHOLDER: &str = "—";

const DATE_FORMAT: &str = "%d-%b-%y";
const CUSTOMER_DATE_FORMAT: &str = "%d %b %Y";

/// Groups the digits of a non-negative integer with commas.
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Formats cents as a dollar amount without the currency sign.
///
/// ```
/// use ppm_closeout::domain::{format_cents, Cents};
///
/// assert_eq!(format_cents(Cents(120000)), "1,200.00");
/// assert_eq!(format_cents(Cents(5)), "0.05");
/// ```
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents.0 < 0 { "-" } else { "" };
    let abs = cents.0.unsigned_abs();
    format!("{}{}.{:02}", sign, group_thousands(abs / 100), abs % 100)
}

/// Formats cents with a leading dollar sign, e.g. `$1,200.00`.
pub fn format_cents_to_dollars(cents: Cents) -> String {
    let sign = if cents.0 < 0 { "-" } else { "" };
    let abs = cents.0.unsigned_abs();
    format!("{}${}.{:02}", sign, group_thousands(abs / 100), abs % 100)
}

/// Formats cents as whole dollars, dropping the fractional part.
pub fn format_cents_truncate_whole(cents: Cents) -> String {
    let sign = if cents.0 < 0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(cents.0.unsigned_abs() / 100))
}

pub fn format_optional_cents(cents: Option<Cents>) -> String {
    cents.map(format_cents_to_dollars).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Formats a weight as `1,234 lbs`.
pub fn format_weight(weight: Pounds) -> String {
    let sign = if weight.0 < 0 { "-" } else { "" };
    format!("{}{} lbs", sign, group_thousands(weight.0.unsigned_abs()))
}

pub fn format_optional_weight(weight: Option<Pounds>) -> String {
    weight.map(format_weight).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Formats a wire date as `29-Apr-19`.
pub fn format_date(value: &str) -> String {
    parse_date(value)
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|_| PLACEHOLDER.to_string())
}

/// Formats a wire date the way customer pages show it, `29 Apr 2019`.
pub fn format_customer_date(value: &str) -> String {
    parse_date(value)
        .map(|date| date.format(CUSTOMER_DATE_FORMAT).to_string())
        .unwrap_or_else(|_| PLACEHOLDER.to_string())
}

pub fn format_optional_date(value: Option<&str>) -> String {
    value.map(format_date).unwrap_or_else(|| PLACEHOLDER.to_string())
}

/// Formats a date for the wire (`YYYY-MM-DD`).
pub fn format_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_yes_no(value: Option<bool>) -> String {
    match value {
        Some(true) => "Yes".to_string(),
        Some(false) => "No".to_string(),
        None => PLACEHOLDER.to_string(),
    }
}

/// Parses a dollar string such as `$1,200.00` or `12.5` into cents.
///
/// Uses integer arithmetic only; more than two fraction digits is an error.
///
/// ```
/// use ppm_closeout::domain::{format_cents, parse_dollars_to_cents};
///
/// let cents = parse_dollars_to_cents("$1,200.00").unwrap();
/// assert_eq!(format_cents(cents), "1,200.00");
/// ```
pub fn parse_dollars_to_cents(input: &str) -> FormatResult<Cents> {
    let invalid = || FormatError::InvalidAmount(input.to_string());
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let cleaned: String = rest
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return Err(invalid());
    }

    let (whole, fraction) = match cleaned.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (cleaned.as_str(), ""),
    };
    if fraction.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !fraction.chars().all(|c| c.is_ascii_digit())
        || (whole.is_empty() && fraction.is_empty())
    {
        return Err(invalid());
    }

    let dollars: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };
    let total = dollars
        .checked_mul(100)
        .and_then(|d| d.checked_add(cents))
        .ok_or_else(invalid)?;
    Ok(Cents(if negative { -total } else { total }))
}

/// Parses `1,234 lbs`, `1234` or `1,234` into whole pounds. A leading
/// `-` is kept so range checks can report it.
pub fn parse_weight(input: &str) -> FormatResult<Pounds> {
    let invalid = || FormatError::InvalidWeight(input.to_string());
    let trimmed = input.trim();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let number = rest
        .strip_suffix("lbs")
        .or_else(|| rest.strip_suffix("lb"))
        .unwrap_or(rest)
        .trim();
    let cleaned: String = number.chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let pounds = cleaned.parse::<i64>().map_err(|_| invalid())?;
    Ok(Pounds(if negative { -pounds } else { pounds }))
}

/// Formats an address on one line: `street[, street 2], city, ST 12345`.
pub fn format_address(address: &Address) -> String {
    let mut parts = vec![address.street_address1.as_str()];
    if let Some(line2) = address.street_address2.as_deref().filter(|l| !l.is_empty()) {
        parts.push(line2);
    }
    parts.push(address.city.as_str());
    format!("{}, {} {}", parts.join(", "), address.state, address.postal_code)
}

pub fn format_optional_address(address: Option<&Address>) -> String {
    address.map(format_address).unwrap_or_else(|| PLACEHOLDER.to_string())
}

fn is_postal_code(code: &str) -> bool {
    let (zip, plus4) = match code.split_once('-') {
        Some((zip, plus4)) => (zip, Some(plus4)),
        None => (code, None),
    };
    zip.len() == 5
        && zip.chars().all(|c| c.is_ascii_digit())
        && plus4.is_none_or(|p| p.len() == 4 && p.chars().all(|c| c.is_ascii_digit()))
}

/// Parses the one-line form written by [`format_address`].
///
/// ```
/// use ppm_closeout::domain::{format_address, parse_address};
///
/// let address = parse_address("1 Main St, Fort Bragg, nc 28310").unwrap();
/// assert_eq!(address.state, "NC");
/// assert_eq!(format_address(&address), "1 Main St, Fort Bragg, NC 28310");
/// ```
pub fn parse_address(input: &str) -> FormatResult<Address> {
    let invalid = || FormatError::InvalidAddress(input.to_string());
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) || parts.iter().any(|p| p.is_empty()) {
        return Err(invalid());
    }
    let Some((state, postal_code)) = parts[parts.len() - 1].split_once(char::is_whitespace) else {
        return Err(invalid());
    };
    let postal_code = postal_code.trim();
    let valid_state = state.len() == 2 && state.chars().all(|c| c.is_ascii_alphabetic());
    if !valid_state || !is_postal_code(postal_code) {
        return Err(invalid());
    }
    Ok(Address {
        street_address1: parts[0].to_string(),
        street_address2: (parts.len() == 4).then(|| parts[1].to_string()),
        city: parts[parts.len() - 2].to_string(),
        state: state.to_ascii_uppercase(),
        postal_code: postal_code.to_string(),
    })
}

/// Parses ISO dates, RFC 3339 timestamps, `29 Apr 2019` and `29-Apr-19`.
pub fn parse_date(input: &str) -> FormatResult<NaiveDate> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(timestamp.date_naive());
    }
    for format in [CUSTOMER_DATE_FORMAT, DATE_FORMAT] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date);
        }
    }
    Err(FormatError::InvalidDate(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(Cents(0)), "0.00");
        assert_eq!(format_cents(Cents(99)), "0.99");
        assert_eq!(format_cents(Cents(120000)), "1,200.00");
        assert_eq!(format_cents(Cents(123456789)), "1,234,567.89");
        assert_eq!(format_cents(Cents(-1250)), "-12.50");
    }

    #[test]
    fn test_format_cents_to_dollars() {
        assert_eq!(format_cents_to_dollars(Cents(120000)), "$1,200.00");
        assert_eq!(format_cents_to_dollars(Cents(-1250)), "-$12.50");
        assert_eq!(format_cents_truncate_whole(Cents(120099)), "1,200");
    }

    #[test]
    fn test_format_extreme_cents() {
        assert_eq!(format_cents_to_dollars(Cents(i64::MIN)), "-$92,233,720,368,547,758.08");
        assert_eq!(format_cents_to_dollars(Cents(i64::MAX)), "$92,233,720,368,547,758.07");
        assert_eq!(format_optional_cents(Some(Cents(i64::MIN))), "-$92,233,720,368,547,758.08");
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(Pounds(0)), "0 lbs");
        assert_eq!(format_weight(Pounds(1234)), "1,234 lbs");
        assert_eq!(format_weight(Pounds(7000)), "7,000 lbs");
        assert_eq!(format_weight(Pounds(1000000)), "1,000,000 lbs");
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(format_optional_cents(None), PLACEHOLDER);
        assert_eq!(format_optional_weight(None), PLACEHOLDER);
        assert_eq!(format_optional_date(None), PLACEHOLDER);
        assert_eq!(format_date("not a date"), PLACEHOLDER);
        assert_eq!(format_yes_no(None), PLACEHOLDER);
        assert_eq!(format_optional_weight(Some(Pounds(500))), "500 lbs");
    }

    #[test]
    fn test_format_dates() {
        assert_eq!(format_date("2019-04-29"), "29-Apr-19");
        assert_eq!(format_date("2019-04-29T10:30:00Z"), "29-Apr-19");
        assert_eq!(format_customer_date("2019-04-29"), "29 Apr 2019");
        assert_eq!(format_customer_date("29 Apr 2019"), "29 Apr 2019");
    }

    #[test]
    fn test_parse_dollars_to_cents() {
        assert_eq!(parse_dollars_to_cents("$1,200.00"), Ok(Cents(120000)));
        assert_eq!(parse_dollars_to_cents("1200"), Ok(Cents(120000)));
        assert_eq!(parse_dollars_to_cents("12.5"), Ok(Cents(1250)));
        assert_eq!(parse_dollars_to_cents(".75"), Ok(Cents(75)));
        assert_eq!(parse_dollars_to_cents("-$3.10"), Ok(Cents(-310)));
        assert!(parse_dollars_to_cents("").is_err());
        assert!(parse_dollars_to_cents("abc").is_err());
        assert!(parse_dollars_to_cents("1.234").is_err());
        assert!(parse_dollars_to_cents("$.").is_err());
    }

    #[test]
    fn test_cents_round_trip() {
        for text in ["1,200.00", "0.05", "987,654.32"] {
            let cents = parse_dollars_to_cents(text).unwrap();
            assert_eq!(format_cents(cents), text);
        }
        assert_eq!(format_cents(parse_dollars_to_cents("$1,200.00").unwrap()), "1,200.00");
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight("1,234 lbs"), Ok(Pounds(1234)));
        assert_eq!(parse_weight("18000"), Ok(Pounds(18000)));
        assert_eq!(parse_weight(" 750 lb "), Ok(Pounds(750)));
        assert_eq!(parse_weight("-5"), Ok(Pounds(-5)));
        assert_eq!(parse_weight("-1,200 lbs"), Ok(Pounds(-1200)));
        assert!(parse_weight("-").is_err());
        assert!(parse_weight("--5").is_err());
        assert!(parse_weight("12.5").is_err());
        assert!(parse_weight("lbs").is_err());

        let weight = parse_weight(&format_weight(Pounds(7000))).unwrap();
        assert_eq!(weight, Pounds(7000));
    }

    #[test]
    fn test_parse_address() {
        let address = parse_address("2 Elm St, Apt 4, Tacoma, WA 98401-1234").unwrap();
        assert_eq!(address.street_address1, "2 Elm St");
        assert_eq!(address.street_address2.as_deref(), Some("Apt 4"));
        assert_eq!(address.city, "Tacoma");
        assert_eq!(address.postal_code, "98401-1234");
        assert_eq!(format_address(&address), "2 Elm St, Apt 4, Tacoma, WA 98401-1234");

        assert!(parse_address("").is_err());
        assert!(parse_address("Tacoma, WA 98401").is_err());
        assert!(parse_address("2 Elm St, Tacoma, Washington 98401").is_err());
        assert!(parse_address("2 Elm St, Tacoma, WA 9840").is_err());
        assert!(parse_address("2 Elm St, , WA 98401").is_err());
        assert_eq!(format_optional_address(None), PLACEHOLDER);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2019, 4, 29).unwrap();
        assert_eq!(parse_date("2019-04-29"), Ok(expected));
        assert_eq!(parse_date("29 Apr 2019"), Ok(expected));
        assert_eq!(parse_date("29-Apr-19"), Ok(expected));
        assert!(parse_date("April").is_err());
        assert_eq!(format_iso_date(expected), "2019-04-29");
    }
}
