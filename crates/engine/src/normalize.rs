//! Pure normalization helpers shared by the reference loader, the input
//! normalizer and the matcher.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Normalize a phone value to bare digits.
///
/// Every non-digit is dropped; an 11-digit number with a leading `1`
/// (North American country code) loses that digit. Absent input yields an
/// empty string. The length is not validated.
pub fn normalize_phone(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 11 && digits.starts_with('1') {
        digits[1..].to_string()
    } else {
        digits
    }
}

/// Case- and whitespace-insensitive form of a lookup key.
pub fn normalize_key(value: &str) -> String {
    value.trim().to_uppercase()
}

/// True for id/serial tokens that carry no value: empty after trimming, or
/// the literal `nan` left behind by spreadsheet exports.
pub fn is_missing_token(value: &str) -> bool {
    let t = value.trim();
    t.is_empty() || t.eq_ignore_ascii_case("nan")
}

/// Drop a leading `TX` / `TX-` prefix (any case) from a serial number.
pub fn strip_serial_prefix(value: &str) -> String {
    let t = value.trim();
    let rest = match t.get(..2) {
        Some(prefix) if prefix.eq_ignore_ascii_case("tx") => {
            let rest = &t[2..];
            rest.strip_prefix('-').unwrap_or(rest)
        }
        _ => t,
    };
    rest.trim().to_string()
}

/// Canonical form of a column header for key-column detection:
/// lowercase with whitespace, `_` and `-` removed.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%y %H:%M:%S",
    "%m/%d/%y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%m/%d/%y",
    "%m-%d-%y",
];

/// `%Y` happily reads "24" as year 24; such parses are left to the `%y`
/// formats.
const MIN_YEAR: i32 = 1000;

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_YEAR).then_some(date)
}

/// Parse the date part of a loosely formatted date/datetime string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }
    let rfc3339 = DateTime::parse_from_rfc3339(v).ok().map(|dt| dt.date_naive());
    let datetimes = DATETIME_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDateTime::parse_from_str(v, fmt).ok())
        .map(|dt| dt.date());
    let dates = DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(v, fmt).ok());
    rfc3339.into_iter().chain(datetimes).chain(dates).find_map(plausible)
}

/// Reformat a date cell to `YYYY-MM-DD`; unparseable values become blank.
pub fn format_date(value: &str) -> String {
    parse_date(value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_strips_formatting_and_country_code() {
        assert_eq!(normalize_phone(Some("+1 (555) 123-4567")), "5551234567");
        assert_eq!(normalize_phone(Some("5551234567")), "5551234567");
        assert_eq!(normalize_phone(None), "");
    }

    #[test]
    fn phone_eleven_digits_without_leading_one_unchanged() {
        assert_eq!(normalize_phone(Some("25551234567")), "25551234567");
        assert_eq!(normalize_phone(Some("1-555-123")), "1555123");
    }

    #[test]
    fn phone_without_digits_is_empty() {
        assert_eq!(normalize_phone(Some("nan")), "");
        assert_eq!(normalize_phone(Some("")), "");
    }

    #[test]
    fn key_is_trimmed_and_uppercased() {
        assert_eq!(normalize_key("abc "), "ABC");
        assert_eq!(normalize_key("  x1"), "X1");
    }

    #[test]
    fn missing_tokens() {
        assert!(is_missing_token(""));
        assert!(is_missing_token("   "));
        assert!(is_missing_token("NaN"));
        assert!(is_missing_token(" nan "));
        assert!(!is_missing_token("nana"));
        assert!(!is_missing_token("0"));
    }

    #[test]
    fn serial_prefix_removed() {
        assert_eq!(strip_serial_prefix("TX-12345"), "12345");
        assert_eq!(strip_serial_prefix("tx12345"), "12345");
        assert_eq!(strip_serial_prefix("Tx- 77 "), "77");
        assert_eq!(strip_serial_prefix("AB12"), "AB12");
        assert_eq!(strip_serial_prefix("T"), "T");
        assert_eq!(strip_serial_prefix("TXX-1"), "X-1");
    }

    #[test]
    fn header_variants_collapse() {
        assert_eq!(normalize_header("BTP SN"), "btpsn");
        assert_eq!(normalize_header("btp_sn"), "btpsn");
        assert_eq!(normalize_header("Phone Number"), "phonenumber");
        assert_eq!(normalize_header("phone_number"), "phonenumber");
        assert_eq!(normalize_header(" ID "), "id");
    }

    #[test]
    fn dates_reformatted() {
        assert_eq!(format_date("2024-03-05 14:22:01"), "2024-03-05");
        assert_eq!(format_date("3/5/24"), "2024-03-05");
        assert_eq!(format_date("03-05-24"), "2024-03-05");
        assert_eq!(format_date("3/5/24 9:15"), "2024-03-05");
        assert_eq!(format_date("2024-03-05T14:22:01.123"), "2024-03-05");
        assert_eq!(format_date("2024-03-05T14:22:01+02:00"), "2024-03-05");
        assert_eq!(format_date("3/5/2024"), "2024-03-05");
        assert_eq!(format_date("2024-03-05"), "2024-03-05");
    }

    #[test]
    fn bad_dates_are_blank() {
        assert_eq!(format_date(""), "");
        assert_eq!(format_date("not a date"), "");
        assert_eq!(format_date("2024-13-45"), "");
    }
}
