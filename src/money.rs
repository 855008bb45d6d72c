// region:    --- Imports
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

// endregion: --- Imports

/// Up to 8 integer digits and 2 fractional digits, matching a DECIMAL(10, 2) column.
static PRICE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,8}(?:\.\d{1,2})?$").expect("valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount must be a number with at most two decimal places.")]
    InvalidFormat,
    #[error("Amount is too large.")]
    OutOfRange,
}

/// Parse a user supplied amount such as `12`, `12.5` or `12.50` into cents.
pub fn parse_money_to_cents(input: &str) -> Result<i64, MoneyError> {
    let input = input.trim();
    if !PRICE_PATTERN.is_match(input) {
        // distinguish "too many digits" from garbage for a friendlier message
        let digits_only = input.chars().all(|c| c.is_ascii_digit() || c == '.');
        if digits_only && input.split('.').next().is_some_and(|major| major.len() > 8) {
            return Err(MoneyError::OutOfRange);
        }
        return Err(MoneyError::InvalidFormat);
    }

    let mut parts = input.split('.');
    let major = parts
        .next()
        .and_then(|p| p.parse::<i64>().ok())
        .ok_or(MoneyError::InvalidFormat)?;

    let minor = match parts.next() {
        None => 0,
        Some(minor) if minor.len() == 1 => {
            minor.parse::<i64>().map_err(|_| MoneyError::InvalidFormat)? * 10
        }
        Some(minor) => minor.parse::<i64>().map_err(|_| MoneyError::InvalidFormat)?,
    };

    major
        .checked_mul(100)
        .and_then(|value| value.checked_add(minor))
        .ok_or(MoneyError::OutOfRange)
}

pub fn format_cents(amount: i64) -> String {
    format!("${}.{:02}", amount / 100, amount % 100)
}
