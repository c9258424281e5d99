//! Display formatting for addresses, amounts and dates.

use alloy::primitives::utils::format_ether;
use alloy::primitives::U256;
use chrono::{DateTime, Utc};

/// Separator inserted by [`truncate_address`].
pub const TRUNCATION_SEPARATOR: &str = "...";

/// Shorten an address to its first 6 and last 4 characters.
///
/// An empty input yields an empty string.
pub fn truncate_address(address: &str) -> String {
    if address.is_empty() {
        return String::new();
    }

    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}{}{}", head, TRUNCATION_SEPARATOR, tail)
}

/// Format an amount as US dollars: `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    if amount.is_nan() {
        return "$NaN".to_string();
    }
    if amount.is_infinite() {
        return if amount < 0.0 { "-$∞" } else { "$∞" }.to_string();
    }

    let cents = (amount.abs() * 100.0).round() as u128;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// Parse a decimal string and format it as US dollars.
///
/// `None` when the text is not a number or its cents do not fit a `u128`.
pub fn format_currency_str(amount: &str) -> Option<String> {
    parse_decimal(amount)
        .filter(|v| (v.abs() * 100.0) < u128::MAX as f64)
        .map(format_currency)
}

/// Format a timestamp as a long US date: `January 5, 2025`.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%B %-d, %Y").to_string()
}

/// Format a wei amount in ether without trailing zeros: `0.05`.
pub fn format_eth(wei: U256) -> String {
    let formatted = format_ether(wei);
    match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => formatted,
    }
}

/// Parse a plain non-negative decimal such as `"15000"` or `"0.25"`.
///
/// Signs, exponents, separators and surrounding text are rejected.
pub fn parse_decimal(input: &str) -> Option<f64> {
    let s = input.trim();
    let (whole, frac) = match s.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (s, None),
    };

    let digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    let valid = match frac {
        Some(frac) => digits(whole) && digits(frac) && !(whole.is_empty() && frac.is_empty()),
        None => !whole.is_empty() && digits(whole),
    };

    if valid {
        s.parse().ok()
    } else {
        None
    }
}

fn group_thousands(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
