//! Pure field-format predicates.
//!
//! The national-ID rule is the weighted mod-10 checksum over the
//! zero-padded 9-digit key; phone and email are format checks only. All
//! three are called by the submission validator and never issue I/O.

use once_cell::sync::Lazy;
use regex::Regex;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\d[\d\s-]{6,13}\d$").expect("invalid phone regex"));

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex"));

/// Checksum over the zero-padded 9-digit key: digits are weighted
/// 1,2,1,2,… left to right, two-digit products reduce by subtracting 9,
/// and the sum must divide by 10.
pub fn valid_national_id(raw: &str) -> bool {
    let id = raw.trim();
    if id.is_empty() || id.len() > 9 || !id.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let padded = format!("{id:0>9}");
    let sum: u32 = padded
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            let product = digit * if i % 2 == 0 { 1 } else { 2 };
            if product > 9 { product - 9 } else { product }
        })
        .sum();

    sum % 10 == 0
}

/// Phone format: optional leading `+`, 8–15 digits with internal spaces
/// or dashes allowed.
pub fn valid_phone(raw: &str) -> bool {
    PHONE_RE.is_match(raw.trim())
}

pub fn valid_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw.trim())
}
