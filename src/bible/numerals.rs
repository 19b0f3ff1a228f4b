//! Roman numeral conversion.
//!
//! Homily and chapter numbers in the patristic sources are written in Roman
//! form ("Homily XLV", "Matt. XII. 46"); everything downstream works in
//! integers.

use std::num::NonZeroU32;

use crate::error::{Error, Result};

/// Greedy encoding table, largest first, subtractive pairs included.
const ENCODING: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

const fn digit_value(c: char) -> Option<u32> {
    match c {
        'I' => Some(1),
        'V' => Some(5),
        'X' => Some(10),
        'L' => Some(50),
        'C' => Some(100),
        'D' => Some(500),
        'M' => Some(1000),
        _ => None,
    }
}

/// Decode a Roman numeral (case-insensitive).
///
/// Single right-to-left pass: a digit smaller than the largest digit seen so
/// far is subtracted, anything else is added.
pub fn to_int(roman: &str) -> Result<u32> {
    let trimmed = roman.trim();
    if trimmed.is_empty() {
        return Err(Error::numeral(roman, "empty numeral"));
    }

    let mut total: u32 = 0;
    let mut max_seen: u32 = 0;
    for c in trimmed.chars().rev() {
        let value = digit_value(c.to_ascii_uppercase())
            .ok_or_else(|| Error::numeral(roman, "not a Roman digit"))?;
        if value < max_seen {
            total = total
                .checked_sub(value)
                .ok_or_else(|| Error::numeral(roman, "subtraction below zero"))?;
        } else {
            total = total
                .checked_add(value)
                .ok_or_else(|| Error::numeral(roman, "value too large"))?;
            max_seen = value;
        }
    }

    if total == 0 {
        return Err(Error::numeral(roman, "evaluates to zero"));
    }
    Ok(total)
}

/// Encode a positive integer as an uppercase Roman numeral.
pub fn to_roman(n: u32) -> Result<String> {
    NonZeroU32::new(n)
        .map(encode)
        .ok_or_else(|| Error::numeral(n.to_string(), "zero has no Roman form"))
}

/// Infallible encoding for numbers already known to be positive.
pub fn encode(n: NonZeroU32) -> String {
    let mut n = n.get();
    let mut out = String::new();
    for (value, symbol) in ENCODING {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

/// Whether `s` is made only of Roman digits (either case).
pub fn is_roman(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| digit_value(c.to_ascii_uppercase()).is_some())
}

/// Parse a number written either in Arabic or Roman form ("12" or "XII").
pub fn parse_number(token: &str) -> Result<u32> {
    let token = token.trim().trim_end_matches('.');
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        return token
            .parse()
            .map_err(|_| Error::numeral(token, "number out of range"));
    }
    to_int(token)
}
