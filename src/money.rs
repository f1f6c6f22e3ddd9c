//! Integer-cents monetary arithmetic.
//!
//! All monetary values in the engine are `i64` minor units (cents). Splits
//! and percentage math happen on integers with explicit round-half-up
//! rounding; conversion to and from decimal strings is confined to the
//! serialization boundary via [`format_cents`] and [`parse_cents`].

use crate::errors::{Error, Result};

/// Computes `percent`% of `total_cents`, rounding half up.
///
/// Intended for non-negative totals and percentages in `[0, 100]`; the
/// intermediate product is widened to `i128` so large totals cannot overflow.
#[must_use]
pub fn percentage_of(total_cents: i64, percent: i32) -> i64 {
    let product = i128::from(total_cents) * i128::from(percent);
    i64::try_from((product + 50) / 100).unwrap_or(i64::MAX)
}

/// Splits `total_cents` into (needs, wants, savings) according to three
/// percentages summing to 100.
///
/// Needs and wants are rounded half up independently; savings takes whatever
/// remains, so the three parts always sum to `total_cents` exactly and no
/// cent is lost or invented by rounding.
#[must_use]
pub fn split_three_way(
    total_cents: i64,
    needs_percent: i32,
    wants_percent: i32,
    savings_percent: i32,
) -> (i64, i64, i64) {
    debug_assert_eq!(needs_percent + wants_percent + savings_percent, 100);
    let needs = percentage_of(total_cents, needs_percent);
    let wants = percentage_of(total_cents, wants_percent);
    let savings = total_cents - needs - wants;
    (needs, wants, savings)
}

/// Ceiling division for non-negative cents amounts.
#[must_use]
pub const fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    if denominator <= 0 {
        return 0;
    }
    (numerator + denominator - 1) / denominator
}

/// Renders a cents amount as a decimal string, e.g. `12345` -> `"123.45"`.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}

/// Parses a decimal string into cents, e.g. `"123.45"` -> `12345`.
///
/// Accepts an optional leading sign and at most two fractional digits;
/// a single fractional digit means tenths (`"1.5"` -> `150`).
pub fn parse_cents(input: &str) -> Result<i64> {
    let trimmed = input.trim();
    let (sign, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let invalid = || Error::Validation {
        message: format!("not a monetary amount: {input:?}"),
    };

    let (whole_part, frac_part) = match unsigned.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (unsigned, ""),
    };

    if whole_part.is_empty() || frac_part.len() > 2 {
        return Err(invalid());
    }

    let whole: i64 = whole_part.parse().map_err(|_| invalid())?;
    let frac: i64 = if frac_part.is_empty() {
        0
    } else {
        let digits: i64 = frac_part.parse().map_err(|_| invalid())?;
        if frac_part.len() == 1 { digits * 10 } else { digits }
    };

    Ok(sign * (whole * 100 + frac))
}
