//! Human-readable duration grammar: a sequence of decimal numbers, each with an
//! optional fraction and a unit suffix, such as `300ms`, `1.5h` or `2h45m`.
//!
//! Valid units are `ns`, `us` (or `µs` / `μs`), `ms`, `s`, `m` and `h`. A bare
//! `0` is accepted without a unit. `std::time::Duration` is unsigned, so a
//! leading `-` is rejected.

use std::time::Duration;

use crate::error::ValueError;

/// Only this many fraction digits are significant; the rest are below a
/// nanosecond for every supported unit.
const MAX_FRACTION_DIGITS: usize = 18;

pub fn parse_duration(text: &str) -> Result<Duration, ValueError> {
    let err = |reason| ValueError::Duration {
        text: text.to_string(),
        reason,
    };

    if text.starts_with('-') {
        return Err(err("negative durations are not supported"));
    }
    let mut rest = text.strip_prefix('+').unwrap_or(text);
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(err("empty duration"));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, after) = split_digits(rest);
        let (fraction, after) = match after.strip_prefix('.') {
            Some(tail) => split_digits(tail),
            None => ("", after),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(err("expected a number"));
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale = unit_nanos(unit).ok_or_else(|| {
            if unit.is_empty() {
                err("missing unit")
            } else {
                err("unknown unit")
            }
        })?;

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| err("number too large"))?
        };
        let mut part = whole.checked_mul(scale).ok_or_else(|| err("overflow"))?;

        if !fraction.is_empty() {
            let digits = &fraction[..fraction.len().min(MAX_FRACTION_DIGITS)];
            let numerator: u128 = digits.parse().map_err(|_| err("invalid fraction"))?;
            let denominator = 10u128.pow(digits.len() as u32);
            part += numerator * scale / denominator;
        }

        total = total.checked_add(part).ok_or_else(|| err("overflow"))?;
        rest = after;
    }

    let nanos = u64::try_from(total).map_err(|_| err("overflow"))?;
    Ok(Duration::from_nanos(nanos))
}

/// Render a duration in a form [`parse_duration`] accepts.
pub fn format_duration(duration: &Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }
    format!("{duration:?}")
}

fn split_digits(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    s.split_at(end)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}
