// SPDX-License-Identifier: MIT
// Copyright 2026 Portray Labs <dev@portray.app>

//! Birth date entry formatting and validation for the age gate.
//!
//! Input is free text auto-formatted to `DD.MM.YYYY`. Validation applies the
//! rules in a fixed order so the client can show the first failing message.

use chrono::{Datelike, NaiveDate};

/// Lowest accepted birth year.
pub const BIRTH_YEAR_MIN: i32 = 1900;
/// Highest accepted birth year. A fixed literal, not "current year":
/// the cutoff's intent (launch window vs. oversight) is an open product
/// question, so it is not silently recomputed.
pub const BIRTH_YEAR_MAX: i32 = 2025;

/// Minimum age to use the product.
pub const MIN_AGE_YEARS: i32 = 18;

/// Formatted length of a complete `DD.MM.YYYY` entry.
const FULL_LEN: usize = 10;

/// Validation failures, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BirthdateError {
    #[error("Please enter your full birth date (DD.MM.YYYY)")]
    Incomplete,
    #[error("Birth date must match DD.MM.YYYY")]
    Format,
    #[error("Birth year must be between {BIRTH_YEAR_MIN} and {BIRTH_YEAR_MAX}")]
    YearOutOfRange,
    #[error("That date does not exist")]
    InvalidDate,
}

/// A validated birth date and the age decision derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeCheck {
    pub birthdate: NaiveDate,
    pub is_over_18: bool,
}

/// Auto-format raw typed input into `DD.MM.YYYY`.
///
/// Non-digits are stripped; separators are inserted after the day and month
/// groups; anything beyond 8 digits is ignored.
pub fn format_birthdate_input(raw: &str) -> String {
    let mut out = String::with_capacity(FULL_LEN);
    let mut count = 0;

    for c in raw.chars().filter(|c| c.is_ascii_digit()) {
        if count == 8 {
            break;
        }
        if count == 2 || count == 4 {
            out.push('.');
        }
        out.push(c);
        count += 1;
    }

    out
}

/// Validate a formatted birth date entry against `today`.
///
/// Rules, in order: full length, `DD.MM.YYYY` shape, year bounds, real
/// calendar date, then the age computation. An under-18 date is *valid*
/// (`is_over_18 = false`); the caller decides not to persist it.
pub fn validate_birthdate(text: &str, today: NaiveDate) -> Result<AgeCheck, BirthdateError> {
    if text.len() != FULL_LEN {
        return Err(BirthdateError::Incomplete);
    }

    if !matches_shape(text) {
        return Err(BirthdateError::Format);
    }

    // Safe: shape check guarantees pure ASCII digits at these ranges.
    let day: u32 = text[0..2].parse().map_err(|_| BirthdateError::Format)?;
    let month: u32 = text[3..5].parse().map_err(|_| BirthdateError::Format)?;
    let year: i32 = text[6..10].parse().map_err(|_| BirthdateError::Format)?;

    if !(BIRTH_YEAR_MIN..=BIRTH_YEAR_MAX).contains(&year) {
        return Err(BirthdateError::YearOutOfRange);
    }

    // Rejects impossible triples like 31.02.2000.
    let birthdate =
        NaiveDate::from_ymd_opt(year, month, day).ok_or(BirthdateError::InvalidDate)?;

    Ok(AgeCheck {
        birthdate,
        is_over_18: age_in_years(birthdate, today) >= MIN_AGE_YEARS,
    })
}

/// Two digits, dot, two digits, dot, four digits.
fn matches_shape(text: &str) -> bool {
    text.bytes().enumerate().all(|(i, b)| match i {
        2 | 5 => b == b'.',
        _ => b.is_ascii_digit(),
    })
}

/// Whole-year age: year difference, minus one if the birthday has not
/// occurred yet this year.
fn age_in_years(birthdate: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birthdate.year();
    if (today.month(), today.day()) < (birthdate.month(), birthdate.day()) {
        age -= 1;
    }
    age
}
