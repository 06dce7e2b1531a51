//! Query and path parameter validation.
//!
//! Parameters arrive as raw strings so that malformed values produce the
//! JSON error body instead of the extractor's plain-text rejection.

use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

use crate::error::AppError;

/// Parse an optional integer, applying `default` when absent or blank and
/// rejecting values outside `range`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] for non-integers and out-of-range values.
pub fn bounded<T>(
    name: &str,
    raw: Option<&str>,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, AppError>
where
    T: FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(default);
    };

    match raw.parse::<T>() {
        Ok(value) if range.contains(&value) => Ok(value),
        _ => Err(AppError::Validation(format!(
            "{name} must be an integer between {} and {}",
            range.start(),
            range.end()
        ))),
    }
}

/// Parse an optional enum-like value with `FromStr`.
///
/// # Errors
///
/// Returns [`AppError::Validation`] with the parser's message.
pub fn optional<T>(raw: Option<&str>) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map_err(|e| AppError::Validation(e.to_string())))
        .transpose()
}

/// Parse a numeric path id.
///
/// # Errors
///
/// Returns [`AppError::Validation`] naming the resource.
pub fn path_id<T: FromStr>(resource: &str, raw: &str) -> Result<T, AppError> {
    raw.parse::<T>()
        .map_err(|_| AppError::Validation(format!("Valid {resource} ID is required")))
}

/// Which end of a day a bare date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBound {
    Start,
    End,
}

/// Parse `YYYY-MM-DD` (UTC, at the start or end of the day) or RFC 3339.
///
/// # Errors
///
/// Returns [`AppError::Validation`] when the value is missing or invalid.
pub fn date(
    name: &str,
    raw: Option<&str>,
    bound: DayBound,
) -> Result<DateTime<FixedOffset>, AppError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation(format!("{name} is required")))?;

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed);
    }

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("{name} must be a date (YYYY-MM-DD) or RFC 3339 timestamp"))
    })?;
    let time = match bound {
        DayBound::Start => NaiveTime::MIN,
        DayBound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN),
    };

    Ok(day.and_time(time).and_utc().fixed_offset())
}
