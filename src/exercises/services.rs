use serde::Serializer;
use uuid::Uuid;

use crate::{dates::parse_bound, error::AppError, store::LogFilter};

/// Largest magnitude at which every integer is exact in an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Parses a duration field; surrounding whitespace is ignored, and
/// infinities and NaN are not numbers.
pub fn parse_duration(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|d| d.is_finite())
}

/// Whole durations go out as JSON integers (`30`, not `30.0`).
pub fn serialize_duration<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// Reads the leading integer of `raw` the way a lenient form parser does:
/// `"5abc"` is 5, `"abc"` is nothing. Zero means no limit and a negative
/// limit counts by its magnitude.
pub fn parse_limit(raw: &str) -> Option<u32> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('+'))
        .unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let digits = &unsigned[..end];
    if digits.is_empty() {
        return None;
    }
    let limit = digits.parse::<u32>().unwrap_or(u32::MAX);
    (limit > 0).then_some(limit)
}

/// Path ids that are not identifiers cannot name a user.
pub fn parse_user_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::user_not_found())
}

fn bound(raw: Option<&str>) -> Result<Option<time::OffsetDateTime>, AppError> {
    match raw.filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => parse_bound(s)
            .map(Some)
            .ok_or_else(|| AppError::bad_request("Invalid date filter")),
    }
}

pub fn build_filter(
    from: Option<&str>,
    to: Option<&str>,
    limit: Option<&str>,
) -> Result<LogFilter, AppError> {
    Ok(LogFilter {
        from: bound(from)?,
        to: bound(to)?,
        limit: limit.and_then(parse_limit),
    })
}
