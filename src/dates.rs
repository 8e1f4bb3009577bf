//! Calendar date handling for exercise records.

use lazy_static::lazy_static;
use regex::Regex;
use time::{
    format_description::{well_known::Rfc3339, FormatItem},
    macros::format_description,
    Date, Month, OffsetDateTime, Time,
};

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const CALENDAR: &[FormatItem<'static>] =
    format_description!("[weekday repr:short] [month repr:short] [day] [year]");

fn is_iso_date(input: &str) -> bool {
    lazy_static! {
        static ref ISO_DATE_RE: Regex = Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap();
    }
    ISO_DATE_RE.is_match(input)
}

fn parse_iso_date(input: &str) -> Option<OffsetDateTime> {
    Date::parse(input, ISO_DATE)
        .ok()
        .map(|d| d.midnight().assume_utc())
}

/// Turns an optional `YYYY-MM-DD` string into an instant at UTC midnight.
///
/// Anything else, including strings that match the shape but name no real
/// day (`2023-13-45`), falls back to the current time. Never fails.
pub fn normalize_date(input: Option<&str>) -> OffsetDateTime {
    input
        .filter(|s| is_iso_date(s))
        .and_then(parse_iso_date)
        .unwrap_or_else(OffsetDateTime::now_utc)
}

/// Human-readable calendar rendering, e.g. `Mon May 01 2023`.
pub fn display_date(at: OffsetDateTime) -> String {
    let utc = at.to_offset(time::UtcOffset::UTC);
    utc.format(CALENDAR)
        .unwrap_or_else(|_| utc.date().to_string())
}

/// Parses a log query bound. Accepts an RFC 3339 timestamp or any prefix of
/// `YYYY-MM-DDTHH:MM:SS.fff`, down to a bare year; missing parts start the
/// period and a missing offset means UTC.
pub fn parse_bound(input: &str) -> Option<OffsetDateTime> {
    let input = input.trim();
    OffsetDateTime::parse(input, &Rfc3339)
        .ok()
        .or_else(|| parse_partial(input))
}

fn parse_partial(input: &str) -> Option<OffsetDateTime> {
    lazy_static! {
        static ref PARTIAL_RE: Regex = Regex::new(
            r"^(\d{4})(?:-(\d{2})(?:-(\d{2})(?:[T ](\d{2}):(\d{2})(?::(\d{2})(?:\.(\d{1,9}))?)?Z?)?)?)?$"
        )
        .unwrap();
    }
    let caps = PARTIAL_RE.captures(input)?;
    let number = |i: usize, default: u32| -> Option<u32> {
        caps.get(i).map_or(Some(default), |m| m.as_str().parse().ok())
    };

    let year: i32 = caps.get(1)?.as_str().parse().ok()?;
    let month = Month::try_from(u8::try_from(number(2, 1)?).ok()?).ok()?;
    let day = u8::try_from(number(3, 1)?).ok()?;
    let date = Date::from_calendar_date(year, month, day).ok()?;

    let nanos = caps.get(7).map_or(Some(0), |m| {
        format!("{:0<9}", m.as_str()).parse::<u32>().ok()
    })?;
    let time = Time::from_hms_nano(
        u8::try_from(number(4, 0)?).ok()?,
        u8::try_from(number(5, 0)?).ok()?,
        u8::try_from(number(6, 0)?).ok()?,
        nanos,
    )
    .ok()?;

    Some(date.with_time(time).assume_utc())
}
