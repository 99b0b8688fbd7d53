//! Conversions between the engine's `time64` and `time` types.

use thiserror::Error;
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, Month,
    OffsetDateTime, Time,
};

/// Seconds since the Unix epoch, UTC.
pub type Time64 = i64;

/// 1400-01-01T00:00:00Z, the earliest instant the engine accepts.
pub const MINTIME: Time64 = -17_987_443_200;
/// 9999-12-31T23:59:59Z, the latest instant the engine accepts.
pub const MAXTIME: Time64 = 253_402_300_799;

#[derive(Debug, Error)]
pub enum DateError {
    #[error("time64 {0} is outside the supported range")]
    OutOfRange(Time64),
    #[error("invalid date: {0}")]
    InvalidDate(#[from] time::error::ComponentRange),
    #[error("cannot format date: {0}")]
    Format(#[from] time::error::Format),
}

fn neutral_time() -> Time {
    Time::from_hms(10, 59, 0).unwrap_or(Time::MIDNIGHT)
}

pub fn to_datetime(t: Time64) -> Result<OffsetDateTime, DateError> {
    if !(MINTIME..=MAXTIME).contains(&t) {
        return Err(DateError::OutOfRange(t));
    }
    Ok(OffsetDateTime::from_unix_timestamp(t)?)
}

pub fn from_datetime(dt: OffsetDateTime) -> Time64 {
    dt.unix_timestamp()
}

pub fn to_date(t: Time64) -> Result<Date, DateError> {
    Ok(to_datetime(t)?.date())
}

/// 10:59 UTC on the given day. The engine stores posted dates at this time
/// so that they fall on the same calendar day in nearly every timezone.
pub fn date_to_time64_neutral(date: Date) -> Time64 {
    date.with_time(neutral_time()).assume_utc().unix_timestamp()
}

pub fn dmy_to_time64_neutral(day: u8, month: u8, year: i32) -> Result<Time64, DateError> {
    let month = Month::try_from(month)?;
    let date = Date::from_calendar_date(year, month, day)?;
    Ok(date_to_time64_neutral(date))
}

/// `YYYY-MM-DD`, or `N/A` for an unset (zero) or out-of-range time.
pub fn format_date(t: Time64) -> String {
    if t == 0 {
        return "N/A".to_string();
    }
    let format = format_description!("[year]-[month]-[day]");
    to_date(t)
        .ok()
        .and_then(|d| d.format(&format).ok())
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn format_iso8601(t: Time64) -> Result<String, DateError> {
    Ok(to_datetime(t)?.format(&Rfc3339)?)
}
