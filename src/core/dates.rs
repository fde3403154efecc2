//! Calendar-date helpers.
//!
//! Forms edit dates as `YYYY-MM-DD` strings; the store keeps them as the UTC instant
//! of local midnight. Everything here is generic over [`TimeZone`] so callers pass
//! `chrono::Local` in the application and a fixed zone in tests.

use crate::errors::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};

/// Format used by date inputs.
pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a `YYYY-MM-DD` form value.
///
/// # Errors
/// Returns `Error::InvalidDate` if the text is not a valid calendar date.
pub fn parse_form_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), FORM_DATE_FORMAT).map_err(|_| Error::InvalidDate {
        input: input.to_string(),
    })
}

/// Formats a calendar date for a date input.
#[must_use]
pub fn format_form_date(date: NaiveDate) -> String {
    date.format(FORM_DATE_FORMAT).to_string()
}

/// The first instant of `date` in `tz`.
///
/// When midnight falls into a daylight-saving gap the first valid instant after it
/// is used instead.
///
/// # Errors
/// Returns `Error::InvalidDate` if no instant of the day can be represented.
pub fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            // Gaps are at most a few hours; probe forward hour by hour.
            (1..=3).find_map(|hours| {
                tz.from_local_datetime(&(midnight + chrono::Duration::hours(hours)))
                    .earliest()
            })
        })
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| Error::InvalidDate {
            input: format_form_date(date),
        })
}

/// The last representable instant of `date` in `tz`: one microsecond before the
/// next local midnight.
///
/// # Errors
/// Returns `Error::InvalidDate` if the following day cannot be represented.
pub fn end_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>> {
    let next = date.checked_add_days(Days::new(1)).ok_or_else(|| Error::InvalidDate {
        input: format_form_date(date),
    })?;
    Ok(start_of_day(tz, next)? - chrono::Duration::microseconds(1))
}

/// Normalizes a user-chosen date to the stored instant (local midnight).
///
/// # Errors
/// See [`start_of_day`].
pub fn to_stored<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>> {
    start_of_day(tz, date)
}

/// Parses a form value straight to the stored instant.
///
/// # Errors
/// Returns `Error::InvalidDate` for unparseable input.
pub fn form_to_stored<Tz: TimeZone>(tz: &Tz, input: &str) -> Result<DateTime<Utc>> {
    to_stored(tz, parse_form_date(input)?)
}

/// The local calendar day an instant falls on.
#[must_use]
pub fn calendar_day<Tz: TimeZone>(tz: &Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Formats a stored instant for a date input.
#[must_use]
pub fn stored_to_form<Tz: TimeZone>(tz: &Tz, instant: DateTime<Utc>) -> String {
    format_form_date(calendar_day(tz, instant))
}

/// `(today - days, today)`, the default range of date filters.
#[must_use]
pub fn trailing_range(today: NaiveDate, days: u32) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN);
    (start, today)
}

/// Today's date in the local timezone.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_form_date() {
        assert_eq!(parse_form_date("2024-05-01").unwrap(), date(2024, 5, 1));
        assert_eq!(parse_form_date(" 2024-05-01 ").unwrap(), date(2024, 5, 1));
        assert!(matches!(
            parse_form_date("01/05/2024"),
            Err(Error::InvalidDate { input: _ })
        ));
        assert!(parse_form_date("").is_err());
    }

    #[test]
    fn test_start_and_end_of_day_in_offset_zone() {
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        let start = start_of_day(&jakarta, date(2024, 5, 1)).unwrap();
        let end = end_of_day(&jakarta, date(2024, 5, 1)).unwrap();

        // Local midnight in UTC+7 is 17:00 the previous day in UTC.
        assert_eq!(start.date_naive(), date(2024, 4, 30));
        assert_eq!(start.hour(), 17);
        assert_eq!(end - start, chrono::Duration::days(1) - chrono::Duration::microseconds(1));
        assert_eq!(calendar_day(&jakarta, start), date(2024, 5, 1));
        assert_eq!(calendar_day(&jakarta, end), date(2024, 5, 1));
    }

    #[test]
    fn test_form_round_trip_keeps_calendar_day() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let stored = form_to_stored(&tz, "2024-12-31").unwrap();
        assert_eq!(stored_to_form(&tz, stored), "2024-12-31");
    }

    #[test]
    fn test_trailing_range() {
        let (start, end) = trailing_range(date(2024, 3, 1), 30);
        assert_eq!(start, date(2024, 1, 31));
        assert_eq!(end, date(2024, 3, 1));
    }
}
