use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::error::TrackerError;

/// Parses a user supplied day. Accepted forms are `YYYY-MM-DD`, `DD/MM/YYYY` and `DD/MM/YY`,
/// nothing else.
pub fn parse_date_arg(value: &str) -> Result<NaiveDate, TrackerError> {
    let value = value.trim();
    let invalid = || TrackerError::Input(value.to_string());

    if value.contains('-') {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid());
    }

    let parts = value.split('/').collect::<Vec<_>>();
    let [day, month, year] = parts.as_slice() else {
        return Err(invalid());
    };
    let format = match year.len() {
        4 => "%d/%m/%Y",
        2 => "%d/%m/%y",
        _ => return Err(invalid()),
    };
    if day.is_empty() || month.is_empty() || day.len() > 2 || month.len() > 2 {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, format).map_err(|_| invalid())
}

/// This is the standard way of converting a date to a string in ghtracker. GitHub search qualifiers
/// use the same form.
pub fn date_to_query(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// ISO-8601 in UTC with a `Z` suffix, the format GitHub expects for `since`/`until`.
pub fn utc_iso(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format of the "Last Updated (UTC)" settings cell.
pub fn last_updated_stamp(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d %H:%M:%SZ").to_string()
}

/// `[00:00:00, 23:59:59]` of `date` in UTC.
pub fn utc_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(NaiveTime::MIN).and_utc();
    let end = start + Duration::days(1) - TimeDelta::seconds(1);
    (start, end)
}

/// Excel stores dates as days since 1899-12-30.
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

pub fn date_to_excel_serial(date: NaiveDate) -> f64 {
    (date - excel_epoch()).num_days() as f64
}

/// Serial of 9999-12-31, the last day Excel can display.
const EXCEL_MAX_SERIAL: f64 = 2958465.0;

/// Fractional parts (time of day) are dropped. Numbers outside Excel's date range are not dates.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=EXCEL_MAX_SERIAL).contains(&serial) {
        return None;
    }
    TimeDelta::try_days(serial.trunc() as i64)
        .and_then(|days| excel_epoch().checked_add_signed(days))
}
