use crate::error::AppError;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

pub const DAY_MINUTES: i32 = 24 * 60;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Hours slept between two points, looking only at their hour and minute.
/// An end at or before the start wraps to the following day.
pub fn duration_hours(start: OffsetDateTime, end: OffsetDateTime) -> f64 {
    let start_minutes = i32::from(start.hour()) * 60 + i32::from(start.minute());
    let mut end_minutes = i32::from(end.hour()) * 60 + i32::from(end.minute());
    if end_minutes <= start_minutes {
        end_minutes += DAY_MINUTES;
    }
    f64::from(end_minutes - start_minutes) / 60.0
}

/// Strict 24-hour `HH:MM`.
pub fn is_valid_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }

    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hour <= 23 && minute <= 59
}

pub fn minutes_of_day(value: &str) -> Result<u32, AppError> {
    if !is_valid_time(value) {
        return Err(AppError::invalid_input(format!(
            "time must be HH:MM, got '{value}'"
        )));
    }
    let (hour, minute) = value
        .split_once(':')
        .ok_or_else(|| AppError::invalid_input("time must be HH:MM"))?;
    let hour: u32 = hour
        .parse()
        .map_err(|_| AppError::invalid_input("hour must be numeric"))?;
    let minute: u32 = minute
        .parse()
        .map_err(|_| AppError::invalid_input("minute must be numeric"))?;
    Ok(hour * 60 + minute)
}

/// Renders minutes as `HH:MM`. Exactly one full day renders as `24:00`;
/// anything else is folded into a single day first, so offsets into the
/// following day read as clock times.
pub fn format_minutes(minutes: i32) -> String {
    if minutes == DAY_MINUTES {
        return "24:00".to_string();
    }
    let folded = minutes.rem_euclid(DAY_MINUTES);
    format!("{:02}:{:02}", folded / 60, folded % 60)
}

pub fn parse_date(value: &str) -> Result<Date, AppError> {
    Date::parse(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::invalid_input(format!("date must be YYYY-MM-DD, got '{value}'")))
}

pub fn format_date(date: Date) -> Result<String, AppError> {
    date.format(DATE_FORMAT)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn shift_date(date: Date, days: i64) -> Result<Date, AppError> {
    date.checked_add(Duration::days(days))
        .ok_or_else(|| AppError::invalid_input("date out of range"))
}

pub fn offset_from_hours(hours: i8) -> Result<UtcOffset, AppError> {
    if !(-12..=14).contains(&hours) {
        return Err(AppError::invalid_input(format!(
            "utc offset must be between -12 and 14 hours, got {hours}"
        )));
    }
    UtcOffset::from_hms(hours, 0, 0).map_err(|err| AppError::invalid_input(err.to_string()))
}

pub fn now_in(offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::now_utc().to_offset(offset)
}

pub fn today_in(offset: UtcOffset) -> Date {
    now_in(offset).date()
}

pub fn clock_time(moment: OffsetDateTime) -> String {
    format!("{:02}:{:02}", moment.hour(), moment.minute())
}

/// RFC 3339 (UTC) timestamp for `HH:MM` on `date` in the given offset.
pub fn sleep_timestamp(
    date: Date,
    time_of_day: &str,
    offset: UtcOffset,
) -> Result<String, AppError> {
    let minutes = minutes_of_day(time_of_day)?;
    let time = Time::from_hms((minutes / 60) as u8, (minutes % 60) as u8, 0)
        .map_err(|err| AppError::invalid_input(err.to_string()))?;
    PrimitiveDateTime::new(date, time)
        .assume_offset(offset)
        .to_offset(UtcOffset::UTC)
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
