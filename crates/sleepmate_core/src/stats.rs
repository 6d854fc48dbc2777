use crate::clock;
use crate::model::{SleepLog, SleepRecord, Weekday};
use serde::Serialize;
use time::UtcOffset;

pub const NO_DAY: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SleepStats {
    pub average: String,
    pub best: String,
    pub worst: String,
}

/// Hours slept for each weekday, Monday first. Missing and unreadable
/// records count as zero.
pub fn weekly_durations(log: &SleepLog, offset: UtcOffset) -> [f64; 7] {
    let mut values = [0.0; 7];
    for day in Weekday::ALL {
        if let Some(record) = log.get(&day) {
            values[day.index()] = record_hours(day, record, offset);
        }
    }
    values
}

fn record_hours(day: Weekday, record: &SleepRecord, offset: UtcOffset) -> f64 {
    match record.parse() {
        Ok((start, end)) => clock::duration_hours(start.to_offset(offset), end.to_offset(offset)),
        Err(err) => {
            log::warn!("ignoring sleep record for {day}: {err}");
            0.0
        }
    }
}

/// Average over days with data; best is the overall maximum, worst the
/// smallest positive value. Ties go to the earlier weekday.
pub fn summarize(values: &[f64; 7]) -> SleepStats {
    let total: f64 = values.iter().sum();
    let count = values.iter().filter(|value| **value > 0.0).count();
    let average = if count > 0 { total / count as f64 } else { 0.0 };

    let mut best = 0;
    for (index, value) in values.iter().enumerate() {
        if *value > values[best] {
            best = index;
        }
    }

    let mut worst: Option<usize> = None;
    for (index, value) in values.iter().enumerate() {
        if *value <= 0.0 {
            continue;
        }
        match worst {
            Some(current) if values[current] <= *value => {}
            _ => worst = Some(index),
        }
    }

    SleepStats {
        average: format_one_decimal(average),
        best: Weekday::ALL[best].label().to_string(),
        worst: worst
            .map(|index| Weekday::ALL[index].label().to_string())
            .unwrap_or_else(|| NO_DAY.to_string()),
    }
}

pub fn weekly_stats(log: &SleepLog, offset: UtcOffset) -> SleepStats {
    summarize(&weekly_durations(log, offset))
}

// Halves round up, so 7.25 reads as 7.3.
fn format_one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepStatus {
    NeedsMore,
    Enough,
    TooMuch,
    Neutral,
}

impl SleepStatus {
    pub fn message(self) -> &'static str {
        match self {
            SleepStatus::NeedsMore => "Looks like you need a bit more sleep.",
            SleepStatus::Enough => "You're getting plenty of sleep!",
            SleepStatus::TooMuch => "You're sleeping too much...",
            SleepStatus::Neutral => "Have a good day today.",
        }
    }
}

/// Mood line for the home screen, from the record of the current weekday.
/// Unlike the weekly view this uses the elapsed time between the two
/// timestamps, wrapped once when negative, so equal ends mean no sleep.
/// Gaps between the bands fall back to the neutral greeting.
pub fn sleep_status(record: Option<&SleepRecord>) -> SleepStatus {
    let Some(record) = record else {
        return SleepStatus::Neutral;
    };
    let hours = match record.parse() {
        Ok((start, end)) => {
            let mut minutes = (end - start).whole_minutes();
            if minutes < 0 {
                minutes += i64::from(clock::DAY_MINUTES);
            }
            minutes as f64 / 60.0
        }
        Err(err) => {
            log::warn!("ignoring today's sleep record: {err}");
            return SleepStatus::Neutral;
        }
    };

    if (1.5..=4.5).contains(&hours) {
        SleepStatus::NeedsMore
    } else if (6.0..=9.0).contains(&hours) {
        SleepStatus::Enough
    } else if hours >= 10.5 {
        SleepStatus::TooMuch
    } else {
        SleepStatus::Neutral
    }
}
