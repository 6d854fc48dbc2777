use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Weekday key of the sleep log. The serialized form is the one-syllable
/// Korean label the stored documents use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    #[serde(rename = "월")]
    Mon,
    #[serde(rename = "화")]
    Tue,
    #[serde(rename = "수")]
    Wed,
    #[serde(rename = "목")]
    Thu,
    #[serde(rename = "금")]
    Fri,
    #[serde(rename = "토")]
    Sat,
    #[serde(rename = "일")]
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Mon => "월",
            Weekday::Tue => "화",
            Weekday::Wed => "수",
            Weekday::Thu => "목",
            Weekday::Fri => "금",
            Weekday::Sat => "토",
            Weekday::Sun => "일",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    fn english(self) -> (&'static str, &'static str) {
        match self {
            Weekday::Mon => ("mon", "monday"),
            Weekday::Tue => ("tue", "tuesday"),
            Weekday::Wed => ("wed", "wednesday"),
            Weekday::Thu => ("thu", "thursday"),
            Weekday::Fri => ("fri", "friday"),
            Weekday::Sat => ("sat", "saturday"),
            Weekday::Sun => ("sun", "sunday"),
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Weekday {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Weekday::ALL
            .into_iter()
            .find(|day| {
                let (short, long) = day.english();
                day.label() == trimmed
                    || short.eq_ignore_ascii_case(trimmed)
                    || long.eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| AppError::invalid_input(format!("unknown weekday '{trimmed}'")))
    }
}

impl From<time::Weekday> for Weekday {
    fn from(day: time::Weekday) -> Self {
        match day {
            time::Weekday::Monday => Weekday::Mon,
            time::Weekday::Tuesday => Weekday::Tue,
            time::Weekday::Wednesday => Weekday::Wed,
            time::Weekday::Thursday => Weekday::Thu,
            time::Weekday::Friday => Weekday::Fri,
            time::Weekday::Saturday => Weekday::Sat,
            time::Weekday::Sunday => Weekday::Sun,
        }
    }
}

/// One night of sleep. Both ends are RFC 3339 timestamps; only their
/// time of day carries meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub start: String,
    pub end: String,
}

impl SleepRecord {
    pub fn parse(&self) -> Result<(OffsetDateTime, OffsetDateTime), AppError> {
        let start = OffsetDateTime::parse(&self.start, &Rfc3339)
            .map_err(|_| AppError::invalid_data("sleep start must be RFC3339"))?;
        let end = OffsetDateTime::parse(&self.end, &Rfc3339)
            .map_err(|_| AppError::invalid_data("sleep end must be RFC3339"))?;
        Ok((start, end))
    }
}

pub type SleepLog = BTreeMap<Weekday, SleepRecord>;
