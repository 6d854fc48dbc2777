use crate::clock;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A dated calendar entry. `start`/`end` hold `HH:MM` strings; an empty
/// string is kept verbatim on disk but means "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub date: String,
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

impl Task {
    pub fn start_time(&self) -> Option<&str> {
        non_empty(self.start.as_deref())
    }

    pub fn end_time(&self) -> Option<&str> {
        non_empty(self.end.as_deref())
    }

    /// Minutes since midnight of the start time; unset or unreadable starts
    /// count as midnight.
    pub fn start_minutes(&self) -> u32 {
        minutes_or_midnight(self.start_time())
    }

    pub fn end_minutes(&self) -> u32 {
        minutes_or_midnight(self.end_time())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}

fn minutes_or_midnight(value: Option<&str>) -> u32 {
    value
        .and_then(|time| clock::minutes_of_day(time).ok())
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskColor {
    Red,
    Orange,
    Yellow,
    Green,
    Sky,
    Blue,
    Purple,
    #[default]
    Black,
}

impl TaskColor {
    pub const ALL: [TaskColor; 8] = [
        TaskColor::Red,
        TaskColor::Orange,
        TaskColor::Yellow,
        TaskColor::Green,
        TaskColor::Sky,
        TaskColor::Blue,
        TaskColor::Purple,
        TaskColor::Black,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            TaskColor::Red => "#FF4D4D",
            TaskColor::Orange => "#FF914D",
            TaskColor::Yellow => "#FFCD4D",
            TaskColor::Green => "#33CC33",
            TaskColor::Sky => "#4DA6FF",
            TaskColor::Blue => "#3366FF",
            TaskColor::Purple => "#9933FF",
            TaskColor::Black => "#000000",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TaskColor::Red => "red",
            TaskColor::Orange => "orange",
            TaskColor::Yellow => "yellow",
            TaskColor::Green => "green",
            TaskColor::Sky => "sky",
            TaskColor::Blue => "blue",
            TaskColor::Purple => "purple",
            TaskColor::Black => "black",
        }
    }
}

impl FromStr for TaskColor {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        TaskColor::ALL
            .into_iter()
            .find(|color| {
                color.name().eq_ignore_ascii_case(trimmed)
                    || color.hex().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| AppError::invalid_input(format!("unknown color '{trimmed}'")))
    }
}
