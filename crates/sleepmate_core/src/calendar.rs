use crate::model::Task;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MAX_DOTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dot {
    pub color: String,
    pub selected_dot_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkedDate {
    pub dots: Vec<Dot>,
}

pub type MarkedDates = BTreeMap<String, MarkedDate>;

/// Stable sort by start time; tasks without a start sit at midnight.
pub fn sort_by_start(tasks: &mut [Task]) {
    tasks.sort_by_key(Task::start_minutes);
}

/// Tasks on `date`, earliest start first.
pub fn tasks_on(tasks: &[Task], date: &str) -> Vec<Task> {
    let mut day: Vec<Task> = tasks
        .iter()
        .filter(|task| task.date == date)
        .cloned()
        .collect();
    sort_by_start(&mut day);
    day
}

pub fn build_markers(tasks: &[Task]) -> MarkedDates {
    let mut grouped: BTreeMap<&str, Vec<&Task>> = BTreeMap::new();
    for task in tasks {
        grouped.entry(task.date.as_str()).or_default().push(task);
    }

    grouped
        .into_iter()
        .map(|(date, mut day)| {
            day.sort_by_key(|task| task.start_minutes());
            let dots = day
                .into_iter()
                .take(MAX_DOTS)
                .map(|task| Dot {
                    color: task.color.clone(),
                    selected_dot_color: task.color.clone(),
                })
                .collect();
            (date.to_string(), MarkedDate { dots })
        })
        .collect()
}
