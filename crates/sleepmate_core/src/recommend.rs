//! Night sleep (and, when it falls short, a nap) planned from the gap
//! between the last task of one day and the first task of the next.
//!
//! Today's times are minutes since today's midnight; tomorrow's first start
//! is shifted by a full day so both ends of the night live on one axis.
//! Nap times stay on tomorrow's own clock and are capped at its midnight.

use crate::calendar;
use crate::clock::{self, DAY_MINUTES};
use crate::error::AppError;
use crate::model::Task;
use serde::Serialize;

pub const REQUIRED_SLEEP_MINUTES: i32 = 7 * 60 + 30;
pub const MIN_NIGHT_SLEEP_MINUTES: i32 = 7 * 60;
pub const PREPARE_BUFFER_MINUTES: i32 = 60;
pub const NAP_BUFFER_MINUTES: i32 = 30;
pub const MAX_NAP_MINUTES: i32 = 120;
pub const MIN_NAP_MINUTES: i32 = 60;

pub const UNCONSTRAINED_MESSAGE: &str = "No schedule for tomorrow. Your sleep time is free.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SleepWindow {
    pub start: i32,
    pub end: i32,
}

impl SleepWindow {
    pub fn minutes(&self) -> i32 {
        self.end - self.start
    }

    fn render(&self) -> String {
        format!(
            "{} ~ {} ({} min)",
            clock::format_minutes(self.start),
            clock::format_minutes(self.end),
            self.minutes()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Rested,
    NearlyRested,
    SleepEarlier,
    NapCompensated,
}

impl Verdict {
    pub fn message(self) -> &'static str {
        match self {
            Verdict::Rested => {
                "Did you sleep well last night? Have a great day and a sweet sleep tonight~"
            }
            Verdict::NearlyRested => {
                "Did you sleep well last night? Have a great day and a sweet sleep tonight~ :)"
            }
            Verdict::SleepEarlier => {
                "You should rest a little more today. Going to bed early is recommended."
            }
            Verdict::NapCompensated => "Night sleep was short, but the nap made up for it!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SleepPlan {
    pub night: SleepWindow,
    pub nap: Option<SleepWindow>,
    pub total_sleep: i32,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    Unconstrained,
    Planned(SleepPlan),
}

impl Recommendation {
    pub fn lines(&self) -> Vec<String> {
        match self {
            Recommendation::Unconstrained => vec![UNCONSTRAINED_MESSAGE.to_string()],
            Recommendation::Planned(plan) => {
                let mut lines = vec![format!("Night sleep: {}", plan.night.render())];
                if let Some(nap) = plan.nap.as_ref() {
                    lines.push(format!("Nap: {}", nap.render()));
                }
                lines.push(plan.verdict.message().to_string());
                lines
            }
        }
    }

    pub fn message(&self) -> String {
        self.lines().join("\n")
    }
}

/// Both lists must already be ordered by start time.
pub fn recommend(today_tasks: &[Task], tomorrow_tasks: &[Task]) -> Recommendation {
    let (Some(last_today), Some(first_tomorrow)) = (today_tasks.last(), tomorrow_tasks.first())
    else {
        return Recommendation::Unconstrained;
    };

    let night_start = last_today.end_minutes() as i32;
    let night_end = first_tomorrow.start_minutes() as i32 + DAY_MINUTES - PREPARE_BUFFER_MINUTES;
    let night = SleepWindow {
        start: night_start,
        end: night_end,
    };
    let night_sleep = night.minutes();
    let mut total_sleep = night_sleep;

    let mut nap = None;
    if night_sleep < MIN_NIGHT_SLEEP_MINUTES {
        let nap_start = first_tomorrow.end_minutes() as i32 + NAP_BUFFER_MINUTES;
        let nap_end = (nap_start + MAX_NAP_MINUTES).min(DAY_MINUTES);
        let candidate = SleepWindow {
            start: nap_start,
            end: nap_end,
        };
        if candidate.minutes() >= MIN_NAP_MINUTES {
            total_sleep += candidate.minutes();
            nap = Some(candidate);
        }
    }

    let verdict = if night_sleep >= REQUIRED_SLEEP_MINUTES {
        Verdict::Rested
    } else if night_sleep >= MIN_NIGHT_SLEEP_MINUTES {
        Verdict::NearlyRested
    } else if total_sleep < REQUIRED_SLEEP_MINUTES {
        Verdict::SleepEarlier
    } else {
        Verdict::NapCompensated
    };

    Recommendation::Planned(SleepPlan {
        night,
        nap,
        total_sleep,
        verdict,
    })
}

/// What a caller hands over to ask for a recommendation: a base date and
/// the tasks of that day and the next, each ordered by start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecommendationRequest {
    pub base_date: String,
    pub today_tasks: Vec<Task>,
    pub tomorrow_tasks: Vec<Task>,
}

impl RecommendationRequest {
    pub fn from_tasks(tasks: &[Task], base_date: &str) -> Result<Self, AppError> {
        let date = clock::parse_date(base_date)?;
        let tomorrow = clock::format_date(clock::shift_date(date, 1)?)?;
        let base_date = clock::format_date(date)?;
        Ok(Self {
            today_tasks: calendar::tasks_on(tasks, &base_date),
            tomorrow_tasks: calendar::tasks_on(tasks, &tomorrow),
            base_date,
        })
    }

    pub fn recommend(&self) -> Recommendation {
        recommend(&self.today_tasks, &self.tomorrow_tasks)
    }
}

/// Keeps the lines of the last shown recommendation so an identical
/// recalculation does not count as a change.
#[derive(Debug, Default)]
pub struct Recommender {
    last_lines: Vec<String>,
    message: String,
}

impl Recommender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the shown message changed.
    pub fn update(&mut self, today_tasks: &[Task], tomorrow_tasks: &[Task]) -> bool {
        let recommendation = recommend(today_tasks, tomorrow_tasks);
        if recommendation == Recommendation::Unconstrained {
            self.last_lines.clear();
            let changed = self.message != UNCONSTRAINED_MESSAGE;
            self.message = UNCONSTRAINED_MESSAGE.to_string();
            return changed;
        }

        let lines = recommendation.lines();
        if lines == self.last_lines {
            return false;
        }
        self.message = lines.join("\n");
        self.last_lines = lines;
        true
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::{
        Recommendation, RecommendationRequest, Recommender, SleepWindow, UNCONSTRAINED_MESSAGE,
        Verdict, recommend,
    };
    use crate::model::Task;

    fn task(id: &str, date: &str, start: Option<&str>, end: Option<&str>) -> Task {
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            date: date.to_string(),
            color: "#000000".to_string(),
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    fn plan(recommendation: &Recommendation) -> &super::SleepPlan {
        match recommendation {
            Recommendation::Planned(plan) => plan,
            other => panic!("expected a plan, got {other:?}"),
        }
    }

    #[test]
    fn long_gap_is_fully_rested_without_nap() {
        let today = vec![task("t1", "2025-03-01", Some("18:00"), Some("22:00"))];
        let tomorrow = vec![task("m1", "2025-03-02", Some("07:00"), Some("09:00"))];

        let result = recommend(&today, &tomorrow);
        let plan = plan(&result);

        assert_eq!(plan.night, SleepWindow { start: 1320, end: 1800 });
        assert_eq!(plan.night.minutes(), 480);
        assert_eq!(plan.nap, None);
        assert_eq!(plan.verdict, Verdict::Rested);
        assert_eq!(
            result.message(),
            format!(
                "Night sleep: 22:00 ~ 06:00 (480 min)\n{}",
                Verdict::Rested.message()
            )
        );
    }

    #[test]
    fn seven_hours_is_nearly_rested() {
        let today = vec![task("t1", "2025-03-01", Some("20:00"), Some("23:00"))];
        let tomorrow = vec![task("m1", "2025-03-02", Some("07:00"), Some("08:00"))];

        let result = recommend(&today, &tomorrow);
        let plan = plan(&result);
        assert_eq!(plan.night.minutes(), 420);
        assert_eq!(plan.nap, None);
        assert_eq!(plan.verdict, Verdict::NearlyRested);
    }

    #[test]
    fn nap_that_covers_the_shortfall() {
        let today = vec![task("t1", "2025-03-01", Some("20:00"), Some("23:00"))];
        let tomorrow = vec![task("m1", "2025-03-02", Some("06:30"), Some("08:00"))];

        let result = recommend(&today, &tomorrow);
        let plan = plan(&result);
        assert_eq!(plan.night.minutes(), 390);
        assert_eq!(plan.nap, Some(SleepWindow { start: 510, end: 630 }));
        assert_eq!(plan.total_sleep, 510);
        assert_eq!(plan.verdict, Verdict::NapCompensated);
        assert_eq!(
            result.lines(),
            vec![
                "Night sleep: 23:00 ~ 05:30 (390 min)".to_string(),
                "Nap: 08:30 ~ 10:30 (120 min)".to_string(),
                Verdict::NapCompensated.message().to_string(),
            ]
        );
    }

    #[test]
    fn short_night_even_with_nap_recommends_sleeping_earlier() {
        let today = vec![task("t1", "2025-03-01", Some("20:00"), Some("23:00"))];
        let tomorrow = vec![task("m1", "2025-03-02", Some("05:00"), Some("06:00"))];

        let result = recommend(&today, &tomorrow);
        let plan = plan(&result);
        assert_eq!(plan.night.minutes(), 300);
        assert_eq!(plan.nap, Some(SleepWindow { start: 390, end: 510 }));
        assert_eq!(plan.total_sleep, 420);
        assert_eq!(plan.verdict, Verdict::SleepEarlier);
    }

    #[test]
    fn nap_under_an_hour_is_dropped() {
        let today = vec![task("t1", "2025-03-01", Some("20:00"), Some("23:00"))];
        let tomorrow = vec![task("m1", "2025-03-02", Some("05:00"), Some("23:00"))];

        let result = recommend(&today, &tomorrow);
        let plan = plan(&result);
        assert_eq!(plan.nap, None);
        assert_eq!(plan.total_sleep, 300);
        assert_eq!(result.lines().len(), 2);
    }

    #[test]
    fn nap_is_capped_at_midnight() {
        let today = vec![task("t1", "2025-03-01", Some("20:00"), Some("23:00"))];
        let tomorrow = vec![task("m1", "2025-03-02", Some("05:00"), Some("22:00"))];

        let result = recommend(&today, &tomorrow);
        let plan = plan(&result);
        assert_eq!(plan.nap, Some(SleepWindow { start: 1350, end: 1440 }));
        assert_eq!(result.lines()[1], "Nap: 22:30 ~ 24:00 (90 min)");
    }

    #[test]
    fn uses_last_task_of_today_and_first_of_tomorrow() {
        let today = vec![
            task("t1", "2025-03-01", Some("09:00"), Some("12:00")),
            task("t2", "2025-03-01", Some("19:00"), Some("21:30")),
        ];
        let tomorrow = vec![
            task("m1", "2025-03-02", Some("08:00"), Some("09:00")),
            task("m2", "2025-03-02", Some("13:00"), Some("14:00")),
        ];

        let result = recommend(&today, &tomorrow);
        assert_eq!(plan(&result).night, SleepWindow { start: 1290, end: 1860 });
    }

    #[test]
    fn missing_times_count_as_midnight() {
        let today = vec![task("t1", "2025-03-01", None, Some(""))];
        let tomorrow = vec![task("m1", "2025-03-02", None, None)];

        let result = recommend(&today, &tomorrow);
        let plan = plan(&result);
        assert_eq!(plan.night, SleepWindow { start: 0, end: 1380 });
        assert_eq!(plan.verdict, Verdict::Rested);
    }

    #[test]
    fn empty_list_is_unconstrained() {
        let today = vec![task("t1", "2025-03-01", Some("18:00"), Some("22:00"))];

        assert_eq!(recommend(&today, &[]), Recommendation::Unconstrained);
        assert_eq!(recommend(&[], &today), Recommendation::Unconstrained);
        assert_eq!(recommend(&today, &[]).message(), UNCONSTRAINED_MESSAGE);
    }

    #[test]
    fn identical_inputs_give_identical_text() {
        let today = vec![task("t1", "2025-03-01", Some("20:00"), Some("23:00"))];
        let tomorrow = vec![task("m1", "2025-03-02", Some("05:00"), Some("06:00"))];

        assert_eq!(
            recommend(&today, &tomorrow).message(),
            recommend(&today, &tomorrow).message()
        );
    }

    #[test]
    fn recommender_skips_unchanged_results() {
        let today = vec![task("t1", "2025-03-01", Some("18:00"), Some("22:00"))];
        let tomorrow = vec![task("m1", "2025-03-02", Some("07:00"), Some("09:00"))];
        let mut recommender = Recommender::new();

        assert!(recommender.update(&today, &tomorrow));
        let first = recommender.message().to_string();
        assert!(!recommender.update(&today, &tomorrow));
        assert_eq!(recommender.message(), first);

        assert!(recommender.update(&today, &[]));
        assert_eq!(recommender.message(), UNCONSTRAINED_MESSAGE);
        assert!(!recommender.update(&[], &tomorrow));

        assert!(recommender.update(&today, &tomorrow));
        assert_eq!(recommender.message(), first);
    }

    #[test]
    fn request_collects_and_orders_both_days() {
        let tasks = vec![
            task("m2", "2025-03-02", Some("13:00"), Some("14:00")),
            task("t1", "2025-03-01", Some("19:00"), Some("22:00")),
            task("m1", "2025-03-02", Some("07:00"), Some("09:00")),
            task("x", "2025-03-05", Some("07:00"), Some("09:00")),
        ];

        let request = RecommendationRequest::from_tasks(&tasks, "2025-03-01").unwrap();
        assert_eq!(request.base_date, "2025-03-01");
        assert_eq!(request.today_tasks.len(), 1);
        let tomorrow: Vec<&str> = request
            .tomorrow_tasks
            .iter()
            .map(|task| task.id.as_str())
            .collect();
        assert_eq!(tomorrow, vec!["m1", "m2"]);
        assert_eq!(plan(&request.recommend()).night.minutes(), 480);
    }

    #[test]
    fn request_crosses_month_boundary() {
        let tasks = vec![task("m1", "2025-04-01", Some("07:00"), None)];
        let request = RecommendationRequest::from_tasks(&tasks, "2025-03-31").unwrap();
        assert_eq!(request.tomorrow_tasks.len(), 1);
        assert_eq!(request.recommend(), Recommendation::Unconstrained);
    }
}
