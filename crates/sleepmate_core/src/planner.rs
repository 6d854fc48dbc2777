use crate::calendar::{self, MarkedDates};
use crate::clock;
use crate::config::Config;
use crate::error::AppError;
use crate::model::{SleepLog, SleepRecord, Task, TaskColor, Weekday};
use crate::recommend::RecommendationRequest;
use crate::stats::{self, SleepStats, SleepStatus};
use crate::storage::json_store::{self, JsonFileStore};
use crate::storage::{self, KeyValueStore, SLEEP_DATA_KEY};
use time::{OffsetDateTime, UtcOffset};

/// In-memory snapshot of everything the store holds. Each mutation writes
/// the whole updated collection back and only then replaces the snapshot.
pub struct Planner<S: KeyValueStore> {
    store: S,
    offset: UtcOffset,
    tasks: Vec<Task>,
    sleep: SleepLog,
}

impl Planner<JsonFileStore> {
    pub fn open(config: &Config) -> Result<Self, AppError> {
        let path = json_store::store_path(config.store_path.as_deref())?;
        Planner::load(JsonFileStore::new(path), config.utc_offset()?)
    }
}

enum TaskTime {
    Start,
    End,
}

impl<S: KeyValueStore> Planner<S> {
    pub fn load(store: S, offset: UtcOffset) -> Result<Self, AppError> {
        let tasks = storage::load_tasks(&store)?;
        let sleep = storage::load_sleep_log(&store)?;
        Ok(Self {
            store,
            offset,
            tasks,
            sleep,
        })
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn sleep_log(&self) -> &SleepLog {
        &self.sleep
    }

    pub fn today(&self) -> Result<String, AppError> {
        clock::format_date(clock::today_in(self.offset))
    }

    pub fn tasks_on(&self, date: &str) -> Result<Vec<Task>, AppError> {
        let date = clock::format_date(clock::parse_date(date)?)?;
        Ok(calendar::tasks_on(&self.tasks, &date))
    }

    pub fn markers(&self) -> MarkedDates {
        calendar::build_markers(&self.tasks)
    }

    pub fn recommendation_request(
        &self,
        base_date: &str,
    ) -> Result<RecommendationRequest, AppError> {
        RecommendationRequest::from_tasks(&self.tasks, base_date)
    }

    pub fn add_task(
        &mut self,
        title: &str,
        date: &str,
        color: TaskColor,
    ) -> Result<Task, AppError> {
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("title is required"));
        }
        let date = clock::format_date(clock::parse_date(date)?)?;

        let task = Task {
            id: self.next_task_id(),
            title: trimmed.to_string(),
            date,
            color: color.hex().to_string(),
            start: Some(String::new()),
            end: Some(String::new()),
        };

        let mut tasks = self.tasks.clone();
        tasks.push(task.clone());
        self.commit_tasks(tasks)?;
        Ok(task)
    }

    /// Stamps the current clock time as the task's start.
    pub fn mark_started(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let now = clock::clock_time(clock::now_in(self.offset));
        self.stamp(id, TaskTime::Start, &now)
    }

    pub fn mark_ended(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let now = clock::clock_time(clock::now_in(self.offset));
        self.stamp(id, TaskTime::End, &now)
    }

    /// Writes both times or neither.
    pub fn set_times(
        &mut self,
        id: &str,
        start: &str,
        end: &str,
    ) -> Result<Option<Task>, AppError> {
        let trimmed_id = required_id(id)?;
        let (start, end) = (start.trim(), end.trim());
        if !clock::is_valid_time(start) || !clock::is_valid_time(end) {
            return Err(AppError::invalid_input("start and end must be HH:MM"));
        }

        let Some(index) = self.position(trimmed_id) else {
            log::debug!("set_times: no task {trimmed_id}");
            return Ok(None);
        };
        let mut tasks = self.tasks.clone();
        tasks[index].start = Some(start.to_string());
        tasks[index].end = Some(end.to_string());
        let updated = tasks[index].clone();

        self.commit_tasks(tasks)?;
        Ok(Some(updated))
    }

    pub fn delete_task(&mut self, id: &str) -> Result<Option<Task>, AppError> {
        let trimmed_id = required_id(id)?;
        let Some(index) = self.position(trimmed_id) else {
            log::debug!("delete_task: no task {trimmed_id}");
            return Ok(None);
        };

        let mut tasks = self.tasks.clone();
        let removed = tasks.remove(index);
        self.commit_tasks(tasks)?;
        Ok(Some(removed))
    }

    /// Records a sleep window given as `HH:MM` clock times, stored as
    /// timestamps on today's date.
    pub fn record_sleep(
        &mut self,
        day: Weekday,
        start: &str,
        end: &str,
    ) -> Result<SleepRecord, AppError> {
        let (start, end) = (start.trim(), end.trim());
        if !clock::is_valid_time(start) || !clock::is_valid_time(end) {
            return Err(AppError::invalid_input("start and end must be HH:MM"));
        }

        let today = clock::today_in(self.offset);
        let record = SleepRecord {
            start: clock::sleep_timestamp(today, start, self.offset)?,
            end: clock::sleep_timestamp(today, end, self.offset)?,
        };

        let mut sleep = self.sleep.clone();
        sleep.insert(day, record.clone());
        storage::save_sleep_log(&mut self.store, &sleep)?;
        self.sleep = sleep;
        Ok(record)
    }

    pub fn reset_sleep(&mut self) -> Result<(), AppError> {
        self.store.remove_item(SLEEP_DATA_KEY)?;
        log::info!("cleared {} sleep records", self.sleep.len());
        self.sleep.clear();
        Ok(())
    }

    pub fn weekly_durations(&self) -> [f64; 7] {
        stats::weekly_durations(&self.sleep, self.offset)
    }

    pub fn weekly_stats(&self) -> SleepStats {
        stats::weekly_stats(&self.sleep, self.offset)
    }

    pub fn status_for(&self, day: Weekday) -> SleepStatus {
        stats::sleep_status(self.sleep.get(&day))
    }

    pub fn today_status(&self) -> SleepStatus {
        let day = Weekday::from(clock::now_in(self.offset).weekday());
        self.status_for(day)
    }

    fn stamp(&mut self, id: &str, which: TaskTime, value: &str) -> Result<Option<Task>, AppError> {
        let trimmed_id = required_id(id)?;
        let Some(index) = self.position(trimmed_id) else {
            log::debug!("stamp: no task {trimmed_id}");
            return Ok(None);
        };
        let mut tasks = self.tasks.clone();
        match which {
            TaskTime::Start => tasks[index].start = Some(value.to_string()),
            TaskTime::End => tasks[index].end = Some(value.to_string()),
        }
        let updated = tasks[index].clone();

        self.commit_tasks(tasks)?;
        Ok(Some(updated))
    }

    fn next_task_id(&self) -> String {
        let mut nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        loop {
            let id = format!("task-{nanos}");
            if !self.tasks.iter().any(|task| task.id == id) {
                return id;
            }
            nanos += 1;
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn commit_tasks(&mut self, tasks: Vec<Task>) -> Result<(), AppError> {
        storage::save_tasks(&mut self.store, &tasks)?;
        self.tasks = tasks;
        Ok(())
    }
}

fn required_id(id: &str) -> Result<&str, AppError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(trimmed)
}
