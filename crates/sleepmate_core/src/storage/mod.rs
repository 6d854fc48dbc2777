use crate::error::AppError;
use crate::model::{SleepLog, Task};
use std::collections::BTreeMap;

pub mod json_store;

pub const SLEEP_DATA_KEY: &str = "@sleepData";
pub const TASKS_KEY: &str = "@tasks";

/// String key-value storage holding one JSON document per key.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError>;

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError>;

    fn remove_item(&mut self, key: &str) -> Result<(), AppError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), AppError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Unreadable documents decode to an empty list.
pub fn decode_tasks(raw: Option<&str>) -> Vec<Task> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|err| {
        log::warn!("discarding unreadable {TASKS_KEY}: {err}");
        Vec::new()
    })
}

pub fn decode_sleep_log(raw: Option<&str>) -> SleepLog {
    let Some(raw) = raw else {
        return SleepLog::new();
    };
    serde_json::from_str(raw).unwrap_or_else(|err| {
        log::warn!("discarding unreadable {SLEEP_DATA_KEY}: {err}");
        SleepLog::new()
    })
}

pub fn encode_tasks(tasks: &[Task]) -> Result<String, AppError> {
    serde_json::to_string(tasks).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn encode_sleep_log(log: &SleepLog) -> Result<String, AppError> {
    serde_json::to_string(log).map_err(|err| AppError::invalid_data(err.to_string()))
}

pub fn load_tasks(store: &dyn KeyValueStore) -> Result<Vec<Task>, AppError> {
    Ok(decode_tasks(store.get_item(TASKS_KEY)?.as_deref()))
}

pub fn save_tasks(store: &mut dyn KeyValueStore, tasks: &[Task]) -> Result<(), AppError> {
    store.set_item(TASKS_KEY, &encode_tasks(tasks)?)
}

pub fn load_sleep_log(store: &dyn KeyValueStore) -> Result<SleepLog, AppError> {
    Ok(decode_sleep_log(store.get_item(SLEEP_DATA_KEY)?.as_deref()))
}

pub fn save_sleep_log(store: &mut dyn KeyValueStore, log: &SleepLog) -> Result<(), AppError> {
    store.set_item(SLEEP_DATA_KEY, &encode_sleep_log(log)?)
}
