mod sleep;
mod task;

pub use sleep::{SleepLog, SleepRecord, Weekday};
pub use task::{Task, TaskColor};
