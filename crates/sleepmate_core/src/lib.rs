pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod model;
pub mod planner;
pub mod recommend;
pub mod stats;
pub mod storage;
