use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: String,
    pub user_id: String,
    pub task_id: Option<String>,
    pub description: String,
    /// Non-negative. A stored entry without hours reads back as zero.
    pub hours: f64,
    pub date: NaiveDateTime,
    /// Logged as a focused-work (pomodoro) session.
    pub is_pomodoro: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTimeEntry {
    pub user_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub description: String,
    pub hours: f64,
    #[serde(default)]
    pub is_pomodoro: bool,
}

impl TimeEntry {
    pub fn new(input: NewTimeEntry, now: NaiveDateTime) -> Self {
        Self {
            id: super::new_id(),
            user_id: input.user_id,
            task_id: input.task_id,
            description: input.description,
            hours: input.hours,
            date: now,
            is_pomodoro: input.is_pomodoro,
        }
    }
}
