use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "team_member";

/// A team member.
///
/// `total_tasks_completed`, `total_hours_logged` and `productivity_score` are
/// running totals maintained by the write paths. Analytics recomputes its own
/// figures from tasks and time entries and never reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub joined_date: NaiveDateTime,
    pub productivity_score: f64,
    pub total_tasks_completed: u64,
    pub total_hours_logged: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl User {
    pub fn new(input: NewUser, now: NaiveDateTime) -> Self {
        Self {
            id: super::new_id(),
            name: input.name,
            email: input.email,
            avatar_url: input.avatar_url,
            role: DEFAULT_ROLE.to_string(),
            joined_date: now,
            productivity_score: 0.0,
            total_tasks_completed: 0,
            total_hours_logged: 0.0,
        }
    }
}
