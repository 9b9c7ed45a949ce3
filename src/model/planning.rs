use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    TaskBased,
    TimeBased,
    Okr,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::TaskBased => "task_based",
            GoalType::TimeBased => "time_based",
            GoalType::Okr => "okr",
        }
    }
}

impl FromStr for GoalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_based" => Ok(GoalType::TaskBased),
            "time_based" => Ok(GoalType::TimeBased),
            "okr" => Ok(GoalType::Okr),
            other => Err(Error::Other(format!("unknown goal type: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_value: f64,
    pub current_value: f64,
    pub deadline: Option<NaiveDateTime>,
    pub created_date: NaiveDateTime,
    pub completed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGoal {
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_value: f64,
    #[serde(default)]
    pub deadline: Option<NaiveDateTime>,
}

impl Goal {
    pub fn new(input: NewGoal, now: NaiveDateTime) -> Self {
        Self {
            id: super::new_id(),
            user_id: input.user_id,
            title: input.title,
            description: input.description,
            goal_type: input.goal_type,
            target_value: input.target_value,
            current_value: 0.0,
            deadline: input.deadline,
            created_date: now,
            completed: false,
        }
    }
}

/// Daily standup note. At most one per user per UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standup {
    pub id: String,
    pub user_id: String,
    pub date: NaiveDateTime,
    pub what_i_did: String,
    pub what_ill_do: String,
    pub blockers: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewStandup {
    pub user_id: String,
    pub what_i_did: String,
    pub what_ill_do: String,
    #[serde(default)]
    pub blockers: Option<String>,
}

impl Standup {
    pub fn new(input: NewStandup, now: NaiveDateTime) -> Self {
        Self {
            id: super::new_id(),
            user_id: input.user_id,
            date: now,
            what_i_did: input.what_i_did,
            what_ill_do: input.what_ill_do,
            blockers: input.blockers,
        }
    }
}
