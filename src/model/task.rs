use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Task lifecycle. `Done` is terminal: once a task is done it has a
/// `completed_date` and is never completed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "in_progress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            other => Err(Error::Other(format!(
                "unknown task status: {other}. Use: todo, in_progress, done"
            ))),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(Error::Other(format!(
                "unknown priority: {other}. Use: high, medium, low"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// Id of the assigned user.
    pub assigned_to: String,
    pub project_id: Option<String>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub created_date: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    /// Set exactly once, when the status first becomes `done`.
    pub completed_date: Option<NaiveDateTime>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub assigned_to: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub actual_hours: Option<f64>,
    pub due_date: Option<NaiveDateTime>,
    pub tags: Option<Vec<String>>,
}

impl Task {
    pub fn new(input: NewTask, now: NaiveDateTime) -> Self {
        Self {
            id: super::new_id(),
            title: input.title,
            description: input.description,
            status: TaskStatus::Todo,
            priority: input.priority,
            assigned_to: input.assigned_to,
            project_id: input.project_id,
            estimated_hours: input.estimated_hours,
            actual_hours: None,
            created_date: now,
            due_date: input.due_date,
            completed_date: None,
            tags: input.tags,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Apply a partial update at `now`. Returns true when this update is the
    /// one that completed the task.
    pub fn apply(&mut self, update: TaskUpdate, now: NaiveDateTime) -> bool {
        let was_done = self.is_done();
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(hours) = update.actual_hours {
            self.actual_hours = Some(hours);
        }
        if let Some(due) = update.due_date {
            self.due_date = Some(due);
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(status) = update.status {
            // done is one-way
            if !was_done {
                self.status = status;
            }
        }
        let completed_now = !was_done && self.is_done();
        if completed_now {
            self.completed_date = Some(now);
        }
        completed_now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn sample_task() -> Task {
        Task::new(
            NewTask {
                title: "Write docs".to_string(),
                description: None,
                priority: Priority::High,
                assigned_to: "u1".to_string(),
                project_id: None,
                estimated_hours: Some(3.0),
                due_date: None,
                tags: vec!["docs".to_string()],
            },
            at(1),
        )
    }

    #[test]
    fn test_status_parse_and_display() {
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("finished".parse::<TaskStatus>().is_err());
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::from_str::<Priority>("\"low\"").unwrap(),
            Priority::Low
        );
    }

    #[test]
    fn test_new_task_defaults() {
        let task = sample_task();
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.completed_date.is_none());
        assert!(task.actual_hours.is_none());
        assert_eq!(task.created_date, at(1));
    }

    #[test]
    fn test_completion_sets_date_once() {
        let mut task = sample_task();
        let completed = task.apply(
            TaskUpdate {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
            at(3),
        );
        assert!(completed);
        assert_eq!(task.completed_date, Some(at(3)));

        // Marking done again does not move the completion date.
        let completed = task.apply(
            TaskUpdate {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
            at(5),
        );
        assert!(!completed);
        assert_eq!(task.completed_date, Some(at(3)));
    }

    #[test]
    fn test_done_is_terminal() {
        let mut task = sample_task();
        task.apply(
            TaskUpdate {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
            at(3),
        );
        task.apply(
            TaskUpdate {
                status: Some(TaskStatus::InProgress),
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
            at(4),
        );
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.title, "Renamed");
    }

    #[test]
    fn test_partial_update_leaves_other_fields() {
        let mut task = sample_task();
        let completed = task.apply(
            TaskUpdate {
                status: Some(TaskStatus::InProgress),
                actual_hours: Some(2.5),
                ..Default::default()
            },
            at(2),
        );
        assert!(!completed);
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.actual_hours, Some(2.5));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.tags, vec!["docs".to_string()]);
    }
}
