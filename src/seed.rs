use chrono::{Duration, NaiveDateTime};
use log::info;
use serde::Serialize;

use crate::date_util::at_hour;
use crate::error::Result;
use crate::model::{NewTask, NewTimeEntry, NewUser, Priority, Task, TaskStatus, TimeEntry, User};
use crate::storage::{repository, Database};

const SAMPLE_USERS: [(&str, &str, &str); 5] = [
    (
        "Alex Johnson",
        "alex@thirdangle.com",
        "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=150",
    ),
    (
        "Sarah Chen",
        "sarah@thirdangle.com",
        "https://images.unsplash.com/photo-1494790108755-2616b612b786?w=150",
    ),
    (
        "Mike Rodriguez",
        "mike@thirdangle.com",
        "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=150",
    ),
    (
        "Emma Wilson",
        "emma@thirdangle.com",
        "https://images.unsplash.com/photo-1438761681033-6461ffad8d80?w=150",
    ),
    (
        "David Kim",
        "david@thirdangle.com",
        "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=150",
    ),
];

const TASK_TEMPLATES: [(&str, &str, Priority); 10] = [
    ("Design Landing Page", "Create wireframes and mockups", Priority::High),
    ("API Development", "Build REST endpoints", Priority::High),
    ("User Authentication", "Implement login system", Priority::Medium),
    ("Database Migration", "Update schema", Priority::Low),
    ("Testing Suite", "Write unit tests", Priority::Medium),
    ("UI Components", "Build reusable components", Priority::High),
    ("Performance Optimization", "Improve load times", Priority::Low),
    ("Documentation", "API documentation", Priority::Medium),
    ("Code Review", "Review pull requests", Priority::High),
    ("Bug Fixes", "Fix reported issues", Priority::Medium),
];

/// Days of time entries generated, counting back from today.
const HISTORY_DAYS: i64 = 30;

/// Number of records written by a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeedSummary {
    pub users: usize,
    pub tasks: usize,
    pub time_entries: usize,
}

fn sample_users(now: NaiveDateTime) -> Vec<User> {
    SAMPLE_USERS
        .iter()
        .map(|(name, email, avatar)| {
            User::new(
                NewUser {
                    name: name.to_string(),
                    email: email.to_string(),
                    avatar_url: Some(avatar.to_string()),
                },
                now,
            )
        })
        .collect()
}

fn sample_tasks(users: &[User], now: NaiveDateTime) -> Vec<Task> {
    let mut tasks = Vec::new();
    for (i, (title, description, priority)) in TASK_TEMPLATES.iter().enumerate() {
        for (j, user) in users.iter().enumerate() {
            if (i + j) % 3 != 0 {
                continue;
            }
            let i = i as i64;
            let created = now - Duration::days(30 - i * 2);
            let estimated = 4.0 + (i % 5) as f64;

            let mut task = Task::new(
                NewTask {
                    title: title.to_string(),
                    description: Some(description.to_string()),
                    priority: *priority,
                    assigned_to: user.id.clone(),
                    project_id: None,
                    estimated_hours: Some(estimated),
                    due_date: None,
                    tags: Vec::new(),
                },
                created,
            );
            match i % 3 {
                0 => {
                    task.status = TaskStatus::Done;
                    task.completed_date = Some(created + Duration::days(1 + i % 5));
                    task.actual_hours = Some(estimated - 1.0);
                }
                1 => {
                    task.status = TaskStatus::InProgress;
                    task.actual_hours = Some(estimated / 2.0);
                }
                _ => {}
            }
            tasks.push(task);
        }
    }
    tasks
}

fn sample_time_entries(users: &[User], now: NaiveDateTime) -> Vec<TimeEntry> {
    let mut entries = Vec::new();
    for user in users {
        for day in 0..HISTORY_DAYS {
            // two days off in every seven
            if matches!(day % 7, 5 | 6) {
                continue;
            }
            let date = now - Duration::days(day);
            let morning = NewTimeEntry {
                user_id: user.id.clone(),
                task_id: None,
                description: "Morning work session".to_string(),
                hours: 3.5 + (day % 3) as f64 * 0.5,
                is_pomodoro: true,
            };
            let afternoon = NewTimeEntry {
                user_id: user.id.clone(),
                task_id: None,
                description: "Afternoon work session".to_string(),
                hours: 4.0 + (day % 2) as f64 * 0.5,
                is_pomodoro: false,
            };
            entries.push(TimeEntry::new(morning, at_hour(date, 9)));
            entries.push(TimeEntry::new(afternoon, at_hour(date, 14)));
        }
    }
    entries
}

/// Replace every collection with a fixed demo team, its tasks, and a month
/// of time entries, all dated relative to `now`.
pub async fn init_sample_data(db: &Database, now: NaiveDateTime) -> Result<SeedSummary> {
    let users = sample_users(now);
    let tasks = sample_tasks(&users, now);
    let entries = sample_time_entries(&users, now);
    let summary = SeedSummary {
        users: users.len(),
        tasks: tasks.len(),
        time_entries: entries.len(),
    };

    db.writer()
        .call(move |conn| {
            let tx = conn.transaction()?;
            repository::clear_all(&tx)?;
            for user in &users {
                repository::insert_user(&tx, user)?;
            }
            for task in &tasks {
                repository::insert_task(&tx, task)?;
            }
            for entry in &entries {
                repository::insert_time_entry(&tx, entry)?;
            }
            repository::recompute_user_totals(&tx)?;
            tx.commit()?;
            Ok::<(), rusqlite::Error>(())
        })
        .await?;

    info!(
        "Seeded {} users, {} tasks, {} time entries",
        summary.users, summary.tasks, summary.time_entries
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics;
    use crate::query::{Collection, Field, Filter};
    use crate::storage::DocumentStore;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 20)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_seed_counts() {
        let db = Database::open_memory().await.unwrap();
        let summary = init_sample_data(&db, now()).await.unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                users: 5,
                tasks: 17,
                time_entries: 220,
            }
        );
        assert_eq!(db.count(Collection::Users, &Filter::new()).await.unwrap(), 5);
        assert_eq!(db.count(Collection::Tasks, &Filter::new()).await.unwrap(), 17);
        assert_eq!(
            db.count(Collection::TimeEntries, &Filter::new()).await.unwrap(),
            220
        );
    }

    #[tokio::test]
    async fn test_seed_replaces_existing_data() {
        let db = Database::open_memory().await.unwrap();
        init_sample_data(&db, now()).await.unwrap();
        init_sample_data(&db, now()).await.unwrap();

        assert_eq!(db.count(Collection::Users, &Filter::new()).await.unwrap(), 5);
        assert_eq!(db.count(Collection::Tasks, &Filter::new()).await.unwrap(), 17);
    }

    #[tokio::test]
    async fn test_seed_task_lifecycle() {
        let db = Database::open_memory().await.unwrap();
        init_sample_data(&db, now()).await.unwrap();

        let tasks: Vec<Task> = db.find(&Filter::new(), None, None).await.unwrap();
        for task in &tasks {
            match task.status {
                TaskStatus::Done => {
                    let completed = task.completed_date.unwrap();
                    assert!(completed > task.created_date);
                    assert_eq!(task.actual_hours, Some(task.estimated_hours.unwrap() - 1.0));
                }
                TaskStatus::InProgress => {
                    assert!(task.completed_date.is_none());
                    assert_eq!(task.actual_hours, Some(task.estimated_hours.unwrap() / 2.0));
                }
                TaskStatus::Todo => {
                    assert!(task.completed_date.is_none());
                    assert!(task.actual_hours.is_none());
                }
            }
        }
        assert_eq!(tasks.iter().filter(|t| t.is_done()).count(), 8);
    }

    #[tokio::test]
    async fn test_seed_cached_totals() {
        let db = Database::open_memory().await.unwrap();
        init_sample_data(&db, now()).await.unwrap();

        let alex: Vec<User> = db
            .find(&Filter::new().eq(Field::Email, "alex@thirdangle.com"), None, None)
            .await
            .unwrap();
        assert_eq!(alex[0].total_tasks_completed, 4);
        assert_eq!(alex[0].total_hours_logged, 181.5);
        assert_eq!(alex[0].productivity_score, 130.75);

        let sarah: Vec<User> = db
            .find(&Filter::new().eq(Field::Email, "sarah@thirdangle.com"), None, None)
            .await
            .unwrap();
        assert_eq!(sarah[0].total_tasks_completed, 0);
        assert_eq!(sarah[0].productivity_score, 90.75);
    }

    #[tokio::test]
    async fn test_seeded_overview_is_stable() {
        let db = Database::open_memory().await.unwrap();
        init_sample_data(&db, now()).await.unwrap();

        let first = metrics::team_overview_at(&db, now()).await.unwrap();
        let second = metrics::team_overview_at(&db, now()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.team_size, 5);
        assert_eq!(first.total_tasks, 17);
        assert_eq!(first.completed_tasks, 8);
        assert_eq!(first.in_progress_tasks, 3);
        assert_eq!(first.tasks_completed_today, 0);
        assert_eq!(first.team_productivity_score, 47.1);
    }

    #[tokio::test]
    async fn test_seeded_analytics() {
        let db = Database::open_memory().await.unwrap();
        init_sample_data(&db, now()).await.unwrap();

        let performance = metrics::individual_performance_at(&db, now()).await.unwrap();
        assert_eq!(performance.len(), 5);
        assert_eq!(performance[0].completion_rate, 100.0);
        assert_eq!(performance[0].hours_this_week, 40.5);
        assert_eq!(performance[0].productivity_score, 90.5);
        assert_eq!(performance[4].productivity_score, 40.5);

        let trends = metrics::productivity_trends_at(&db, now()).await.unwrap();
        assert_eq!(trends.task_completion_trends.len(), 4);
        assert_eq!(trends.time_logging_trends.len(), 22);

        let leaderboard = metrics::team_leaderboard_at(&db, now()).await.unwrap();
        let ranks: Vec<u32> = leaderboard.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
        assert!(leaderboard.windows(2).all(|w| w[0].points >= w[1].points));
    }
}
