pub mod date_util;
pub mod error;
pub mod metrics;
pub mod model;
pub mod query;
pub mod seed;
pub mod server;
pub mod storage;

pub use error::{Error, Result};
pub use metrics::{LeaderboardEntry, MemberPerformance, ProductivityTrends, TeamOverview};
pub use model::{
    Goal, GoalType, NewGoal, NewStandup, NewTask, NewTimeEntry, NewUser, Priority, Standup, Task,
    TaskStatus, TaskUpdate, TimeEntry, User,
};
pub use query::{Collection, Field, Filter, Sort, Window};
pub use seed::SeedSummary;
pub use storage::{Database, DocumentStore};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use log::info;
use serde::Serialize;

use date_util::{now_utc, start_of_day};
use storage::repository;

/// Fixed cap on every list operation.
pub const LIST_LIMIT: u32 = 1000;

/// Record counts per collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStatus {
    pub users: u64,
    pub tasks: u64,
    pub time_entries: u64,
    pub goals: u64,
    pub standups: u64,
}

/// Main entry point for the productivity tracker.
#[derive(Clone)]
pub struct Tracker {
    db: Database,
}

impl Tracker {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Access the database (for direct queries in the CLI).
    pub fn db(&self) -> &Database {
        &self.db
    }

    // ── Users ────────────────────────────────────────────────────

    pub async fn create_user(&self, input: NewUser) -> Result<User> {
        let user = User::new(input, now_utc());
        let created = self
            .db
            .writer()
            .call({
                let user = user.clone();
                move |conn| {
                    if repository::email_registered(conn, &user.email)? {
                        return Ok(false);
                    }
                    repository::insert_user(conn, &user)?;
                    Ok::<bool, rusqlite::Error>(true)
                }
            })
            .await?;

        if !created {
            return Err(Error::Conflict("Email already registered".into()));
        }
        info!("Created user {} <{}>", user.id, user.email);
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.db.find(&Filter::new(), None, Some(LIST_LIMIT)).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        let id = id.to_string();
        self.db
            .reader()
            .call(move |conn| repository::get_user(conn, &id))
            .await?
            .ok_or_else(|| Error::NotFound("User".into()))
    }

    // ── Tasks ────────────────────────────────────────────────────

    pub async fn create_task(&self, input: NewTask) -> Result<Task> {
        let task = Task::new(input, now_utc());
        let created = self
            .db
            .writer()
            .call({
                let task = task.clone();
                move |conn| {
                    if !repository::user_exists(conn, &task.assigned_to)? {
                        return Ok(false);
                    }
                    repository::insert_task(conn, &task)?;
                    Ok::<bool, rusqlite::Error>(true)
                }
            })
            .await?;

        if !created {
            return Err(Error::NotFound("Assigned user".into()));
        }
        info!("Created task {} for {}", task.id, task.assigned_to);
        Ok(task)
    }

    /// Tasks filtered by assignee and status, in creation order.
    pub async fn list_tasks(
        &self,
        assigned_to: Option<&str>,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>> {
        let mut filter = Filter::new();
        if let Some(user_id) = assigned_to {
            filter = filter.eq(Field::AssignedTo, user_id);
        }
        if let Some(status) = status {
            filter = filter.status(status);
        }
        self.db.find(&filter, None, Some(LIST_LIMIT)).await
    }

    /// Apply a partial update. The first move to `done` stamps the completion
    /// date and credits the assignee's cached total.
    pub async fn update_task(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let id = id.to_string();
        let now = now_utc();
        let updated = self
            .db
            .writer()
            .call(move |conn| {
                let tx = conn.transaction()?;
                let Some(mut task) = repository::get_task(&tx, &id)? else {
                    return Ok(None);
                };
                let completed = task.apply(update, now);
                repository::update_task(&tx, &task)?;
                if completed {
                    repository::add_to_user_totals(&tx, &task.assigned_to, 1, 0.0)?;
                }
                tx.commit()?;
                Ok::<Option<(Task, bool)>, rusqlite::Error>(Some((task, completed)))
            })
            .await?;

        let (task, completed) = updated.ok_or_else(|| Error::NotFound("Task".into()))?;
        if completed {
            info!("Task {} completed by {}", task.id, task.assigned_to);
        }
        Ok(task)
    }

    pub async fn delete_task(&self, id: &str) -> Result<()> {
        let id = id.to_string();
        let deleted = self
            .db
            .writer()
            .call({
                let id = id.clone();
                move |conn| repository::delete_task(conn, &id)
            })
            .await?;
        if !deleted {
            return Err(Error::NotFound("Task".into()));
        }
        info!("Deleted task {id}");
        Ok(())
    }

    // ── Time entries ─────────────────────────────────────────────

    /// Record time. Credits the user's cached hours and, when linked, the
    /// task's actual hours.
    pub async fn log_time(&self, input: NewTimeEntry) -> Result<TimeEntry> {
        let entry = TimeEntry::new(input, now_utc());
        self.db
            .writer()
            .call({
                let entry = entry.clone();
                move |conn| {
                    let tx = conn.transaction()?;
                    repository::insert_time_entry(&tx, &entry)?;
                    repository::add_to_user_totals(&tx, &entry.user_id, 0, entry.hours)?;
                    if let Some(task_id) = &entry.task_id {
                        repository::add_task_hours(&tx, task_id, entry.hours)?;
                    }
                    tx.commit()?;
                    Ok::<(), rusqlite::Error>(())
                }
            })
            .await?;
        info!("Logged {}h for {}", entry.hours, entry.user_id);
        Ok(entry)
    }

    /// Time entries filtered by user and task, newest first.
    pub async fn list_time_entries(
        &self,
        user_id: Option<&str>,
        task_id: Option<&str>,
    ) -> Result<Vec<TimeEntry>> {
        let mut filter = Filter::new();
        if let Some(user_id) = user_id {
            filter = filter.eq(Field::UserId, user_id);
        }
        if let Some(task_id) = task_id {
            filter = filter.eq(Field::TaskId, task_id);
        }
        self.db
            .find(&filter, Some(Sort::desc(Field::Date)), Some(LIST_LIMIT))
            .await
    }

    // ── Goals & standups ─────────────────────────────────────────

    pub async fn create_goal(&self, input: NewGoal) -> Result<Goal> {
        let goal = Goal::new(input, now_utc());
        self.db
            .writer()
            .call({
                let goal = goal.clone();
                move |conn| repository::insert_goal(conn, &goal)
            })
            .await?;
        info!("Created goal {} for {}", goal.id, goal.user_id);
        Ok(goal)
    }

    pub async fn list_goals(&self, user_id: Option<&str>) -> Result<Vec<Goal>> {
        let mut filter = Filter::new();
        if let Some(user_id) = user_id {
            filter = filter.eq(Field::UserId, user_id);
        }
        self.db.find(&filter, None, Some(LIST_LIMIT)).await
    }

    /// Record today's standup. A user gets one per UTC day.
    pub async fn create_standup(&self, input: NewStandup) -> Result<Standup> {
        let now = now_utc();
        let standup = Standup::new(input, now);
        let today = start_of_day(now);
        let created = self
            .db
            .writer()
            .call({
                let standup = standup.clone();
                move |conn| {
                    if repository::has_standup_since(conn, &standup.user_id, today)? {
                        return Ok(false);
                    }
                    repository::insert_standup(conn, &standup)?;
                    Ok::<bool, rusqlite::Error>(true)
                }
            })
            .await?;

        if !created {
            return Err(Error::Conflict("Standup already exists for today".into()));
        }
        info!("Recorded standup for {}", standup.user_id);
        Ok(standup)
    }

    /// Standups filtered by user and by UTC day, newest first.
    pub async fn list_standups(
        &self,
        user_id: Option<&str>,
        day: Option<NaiveDate>,
    ) -> Result<Vec<Standup>> {
        let mut filter = Filter::new();
        if let Some(user_id) = user_id {
            filter = filter.eq(Field::UserId, user_id);
        }
        if let Some(day) = day {
            let start: NaiveDateTime = day.and_time(NaiveTime::MIN);
            filter = filter
                .at_or_after(Field::Date, start)
                .before(Field::Date, start + Duration::days(1));
        }
        self.db
            .find(&filter, Some(Sort::desc(Field::Date)), Some(LIST_LIMIT))
            .await
    }

    // ── Maintenance ──────────────────────────────────────────────

    /// Wipe all collections and load the demo team.
    pub async fn init_sample_data(&self) -> Result<SeedSummary> {
        seed::init_sample_data(&self.db, now_utc()).await
    }

    pub async fn status(&self) -> Result<StoreStatus> {
        let all = Filter::new();
        let (users, tasks, time_entries, goals, standups) = tokio::try_join!(
            self.db.count(Collection::Users, &all),
            self.db.count(Collection::Tasks, &all),
            self.db.count(Collection::TimeEntries, &all),
            self.db.count(Collection::Goals, &all),
            self.db.count(Collection::Standups, &all),
        )?;
        Ok(StoreStatus {
            users,
            tasks,
            time_entries,
            goals,
            standups,
        })
    }

    // ── Analytics ────────────────────────────────────────────────

    pub async fn team_overview(&self) -> Result<TeamOverview> {
        metrics::team_overview(&self.db).await
    }

    pub async fn individual_performance(&self) -> Result<Vec<MemberPerformance>> {
        metrics::individual_performance(&self.db).await
    }

    pub async fn productivity_trends(&self) -> Result<ProductivityTrends> {
        metrics::productivity_trends(&self.db).await
    }

    pub async fn team_leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        metrics::team_leaderboard(&self.db).await
    }
}
