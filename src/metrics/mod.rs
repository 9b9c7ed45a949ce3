pub mod scoring;
pub mod types;

pub use scoring::{
    completion_rate, individual_productivity_score, leaderboard_points, round1,
    team_productivity_score,
};
pub use types::*;

use std::collections::HashMap;

use chrono::NaiveDateTime;
use log::debug;

use crate::date_util::now_utc;
use crate::error::Result;
use crate::model::{TaskStatus, User};
use crate::query::{Collection, Field, Filter, Window};
use crate::storage::{Bucket, DocumentStore, GroupKey, Reduction};

/// Cap on the number of users any analytics call reads.
pub const USER_LIMIT: u32 = 1000;

const PERFORMANCE_WINDOW: Window = Window::TrailingDays(7);
const TRENDS_WINDOW: Window = Window::TrailingDays(30);
const LEADERBOARD_WINDOW: Window = Window::MonthToDate;

/// Team-wide task counts and completion percentage.
pub async fn team_overview<S: DocumentStore>(store: &S) -> Result<TeamOverview> {
    team_overview_at(store, now_utc()).await
}

/// Per-user completion and trailing-week hours, best score first.
pub async fn individual_performance<S: DocumentStore>(store: &S) -> Result<Vec<MemberPerformance>> {
    individual_performance_at(store, now_utc()).await
}

/// Daily completions and hours over the trailing 30 days.
pub async fn productivity_trends<S: DocumentStore>(store: &S) -> Result<ProductivityTrends> {
    productivity_trends_at(store, now_utc()).await
}

/// Month-to-date points per user, ranked.
pub async fn team_leaderboard<S: DocumentStore>(store: &S) -> Result<Vec<LeaderboardEntry>> {
    team_leaderboard_at(store, now_utc()).await
}

pub(crate) async fn team_overview_at<S: DocumentStore>(
    store: &S,
    now: NaiveDateTime,
) -> Result<TeamOverview> {
    let everything = Filter::new();
    let done = Filter::new().status(TaskStatus::Done);
    let in_progress = Filter::new().status(TaskStatus::InProgress);
    let completed_today = Filter::new().within(Field::CompletedDate, Window::Today, now);

    let (team_size, total_tasks, completed_tasks, in_progress_tasks, tasks_completed_today) =
        tokio::try_join!(
            store.count(Collection::Users, &everything),
            store.count(Collection::Tasks, &everything),
            store.count(Collection::Tasks, &done),
            store.count(Collection::Tasks, &in_progress),
            store.count(Collection::Tasks, &completed_today),
        )?;
    debug!("team overview: {team_size} users, {completed_tasks}/{total_tasks} tasks done");

    Ok(TeamOverview {
        team_size,
        total_tasks,
        completed_tasks,
        in_progress_tasks,
        tasks_completed_today,
        team_productivity_score: team_productivity_score(completed_tasks, total_tasks),
        completion_rate: completion_rate(completed_tasks, total_tasks),
    })
}

pub(crate) async fn individual_performance_at<S: DocumentStore>(
    store: &S,
    now: NaiveDateTime,
) -> Result<Vec<MemberPerformance>> {
    let (week_start, _) = PERFORMANCE_WINDOW.bounds(now);
    debug!("individual performance: hours since {week_start}");

    let everything = Filter::new();
    let done = Filter::new().status(TaskStatus::Done);
    let this_week = Filter::new().within(Field::Date, PERFORMANCE_WINDOW, now);

    let (users, totals, completed, hours) = tokio::try_join!(
        store.find::<User>(&everything, None, Some(USER_LIMIT)),
        store.aggregate(
            Collection::Tasks,
            &everything,
            GroupKey::Field(Field::AssignedTo),
            Reduction::Count,
        ),
        store.aggregate(
            Collection::Tasks,
            &done,
            GroupKey::Field(Field::AssignedTo),
            Reduction::Count,
        ),
        store.aggregate(
            Collection::TimeEntries,
            &this_week,
            GroupKey::Field(Field::UserId),
            Reduction::Sum(Field::Hours),
        ),
    )?;
    let totals = by_key(totals);
    let completed = by_key(completed);
    let hours = by_key(hours);

    let mut performance: Vec<MemberPerformance> = users
        .into_iter()
        .map(|user| {
            let total_tasks = count_for(&totals, &user.id);
            let completed_tasks = count_for(&completed, &user.id);
            let hours_this_week = sum_for(&hours, &user.id);
            let rate = scoring::completion_percentage(completed_tasks, total_tasks);

            MemberPerformance {
                total_tasks,
                completed_tasks,
                completion_rate: round1(rate),
                hours_this_week: round1(hours_this_week),
                productivity_score: individual_productivity_score(rate, hours_this_week),
                user_id: user.id,
                name: user.name,
                avatar_url: user.avatar_url,
            }
        })
        .collect();

    performance.sort_by(|a, b| b.productivity_score.total_cmp(&a.productivity_score));
    debug!("individual performance: {} members", performance.len());
    Ok(performance)
}

pub(crate) async fn productivity_trends_at<S: DocumentStore>(
    store: &S,
    now: NaiveDateTime,
) -> Result<ProductivityTrends> {
    let (since, _) = TRENDS_WINDOW.bounds(now);

    let completed = Filter::new()
        .status(TaskStatus::Done)
        .within(Field::CompletedDate, TRENDS_WINDOW, now);
    let logged = Filter::new().within(Field::Date, TRENDS_WINDOW, now);

    let (completions, hours) = tokio::try_join!(
        store.aggregate(
            Collection::Tasks,
            &completed,
            GroupKey::Day(Field::CompletedDate),
            Reduction::Count,
        ),
        store.aggregate(
            Collection::TimeEntries,
            &logged,
            GroupKey::Day(Field::Date),
            Reduction::Sum(Field::Hours),
        ),
    )?;
    debug!(
        "productivity trends since {since}: {} completion days, {} logging days",
        completions.len(),
        hours.len()
    );

    Ok(ProductivityTrends {
        task_completion_trends: completions
            .into_iter()
            .map(|b| DailyTaskCompletions {
                count: bucket_count(b.value),
                day: b.key,
            })
            .collect(),
        time_logging_trends: hours
            .into_iter()
            .map(|b| DailyHoursLogged {
                day: b.key,
                total_hours: b.value,
            })
            .collect(),
    })
}

pub(crate) async fn team_leaderboard_at<S: DocumentStore>(
    store: &S,
    now: NaiveDateTime,
) -> Result<Vec<LeaderboardEntry>> {
    let (month_start, _) = LEADERBOARD_WINDOW.bounds(now);
    debug!("leaderboard: since {month_start}");

    let everything = Filter::new();
    let done_this_month = Filter::new()
        .status(TaskStatus::Done)
        .within(Field::CompletedDate, LEADERBOARD_WINDOW, now);
    let logged_this_month = Filter::new().within(Field::Date, LEADERBOARD_WINDOW, now);

    let (users, completed, hours) = tokio::try_join!(
        store.find::<User>(&everything, None, Some(USER_LIMIT)),
        store.aggregate(
            Collection::Tasks,
            &done_this_month,
            GroupKey::Field(Field::AssignedTo),
            Reduction::Count,
        ),
        store.aggregate(
            Collection::TimeEntries,
            &logged_this_month,
            GroupKey::Field(Field::UserId),
            Reduction::Sum(Field::Hours),
        ),
    )?;
    let completed = by_key(completed);
    let hours = by_key(hours);

    let mut leaderboard: Vec<LeaderboardEntry> = users
        .into_iter()
        .map(|user| {
            let tasks_completed = count_for(&completed, &user.id);
            let hours_logged = sum_for(&hours, &user.id);
            LeaderboardEntry {
                tasks_completed,
                hours_logged: round1(hours_logged),
                points: leaderboard_points(tasks_completed, hours_logged),
                rank: 0,
                user_id: user.id,
                name: user.name,
                avatar_url: user.avatar_url,
            }
        })
        .collect();

    leaderboard.sort_by(|a, b| b.points.total_cmp(&a.points));
    for (i, entry) in leaderboard.iter_mut().enumerate() {
        entry.rank = i as u32 + 1;
    }
    Ok(leaderboard)
}

fn by_key(buckets: Vec<Bucket>) -> HashMap<String, f64> {
    buckets.into_iter().map(|b| (b.key, b.value)).collect()
}

fn bucket_count(value: f64) -> u64 {
    value.max(0.0).round() as u64
}

fn count_for(buckets: &HashMap<String, f64>, user_id: &str) -> u64 {
    buckets.get(user_id).copied().map(bucket_count).unwrap_or(0)
}

fn sum_for(buckets: &HashMap<String, f64>, user_id: &str) -> f64 {
    buckets.get(user_id).copied().unwrap_or(0.0)
}
