use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{ApiError, AppState};
use crate::metrics::{LeaderboardEntry, MemberPerformance, ProductivityTrends, TeamOverview};
use crate::model::{
    Goal, NewGoal, NewStandup, NewTask, NewTimeEntry, NewUser, Standup, Task, TaskStatus,
    TaskUpdate, TimeEntry, User,
};
use crate::seed::SeedSummary;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct TaskQuery {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize)]
pub struct TimeEntryQuery {
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StandupQuery {
    #[serde(default)]
    user_id: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(default)]
    date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    message: &'static str,
    #[serde(flatten)]
    summary: SeedSummary,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewUser>,
) -> ApiResult<User> {
    Ok(Json(state.tracker.create_user(input).await?))
}

pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Vec<User>> {
    Ok(Json(state.tracker.list_users().await?))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    Ok(Json(state.tracker.get_user(&id).await?))
}

pub async fn create_task(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewTask>,
) -> ApiResult<Task> {
    Ok(Json(state.tracker.create_task(input).await?))
}

pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TaskQuery>,
) -> ApiResult<Vec<Task>> {
    let tasks = state
        .tracker
        .list_tasks(query.user_id.as_deref(), query.status)
        .await?;
    Ok(Json(tasks))
}

pub async fn update_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> ApiResult<Task> {
    Ok(Json(state.tracker.update_task(&id, update).await?))
}

pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    state.tracker.delete_task(&id).await?;
    Ok(Json(json!({ "message": "Task deleted successfully" })))
}

pub async fn create_time_entry(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewTimeEntry>,
) -> ApiResult<TimeEntry> {
    Ok(Json(state.tracker.log_time(input).await?))
}

pub async fn list_time_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimeEntryQuery>,
) -> ApiResult<Vec<TimeEntry>> {
    let entries = state
        .tracker
        .list_time_entries(query.user_id.as_deref(), query.task_id.as_deref())
        .await?;
    Ok(Json(entries))
}

pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewGoal>,
) -> ApiResult<Goal> {
    Ok(Json(state.tracker.create_goal(input).await?))
}

pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Vec<Goal>> {
    Ok(Json(state.tracker.list_goals(query.user_id.as_deref()).await?))
}

pub async fn create_standup(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NewStandup>,
) -> ApiResult<Standup> {
    Ok(Json(state.tracker.create_standup(input).await?))
}

pub async fn list_standups(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StandupQuery>,
) -> ApiResult<Vec<Standup>> {
    let standups = state
        .tracker
        .list_standups(query.user_id.as_deref(), query.date)
        .await?;
    Ok(Json(standups))
}

pub async fn team_overview(State(state): State<Arc<AppState>>) -> ApiResult<TeamOverview> {
    Ok(Json(state.tracker.team_overview().await?))
}

pub async fn individual_performance(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<MemberPerformance>> {
    Ok(Json(state.tracker.individual_performance().await?))
}

pub async fn productivity_trends(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ProductivityTrends> {
    Ok(Json(state.tracker.productivity_trends().await?))
}

pub async fn team_leaderboard(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Vec<LeaderboardEntry>> {
    Ok(Json(state.tracker.team_leaderboard().await?))
}

pub async fn init_sample_data(State(state): State<Arc<AppState>>) -> ApiResult<SeedResponse> {
    let summary = state.tracker.init_sample_data().await?;
    Ok(Json(SeedResponse {
        message: "Sample data initialized successfully",
        summary,
    }))
}
