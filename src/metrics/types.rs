use serde::Serialize;

/// Whole-team task counts and completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamOverview {
    pub team_size: u64,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub in_progress_tasks: u64,
    /// Tasks whose completion date falls on the current UTC day.
    pub tasks_completed_today: u64,
    pub team_productivity_score: f64,
    /// Same figure as `team_productivity_score`.
    pub completion_rate: f64,
}

/// One user's task completion and trailing-week hours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberPerformance {
    pub user_id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub completion_rate: f64,
    pub hours_this_week: f64,
    pub productivity_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTaskCompletions {
    /// `YYYY-MM-DD`
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyHoursLogged {
    pub day: String,
    pub total_hours: f64,
}

/// Daily activity over the trailing 30 days. Days without activity are
/// absent, so the two series are independently sparse.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductivityTrends {
    pub task_completion_trends: Vec<DailyTaskCompletions>,
    pub time_logging_trends: Vec<DailyHoursLogged>,
}

/// Month-to-date standing of one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub tasks_completed: u64,
    pub hours_logged: f64,
    pub points: f64,
    /// 1-based position. Tied points still get distinct ranks.
    pub rank: u32,
}
