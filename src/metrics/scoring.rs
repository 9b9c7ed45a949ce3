/// Hours contribution to the individual score saturates here.
const HOURS_SIGNAL_CAP: f64 = 100.0;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Unrounded completion percentage, for feeding into other scores.
pub(crate) fn completion_percentage(completed: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

/// Percentage of `total` that is `completed`. Zero when there is nothing to
/// complete.
pub fn completion_rate(completed: u64, total: u64) -> f64 {
    round1(completion_percentage(completed, total))
}

/// Blend of completion percentage and weekly hours, each in `[0, 100]`.
pub fn individual_productivity_score(completion_rate: f64, hours_this_week: f64) -> f64 {
    let hours_signal = (hours_this_week * 2.0).min(HOURS_SIGNAL_CAP);
    round1((completion_rate + hours_signal) / 2.0)
}

/// Uncapped points for the monthly leaderboard.
pub fn leaderboard_points(tasks_completed: u64, hours_logged: f64) -> f64 {
    round1(tasks_completed as f64 * 10.0 + hours_logged * 2.0)
}

pub fn team_productivity_score(completed: u64, total: u64) -> f64 {
    completion_rate(completed, total)
}
