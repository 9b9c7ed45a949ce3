use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::date_util::{format_timestamp, parse_timestamp};
use crate::model::{Goal, Standup, Task, TimeEntry, User};

// ── Row mapping ────────────────────────────────────────────────────

fn conversion_error(
    idx: usize,
    e: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn column_index(row: &Row<'_>, name: &str) -> usize {
    row.as_ref().column_index(name).unwrap_or(0)
}

fn timestamp(row: &Row<'_>, name: &str) -> Result<NaiveDateTime, rusqlite::Error> {
    let raw: String = row.get(name)?;
    parse_timestamp(&raw).map_err(|e| conversion_error(column_index(row, name), e))
}

fn optional_timestamp(
    row: &Row<'_>,
    name: &str,
) -> Result<Option<NaiveDateTime>, rusqlite::Error> {
    let raw: Option<String> = row.get(name)?;
    raw.map(|s| parse_timestamp(&s).map_err(|e| conversion_error(column_index(row, name), e)))
        .transpose()
}

fn parsed<T>(row: &Row<'_>, name: &str) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(name)?;
    raw.parse()
        .map_err(|e| conversion_error(column_index(row, name), e))
}

fn optional_timestamp_text(ts: Option<NaiveDateTime>) -> Option<String> {
    ts.map(format_timestamp)
}

pub(crate) fn user_from_row(row: &Row<'_>) -> Result<User, rusqlite::Error> {
    let completed: i64 = row.get("total_tasks_completed")?;
    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        avatar_url: row.get("avatar_url")?,
        role: row.get("role")?,
        joined_date: timestamp(row, "joined_date")?,
        productivity_score: row.get("productivity_score")?,
        total_tasks_completed: completed.max(0) as u64,
        total_hours_logged: row.get("total_hours_logged")?,
    })
}

pub(crate) fn task_from_row(row: &Row<'_>) -> Result<Task, rusqlite::Error> {
    let tags_json: String = row.get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_json)
        .map_err(|e| conversion_error(column_index(row, "tags"), e))?;
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parsed(row, "status")?,
        priority: parsed(row, "priority")?,
        assigned_to: row.get("assigned_to")?,
        project_id: row.get("project_id")?,
        estimated_hours: row.get("estimated_hours")?,
        actual_hours: row.get("actual_hours")?,
        created_date: timestamp(row, "created_date")?,
        due_date: optional_timestamp(row, "due_date")?,
        completed_date: optional_timestamp(row, "completed_date")?,
        tags,
    })
}

pub(crate) fn time_entry_from_row(row: &Row<'_>) -> Result<TimeEntry, rusqlite::Error> {
    let hours: Option<f64> = row.get("hours")?;
    Ok(TimeEntry {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        task_id: row.get("task_id")?,
        description: row.get("description")?,
        hours: hours.unwrap_or(0.0),
        date: timestamp(row, "date")?,
        is_pomodoro: row.get("is_pomodoro")?,
    })
}

pub(crate) fn goal_from_row(row: &Row<'_>) -> Result<Goal, rusqlite::Error> {
    Ok(Goal {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        goal_type: parsed(row, "goal_type")?,
        target_value: row.get("target_value")?,
        current_value: row.get("current_value")?,
        deadline: optional_timestamp(row, "deadline")?,
        created_date: timestamp(row, "created_date")?,
        completed: row.get("completed")?,
    })
}

pub(crate) fn standup_from_row(row: &Row<'_>) -> Result<Standup, rusqlite::Error> {
    Ok(Standup {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: timestamp(row, "date")?,
        what_i_did: row.get("what_i_did")?,
        what_ill_do: row.get("what_ill_do")?,
        blockers: row.get("blockers")?,
    })
}

// ── Users ──────────────────────────────────────────────────────────

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO users (
            id, name, email, avatar_url, role, joined_date,
            productivity_score, total_tasks_completed, total_hours_logged
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            user.id,
            user.name,
            user.email,
            user.avatar_url,
            user.role,
            format_timestamp(user.joined_date),
            user.productivity_score,
            user.total_tasks_completed as i64,
            user.total_hours_logged,
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> Result<Option<User>, rusqlite::Error> {
    conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], user_from_row)
        .optional()
}

pub fn user_exists(conn: &Connection, id: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn email_registered(conn: &Connection, email: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Bump a user's cached running totals.
pub fn add_to_user_totals(
    conn: &Connection,
    user_id: &str,
    tasks_completed: u64,
    hours: f64,
) -> Result<(), rusqlite::Error> {
    conn.execute(
        "UPDATE users SET
            total_tasks_completed = total_tasks_completed + ?2,
            total_hours_logged = total_hours_logged + ?3
         WHERE id = ?1",
        params![user_id, tasks_completed as i64, hours],
    )?;
    Ok(())
}

/// Rebuild every user's cached totals from tasks and time entries.
/// The cached score is `completed * 10 + hours * 0.5`.
pub fn recompute_user_totals(conn: &Connection) -> Result<usize, rusqlite::Error> {
    let updated = conn.execute(
        "UPDATE users SET
            total_tasks_completed = (
                SELECT COUNT(*) FROM tasks
                WHERE tasks.assigned_to = users.id AND tasks.status = 'done'
            ),
            total_hours_logged = (
                SELECT COALESCE(SUM(COALESCE(hours, 0)), 0) FROM time_entries
                WHERE time_entries.user_id = users.id
            )",
        [],
    )?;
    conn.execute(
        "UPDATE users SET
            productivity_score = total_tasks_completed * 10 + total_hours_logged * 0.5",
        [],
    )?;
    Ok(updated)
}

// ── Tasks ──────────────────────────────────────────────────────────

fn tags_json(task: &Task) -> Result<String, rusqlite::Error> {
    serde_json::to_string(&task.tags)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub fn insert_task(conn: &Connection, task: &Task) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO tasks (
            id, title, description, status, priority, assigned_to, project_id,
            estimated_hours, actual_hours, created_date, due_date, completed_date, tags
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            task.id,
            task.title,
            task.description,
            task.status.as_str(),
            task.priority.as_str(),
            task.assigned_to,
            task.project_id,
            task.estimated_hours,
            task.actual_hours,
            format_timestamp(task.created_date),
            optional_timestamp_text(task.due_date),
            optional_timestamp_text(task.completed_date),
            tags_json(task)?,
        ],
    )?;
    Ok(())
}

pub fn get_task(conn: &Connection, id: &str) -> Result<Option<Task>, rusqlite::Error> {
    conn.query_row("SELECT * FROM tasks WHERE id = ?1", params![id], task_from_row)
        .optional()
}

/// Write back the mutable fields of an existing task. Returns false when no
/// row has that id.
pub fn update_task(conn: &Connection, task: &Task) -> Result<bool, rusqlite::Error> {
    let changed = conn.execute(
        "UPDATE tasks SET
            title = ?2, description = ?3, status = ?4, priority = ?5,
            actual_hours = ?6, due_date = ?7, completed_date = ?8, tags = ?9
         WHERE id = ?1",
        params![
            task.id,
            task.title,
            task.description,
            task.status.as_str(),
            task.priority.as_str(),
            task.actual_hours,
            optional_timestamp_text(task.due_date),
            optional_timestamp_text(task.completed_date),
            tags_json(task)?,
        ],
    )?;
    Ok(changed > 0)
}

pub fn add_task_hours(conn: &Connection, task_id: &str, hours: f64) -> Result<(), rusqlite::Error> {
    conn.execute(
        "UPDATE tasks SET actual_hours = COALESCE(actual_hours, 0) + ?2 WHERE id = ?1",
        params![task_id, hours],
    )?;
    Ok(())
}

pub fn delete_task(conn: &Connection, id: &str) -> Result<bool, rusqlite::Error> {
    let count = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Time entries ───────────────────────────────────────────────────

pub fn insert_time_entry(conn: &Connection, entry: &TimeEntry) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO time_entries (id, user_id, task_id, description, hours, date, is_pomodoro)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.id,
            entry.user_id,
            entry.task_id,
            entry.description,
            entry.hours,
            format_timestamp(entry.date),
            entry.is_pomodoro,
        ],
    )?;
    Ok(())
}

// ── Goals & standups ───────────────────────────────────────────────

pub fn insert_goal(conn: &Connection, goal: &Goal) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO goals (
            id, user_id, title, description, goal_type, target_value,
            current_value, deadline, created_date, completed
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            goal.id,
            goal.user_id,
            goal.title,
            goal.description,
            goal.goal_type.as_str(),
            goal.target_value,
            goal.current_value,
            optional_timestamp_text(goal.deadline),
            format_timestamp(goal.created_date),
            goal.completed,
        ],
    )?;
    Ok(())
}

pub fn insert_standup(conn: &Connection, standup: &Standup) -> Result<(), rusqlite::Error> {
    conn.execute(
        "INSERT INTO standups (id, user_id, date, what_i_did, what_ill_do, blockers)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            standup.id,
            standup.user_id,
            format_timestamp(standup.date),
            standup.what_i_did,
            standup.what_ill_do,
            standup.blockers,
        ],
    )?;
    Ok(())
}

/// Whether `user_id` has a standup dated at or after `since`.
pub fn has_standup_since(
    conn: &Connection,
    user_id: &str,
    since: NaiveDateTime,
) -> Result<bool, rusqlite::Error> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM standups WHERE user_id = ?1 AND date >= ?2",
        params![user_id, format_timestamp(since)],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

// ── Maintenance ────────────────────────────────────────────────────

/// Delete every record in all five collections.
pub fn clear_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "DELETE FROM standups;
         DELETE FROM goals;
         DELETE FROM time_entries;
         DELETE FROM tasks;
         DELETE FROM users;",
    )
}
