use chrono::NaiveDateTime;
use rusqlite::types::Value;

use crate::date_util::format_timestamp;
use crate::error::{Error, Result};
use crate::model::TaskStatus;
use crate::query::window::Window;

/// The five document collections of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Tasks,
    TimeEntries,
    Goals,
    Standups,
}

impl Collection {
    pub fn table(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Tasks => "tasks",
            Collection::TimeEntries => "time_entries",
            Collection::Goals => "goals",
            Collection::Standups => "standups",
        }
    }

    /// Fields that may appear in filters, sorts, and group keys.
    pub fn fields(&self) -> &'static [Field] {
        match self {
            Collection::Users => &[Field::Id, Field::Email, Field::JoinedDate],
            Collection::Tasks => &[
                Field::Id,
                Field::Status,
                Field::AssignedTo,
                Field::CreatedDate,
                Field::CompletedDate,
            ],
            Collection::TimeEntries => &[
                Field::Id,
                Field::UserId,
                Field::TaskId,
                Field::Date,
                Field::Hours,
            ],
            Collection::Goals => &[Field::Id, Field::UserId, Field::CreatedDate],
            Collection::Standups => &[Field::Id, Field::UserId, Field::Date],
        }
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.fields().contains(&field)
    }

    /// Fail with `Error::Query` when `field` is not part of this collection.
    pub fn check_field(&self, field: Field) -> Result<()> {
        if self.has_field(field) {
            Ok(())
        } else {
            Err(Error::Query(format!(
                "{} has no field {}",
                self.table(),
                field.column()
            )))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Email,
    JoinedDate,
    Status,
    AssignedTo,
    CreatedDate,
    CompletedDate,
    UserId,
    TaskId,
    Date,
    Hours,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Email => "email",
            Field::JoinedDate => "joined_date",
            Field::Status => "status",
            Field::AssignedTo => "assigned_to",
            Field::CreatedDate => "created_date",
            Field::CompletedDate => "completed_date",
            Field::UserId => "user_id",
            Field::TaskId => "task_id",
            Field::Date => "date",
            Field::Hours => "hours",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(Field, String),
    AtOrAfter(Field, NaiveDateTime),
    Before(Field, NaiveDateTime),
}

impl Condition {
    fn field(&self) -> Field {
        match self {
            Condition::Eq(f, _) | Condition::AtOrAfter(f, _) | Condition::Before(f, _) => *f,
        }
    }
}

/// Conjunction of field predicates over one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: Field, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::Eq(field, value.into()));
        self
    }

    pub fn status(self, status: TaskStatus) -> Self {
        self.eq(Field::Status, status.as_str())
    }

    pub fn at_or_after(mut self, field: Field, ts: NaiveDateTime) -> Self {
        self.conditions.push(Condition::AtOrAfter(field, ts));
        self
    }

    pub fn before(mut self, field: Field, ts: NaiveDateTime) -> Self {
        self.conditions.push(Condition::Before(field, ts));
        self
    }

    /// Restrict `field` to `window` as resolved at `now`.
    pub fn within(self, field: Field, window: Window, now: NaiveDateTime) -> Self {
        let (start, end) = window.bounds(now);
        let filter = self.at_or_after(field, start);
        match end {
            Some(end) => filter.before(field, end),
            None => filter,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Compile to a WHERE clause (empty when there are no conditions) and its
    /// positional parameters, numbered from `?1`.
    pub fn to_sql(&self, collection: Collection) -> Result<SqlFilter> {
        let mut wheres = Vec::new();
        let mut params = Vec::new();
        let mut param_idx = 1;

        for condition in &self.conditions {
            collection.check_field(condition.field())?;
            match condition {
                Condition::Eq(field, value) => {
                    wheres.push(format!("{} = ?{param_idx}", field.column()));
                    params.push(Value::Text(value.clone()));
                }
                Condition::AtOrAfter(field, ts) => {
                    wheres.push(format!("{} >= ?{param_idx}", field.column()));
                    params.push(Value::Text(format_timestamp(*ts)));
                }
                Condition::Before(field, ts) => {
                    wheres.push(format!("{} < ?{param_idx}", field.column()));
                    params.push(Value::Text(format_timestamp(*ts)));
                }
            }
            param_idx += 1;
        }

        let clause = if wheres.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", wheres.join(" AND "))
        };
        Ok(SqlFilter { clause, params })
    }
}

/// A compiled filter, owned so it can move onto the connection thread.
#[derive(Debug, Clone)]
pub struct SqlFilter {
    pub clause: String,
    pub params: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: Field,
    pub descending: bool,
}

impl Sort {
    pub fn asc(field: Field) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn desc(field: Field) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    pub fn to_sql(&self, collection: Collection) -> Result<String> {
        collection.check_field(self.field)?;
        let dir = if self.descending { "DESC" } else { "ASC" };
        Ok(format!(" ORDER BY {} {dir}", self.field.column()))
    }
}
