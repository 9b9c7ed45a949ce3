use std::future::Future;

use rusqlite::{params_from_iter, Row};
use serde::Serialize;

use crate::date_util::DAY_KEY_LEN;
use crate::error::Result;
use crate::model::{Goal, Standup, Task, TimeEntry, User};
use crate::query::{Collection, Field, Filter, Sort};
use crate::storage::{repository, Database};

/// A model type stored as one row of a collection.
pub trait Record: Sized + Send + 'static {
    const COLLECTION: Collection;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl Record for User {
    const COLLECTION: Collection = Collection::Users;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        repository::user_from_row(row)
    }
}

impl Record for Task {
    const COLLECTION: Collection = Collection::Tasks;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        repository::task_from_row(row)
    }
}

impl Record for TimeEntry {
    const COLLECTION: Collection = Collection::TimeEntries;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        repository::time_entry_from_row(row)
    }
}

impl Record for Goal {
    const COLLECTION: Collection = Collection::Goals;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        repository::goal_from_row(row)
    }
}

impl Record for Standup {
    const COLLECTION: Collection = Collection::Standups;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        repository::standup_from_row(row)
    }
}

/// What an aggregation groups on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    /// The UTC day (`YYYY-MM-DD`) of a timestamp field.
    Day(Field),
    /// The raw value of a field, e.g. a user id.
    Field(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Count,
    /// Sum of a numeric field. Missing values count as zero.
    Sum(Field),
}

/// One group of an aggregation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: String,
    pub value: f64,
}

/// Read access to the record collections. Every failure to reach the
/// underlying store surfaces as `Error::Database`.
pub trait DocumentStore: Send + Sync {
    /// Number of records in `collection` matching `filter`.
    fn count(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Records of `R`'s collection matching `filter`, in insertion order
    /// unless `sort` is given.
    fn find<R: Record>(
        &self,
        filter: &Filter,
        sort: Option<Sort>,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<Vec<R>>> + Send;

    /// Grouped reduction over matching records, buckets ordered by key.
    fn aggregate(
        &self,
        collection: Collection,
        filter: &Filter,
        key: GroupKey,
        reduction: Reduction,
    ) -> impl Future<Output = Result<Vec<Bucket>>> + Send;
}

impl GroupKey {
    fn to_sql(self, collection: Collection) -> Result<String> {
        match self {
            GroupKey::Day(field) => {
                collection.check_field(field)?;
                Ok(format!("substr({}, 1, {DAY_KEY_LEN})", field.column()))
            }
            GroupKey::Field(field) => {
                collection.check_field(field)?;
                Ok(field.column().to_string())
            }
        }
    }
}

impl Reduction {
    fn to_sql(self, collection: Collection) -> Result<String> {
        match self {
            Reduction::Count => Ok("COUNT(*)".to_string()),
            Reduction::Sum(field) => {
                collection.check_field(field)?;
                Ok(format!("COALESCE(SUM(COALESCE({}, 0)), 0)", field.column()))
            }
        }
    }
}

impl DocumentStore for Database {
    async fn count(&self, collection: Collection, filter: &Filter) -> Result<u64> {
        let sql = filter.to_sql(collection)?;
        let query = format!("SELECT COUNT(*) FROM {}{}", collection.table(), sql.clause);

        let count = self
            .reader()
            .call(move |conn| {
                let count: i64 =
                    conn.query_row(&query, params_from_iter(sql.params.iter()), |row| {
                        row.get(0)
                    })?;
                Ok::<i64, rusqlite::Error>(count)
            })
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn find<R: Record>(
        &self,
        filter: &Filter,
        sort: Option<Sort>,
        limit: Option<u32>,
    ) -> Result<Vec<R>> {
        let collection = R::COLLECTION;
        let sql = filter.to_sql(collection)?;
        let order = match sort {
            Some(sort) => sort.to_sql(collection)?,
            None => " ORDER BY rowid".to_string(),
        };
        let limit = limit.map(|n| format!(" LIMIT {n}")).unwrap_or_default();
        let query = format!(
            "SELECT * FROM {}{}{order}{limit}",
            collection.table(),
            sql.clause
        );

        let records = self
            .reader()
            .call(move |conn| {
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map(params_from_iter(sql.params.iter()), R::from_row)?;
                let records = rows.collect::<rusqlite::Result<Vec<R>>>()?;
                Ok::<Vec<R>, rusqlite::Error>(records)
            })
            .await?;
        Ok(records)
    }

    async fn aggregate(
        &self,
        collection: Collection,
        filter: &Filter,
        key: GroupKey,
        reduction: Reduction,
    ) -> Result<Vec<Bucket>> {
        let sql = filter.to_sql(collection)?;
        let key_expr = key.to_sql(collection)?;
        let value_expr = reduction.to_sql(collection)?;
        let query = format!(
            "SELECT {key_expr} AS bucket_key, {value_expr} AS bucket_value
             FROM {}{}
             GROUP BY bucket_key
             ORDER BY bucket_key ASC",
            collection.table(),
            sql.clause
        );

        let buckets = self
            .reader()
            .call(move |conn| {
                let mut stmt = conn.prepare(&query)?;
                let rows = stmt.query_map(params_from_iter(sql.params.iter()), |row| {
                    Ok((row.get::<_, Option<String>>(0)?, row.get::<_, f64>(1)?))
                })?;
                let mut buckets = Vec::new();
                for row in rows {
                    // rows with no value for the key field form no bucket
                    if let (Some(key), value) = row? {
                        buckets.push(Bucket { key, value });
                    }
                }
                Ok::<Vec<Bucket>, rusqlite::Error>(buckets)
            })
            .await?;
        Ok(buckets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{NewTask, NewTimeEntry, NewUser, Priority, TaskStatus};
    use crate::query::Window;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 20)
            .unwrap()
            .and_hms_opt(15, 0, 0)
            .unwrap()
    }

    fn new_user(name: &str) -> User {
        User::new(
            NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                avatar_url: None,
            },
            now(),
        )
    }

    fn new_task(assignee: &str, title: &str) -> Task {
        Task::new(
            NewTask {
                title: title.to_string(),
                description: None,
                priority: Priority::Medium,
                assigned_to: assignee.to_string(),
                project_id: None,
                estimated_hours: None,
                due_date: None,
                tags: Vec::new(),
            },
            now() - Duration::days(10),
        )
    }

    fn new_entry(user_id: &str, hours: f64, date: NaiveDateTime) -> TimeEntry {
        let mut entry = TimeEntry::new(
            NewTimeEntry {
                user_id: user_id.to_string(),
                task_id: None,
                description: "work".to_string(),
                hours,
                is_pomodoro: false,
            },
            date,
        );
        entry.date = date;
        entry
    }

    /// Ada: two done tasks (yesterday and today), one todo.
    /// Bob: one in-progress task.
    /// Entries: Ada 3h two days ago, Ada 2h + 1.5h today, Bob 4h today.
    async fn fixture() -> (Database, User, User) {
        let db = Database::open_memory().await.unwrap();
        let ada = new_user("Ada");
        let bob = new_user("Bob");
        let (a, b) = (ada.clone(), bob.clone());

        db.writer()
            .call(move |conn| {
                repository::insert_user(conn, &a)?;
                repository::insert_user(conn, &b)?;

                for (title, offset) in [("one", 1), ("two", 0)] {
                    let mut task = new_task(&a.id, title);
                    task.status = TaskStatus::Done;
                    task.completed_date = Some(now() - Duration::days(offset));
                    repository::insert_task(conn, &task)?;
                }
                repository::insert_task(conn, &new_task(&a.id, "three"))?;
                let mut task = new_task(&b.id, "four");
                task.status = TaskStatus::InProgress;
                repository::insert_task(conn, &task)?;

                repository::insert_time_entry(
                    conn,
                    &new_entry(&a.id, 3.0, now() - Duration::days(2)),
                )?;
                repository::insert_time_entry(
                    conn,
                    &new_entry(&a.id, 2.0, now() - Duration::hours(5)),
                )?;
                repository::insert_time_entry(
                    conn,
                    &new_entry(&a.id, 1.5, now() - Duration::hours(1)),
                )?;
                repository::insert_time_entry(
                    conn,
                    &new_entry(&b.id, 4.0, now() - Duration::hours(2)),
                )?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .unwrap();
        (db, ada, bob)
    }

    #[tokio::test]
    async fn test_count_with_filters() {
        let (db, ada, _) = fixture().await;

        assert_eq!(db.count(Collection::Users, &Filter::new()).await.unwrap(), 2);
        assert_eq!(db.count(Collection::Tasks, &Filter::new()).await.unwrap(), 4);
        assert_eq!(
            db.count(Collection::Tasks, &Filter::new().status(TaskStatus::Done))
                .await
                .unwrap(),
            2
        );
        assert_eq!(
            db.count(
                Collection::Tasks,
                &Filter::new().eq(Field::AssignedTo, ada.id.as_str())
            )
            .await
            .unwrap(),
            3
        );
        let today = Filter::new().within(Field::CompletedDate, Window::Today, now());
        assert_eq!(db.count(Collection::Tasks, &today).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_sort_and_limit() {
        let (db, ada, _) = fixture().await;

        let entries: Vec<TimeEntry> = db
            .find(
                &Filter::new().eq(Field::UserId, ada.id.as_str()),
                Some(Sort::desc(Field::Date)),
                Some(2),
            )
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].hours, 1.5);
        assert_eq!(entries[1].hours, 2.0);

        let users: Vec<User> = db.find(&Filter::new(), None, None).await.unwrap();
        assert_eq!(
            users.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
            vec!["Ada", "Bob"]
        );
    }

    #[tokio::test]
    async fn test_aggregate_by_field() {
        let (db, ada, bob) = fixture().await;

        let hours = db
            .aggregate(
                Collection::TimeEntries,
                &Filter::new(),
                GroupKey::Field(Field::UserId),
                Reduction::Sum(Field::Hours),
            )
            .await
            .unwrap();
        let ada_hours = hours.iter().find(|b| b.key == ada.id).unwrap();
        let bob_hours = hours.iter().find(|b| b.key == bob.id).unwrap();
        assert_eq!(ada_hours.value, 6.5);
        assert_eq!(bob_hours.value, 4.0);

        let totals = db
            .aggregate(
                Collection::Tasks,
                &Filter::new(),
                GroupKey::Field(Field::AssignedTo),
                Reduction::Count,
            )
            .await
            .unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.iter().map(|b| b.value).sum::<f64>(), 4.0);
    }

    #[tokio::test]
    async fn test_aggregate_by_day_is_ordered_and_skips_empty_keys() {
        let (db, _, _) = fixture().await;

        // Tasks without a completion date have no day and form no bucket.
        let completions = db
            .aggregate(
                Collection::Tasks,
                &Filter::new(),
                GroupKey::Day(Field::CompletedDate),
                Reduction::Count,
            )
            .await
            .unwrap();
        assert_eq!(
            completions,
            vec![
                Bucket { key: "2025-06-19".to_string(), value: 1.0 },
                Bucket { key: "2025-06-20".to_string(), value: 1.0 },
            ]
        );

        let hours = db
            .aggregate(
                Collection::TimeEntries,
                &Filter::new().within(Field::Date, Window::TrailingDays(1), now()),
                GroupKey::Day(Field::Date),
                Reduction::Sum(Field::Hours),
            )
            .await
            .unwrap();
        assert_eq!(
            hours,
            vec![Bucket { key: "2025-06-20".to_string(), value: 7.5 }]
        );
    }

    #[tokio::test]
    async fn test_empty_collection_yields_no_buckets() {
        let db = Database::open_memory().await.unwrap();
        let buckets = db
            .aggregate(
                Collection::TimeEntries,
                &Filter::new(),
                GroupKey::Day(Field::Date),
                Reduction::Sum(Field::Hours),
            )
            .await
            .unwrap();
        assert!(buckets.is_empty());
        assert_eq!(db.count(Collection::Standups, &Filter::new()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_invalid_field_is_a_query_error() {
        let db = Database::open_memory().await.unwrap();
        let err = db
            .aggregate(
                Collection::Users,
                &Filter::new(),
                GroupKey::Field(Field::UserId),
                Reduction::Count,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Query(_)));
    }
}
