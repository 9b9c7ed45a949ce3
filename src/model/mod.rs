pub mod planning;
pub mod task;
pub mod time_entry;
pub mod user;

pub use planning::{Goal, GoalType, NewGoal, NewStandup, Standup};
pub use task::{NewTask, Priority, Task, TaskStatus, TaskUpdate};
pub use time_entry::{NewTimeEntry, TimeEntry};
pub use user::{NewUser, User};

/// Generate a fresh record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
