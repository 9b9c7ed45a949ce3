use clap::{Parser, Subcommand};

use thirdangle::{NewTask, NewTimeEntry, NewUser, Priority, TaskStatus, TaskUpdate, Tracker};

#[derive(Parser)]
#[command(name = "thirdangle", about = "Team productivity tracker")]
struct Cli {
    /// Database path (default: ~/.thirdangle/thirdangle.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = thirdangle::server::DEFAULT_BIND)]
        bind: String,
    },
    /// Replace all data with the demo team
    Seed,
    /// Team analytics
    Analytics {
        #[command(subcommand)]
        report: AnalyticsReport,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Track time
    Time {
        #[command(subcommand)]
        action: TimeAction,
    },
    /// Show record counts
    Status,
}

#[derive(Subcommand)]
enum AnalyticsReport {
    /// Team-wide task counts and completion
    Overview {
        #[arg(long)]
        json: bool,
    },
    /// Per-user completion and hours this week
    Performance {
        #[arg(long)]
        json: bool,
    },
    /// Daily completions and hours over the last 30 days
    Trends {
        #[arg(long)]
        json: bool,
    },
    /// Month-to-date points ranking
    Leaderboard {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Add a team member
    Add {
        name: String,
        email: String,
        #[arg(long)]
        avatar_url: Option<String>,
    },
    /// List team members
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Create a task
    Add {
        title: String,
        /// Assigned user id
        #[arg(long)]
        assignee: String,
        /// high, medium, or low
        #[arg(long, default_value = "medium")]
        priority: String,
        /// Estimated hours
        #[arg(long)]
        estimate: Option<f64>,
    },
    /// List tasks
    List {
        #[arg(long)]
        assignee: Option<String>,
        /// todo, in_progress, or done
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Change a task's status
    Status { id: String, status: String },
    /// Delete a task
    Delete { id: String },
}

#[derive(Subcommand)]
enum TimeAction {
    /// Log hours for a user
    Log {
        user_id: String,
        hours: f64,
        description: String,
        /// Task the time was spent on
        #[arg(long)]
        task: Option<String>,
        /// Mark as a pomodoro session
        #[arg(long)]
        pomodoro: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => thirdangle::Database::open_at(path).await?,
        None => thirdangle::Database::open().await?,
    };
    let tracker = Tracker::new(db);

    match cli.command {
        Commands::Serve { bind } => {
            thirdangle::server::serve(tracker, &bind).await?;
        }
        Commands::Seed => {
            let summary = tracker.init_sample_data().await?;
            println!(
                "Seeded {} users, {} tasks, {} time entries.",
                summary.users, summary.tasks, summary.time_entries
            );
        }
        Commands::Analytics { report } => {
            handle_analytics(&tracker, report).await?;
        }
        Commands::User { action } => {
            handle_user(&tracker, action).await?;
        }
        Commands::Task { action } => {
            handle_task(&tracker, action).await?;
        }
        Commands::Time { action } => {
            handle_time(&tracker, action).await?;
        }
        Commands::Status => {
            print_status(&tracker).await?;
        }
    }

    Ok(())
}

async fn print_status(tracker: &Tracker) -> anyhow::Result<()> {
    let status = tracker.status().await?;
    println!("Tracker Status");
    println!("  Users:        {}", status.users);
    println!("  Tasks:        {}", status.tasks);
    println!("  Time entries: {}", status.time_entries);
    println!("  Goals:        {}", status.goals);
    println!("  Standups:     {}", status.standups);
    Ok(())
}

async fn handle_analytics(tracker: &Tracker, report: AnalyticsReport) -> anyhow::Result<()> {
    match report {
        AnalyticsReport::Overview { json } => {
            let o = tracker.team_overview().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&o)?);
            } else {
                println!("Team Overview");
                println!("  Team size:       {}", o.team_size);
                println!("  Tasks:           {}", o.total_tasks);
                println!("  Completed:       {}", o.completed_tasks);
                println!("  In progress:     {}", o.in_progress_tasks);
                println!("  Completed today: {}", o.tasks_completed_today);
                println!("  Productivity:    {:.1}%", o.team_productivity_score);
            }
        }
        AnalyticsReport::Performance { json } => {
            let rows = tracker.individual_performance().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else if rows.is_empty() {
                println!("No users.");
            } else {
                println!(
                    "{:<24} {:>6} {:>6} {:>7} {:>7} {:>6}",
                    "Name", "Tasks", "Done", "Rate", "Hours", "Score"
                );
                for r in &rows {
                    println!(
                        "{:<24} {:>6} {:>6} {:>6.1}% {:>7.1} {:>6.1}",
                        r.name,
                        r.total_tasks,
                        r.completed_tasks,
                        r.completion_rate,
                        r.hours_this_week,
                        r.productivity_score
                    );
                }
            }
        }
        AnalyticsReport::Trends { json } => {
            let t = tracker.productivity_trends().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&t)?);
            } else {
                println!("Task completions (last 30 days)");
                if t.task_completion_trends.is_empty() {
                    println!("  none");
                }
                for d in &t.task_completion_trends {
                    println!("  {}  {}", d.day, d.count);
                }
                println!("Hours logged (last 30 days)");
                if t.time_logging_trends.is_empty() {
                    println!("  none");
                }
                for d in &t.time_logging_trends {
                    println!("  {}  {:.1}", d.day, d.total_hours);
                }
            }
        }
        AnalyticsReport::Leaderboard { json } => {
            let entries = tracker.team_leaderboard().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No users.");
            } else {
                for e in &entries {
                    println!(
                        "{:>3}. {:<24} {:>7.1} pts  ({} tasks, {:.1}h)",
                        e.rank, e.name, e.points, e.tasks_completed, e.hours_logged
                    );
                }
            }
        }
    }
    Ok(())
}

async fn handle_user(tracker: &Tracker, action: UserAction) -> anyhow::Result<()> {
    match action {
        UserAction::Add {
            name,
            email,
            avatar_url,
        } => {
            let user = tracker
                .create_user(NewUser {
                    name,
                    email,
                    avatar_url,
                })
                .await?;
            println!("Added: {} ({})", user.name, user.id);
        }
        UserAction::List { json } => {
            let users = tracker.list_users().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
            } else if users.is_empty() {
                println!("No users.");
            } else {
                for u in &users {
                    println!("{}  {} <{}>", u.id, u.name, u.email);
                }
            }
        }
    }
    Ok(())
}

async fn handle_task(tracker: &Tracker, action: TaskAction) -> anyhow::Result<()> {
    match action {
        TaskAction::Add {
            title,
            assignee,
            priority,
            estimate,
        } => {
            let priority: Priority = priority.parse()?;
            let task = tracker
                .create_task(NewTask {
                    title,
                    description: None,
                    priority,
                    assigned_to: assignee,
                    project_id: None,
                    estimated_hours: estimate,
                    due_date: None,
                    tags: Vec::new(),
                })
                .await?;
            println!("Added: {} ({})", task.title, task.id);
        }
        TaskAction::List {
            assignee,
            status,
            json,
        } => {
            let status = status.as_deref().map(str::parse::<TaskStatus>).transpose()?;
            let tasks = tracker.list_tasks(assignee.as_deref(), status).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks found.");
            } else {
                for t in &tasks {
                    println!(
                        "{}  [{}] {} ({})",
                        t.id,
                        t.status,
                        t.title,
                        t.priority.as_str()
                    );
                }
                println!("\n{} tasks", tasks.len());
            }
        }
        TaskAction::Status { id, status } => {
            let status: TaskStatus = status.parse()?;
            let task = tracker
                .update_task(
                    &id,
                    TaskUpdate {
                        status: Some(status),
                        ..Default::default()
                    },
                )
                .await?;
            println!("{} is now {}", task.id, task.status);
        }
        TaskAction::Delete { id } => {
            tracker.delete_task(&id).await?;
            println!("Deleted: {id}");
        }
    }
    Ok(())
}

async fn handle_time(tracker: &Tracker, action: TimeAction) -> anyhow::Result<()> {
    match action {
        TimeAction::Log {
            user_id,
            hours,
            description,
            task,
            pomodoro,
        } => {
            if hours < 0.0 {
                anyhow::bail!("hours must not be negative");
            }
            let entry = tracker
                .log_time(NewTimeEntry {
                    user_id,
                    task_id: task,
                    description,
                    hours,
                    is_pomodoro: pomodoro,
                })
                .await?;
            println!("Logged {:.1}h ({})", entry.hours, entry.id);
        }
    }
    Ok(())
}
