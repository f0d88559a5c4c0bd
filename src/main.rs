use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use studydesk::commands;
use studydesk::commands::events::ManualEvent;
use studydesk::commands::tasks::ManualTask;
use studydesk::core::event::EventType;
use studydesk::core::task::{Priority, TaskStatus, TaskType};

#[derive(Parser)]
#[command(name = "studydesk")]
#[command(about = "Student productivity backend with AI-powered semantic note search", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, default_value = "default", help = "User identifier owning the data")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommands),

    /// Semantic search over note summaries
    Search {
        query: String,
        #[arg(long, default_value_t = commands::search::DEFAULT_THRESHOLD, help = "Minimum similarity score (0-1)")]
        threshold: f32,
        #[arg(long, short, help = "Limit results")]
        limit: Option<usize>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Manage calendar events
    #[command(subcommand)]
    Event(EventCommands),

    /// Manage study plans
    #[command(subcommand)]
    Plan(PlanCommands),

    /// Show per-resource counts
    Status {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
}

#[derive(Subcommand)]
enum NoteCommands {
    /// Create a note
    Add {
        title: String,
        #[arg(long)]
        subject: String,
        #[arg(long, help = "Raw text; summary and metadata are generated with the LLM")]
        text: Option<String>,
        #[arg(long, help = "Use this summary directly (no LLM call)")]
        summary: Option<String>,
        #[arg(long, value_delimiter = ',', help = "Comma-separated tags")]
        tags: Vec<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// List notes
    List {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show one note in full
    Show {
        id: i64,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Delete a note
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Create a task, either from explicit fields or from free text
    Add {
        #[arg(long, help = "Free-text description; fields are generated with the LLM")]
        from_text: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, help = "Due date (RFC 3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')")]
        due: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type", default_value = "assignment", help = "assignment|study|project|exam")]
        task_type: TaskType,
        #[arg(long, default_value = "medium", help = "low|medium|high")]
        priority: Priority,
        #[arg(long, default_value_t = 60, help = "Estimated duration in minutes")]
        duration: i64,
        #[arg(long, value_delimiter = ',', help = "Comma-separated tags")]
        tags: Vec<String>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// List tasks
    List {
        #[arg(long, help = "Filter by status: pending|in_progress|completed|cancelled")]
        status: Option<TaskStatus>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show one task in full
    Show {
        id: i64,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Update any subset of a task's fields
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, help = "Due date (RFC 3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')")]
        due: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type", help = "assignment|study|project|exam")]
        task_type: Option<TaskType>,
        #[arg(long, help = "low|medium|high")]
        priority: Option<Priority>,
        #[arg(long, help = "pending|in_progress|completed|cancelled")]
        status: Option<TaskStatus>,
        #[arg(long, help = "Estimated duration in minutes")]
        duration: Option<i64>,
        #[arg(long, value_delimiter = ',', help = "Comma-separated tags (replaces existing)")]
        tags: Option<Vec<String>>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Mark a task as completed
    Complete { id: i64 },
    /// Delete a task
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum EventCommands {
    /// Create an event, either from explicit fields or from free text
    Add {
        #[arg(long, help = "Free-text description; fields are generated with the LLM")]
        from_text: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, help = "Start time (RFC 3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')")]
        start: Option<String>,
        #[arg(long, help = "End time (RFC 3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')")]
        end: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type", default_value = "study_session", help = "study_session|class|meeting|exam")]
        event_type: EventType,
        #[arg(long, help = "Task this event was planned for")]
        related_task: Option<i64>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// List events
    List {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show one event in full
    Show {
        id: i64,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Update any subset of an event's fields
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, help = "Start time (RFC 3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')")]
        start: Option<String>,
        #[arg(long, help = "End time (RFC 3339, 'YYYY-MM-DD HH:MM', or 'YYYY-MM-DD')")]
        end: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "type", help = "study_session|class|meeting|exam")]
        event_type: Option<EventType>,
        #[arg(long, help = "Task this event was planned for")]
        related_task: Option<i64>,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Delete an event
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Generate a study plan from a free-text description
    Create {
        description: String,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// List study plans
    List {
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show one plan with its sessions
    Show {
        id: i64,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Delete a study plan
    Delete { id: i64 },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let user = cli.user.as_str();

    match cli.command {
        Commands::Note(cmd) => match cmd {
            NoteCommands::Add {
                title,
                subject,
                text,
                summary,
                tags,
                json,
            } => commands::notes::add(
                user,
                &title,
                &subject,
                text.as_deref(),
                summary.as_deref(),
                tags,
                json,
            ),
            NoteCommands::List { json } => commands::notes::list(user, json),
            NoteCommands::Show { id, json } => commands::notes::show(user, id, json),
            NoteCommands::Delete { id } => commands::notes::delete(user, id),
        },

        Commands::Search {
            query,
            threshold,
            limit,
            json,
        } => commands::search::run(user, &query, threshold, limit, json),

        Commands::Task(cmd) => match cmd {
            TaskCommands::Add {
                from_text,
                title,
                subject,
                due,
                description,
                task_type,
                priority,
                duration,
                tags,
                json,
            } => match (from_text, title, subject, due) {
                (Some(description), _, _, _) => {
                    commands::tasks::add_from_text(user, &description, json)
                }
                (None, Some(title), Some(subject), Some(due)) => commands::tasks::add_manual(
                    user,
                    ManualTask {
                        title: &title,
                        subject: &subject,
                        due: &due,
                        description: description.as_deref(),
                        task_type,
                        priority,
                        duration,
                        tags,
                    },
                    json,
                ),
                _ => bail!("provide --from-text, or --title, --subject, and --due"),
            },
            TaskCommands::List { status, json } => commands::tasks::list(user, status, json),
            TaskCommands::Show { id, json } => commands::tasks::show(user, id, json),
            TaskCommands::Update {
                id,
                title,
                subject,
                due,
                description,
                task_type,
                priority,
                status,
                duration,
                tags,
                json,
            } => commands::tasks::update(
                user,
                id,
                commands::tasks::TaskUpdateArgs {
                    title: title.as_deref(),
                    subject: subject.as_deref(),
                    due: due.as_deref(),
                    description: description.as_deref(),
                    task_type,
                    priority,
                    status,
                    duration,
                    tags,
                },
                json,
            ),
            TaskCommands::Complete { id } => commands::tasks::complete(user, id),
            TaskCommands::Delete { id } => commands::tasks::delete(user, id),
        },

        Commands::Event(cmd) => match cmd {
            EventCommands::Add {
                from_text,
                title,
                start,
                end,
                description,
                event_type,
                related_task,
                json,
            } => match (from_text, title, start, end) {
                (Some(description), _, _, _) => {
                    commands::events::add_from_text(user, &description, json)
                }
                (None, Some(title), Some(start), Some(end)) => commands::events::add_manual(
                    user,
                    ManualEvent {
                        title: &title,
                        start: &start,
                        end: &end,
                        description: description.as_deref(),
                        event_type,
                        related_task,
                    },
                    json,
                ),
                _ => bail!("provide --from-text, or --title, --start, and --end"),
            },
            EventCommands::List { json } => commands::events::list(user, json),
            EventCommands::Show { id, json } => commands::events::show(user, id, json),
            EventCommands::Edit {
                id,
                title,
                start,
                end,
                description,
                event_type,
                related_task,
                json,
            } => commands::events::edit(
                user,
                id,
                commands::events::EventEditArgs {
                    title: title.as_deref(),
                    start: start.as_deref(),
                    end: end.as_deref(),
                    description: description.as_deref(),
                    event_type,
                    related_task,
                },
                json,
            ),
            EventCommands::Delete { id } => commands::events::delete(user, id),
        },

        Commands::Plan(cmd) => match cmd {
            PlanCommands::Create { description, json } => {
                commands::plans::create(user, &description, json)
            }
            PlanCommands::List { json } => commands::plans::list(user, json),
            PlanCommands::Show { id, json } => commands::plans::show(user, id, json),
            PlanCommands::Delete { id } => commands::plans::delete(user, id),
        },

        Commands::Status { json } => commands::status::run(user, json),
    }
}
