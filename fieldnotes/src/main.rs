//! `fieldnotes`: research workspace from the command line.
//!
//! Every command goes through the simulated API, so each call takes the
//! configured latency. Mutations run through the optimistic boards and
//! print the settled record, or the normalized error on failure.
//!
//! Project and task commands need a signed-in session. Any well-formed
//! credentials sign in; pass them with `--email`/`--password` or the
//! `FIELDNOTES_EMAIL`/`FIELDNOTES_PASSWORD` variables.
//!
//! ```bash
//! export FIELDNOTES_EMAIL=ana@company.com FIELDNOTES_PASSWORD=secret1
//! fieldnotes projects --status "in progress"
//! fieldnotes tasks alpha --tstatus todo
//! fieldnotes move-task alpha-kickoff doing
//! fieldnotes --in-memory create-task alpha --title "Draft agenda" --description "Topics"
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;

use fieldnotes::api::ApiError;
use fieldnotes::config::{CliArgs, WorkspaceConfig};
use fieldnotes::workspace::Workspace;
use fieldnotes_proto::auth::LoginValues;
use fieldnotes_proto::project::{ProjectStatus, ProjectValues};
use fieldnotes_proto::query::{ListQuery, PROJECT_PARAMS, TASK_PARAMS};
use fieldnotes_proto::status::{TaskStatus, allowed_statuses};
use fieldnotes_proto::task::{TaskDraft, TaskValues};

#[derive(Parser, Debug)]
#[command(version, about = "Research workspace: projects and tasks")]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    /// Sign-in email.
    #[arg(long, env = "FIELDNOTES_EMAIL", global = true)]
    email: Option<String>,

    /// Sign-in password.
    #[arg(long, env = "FIELDNOTES_PASSWORD", global = true, hide_env_values = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List projects.
    Projects {
        /// Search text over name and description.
        #[arg(long)]
        q: Option<String>,
        /// Status filter, or `all`.
        #[arg(long)]
        status: Option<String>,
        /// Page number, 1-indexed.
        #[arg(long)]
        page: Option<String>,
    },
    /// Show one project.
    Project {
        /// Project id.
        id: String,
    },
    /// Create a project.
    CreateProject {
        #[arg(long)]
        name: String,
        #[arg(long)]
        owner_email: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "Planned")]
        status: ProjectStatus,
    },
    /// Edit a project; omitted fields keep their value.
    UpdateProject {
        /// Project id.
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        owner_email: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
    },
    /// List the tasks of a project.
    Tasks {
        /// Project id.
        project: String,
        /// Search text over title and description.
        #[arg(long)]
        tq: Option<String>,
        /// Status filter, or `all`.
        #[arg(long)]
        tstatus: Option<String>,
        /// Page number, 1-indexed.
        #[arg(long)]
        page: Option<String>,
    },
    /// Create a task in a project.
    CreateTask {
        /// Project id.
        project: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Initial status (default: todo).
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Edit a task; omitted fields keep their value.
    UpdateTask {
        /// Task id.
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
    },
    /// Move a task one step along todo, doing, done.
    MoveTask {
        /// Task id.
        id: String,
        /// Target status.
        status: TaskStatus,
    },
    /// Show the statuses a task may move to from `status`.
    Statuses {
        /// Current status.
        status: TaskStatus,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = init_logging(&cli.args.log_level, cli.args.log_file.as_deref());

    let config = match WorkspaceConfig::load(&cli.args) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "failed to load config file, using defaults");
            eprintln!("Warning: failed to load config file: {e}");
            WorkspaceConfig::default()
        }
    };

    let workspace = match Workspace::open(config) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Some(email) = cli.email {
        let values = LoginValues {
            email,
            password: cli.password.unwrap_or_default(),
        };
        if let Err(err) = workspace.sign_in(&values) {
            print_json(&err, true);
            return ExitCode::FAILURE;
        }
    }

    match run(&workspace, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_json(&err, true);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging to stderr, or to `file_path` when given.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let (writer, guard) = match file_path {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name()?.to_str()?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

#[allow(clippy::too_many_lines)]
async fn run(workspace: &Workspace, command: Command) -> Result<(), ApiError> {
    if !matches!(command, Command::Statuses { .. }) {
        workspace.authorize()?;
    }
    match command {
        Command::Projects { q, status, page } => {
            let pairs = query_pairs([
                (PROJECT_PARAMS.search, q),
                (PROJECT_PARAMS.status, status),
                (PROJECT_PARAMS.page, page),
            ]);
            let query = ListQuery::from_pairs(borrow_pairs(&pairs), &PROJECT_PARAMS);
            let page = workspace.project_page(&query).await?;
            print_json(&PageView::from(page), false);
        }
        Command::Project { id } => {
            let project = workspace.projects().api().get_project(&id).await?;
            print_json(&project, false);
        }
        Command::CreateProject {
            name,
            owner_email,
            description,
            status,
        } => {
            let values = ProjectValues {
                name,
                status,
                owner_email,
                description,
            };
            let project = workspace.projects().create_project(values).await?;
            print_json(&project, false);
        }
        Command::UpdateProject {
            id,
            name,
            owner_email,
            description,
            status,
        } => {
            let projects = workspace.projects();
            projects.refresh_projects().await?;
            let current = projects.api().get_project(&id).await?.values();
            let values = ProjectValues {
                name: name.unwrap_or(current.name),
                status: status.unwrap_or(current.status),
                owner_email: owner_email.unwrap_or(current.owner_email),
                description: description.unwrap_or(current.description),
            };
            let project = projects.update_project(&id, values).await?;
            print_json(&project, false);
        }
        Command::Tasks {
            project,
            tq,
            tstatus,
            page,
        } => {
            let pairs = query_pairs([
                (TASK_PARAMS.search, tq),
                (TASK_PARAMS.status, tstatus),
                (TASK_PARAMS.page, page),
            ]);
            let query = ListQuery::from_pairs(borrow_pairs(&pairs), &TASK_PARAMS);
            let page = workspace.task_page(&project, &query).await?;
            print_json(&PageView::from(page), false);
        }
        Command::CreateTask {
            project,
            title,
            description,
            status,
        } => {
            let mut draft = TaskDraft::new(title, description);
            draft.status = status;
            workspace.tasks().refresh_tasks(&project).await?;
            let task = workspace.tasks().create_task(&project, draft).await?;
            print_json(&task, false);
        }
        Command::UpdateTask {
            id,
            title,
            description,
            status,
        } => {
            let tasks = workspace.tasks();
            let current = tasks.api().get_task(&id).await?;
            tasks.refresh_tasks(&current.project_id).await?;
            let values = TaskValues {
                title: title.unwrap_or_else(|| current.title.clone()),
                description: description.unwrap_or_else(|| current.description.clone()),
                status: status.unwrap_or(current.status),
            };
            let task = tasks.update_task(&current.project_id, &id, values).await?;
            print_json(&task, false);
        }
        Command::MoveTask { id, status } => {
            let tasks = workspace.tasks();
            let current = tasks.api().get_task(&id).await?;
            tasks.refresh_tasks(&current.project_id).await?;
            let task = tasks.move_task(&current.project_id, &id, status).await?;
            print_json(&task, false);
        }
        Command::Statuses { status } => {
            let allowed: Vec<&str> = allowed_statuses(status)
                .into_iter()
                .map(TaskStatus::as_str)
                .collect();
            print_json(&allowed, false);
        }
    }
    Ok(())
}

/// Page of records as printed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageView<R> {
    items: Vec<R>,
    page: usize,
    total_pages: usize,
    total: usize,
}

impl<R> From<fieldnotes_proto::query::Page<R>> for PageView<R> {
    fn from(page: fieldnotes_proto::query::Page<R>) -> Self {
        Self {
            items: page.items,
            page: page.page,
            total_pages: page.total_pages,
            total: page.total,
        }
    }
}

fn query_pairs<const N: usize>(
    pairs: [(&'static str, Option<String>); N],
) -> Vec<(&'static str, String)> {
    pairs
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

fn borrow_pairs<'a>(
    pairs: &'a [(&'static str, String)],
) -> impl Iterator<Item = (&'a str, &'a str)> {
    pairs.iter().map(|(key, value)| (*key, value.as_str()))
}

fn print_json<T: Serialize>(value: &T, to_stderr: bool) {
    match serde_json::to_string_pretty(value) {
        Ok(json) if to_stderr => eprintln!("{json}"),
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to render output: {e}"),
    }
}
