//! Built-in records every workspace starts with.

use chrono::{DateTime, Utc};

use fieldnotes_proto::project::{ProjectRecord, ProjectStatus};
use fieldnotes_proto::status::TaskStatus;
use fieldnotes_proto::task::TaskRecord;

/// Storage key of the project collection.
pub const PROJECTS_KEY: &str = "fieldnotes-projects";

/// Storage key of the task collection.
pub const TASKS_KEY: &str = "fieldnotes-tasks";

/// Seed projects, stamped with `at`.
#[must_use]
pub fn default_projects(at: DateTime<Utc>) -> Vec<ProjectRecord> {
    let project = |id: &str, name: &str, status, owner: &str, description: &str| ProjectRecord {
        id: id.to_string(),
        name: name.to_string(),
        status,
        owner_email: owner.to_string(),
        description: description.to_string(),
        created_at: at,
        updated_at: at,
    };
    vec![
        project(
            "alpha",
            "Project Alpha",
            ProjectStatus::InProgress,
            "alpha@company.com",
            "Align research activities with the upcoming release window.",
        ),
        project(
            "atlas",
            "Atlas Migration",
            ProjectStatus::Planned,
            "atlas@company.com",
            "Map data pipelines and agree on ownership for each domain.",
        ),
        project(
            "nova",
            "Nova Storybook",
            ProjectStatus::InReview,
            "nova@company.com",
            "Document component coverage and collect review feedback.",
        ),
    ]
}

/// Seed tasks, stamped with `at`.
#[must_use]
pub fn default_tasks(at: DateTime<Utc>) -> Vec<TaskRecord> {
    let task = |id: &str, project_id: &str, title: &str, description: &str, status| TaskRecord {
        id: id.to_string(),
        project_id: project_id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        status,
        created_at: at,
        updated_at: at,
    };
    vec![
        task(
            "alpha-kickoff",
            "alpha",
            "Kickoff summary",
            "Align on scope, owners, and milestone dates.",
            TaskStatus::Todo,
        ),
        task(
            "alpha-risks",
            "alpha",
            "Risk register",
            "Capture top 3 risks and mitigation owners.",
            TaskStatus::Doing,
        ),
        task(
            "atlas-dependencies",
            "atlas",
            "Dependency list",
            "Document upstream services and SLAs.",
            TaskStatus::Todo,
        ),
        task(
            "nova-review",
            "nova",
            "Component review",
            "Schedule review with design and QA.",
            TaskStatus::Done,
        ),
    ]
}
