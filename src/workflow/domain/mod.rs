//! Domain model for the workflow consistency engine.
//!
//! Pure entities and logic with no infrastructure dependencies: the
//! issue/phase/task tree, the deadline constraint engine, dependency
//! resolution and diffing, and the derived issue status state machine.

mod activity;
mod dependency;
mod error;
mod ids;
mod issue;
mod phase;
pub mod schedule;
pub mod status;
mod task;

pub use activity::ActivityKind;
pub use dependency::{
    DependencyDiff, DependencyKind, TaskDependency, diff_dependencies,
    resolve_dependency_finish_date,
};
pub use error::{NotFoundError, ParseVariantError, ValidationError, WorkflowError};
pub use ids::{IssueId, PhaseId, ProjectId, TaskId, UserId};
pub use issue::{Issue, IssueStatus};
pub use phase::{Phase, PhaseKind, PhaseStatus, REQUIRED_KINDS};
pub use status::derive_issue_status;
pub use task::{Task, TaskStatus};
