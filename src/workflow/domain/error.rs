//! Error types for workflow consistency validation and lookup.

use super::dependency::TaskDependency;
use super::ids::{PhaseId, TaskId};
use super::phase::{PhaseKind, PhaseStatus};
use super::task::TaskStatus;
use chrono::NaiveDate;
use thiserror::Error;

/// A caller-supplied value or requested transition would violate a
/// workflow invariant.
///
/// Validation errors are always surfaced before persistence and are never
/// retried. Cascading clamps are not validation errors; they repair stale
/// schedules silently.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A phase deadline later than the owning issue's deadline was supplied.
    #[error("phase deadline {candidate} exceeds issue deadline {issue_deadline}")]
    PhaseDeadlineExceedsIssue {
        /// The deadline the caller attempted to set.
        candidate: NaiveDate,
        /// The issue-level bound it violates.
        issue_deadline: NaiveDate,
    },

    /// A task start date later than its due date was supplied.
    #[error("task start date {start} is after due date {due}")]
    StartAfterDue {
        /// The proposed start date.
        start: NaiveDate,
        /// The proposed due date.
        due: NaiveDate,
    },

    /// A task due date later than the tightest ancestor deadline was supplied.
    #[error("task due date {due} exceeds schedule limit {limit}")]
    DueExceedsLimit {
        /// The proposed due date.
        due: NaiveDate,
        /// The effective bound, `min(issue.deadline, phase.deadline)`.
        limit: NaiveDate,
    },

    /// A task start date precedes the resolved finish date of a dependency.
    #[error("task start date {start} precedes dependency completion {finish}")]
    StartPrecedesDependencyFinish {
        /// The proposed start date.
        start: NaiveDate,
        /// The resolved finish date of the offending dependency.
        finish: NaiveDate,
        /// The dependency whose finish date is violated.
        dependency: TaskDependency,
    },

    /// A phase cannot complete while it still holds unfinished tasks.
    #[error("phase {0} has tasks that are not done")]
    PhaseTasksIncomplete(PhaseId),

    /// Phase completion requires a non-blank completion comment.
    #[error("phase completion requires a non-blank comment")]
    BlankCompletionComment,

    /// The requested task status move is not permitted.
    #[error("task may not move from {from} to {to}")]
    InvalidTaskStatusTransition {
        /// Current task status.
        from: TaskStatus,
        /// Requested task status.
        to: TaskStatus,
    },

    /// The requested phase status move is not permitted.
    #[error("phase may not move from {from} to {to}")]
    InvalidPhaseStatusTransition {
        /// Current phase status.
        from: PhaseStatus,
        /// Requested phase status.
        to: PhaseStatus,
    },

    /// An issue cannot close while any phase is not done.
    #[error("issue cannot close: not every phase is done")]
    CloseRequiresAllPhasesDone,

    /// An issue cannot close or finish without the full required kind set.
    #[error("issue is missing required phase kinds: {0:?}")]
    MissingRequiredKinds(Vec<PhaseKind>),
}

/// A referenced identifier does not exist in the reachable graph.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotFoundError {
    /// No phase with the given identifier exists under the issue.
    #[error("phase not found: {0}")]
    Phase(PhaseId),

    /// No task with the given identifier exists under the issue.
    #[error("task not found: {0}")]
    Task(TaskId),

    /// A dependency target could not be located under the issue.
    #[error("dependency target not found: {0}")]
    DependencyTarget(TaskDependency),
}

/// Combined error for engine operations that both validate and resolve.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkflowError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A referenced entity was not found.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// Error returned while parsing workflow enums from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct ParseVariantError {
    /// The enum being parsed.
    pub kind: &'static str,
    /// The unrecognised input.
    pub value: String,
}
