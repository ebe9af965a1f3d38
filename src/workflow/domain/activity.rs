//! Activity vocabulary for the fire-and-forget activity feed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of activity records appended to an issue's feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A phase was added to the issue.
    PhaseAdded,
    /// A phase was started.
    PhaseStarted,
    /// A phase completed with a comment.
    PhaseCompleted,
    /// A phase was marked failed.
    PhaseFailed,
    /// A failed or done phase was reopened.
    PhaseReopened,
    /// A task was added to a phase.
    TaskAdded,
    /// A task was assigned or unassigned.
    TaskAssigned,
    /// A task moved to a new status.
    TaskStatusChanged,
    /// A task gained a dependency.
    DependencyAdded,
    /// A task lost a dependency.
    DependencyRemoved,
    /// The issue was explicitly closed.
    IssueClosed,
    /// The issue was abandoned.
    IssueAbandoned,
}

impl ActivityKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PhaseAdded => "phase_added",
            Self::PhaseStarted => "phase_started",
            Self::PhaseCompleted => "phase_completed",
            Self::PhaseFailed => "phase_failed",
            Self::PhaseReopened => "phase_reopened",
            Self::TaskAdded => "task_added",
            Self::TaskAssigned => "task_assigned",
            Self::TaskStatusChanged => "task_status_changed",
            Self::DependencyAdded => "dependency_added",
            Self::DependencyRemoved => "dependency_removed",
            Self::IssueClosed => "issue_closed",
            Self::IssueAbandoned => "issue_abandoned",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
