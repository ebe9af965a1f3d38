//! Task entity and task status guards.

use super::dependency::TaskDependency;
use super::error::{ParseVariantError, ValidationError};
use super::ids::{TaskId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not begun.
    NotStarted,
    /// Work is under way.
    InProgress,
    /// Work is temporarily paused.
    Paused,
    /// Work was given up.
    Abandoned,
    /// Work is complete.
    Done,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Paused => "paused",
            Self::Abandoned => "abandoned",
            Self::Done => "done",
        }
    }

    /// Returns whether this status admits no further moves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Abandoned)
    }

    /// Returns whether a move from this status to `target` is permitted.
    ///
    /// Terminal statuses reject every move, pausing is only reachable from
    /// active work, and self-moves are never permitted.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        match (self, target) {
            (Self::NotStarted, Self::InProgress | Self::Abandoned)
            | (Self::InProgress, Self::Paused | Self::Done | Self::Abandoned)
            | (Self::Paused, Self::InProgress | Self::Abandoned) => true,
            _ => false,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "paused" => Ok(Self::Paused),
            "abandoned" => Ok(Self::Abandoned),
            "done" => Ok(Self::Done),
            _ => Err(ParseVariantError {
                kind: "task status",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Smallest unit of work inside a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    assignee: Option<UserId>,
    status: TaskStatus,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    dependencies: Vec<TaskDependency>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task in the not-started status.
    ///
    /// Dates and dependencies are expected to have been validated against
    /// the owning issue graph before construction.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        assignee: Option<UserId>,
        start_date: Option<NaiveDate>,
        due_date: Option<NaiveDate>,
        dependencies: Vec<TaskDependency>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title: title.into(),
            assignee,
            status: TaskStatus::NotStarted,
            start_date,
            due_date,
            dependencies,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee(&self) -> Option<UserId> {
        self.assignee
    }

    /// Returns the task lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the scheduled start date, if any.
    #[must_use]
    pub const fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    /// Returns the scheduled due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the task's dependencies in declaration order.
    #[must_use]
    pub fn dependencies(&self) -> &[TaskDependency] {
        &self.dependencies
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Renames the task.
    pub fn rename(&mut self, title: impl Into<String>, clock: &impl Clock) {
        self.title = title.into();
        self.touch(clock);
    }

    /// Assigns or unassigns the task.
    pub fn assign(&mut self, assignee: Option<UserId>, clock: &impl Clock) {
        self.assignee = assignee;
        self.touch(clock);
    }

    /// Moves the task to a new status.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTaskStatusTransition`] when the
    /// move is not permitted from the current status.
    pub fn transition_to(
        &mut self,
        target: TaskStatus,
        clock: &impl Clock,
    ) -> Result<(), ValidationError> {
        if !self.status.can_transition_to(target) {
            return Err(ValidationError::InvalidTaskStatusTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.touch(clock);
        Ok(())
    }

    /// Replaces the scheduled dates after external validation.
    pub(crate) fn set_schedule(
        &mut self,
        start_date: Option<NaiveDate>,
        due_date: Option<NaiveDate>,
        clock: &impl Clock,
    ) {
        self.start_date = start_date;
        self.due_date = due_date;
        self.touch(clock);
    }

    /// Replaces the dependency set wholesale after external validation.
    pub(crate) fn replace_dependencies(
        &mut self,
        dependencies: Vec<TaskDependency>,
        clock: &impl Clock,
    ) {
        self.dependencies = dependencies;
        self.touch(clock);
    }

    /// Clamps the due date down to `limit`, dragging the start date along
    /// only when the clamp would otherwise leave it after the due date.
    ///
    /// Returns whether anything changed. This is silent schedule repair for
    /// a tightened ancestor bound, never an error.
    pub(crate) fn clamp_to(&mut self, limit: NaiveDate, clock: &impl Clock) -> bool {
        let Some(due) = self.due_date else {
            return false;
        };
        if due <= limit {
            return false;
        }
        self.due_date = Some(limit);
        if self.start_date.is_some_and(|start| start > limit) {
            self.start_date = Some(limit);
        }
        self.touch(clock);
        true
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
