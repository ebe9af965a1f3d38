//! Phase entity, phase kinds, and phase status guards.

use super::error::{ParseVariantError, ValidationError};
use super::ids::{PhaseId, TaskId, UserId};
use super::task::{Task, TaskStatus};
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// The phase has not begun.
    NotStarted,
    /// The phase is under way.
    InProgress,
    /// The phase failed or was abandoned.
    Failed,
    /// The phase completed with a recorded comment.
    Done,
}

impl PhaseStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Failed => "failed",
            Self::Done => "done",
        }
    }
}

impl TryFrom<&str> for PhaseStatus {
    type Error = ParseVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "not_started" => Ok(Self::NotStarted),
            "in_progress" => Ok(Self::InProgress),
            "failed" => Ok(Self::Failed),
            "done" => Ok(Self::Done),
            _ => Err(ParseVariantError {
                kind: "phase status",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Kind of work a phase represents.
///
/// Kinds are optional on a phase; when present they drive issue status
/// derivation and the closeability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Investigating the problem.
    Investigation,
    /// Proposing a solution approach.
    ProposeSolution,
    /// Building the solution.
    Development,
    /// Verifying the solution against acceptance criteria.
    AcceptanceTest,
    /// Rolling the solution out.
    Rollout,
}

/// Phase kinds that must all be represented before an issue may close.
pub const REQUIRED_KINDS: [PhaseKind; 4] = [
    PhaseKind::Investigation,
    PhaseKind::Development,
    PhaseKind::AcceptanceTest,
    PhaseKind::Rollout,
];

impl PhaseKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Investigation => "investigation",
            Self::ProposeSolution => "propose_solution",
            Self::Development => "development",
            Self::AcceptanceTest => "acceptance_test",
            Self::Rollout => "rollout",
        }
    }
}

impl TryFrom<&str> for PhaseKind {
    type Error = ParseVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "investigation" => Ok(Self::Investigation),
            "propose_solution" => Ok(Self::ProposeSolution),
            "development" => Ok(Self::Development),
            "acceptance_test" => Ok(Self::AcceptanceTest),
            "rollout" => Ok(Self::Rollout),
            _ => Err(ParseVariantError {
                kind: "phase kind",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named stage of an issue holding an ordered collection of tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    id: PhaseId,
    name: String,
    assignee: UserId,
    status: PhaseStatus,
    kind: Option<PhaseKind>,
    deadline: Option<NaiveDate>,
    completion_comment: Option<String>,
    completion_artifact: Option<String>,
    tasks: Vec<Task>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Phase {
    /// Creates a new phase in the not-started status.
    ///
    /// The deadline is expected to have been validated against the owning
    /// issue before construction.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        assignee: UserId,
        kind: Option<PhaseKind>,
        deadline: Option<NaiveDate>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: PhaseId::new(),
            name: name.into(),
            assignee,
            status: PhaseStatus::NotStarted,
            kind,
            deadline,
            completion_comment: None,
            completion_artifact: None,
            tasks: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the phase identifier.
    #[must_use]
    pub const fn id(&self) -> PhaseId {
        self.id
    }

    /// Returns the phase name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the phase assignee.
    #[must_use]
    pub const fn assignee(&self) -> UserId {
        self.assignee
    }

    /// Returns the phase lifecycle status.
    #[must_use]
    pub const fn status(&self) -> PhaseStatus {
        self.status
    }

    /// Returns the phase kind, if one was assigned.
    #[must_use]
    pub const fn kind(&self) -> Option<PhaseKind> {
        self.kind
    }

    /// Returns the phase deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    /// Returns the completion comment recorded when the phase was done.
    #[must_use]
    pub fn completion_comment(&self) -> Option<&str> {
        self.completion_comment.as_deref()
    }

    /// Returns the completion artifact reference, if any.
    #[must_use]
    pub fn completion_artifact(&self) -> Option<&str> {
        self.completion_artifact.as_deref()
    }

    /// Returns the phase's tasks in order.
    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
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

    /// Returns the task with the given identifier, if present.
    #[must_use]
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id() == task_id)
    }

    /// Returns a mutable handle to the task with the given identifier.
    pub(crate) fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id() == task_id)
    }

    /// Returns mutable handles to every task for schedule repair.
    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    /// Returns whether every task in the phase is done.
    ///
    /// Vacuously true for a phase without tasks.
    #[must_use]
    pub fn all_tasks_done(&self) -> bool {
        self.tasks.iter().all(|task| task.status() == TaskStatus::Done)
    }

    /// Appends a task, which must already have validated dates.
    pub(crate) fn add_task(&mut self, task: Task, clock: &impl Clock) {
        self.tasks.push(task);
        self.touch(clock);
    }

    /// Replaces the phase deadline after external validation.
    pub(crate) fn set_deadline(&mut self, deadline: Option<NaiveDate>, clock: &impl Clock) {
        self.deadline = deadline;
        self.touch(clock);
    }

    /// Clamps the phase deadline down to `limit`, returning whether it moved.
    pub(crate) fn clamp_deadline_to(&mut self, limit: NaiveDate, clock: &impl Clock) -> bool {
        if self.deadline.is_some_and(|deadline| deadline > limit) {
            self.deadline = Some(limit);
            self.touch(clock);
            return true;
        }
        false
    }

    /// Starts work on the phase.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPhaseStatusTransition`] unless the
    /// phase is not started.
    pub fn start(&mut self, clock: &impl Clock) -> Result<(), ValidationError> {
        if self.status != PhaseStatus::NotStarted {
            return Err(ValidationError::InvalidPhaseStatusTransition {
                from: self.status,
                to: PhaseStatus::InProgress,
            });
        }
        self.status = PhaseStatus::InProgress;
        self.touch(clock);
        Ok(())
    }

    /// Completes the phase, recording the mandatory comment and an optional
    /// artifact reference.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PhaseTasksIncomplete`] when any task is
    /// not done, [`ValidationError::BlankCompletionComment`] when the
    /// comment is blank, and
    /// [`ValidationError::InvalidPhaseStatusTransition`] when the phase is
    /// already done or failed.
    pub fn complete(
        &mut self,
        comment: impl Into<String>,
        artifact: Option<String>,
        clock: &impl Clock,
    ) -> Result<(), ValidationError> {
        if matches!(self.status, PhaseStatus::Done | PhaseStatus::Failed) {
            return Err(ValidationError::InvalidPhaseStatusTransition {
                from: self.status,
                to: PhaseStatus::Done,
            });
        }
        if !self.all_tasks_done() {
            return Err(ValidationError::PhaseTasksIncomplete(self.id));
        }
        let comment_text = comment.into();
        if comment_text.trim().is_empty() {
            return Err(ValidationError::BlankCompletionComment);
        }
        self.status = PhaseStatus::Done;
        self.completion_comment = Some(comment_text);
        self.completion_artifact = artifact;
        self.touch(clock);
        Ok(())
    }

    /// Marks the phase failed.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPhaseStatusTransition`] when the
    /// phase is already done or already failed.
    pub fn fail(&mut self, clock: &impl Clock) -> Result<(), ValidationError> {
        if matches!(self.status, PhaseStatus::Done | PhaseStatus::Failed) {
            return Err(ValidationError::InvalidPhaseStatusTransition {
                from: self.status,
                to: PhaseStatus::Failed,
            });
        }
        self.status = PhaseStatus::Failed;
        self.touch(clock);
        Ok(())
    }

    /// Forces the phase to failed without a transition guard.
    ///
    /// Used by issue abandonment, which fails every non-done phase
    /// regardless of its current status.
    pub(crate) fn force_fail(&mut self, clock: &impl Clock) {
        if self.status != PhaseStatus::Done {
            self.status = PhaseStatus::Failed;
            self.touch(clock);
        }
    }

    /// Returns a failed or done phase to in-progress.
    ///
    /// Completion fields are cleared so a later completion must supply
    /// fresh ones.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPhaseStatusTransition`] unless the
    /// phase is failed or done.
    pub fn reopen(&mut self, clock: &impl Clock) -> Result<(), ValidationError> {
        if !matches!(self.status, PhaseStatus::Failed | PhaseStatus::Done) {
            return Err(ValidationError::InvalidPhaseStatusTransition {
                from: self.status,
                to: PhaseStatus::InProgress,
            });
        }
        self.status = PhaseStatus::InProgress;
        self.completion_comment = None;
        self.completion_artifact = None;
        self.touch(clock);
        Ok(())
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
