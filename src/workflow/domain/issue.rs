//! Issue aggregate root and the derived issue status vocabulary.

use super::dependency::TaskDependency;
use super::error::ParseVariantError;
use super::ids::{IssueId, PhaseId, ProjectId, TaskId, UserId};
use super::phase::Phase;
use super::status::derive_issue_status;
use super::task::Task;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Derived issue-level status.
///
/// Never independently settable; always a pure function of the issue's
/// phases, recomputed after every phase or task mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    /// The issue exists but has no phases yet.
    Created,
    /// Phases exist but none is in progress.
    NotActive,
    /// Analysis work (investigation or solution proposal) is in progress.
    InAnalysis,
    /// Development work is in progress.
    InDevelopment,
    /// Acceptance testing is in progress.
    InTest,
    /// Rollout is in progress.
    InRollout,
    /// Every phase is done and the required kind set is represented.
    Done,
    /// At least one phase failed.
    Failed,
}

impl IssueStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::NotActive => "not_active",
            Self::InAnalysis => "in_analysis",
            Self::InDevelopment => "in_development",
            Self::InTest => "in_test",
            Self::InRollout => "in_rollout",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl TryFrom<&str> for IssueStatus {
    type Error = ParseVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "created" => Ok(Self::Created),
            "not_active" => Ok(Self::NotActive),
            "in_analysis" => Ok(Self::InAnalysis),
            "in_development" => Ok(Self::InDevelopment),
            "in_test" => Ok(Self::InTest),
            "in_rollout" => Ok(Self::InRollout),
            "done" => Ok(Self::Done),
            "failed" => Ok(Self::Failed),
            _ => Err(ParseVariantError {
                kind: "issue status",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Top-level unit of work with an owner, deadline, and ordered phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    id: IssueId,
    title: String,
    description: String,
    owner: UserId,
    project: Option<ProjectId>,
    status: IssueStatus,
    deadline: Option<NaiveDate>,
    phases: Vec<Phase>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Issue {
    /// Creates a new issue with no phases.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        owner: UserId,
        project: Option<ProjectId>,
        deadline: Option<NaiveDate>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: IssueId::new(),
            title: title.into(),
            description: description.into(),
            owner,
            project,
            status: IssueStatus::Created,
            deadline,
            phases: Vec::new(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Returns the issue identifier.
    #[must_use]
    pub const fn id(&self) -> IssueId {
        self.id
    }

    /// Returns the issue title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the issue description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the issue owner.
    #[must_use]
    pub const fn owner(&self) -> UserId {
        self.owner
    }

    /// Returns the owning project, if any.
    #[must_use]
    pub const fn project(&self) -> Option<ProjectId> {
        self.project
    }

    /// Returns the derived issue status.
    #[must_use]
    pub const fn status(&self) -> IssueStatus {
        self.status
    }

    /// Returns the issue deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    /// Returns the issue's phases in order.
    #[must_use]
    pub fn phases(&self) -> &[Phase] {
        &self.phases
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

    /// Returns the phase with the given identifier, if present.
    #[must_use]
    pub fn phase(&self, phase_id: PhaseId) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.id() == phase_id)
    }

    /// Returns a mutable handle to the phase with the given identifier.
    pub(crate) fn phase_mut(&mut self, phase_id: PhaseId) -> Option<&mut Phase> {
        self.phases.iter_mut().find(|phase| phase.id() == phase_id)
    }

    /// Returns mutable handles to every phase for schedule repair.
    pub(crate) fn phases_mut(&mut self) -> &mut [Phase] {
        &mut self.phases
    }

    /// Locates a task anywhere under the issue, with its owning phase.
    #[must_use]
    pub fn find_task(&self, task_id: TaskId) -> Option<(&Phase, &Task)> {
        self.phases
            .iter()
            .find_map(|phase| phase.task(task_id).map(|task| (phase, task)))
    }

    /// Locates a mutable task anywhere under the issue.
    pub(crate) fn find_task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.phases
            .iter_mut()
            .find_map(|phase| phase.task_mut(task_id))
    }

    /// Returns whether a dependency target lives under this issue.
    #[must_use]
    pub fn contains_target(&self, dependency: TaskDependency) -> bool {
        match dependency {
            TaskDependency::Task(task_id) => self.find_task(task_id).is_some(),
            TaskDependency::Phase(phase_id) => self.phase(phase_id).is_some(),
            TaskDependency::Issue(issue_id) => issue_id == self.id,
        }
    }

    /// Appends a phase whose deadline has already been validated.
    pub(crate) fn add_phase(&mut self, phase: Phase, clock: &impl Clock) {
        self.phases.push(phase);
        self.touch(clock);
    }

    /// Replaces the issue deadline.
    ///
    /// Tightening an existing schedule is repaired by the deadline
    /// constraint engine, not rejected here.
    pub(crate) fn set_deadline(&mut self, deadline: Option<NaiveDate>, clock: &impl Clock) {
        self.deadline = deadline;
        self.touch(clock);
    }

    /// Recomputes the derived status from the current phase set.
    pub(crate) fn refresh_status(&mut self, clock: &impl Clock) {
        let derived = derive_issue_status(self);
        if derived != self.status {
            self.status = derived;
            self.touch(clock);
        }
    }

    /// Overrides the status for the explicit abandon action on a
    /// phase-less issue.
    pub(crate) fn force_status(&mut self, status: IssueStatus, clock: &impl Clock) {
        self.status = status;
        self.touch(clock);
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
