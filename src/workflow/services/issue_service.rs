//! Write-side issue service.
//!
//! Every mutating operation follows the same control flow: load the issue
//! graph, apply the structural change, re-establish schedule and dependency
//! consistency, re-derive the issue status, and persist. Activity recording
//! happens after a successful save and is best-effort throughout.

use crate::workflow::domain::{
    ActivityKind, Issue, IssueId, NotFoundError, Phase, PhaseId, PhaseKind, ProjectId, Task,
    TaskDependency, TaskId, TaskStatus, UserId, ValidationError, WorkflowError, diff_dependencies,
    schedule, status,
};
use crate::workflow::ports::{
    ActivityRecorder, IssueDirectory, IssueRepository, IssueRepositoryError,
};
use crate::workflow::services::changes::DependencyChangeTracker;
use chrono::NaiveDate;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Service-level errors for workflow mutations.
#[derive(Debug, Error)]
pub enum WorkflowServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// A referenced entity was not found.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    /// Persistence failed.
    #[error(transparent)]
    Repository(#[from] IssueRepositoryError),
}

impl From<WorkflowError> for WorkflowServiceError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(inner) => Self::Validation(inner),
            WorkflowError::NotFound(inner) => Self::NotFound(inner),
        }
    }
}

/// Result type for workflow service operations.
pub type WorkflowServiceResult<T> = Result<T, WorkflowServiceError>;

/// Seed describing one phase at issue-creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSeed {
    name: String,
    assignee: Option<UserId>,
    kind: Option<PhaseKind>,
    deadline: Option<NaiveDate>,
}

impl PhaseSeed {
    /// Creates a phase seed with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assignee: None,
            kind: None,
            deadline: None,
        }
    }

    /// Sets the phase assignee; defaults to the issue owner when unset.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the phase kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: PhaseKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the phase deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Request payload for creating an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIssueRequest {
    title: String,
    description: String,
    owner: UserId,
    project: Option<ProjectId>,
    deadline: Option<NaiveDate>,
    phases: Vec<PhaseSeed>,
}

impl CreateIssueRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, owner: UserId) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            owner,
            project: None,
            deadline: None,
            phases: Vec::new(),
        }
    }

    /// Sets the issue description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the owning project.
    #[must_use]
    pub const fn with_project(mut self, project: ProjectId) -> Self {
        self.project = Some(project);
        self
    }

    /// Sets the issue deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Appends a phase seed.
    #[must_use]
    pub fn with_phase(mut self, phase: PhaseSeed) -> Self {
        self.phases.push(phase);
        self
    }
}

/// Request payload for adding a phase to an existing issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPhaseRequest {
    name: String,
    assignee: UserId,
    kind: Option<PhaseKind>,
    deadline: Option<NaiveDate>,
}

impl AddPhaseRequest {
    /// Creates a request with required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, assignee: UserId) -> Self {
        Self {
            name: name.into(),
            assignee,
            kind: None,
            deadline: None,
        }
    }

    /// Sets the phase kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: PhaseKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Sets the phase deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Request payload for adding a task to a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTaskRequest {
    title: String,
    assignee: Option<UserId>,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    dependencies: Vec<TaskDependency>,
}

impl AddTaskRequest {
    /// Creates a request with the task title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            assignee: None,
            start_date: None,
            due_date: None,
            dependencies: Vec::new(),
        }
    }

    /// Sets the task assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: UserId) -> Self {
        self.assignee = Some(assignee);
        self
    }

    /// Sets the scheduled start date.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Sets the scheduled due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Sets the initial dependency set.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = TaskDependency>) -> Self {
        self.dependencies = dependencies.into_iter().collect();
        self
    }
}

/// Partial update for an existing task; unset fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    title: Option<String>,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    dependencies: Option<Vec<TaskDependency>>,
}

impl TaskUpdate {
    /// Creates an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the task title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the scheduled start date.
    #[must_use]
    pub const fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Replaces the scheduled due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Replaces the dependency set wholesale.
    #[must_use]
    pub fn with_dependencies(
        mut self,
        dependencies: impl IntoIterator<Item = TaskDependency>,
    ) -> Self {
        self.dependencies = Some(dependencies.into_iter().collect());
        self
    }
}

/// Write-side orchestration over the workflow consistency engine.
#[derive(Clone)]
pub struct WorkflowService<R, D, A, C>
where
    R: IssueRepository,
    D: IssueDirectory,
    A: ActivityRecorder,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    tracker: DependencyChangeTracker<D, A>,
    recorder: Arc<A>,
    clock: Arc<C>,
}

impl<R, D, A, C> WorkflowService<R, D, A, C>
where
    R: IssueRepository,
    D: IssueDirectory,
    A: ActivityRecorder,
    C: Clock + Send + Sync,
{
    /// Creates a new workflow service over the given collaborators.
    #[must_use]
    pub fn new(repository: Arc<R>, directory: Arc<D>, recorder: Arc<A>, clock: Arc<C>) -> Self {
        Self {
            repository,
            tracker: DependencyChangeTracker::new(directory, Arc::clone(&recorder)),
            recorder,
            clock,
        }
    }

    /// Creates an issue, defaulting to a single development phase when no
    /// phases are supplied.
    ///
    /// # Errors
    ///
    /// Returns a validation error when a seeded phase deadline exceeds the
    /// issue deadline, or a repository error when persistence fails.
    pub async fn create_issue(
        &self,
        request: CreateIssueRequest,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = Issue::new(
            request.title,
            request.description,
            request.owner,
            request.project,
            request.deadline,
            &*self.clock,
        );
        let seeds = if request.phases.is_empty() {
            vec![
                PhaseSeed::new("Development")
                    .with_assignee(request.owner)
                    .with_kind(PhaseKind::Development),
            ]
        } else {
            request.phases
        };
        for seed in seeds {
            schedule::ensure_phase_deadline_within_issue(&issue, seed.deadline)?;
            let assignee = seed.assignee.unwrap_or(request.owner);
            let phase = Phase::new(seed.name, assignee, seed.kind, seed.deadline, &*self.clock);
            issue.add_phase(phase, &*self.clock);
        }
        issue.refresh_status(&*self.clock);
        self.repository.save(&issue).await?;
        Ok(issue)
    }

    /// Adds a phase to an existing issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the candidate deadline exceeds the
    /// issue deadline, a not-found error for an unknown issue, or a
    /// repository error when persistence fails.
    pub async fn add_phase(
        &self,
        issue_id: IssueId,
        request: AddPhaseRequest,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        schedule::ensure_phase_deadline_within_issue(&issue, request.deadline)?;
        let phase = Phase::new(
            request.name,
            request.assignee,
            request.kind,
            request.deadline,
            &*self.clock,
        );
        let phase_name = phase.name().to_owned();
        issue.add_phase(phase, &*self.clock);
        issue.refresh_status(&*self.clock);
        self.repository.save(&issue).await?;
        self.record(
            issue_id,
            ActivityKind::PhaseAdded,
            &format!("phase '{phase_name}' added"),
        )
        .await;
        Ok(issue)
    }

    /// Replaces the issue deadline, cascading clamps to any phase or task
    /// schedule the new bound leaves stale.
    ///
    /// Tightening never rejects descendants; they are silently repaired.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown issue or a repository error
    /// when persistence fails.
    pub async fn set_issue_deadline(
        &self,
        issue_id: IssueId,
        deadline: Option<NaiveDate>,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        issue.set_deadline(deadline, &*self.clock);
        schedule::apply_issue_deadline_constraints(&mut issue, &*self.clock);
        self.repository.save(&issue).await?;
        Ok(issue)
    }

    /// Replaces a phase deadline, clamping the phase's tasks to the new
    /// bound.
    ///
    /// The directly-set value is validated against the issue deadline;
    /// task schedules left stale by a tightened bound are repaired.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the candidate exceeds the issue
    /// deadline, a not-found error for an unknown issue or phase, or a
    /// repository error when persistence fails.
    pub async fn set_phase_deadline(
        &self,
        issue_id: IssueId,
        phase_id: PhaseId,
        deadline: Option<NaiveDate>,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        schedule::ensure_phase_deadline_within_issue(&issue, deadline)?;
        let issue_deadline = issue.deadline();
        let phase = issue
            .phase_mut(phase_id)
            .ok_or(NotFoundError::Phase(phase_id))?;
        phase.set_deadline(deadline, &*self.clock);
        schedule::clamp_task_deadlines(issue_deadline, phase, &*self.clock);
        self.repository.save(&issue).await?;
        Ok(issue)
    }

    /// Adds a task to a phase after validating its dates and dependencies.
    ///
    /// # Errors
    ///
    /// Returns a validation error for date or dependency violations, a
    /// not-found error for an unknown issue, phase, or dependency target,
    /// or a repository error when persistence fails.
    pub async fn add_task(
        &self,
        issue_id: IssueId,
        phase_id: PhaseId,
        request: AddTaskRequest,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        let phase = issue
            .phase(phase_id)
            .ok_or(NotFoundError::Phase(phase_id))?;
        schedule::validate_task_dates(
            &issue,
            phase,
            request.start_date,
            request.due_date,
            &request.dependencies,
        )?;
        let task = Task::new(
            request.title,
            request.assignee,
            request.start_date,
            request.due_date,
            request.dependencies.clone(),
            &*self.clock,
        );
        let task_id = task.id();
        let task_title = task.title().to_owned();
        let target_phase = issue
            .phase_mut(phase_id)
            .ok_or(NotFoundError::Phase(phase_id))?;
        target_phase.add_task(task, &*self.clock);
        issue.refresh_status(&*self.clock);
        self.repository.save(&issue).await?;
        self.record(
            issue_id,
            ActivityKind::TaskAdded,
            &format!("task '{task_title}' added"),
        )
        .await;
        let diff = diff_dependencies(&[], &request.dependencies);
        if !diff.is_empty()
            && let Some((_, stored_task)) = issue.find_task(task_id)
        {
            self.tracker
                .record_dependency_changes(&issue, stored_task, &diff)
                .await;
        }
        Ok(issue)
    }

    /// Applies a partial update to a task, validating the effective
    /// post-update dates and dependencies before anything is stored.
    ///
    /// A wholesale dependency replacement produces exactly one notification
    /// per logical add or remove, however many entries changed.
    ///
    /// # Errors
    ///
    /// Returns a validation error for date or dependency violations, a
    /// not-found error for an unknown issue, task, or dependency target,
    /// or a repository error when persistence fails.
    pub async fn update_task(
        &self,
        issue_id: IssueId,
        task_id: TaskId,
        update: TaskUpdate,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        let (phase, task) = issue
            .find_task(task_id)
            .ok_or(NotFoundError::Task(task_id))?;
        let effective_start = update.start_date.or_else(|| task.start_date());
        let effective_due = update.due_date.or_else(|| task.due_date());
        let effective_dependencies = update
            .dependencies
            .clone()
            .unwrap_or_else(|| task.dependencies().to_vec());
        let previous_dependencies = task.dependencies().to_vec();
        schedule::validate_task_dates(
            &issue,
            phase,
            effective_start,
            effective_due,
            &effective_dependencies,
        )?;
        let task_record = issue
            .find_task_mut(task_id)
            .ok_or(NotFoundError::Task(task_id))?;
        if let Some(title) = update.title {
            task_record.rename(title, &*self.clock);
        }
        task_record.set_schedule(effective_start, effective_due, &*self.clock);
        task_record.replace_dependencies(effective_dependencies.clone(), &*self.clock);
        issue.refresh_status(&*self.clock);
        self.repository.save(&issue).await?;
        let diff = diff_dependencies(&previous_dependencies, &effective_dependencies);
        if !diff.is_empty()
            && let Some((_, stored_task)) = issue.find_task(task_id)
        {
            self.tracker
                .record_dependency_changes(&issue, stored_task, &diff)
                .await;
        }
        Ok(issue)
    }

    /// Moves a task to a new status.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the move is not permitted, a
    /// not-found error for an unknown issue or task, or a repository error
    /// when persistence fails.
    pub async fn update_task_status(
        &self,
        issue_id: IssueId,
        task_id: TaskId,
        target: TaskStatus,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        let task = issue
            .find_task_mut(task_id)
            .ok_or(NotFoundError::Task(task_id))?;
        task.transition_to(target, &*self.clock)?;
        let task_title = task.title().to_owned();
        issue.refresh_status(&*self.clock);
        self.repository.save(&issue).await?;
        self.record(
            issue_id,
            ActivityKind::TaskStatusChanged,
            &format!("task '{task_title}' moved to {target}"),
        )
        .await;
        Ok(issue)
    }

    /// Assigns or unassigns a task.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown issue or task, or a
    /// repository error when persistence fails.
    pub async fn assign_task(
        &self,
        issue_id: IssueId,
        task_id: TaskId,
        assignee: Option<UserId>,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        let task = issue
            .find_task_mut(task_id)
            .ok_or(NotFoundError::Task(task_id))?;
        task.assign(assignee, &*self.clock);
        let task_title = task.title().to_owned();
        self.repository.save(&issue).await?;
        let summary = assignee.map_or_else(
            || format!("task '{task_title}' unassigned"),
            |user| format!("task '{task_title}' assigned to {user}"),
        );
        self.record(issue_id, ActivityKind::TaskAssigned, &summary)
            .await;
        Ok(issue)
    }

    /// Starts work on a phase and re-derives the issue status.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the phase is not in the not-started
    /// status, a not-found error for an unknown issue or phase, or a
    /// repository error when persistence fails.
    pub async fn start_phase(
        &self,
        issue_id: IssueId,
        phase_id: PhaseId,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        let phase = issue
            .phase_mut(phase_id)
            .ok_or(NotFoundError::Phase(phase_id))?;
        phase.start(&*self.clock)?;
        let phase_name = phase.name().to_owned();
        issue.refresh_status(&*self.clock);
        self.repository.save(&issue).await?;
        self.record(
            issue_id,
            ActivityKind::PhaseStarted,
            &format!("phase '{phase_name}' started"),
        )
        .await;
        Ok(issue)
    }

    /// Completes a phase with a mandatory comment and optional artifact.
    ///
    /// # Errors
    ///
    /// Returns a validation error when tasks are unfinished or the comment
    /// is blank, a not-found error for an unknown issue or phase, or a
    /// repository error when persistence fails.
    pub async fn complete_phase(
        &self,
        issue_id: IssueId,
        phase_id: PhaseId,
        comment: impl Into<String> + Send,
        artifact: Option<String>,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        let phase = issue
            .phase_mut(phase_id)
            .ok_or(NotFoundError::Phase(phase_id))?;
        phase.complete(comment, artifact, &*self.clock)?;
        let phase_name = phase.name().to_owned();
        issue.refresh_status(&*self.clock);
        self.repository.save(&issue).await?;
        self.record(
            issue_id,
            ActivityKind::PhaseCompleted,
            &format!("phase '{phase_name}' completed"),
        )
        .await;
        Ok(issue)
    }

    /// Marks a phase failed and re-derives the issue status.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the phase is already terminal, a
    /// not-found error for an unknown issue or phase, or a repository error
    /// when persistence fails.
    pub async fn fail_phase(
        &self,
        issue_id: IssueId,
        phase_id: PhaseId,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        status::fail_phase(&mut issue, phase_id, &*self.clock)?;
        self.repository.save(&issue).await?;
        self.record(issue_id, ActivityKind::PhaseFailed, "phase marked failed")
            .await;
        Ok(issue)
    }

    /// Reopens a failed or done phase and re-derives the issue status.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the phase is neither failed nor
    /// done, a not-found error for an unknown issue or phase, or a
    /// repository error when persistence fails.
    pub async fn reopen_phase(
        &self,
        issue_id: IssueId,
        phase_id: PhaseId,
    ) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        status::reopen_phase(&mut issue, phase_id, &*self.clock)?;
        self.repository.save(&issue).await?;
        self.record(issue_id, ActivityKind::PhaseReopened, "phase reopened")
            .await;
        Ok(issue)
    }

    /// Explicitly closes an issue.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless every phase is done and the
    /// required kind set is present, a not-found error for an unknown
    /// issue, or a repository error when persistence fails.
    pub async fn close_issue(&self, issue_id: IssueId) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        status::close(&mut issue, &*self.clock)?;
        self.repository.save(&issue).await?;
        self.record(issue_id, ActivityKind::IssueClosed, "issue closed")
            .await;
        Ok(issue)
    }

    /// Abandons an issue, failing every phase that is not already done.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown issue or a repository error
    /// when persistence fails.
    pub async fn abandon_issue(&self, issue_id: IssueId) -> WorkflowServiceResult<Issue> {
        let mut issue = self.repository.load(issue_id).await?;
        status::abandon(&mut issue, &*self.clock);
        self.repository.save(&issue).await?;
        self.record(issue_id, ActivityKind::IssueAbandoned, "issue abandoned")
            .await;
        Ok(issue)
    }

    /// Best-effort activity append; failures are logged and swallowed.
    async fn record(&self, issue_id: IssueId, kind: ActivityKind, summary: &str) {
        if let Err(err) = self.recorder.record(issue_id, kind, summary).await {
            warn!(%issue_id, %kind, error = %err, "activity append failed");
        }
    }
}
