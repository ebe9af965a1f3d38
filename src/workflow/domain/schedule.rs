//! Deadline constraint engine.
//!
//! Keeps the issue → phase → task date hierarchy consistent. Two distinct
//! postures apply: a value the caller is directly setting that would break
//! a bound is rejected with a [`ValidationError`], while descendants left
//! stale by a tightened ancestor bound are silently clamped down. Clamping
//! is an expected consequence of hierarchy, not a user error.

use super::dependency::{TaskDependency, resolve_dependency_finish_date};
use super::error::{ValidationError, WorkflowError};
use super::issue::Issue;
use super::phase::Phase;
use chrono::NaiveDate;
use mockable::Clock;

/// Computes the tightest of two optional bounds, ignoring absent ones.
#[must_use]
pub fn schedule_limit(first: Option<NaiveDate>, second: Option<NaiveDate>) -> Option<NaiveDate> {
    match (first, second) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (only, None) => only,
        (None, only) => only,
    }
}

/// Checks a candidate phase deadline against the issue deadline.
///
/// Pure check, no mutation. Absent bounds never conflict.
///
/// # Errors
///
/// Returns [`ValidationError::PhaseDeadlineExceedsIssue`] when both dates
/// are set and the candidate is later.
pub fn ensure_phase_deadline_within_issue(
    issue: &Issue,
    candidate: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if let (Some(candidate_date), Some(issue_deadline)) = (candidate, issue.deadline())
        && candidate_date > issue_deadline
    {
        return Err(ValidationError::PhaseDeadlineExceedsIssue {
            candidate: candidate_date,
            issue_deadline,
        });
    }
    Ok(())
}

/// Cascades a tightened issue deadline down through phases and tasks.
///
/// Every phase deadline now exceeding the issue deadline is clamped to it,
/// and every task in each phase is clamped against the resulting bound.
/// This is a cascading write that repairs previously valid schedules; it
/// never fails, and applying it twice yields the same graph as once.
pub fn apply_issue_deadline_constraints(issue: &mut Issue, clock: &impl Clock) {
    let issue_deadline = issue.deadline();
    for phase in issue.phases_mut() {
        if let Some(limit) = issue_deadline {
            phase.clamp_deadline_to(limit, clock);
        }
        clamp_task_deadlines(issue_deadline, phase, clock);
    }
}

/// Clamps every task in a phase against `min(issue, phase)` deadlines.
///
/// A task due date past the limit moves down to it; the start date follows
/// only when the clamped due date would otherwise precede it, so start
/// dates are never clamped independently. No-op when neither bound is set.
pub fn clamp_task_deadlines(
    issue_deadline: Option<NaiveDate>,
    phase: &mut Phase,
    clock: &impl Clock,
) {
    let Some(limit) = schedule_limit(issue_deadline, phase.deadline()) else {
        return;
    };
    for task in phase.tasks_mut() {
        task.clamp_to(limit, clock);
    }
}

/// Validates candidate task dates against the issue graph.
///
/// Used on task creation and on task update, always against the effective
/// post-update values rather than the stored ones. Pure check, no mutation.
///
/// # Errors
///
/// Returns [`ValidationError::StartAfterDue`] when the start date is after
/// the due date, [`ValidationError::DueExceedsLimit`] when the due date
/// exceeds the tightest ancestor deadline, and
/// [`ValidationError::StartPrecedesDependencyFinish`] when the start date
/// precedes the resolved finish date of any dependency. Dependency
/// resolution surfaces [`super::error::NotFoundError`] for unknown targets.
pub fn validate_task_dates(
    issue: &Issue,
    phase: &Phase,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    dependencies: &[TaskDependency],
) -> Result<(), WorkflowError> {
    if let (Some(start), Some(due)) = (start_date, due_date)
        && start > due
    {
        return Err(ValidationError::StartAfterDue { start, due }.into());
    }
    if let (Some(due), Some(limit)) = (
        due_date,
        schedule_limit(issue.deadline(), phase.deadline()),
    ) && due > limit
    {
        return Err(ValidationError::DueExceedsLimit { due, limit }.into());
    }
    if let Some(start) = start_date {
        for dependency in dependencies {
            let resolved = resolve_dependency_finish_date(issue, *dependency)?;
            if let Some(finish) = resolved
                && start < finish
            {
                return Err(ValidationError::StartPrecedesDependencyFinish {
                    start,
                    finish,
                    dependency: *dependency,
                }
                .into());
            }
        }
    }
    Ok(())
}
