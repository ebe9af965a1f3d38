//! Unit tests for the deadline constraint engine.

use super::support::{date, issue_with_deadline, push_phase, push_task};
use crate::workflow::domain::{
    PhaseStatus, TaskDependency, ValidationError, WorkflowError, schedule,
};
use eyre::{ensure, eyre};
use mockable::DefaultClock;
use rstest::rstest;

#[rstest]
#[case(None, None)]
#[case(None, Some(date(2025, 3, 18)))]
#[case(Some(date(2025, 3, 20)), None)]
#[case(Some(date(2025, 3, 20)), Some(date(2025, 3, 20)))]
#[case(Some(date(2025, 3, 20)), Some(date(2025, 3, 18)))]
fn phase_deadline_within_issue_accepts_compatible_bounds(
    #[case] issue_deadline: Option<chrono::NaiveDate>,
    #[case] candidate: Option<chrono::NaiveDate>,
) {
    let issue = issue_with_deadline(issue_deadline);
    assert_eq!(
        schedule::ensure_phase_deadline_within_issue(&issue, candidate),
        Ok(())
    );
}

#[rstest]
fn phase_deadline_beyond_issue_deadline_is_rejected() {
    let issue = issue_with_deadline(Some(date(2025, 3, 20)));
    let result = schedule::ensure_phase_deadline_within_issue(&issue, Some(date(2025, 3, 21)));
    assert_eq!(
        result,
        Err(ValidationError::PhaseDeadlineExceedsIssue {
            candidate: date(2025, 3, 21),
            issue_deadline: date(2025, 3, 20),
        })
    );
}

/// Tightening the issue deadline repairs the whole subtree: the phase
/// deadline clamps to the new bound, the task due date follows, and the
/// task start date stays put because it still precedes the clamped due.
#[rstest]
fn tightened_issue_deadline_cascades_to_phase_and_task() -> eyre::Result<()> {
    let clock = DefaultClock;
    let mut issue = issue_with_deadline(Some(date(2025, 3, 20)));
    let phase_id = push_phase(
        &mut issue,
        "Development",
        None,
        PhaseStatus::InProgress,
        Some(date(2025, 3, 18)),
    );
    let task_id = push_task(
        &mut issue,
        phase_id,
        "Wire the backend",
        Some(date(2025, 3, 15)),
        Some(date(2025, 3, 19)),
        Vec::new(),
    );

    issue.set_deadline(Some(date(2025, 3, 16)), &clock);
    schedule::apply_issue_deadline_constraints(&mut issue, &clock);

    let phase = issue.phase(phase_id).ok_or_else(|| eyre!("phase missing"))?;
    ensure!(phase.deadline() == Some(date(2025, 3, 16)));
    let (_, task) = issue
        .find_task(task_id)
        .ok_or_else(|| eyre!("task missing"))?;
    ensure!(task.due_date() == Some(date(2025, 3, 16)));
    ensure!(task.start_date() == Some(date(2025, 3, 15)));
    Ok(())
}

#[rstest]
fn applying_constraints_twice_changes_nothing_more() {
    let clock = DefaultClock;
    let mut issue = issue_with_deadline(Some(date(2025, 3, 20)));
    let phase_id = push_phase(
        &mut issue,
        "Development",
        None,
        PhaseStatus::InProgress,
        Some(date(2025, 3, 18)),
    );
    push_task(
        &mut issue,
        phase_id,
        "Wire the backend",
        Some(date(2025, 3, 15)),
        Some(date(2025, 3, 19)),
        Vec::new(),
    );
    issue.set_deadline(Some(date(2025, 3, 16)), &clock);

    schedule::apply_issue_deadline_constraints(&mut issue, &clock);
    let after_first = issue.clone();
    schedule::apply_issue_deadline_constraints(&mut issue, &clock);

    assert_eq!(issue, after_first);
}

/// The start date is never clamped independently; it only follows the due
/// date down when the clamp would invert their order.
#[rstest]
fn start_date_follows_clamped_due_date_down() -> eyre::Result<()> {
    let clock = DefaultClock;
    let mut issue = issue_with_deadline(Some(date(2025, 3, 10)));
    let phase_id = push_phase(
        &mut issue,
        "Development",
        None,
        PhaseStatus::InProgress,
        None,
    );
    let task_id = push_task(
        &mut issue,
        phase_id,
        "Late task",
        Some(date(2025, 3, 18)),
        Some(date(2025, 3, 19)),
        Vec::new(),
    );

    schedule::apply_issue_deadline_constraints(&mut issue, &clock);

    let (_, task) = issue
        .find_task(task_id)
        .ok_or_else(|| eyre!("task missing"))?;
    ensure!(task.due_date() == Some(date(2025, 3, 10)));
    ensure!(task.start_date() == Some(date(2025, 3, 10)));
    Ok(())
}

#[rstest]
fn clamp_is_a_no_op_without_any_bound() -> eyre::Result<()> {
    let clock = DefaultClock;
    let mut issue = issue_with_deadline(None);
    let phase_id = push_phase(
        &mut issue,
        "Development",
        None,
        PhaseStatus::InProgress,
        None,
    );
    let task_id = push_task(
        &mut issue,
        phase_id,
        "Unbounded task",
        Some(date(2025, 3, 15)),
        Some(date(2025, 3, 19)),
        Vec::new(),
    );

    schedule::apply_issue_deadline_constraints(&mut issue, &clock);

    let (_, task) = issue
        .find_task(task_id)
        .ok_or_else(|| eyre!("task missing"))?;
    ensure!(task.due_date() == Some(date(2025, 3, 19)));
    ensure!(task.start_date() == Some(date(2025, 3, 15)));
    Ok(())
}

#[rstest]
fn task_start_after_due_is_rejected() {
    let mut issue = issue_with_deadline(None);
    let phase_id = push_phase(
        &mut issue,
        "Development",
        None,
        PhaseStatus::NotStarted,
        None,
    );
    let phase = issue
        .phase(phase_id)
        .map(Clone::clone)
        .expect("phase should exist");

    let result = schedule::validate_task_dates(
        &issue,
        &phase,
        Some(date(2025, 3, 12)),
        Some(date(2025, 3, 11)),
        &[],
    );

    assert_eq!(
        result,
        Err(WorkflowError::Validation(ValidationError::StartAfterDue {
            start: date(2025, 3, 12),
            due: date(2025, 3, 11),
        }))
    );
}

#[rstest]
fn task_due_beyond_tightest_ancestor_bound_is_rejected() {
    let mut issue = issue_with_deadline(Some(date(2025, 3, 20)));
    let phase_id = push_phase(
        &mut issue,
        "Development",
        None,
        PhaseStatus::NotStarted,
        Some(date(2025, 3, 18)),
    );
    let phase = issue
        .phase(phase_id)
        .map(Clone::clone)
        .expect("phase should exist");

    let result =
        schedule::validate_task_dates(&issue, &phase, None, Some(date(2025, 3, 19)), &[]);

    assert_eq!(
        result,
        Err(WorkflowError::Validation(
            ValidationError::DueExceedsLimit {
                due: date(2025, 3, 19),
                limit: date(2025, 3, 18),
            }
        ))
    );
}

/// Task B may not start before task A's resolved finish date.
#[rstest]
fn task_start_before_dependency_finish_is_rejected() {
    let mut issue = issue_with_deadline(None);
    let phase_id = push_phase(
        &mut issue,
        "Development",
        None,
        PhaseStatus::NotStarted,
        None,
    );
    let blocker_id = push_task(
        &mut issue,
        phase_id,
        "Task A",
        None,
        Some(date(2025, 3, 10)),
        Vec::new(),
    );
    let phase = issue
        .phase(phase_id)
        .map(Clone::clone)
        .expect("phase should exist");
    let dependency = TaskDependency::Task(blocker_id);

    let result = schedule::validate_task_dates(
        &issue,
        &phase,
        Some(date(2025, 3, 5)),
        None,
        &[dependency],
    );

    assert_eq!(
        result,
        Err(WorkflowError::Validation(
            ValidationError::StartPrecedesDependencyFinish {
                start: date(2025, 3, 5),
                finish: date(2025, 3, 10),
                dependency,
            }
        ))
    );
}

#[rstest]
fn unconstrained_dependency_allows_any_start() {
    let mut issue = issue_with_deadline(None);
    let phase_id = push_phase(
        &mut issue,
        "Development",
        None,
        PhaseStatus::NotStarted,
        None,
    );
    let blocker_id = push_task(&mut issue, phase_id, "Task A", None, None, Vec::new());
    let phase = issue
        .phase(phase_id)
        .map(Clone::clone)
        .expect("phase should exist");

    let result = schedule::validate_task_dates(
        &issue,
        &phase,
        Some(date(2025, 3, 5)),
        None,
        &[TaskDependency::Task(blocker_id)],
    );

    assert_eq!(result, Ok(()));
}
