//! Shared builders for workflow engine tests.

use crate::workflow::domain::{
    Issue, Phase, PhaseKind, PhaseStatus, Task, TaskDependency, TaskId, UserId,
};
use chrono::NaiveDate;
use mockable::DefaultClock;

/// Builds a date from literals known to be valid.
pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Builds an issue with the given deadline and no phases.
pub(crate) fn issue_with_deadline(deadline: Option<NaiveDate>) -> Issue {
    Issue::new(
        "Ship the widget",
        "End-to-end widget delivery",
        UserId::new(),
        None,
        deadline,
        &DefaultClock,
    )
}

/// Appends a phase in the requested status, returning its identifier.
///
/// The phase is driven through its real transitions so the resulting graph
/// is reachable, not fabricated.
pub(crate) fn push_phase(
    issue: &mut Issue,
    name: &str,
    kind: Option<PhaseKind>,
    status: PhaseStatus,
    deadline: Option<NaiveDate>,
) -> crate::workflow::domain::PhaseId {
    let clock = DefaultClock;
    let mut phase = Phase::new(name, issue.owner(), kind, deadline, &clock);
    match status {
        PhaseStatus::NotStarted => {}
        PhaseStatus::InProgress => phase.start(&clock).expect("phase should start"),
        PhaseStatus::Done => phase
            .complete("work finished", None, &clock)
            .expect("phase should complete"),
        PhaseStatus::Failed => phase.fail(&clock).expect("phase should fail"),
    }
    let phase_id = phase.id();
    issue.add_phase(phase, &clock);
    phase_id
}

/// Appends a task with the given schedule to a phase, returning its id.
pub(crate) fn push_task(
    issue: &mut Issue,
    phase_id: crate::workflow::domain::PhaseId,
    title: &str,
    start_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    dependencies: Vec<TaskDependency>,
) -> TaskId {
    let clock = DefaultClock;
    let task = Task::new(title, None, start_date, due_date, dependencies, &clock);
    let task_id = task.id();
    issue
        .phase_mut(phase_id)
        .expect("phase should exist")
        .add_task(task, &clock);
    task_id
}
