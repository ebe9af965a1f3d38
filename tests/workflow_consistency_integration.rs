//! Behavioural integration tests for the workflow consistency engine.
//!
//! These tests drive the write-side service end to end against the
//! in-memory adapters, verifying that schedule clamps, dependency
//! notifications, and status derivation stay consistent across a realistic
//! issue lifecycle.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#![expect(
    clippy::indexing_slicing,
    reason = "Test code uses indexing after length checks"
)]
#![expect(
    clippy::cognitive_complexity,
    reason = "Test functions may have higher complexity for full scenario coverage"
)]
#![expect(
    clippy::shadow_unrelated,
    reason = "Test code reuses variable names for clarity in sequential assertions"
)]

use std::sync::Arc;

use caseflow::workflow::{
    adapters::memory::{InMemoryActivityLog, InMemoryIssueDirectory, InMemoryIssueRepository},
    domain::{
        ActivityKind, Issue, IssueStatus, PhaseKind, PhaseStatus, TaskDependency, TaskId,
        TaskStatus, ValidationError,
    },
    ports::IssueRepository,
    services::{
        AddTaskRequest, CreateIssueRequest, PhaseSeed, TaskUpdate, WorkflowService,
        WorkflowServiceError,
    },
};
use chrono::NaiveDate;
use mockable::DefaultClock;
use tokio::runtime::Runtime;

type Service = WorkflowService<
    InMemoryIssueRepository,
    InMemoryIssueDirectory,
    InMemoryActivityLog,
    DefaultClock,
>;

struct World {
    service: Service,
    repository: Arc<InMemoryIssueRepository>,
    directory: Arc<InMemoryIssueDirectory>,
    log: Arc<InMemoryActivityLog>,
}

fn world() -> World {
    let repository = Arc::new(InMemoryIssueRepository::new());
    let directory = Arc::new(InMemoryIssueDirectory::new());
    let log = Arc::new(InMemoryActivityLog::new());
    let service = WorkflowService::new(
        Arc::clone(&repository),
        Arc::clone(&directory),
        Arc::clone(&log),
        Arc::new(DefaultClock),
    );
    World {
        service,
        repository,
        directory,
        log,
    }
}

/// Creates a tokio runtime for async operations in tests.
fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

fn owner() -> caseflow::workflow::domain::UserId {
    caseflow::workflow::domain::UserId::new()
}

fn task_id(issue: &Issue, title: &str) -> TaskId {
    issue
        .phases()
        .iter()
        .flat_map(|phase| phase.tasks())
        .find(|task| task.title() == title)
        .map(|task| task.id())
        .expect("task should exist")
}

/// Walks one issue from creation through every required phase to an
/// explicit close, checking the derived status at each step.
#[test]
fn full_lifecycle_from_creation_to_close() {
    let runtime = test_runtime();
    let world = world();

    runtime.block_on(async {
        let request = CreateIssueRequest::new("Ship the reporting pipeline", owner())
            .with_description("Quarterly reporting rebuild")
            .with_deadline(date(2025, 6, 30))
            .with_phase(
                PhaseSeed::new("Investigate data sources").with_kind(PhaseKind::Investigation),
            )
            .with_phase(
                PhaseSeed::new("Build the pipeline")
                    .with_kind(PhaseKind::Development)
                    .with_deadline(date(2025, 5, 31)),
            )
            .with_phase(PhaseSeed::new("Acceptance run").with_kind(PhaseKind::AcceptanceTest))
            .with_phase(PhaseSeed::new("Rollout").with_kind(PhaseKind::Rollout));
        let issue = world
            .service
            .create_issue(request)
            .await
            .expect("issue creation should succeed");
        assert_eq!(issue.status(), IssueStatus::NotActive);
        let issue_id = issue.id();
        let phase_ids: Vec<_> = issue.phases().iter().map(|phase| phase.id()).collect();
        let [investigation, development, acceptance, rollout] = phase_ids[..] else {
            panic!("expected four phases");
        };

        // Analysis starts; the issue activates at analysis maturity.
        let issue = world
            .service
            .start_phase(issue_id, investigation)
            .await
            .expect("investigation should start");
        assert_eq!(issue.status(), IssueStatus::InAnalysis);

        // Development starts in parallel and outranks analysis.
        let issue = world
            .service
            .start_phase(issue_id, development)
            .await
            .expect("development should start");
        assert_eq!(issue.status(), IssueStatus::InDevelopment);

        // Schedule two dependent tasks inside development.
        world
            .service
            .add_task(
                issue_id,
                development,
                AddTaskRequest::new("Ingest raw events")
                    .with_start_date(date(2025, 5, 1))
                    .with_due_date(date(2025, 5, 15)),
            )
            .await
            .expect("first task should be schedulable");
        let issue = world
            .repository
            .load(issue_id)
            .await
            .expect("issue should persist");
        let ingest = task_id(&issue, "Ingest raw events");
        let issue = world
            .service
            .add_task(
                issue_id,
                development,
                AddTaskRequest::new("Aggregate reports")
                    .with_start_date(date(2025, 5, 15))
                    .with_due_date(date(2025, 5, 28))
                    .with_dependencies([TaskDependency::Task(ingest)]),
            )
            .await
            .expect("dependent task should be schedulable");
        let aggregate = task_id(&issue, "Aggregate reports");

        // A dependent task may not start before its blocker finishes.
        let premature = world
            .service
            .update_task(
                issue_id,
                aggregate,
                TaskUpdate::new().with_start_date(date(2025, 5, 10)),
            )
            .await;
        assert!(matches!(
            premature,
            Err(WorkflowServiceError::Validation(
                ValidationError::StartPrecedesDependencyFinish { .. }
            ))
        ));

        // Tightening the issue deadline repairs the development schedule
        // silently instead of rejecting the edit.
        let issue = world
            .service
            .set_issue_deadline(issue_id, Some(date(2025, 5, 20)))
            .await
            .expect("deadline tightening should succeed");
        let development_phase = issue.phase(development).expect("phase should exist");
        assert_eq!(development_phase.deadline(), Some(date(2025, 5, 20)));
        let (_, aggregate_task) = issue.find_task(aggregate).expect("task should exist");
        assert_eq!(aggregate_task.due_date(), Some(date(2025, 5, 20)));
        assert_eq!(aggregate_task.start_date(), Some(date(2025, 5, 15)));

        // Finish the tasks and both early phases.
        for id in [ingest, aggregate] {
            world
                .service
                .update_task_status(issue_id, id, TaskStatus::InProgress)
                .await
                .expect("task should start");
            world
                .service
                .update_task_status(issue_id, id, TaskStatus::Done)
                .await
                .expect("task should finish");
        }
        world
            .service
            .complete_phase(issue_id, investigation, "sources catalogued", None)
            .await
            .expect("investigation should complete");
        world
            .service
            .complete_phase(issue_id, development, "pipeline built", None)
            .await
            .expect("development should complete");

        // Acceptance and rollout run to completion.
        for (phase, comment) in [(acceptance, "acceptance green"), (rollout, "rolled out")] {
            world
                .service
                .start_phase(issue_id, phase)
                .await
                .expect("phase should start");
            world
                .service
                .complete_phase(issue_id, phase, comment, None)
                .await
                .expect("phase should complete");
        }
        let issue = world
            .repository
            .load(issue_id)
            .await
            .expect("issue should persist");
        assert_eq!(issue.status(), IssueStatus::Done);

        // Explicit close succeeds now that every phase and kind is present.
        let issue = world
            .service
            .close_issue(issue_id)
            .await
            .expect("close should succeed");
        assert_eq!(issue.status(), IssueStatus::Done);

        let entries = world.log.entries().expect("log should be readable");
        assert!(entries
            .iter()
            .any(|entry| entry.kind == ActivityKind::IssueClosed));
        assert!(entries
            .iter()
            .any(|entry| entry.kind == ActivityKind::DependencyAdded));
    });
}

/// Dependency replacement across issues notifies both sides exactly once,
/// and a failed phase absorbs the issue status until it is reopened.
#[test]
fn cross_issue_dependencies_and_failure_recovery() {
    let runtime = test_runtime();
    let world = world();

    runtime.block_on(async {
        let upstream = world
            .service
            .create_issue(CreateIssueRequest::new("Upstream schema work", owner()))
            .await
            .expect("upstream creation should succeed");
        world
            .directory
            .register(&upstream)
            .expect("registration should succeed");

        let downstream = world
            .service
            .create_issue(CreateIssueRequest::new("Downstream consumer", owner()))
            .await
            .expect("downstream creation should succeed");
        let downstream_id = downstream.id();
        let phase = downstream.phases().first().expect("default phase").id();
        let downstream = world
            .service
            .add_task(
                downstream_id,
                phase,
                AddTaskRequest::new("Consume new schema")
                    .with_dependencies([TaskDependency::Issue(upstream.id())]),
            )
            .await
            .expect("task creation should succeed");
        let consume = task_id(&downstream, "Consume new schema");

        let added: Vec<_> = world
            .log
            .entries()
            .expect("log should be readable")
            .into_iter()
            .filter(|entry| entry.kind == ActivityKind::DependencyAdded)
            .collect();
        assert_eq!(added.len(), 2, "source and owning issue each notified once");
        assert!(added.iter().any(|entry| entry.issue_id == upstream.id()));

        // Dropping the dependency notifies both sides of the removal.
        world
            .service
            .update_task(
                downstream_id,
                consume,
                TaskUpdate::new().with_dependencies([]),
            )
            .await
            .expect("dependency removal should apply");
        let removed: Vec<_> = world
            .log
            .entries()
            .expect("log should be readable")
            .into_iter()
            .filter(|entry| entry.kind == ActivityKind::DependencyRemoved)
            .collect();
        assert_eq!(removed.len(), 2);

        // A failing phase absorbs the issue status; reopening recovers it.
        let failed = world
            .service
            .fail_phase(downstream_id, phase)
            .await
            .expect("fail should succeed");
        assert_eq!(failed.status(), IssueStatus::Failed);
        let reopened = world
            .service
            .reopen_phase(downstream_id, phase)
            .await
            .expect("reopen should succeed");
        assert_eq!(reopened.status(), IssueStatus::InDevelopment);
        assert_eq!(
            reopened
                .phase(phase)
                .expect("phase should exist")
                .status(),
            PhaseStatus::InProgress
        );
    });
}
