//! Best-effort notification of dependency changes.
//!
//! This is the one place the engine reaches outside the current issue's
//! subtree. Attribution of a foreign target to its owning issue goes
//! through the injected directory, and every outcome here is a side
//! effect: lookup or append failures are logged and swallowed, never
//! allowed to fail the dependency change itself.

use crate::workflow::domain::{
    ActivityKind, DependencyDiff, Issue, IssueId, Task, TaskDependency,
};
use crate::workflow::ports::{ActivityRecorder, IssueDirectory};
use std::sync::Arc;
use tracing::warn;

/// Records dependency add/remove notifications against the issues involved.
#[derive(Clone)]
pub struct DependencyChangeTracker<D, A>
where
    D: IssueDirectory,
    A: ActivityRecorder,
{
    directory: Arc<D>,
    recorder: Arc<A>,
}

impl<D, A> DependencyChangeTracker<D, A>
where
    D: IssueDirectory,
    A: ActivityRecorder,
{
    /// Creates a tracker over the given directory and recorder.
    #[must_use]
    pub const fn new(directory: Arc<D>, recorder: Arc<A>) -> Self {
        Self {
            directory,
            recorder,
        }
    }

    /// Emits one activity record per logical dependency add or remove.
    ///
    /// Each change is recorded against the source issue and, when the
    /// target is owned by a different issue, against that issue as well.
    /// A cross-issue lookup that fails or finds no owner leaves the
    /// notification unattributed; it is reported and swallowed.
    pub async fn record_dependency_changes(
        &self,
        source: &Issue,
        task: &Task,
        diff: &DependencyDiff,
    ) {
        for dependency in &diff.added {
            let summary = format!("task '{}' now depends on {dependency}", task.title());
            self.notify(source, *dependency, ActivityKind::DependencyAdded, &summary)
                .await;
        }
        for dependency in &diff.removed {
            let summary = format!("task '{}' no longer depends on {dependency}", task.title());
            self.notify(
                source,
                *dependency,
                ActivityKind::DependencyRemoved,
                &summary,
            )
            .await;
        }
    }

    async fn notify(
        &self,
        source: &Issue,
        dependency: TaskDependency,
        kind: ActivityKind,
        summary: &str,
    ) {
        self.append(source.id(), kind, summary).await;
        if source.contains_target(dependency) {
            return;
        }
        match self.directory.find_owning_issue(dependency).await {
            Ok(Some(owner)) if owner != source.id() => {
                self.append(owner, kind, summary).await;
            }
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(%dependency, "dependency change left unattributed: no owning issue");
            }
            Err(err) => {
                warn!(%dependency, error = %err, "dependency change left unattributed: lookup failed");
            }
        }
    }

    async fn append(&self, issue_id: IssueId, kind: ActivityKind, summary: &str) {
        if let Err(err) = self.recorder.record(issue_id, kind, summary).await {
            warn!(%issue_id, %kind, error = %err, "activity append failed");
        }
    }
}
