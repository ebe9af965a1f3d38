//! Task dependencies and the dependency validator/tracker primitives.
//!
//! A dependency points from a task to another task, phase, or whole issue
//! whose finish date constrains when the dependent task may start. Targets
//! may live in a different phase or a different issue than the task itself,
//! forming a graph overlaid on the issue/phase/task tree. Resolution here is
//! strictly local to one issue; cross-issue attribution happens in the
//! service layer through an injected directory.

use super::error::{NotFoundError, ParseVariantError};
use super::ids::{IssueId, PhaseId, TaskId};
use super::issue::Issue;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Classification of dependency targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    /// The target is a task.
    Task,
    /// The target is a phase.
    Phase,
    /// The target is a whole issue.
    Issue,
}

impl DependencyKind {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Phase => "phase",
            Self::Issue => "issue",
        }
    }
}

impl TryFrom<&str> for DependencyKind {
    type Error = ParseVariantError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "task" => Ok(Self::Task),
            "phase" => Ok(Self::Phase),
            "issue" => Ok(Self::Issue),
            _ => Err(ParseVariantError {
                kind: "dependency kind",
                value: value.to_owned(),
            }),
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A reference from a task to the entity it waits on.
///
/// Identity for diffing purposes is the (kind, target) pair; two
/// dependencies naming the same target are the same dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum TaskDependency {
    /// Waits on another task finishing.
    Task(TaskId),
    /// Waits on a phase finishing.
    Phase(PhaseId),
    /// Waits on a whole issue finishing.
    Issue(IssueId),
}

impl TaskDependency {
    /// Returns the classification of this dependency's target.
    #[must_use]
    pub const fn kind(self) -> DependencyKind {
        match self {
            Self::Task(_) => DependencyKind::Task,
            Self::Phase(_) => DependencyKind::Phase,
            Self::Issue(_) => DependencyKind::Issue,
        }
    }
}

impl fmt::Display for TaskDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Task(id) => write!(f, "task {id}"),
            Self::Phase(id) => write!(f, "phase {id}"),
            Self::Issue(id) => write!(f, "issue {id}"),
        }
    }
}

/// Added and removed dependencies between two wholesale dependency sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyDiff {
    /// Dependencies present in the current set but not the previous one.
    pub added: Vec<TaskDependency>,
    /// Dependencies present in the previous set but not the current one.
    pub removed: Vec<TaskDependency>,
}

impl DependencyDiff {
    /// Returns whether the diff carries no changes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Resolves the date a dependency target is expected to finish by.
///
/// For a task target the finish date is the first set value of task due
/// date, owning phase deadline, then issue deadline. For a phase target it
/// is the phase deadline, falling back to the issue deadline. For an issue
/// target the issue deadline is returned directly without any local
/// existence check; cross-issue targets are only resolved by the external
/// collaborator that holds the full issue store.
///
/// Returns `None` when every bound in the chain is absent, meaning the
/// dependency places no constraint on the dependent task's start date.
///
/// # Errors
///
/// Returns [`NotFoundError`] when a task or phase target does not exist
/// anywhere under the given issue.
pub fn resolve_dependency_finish_date(
    issue: &Issue,
    dependency: TaskDependency,
) -> Result<Option<NaiveDate>, NotFoundError> {
    match dependency {
        TaskDependency::Task(task_id) => {
            let (phase, task) = issue
                .find_task(task_id)
                .ok_or(NotFoundError::Task(task_id))?;
            Ok(task
                .due_date()
                .or_else(|| phase.deadline())
                .or_else(|| issue.deadline()))
        }
        TaskDependency::Phase(phase_id) => {
            let phase = issue
                .phase(phase_id)
                .ok_or(NotFoundError::Phase(phase_id))?;
            Ok(phase.deadline().or_else(|| issue.deadline()))
        }
        TaskDependency::Issue(_) => Ok(issue.deadline()),
    }
}

/// Computes the structural difference between two dependency sets.
///
/// Both inputs are treated as sets keyed on the (kind, target) pair; input
/// order is preserved in the output and duplicates collapse to a single
/// entry. `diff_dependencies(a, a)` is always empty.
#[must_use]
pub fn diff_dependencies(
    previous: &[TaskDependency],
    current: &[TaskDependency],
) -> DependencyDiff {
    DependencyDiff {
        added: set_difference(current, previous),
        removed: set_difference(previous, current),
    }
}

/// Returns entries of `from` absent from `without`, first occurrence only.
fn set_difference(from: &[TaskDependency], without: &[TaskDependency]) -> Vec<TaskDependency> {
    let exclude: HashSet<TaskDependency> = without.iter().copied().collect();
    let mut seen: HashSet<TaskDependency> = HashSet::new();
    from.iter()
        .copied()
        .filter(|dependency| !exclude.contains(dependency) && seen.insert(*dependency))
        .collect()
}
