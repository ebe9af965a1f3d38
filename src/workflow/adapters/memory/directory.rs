//! In-memory issue directory for cross-issue lookup in tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::workflow::{
    domain::{Issue, IssueId, TaskDependency},
    ports::{IssueDirectory, IssueDirectoryError, IssueDirectoryResult},
};

/// Thread-safe in-memory directory indexing dependency targets to the
/// issues that own them.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueDirectory {
    index: Arc<RwLock<HashMap<TaskDependency, IssueId>>>,
}

impl InMemoryIssueDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every addressable entity of an issue as a lookup target.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDirectoryError`] when the index lock is poisoned.
    pub fn register(&self, issue: &Issue) -> IssueDirectoryResult<()> {
        let mut index = self
            .index
            .write()
            .map_err(|err| IssueDirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        index.insert(TaskDependency::Issue(issue.id()), issue.id());
        for phase in issue.phases() {
            index.insert(TaskDependency::Phase(phase.id()), issue.id());
            for task in phase.tasks() {
                index.insert(TaskDependency::Task(task.id()), issue.id());
            }
        }
        Ok(())
    }
}

#[async_trait]
impl IssueDirectory for InMemoryIssueDirectory {
    async fn find_owning_issue(
        &self,
        dependency: TaskDependency,
    ) -> IssueDirectoryResult<Option<IssueId>> {
        let index = self
            .index
            .read()
            .map_err(|err| IssueDirectoryError::lookup(std::io::Error::other(err.to_string())))?;
        Ok(index.get(&dependency).copied())
    }
}
