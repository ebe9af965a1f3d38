//! In-memory issue repository for tests and embedders without a store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::workflow::{
    domain::{Issue, IssueId},
    ports::{IssueRepository, IssueRepositoryError, IssueRepositoryResult},
};

/// Thread-safe in-memory issue repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIssueRepository {
    issues: Arc<RwLock<HashMap<IssueId, Issue>>>,
}

impl InMemoryIssueRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IssueRepository for InMemoryIssueRepository {
    async fn load(&self, id: IssueId) -> IssueRepositoryResult<Issue> {
        let issues = self.issues.read().map_err(|err| {
            IssueRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        issues
            .get(&id)
            .cloned()
            .ok_or(IssueRepositoryError::NotFound(id))
    }

    async fn save(&self, issue: &Issue) -> IssueRepositoryResult<()> {
        let mut issues = self.issues.write().map_err(|err| {
            IssueRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        issues.insert(issue.id(), issue.clone());
        Ok(())
    }
}
