//! Repository port for issue persistence.
//!
//! The engine performs no I/O of its own; the caller loads an issue graph,
//! mutates it through the service, and persists it back. Concurrency
//! control for the same issue (optimistic or pessimistic locking) is the
//! repository's responsibility.

use crate::workflow::domain::{Issue, IssueId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for issue repository operations.
pub type IssueRepositoryResult<T> = Result<T, IssueRepositoryError>;

/// Issue persistence contract.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Loads an issue by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::NotFound`] when the identifier is
    /// unknown.
    async fn load(&self, id: IssueId) -> IssueRepositoryResult<Issue>;

    /// Persists an issue, inserting or replacing by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IssueRepositoryError::Persistence`] when the store rejects
    /// the write.
    async fn save(&self, issue: &Issue) -> IssueRepositoryResult<()>;
}

/// Errors returned by issue repository implementations.
#[derive(Debug, Clone, Error)]
pub enum IssueRepositoryError {
    /// The issue was not found.
    #[error("issue not found: {0}")]
    NotFound(IssueId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl IssueRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
