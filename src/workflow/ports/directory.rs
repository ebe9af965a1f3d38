//! Directory port for cross-issue dependency target lookup.

use crate::workflow::domain::{IssueId, TaskDependency};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for directory lookups.
pub type IssueDirectoryResult<T> = Result<T, IssueDirectoryError>;

/// Lookup capability over the full issue store.
///
/// Used only when a dependency target is not local to the issue being
/// mutated. The engine never embeds foreign issues' data; it asks the
/// directory which issue owns a target and nothing more.
#[async_trait]
pub trait IssueDirectory: Send + Sync {
    /// Resolves the issue that owns the given dependency target.
    ///
    /// Returns `Ok(None)` when no issue in the store owns the target.
    ///
    /// # Errors
    ///
    /// Returns [`IssueDirectoryError`] when the underlying store cannot be
    /// consulted.
    async fn find_owning_issue(
        &self,
        dependency: TaskDependency,
    ) -> IssueDirectoryResult<Option<IssueId>>;
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum IssueDirectoryError {
    /// The underlying store could not be consulted.
    #[error("directory lookup failed: {0}")]
    Lookup(Arc<dyn std::error::Error + Send + Sync>),
}

impl IssueDirectoryError {
    /// Wraps a lookup error.
    pub fn lookup(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Lookup(Arc::new(err))
    }
}
