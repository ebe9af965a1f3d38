//! Activity recording port.

use crate::workflow::domain::{ActivityKind, IssueId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for activity recording.
pub type ActivityRecorderResult<T> = Result<T, ActivityRecorderError>;

/// Fire-and-forget activity feed append.
///
/// Callers must treat failures as best-effort: a failed append is reported
/// through logging and never propagates as a failure of the mutation that
/// triggered it.
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    /// Appends one activity record to an issue's feed.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityRecorderError`] when the append cannot be made;
    /// callers swallow and log this.
    async fn record(
        &self,
        issue_id: IssueId,
        kind: ActivityKind,
        summary: &str,
    ) -> ActivityRecorderResult<()>;
}

/// Errors returned by activity recorder implementations.
#[derive(Debug, Clone, Error)]
pub enum ActivityRecorderError {
    /// The feed append failed.
    #[error("activity append failed: {0}")]
    Append(Arc<dyn std::error::Error + Send + Sync>),
}

impl ActivityRecorderError {
    /// Wraps an append error.
    pub fn append(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Append(Arc::new(err))
    }
}
