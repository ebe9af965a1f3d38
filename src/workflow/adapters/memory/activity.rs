//! In-memory activity feed for inspecting recorded entries in tests.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::workflow::{
    domain::{ActivityKind, IssueId},
    ports::{ActivityRecorder, ActivityRecorderError, ActivityRecorderResult},
};

/// One recorded activity entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityEntry {
    /// Issue the entry was appended to.
    pub issue_id: IssueId,
    /// Classification of the entry.
    pub kind: ActivityKind,
    /// Human-readable summary text.
    pub summary: String,
}

/// Thread-safe in-memory activity feed.
#[derive(Debug, Clone, Default)]
pub struct InMemoryActivityLog {
    entries: Arc<RwLock<Vec<ActivityEntry>>>,
}

impl InMemoryActivityLog {
    /// Creates an empty activity log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every recorded entry in append order.
    ///
    /// # Errors
    ///
    /// Returns [`ActivityRecorderError`] when the log lock is poisoned.
    pub fn entries(&self) -> ActivityRecorderResult<Vec<ActivityEntry>> {
        let entries = self
            .entries
            .read()
            .map_err(|err| ActivityRecorderError::append(std::io::Error::other(err.to_string())))?;
        Ok(entries.clone())
    }
}

#[async_trait]
impl ActivityRecorder for InMemoryActivityLog {
    async fn record(
        &self,
        issue_id: IssueId,
        kind: ActivityKind,
        summary: &str,
    ) -> ActivityRecorderResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|err| ActivityRecorderError::append(std::io::Error::other(err.to_string())))?;
        entries.push(ActivityEntry {
            issue_id,
            kind,
            summary: summary.to_owned(),
        });
        Ok(())
    }
}
