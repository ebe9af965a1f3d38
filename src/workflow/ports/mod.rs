//! Port contracts for the workflow engine's external collaborators.
//!
//! Ports define infrastructure-agnostic interfaces: issue persistence,
//! cross-issue lookup, and the activity feed.

pub mod activity;
pub mod directory;
pub mod repository;

pub use activity::{ActivityRecorder, ActivityRecorderError, ActivityRecorderResult};
pub use directory::{IssueDirectory, IssueDirectoryError, IssueDirectoryResult};
pub use repository::{IssueRepository, IssueRepositoryError, IssueRepositoryResult};
