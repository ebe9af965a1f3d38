//! In-memory adapter implementations of the workflow ports.

mod activity;
mod directory;
mod repository;

pub use activity::{ActivityEntry, InMemoryActivityLog};
pub use directory::InMemoryIssueDirectory;
pub use repository::InMemoryIssueRepository;
