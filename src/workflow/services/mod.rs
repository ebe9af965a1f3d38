//! Application services orchestrating the workflow consistency engine.

mod changes;
mod issue_service;

pub use changes::DependencyChangeTracker;
pub use issue_service::{
    AddPhaseRequest, AddTaskRequest, CreateIssueRequest, PhaseSeed, TaskUpdate, WorkflowService,
    WorkflowServiceError, WorkflowServiceResult,
};
