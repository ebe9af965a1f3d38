//! Workflow consistency engine for issue tracking.
//!
//! Issues decompose into phases, phases into tasks. Three components keep
//! that tree consistent as mutations arrive in arbitrary order:
//!
//! - the deadline constraint engine, which validates directly-set dates and
//!   cascades clamps when an ancestor bound tightens,
//! - the dependency validator and tracker, which resolves temporal
//!   dependencies across the issue graph and diffs wholesale dependency
//!   replacements for change notification,
//! - the workflow status state machine, which re-derives the single
//!   issue-level status from phase statuses and kinds after every mutation.
//!
//! The module follows hexagonal architecture:
//!
//! - Domain types and pure consistency logic in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
#[expect(
    clippy::shadow_reuse,
    reason = "Test code reuses variable names for clarity in sequential assertions"
)]
mod tests;
