//! Caseflow: issue and workflow tracking core.
//!
//! This crate implements the write-side consistency engine of an issue
//! tracker: a three-level scheduling hierarchy (issue → phase → task), a
//! cross-entity dependency graph with change tracking, and a derived
//! issue-level status. Persistence, HTTP, authentication, and search live
//! outside the crate and are reached only through port traits.
//!
//! # Architecture
//!
//! Caseflow follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external collaborators
//! - **Adapters**: Concrete implementations of ports (in-memory today)
//!
//! # Modules
//!
//! - [`workflow`]: the consistency engine and its write-side service

pub mod workflow;
