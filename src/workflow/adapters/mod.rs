//! Adapter implementations of the workflow port contracts.

pub mod memory;
