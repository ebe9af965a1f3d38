//! Unit and service tests for the workflow consistency engine.

mod schedule_tests;
mod support;
