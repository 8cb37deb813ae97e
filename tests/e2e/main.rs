//! E2E test suite entry point.

mod batch_workflow;
mod cache_workflow;
mod degraded_workflow;
mod fixture;
mod search_workflow;
