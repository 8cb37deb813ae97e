//! Unit test suite entry point.

mod config_tests;
mod corpus_tests;
