pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod search;
#[doc(hidden)]
pub mod test_utils;

pub use error::{Result, SearchError};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
