//! Core creator types, corpus access and retry logic

pub mod corpus;
pub mod creator;
pub mod normalize;
pub mod recovery;

pub use corpus::{Corpus, CorpusProvider, JsonFileCorpus, SqliteCorpus, StaticCorpus};
pub use creator::{Creator, Demographics, Platform};
pub use recovery::{RetryConfig, RetryFailure, with_retry_if};
