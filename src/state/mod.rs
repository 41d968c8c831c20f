//! Completion state for incremental planning.
//!
//! This module tracks which steps have already produced up-to-date output so
//! the planner can prune them on the next invocation.

pub mod completion;

pub use completion::{
    dependencies_digest, satisfied_steps, CompletionOracle, CompletionRecord, CompletionStore,
    StoreView,
};
