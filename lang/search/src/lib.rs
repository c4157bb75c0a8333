//! Proof search over a library of theorems.
//!
//! A search starts from a telescope of goals. Each step picks the last open goal of a [Query]
//! and tries to solve it with a theorem from the [Index], or with a local hypothesis, giving rise
//! to a new query whose open goals are the parameters of that theorem which could not be inferred.
//! Queries are explored breadth-first by depth, optionally on several threads.

mod index;
mod query;
mod searcher;
mod thread_manager;

pub use index::{DEFAULT_PREFERENCE, Index, Preference};
pub use query::Query;
pub use searcher::{SearchOptions, Searcher};
pub use thread_manager::{ThreadManager, Worker};

#[cfg(test)]
mod fixtures;
