//! Error types for the search crate.

use sable_core::PositionError;

/// Failures reported by [`Searcher::search`](crate::Searcher::search).
///
/// Running out of time or nodes is not an error: the search returns its
/// best result so far.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// `max_depth` was 0.
    #[error("search depth must be at least 1")]
    ZeroDepth,

    /// The position rejected a move the search generated from it.
    #[error("position error during search: {0}")]
    Position(#[from] PositionError),
}
