//! Search and evaluation for sable.

mod error;
pub mod eval;
pub mod search;

pub use error::SearchError;
pub use eval::{Classical, Evaluator, evaluate};
pub use search::control::SearchControl;
pub use search::negamax::{INF, MATE_SCORE, MATE_THRESHOLD, MAX_PLY, MAX_QSEARCH_DEPTH};
pub use search::ordering::order_moves;
pub use search::tt::{Bound, TranspositionTable, TtEntry};
pub use search::{SearchLimits, SearchOptions, SearchResult, Searcher};
