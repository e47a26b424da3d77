//! Iterative-deepening alpha-beta search.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod tt;

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use sable_core::{Move, Position};
use tracing::{debug, info, warn};

use crate::error::SearchError;
use crate::eval::{Classical, Evaluator};
use control::SearchControl;
use heuristics::{HistoryTable, KillerTable};
use negamax::{Abort, DRAW, INF, MATE_SCORE, MATE_THRESHOLD, NodeResult, SearchContext, negamax};
use ordering::order_moves;
use tt::TranspositionTable;

/// Deepest iteration the driver will start.
pub const MAX_DEPTH: u8 = 64;

/// Half-width of the aspiration window, in centipawns.
pub const ASPIRATION_WINDOW: i32 = 50;

/// First iteration searched with an aspiration window.
pub const ASPIRATION_MIN_DEPTH: u8 = 4;

/// Default transposition table size in megabytes.
pub const DEFAULT_TT_MB: usize = 16;

/// When to stop searching. The first limit reached wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchLimits {
    /// Last iteration to run (at least 1).
    pub max_depth: u8,
    /// Wall-clock budget for the whole call.
    pub time_limit: Option<Duration>,
    /// Node budget for the whole call.
    pub node_limit: Option<u64>,
}

impl SearchLimits {
    /// Search exactly to `max_depth` with no other budget.
    pub fn depth(max_depth: u8) -> Self {
        Self {
            max_depth,
            time_limit: None,
            node_limit: None,
        }
    }

    pub fn with_time(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn with_nodes(mut self, node_limit: u64) -> Self {
        self.node_limit = Some(node_limit);
        self
    }
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self::depth(MAX_DEPTH)
    }
}

/// Switches for the selective parts of the search.
///
/// Everything is on by default. With every switch off the search returns
/// the plain minimax value (plus quiescence) at the requested depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub null_move: bool,
    pub lmr: bool,
    pub check_extensions: bool,
    pub aspiration: bool,
    pub delta_pruning: bool,
}

impl SearchOptions {
    /// No pruning, reductions, extensions, or aspiration windows.
    pub const fn exhaustive() -> Self {
        Self {
            null_move: false,
            lmr: false,
            check_extensions: false,
            aspiration: false,
            delta_pruning: false,
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            null_move: true,
            lmr: true,
            check_extensions: true,
            aspiration: true,
            delta_pruning: true,
        }
    }
}

/// Outcome of a search call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move at the deepest completed iteration; `None` only when the
    /// root has no legal moves.
    pub best_move: Option<Move>,
    /// Centipawns from the side to move's point of view, or a mate score.
    pub score: i32,
    /// Deepest completed iteration (0 if none completed).
    pub depth: u8,
    /// Nodes visited over the whole call.
    pub nodes: u64,
    pub elapsed: Duration,
    /// Principal variation, starting with `best_move`.
    pub pv: Vec<Move>,
}

/// Moves to mate for a search score: positive when the side to move
/// mates, negative when it is mated, `None` outside the mate band.
pub fn mate_in(score: i32) -> Option<i32> {
    if score.abs() <= MATE_THRESHOLD {
        return None;
    }
    let moves = (MATE_SCORE - score.abs() + 1) / 2;
    Some(if score > 0 { moves } else { -moves })
}

impl SearchResult {
    pub fn is_mate_score(&self) -> bool {
        self.score.abs() > MATE_THRESHOLD
    }

    /// Moves to mate: positive when the side to move mates, negative when
    /// it is mated.
    pub fn mate_in(&self) -> Option<i32> {
        mate_in(self.score)
    }

    /// Expected reply to `best_move`.
    pub fn ponder_move(&self) -> Option<Move> {
        self.pv.get(1).copied()
    }
}

/// Best line of the deepest iteration that ran to completion.
struct Completed {
    depth: u8,
    score: i32,
    pv: Vec<Move>,
}

/// Iterative-deepening searcher owning a transposition table.
///
/// The table persists across calls; [`new_game`](Searcher::new_game)
/// clears it.
pub struct Searcher<E: Evaluator = Classical> {
    tt: TranspositionTable,
    evaluator: E,
    options: SearchOptions,
}

impl Searcher<Classical> {
    /// Classical evaluation and a 16 MB table.
    pub fn new() -> Self {
        Self::with_tt_size(DEFAULT_TT_MB)
    }

    pub fn with_tt_size(mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(mb),
            evaluator: Classical,
            options: SearchOptions::default(),
        }
    }
}

impl Default for Searcher<Classical> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> Searcher<E> {
    /// Searcher using a custom evaluator and a 16 MB table.
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            tt: TranspositionTable::new(DEFAULT_TT_MB),
            evaluator,
            options: SearchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    pub fn set_options(&mut self, options: SearchOptions) {
        self.options = options;
    }

    /// Forget everything learned in earlier searches.
    pub fn new_game(&self) {
        self.tt.clear();
    }

    /// Replace the table with an empty one of `mb` megabytes.
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }

    /// Search `pos` within `limits`.
    ///
    /// `pos` is mutated during the search and restored before returning.
    pub fn search(&mut self, pos: &mut Position, limits: &SearchLimits) -> Result<SearchResult, SearchError> {
        self.search_with(pos, limits, Arc::new(AtomicBool::new(false)), |_, _, _, _| {})
    }

    /// Search `pos` within `limits`, stoppable through `stop`.
    ///
    /// `on_iter(depth, score, nodes, pv)` runs after every completed
    /// iteration. Setting `stop` from another thread ends the search; the
    /// result is then that of the last completed iteration, or a
    /// fallback move if none completed.
    pub fn search_with<F>(
        &mut self,
        pos: &mut Position,
        limits: &SearchLimits,
        stop: Arc<AtomicBool>,
        mut on_iter: F,
    ) -> Result<SearchResult, SearchError>
    where
        F: FnMut(u8, i32, u64, &[Move]),
    {
        if limits.max_depth == 0 {
            return Err(SearchError::ZeroDepth);
        }

        let control = SearchControl::new(stop, limits);
        self.tt.new_generation();

        let root_moves = pos.legal_moves();
        if root_moves.is_empty() {
            let score = if pos.is_check() { -MATE_SCORE } else { DRAW };
            info!(score, "no legal moves at the root");
            return Ok(SearchResult {
                best_move: None,
                score,
                depth: 0,
                nodes: 0,
                elapsed: control.elapsed(),
                pv: Vec::new(),
            });
        }

        let tt_hint = self.tt.probe(pos.key(), 0).and_then(|e| e.best_move);
        let ordered = order_moves(pos, &root_moves, tt_hint, &KillerTable::new(), &HistoryTable::new(), 0);
        let fallback = ordered.first().copied().unwrap_or(root_moves[0]);

        let history_len = pos.history_len();
        let mut ctx = SearchContext::new(&self.tt, &self.evaluator, &control, self.options);
        let mut completed: Option<Completed> = None;
        let mut prev_score = 0;

        for depth in 1..=limits.max_depth.min(MAX_DEPTH) {
            if depth > 1 && control.should_stop_iterating() {
                break;
            }
            ctx.root_depth = depth;

            let score = match aspiration(pos, depth, prev_score, &mut ctx) {
                Ok(score) => score,
                Err(Abort::Stopped) => {
                    debug!(depth, nodes = ctx.nodes, "iteration interrupted, discarding it");
                    break;
                }
                Err(Abort::Fault(err)) => {
                    warn!(depth, error = %err, "search aborted by a position error");
                    return Err(err.into());
                }
            };

            let pv = ctx.pv.root().to_vec();
            if pv.is_empty() {
                warn!(depth, "completed iteration produced no root move");
                break;
            }
            prev_score = score;
            debug!(
                depth,
                score,
                nodes = ctx.nodes,
                elapsed_ms = control.elapsed().as_millis() as u64,
                best = %pos.uci(pv[0]),
                "iteration complete"
            );
            on_iter(depth, score, ctx.nodes, &pv);
            completed = Some(Completed { depth, score, pv });
        }

        debug_assert_eq!(pos.history_len(), history_len);

        let result = match completed {
            Some(done) => SearchResult {
                best_move: done.pv.first().copied(),
                score: done.score,
                depth: done.depth,
                nodes: ctx.nodes,
                elapsed: control.elapsed(),
                pv: done.pv,
            },
            None => {
                warn!(nodes = ctx.nodes, "no iteration completed, playing the first ordered move");
                SearchResult {
                    best_move: Some(fallback),
                    score: self.evaluator.evaluate(pos),
                    depth: 0,
                    nodes: ctx.nodes,
                    elapsed: control.elapsed(),
                    pv: vec![fallback],
                }
            }
        };

        info!(
            depth = result.depth,
            score = result.score,
            nodes = result.nodes,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(result)
    }
}

/// Search the root to `depth`, first inside a window around `prev_score`.
///
/// Shallow iterations and mate scores use the full window. A score on or
/// outside the window triggers exactly one full-window re-search.
fn aspiration<E: Evaluator>(pos: &mut Position, depth: u8, prev_score: i32, ctx: &mut SearchContext<'_, E>) -> NodeResult {
    if ctx.options.aspiration && depth >= ASPIRATION_MIN_DEPTH && prev_score.abs() < MATE_THRESHOLD {
        let alpha = prev_score - ASPIRATION_WINDOW;
        let beta = prev_score + ASPIRATION_WINDOW;
        let score = negamax(pos, depth, 0, alpha, beta, true, ctx)?;
        if score > alpha && score < beta {
            return Ok(score);
        }
        debug!(depth, score, alpha, beta, "aspiration window missed, re-searching");
        ctx.researches += 1;
    }
    negamax(pos, depth, 0, -INF, INF, true, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_in_counts_moves() {
        let mut result = SearchResult {
            best_move: None,
            score: MATE_SCORE - 1,
            depth: 2,
            nodes: 0,
            elapsed: Duration::ZERO,
            pv: Vec::new(),
        };
        assert!(result.is_mate_score());
        assert_eq!(result.mate_in(), Some(1));

        result.score = MATE_SCORE - 5;
        assert_eq!(result.mate_in(), Some(3));

        result.score = -(MATE_SCORE - 4);
        assert_eq!(result.mate_in(), Some(-2));

        result.score = 350;
        assert_eq!(result.mate_in(), None);

        assert_eq!(mate_in(MATE_SCORE - 2), Some(1));
        assert_eq!(mate_in(-MATE_THRESHOLD), None);
    }

    #[test]
    fn limits_builder() {
        let limits = SearchLimits::depth(7)
            .with_time(Duration::from_millis(250))
            .with_nodes(10_000);
        assert_eq!(limits.max_depth, 7);
        assert_eq!(limits.time_limit, Some(Duration::from_millis(250)));
        assert_eq!(limits.node_limit, Some(10_000));
        assert_eq!(SearchLimits::default().max_depth, MAX_DEPTH);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let mut pos = Position::startpos();
        let err = Searcher::with_tt_size(1).search(&mut pos, &SearchLimits::depth(0));
        assert!(matches!(err, Err(SearchError::ZeroDepth)));
    }

    #[test]
    fn aspiration_miss_re_searches_once() {
        let mut pos = Position::startpos();
        let tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = SearchContext::new(&tt, &Classical, &control, SearchOptions::default());
        ctx.root_depth = 4;

        // A previous score far above the truth: the window fails low.
        let score = aspiration(&mut pos, 4, 5_000, &mut ctx).unwrap();
        assert_eq!(ctx.researches, 1);
        assert!(score.abs() < 200);
        assert!(!ctx.pv.root().is_empty());
    }

    #[test]
    fn aspiration_skipped_for_mate_scores_and_shallow_depths() {
        let mut pos = Position::startpos();
        let tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = SearchContext::new(&tt, &Classical, &control, SearchOptions::default());

        ctx.root_depth = 4;
        aspiration(&mut pos, 4, MATE_SCORE - 3, &mut ctx).unwrap();
        ctx.root_depth = 3;
        aspiration(&mut pos, 3, 5_000, &mut ctx).unwrap();
        assert_eq!(ctx.researches, 0);
    }

    #[test]
    fn iteration_callback_sees_every_depth() {
        let mut pos = Position::startpos();
        let mut depths = Vec::new();
        let result = Searcher::with_tt_size(1)
            .search_with(&mut pos, &SearchLimits::depth(4), Arc::new(AtomicBool::new(false)), |d, _, nodes, pv| {
                assert!(nodes > 0);
                assert!(!pv.is_empty());
                depths.push(d);
            })
            .unwrap();
        assert_eq!(depths, vec![1, 2, 3, 4]);
        assert_eq!(result.depth, 4);
        assert_eq!(result.pv.first().copied(), result.best_move);
    }
}
