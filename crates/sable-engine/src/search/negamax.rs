//! Negamax alpha-beta search with quiescence.

use sable_core::{Move, Position, PositionError};

use crate::eval::Evaluator;
use crate::eval::tables::PIECE_VALUE;
use crate::search::SearchOptions;
use crate::search::control::SearchControl;
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::ordering::{MovePicker, lmr_reduction};
use crate::search::tt::{Bound, TranspositionTable};

/// Bound no real score reaches.
pub const INF: i32 = 30_000;

/// Score of delivering mate at the root; a mate at ply `p` is `MATE_SCORE - p`.
pub const MATE_SCORE: i32 = 29_000;

/// Scores beyond this magnitude are mates.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Score of a drawn position.
pub const DRAW: i32 = 0;

/// Hard recursion limit, in plies from the root.
pub const MAX_PLY: usize = 128;

/// Quiescence stops extending after this many capture plies.
pub const MAX_QSEARCH_DEPTH: usize = 32;

/// Check extensions may push a line at most this far past the iteration depth.
pub const MAX_EXTENSION: u32 = 2;

/// Shallowest remaining depth at which a null move is tried.
pub const NULL_MOVE_MIN_DEPTH: u8 = 3;

/// Shallowest remaining depth at which late quiet moves are reduced.
pub const LMR_MIN_DEPTH: u8 = 3;

/// Moves before this index in the ordered list are never reduced.
pub const LMR_MIN_MOVE_INDEX: usize = 3;

/// A capture that cannot lift the static score this close to alpha is skipped.
pub const DELTA_MARGIN: i32 = 200;

/// Score for the side to move being checkmated at `ply`.
#[inline]
pub const fn mated_in(ply: usize) -> i32 {
    -(MATE_SCORE - ply as i32)
}

/// Why a node returned without a score.
#[derive(Debug)]
pub(crate) enum Abort {
    /// The stop flag or a budget tripped; the iteration is void.
    Stopped,
    /// The position refused a move it had generated.
    Fault(PositionError),
}

impl From<PositionError> for Abort {
    fn from(err: PositionError) -> Self {
        Abort::Fault(err)
    }
}

pub(crate) type NodeResult = Result<i32, Abort>;

/// Play `mv`, run `child` on the resulting position, then take `mv` back.
///
/// The position is restored whatever `child` returns; an error from the
/// child wins over one from the unmake.
fn with_move<T>(
    pos: &mut Position,
    mv: Move,
    child: impl FnOnce(&mut Position) -> Result<T, Abort>,
) -> Result<T, Abort> {
    pos.make_move(mv)?;
    let result = child(pos);
    pos.unmake_move()?;
    result
}

/// Triangular principal-variation table: row `ply` holds the best line
/// found from that ply.
#[derive(Debug)]
pub(crate) struct PvTable {
    lines: Vec<Vec<Move>>,
}

impl PvTable {
    pub fn new() -> Self {
        Self {
            lines: (0..=MAX_PLY).map(|_| Vec::with_capacity(16)).collect(),
        }
    }

    pub fn clear(&mut self, ply: usize) {
        if let Some(line) = self.lines.get_mut(ply) {
            line.clear();
        }
    }

    /// `mv` followed by the child's line becomes the line at `ply`.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply + 1 >= self.lines.len() {
            return;
        }
        let (head, tail) = self.lines.split_at_mut(ply + 1);
        let line = &mut head[ply];
        line.clear();
        line.push(mv);
        line.extend_from_slice(&tail[0]);
    }

    pub fn root(&self) -> &[Move] {
        &self.lines[0]
    }
}

/// Per-search mutable state threaded through the recursion.
pub(crate) struct SearchContext<'a, E: Evaluator> {
    pub nodes: u64,
    pub tt: &'a TranspositionTable,
    pub eval: &'a E,
    pub control: &'a SearchControl,
    pub options: SearchOptions,
    pub killers: KillerTable,
    pub history: HistoryTable,
    pub pv: PvTable,
    /// Nominal depth of the current iteration.
    pub root_depth: u8,
    /// Full-window re-searches after an aspiration miss.
    pub researches: u32,
}

impl<'a, E: Evaluator> SearchContext<'a, E> {
    pub fn new(tt: &'a TranspositionTable, eval: &'a E, control: &'a SearchControl, options: SearchOptions) -> Self {
        Self {
            nodes: 0,
            tt,
            eval,
            control,
            options,
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            pv: PvTable::new(),
            root_depth: 0,
            researches: 0,
        }
    }
}

/// Negamax alpha-beta search of `pos` to `depth` plies.
///
/// Returns the score for the side to move, or `Err` when the search was
/// stopped or the position failed. Every move made here is unmade before
/// returning, on the error path as well. The principal variation is
/// collected into `ctx.pv`.
pub(crate) fn negamax<E: Evaluator>(
    pos: &mut Position,
    depth: u8,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    null_allowed: bool,
    ctx: &mut SearchContext<'_, E>,
) -> NodeResult {
    if ctx.control.should_stop(ctx.nodes) {
        return Err(Abort::Stopped);
    }
    ctx.nodes += 1;
    ctx.pv.clear(ply);

    let root = ply == 0;
    if !root {
        // A mate delivered on the hundredth reversible ply still counts.
        if pos.is_repetition()
            || pos.is_insufficient_material()
            || (pos.halfmove_clock() >= 100 && pos.has_legal_moves())
        {
            return Ok(DRAW);
        }
        if ply >= MAX_PLY - 1 {
            return Ok(ctx.eval.evaluate(pos));
        }
    }

    let key = pos.key();
    let tt_entry = ctx.tt.probe(key, ply);
    let tt_move = tt_entry.and_then(|e| e.best_move);
    if !root
        && let Some(entry) = tt_entry
        && let Some(score) = entry.cutoff(depth, alpha, beta)
    {
        return Ok(score);
    }

    if depth == 0 {
        return qsearch(pos, ply, 0, alpha, beta, ctx);
    }

    let in_check = pos.is_check();
    let moves = pos.legal_moves();
    if moves.is_empty() {
        return Ok(if in_check { mated_in(ply) } else { DRAW });
    }

    // Null move: if passing still fails high, a real move will too.
    if ctx.options.null_move
        && null_allowed
        && !root
        && !in_check
        && depth >= NULL_MOVE_MIN_DEPTH
        && beta.abs() < MATE_THRESHOLD
        && pos.has_non_pawn_material(pos.side_to_move())
        && pos.make_null_move()
    {
        let r = if depth >= 6 { 3 } else { 2 };
        let result = negamax(pos, depth.saturating_sub(1 + r), ply + 1, -beta, -beta + 1, false, ctx);
        pos.unmake_move()?;
        if -result? >= beta {
            return Ok(beta);
        }
    }

    let pv_node = beta - alpha > 1;
    let original_alpha = alpha;
    let mut best_score = -INF;
    let mut best_move = None;
    let mut picker = MovePicker::new(pos, &moves, tt_move, &ctx.killers, &ctx.history, ply);
    let mut index = 0usize;

    while let Some(mv) = picker.pick_next() {
        let quiet = mv.promotion.is_none() && !pos.is_capture(mv);
        let killer = ctx.killers.is_killer(ply, mv);

        let score = with_move(pos, mv, |pos| {
            let gives_check = pos.is_check();

            let extend = ctx.options.check_extensions
                && gives_check
                && (ply as u32 + depth as u32) < ctx.root_depth as u32 + MAX_EXTENSION;
            let new_depth = depth - 1 + extend as u8;

            let reduction = (ctx.options.lmr
                && !root
                && !in_check
                && !gives_check
                && quiet
                && !killer
                && depth >= LMR_MIN_DEPTH
                && index >= LMR_MIN_MOVE_INDEX)
                .then(|| lmr_reduction(index, depth, pv_node));

            search_move(pos, new_depth, ply, alpha, beta, index == 0, reduction, ctx)
        })?;

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
            if score > alpha {
                alpha = score;
                ctx.pv.update(ply, mv);
            }
        }

        if alpha >= beta {
            if quiet {
                ctx.killers.store(ply, mv);
                ctx.history.reward(pos.side_to_move(), mv, depth);
            }
            break;
        }
        index += 1;
    }

    let bound = if best_score <= original_alpha {
        Bound::Upper
    } else if best_score >= beta {
        Bound::Lower
    } else {
        Bound::Exact
    };
    // A fail-low node has no trustworthy best move; keep the old hint.
    let hint = if bound == Bound::Upper { tt_move.or(best_move) } else { best_move };
    ctx.tt.store(key, depth, best_score, hint, bound, ply);

    Ok(best_score)
}

/// Search the child just made, from the parent's point of view.
///
/// The first move gets the full window. Later moves are probed with a
/// null window (reduced first, if `reduction` is set) and only re-searched
/// when the probe suggests they beat alpha.
#[allow(clippy::too_many_arguments)]
fn search_move<E: Evaluator>(
    pos: &mut Position,
    new_depth: u8,
    ply: usize,
    alpha: i32,
    beta: i32,
    first: bool,
    reduction: Option<u8>,
    ctx: &mut SearchContext<'_, E>,
) -> NodeResult {
    let child = ply + 1;
    if first {
        return Ok(-negamax(pos, new_depth, child, -beta, -alpha, true, ctx)?);
    }

    if let Some(r) = reduction {
        let score = -negamax(pos, new_depth.saturating_sub(r), child, -alpha - 1, -alpha, true, ctx)?;
        if score <= alpha {
            return Ok(score);
        }
    }

    let score = -negamax(pos, new_depth, child, -alpha - 1, -alpha, true, ctx)?;
    if score > alpha && score < beta {
        return Ok(-negamax(pos, new_depth, child, -beta, -alpha, true, ctx)?);
    }
    Ok(score)
}

/// Quiescence search: captures and queen promotions only, until the
/// position is quiet or [`MAX_QSEARCH_DEPTH`] capture plies have been made.
///
/// The static score is a lower bound (the side to move may decline every
/// capture), so a stand-pat at or above `beta` cuts immediately.
pub(crate) fn qsearch<E: Evaluator>(
    pos: &mut Position,
    ply: usize,
    qdepth: usize,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_, E>,
) -> NodeResult {
    if ctx.control.should_stop(ctx.nodes) {
        return Err(Abort::Stopped);
    }
    ctx.nodes += 1;

    let stand_pat = ctx.eval.evaluate(pos);
    if qdepth >= MAX_QSEARCH_DEPTH || ply >= MAX_PLY - 1 {
        return Ok(stand_pat);
    }
    if stand_pat >= beta {
        return Ok(beta);
    }
    alpha = alpha.max(stand_pat);

    let captures = pos.captures();
    let mut picker = MovePicker::new_qsearch(pos, &captures);
    while let Some(mv) = picker.pick_next() {
        if ctx.options.delta_pruning
            && mv.promotion.is_none()
            && let Some(victim) = pos.captured_piece(mv)
            && stand_pat + PIECE_VALUE[victim as usize] + DELTA_MARGIN < alpha
        {
            continue;
        }

        let score = -with_move(pos, mv, |pos| qsearch(pos, ply + 1, qdepth + 1, -beta, -alpha, ctx))?;

        if score >= beta {
            return Ok(beta);
        }
        alpha = alpha.max(score);
    }

    Ok(alpha)
}
