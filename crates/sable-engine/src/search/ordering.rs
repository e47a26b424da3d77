//! Move ordering and late-move reductions.
//!
//! Score bands, searched high to low:
//! - TT move
//! - captures and queen promotions, by MVV-LVA
//! - killers (newest first)
//! - other quiets, by history
//! - underpromotions

use sable_core::{Move, Piece, Position};

use crate::search::heuristics::{HistoryTable, KillerTable};

const TT_MOVE: i32 = 1_000_000;
const CAPTURE: i32 = 100_000;
const QUEEN_PROMOTION: i32 = 150;
const KILLER_NEWEST: i32 = 90_000;
const KILLER_OLDER: i32 = 80_000;
const UNDERPROMOTION: i32 = -100_000;

/// Rough piece weights for MVV-LVA: Pawn=1, Knight=3, Bishop=3, Rook=5, Queen=9.
const WEIGHT: [i32; 6] = [1, 3, 3, 5, 9, 0];

/// Most valuable victim first; among equal victims, least valuable attacker.
pub fn mvv_lva(victim: Piece, attacker: Piece) -> i32 {
    WEIGHT[victim as usize] * 16 - WEIGHT[attacker as usize]
}

fn score_capture(pos: &Position, mv: Move) -> i32 {
    let victim = pos.captured_piece(mv).map_or(0, |v| mvv_lva(v, pos.piece_on(mv.from).unwrap_or(Piece::Pawn)));
    let promotion = if mv.promotion == Some(Piece::Queen) { QUEEN_PROMOTION } else { 0 };
    victim + promotion
}

fn score_move(pos: &Position, mv: Move, killers: [Option<Move>; 2], history: &HistoryTable) -> i32 {
    match mv.promotion {
        Some(Piece::Queen) => return CAPTURE + score_capture(pos, mv),
        Some(_) => return UNDERPROMOTION + score_capture(pos, mv),
        None => {}
    }
    if pos.is_capture(mv) {
        CAPTURE + score_capture(pos, mv)
    } else if killers[0] == Some(mv) {
        KILLER_NEWEST
    } else if killers[1] == Some(mv) {
        KILLER_OLDER
    } else {
        history.score(pos.side_to_move(), mv)
    }
}

/// Yields moves best-first by lazy selection sort.
///
/// Most nodes cut off after one or two moves, so sorting the whole list
/// up front is wasted work.
pub struct MovePicker {
    moves: Vec<(Move, i32)>,
    cursor: usize,
}

impl MovePicker {
    /// Picker for an interior node.
    ///
    /// `tt_move` is only promoted when it is one of `moves`; a stale or
    /// colliding hint is ignored.
    pub fn new(
        pos: &Position,
        moves: &[Move],
        tt_move: Option<Move>,
        killers: &KillerTable,
        history: &HistoryTable,
        ply: usize,
    ) -> Self {
        let killers = killers.get(ply);
        let moves = moves
            .iter()
            .map(|&mv| {
                let score = if Some(mv) == tt_move {
                    TT_MOVE
                } else {
                    score_move(pos, mv, killers, history)
                };
                (mv, score)
            })
            .collect();
        Self { moves, cursor: 0 }
    }

    /// Picker for quiescence: MVV-LVA only.
    pub fn new_qsearch(pos: &Position, moves: &[Move]) -> Self {
        let moves = moves.iter().map(|&mv| (mv, score_capture(pos, mv))).collect();
        Self { moves, cursor: 0 }
    }

    pub fn pick_next(&mut self) -> Option<Move> {
        let rest = self.moves.get(self.cursor..)?;
        let (offset, _) = rest
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, i32)>, (i, &(_, score))| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((i, score)),
            })?;
        self.moves.swap(self.cursor, self.cursor + offset);
        let mv = self.moves[self.cursor].0;
        self.cursor += 1;
        Some(mv)
    }
}

/// `moves` in the order the search would try them at `ply`.
pub fn order_moves(
    pos: &Position,
    moves: &[Move],
    tt_move: Option<Move>,
    killers: &KillerTable,
    history: &HistoryTable,
    ply: usize,
) -> Vec<Move> {
    let mut picker = MovePicker::new(pos, moves, tt_move, killers, history, ply);
    std::iter::from_fn(|| picker.pick_next()).collect()
}

/// Plies to cut from a late quiet move at `depth`.
///
/// One ply, plus one each for being very late (6th, 12th move) and for
/// deep nodes, minus one in PV nodes. Always leaves at least one ply.
pub fn lmr_reduction(move_index: usize, depth: u8, pv_node: bool) -> u8 {
    let mut r = 1i32;
    if move_index >= 6 {
        r += 1;
    }
    if move_index >= 12 {
        r += 1;
    }
    if depth >= 6 {
        r += 1;
    }
    if pv_node {
        r -= 1;
    }
    r.clamp(1, (depth as i32 - 1).max(1)) as u8
}
