//! Static evaluation.
//!
//! The search only relies on the [`Evaluator`] contract: a signed score in
//! centipawns from the side to move's point of view. [`Classical`] is the
//! default implementation (material plus piece-square tables).

pub mod score;
pub mod tables;

use sable_core::{Color, Piece, Position};

use score::Score;
use tables::{BISHOP_PAIR, MATERIAL, pst_value};

/// Game phase of a full middlegame material set.
///
/// Weights: Knight=1, Bishop=1, Rook=2, Queen=4.
pub const MAX_PHASE: i32 = 24;

/// Static leaf scoring.
///
/// Implementations must return a score from the side to move's point of
/// view and stay well inside the mate band (`|score| < MATE_THRESHOLD`).
pub trait Evaluator {
    /// Score `pos` for the side to move.
    fn evaluate(&self, pos: &Position) -> i32;
}

/// Material and piece-square evaluation tapered by game phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classical;

impl Evaluator for Classical {
    fn evaluate(&self, pos: &Position) -> i32 {
        let white = side_score(pos, Color::White) - side_score(pos, Color::Black);
        let cp = white.taper(game_phase(pos), MAX_PHASE);
        match pos.side_to_move() {
            Color::White => cp,
            Color::Black => -cp,
        }
    }
}

/// Evaluate with the default [`Classical`] evaluator.
pub fn evaluate(pos: &Position) -> i32 {
    Classical.evaluate(pos)
}

/// Remaining non-pawn material, clamped to `0..=MAX_PHASE`.
pub fn game_phase(pos: &Position) -> i32 {
    let board = pos.board();
    let count = |piece: Piece| board.pieces(piece).len() as i32;
    let phase = count(Piece::Knight) + count(Piece::Bishop) + count(Piece::Rook) * 2 + count(Piece::Queen) * 4;
    phase.min(MAX_PHASE)
}

fn side_score(pos: &Position, color: Color) -> Score {
    let board = pos.board();
    let mut score = Score::ZERO;
    for piece in Piece::ALL {
        for sq in board.colored_pieces(color, piece) {
            score += MATERIAL[piece as usize] + pst_value(piece, color, sq);
        }
    }
    if board.colored_pieces(color, Piece::Bishop).len() >= 2 {
        score += BISHOP_PAIR;
    }
    score
}
