//! Material values and piece-square tables.
//!
//! Tables are written from White's point of view in LERF order
//! (index 0 = A1, 7 = H1, 56 = A8). Black squares are mirrored by rank.

use sable_core::{Color, Piece, Square};

use crate::eval::score::{S, Score};

/// Material value per piece, indexed by `Piece as usize`.
pub const MATERIAL: [Score; 6] = [
    S(100, 120), // Pawn
    S(320, 310), // Knight
    S(330, 320), // Bishop
    S(500, 520), // Rook
    S(900, 950), // Queen
    S(0, 0),     // King
];

/// Flat piece values in centipawns for ordering and pruning margins.
pub const PIECE_VALUE: [i32; 6] = [100, 320, 330, 500, 900, 20_000];

/// Bonus for owning both bishops.
pub const BISHOP_PAIR: Score = S(40, 55);

#[rustfmt::skip]
const PAWN: [Score; 64] = [
    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),
    S(5,-5),   S(10,-5),  S(10,-10), S(-20,-10),S(-20,-10),S(10,-10), S(10,-5),  S(5,-5),
    S(5,0),    S(-5,0),   S(-10,0),  S(0,5),    S(0,5),    S(-10,0),  S(-5,0),   S(5,0),
    S(0,5),    S(0,5),    S(0,5),    S(20,20),  S(20,20),  S(0,5),    S(0,5),    S(0,5),
    S(5,15),   S(5,15),   S(10,20),  S(25,30),  S(25,30),  S(10,20),  S(5,15),   S(5,15),
    S(10,40),  S(10,40),  S(20,50),  S(30,55),  S(30,55),  S(20,50),  S(10,40),  S(10,40),
    S(50,90),  S(50,90),  S(50,90),  S(50,90),  S(50,90),  S(50,90),  S(50,90),  S(50,90),
    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),
];

// Nc3 scores below Nf3: it blocks the c-pawn, so kingside development comes first.
#[rustfmt::skip]
const KNIGHT: [Score; 64] = [
    S(-50,-50),S(-40,-40),S(-30,-30),S(-30,-30),S(-30,-30),S(-30,-30),S(-40,-40),S(-50,-50),
    S(-40,-40),S(-20,-20),S(0,0),    S(5,5),    S(5,5),    S(0,0),    S(-20,-20),S(-40,-40),
    S(-30,-30),S(0,0),    S(-5,10),  S(15,15),  S(15,15),  S(10,10),  S(0,0),    S(-30,-30),
    S(-30,-20),S(0,5),    S(15,15),  S(20,20),  S(20,20),  S(15,15),  S(0,5),    S(-30,-20),
    S(-30,-20),S(5,5),    S(15,15),  S(20,20),  S(20,20),  S(15,15),  S(5,5),    S(-30,-20),
    S(-30,-30),S(0,0),    S(10,10),  S(15,15),  S(15,15),  S(10,10),  S(0,0),    S(-30,-30),
    S(-40,-40),S(-20,-20),S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(-20,-20),S(-40,-40),
    S(-50,-50),S(-40,-40),S(-30,-30),S(-30,-30),S(-30,-30),S(-30,-30),S(-40,-40),S(-50,-50),
];

#[rustfmt::skip]
const BISHOP: [Score; 64] = [
    S(-20,-20),S(-10,-10),S(-10,-10),S(-10,-10),S(-10,-10),S(-10,-10),S(-10,-10),S(-20,-20),
    S(-10,-10),S(5,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(5,0),    S(-10,-10),
    S(-10,-10),S(5,5),    S(5,5),    S(5,5),    S(5,5),    S(5,5),    S(5,5),    S(-10,-10),
    S(-10,-5), S(5,0),    S(5,5),    S(10,10),  S(10,10),  S(5,5),    S(5,0),    S(-10,-5),
    S(-10,-5), S(0,0),    S(5,10),   S(10,10),  S(10,10),  S(5,10),   S(0,0),    S(-10,-5),
    S(-10,-5), S(5,5),    S(0,0),    S(5,5),    S(5,5),    S(0,0),    S(5,5),    S(-10,-5),
    S(-10,-10),S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(-10,-10),
    S(-20,-20),S(-10,-10),S(-10,-10),S(-10,-10),S(-10,-10),S(-10,-10),S(-10,-10),S(-20,-20),
];

#[rustfmt::skip]
const ROOK: [Score; 64] = [
    S(0,0),   S(0,0),   S(0,5),   S(5,5),   S(5,5),   S(0,5),   S(0,0),   S(0,0),
    S(-5,0),  S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(-5,0),
    S(-5,0),  S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(-5,0),
    S(-5,0),  S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(-5,0),
    S(-5,0),  S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(-5,0),
    S(-5,0),  S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(0,0),   S(-5,0),
    S(5,10),  S(10,10), S(10,10), S(10,10), S(10,10), S(10,10), S(10,10), S(5,10),
    S(0,5),   S(0,5),   S(0,5),   S(0,5),   S(0,5),   S(0,5),   S(0,5),   S(0,5),
];

#[rustfmt::skip]
const QUEEN: [Score; 64] = [
    S(-20,-20),S(-10,-10),S(-10,-10),S(-5,-5), S(-5,-5), S(-10,-10),S(-10,-10),S(-20,-20),
    S(-10,-10),S(0,0),    S(0,0),    S(0,0),   S(0,0),   S(0,0),    S(0,0),    S(-10,-10),
    S(-10,-5), S(0,5),    S(5,5),    S(5,5),   S(5,5),   S(5,5),    S(0,5),    S(-10,-5),
    S(-5,0),   S(0,5),    S(5,5),    S(5,10),  S(5,10),  S(5,5),    S(0,5),    S(-5,0),
    S(-5,0),   S(0,5),    S(5,5),    S(5,10),  S(5,10),  S(5,5),    S(0,5),    S(-5,0),
    S(-10,-5), S(0,5),    S(5,5),    S(5,5),   S(5,5),   S(5,5),    S(0,5),    S(-10,-5),
    S(-10,-10),S(0,0),    S(0,0),    S(0,0),   S(0,0),   S(0,0),    S(0,0),    S(-10,-10),
    S(-20,-20),S(-10,-10),S(-10,-10),S(-5,-5), S(-5,-5), S(-10,-10),S(-10,-10),S(-20,-20),
];

// Middlegame rewards the castled corners, endgame rewards the centre.
#[rustfmt::skip]
const KING: [Score; 64] = [
    S(20,-50), S(30,-30), S(10,-30), S(0,-30),  S(0,-30),  S(10,-30), S(30,-30), S(20,-50),
    S(20,-30), S(20,-20), S(0,0),    S(0,0),    S(0,0),    S(0,0),    S(20,-20), S(20,-30),
    S(-10,-30),S(-20,-10),S(-20,20), S(-20,30), S(-20,30), S(-20,20), S(-20,-10),S(-10,-30),
    S(-20,-30),S(-30,-10),S(-30,30), S(-40,40), S(-40,40), S(-30,30), S(-30,-10),S(-20,-30),
    S(-30,-30),S(-40,-10),S(-40,30), S(-50,40), S(-50,40), S(-40,30), S(-40,-10),S(-30,-30),
    S(-30,-30),S(-40,-10),S(-40,20), S(-50,30), S(-50,30), S(-40,20), S(-40,-10),S(-30,-30),
    S(-30,-30),S(-40,-20),S(-40,-10),S(-50,0),  S(-50,0),  S(-40,-10),S(-40,-20),S(-30,-30),
    S(-30,-50),S(-40,-40),S(-40,-30),S(-50,-20),S(-50,-20),S(-40,-30),S(-40,-40),S(-30,-50),
];

static PST: [[Score; 64]; 6] = [PAWN, KNIGHT, BISHOP, ROOK, QUEEN, KING];

/// Piece-square bonus for a `color` `piece` standing on `sq`.
#[inline]
pub fn pst_value(piece: Piece, color: Color, sq: Square) -> Score {
    let idx = match color {
        Color::White => sq as usize,
        Color::Black => sq as usize ^ 56,
    };
    PST[piece as usize][idx]
}
