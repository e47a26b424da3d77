//! Position layer for sable: legal moves, make/unmake, and game-state rules.
//!
//! Move generation and Zobrist hashing come from [`cozy_chess`]; this crate
//! adds the reversible [`Position`] the search mutates in place.

mod error;
mod notation;
mod perft;
mod position;

pub use cozy_chess::{BitBoard, Board, Color, File, Move, Piece, Rank, Square};
pub use error::PositionError;
pub use perft::{divide, perft};
pub use position::{GameStatus, Position, STARTING_FEN};
