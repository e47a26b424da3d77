//! UCI move notation.
//!
//! The move generator encodes castling as "king takes own rook" (`e1h1`).
//! These helpers translate to and from the standard two-square king move
//! (`e1g1`) so callers never see the internal form.

use cozy_chess::{Color, File, Move, Piece, Square};

use crate::error::PositionError;
use crate::position::Position;

impl Position {
    /// Parse a UCI move string and check it is legal here.
    ///
    /// Accepts both `e1g1` and `e1h1` for castling.
    pub fn parse_uci_move(&self, text: &str) -> Result<Move, PositionError> {
        let mut mv: Move = text.trim().parse().map_err(|_| PositionError::MalformedMove {
            text: text.to_string(),
        })?;

        if self.is_standard_castle(mv) {
            let rook_file = if mv.to.file() == File::G { File::H } else { File::A };
            mv.to = Square::new(rook_file, mv.from.rank());
        }

        if !self.is_legal(mv) {
            return Err(PositionError::IllegalMove {
                mv: text.to_string(),
                fen: self.to_string(),
            });
        }
        Ok(mv)
    }

    /// Format `mv` in standard UCI notation.
    pub fn uci(&self, mv: Move) -> String {
        let stm = self.side_to_move();
        let castles = self.piece_on(mv.from) == Some(Piece::King) && self.color_on(mv.to) == Some(stm);
        if !castles {
            return mv.to_string();
        }
        let king_file = if (mv.to.file() as usize) > (mv.from.file() as usize) {
            File::G
        } else {
            File::C
        };
        Move {
            from: mv.from,
            to: Square::new(king_file, mv.from.rank()),
            promotion: None,
        }
        .to_string()
    }

    fn is_standard_castle(&self, mv: Move) -> bool {
        let stm = self.side_to_move();
        let home = match stm {
            Color::White => Square::E1,
            Color::Black => Square::E8,
        };
        mv.from == home
            && self.piece_on(mv.from) == Some(Piece::King)
            && self.color_on(mv.from) == Some(stm)
            && mv.to.rank() == mv.from.rank()
            && (mv.to.file() == File::G || mv.to.file() == File::C)
    }
}
