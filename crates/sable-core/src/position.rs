//! Reversible game position: a [`Board`] plus the undo stack the search
//! unwinds through.

use std::fmt;
use std::str::FromStr;

use cozy_chess::{Board, Color, Move, Piece, Square};
use tracing::debug;

use crate::error::PositionError;

/// FEN of the standard starting position.
pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Outcome of the game in the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The game continues.
    Ongoing,
    /// The side to move is in check and has no legal moves.
    Checkmate,
    /// The side to move is not in check and has no legal moves.
    Stalemate,
    /// Neither side can possibly deliver mate.
    InsufficientMaterial,
    /// One hundred plies without a capture or pawn move.
    FiftyMoveRule,
    /// The current position has occurred three times.
    ThreefoldRepetition,
}

impl GameStatus {
    /// Whether this status ends the game.
    pub fn is_over(self) -> bool {
        self != GameStatus::Ongoing
    }
}

/// Mutable position with strict make/unmake discipline.
///
/// Every [`make_move`](Position::make_move) pushes the previous board onto
/// the undo stack and every [`unmake_move`](Position::unmake_move) pops it,
/// so a matched pair restores the position exactly. The undo stack doubles
/// as the game history used for repetition detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    board: Board,
    undo: Vec<Board>,
    /// Undo-stack indices of the boards null moves were made from.
    nulls: Vec<usize>,
}

impl Position {
    /// The standard starting position with an empty history.
    pub fn startpos() -> Self {
        Self::from_board(Board::default())
    }

    /// Wrap an existing board with an empty history.
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            undo: Vec::with_capacity(128),
            nulls: Vec::new(),
        }
    }

    /// Parse a position from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let board = Board::from_fen(fen.trim(), false).map_err(|e| PositionError::InvalidFen {
            fen: fen.to_string(),
            reason: format!("{e:?}"),
        })?;
        Ok(Self::from_board(board))
    }

    /// The underlying board.
    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Zobrist key of the current position (pieces, side, castling, en passant).
    #[inline]
    pub fn key(&self) -> u64 {
        self.board.hash()
    }

    /// The side to move.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    /// Plies since the last capture or pawn move.
    #[inline]
    pub fn halfmove_clock(&self) -> u8 {
        self.board.halfmove_clock()
    }

    /// Number of moves made since this position was created.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.undo.len()
    }

    /// Whether the side to move is in check.
    #[inline]
    pub fn is_check(&self) -> bool {
        !self.board.checkers().is_empty()
    }

    /// The piece on `sq`, if any.
    #[inline]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.board.piece_on(sq)
    }

    /// The color of the piece on `sq`, if any.
    #[inline]
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.board.color_on(sq)
    }

    /// Whether `color` owns anything besides king and pawns.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let b = &self.board;
        let minors_and_majors =
            b.pieces(Piece::Knight) | b.pieces(Piece::Bishop) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        !(minors_and_majors & b.colors(color)).is_empty()
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        self.board.generate_moves(|piece_moves| {
            moves.extend(piece_moves);
            false
        });
        moves
    }

    /// Legal captures (en passant included) and queen promotions.
    pub fn captures(&self) -> Vec<Move> {
        let mut moves = Vec::with_capacity(16);
        self.board.generate_moves(|piece_moves| {
            for mv in piece_moves {
                if self.is_capture(mv) || mv.promotion == Some(Piece::Queen) {
                    moves.push(mv);
                }
            }
            false
        });
        moves
    }

    /// Whether the side to move has at least one legal move.
    pub fn has_legal_moves(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|piece_moves| {
            any = !piece_moves.is_empty();
            any
        });
        any
    }

    /// Whether `mv` is legal here.
    #[inline]
    pub fn is_legal(&self, mv: Move) -> bool {
        self.board.is_legal(mv)
    }

    /// Whether `mv` removes an enemy piece. Castling (king onto own rook) is not a capture.
    pub fn is_capture(&self, mv: Move) -> bool {
        self.board.colors(!self.side_to_move()).has(mv.to) || self.is_en_passant(mv)
    }

    /// Whether `mv` is an en passant capture.
    pub fn is_en_passant(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::Pawn)
            && mv.from.file() != mv.to.file()
            && self.board.piece_on(mv.to).is_none()
    }

    /// The piece `mv` would capture, if any.
    pub fn captured_piece(&self, mv: Move) -> Option<Piece> {
        if self.is_en_passant(mv) {
            return Some(Piece::Pawn);
        }
        if self.board.colors(!self.side_to_move()).has(mv.to) {
            self.board.piece_on(mv.to)
        } else {
            None
        }
    }

    /// Apply a legal move.
    ///
    /// Returns [`PositionError::IllegalMove`] and leaves the position
    /// untouched when `mv` is not legal here.
    pub fn make_move(&mut self, mv: Move) -> Result<(), PositionError> {
        let mut next = self.board.clone();
        if next.try_play(mv).is_err() {
            debug!(%mv, fen = %self.board, "rejected illegal move");
            return Err(PositionError::IllegalMove {
                mv: mv.to_string(),
                fen: self.board.to_string(),
            });
        }
        self.undo.push(std::mem::replace(&mut self.board, next));
        Ok(())
    }

    /// Pass the turn without moving.
    ///
    /// Returns `false` and leaves the position untouched when the side to
    /// move is in check. A successful null move is undone with
    /// [`unmake_move`](Position::unmake_move) like any other.
    pub fn make_null_move(&mut self) -> bool {
        match self.board.null_move() {
            Some(next) => {
                self.nulls.push(self.undo.len());
                self.undo.push(std::mem::replace(&mut self.board, next));
                true
            }
            None => false,
        }
    }

    /// Undo the most recent move or null move.
    pub fn unmake_move(&mut self) -> Result<(), PositionError> {
        let prev = self.undo.pop().ok_or(PositionError::EmptyUndoStack)?;
        self.board = prev;
        if self.nulls.last() == Some(&self.undo.len()) {
            self.nulls.pop();
        }
        Ok(())
    }

    /// How many times the current position has occurred, this one included.
    ///
    /// Only positions inside the reversible-move window (the halfmove clock)
    /// with the same side to move are compared. The window never reaches
    /// back past a null move.
    pub fn repetition_count(&self) -> usize {
        let key = self.key();
        let since_null = self.nulls.last().map_or(self.undo.len(), |&at| self.undo.len() - at - 1);
        let window = (self.halfmove_clock() as usize).min(since_null);
        1 + self
            .undo
            .iter()
            .rev()
            .take(window)
            .skip(1)
            .step_by(2)
            .filter(|b| b.hash() == key)
            .count()
    }

    /// Whether the current position already occurred earlier in the history.
    #[inline]
    pub fn is_repetition(&self) -> bool {
        self.repetition_count() >= 2
    }

    /// Neither side has mating material: bare kings, or a single minor piece.
    pub fn is_insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }
        (b.pieces(Piece::Knight) | b.pieces(Piece::Bishop)).len() <= 1
    }

    /// Classify the current position.
    pub fn game_status(&self) -> GameStatus {
        if !self.has_legal_moves() {
            return if self.is_check() {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
        }
        if self.is_insufficient_material() {
            GameStatus::InsufficientMaterial
        } else if self.halfmove_clock() >= 100 {
            GameStatus::FiftyMoveRule
        } else if self.repetition_count() >= 3 {
            GameStatus::ThreefoldRepetition
        } else {
            GameStatus::Ongoing
        }
    }

    /// Whether the game has ended.
    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.game_status().is_over()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl FromStr for Position {
    type Err = PositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_fen(s)
    }
}

/// Formats the current board as FEN.
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.board)
    }
}
