//! Error types for FEN parsing and move application.

/// Errors raised by [`Position`](crate::Position).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// The FEN string could not be parsed into a valid position.
    #[error("invalid FEN \"{fen}\": {reason}")]
    InvalidFen {
        /// The rejected FEN string.
        fen: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// A move string is not in long algebraic (UCI) form.
    #[error("malformed move: \"{text}\"")]
    MalformedMove {
        /// The text that failed to parse.
        text: String,
    },

    /// A move was applied that is not legal in the current position.
    ///
    /// Inside the search this means the move source and the board disagree,
    /// which is a contract violation rather than a recoverable condition.
    #[error("illegal move {mv} in position {fen}")]
    IllegalMove {
        /// The move in UCI form.
        mv: String,
        /// FEN of the position it was applied to.
        fen: String,
    },

    /// `unmake_move` was called with nothing left to undo.
    #[error("unmake requested with an empty undo stack")]
    EmptyUndoStack,
}
