//! Killer moves and history scores for ordering quiet moves.
//!
//! Both tables live for a single `search` call and start empty.

use sable_core::{Color, Move};

use crate::search::negamax::MAX_PLY;

/// Up to two quiet moves per ply that recently caused a beta cutoff.
#[derive(Debug, Clone)]
pub struct KillerTable {
    slots: [[Option<Move>; 2]; MAX_PLY],
}

impl KillerTable {
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; MAX_PLY],
        }
    }

    /// Record `mv` as the newest killer at `ply`.
    ///
    /// The previous newest killer moves to the second slot; storing the
    /// newest killer again changes nothing.
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slots) = self.slots.get_mut(ply) else {
            return;
        };
        if slots[0] != Some(mv) {
            slots[1] = slots[0];
            slots[0] = Some(mv);
        }
    }

    /// The killers at `ply`, newest first.
    pub fn get(&self, ply: usize) -> [Option<Move>; 2] {
        self.slots.get(ply).copied().unwrap_or([None; 2])
    }

    pub fn is_killer(&self, ply: usize, mv: Move) -> bool {
        self.get(ply).contains(&Some(mv))
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Ceiling on a history score; keeps quiets below the killer band.
pub const HISTORY_MAX: i32 = 16_384;

/// Cutoff counts for quiet moves, indexed by `[color][from][to]`.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    table: Box<[[[i32; 64]; 64]; 2]>,
}

impl HistoryTable {
    pub fn new() -> Self {
        Self {
            table: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    /// Reward a quiet move by `color` that caused a cutoff at `depth`.
    ///
    /// Deeper cutoffs weigh more (depth squared).
    pub fn reward(&mut self, color: Color, mv: Move, depth: u8) {
        let bonus = depth as i32 * depth as i32;
        let entry = &mut self.table[color as usize][mv.from as usize][mv.to as usize];
        *entry = (*entry + bonus).min(HISTORY_MAX);
    }

    pub fn score(&self, color: Color, mv: Move) -> i32 {
        self.table[color as usize][mv.from as usize][mv.to as usize]
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_core::Square;

    fn mv(from: Square, to: Square) -> Move {
        Move { from, to, promotion: None }
    }

    #[test]
    fn killers_shift_newest_first() {
        let mut killers = KillerTable::new();
        let a = mv(Square::E2, Square::E4);
        let b = mv(Square::D2, Square::D4);
        let c = mv(Square::G1, Square::F3);

        killers.store(5, a);
        killers.store(5, b);
        assert_eq!(killers.get(5), [Some(b), Some(a)]);

        killers.store(5, c);
        assert_eq!(killers.get(5), [Some(c), Some(b)]);
        assert!(!killers.is_killer(5, a));
        assert!(!killers.is_killer(4, c));
    }

    #[test]
    fn repeated_killer_does_not_evict() {
        let mut killers = KillerTable::new();
        let a = mv(Square::E2, Square::E4);
        let b = mv(Square::D2, Square::D4);
        killers.store(0, a);
        killers.store(0, b);
        killers.store(0, b);
        assert_eq!(killers.get(0), [Some(b), Some(a)]);
    }

    #[test]
    fn killers_ignore_out_of_range_ply() {
        let mut killers = KillerTable::new();
        killers.store(MAX_PLY, mv(Square::E2, Square::E4));
        assert_eq!(killers.get(MAX_PLY), [None, None]);
    }

    #[test]
    fn history_grows_with_depth_squared_and_saturates() {
        let mut history = HistoryTable::new();
        let m = mv(Square::G1, Square::F3);
        history.reward(Color::White, m, 3);
        assert_eq!(history.score(Color::White, m), 9);
        assert_eq!(history.score(Color::Black, m), 0);

        for _ in 0..1000 {
            history.reward(Color::White, m, 20);
        }
        assert_eq!(history.score(Color::White, m), HISTORY_MAX);
    }
}
