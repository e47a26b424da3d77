//! Middlegame/endgame score pair used by the evaluator.

use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// A pair of middlegame and endgame values, blended by game phase.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Score {
    /// Middlegame component.
    pub mg: i32,
    /// Endgame component.
    pub eg: i32,
}

impl Score {
    /// Zero score (mg=0, eg=0).
    pub const ZERO: Score = Score { mg: 0, eg: 0 };

    /// Blend the two components.
    ///
    /// `phase` runs from 0 (bare endgame) to `max_phase` (full middlegame).
    #[inline]
    pub fn taper(self, phase: i32, max_phase: i32) -> i32 {
        let phase = phase.clamp(0, max_phase);
        (self.mg * phase + self.eg * (max_phase - phase)) / max_phase
    }
}

/// Shorthand constructor used by the tables.
#[allow(non_snake_case)]
#[inline]
pub const fn S(mg: i32, eg: i32) -> Score {
    Score { mg, eg }
}

impl Add for Score {
    type Output = Score;

    #[inline]
    fn add(self, rhs: Score) -> Score {
        S(self.mg + rhs.mg, self.eg + rhs.eg)
    }
}

impl AddAssign for Score {
    #[inline]
    fn add_assign(&mut self, rhs: Score) {
        *self = *self + rhs;
    }
}

impl Sub for Score {
    type Output = Score;

    #[inline]
    fn sub(self, rhs: Score) -> Score {
        S(self.mg - rhs.mg, self.eg - rhs.eg)
    }
}

impl fmt::Debug for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S({}, {})", self.mg, self.eg)
    }
}
