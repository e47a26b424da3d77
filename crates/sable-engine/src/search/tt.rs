//! Lockless transposition table.
//!
//! Each slot is two `AtomicU64` words (16 bytes). A slot is written word0
//! first, then word1; word1 carries a check value derived from word0 so a
//! reader that races a writer sees a mismatch and treats the slot as a miss.
//!
//! ```text
//! word0:
//!   bits 63-32: key          (upper 32 bits of the Zobrist key)
//!   bits 31-26: generation   (6 bits, wraps at 64)
//!   bits 25-24: bound        (2 bits, 0 = empty slot)
//!   bits 23-16: depth
//!   bits 15-0:  best move    (from | to << 6 | promotion << 12, 0 = none)
//!
//! word1:
//!   bits 63-32: check        (key XOR low 32 bits of word0)
//!   bits 31-16: score        (i16, mate scores stored relative to the node)
//! ```
//!
//! All accesses are `Relaxed`.

use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};

use sable_core::{Move, Piece, Square};

use crate::search::negamax::MATE_THRESHOLD;

const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn check() {
        assert_send_sync::<TranspositionTable>();
    }
    let _ = check;
};

const GENERATION_MASK: u8 = 0x3F;

/// How a stored score relates to the true value of the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Bound {
    /// The score is the exact minimax value.
    Exact = 1,
    /// The search failed high: the true value is at least the score.
    Lower = 2,
    /// The search failed low: the true value is at most the score.
    Upper = 3,
}

impl Bound {
    const fn from_bits(bits: u64) -> Option<Self> {
        match bits & 0x03 {
            1 => Some(Bound::Exact),
            2 => Some(Bound::Lower),
            3 => Some(Bound::Upper),
            _ => None,
        }
    }
}

/// A verified hit from [`TranspositionTable::probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    /// Best (or refuting) move found when the entry was written.
    pub best_move: Option<Move>,
    /// Remaining depth the score was searched to.
    pub depth: u8,
    /// Score, already converted back to distance-from-root for mates.
    pub score: i32,
    pub bound: Bound,
    /// Search generation that wrote the entry.
    pub generation: u8,
}

impl TtEntry {
    /// The score to return without searching, if this entry settles the
    /// node at `depth` with window `(alpha, beta)`.
    ///
    /// Shallower entries never cut: their score only holds for a smaller
    /// horizon than the one being asked for.
    pub fn cutoff(&self, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        match self.bound {
            Bound::Exact => Some(self.score),
            Bound::Lower if self.score >= beta => Some(self.score),
            Bound::Upper if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

/// Convert a root-relative score into node-relative form for storage.
///
/// A mate found at `ply` is `MATE_SCORE - ply` from the root; stored
/// relative to the node it stays valid when the node is reached by a
/// path of another length.
pub fn score_to_tt(score: i32, ply: usize) -> i16 {
    let ply = ply as i32;
    let adjusted = if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    };
    adjusted as i16
}

/// Inverse of [`score_to_tt`].
pub fn score_from_tt(score: i16, ply: usize) -> i32 {
    let score = score as i32;
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

fn promotion_code(piece: Option<Piece>) -> u16 {
    match piece {
        None => 0,
        Some(Piece::Knight) => 1,
        Some(Piece::Bishop) => 2,
        Some(Piece::Rook) => 3,
        Some(_) => 4,
    }
}

/// Pack a move into 16 bits; `None` packs to 0.
///
/// 0 is never a real move: it would be `a1a1`.
pub(crate) fn pack_move(mv: Option<Move>) -> u16 {
    match mv {
        None => 0,
        Some(mv) => mv.from as u16 | (mv.to as u16) << 6 | promotion_code(mv.promotion) << 12,
    }
}

pub(crate) fn unpack_move(raw: u16) -> Option<Move> {
    if raw == 0 {
        return None;
    }
    let promotion = match (raw >> 12) & 0x7 {
        1 => Some(Piece::Knight),
        2 => Some(Piece::Bishop),
        3 => Some(Piece::Rook),
        4 => Some(Piece::Queen),
        _ => None,
    };
    Some(Move {
        from: Square::index((raw & 0x3F) as usize),
        to: Square::index(((raw >> 6) & 0x3F) as usize),
        promotion,
    })
}

struct Slot {
    word0: AtomicU64,
    word1: AtomicU64,
}

impl Slot {
    fn empty() -> Self {
        Self {
            word0: AtomicU64::new(0),
            word1: AtomicU64::new(0),
        }
    }

    fn check_of(w0: u64) -> u64 {
        (w0 >> 32) ^ (w0 & 0xFFFF_FFFF)
    }
}

/// Fixed-size hash of search results keyed by Zobrist key.
///
/// Every method takes `&self`, so one table can be shared between
/// searches on different threads.
pub struct TranspositionTable {
    slots: Box<[Slot]>,
    mask: u64,
    generation: AtomicU8,
}

impl TranspositionTable {
    /// Allocate roughly `mb` megabytes, rounded down to a power-of-two
    /// slot count (at least one slot).
    pub fn new(mb: usize) -> Self {
        let bytes = mb.saturating_mul(1024 * 1024);
        let fit = (bytes / std::mem::size_of::<Slot>()).max(1);
        let count = if fit.is_power_of_two() {
            fit
        } else {
            fit.next_power_of_two() >> 1
        };

        Self {
            slots: (0..count).map(|_| Slot::empty()).collect(),
            mask: (count - 1) as u64,
            generation: AtomicU8::new(0),
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Empty every slot and reset the generation.
    pub fn clear(&self) {
        for slot in self.slots.iter() {
            slot.word0.store(0, Ordering::Relaxed);
            slot.word1.store(0, Ordering::Relaxed);
        }
        self.generation.store(0, Ordering::Relaxed);
    }

    /// Start a new search generation. Entries from earlier generations
    /// become replaceable regardless of depth.
    pub fn new_generation(&self) {
        let next = self.generation.load(Ordering::Relaxed).wrapping_add(1) & GENERATION_MASK;
        self.generation.store(next, Ordering::Relaxed);
    }

    pub fn generation(&self) -> u8 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Look up `key`, converting mate scores for a node at `ply`.
    ///
    /// Misses on an empty slot, a different key, or a torn write.
    pub fn probe(&self, key: u64, ply: usize) -> Option<TtEntry> {
        let slot = &self.slots[(key & self.mask) as usize];
        let w0 = slot.word0.load(Ordering::Relaxed);
        let w1 = slot.word1.load(Ordering::Relaxed);

        if Slot::check_of(w0) != w1 >> 32 || w0 >> 32 != key >> 32 {
            return None;
        }
        let bound = Bound::from_bits(w0 >> 24)?;

        Some(TtEntry {
            best_move: unpack_move((w0 & 0xFFFF) as u16),
            depth: ((w0 >> 16) & 0xFF) as u8,
            score: score_from_tt(((w1 >> 16) & 0xFFFF) as u16 as i16, ply),
            bound,
            generation: ((w0 >> 26) as u8) & GENERATION_MASK,
        })
    }

    /// Record a search result for `key` searched from `ply`.
    ///
    /// The slot is overwritten when it is empty, when it holds an entry
    /// from an older generation, or when `depth` is at least the stored
    /// depth. Otherwise the deeper entry is kept.
    pub fn store(&self, key: u64, depth: u8, score: i32, best_move: Option<Move>, bound: Bound, ply: usize) {
        let slot = &self.slots[(key & self.mask) as usize];
        let generation = self.generation();

        let existing = slot.word0.load(Ordering::Relaxed);
        let replace = Bound::from_bits(existing >> 24).is_none()
            || ((existing >> 26) as u8 & GENERATION_MASK) != generation
            || depth >= ((existing >> 16) & 0xFF) as u8;
        if !replace {
            return;
        }

        let w0 = (key >> 32) << 32
            | (generation as u64) << 26
            | (bound as u64) << 24
            | (depth as u64) << 16
            | pack_move(best_move) as u64;
        let w1 = Slot::check_of(w0) << 32 | ((score_to_tt(score, ply) as u16) as u64) << 16;
        slot.word0.store(w0, Ordering::Relaxed);
        slot.word1.store(w1, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .field("generation", &self.generation())
            .finish()
    }
}
