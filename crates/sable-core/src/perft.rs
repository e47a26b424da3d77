//! Perft (performance test) over the make/unmake path.
//!
//! Besides checking move generation, this exercises the undo stack the
//! search relies on: every node is reached by `make_move` and left by
//! `unmake_move`.

use crate::error::PositionError;
use crate::position::Position;

/// Count the leaf nodes at the given depth.
///
/// Depth 0 returns 1. Depth 1 bulk-counts the legal moves.
pub fn perft(pos: &mut Position, depth: u32) -> Result<u64, PositionError> {
    if depth == 0 {
        return Ok(1);
    }

    let moves = pos.legal_moves();
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0u64;
    for mv in moves {
        pos.make_move(mv)?;
        let count = perft(pos, depth - 1);
        pos.unmake_move()?;
        nodes += count?;
    }
    Ok(nodes)
}

/// Per-move breakdown as `(uci_move, node_count)` pairs, sorted by move.
pub fn divide(pos: &mut Position, depth: u32) -> Result<Vec<(String, u64)>, PositionError> {
    let mut results = Vec::new();
    for mv in pos.legal_moves() {
        let uci = pos.uci(mv);
        pos.make_move(mv)?;
        let count = if depth <= 1 { Ok(1) } else { perft(pos, depth - 1) };
        pos.unmake_move()?;
        results.push((uci, count?));
    }
    results.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(results)
}
