//! End-to-end behaviour of the iterative-deepening searcher.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use sable_core::{GameStatus, Piece, Position};
use sable_engine::{Evaluator, MATE_SCORE, MATE_THRESHOLD, SearchLimits, SearchOptions, Searcher};

const KIWIPETE_FEN: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// Black to move after 1.f3 e5 2.g4: Qh4 mates.
const FOOLS_MATE_FEN: &str = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";

const SCHOLARS_MATE_FEN: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

fn position(fen: &str) -> Position {
    fen.parse().unwrap()
}

fn best_uci(pos: &Position, searcher: &mut Searcher, limits: &SearchLimits) -> (String, i32) {
    let mut pos = pos.clone();
    let result = searcher.search(&mut pos, limits).unwrap();
    let mv = result.best_move.expect("root has legal moves");
    (pos.uci(mv), result.score)
}

// ── Mates and draws ──────────────────────────────────────────────────────────

#[test]
fn finds_fools_mate_at_every_depth() {
    for depth in 1..=4 {
        let mut pos = position(FOOLS_MATE_FEN);
        let result = Searcher::with_tt_size(1).search(&mut pos, &SearchLimits::depth(depth)).unwrap();
        let mv = result.best_move.unwrap();
        assert_eq!(pos.uci(mv), "d8h4", "depth {depth}");
        assert!(result.score > MATE_THRESHOLD, "depth {depth}: score {}", result.score);
        assert_eq!(result.mate_in(), Some(1));

        pos.make_move(mv).unwrap();
        assert_eq!(pos.game_status(), GameStatus::Checkmate);
    }
}

#[test]
fn finds_scholars_mate() {
    let (mv, score) = best_uci(&position(SCHOLARS_MATE_FEN), &mut Searcher::with_tt_size(1), &SearchLimits::depth(3));
    assert_eq!(mv, "h5f7");
    assert_eq!(score, MATE_SCORE - 1);
}

#[test]
fn checkmated_root_has_no_move() {
    let mut pos = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3");
    let result = Searcher::with_tt_size(1).search(&mut pos, &SearchLimits::depth(3)).unwrap();
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, -MATE_SCORE);
    assert!(result.pv.is_empty());
}

#[test]
fn stalemated_root_scores_zero() {
    let mut pos = position("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
    let result = Searcher::with_tt_size(1).search(&mut pos, &SearchLimits::depth(5)).unwrap();
    assert_eq!(result.best_move, None);
    assert_eq!(result.score, 0);
}

#[test]
fn avoids_stalemating_when_winning() {
    // Qb6 would stalemate; any sensible move keeps the win.
    let mut pos = position("k7/2K5/8/1Q6/8/8/8/8 w - - 0 1");
    let result = Searcher::with_tt_size(1).search(&mut pos, &SearchLimits::depth(4)).unwrap();
    let mv = result.best_move.unwrap();
    assert_ne!(pos.uci(mv), "b5b6");
    assert!(result.score > 500);
}

#[test]
fn mate_on_the_fifty_move_boundary_beats_the_draw() {
    let mut pos = position("6k1/5ppp/8/8/8/8/8/R5K1 w - - 99 80");
    let result = Searcher::with_tt_size(1).search(&mut pos, &SearchLimits::depth(3)).unwrap();
    let mv = result.best_move.unwrap();
    assert_eq!(pos.uci(mv), "a1a8");
    assert_eq!(result.score, MATE_SCORE - 1);

    pos.make_move(mv).unwrap();
    assert_eq!(pos.game_status(), GameStatus::Checkmate);
}

// ── Play quality ─────────────────────────────────────────────────────────────

#[test]
fn opening_move_is_sensible() {
    let (mv, score) = best_uci(&Position::startpos(), &mut Searcher::with_tt_size(4), &SearchLimits::depth(3));
    assert!(["e2e4", "d2d4", "g1f3", "c2c4"].contains(&mv.as_str()), "unexpected opening move {mv}");
    assert!((-50..=50).contains(&score), "score {score}");
}

#[test]
fn wins_a_hanging_queen() {
    let pos = position("4k3/8/8/3q4/8/4N3/4P3/4K3 w - - 0 1");
    for options in [SearchOptions::default(), SearchOptions::exhaustive()] {
        let mut searcher = Searcher::with_tt_size(1).with_options(options);
        let (mv, score) = best_uci(&pos, &mut searcher, &SearchLimits::depth(4));
        assert_eq!(mv, "e3d5");
        assert!(score > 200);
    }
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[test]
fn search_is_deterministic() {
    let pos = position(KIWIPETE_FEN);
    let limits = SearchLimits::depth(4);

    let mut first = pos.clone();
    let a = Searcher::with_tt_size(4).search(&mut first, &limits).unwrap();
    let mut second = pos.clone();
    let b = Searcher::with_tt_size(4).search(&mut second, &limits).unwrap();
    assert_eq!((a.best_move, a.score, a.nodes, &a.pv), (b.best_move, b.score, b.nodes, &b.pv));

    // A cleared table behaves like a fresh one.
    let mut searcher = Searcher::with_tt_size(4);
    let mut third = pos.clone();
    searcher.search(&mut third, &SearchLimits::depth(3)).unwrap();
    searcher.new_game();
    let c = searcher.search(&mut third, &limits).unwrap();
    assert_eq!((a.best_move, a.score, a.nodes), (c.best_move, c.score, c.nodes));
}

#[test]
fn position_is_restored_after_search() {
    let mut pos = position(KIWIPETE_FEN);
    pos.make_move(pos.parse_uci_move("e1g1").unwrap()).unwrap();
    let before = pos.clone();

    let mut searcher = Searcher::with_tt_size(1);
    searcher.search(&mut pos, &SearchLimits::depth(4)).unwrap();
    assert_eq!(pos, before);

    // Interrupted mid-iteration as well.
    searcher.search(&mut pos, &SearchLimits::depth(30).with_nodes(20_000)).unwrap();
    assert_eq!(pos, before);
}

#[test]
fn time_budget_is_respected() {
    let budget = Duration::from_millis(500);
    let mut pos = position(KIWIPETE_FEN);
    let mut searcher = Searcher::with_tt_size(8);

    let start = Instant::now();
    let result = searcher.search(&mut pos, &SearchLimits::default().with_time(budget)).unwrap();
    let elapsed = start.elapsed();

    assert!(elapsed <= budget * 110 / 100, "took {elapsed:?} for a {budget:?} budget");
    let mv = result.best_move.unwrap();
    assert!(pos.is_legal(mv));
}

#[test]
fn node_budget_is_respected() {
    let mut pos = position(KIWIPETE_FEN);
    let result = Searcher::with_tt_size(1)
        .search(&mut pos, &SearchLimits::depth(40).with_nodes(5_000))
        .unwrap();
    assert!(result.nodes <= 5_000, "visited {} nodes", result.nodes);
    assert!(pos.is_legal(result.best_move.unwrap()));
}

#[test]
fn tiny_node_budget_falls_back_to_a_legal_move() {
    let mut pos = position(KIWIPETE_FEN);
    let result = Searcher::with_tt_size(1)
        .search(&mut pos, &SearchLimits::depth(10).with_nodes(1))
        .unwrap();
    assert_eq!(result.depth, 0);
    assert!(pos.is_legal(result.best_move.unwrap()));
    assert_eq!(result.pv, vec![result.best_move.unwrap()]);
}

#[test]
fn stop_flag_ends_search_early() {
    let mut pos = position(KIWIPETE_FEN);
    let stop = Arc::new(AtomicBool::new(false));
    let stopper = {
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            stop.store(true, Ordering::Relaxed);
        })
    };

    let start = Instant::now();
    let result = Searcher::with_tt_size(8)
        .search_with(&mut pos, &SearchLimits::default(), stop, |_, _, _, _| {})
        .unwrap();
    stopper.join().unwrap();

    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(result.depth < 64);
    assert!(pos.is_legal(result.best_move.unwrap()));
}

#[test]
fn stop_after_first_iteration_keeps_its_result() {
    let mut pos = Position::startpos();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let result = Searcher::with_tt_size(1)
        .search_with(&mut pos, &SearchLimits::depth(10), stop, move |depth, _, _, _| {
            if depth == 1 {
                flag.store(true, Ordering::Relaxed);
            }
        })
        .unwrap();
    assert_eq!(result.depth, 1);
    assert!(result.best_move.is_some());
}

// ── Pluggable evaluation ─────────────────────────────────────────────────────

/// Counts material only, from the side to move's point of view.
struct MaterialOnly;

impl Evaluator for MaterialOnly {
    fn evaluate(&self, pos: &Position) -> i32 {
        const VALUES: [i32; 6] = [100, 300, 300, 500, 900, 0];
        let board = pos.board();
        let stm = pos.side_to_move();
        Piece::ALL
            .iter()
            .map(|&piece| {
                let ours = board.colored_pieces(stm, piece).len() as i32;
                let theirs = board.colored_pieces(!stm, piece).len() as i32;
                (ours - theirs) * VALUES[piece as usize]
            })
            .sum()
    }
}

#[test]
fn custom_evaluator_drives_the_search() {
    let mut pos = position("4k3/8/8/3q4/8/4N3/4P3/4K3 w - - 0 1");
    let mut searcher = Searcher::with_evaluator(MaterialOnly);
    let result = searcher.search(&mut pos, &SearchLimits::depth(3)).unwrap();
    assert_eq!(pos.uci(result.best_move.unwrap()), "e3d5");
    assert_eq!(result.score, 400);
}
