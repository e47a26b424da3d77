//! Command-line runner: search one position and print the best move.
//!
//! ```text
//! sable [--depth N] [--movetime MS] [--nodes N] [--hash MB] [startpos | fen <6 fields>] [moves m1 m2 ...]
//! ```

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use sable_core::{Move, Position};
use sable_engine::search::mate_in;
use sable_engine::{SearchLimits, Searcher};
use tracing::info;

const DEFAULT_DEPTH: u8 = 6;

#[derive(Debug)]
struct RunArgs {
    limits: SearchLimits,
    hash_mb: usize,
    position: Position,
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&str>) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = value.with_context(|| format!("{flag} needs a value"))?;
    value.parse().with_context(|| format!("invalid value for {flag}: {value}"))
}

fn parse_args(args: &[String]) -> Result<RunArgs> {
    let mut limits = SearchLimits::depth(DEFAULT_DEPTH);
    let mut hash_mb = sable_engine::search::DEFAULT_TT_MB;
    let mut tokens = args.iter().map(String::as_str).peekable();

    while let Some(&flag) = tokens.peek() {
        match flag {
            "--depth" => {
                tokens.next();
                limits.max_depth = parse_number(flag, tokens.next())?;
            }
            "--movetime" => {
                tokens.next();
                limits.time_limit = Some(Duration::from_millis(parse_number(flag, tokens.next())?));
                // A time budget alone means "as deep as time allows".
                if limits.max_depth == DEFAULT_DEPTH {
                    limits.max_depth = sable_engine::search::MAX_DEPTH;
                }
            }
            "--nodes" => {
                tokens.next();
                limits.node_limit = Some(parse_number(flag, tokens.next())?);
            }
            "--hash" => {
                tokens.next();
                hash_mb = parse_number(flag, tokens.next())?;
            }
            other if other.starts_with("--") => bail!("unknown option {other}"),
            _ => break,
        }
    }

    let rest: Vec<&str> = tokens.collect();
    let (mut position, moves) = match rest.first().copied() {
        None => (Position::startpos(), &rest[..0]),
        Some("startpos") => (Position::startpos(), &rest[1..]),
        Some("fen") => {
            if rest.len() < 7 {
                bail!("fen needs six fields, got: {}", rest[1..].join(" "));
            }
            (Position::from_fen(&rest[1..7].join(" "))?, &rest[7..])
        }
        Some(other) => bail!("expected `startpos` or `fen`, got {other}"),
    };

    match moves.split_first() {
        None => {}
        Some((&"moves", list)) => {
            for text in list {
                let mv = position.parse_uci_move(text)?;
                position.make_move(mv)?;
            }
        }
        Some((other, _)) => bail!("expected `moves`, got {other}"),
    }

    Ok(RunArgs { limits, hash_mb, position })
}

/// `cp N` or `mate N` (negative when the side to move is mated).
fn format_score(score: i32) -> String {
    match mate_in(score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {score}"),
    }
}

fn format_pv(pos: &Position, pv: &[Move]) -> String {
    let mut pos = pos.clone();
    let mut out = Vec::with_capacity(pv.len());
    for &mv in pv {
        out.push(pos.uci(mv));
        if pos.make_move(mv).is_err() {
            break;
        }
    }
    out.join(" ")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let RunArgs { limits, hash_mb, mut position } = parse_args(&args)?;
    info!(fen = %position, depth = limits.max_depth, hash_mb, "sable starting");

    let mut searcher = Searcher::with_tt_size(hash_mb);
    let root = position.clone();
    let start = Instant::now();
    let result = searcher.search_with(
        &mut position,
        &limits,
        Arc::new(AtomicBool::new(false)),
        |depth, score, nodes, pv| {
            let ms = start.elapsed().as_millis() as u64;
            let nps = nodes * 1000 / ms.max(1);
            println!(
                "info depth {depth} score {} nodes {nodes} nps {nps} time {ms} pv {}",
                format_score(score),
                format_pv(&root, pv)
            );
        },
    )?;

    match result.best_move {
        Some(mv) => println!("bestmove {}", root.uci(mv)),
        None => println!("bestmove 0000"),
    }
    Ok(())
}
