use clap::Parser;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use merge_2048::engine::{Board, Direction, Score, SpawnProbability, Tile};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "simulate", about = "Play random-move games in parallel and report score statistics")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 1000)]
    games: u64,

    /// Board size
    #[arg(long, default_value_t = 4)]
    size: usize,

    /// Base seed; game i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Probability of spawning a 4
    #[arg(long, default_value_t = 0.1)]
    prob4: f64,

    /// Hide the progress bar
    #[arg(long)]
    quiet: bool,
}

struct GameResult {
    score: Score,
    moves: u64,
    highest_tile: Tile,
}

fn play_random_game(size: usize, seed: u64, prob4: SpawnProbability) -> anyhow::Result<GameResult> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut board = Board::start(size, &mut rng, prob4)?;
    let mut score = 0;
    let mut moves = 0;
    let mut dirs = Direction::ALL;
    while board.has_legal_move() {
        dirs.shuffle(&mut rng);
        let Some(outcome) = dirs.iter().map(|&d| board.shift(d)).find(|o| o.moved) else {
            break;
        };
        score += outcome.score_gain;
        moves += 1;
        board = outcome.board.with_random_tile(&mut rng, prob4);
    }
    Ok(GameResult { score, moves, highest_tile: board.highest_tile() })
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let prob4 = SpawnProbability::new(args.prob4)?;

    let pb = if args.quiet { ProgressBar::hidden() } else { ProgressBar::new(args.games) };
    pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} games {elapsed_precise}")?);

    let start = Instant::now();
    let results = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let r = play_random_game(args.size, args.seed.wrapping_add(i), prob4);
            pb.inc(1);
            r
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    pb.finish_and_clear();

    let total_moves: u64 = results.iter().map(|r| r.moves).sum();
    let mean_score = results.iter().map(|r| r.score as f64).sum::<f64>() / results.len().max(1) as f64;
    let max_score = results.iter().map(|r| r.score).max().unwrap_or(0);
    let mut tiles: BTreeMap<Tile, u64> = BTreeMap::new();
    for r in &results {
        *tiles.entry(r.highest_tile).or_default() += 1;
    }

    info!(
        "{} games on {}x{} in {:.2?}: {} moves, mean score {:.1}, max score {}",
        results.len(),
        args.size,
        args.size,
        start.elapsed(),
        total_moves,
        mean_score,
        max_score
    );
    for (tile, count) in tiles {
        info!("highest tile {:>6}: {} games", tile, count);
    }
    Ok(())
}
