use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{info, warn};
use merge_2048::engine::Direction;
use merge_2048::input::direction_for_key;
use merge_2048::persist::{BestScoreStore, JsonFileStore};
use merge_2048::session::{GameStatus, Session};
use merge_2048::settings::Settings;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(author, version, about = "Play 2048 in the terminal, one command per line")]
struct Args {
    /// TOML settings file (size, prob4, target, max_undo)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Board size, overriding the settings file
    #[arg(long, value_name = "N")]
    size: Option<usize>,

    /// Seed for reproducible games (defaults to OS entropy)
    #[arg(long)]
    seed: Option<u64>,

    /// Where the best score is kept
    #[arg(long, value_name = "FILE", default_value = "best.json")]
    best_file: PathBuf,
}

enum Command {
    Move(Direction),
    Undo,
    Restart,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim();
    match line {
        "u" | "undo" => return Some(Command::Undo),
        "r" | "restart" => return Some(Command::Restart),
        "q" | "quit" | "exit" => return Some(Command::Quit),
        _ => {}
    }
    direction_for_key(line).or_else(|| line.parse().ok()).map(Command::Move)
}

fn print_state(out: &mut impl Write, game: &Session) -> io::Result<()> {
    writeln!(out, "\n{}", game.board())?;
    writeln!(out, "Score: {}  Best: {}", game.score(), game.best())?;
    match game.status() {
        GameStatus::Won => writeln!(out, "Congrats! You hit {}. (u to undo, r to restart)", game.settings().target)?,
        GameStatus::Lost => writeln!(out, "Game over. No moves left. (u to undo, r to restart)")?,
        GameStatus::Playing => {}
    }
    out.flush()
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut settings = match &args.config {
        Some(path) => Settings::from_toml(path).with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(size) = args.size {
        settings.size = size;
    }

    let mut store = JsonFileStore::new(&args.best_file);
    let best = store.load().with_context(|| format!("reading best score from {}", args.best_file.display()))?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut game = Session::new(settings, best, &mut rng).context("starting game")?;
    info!("{}x{} game, target {}, best so far {}", game.board().size(), game.board().size(), game.settings().target, best);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "w/a/s/d or left/up/right/down to move, u undo, r restart, q quit")?;
    print_state(&mut out, &game)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        match parse_command(&line) {
            Some(Command::Move(dir)) => {
                if let Some(report) = game.play(dir, &mut rng) {
                    if report.new_best {
                        if let Err(e) = store.save(report.score) {
                            warn!("could not save best score: {e}");
                        }
                    }
                } else if game.status() == GameStatus::Playing {
                    writeln!(out, "Nothing moves {}.", dir)?;
                }
            }
            Some(Command::Undo) => {
                if !game.undo() {
                    writeln!(out, "Nothing to undo.")?;
                }
            }
            Some(Command::Restart) => game.restart(&mut rng)?,
            Some(Command::Quit) => break,
            None => {
                writeln!(out, "Unrecognised command {:?}", line.trim())?;
                continue;
            }
        }
        print_state(&mut out, &game)?;
    }

    info!("final score {}, best {}", game.score(), game.best());
    Ok(())
}
