//! merge-2048: a size-agnostic 2048 board engine plus the session plumbing around it
//!
//! This crate provides:
//! - An immutable `Board` type with the game's pure operations (`shift`, `with_random_tile`,
//!   `rotate_clockwise`, `has_legal_move`, ...) and the row-level `collapse_row`
//! - A caller-owned `Session` (`session` module) tracking score, best score, undo history and
//!   win/loss status
//! - Validated `Settings` loadable from TOML (`settings` module)
//! - Best-score persistence behind the `BestScoreStore` trait (`persist` module)
//! - Key and swipe mapping to directions (`input` module)
//!
//! Quick start:
//! ```
//! use merge_2048::engine::{Board, Direction, SpawnProbability};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! // Randomness is always passed in, so a seeded RNG makes games reproducible
//! let mut rng = StdRng::seed_from_u64(42);
//! let b0 = Board::start(4, &mut rng, SpawnProbability::DEFAULT).unwrap();
//! let out = b0.shift(Direction::Left);
//! let b1 = if out.moved { out.board.with_random_tile(&mut rng, SpawnProbability::DEFAULT) } else { b0 };
//! assert!(b1.count_empty() <= 14);
//! ```
//!
//! Full loop with a session
//! ```
//! use merge_2048::engine::Direction;
//! use merge_2048::session::{GameStatus, Session};
//! use merge_2048::settings::Settings;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(123);
//! let mut game = Session::new(Settings::default(), 0, &mut rng).unwrap();
//! let mut moves = 0u32;
//! while game.status() == GameStatus::Playing && moves < 8 {
//!     for dir in Direction::ALL {
//!         if game.play(dir, &mut rng).is_some() {
//!             moves += 1;
//!             break;
//!         }
//!     }
//! }
//! assert!(moves > 0);
//! assert!(game.best() >= game.score());
//! ```
//!
pub mod engine;
pub mod history;
pub mod input;
pub mod persist;
pub mod session;
pub mod settings;
