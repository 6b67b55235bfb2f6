//! Caller-side game state: board, score, best score, undo history and status.
//!
//! The engine itself is stateless; a `Session` strings engine calls together
//! in the order the game needs them (shift, snapshot, spawn, win/loss check).

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::engine::{Board, Direction, EngineError, Score, SpawnProbability, Tile};
use crate::history::{History, Snapshot};
use crate::settings::{validate_target, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

/// What a committed move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    pub score_gain: Score,
    pub score: Score,
    /// The best score was raised by this move.
    pub new_best: bool,
    pub status: GameStatus,
}

#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    score: Score,
    best: Score,
    history: History,
    settings: Settings,
    status: GameStatus,
}

impl Session {
    /// Start a game. `best` is the previously persisted best score.
    pub fn new<R: Rng + ?Sized>(settings: Settings, best: Score, rng: &mut R) -> Result<Self, EngineError> {
        settings.validate()?;
        let board = Board::start(settings.size, rng, settings.prob4)?;
        let history = History::new(settings.max_undo);
        Ok(Session { board, score: 0, best, history, settings, status: GameStatus::Playing })
    }

    #[inline]
    pub fn board(&self) -> &Board { &self.board }
    #[inline]
    pub fn score(&self) -> Score { self.score }
    #[inline]
    pub fn best(&self) -> Score { self.best }
    #[inline]
    pub fn status(&self) -> GameStatus { self.status }
    #[inline]
    pub fn settings(&self) -> &Settings { &self.settings }
    #[inline]
    pub fn history(&self) -> &History { &self.history }

    /// New game on the current board size; the best score is kept.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EngineError> {
        self.resize(self.settings.size, rng)
    }

    /// New game on an `n`×`n` board.
    pub fn resize<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> Result<(), EngineError> {
        self.board = Board::start(n, rng, self.settings.prob4)?;
        self.settings.size = n;
        self.score = 0;
        self.status = GameStatus::Playing;
        self.history.clear();
        log::debug!("new {}x{} game", n, n);
        Ok(())
    }

    /// Apply one player move.
    ///
    /// Returns `None` when the game is over or the move changes nothing; in
    /// both cases no tile is spawned and history is untouched.
    pub fn play<R: Rng + ?Sized>(&mut self, dir: Direction, rng: &mut R) -> Option<MoveReport> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let outcome = self.board.shift(dir);
        if !outcome.moved {
            log::trace!("{} is blocked", dir);
            return None;
        }
        self.history.push(Snapshot { board: self.board.clone(), score: self.score });
        self.board = outcome.board.with_random_tile(rng, self.settings.prob4);
        self.score = self.score.saturating_add(outcome.score_gain);
        let new_best = self.score > self.best;
        if new_best {
            self.best = self.score;
        }
        self.status = if self.board.highest_tile() >= self.settings.target {
            GameStatus::Won
        } else if !self.board.has_legal_move() {
            GameStatus::Lost
        } else {
            GameStatus::Playing
        };
        log::debug!("{} gained {} (score {}, status {:?})", dir, outcome.score_gain, self.score, self.status);
        Some(MoveReport { score_gain: outcome.score_gain, score: self.score, new_best, status: self.status })
    }

    /// Restore the state before the last committed move. Returns false when
    /// there is nothing to undo. The best score is never lowered.
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(Snapshot { board, score }) => {
                self.board = board;
                self.score = score;
                self.status = GameStatus::Playing;
                true
            }
            None => false,
        }
    }

    /// Applies to tiles spawned from now on.
    pub fn set_prob4(&mut self, prob4: SpawnProbability) {
        self.settings.prob4 = prob4;
    }

    /// Applies from the next move on; the current status is left as is.
    pub fn set_target(&mut self, target: Tile) -> Result<(), EngineError> {
        validate_target(target)?;
        self.settings.target = target;
        Ok(())
    }

    pub fn set_max_undo(&mut self, max_undo: usize) {
        self.settings.max_undo = max_undo;
        self.history.set_capacity(max_undo);
    }

    #[cfg(test)]
    fn with_board(settings: Settings, board: Board) -> Self {
        let history = History::new(settings.max_undo);
        Session { board, score: 0, best: 0, history, settings, status: GameStatus::Playing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(rows: &[&[Tile]]) -> Board {
        Board::from_rows(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn new_session_starts_with_two_tiles() {
        let mut rng = StdRng::seed_from_u64(5);
        let s = Session::new(Settings::default(), 100, &mut rng).unwrap();
        assert_eq!(s.board().count_empty(), 14);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best(), 100);
        assert_eq!(s.status(), GameStatus::Playing);
        assert!(s.history().is_empty());
    }

    #[test]
    fn blocked_move_is_ignored() {
        let mut rng = StdRng::seed_from_u64(1);
        let start = board(&[&[2, 4, 0], &[0, 0, 0], &[0, 0, 0]]);
        let mut s = Session::with_board(Settings::default(), start.clone());
        assert_eq!(s.play(Direction::Up, &mut rng), None);
        assert_eq!(s.board(), &start);
        assert!(s.history().is_empty());
    }

    #[test]
    fn committed_move_scores_spawns_and_snapshots() {
        let mut rng = StdRng::seed_from_u64(2);
        let start = board(&[&[2, 2, 0], &[0, 0, 0], &[0, 0, 0]]);
        let mut s = Session::with_board(Settings::default(), start.clone());
        let report = s.play(Direction::Left, &mut rng).unwrap();
        assert_eq!(report.score_gain, 4);
        assert_eq!(report.score, 4);
        assert!(report.new_best);
        assert_eq!(s.best(), 4);
        assert_eq!(s.board().tile(crate::engine::Cell::new(0, 0)), Some(4));
        assert_eq!(s.board().count_empty(), 7);
        assert_eq!(s.history().peek(), Some(&Snapshot { board: start, score: 0 }));
    }

    #[test]
    fn undo_restores_previous_state() {
        let mut rng = StdRng::seed_from_u64(3);
        let start = board(&[&[2, 2, 0], &[0, 0, 0], &[0, 0, 0]]);
        let mut s = Session::with_board(Settings::default(), start.clone());
        s.play(Direction::Left, &mut rng).unwrap();
        assert!(s.undo());
        assert_eq!(s.board(), &start);
        assert_eq!(s.score(), 0);
        assert_eq!(s.best(), 4);
        assert!(!s.undo());
    }

    #[test]
    fn reaching_target_wins() {
        let mut rng = StdRng::seed_from_u64(4);
        let settings = Settings::new(2, 0.1, 8, 10).unwrap();
        let mut s = Session::with_board(settings, board(&[&[4, 4], &[0, 0]]));
        let report = s.play(Direction::Left, &mut rng).unwrap();
        assert_eq!(report.status, GameStatus::Won);
        assert_eq!(s.play(Direction::Right, &mut rng), None);
        assert!(s.undo());
        assert_eq!(s.status(), GameStatus::Playing);
    }

    #[test]
    fn filling_the_last_gap_loses() {
        // After sliding right, the only empty cell is (0, 0) and the spawn
        // (2 or 4) lands next to an 8 and a 16, leaving no move.
        let mut rng = StdRng::seed_from_u64(6);
        let start = board(&[&[8, 0], &[16, 32]]);
        let mut s = Session::with_board(Settings::default(), start);
        let report = s.play(Direction::Right, &mut rng).unwrap();
        assert_eq!(report.score_gain, 0);
        assert_eq!(report.status, GameStatus::Lost);
        assert_eq!(s.play(Direction::Left, &mut rng), None);
    }

    #[test]
    fn score_saturates_instead_of_overflowing() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut s = Session::with_board(Settings::default(), board(&[&[1 << 62, 1 << 62], &[0, 0]]));
        s.score = Score::MAX - 1;
        let report = s.play(Direction::Left, &mut rng).unwrap();
        assert_eq!(report.score, Score::MAX);
        assert_eq!(s.best(), Score::MAX);
        assert_eq!(report.status, GameStatus::Won);
    }

    #[test]
    fn restart_keeps_best_and_clears_history() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut s = Session::with_board(Settings::default(), board(&[&[2, 2], &[0, 0]]));
        s.play(Direction::Left, &mut rng).unwrap();
        s.restart(&mut rng).unwrap();
        assert_eq!(s.score(), 0);
        assert_eq!(s.best(), 4);
        assert!(s.history().is_empty());
        assert_eq!(s.board().size(), 4);
        s.resize(6, &mut rng).unwrap();
        assert_eq!(s.board().size(), 6);
        assert_eq!(s.settings().size, 6);
        assert!(s.resize(0, &mut rng).is_err());
        assert_eq!(s.board().size(), 6);
    }

    #[test]
    fn settings_updates() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut s = Session::new(Settings::default(), 0, &mut rng).unwrap();
        for dir in Direction::ALL.iter().cycle().take(40) {
            s.play(*dir, &mut rng);
        }
        s.set_max_undo(1);
        assert!(s.history().len() <= 1);
        assert!(s.set_target(1000).is_err());
        s.set_target(64).unwrap();
        assert_eq!(s.settings().target, 64);
        s.set_prob4(SpawnProbability::new(1.0).unwrap());
        s.restart(&mut rng).unwrap();
        assert!(s.board().rows().iter().flatten().all(|&v| v == 0 || v == 4));
    }
}
