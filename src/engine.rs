use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Tile = u64;
pub type Score = u64;

/// A direction to slide/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Left, Direction::Up, Direction::Right, Direction::Down];

    /// Number of clockwise quarter turns that turn a slide in this direction
    /// into a left slide.
    ///
    /// Up is 3 and Down is 1, not the other way round: one clockwise turn puts
    /// a column's bottom cell first, so a left slide then moves tiles down.
    #[inline]
    pub fn rotations(self) -> i32 {
        match self {
            Direction::Left => 0,
            Direction::Down => 1,
            Direction::Right => 2,
            Direction::Up => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = EngineError;

    /// Parse `left`, `up`, `right` or `down` (any case). Anything else is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "up" => Ok(Direction::Up),
            "right" => Ok(Direction::Right),
            "down" => Ok(Direction::Down),
            _ => Err(EngineError::UnknownDirection(s.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("board must be square and non-empty, got {rows} row(s) with a row of length {cols}")]
    InvalidDimension { rows: usize, cols: usize },
    #[error("spawn probability must be within [0, 1], got {0}")]
    InvalidProbability(f64),
    #[error("tile {value} at ({row}, {col}) is neither empty nor a power of two")]
    InvalidTile { row: usize, col: usize, value: Tile },
    #[error("target tile must be a power of two >= 2, got {0}")]
    InvalidTarget(Tile),
    #[error("unknown direction {0:?}")]
    UnknownDirection(String),
}

/// Probability that a spawned tile is a 4 rather than a 2. Always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SpawnProbability(f64);

impl SpawnProbability {
    pub const DEFAULT: SpawnProbability = SpawnProbability(0.1);

    pub fn new(p: f64) -> Result<Self, EngineError> {
        if (0.0..=1.0).contains(&p) {
            Ok(SpawnProbability(p))
        } else {
            Err(EngineError::InvalidProbability(p))
        }
    }

    #[inline]
    pub fn get(self) -> f64 { self.0 }
}

impl Default for SpawnProbability {
    fn default() -> Self { Self::DEFAULT }
}

impl TryFrom<f64> for SpawnProbability {
    type Error = EngineError;
    fn try_from(p: f64) -> Result<Self, Self::Error> { SpawnProbability::new(p) }
}

impl From<SpawnProbability> for f64 {
    fn from(p: SpawnProbability) -> Self { p.0 }
}

/// A (row, column) coordinate, 0-indexed from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self { Cell { row, col } }
}

/// Result of collapsing a single line towards its start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCollapse {
    pub row: Vec<Tile>,
    pub score_gain: Score,
    pub changed: bool,
}

/// Result of sliding a whole board in one direction (no random insert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub board: Board,
    pub moved: bool,
    pub score_gain: Score,
}

/// Square n×n board of tile values stored row-major. 0 is an empty cell.
///
/// Boards are values: every operation returns a new board and leaves the
/// receiver untouched. Serializes as nested rows and validates on the way in.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Tile>>", into = "Vec<Vec<Tile>>")]
pub struct Board {
    size: usize,
    cells: Vec<Tile>,
}

impl Board {
    /// An n×n board of zeros. `n == 0` is rejected.
    ///
    /// ```
    /// use merge_2048::engine::Board;
    /// let b = Board::empty(4).unwrap();
    /// assert_eq!(b.count_empty(), 16);
    /// assert!(Board::empty(0).is_err());
    /// ```
    pub fn empty(n: usize) -> Result<Self, EngineError> {
        if n == 0 {
            return Err(EngineError::InvalidDimension { rows: 0, cols: 0 });
        }
        Ok(Board { size: n, cells: vec![0; n * n] })
    }

    /// Build a board from nested rows, checking shape and tile values.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, EngineError> {
        let n = rows.len();
        if n == 0 {
            return Err(EngineError::InvalidDimension { rows: 0, cols: 0 });
        }
        let mut cells = Vec::with_capacity(n * n);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(EngineError::InvalidDimension { rows: n, cols: row.len() });
            }
            for (c, value) in row.into_iter().enumerate() {
                if value != 0 && (value < 2 || !value.is_power_of_two()) {
                    return Err(EngineError::InvalidTile { row: r, col: c, value });
                }
                cells.push(value);
            }
        }
        Ok(Board { size: n, cells })
    }

    /// A fresh board with two random tiles.
    ///
    /// On a 1×1 board the second spawn finds no empty cell and is a no-op.
    ///
    /// ```
    /// use merge_2048::engine::{Board, SpawnProbability};
    /// use rand::{rngs::StdRng, SeedableRng};
    /// let mut rng = StdRng::seed_from_u64(42);
    /// let b = Board::start(4, &mut rng, SpawnProbability::DEFAULT).unwrap();
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn start<R: Rng + ?Sized>(n: usize, rng: &mut R, prob4: SpawnProbability) -> Result<Self, EngineError> {
        Ok(Board::empty(n)?.with_random_tile(rng, prob4).with_random_tile(rng, prob4))
    }

    #[inline]
    pub fn size(&self) -> usize { self.size }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize { row * self.size + col }

    /// Tile at `cell`, or `None` when out of bounds.
    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        if cell.row < self.size && cell.col < self.size {
            Some(self.cells[self.index(cell.row, cell.col)])
        } else {
            None
        }
    }

    /// Borrow row `r` as a slice. Panics if `r >= size`.
    #[inline]
    pub fn row(&self, r: usize) -> &[Tile] {
        &self.cells[r * self.size..(r + 1) * self.size]
    }

    pub fn rows(&self) -> Vec<Vec<Tile>> {
        self.cells.chunks(self.size).map(<[Tile]>::to_vec).collect()
    }

    /// All empty cells in row-major order.
    ///
    /// Spawning indexes into this list, so the order is part of the contract.
    pub fn empty_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == 0)
            .map(|(i, _)| Cell::new(i / self.size, i % self.size))
            .collect()
    }

    #[inline]
    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 0).count()
    }

    /// Highest tile value on the board (0 for an empty board).
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Sum of all tiles, saturating at `Tile::MAX`.
    pub fn tile_sum(&self) -> Tile {
        self.cells.iter().fold(0, |acc: Tile, &v| acc.saturating_add(v))
    }

    /// Insert a 2 (or a 4 with probability `prob4`) into a random empty cell.
    ///
    /// Draws one uniform float to pick the cell (`floor(u * empty_count)` into
    /// [`Board::empty_cells`]) and a second to pick the value. A full board is
    /// returned unchanged and nothing is drawn.
    pub fn with_random_tile<R: Rng + ?Sized>(&self, rng: &mut R, prob4: SpawnProbability) -> Self {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return self.clone();
        }
        let u: f64 = rng.gen();
        let pick = ((u * empty.len() as f64) as usize).min(empty.len() - 1);
        let cell = empty[pick];
        let value = if rng.gen::<f64>() < prob4.get() { 4 } else { 2 };
        let mut next = self.clone();
        let idx = next.index(cell.row, cell.col);
        next.cells[idx] = value;
        next
    }

    /// Rotate a quarter turn clockwise: `(r, c)` moves to `(c, n - 1 - r)`.
    pub fn rotate_clockwise(&self) -> Self {
        let n = self.size;
        let mut cells = vec![0; n * n];
        for r in 0..n {
            for c in 0..n {
                cells[c * n + (n - 1 - r)] = self.cells[r * n + c];
            }
        }
        Board { size: n, cells }
    }

    /// Rotate clockwise `k` quarter turns; `k` is taken modulo 4 (negative allowed).
    pub fn rotate_times(&self, k: i32) -> Self {
        (0..k.rem_euclid(4)).fold(self.clone(), |b, _| b.rotate_clockwise())
    }

    /// Slide and merge every line towards `dir`. No randomness.
    ///
    /// ```
    /// use merge_2048::engine::{Board, Direction};
    /// let b = Board::from_rows(vec![vec![2, 2], vec![0, 0]]).unwrap();
    /// let out = b.shift(Direction::Left);
    /// assert!(out.moved);
    /// assert_eq!(out.score_gain, 4);
    /// assert_eq!(out.board.rows(), vec![vec![4, 0], vec![0, 0]]);
    /// ```
    pub fn shift(&self, dir: Direction) -> MoveOutcome {
        let times = dir.rotations();
        let rotated = self.rotate_times(times);
        let mut cells = Vec::with_capacity(rotated.cells.len());
        let mut moved = false;
        let mut score_gain = 0;
        for line in rotated.cells.chunks(rotated.size) {
            let collapsed = collapse_row(line);
            moved |= collapsed.changed;
            score_gain = Score::saturating_add(score_gain, collapsed.score_gain);
            cells.extend(collapsed.row);
        }
        let board = Board { size: self.size, cells }.rotate_times(4 - times);
        MoveOutcome { board, moved, score_gain }
    }

    /// True if an empty cell exists or two orthogonal neighbours are equal.
    pub fn has_legal_move(&self) -> bool {
        if self.cells.contains(&0) {
            return true;
        }
        let n = self.size;
        for r in 0..n {
            for c in 0..n {
                let v = self.cells[self.index(r, c)];
                if (r + 1 < n && self.cells[self.index(r + 1, c)] == v)
                    || (c + 1 < n && self.cells[self.index(r, c + 1)] == v)
                {
                    return true;
                }
            }
        }
        false
    }

    #[inline]
    pub fn is_game_over(&self) -> bool { !self.has_legal_move() }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board").field("size", &self.size).field("rows", &self.rows()).finish()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = "-".repeat(self.size * 8 - 1);
        for (r, row) in self.cells.chunks(self.size).enumerate() {
            if r > 0 {
                writeln!(f, "{}", separator)?;
            }
            let line: Vec<String> = row.iter().map(format_val).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<Tile>>> for Board {
    type Error = EngineError;
    fn try_from(rows: Vec<Vec<Tile>>) -> Result<Self, Self::Error> { Board::from_rows(rows) }
}

impl From<Board> for Vec<Vec<Tile>> {
    fn from(b: Board) -> Self { b.rows() }
}

/// Slide one line towards index 0, merging equal neighbours once.
///
/// A freshly merged tile is not merged again in the same pass, so
/// `[2, 2, 2, 0]` becomes `[4, 2, 0, 0]`. A pair whose sum would not fit in
/// a `Tile` (two `1 << 63` tiles) stays unmerged.
///
/// ```
/// use merge_2048::engine::collapse_row;
/// let out = collapse_row(&[2, 2, 2, 2]);
/// assert_eq!(out.row, vec![4, 4, 0, 0]);
/// assert_eq!(out.score_gain, 8);
/// ```
pub fn collapse_row(row: &[Tile]) -> RowCollapse {
    let compressed: Vec<Tile> = row.iter().copied().filter(|&v| v != 0).collect();
    let mut merged = Vec::with_capacity(row.len());
    let mut score_gain = 0;
    let mut i = 0;
    while i < compressed.len() {
        let tile = compressed[i];
        let doubled = tile.checked_mul(2).filter(|_| compressed.get(i + 1) == Some(&tile));
        if let Some(doubled) = doubled {
            merged.push(doubled);
            score_gain = Score::saturating_add(score_gain, doubled);
            i += 2;
        } else {
            merged.push(tile);
            i += 1;
        }
    }
    merged.resize(row.len(), 0);
    let changed = merged.as_slice() != row;
    RowCollapse { row: merged, score_gain, changed }
}

/// Slide/merge tiles in the given direction. No randomness.
pub fn shift(board: &Board, dir: Direction) -> MoveOutcome { board.shift(dir) }

/// True if no direction can change the board.
pub fn is_game_over(board: &Board) -> bool { board.is_game_over() }

fn format_val(val: &Tile) -> String {
    match val {
        0 => String::from("       "),
        &x => {
            let mut x = x.to_string();
            while x.len() < 7 {
                match x.len() {
                    6 => x = format!(" {}", x),
                    _ => x = format!(" {} ", x),
                }
            }
            x
        }
    }
}
