//! Best-score persistence.
//!
//! The game only ever persists one number. It is loaded once when a session
//! starts and saved whenever it improves; nothing else reaches storage.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::engine::Score;

/// Key under which the best score is stored.
pub const BEST_KEY: &str = "best";

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed store: {0}")]
    Malformed(String),
}

pub trait BestScoreStore {
    /// Stored best score, or 0 when nothing has been saved yet.
    fn load(&self) -> Result<Score, PersistError>;
    fn save(&mut self, best: Score) -> Result<(), PersistError>;
}

/// JSON object on disk, e.g. `{"best": 2048}`. Unrelated keys are preserved.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    fn read_map(&self) -> Result<Map<String, Value>, PersistError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => Ok(map),
            other => Err(PersistError::Malformed(format!("expected a JSON object, got {}", other))),
        }
    }
}

impl BestScoreStore for JsonFileStore {
    fn load(&self) -> Result<Score, PersistError> {
        let map = self.read_map()?;
        match map.get(BEST_KEY) {
            None | Some(Value::Null) => Ok(0),
            Some(v) => v
                .as_u64()
                .ok_or_else(|| PersistError::Malformed(format!("{:?} is not a non-negative integer: {}", BEST_KEY, v))),
        }
    }

    fn save(&mut self, best: Score) -> Result<(), PersistError> {
        let mut map = self.read_map()?;
        map.insert(BEST_KEY.to_string(), Value::from(best));
        let text = serde_json::to_string_pretty(&Value::Object(map))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, text)?;
        log::debug!("saved best score {} to {}", best, self.path.display());
        Ok(())
    }
}

/// In-memory store, mostly for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    best: Option<Score>,
}

impl BestScoreStore for MemoryStore {
    fn load(&self) -> Result<Score, PersistError> {
        Ok(self.best.unwrap_or(0))
    }

    fn save(&mut self, best: Score) -> Result<(), PersistError> {
        self.best = Some(best);
        Ok(())
    }
}
