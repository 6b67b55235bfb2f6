use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::{EngineError, SpawnProbability, Tile};

/// Board sizes offered by the front end.
pub const BOARD_SIZES: [usize; 4] = [3, 4, 5, 6];
/// Target tiles offered by the front end.
pub const TARGET_CHOICES: [Tile; 4] = [512, 1024, 2048, 4096];
/// Upper bound of the front end's spawn-probability slider.
pub const MAX_PROB4_CHOICE: f64 = 0.5;
/// Upper bound of the front end's undo-depth slider.
pub const MAX_UNDO_CHOICE: usize = 50;

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid settings: {0}")]
    Invalid(#[from] EngineError),
}

/// Game parameters. Every field is optional in TOML and falls back to its default.
///
/// ```toml
/// size = 5
/// prob4 = 0.2
/// target = 1024
/// max_undo = 3
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "defaults::size")]
    pub size: usize,
    /// Probability that a spawned tile is a 4.
    #[serde(default)]
    pub prob4: SpawnProbability,
    /// Reaching a tile of at least this value wins the game.
    #[serde(default = "defaults::target")]
    pub target: Tile,
    /// Number of moves that can be undone.
    #[serde(default = "defaults::max_undo")]
    pub max_undo: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            size: defaults::size(),
            prob4: SpawnProbability::DEFAULT,
            target: defaults::target(),
            max_undo: defaults::max_undo(),
        }
    }
}

impl Settings {
    pub fn new(size: usize, prob4: f64, target: Tile, max_undo: usize) -> Result<Self, EngineError> {
        let settings = Self { size, prob4: SpawnProbability::new(prob4)?, target, max_undo };
        settings.validate()?;
        Ok(settings)
    }

    /// Reject a zero board size or a target that is not a power of two >= 2.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.size == 0 {
            return Err(EngineError::InvalidDimension { rows: 0, cols: 0 });
        }
        validate_target(self.target)?;
        Ok(())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }
}

pub(crate) fn validate_target(target: Tile) -> Result<(), EngineError> {
    if target >= 2 && target.is_power_of_two() {
        Ok(())
    } else {
        Err(EngineError::InvalidTarget(target))
    }
}

mod defaults {
    use crate::engine::Tile;

    pub fn size() -> usize { 4 }
    pub fn target() -> Tile { 2048 }
    pub fn max_undo() -> usize { 10 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_front_end() {
        let s = Settings::default();
        assert_eq!(s.size, 4);
        assert_eq!(s.prob4.get(), 0.1);
        assert_eq!(s.target, 2048);
        assert_eq!(s.max_undo, 10);
        assert!(BOARD_SIZES.contains(&s.size));
        assert!(TARGET_CHOICES.contains(&s.target));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let s = Settings::from_toml_str("size = 5\nprob4 = 0.25\n").unwrap();
        assert_eq!(s.size, 5);
        assert_eq!(s.prob4.get(), 0.25);
        assert_eq!(s.target, 2048);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(Settings::from_toml_str("prob4 = 1.5"), Err(SettingsError::Toml(_))));
        assert!(matches!(
            Settings::from_toml_str("target = 1000"),
            Err(SettingsError::Invalid(EngineError::InvalidTarget(1000)))
        ));
        assert!(matches!(
            Settings::from_toml_str("size = 0"),
            Err(SettingsError::Invalid(EngineError::InvalidDimension { .. }))
        ));
        assert!(Settings::new(4, -0.5, 2048, 10).is_err());
        assert!(Settings::new(4, 0.5, 1, 10).is_err());
        assert!(Settings::new(6, 0.5, 4096, 0).is_ok());
    }

    #[test]
    fn loads_from_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, "size = 3\ntarget = 512\nmax_undo = 2").unwrap();
        let s = Settings::from_toml(tmp.path()).unwrap();
        assert_eq!((s.size, s.target, s.max_undo), (3, 512, 2));
        assert!(matches!(Settings::from_toml("/nonexistent/merge-2048.toml"), Err(SettingsError::Io(_))));
    }
}
