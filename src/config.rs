use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::snake::{Cell, Direction};

pub const DEFAULT_GRID_SIZE: u16 = 24;
pub const DEFAULT_WIN_SCORE: u32 = 100;
pub const DEFAULT_MAX_CATCH_UP_TICKS: u32 = 5;

/// Foods eaten between two speed-ups.
const FOODS_PER_SPEED_UP: u32 = 7;
const SPEED_STEPS: u32 = 10;

/// The only error class the simulation core raises.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size must be at least 1 tile")]
    EmptyGrid,
    #[error("win score must be at least 1")]
    ZeroWinScore,
    #[error("initial snake length must be at least 1")]
    ZeroLength,
    #[error("initial snake ({length} cells from {head:?}) does not fit on a {grid_size}x{grid_size} grid")]
    SnakeOutOfBounds { head: Cell, length: usize, grid_size: u16 },
    #[error("initial snake of {length} cells leaves no room for food on a {grid_size}x{grid_size} grid")]
    NoRoomForFood { length: usize, grid_size: u16 },
    #[error("step interval must be a positive number of milliseconds, got {0}")]
    InvalidStepInterval(f64),
    #[error("catch-up cap must allow at least one tick per frame")]
    ZeroCatchUp,
    #[error("could not read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse config file {}: {source}", .path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    pub fn base_step_interval_ms(self) -> f64 {
        match self {
            Difficulty::Easy => 150.0,
            Difficulty::Normal => 100.0,
            Difficulty::Hard => 70.0,
        }
    }

    /// Interval between ticks for a run that has reached `score`.
    /// Speeds up by a tenth of the base every few foods, bottoming out at a tenth.
    pub fn step_interval_ms(self, score: u32) -> f64 {
        let base = self.base_step_interval_ms();
        let speed_ups = (score / FOODS_PER_SPEED_UP).min(SPEED_STEPS - 1);
        base * f64::from(SPEED_STEPS - speed_ups) / f64::from(SPEED_STEPS)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub grid_size: u16,
    pub initial_length: usize,
    pub initial_position: Cell,
    pub initial_direction: Direction,
    pub win_score: u32,
    pub difficulty: Difficulty,
    pub max_catch_up_ticks: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        let centre = i32::from(DEFAULT_GRID_SIZE / 2);
        GameConfig {
            grid_size: DEFAULT_GRID_SIZE,
            initial_length: 3,
            initial_position: Cell::new(centre, centre),
            initial_direction: Direction::Right,
            win_score: DEFAULT_WIN_SCORE,
            difficulty: Difficulty::Normal,
            max_catch_up_ticks: DEFAULT_MAX_CATCH_UP_TICKS,
        }
    }
}

impl GameConfig {
    /// Default config on a grid of another size, with the snake re-centred.
    pub fn with_grid_size(grid_size: u16) -> Self {
        let centre = i32::from(grid_size / 2);
        GameConfig {
            grid_size,
            initial_position: Cell::new(centre, centre),
            ..Default::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_owned(), source })?;
        let config: GameConfig = serde_json::from_str(&text)
            .map_err(|source| ConfigError::Parse { path: path.to_owned(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let res = validate_layout(
            self.grid_size,
            self.initial_length,
            self.initial_position,
            self.initial_direction,
        )
        .and_then(|_| validate_win_score(self.win_score))
        .and_then(|_| {
            if self.max_catch_up_ticks == 0 {
                Err(ConfigError::ZeroCatchUp)
            } else {
                Ok(())
            }
        });

        if let Err(e) = &res {
            warn!("rejected game config: {}", e);
        }
        res
    }
}

pub(crate) fn validate_win_score(win_score: u32) -> Result<(), ConfigError> {
    if win_score == 0 {
        return Err(ConfigError::ZeroWinScore);
    }
    Ok(())
}

/// Checks that a snake laid out from `head` trailing away from `facing` fits
/// the grid with at least one cell to spare for food.
pub(crate) fn validate_layout(
    grid_size: u16,
    length: usize,
    head: Cell,
    facing: Direction,
) -> Result<(), ConfigError> {
    if grid_size == 0 {
        return Err(ConfigError::EmptyGrid);
    }
    if length == 0 {
        return Err(ConfigError::ZeroLength);
    }

    let cells = usize::from(grid_size) * usize::from(grid_size);
    if length >= cells {
        return Err(ConfigError::NoRoomForFood { length, grid_size });
    }

    let out_of_bounds = ConfigError::SnakeOutOfBounds { head, length, grid_size };
    // A straight body can never be longer than one row.
    if !head.in_grid(grid_size) || length > usize::from(grid_size) {
        return Err(out_of_bounds);
    }

    // Both bounded by the grid now, so this stays well inside i32.
    let (dx, dy) = facing.opposite().delta();
    let reach = length as i32 - 1;
    let tail = Cell::new(head.x + dx * reach, head.y + dy * reach);
    if !tail.in_grid(grid_size) {
        return Err(out_of_bounds);
    }
    Ok(())
}

pub(crate) fn validate_step_interval(ms: f64) -> Result<(), ConfigError> {
    if !ms.is_finite() || ms <= 0.0 {
        return Err(ConfigError::InvalidStepInterval(ms));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 24);
        assert_eq!(config.initial_position, Cell::new(12, 12));
        assert_eq!(config.win_score, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_settings() {
        let config = GameConfig { grid_size: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyGrid)));

        let config = GameConfig { win_score: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroWinScore)));

        let config = GameConfig { initial_length: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroLength)));

        let config = GameConfig { max_catch_up_ticks: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroCatchUp)));
    }

    #[test]
    fn rejects_snake_hanging_off_the_grid() {
        // Facing right, the body trails left from x = 1: cells 1, 0, -1.
        let config = GameConfig {
            initial_position: Cell::new(1, 5),
            initial_length: 3,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SnakeOutOfBounds { .. })));

        let config = GameConfig {
            initial_position: Cell::new(24, 5),
            initial_length: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::SnakeOutOfBounds { .. })));
    }

    #[test]
    fn extreme_positions_and_lengths_are_errors() {
        let far_left = GameConfig { initial_position: Cell::new(i32::MIN, 0), ..Default::default() };
        assert!(matches!(far_left.validate(), Err(ConfigError::SnakeOutOfBounds { .. })));

        let far_down = GameConfig {
            initial_position: Cell::new(5, i32::MAX),
            initial_direction: Direction::Up,
            ..Default::default()
        };
        assert!(matches!(far_down.validate(), Err(ConfigError::SnakeOutOfBounds { .. })));

        // Longer than a row but still leaving room for food.
        let too_long = GameConfig { initial_length: 25, ..Default::default() };
        assert!(matches!(
            too_long.validate(),
            Err(ConfigError::SnakeOutOfBounds { length: 25, .. })
        ));

        let huge = GameConfig { initial_length: usize::MAX, ..Default::default() };
        assert!(huge.validate().is_err());
    }

    #[test]
    fn rejects_snake_filling_the_grid() {
        let config = GameConfig {
            grid_size: 1,
            initial_position: Cell::new(0, 0),
            initial_length: 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoRoomForFood { length: 1, grid_size: 1 })
        ));
    }

    #[test]
    fn speed_curve_shrinks_then_floors() {
        let d = Difficulty::Normal;
        assert_eq!(d.step_interval_ms(0), 100.0);
        assert_eq!(d.step_interval_ms(6), 100.0);
        assert_eq!(d.step_interval_ms(7), 90.0);
        assert_eq!(d.step_interval_ms(14), 80.0);
        assert_eq!(d.step_interval_ms(63), 10.0);
        assert_eq!(d.step_interval_ms(1_000), 10.0);
        assert!(Difficulty::Hard.step_interval_ms(0) < Difficulty::Easy.step_interval_ms(0));
    }

    #[test]
    fn step_interval_validation() {
        assert!(validate_step_interval(16.0).is_ok());
        assert!(validate_step_interval(0.0).is_err());
        assert!(validate_step_interval(-5.0).is_err());
        assert!(validate_step_interval(f64::NAN).is_err());
    }

    #[test]
    fn partial_json_takes_defaults() {
        let config: GameConfig =
            serde_json::from_str(r#"{ "grid_size": 10, "difficulty": "hard" }"#).unwrap();
        assert_eq!(config.grid_size, 10);
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.win_score, DEFAULT_WIN_SCORE);
        assert_eq!(config.initial_direction, Direction::Right);
    }

    fn scratch_config(name: &str, contents: Option<&str>) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gridsnake-config-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        if let Some(text) = contents {
            fs::write(&path, text).unwrap();
        }
        path
    }

    #[test]
    fn file_errors_keep_their_source() {
        use std::error::Error as _;

        let missing = scratch_config("missing", None);
        let err = GameConfig::from_json_file(&missing).unwrap_err();
        match &err {
            ConfigError::Read { path, source } => {
                assert_eq!(path, &missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected a read error, got {:?}", other),
        }
        assert!(err.source().is_some());
        assert!(err.to_string().contains("config.json"));

        let malformed = scratch_config("malformed", Some("{ \"grid_size\": "));
        let err = GameConfig::from_json_file(&malformed).unwrap_err();
        assert!(matches!(&err, ConfigError::Parse { path, .. } if path == &malformed));
        assert!(err.source().is_some());

        let off_grid = scratch_config("offgrid", Some(r#"{ "initial_position": { "x": -2147483648, "y": 0 } }"#));
        assert!(matches!(
            GameConfig::from_json_file(&off_grid),
            Err(ConfigError::SnakeOutOfBounds { .. })
        ));

        for path in [missing, malformed, off_grid] {
            let _ = fs::remove_dir_all(path.parent().unwrap());
        }
    }
}
