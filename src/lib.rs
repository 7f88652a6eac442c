//! Snake on a square tile grid.
//!
//! - [`Clock`] turns frame timestamps into fixed-size simulation ticks.
//! - [`Engine`] advances the board exactly one tick per [`Engine::step`].
//! - [`HighScores`] is the small local leaderboard.
//!
//! The library does no I/O besides the leaderboard file; drawing and input
//! live in the `gridsnake` binary.

pub mod clock;
pub mod config;
pub mod engine;
pub mod scores;
pub mod snake;

pub use clock::Clock;
pub use config::{ConfigError, Difficulty, GameConfig};
pub use engine::{Engine, GameEvent, PlacementError, RunResult, Snapshot, Status};
pub use scores::{HighScores, ScoreEntry, ScoreError};
pub use snake::{Cell, Direction, Snake};
