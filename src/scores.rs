//! Local leaderboard kept in a small JSON file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MAX_HIGH_SCORES: usize = 5;

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("could not access high score file {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("high score file {} is malformed: {source}", .path.display())]
    Format { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub value: u32,
}

/// Best runs, highest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HighScores {
    entries: Vec<ScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the table at `path`. A missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no high score file at {}", path.display());
                return Ok(Self::new());
            }
            Err(source) => return Err(ScoreError::Io { path: path.to_owned(), source }),
        };

        let mut scores: HighScores = serde_json::from_str(&text)
            .map_err(|source| ScoreError::Format { path: path.to_owned(), source })?;
        // Hand-edited files may be unsorted or too long.
        scores.entries.sort_by(|a, b| b.value.cmp(&a.value));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn save(&self, path: &Path) -> Result<(), ScoreError> {
        let io_err = |source| ScoreError::Io { path: path.to_owned(), source };

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|source| ScoreError::Format { path: path.to_owned(), source })?;
        fs::write(path, json).map_err(io_err)?;
        debug!("saved {} high scores to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Inserts the run if it makes the table and returns its 0-based rank.
    /// Equal scores rank below the ones already recorded.
    pub fn record(&mut self, name: &str, value: u32) -> Option<usize> {
        let rank = self.entries.iter().position(|e| e.value < value).unwrap_or(self.entries.len());
        if rank >= MAX_HIGH_SCORES {
            return None;
        }

        self.entries.insert(rank, ScoreEntry { name: name.to_owned(), value });
        self.entries.truncate(MAX_HIGH_SCORES);
        info!("{} scored {} (rank {})", name, value, rank + 1);
        Some(rank)
    }

    pub fn qualifies(&self, value: u32) -> bool {
        self.entries.len() < MAX_HIGH_SCORES || self.entries.iter().any(|e| e.value < value)
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn best(&self) -> Option<&ScoreEntry> {
        self.entries.first()
    }
}
