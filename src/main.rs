mod game;
mod term;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use gridsnake::{Difficulty, GameConfig};

use game::{Next, SnakeGame};

#[derive(Parser)]
#[command(name = "gridsnake")]
#[command(version, about = "Snake on a fixed tile grid, in the terminal")]
#[command(after_help = "Logs go to stderr; set RUST_LOG and redirect stderr to a file to read them.")]
struct Cli {
    /// Name recorded in the high score table
    #[arg(long, default_value = "player")]
    name: String,

    /// Base game speed
    #[arg(long, value_enum)]
    difficulty: Option<Level>,

    /// Tiles per side of the square grid
    #[arg(long, value_parser = clap::value_parser!(u16).range(4..=100))]
    grid_size: Option<u16>,

    /// Score that wins the game
    #[arg(long)]
    win_score: Option<u32>,

    /// Seed for food placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// JSON file with game settings; command line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// High score file
    #[arg(long, default_value = "snake_scores.json")]
    scores: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Level {
    Easy,
    Normal,
    Hard,
}

impl From<Level> for Difficulty {
    fn from(level: Level) -> Self {
        match level {
            Level::Easy => Difficulty::Easy,
            Level::Normal => Difficulty::Normal,
            Level::Hard => Difficulty::Hard,
        }
    }
}

impl Cli {
    fn game_config(&self) -> Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => GameConfig::default(),
        };

        if let Some(size) = self.grid_size {
            let centred = GameConfig::with_grid_size(size);
            config.grid_size = centred.grid_size;
            config.initial_position = centred.initial_position;
        }
        if let Some(level) = self.difficulty {
            config.difficulty = level.into();
        }
        if let Some(win_score) = self.win_score {
            config.win_score = win_score;
        }

        config.validate().context("invalid game settings")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.game_config()?;
    let seed = cli.seed.unwrap_or_else(rand::random);

    let mut game = SnakeGame::new(config, seed, cli.name.clone(), cli.scores.clone())?;
    game.initialize()?;

    let result = run(&mut game);
    // Always hand the terminal back, even when the game failed
    game.shutdown()?;
    result
}

fn run(game: &mut SnakeGame) -> Result<()> {
    if let Next::Quit = game.show_intro()? {
        return Ok(());
    }

    loop {
        if let Next::Quit = game.play()? {
            return Ok(());
        }
    }
}
