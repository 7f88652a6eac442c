use std::{path::PathBuf, thread::sleep, time::{Duration, Instant}};

use anyhow::{bail, Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

use gridsnake::{
    Cell, Clock, Direction::{*, self}, Engine, GameConfig, GameEvent, HighScores, RunResult,
};
use crate::term::{Coords, TermInt, TermManager};

const FRAME_INTERVAL_MS: u64 = 16;

const SNAKE_HEAD_CHAR: char = '█';
const SNAKE_BODY_CHAR: char = '▓';
const FOOD_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

/// How a finished round wants the session to continue.
pub enum Next {
    PlayAgain,
    Quit,
}

pub struct SnakeGame {
    term: TermManager,
    config: GameConfig,
    engine: Engine,
    clock: Clock,
    scores: HighScores,
    scores_path: PathBuf,
    player: String,
    paused: bool,
    origin: Coords,
    board: (TermInt, TermInt),
    drawn: Vec<Cell>,
    drawn_food: Option<Cell>,
    epoch: Instant,
}

impl SnakeGame {
    pub fn new(
        config: GameConfig,
        seed: u64,
        player: String,
        scores_path: PathBuf,
    ) -> Result<Self> {
        let engine = Engine::seeded(&config, seed).context("invalid game configuration")?;
        let clock = Clock::new(config.difficulty.step_interval_ms(0), config.max_catch_up_ticks)
            .context("invalid clock configuration")?;
        let scores = match HighScores::load(&scores_path) {
            Ok(scores) => scores,
            Err(e) => {
                warn!("starting with an empty leaderboard: {}", e);
                HighScores::new()
            }
        };
        let term = TermManager::new().context("could not query the terminal")?;

        info!("seed {}, difficulty {:?}", seed, config.difficulty);
        Ok(SnakeGame {
            term,
            config,
            engine,
            clock,
            scores,
            scores_path,
            player,
            paused: false,
            origin: (0, 0),
            board: (0, 0),
            drawn: vec![],
            drawn_food: None,
            epoch: Instant::now(),
        })
    }

    pub fn initialize(&mut self) -> Result<()> {
        let tiles = self.config.grid_size;
        let (board_w, board_h) = match board_size(tiles) {
            Some(size) => size,
            None => bail!("a {0}x{0} grid is too large to draw in a terminal", tiles),
        };
        let (w, h) = self.term.size();
        if w < board_w || h < board_h + 1 {
            bail!(
                "a {0}x{0} grid needs a terminal of at least {1}x{2}, this one is {3}x{4}",
                tiles, board_w, board_h + 1, w, h
            );
        }

        // One status row above the board.
        self.board = (board_w, board_h);
        self.origin = ((w - board_w) / 2, (h - board_h + 1) / 2);
        self.term.setup().context("could not set up the terminal")?;
        Ok(())
    }

    pub fn shutdown(&mut self) -> Result<()> {
        self.term.restore().context("could not restore the terminal")
    }

    pub fn show_intro(&mut self) -> Result<Next> {
        let lines = &[
            "Arrow keys or WASD to move",
            "Esc or P to pause",
            "CTRL+C to quit",
            "",
            "Press any key to begin",
        ];

        self.term.show_message(lines)?;

        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Next::Quit);
        }

        self.term.hide_message()?;
        Ok(Next::PlayAgain)
    }

    pub fn play(&mut self) -> Result<Next> {
        self.engine
            .reset(self.config.grid_size, self.config.initial_length, self.config.initial_position)
            .context("invalid game configuration")?;
        self.clock.reset();
        self.clock.set_step_interval(self.config.difficulty.step_interval_ms(0))?;
        self.paused = false;
        self.drawn.clear();
        self.drawn_food = None;

        self.term.clear()?;
        let (board_w, board_h) = self.board;
        self.term.draw_box(self.origin, board_w, board_h)?;
        self.render()?;

        let outcome = loop {
            sleep(Duration::from_millis(FRAME_INTERVAL_MS));

            for key_ev in self.term.read_key_events_queue()? {
                if is_ctrl_c(&key_ev) {
                    return Ok(Next::Quit);
                }
                match key_ev.code {
                    KeyCode::Esc | KeyCode::Char('p') => self.toggle_pause()?,
                    code => {
                        if let Some(dir) = direction_for(code) {
                            self.engine.queue_turn(dir);
                        }
                    }
                }
            }

            if self.paused { continue; }

            // Every tick due this frame resolves before the frame is drawn.
            self.clock.accumulate(self.now_ms());
            let mut ended = None;
            while ended.is_none() && self.clock.next_tick() {
                self.engine.step();
                ended = self.handle_events()?;
            }

            self.render()?;
            if let Some(outcome) = ended {
                break outcome;
            }
        };

        self.game_over(outcome)?;

        // Any key starts over
        if is_ctrl_c(&self.term.read_key_blocking()?) {
            return Ok(Next::Quit);
        }
        Ok(Next::PlayAgain)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn now_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Applies engine side effects. Returns the outcome once the run is over.
    fn handle_events(&mut self) -> Result<Option<(RunResult, u32)>> {
        let events: Vec<GameEvent> = self.engine.drain_events().collect();
        let mut ended = None;

        for event in events {
            match event {
                GameEvent::Ate { score } => {
                    let interval = self.config.difficulty.step_interval_ms(score);
                    self.clock.set_step_interval(interval)?;
                }
                GameEvent::Ended { outcome, final_score } => {
                    ended = Some((outcome, final_score));
                }
            }
        }

        Ok(ended)
    }

    fn game_over(&mut self, (outcome, score): (RunResult, u32)) -> Result<()> {
        let headline = match outcome {
            RunResult::Won => "You won!",
            RunResult::HitWall => "Game over! You hit the wall.",
            RunResult::BitSelf => "Game over! You bit yourself.",
            RunResult::Continuing => "Game over!",
        };

        if outcome != RunResult::Won {
            let cells = self.engine.snapshot().snake.to_vec();
            for cell in cells {
                self.print_tile(cell, DEAD_SNAKE_CHAR)?;
            }
            self.term.flush()?;
        }

        let rank = if self.scores.qualifies(score) {
            self.scores.record(&self.player, score)
        } else {
            info!("{} scored {}, short of the leaderboard", self.player, score);
            None
        };
        let rank_line = match rank {
            Some(rank) => {
                if let Err(e) = self.scores.save(&self.scores_path) {
                    warn!("could not save high scores: {}", e);
                }
                format!("New high score! #{}", rank + 1)
            }
            None => String::new(),
        };

        let mut lines = vec![headline.to_string(), format!("Score: {}", score), rank_line, String::new()];
        lines.extend(
            self.scores
                .entries()
                .iter()
                .enumerate()
                .map(|(i, e)| format!("{}. {} - {}", i + 1, e.name, e.value)),
        );
        lines.extend(vec![
            String::new(),
            "Press any key to play again,".to_string(),
            "or CTRL+C to quit.".to_string(),
        ]);

        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        self.term.show_message(&refs)?;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let snap = self.engine.snapshot();
        let snake = snap.snake.to_vec();
        let food = snap.food;
        let status = format!(
            "{}  Score: {:<4} Best: {:<4}",
            self.player,
            snap.score,
            self.scores.best().map_or(0, |e| e.value)
        );

        if self.drawn == snake && self.drawn_food == Some(food) {
            return Ok(());
        }

        for cell in std::mem::take(&mut self.drawn) {
            if !snake.contains(&cell) {
                self.print_tile(cell, ' ')?;
            }
        }
        if let Some(old) = self.drawn_food.take() {
            if old != food && !snake.contains(&old) {
                self.print_tile(old, ' ')?;
            }
        }

        self.print_tile(food, FOOD_CHAR)?;
        for (i, &cell) in snake.iter().enumerate() {
            let ch = if i == 0 {SNAKE_HEAD_CHAR} else {SNAKE_BODY_CHAR};
            self.print_tile(cell, ch)?;
        }
        self.term.print_str_at((self.origin.0, self.origin.1.saturating_sub(1)), &status)?;

        self.drawn = snake;
        self.drawn_food = Some(food);
        self.term.flush()?;
        Ok(())
    }

    /// Tiles are two columns wide so the board looks square.
    fn print_tile(&mut self, cell: Cell, ch: char) -> Result<()> {
        let x = self.origin.0 + 1 + 2 * cell.x as TermInt;
        let y = self.origin.1 + 1 + cell.y as TermInt;
        self.term.print_at((x, y), ch)?;
        self.term.print_at((x + 1, y), ch)?;
        Ok(())
    }

    fn toggle_pause(&mut self) -> Result<()> {
        if !self.paused {
            self.clock.pause();
            self.term.show_message(&["Paused", "Press Esc to resume", "or Ctrl+C to quit"])?;
        } else {
            self.term.hide_message()?;
            self.clock.resume(self.now_ms());
        }

        self.paused = !self.paused;
        Ok(())
    }
}

/// Board dimensions including the border, if they fit a terminal coordinate.
fn board_size(tiles: u16) -> Option<(TermInt, TermInt)> {
    let width = tiles.checked_mul(2)?.checked_add(2)?;
    let height = tiles.checked_add(2)?;
    Some((width, height))
}

fn direction_for(code: KeyCode) -> Option<Direction> {
    match code {
        KeyCode::Char('w') | KeyCode::Up => Some(Up),
        KeyCode::Char('a') | KeyCode::Left => Some(Left),
        KeyCode::Char('s') | KeyCode::Down => Some(Down),
        KeyCode::Char('d') | KeyCode::Right => Some(Right),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
