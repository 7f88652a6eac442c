//! The snake simulation: one discrete step per tick, no I/O.
//!
//! The engine owns the board. Collaborators read it through [`Snapshot`],
//! steer it through [`Engine::queue_turn`], and learn about food and game
//! over by draining [`GameEvent`]s.

use std::collections::VecDeque;

use log::{debug, info};
use rand::{seq::IteratorRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use crate::config::{validate_layout, validate_win_score, ConfigError, GameConfig};
use crate::snake::{Cell, Direction, Snake};

pub const TURN_QUEUE_CAPACITY: usize = 2;

/// Random draws before food placement falls back to picking among free cells.
const FOOD_SAMPLING_ATTEMPTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunResult {
    Continuing,
    HitWall,
    BitSelf,
    Won,
}

impl RunResult {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunResult::Continuing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Waiting for the first turn input; the snake does not move yet.
    Idle,
    Running,
    Won,
    HitWall,
    BitSelf,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Won | Status::HitWall | Status::BitSelf)
    }

    fn as_result(self) -> RunResult {
        match self {
            Status::Idle | Status::Running => RunResult::Continuing,
            Status::Won => RunResult::Won,
            Status::HitWall => RunResult::HitWall,
            Status::BitSelf => RunResult::BitSelf,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Ate { score: u32 },
    Ended { outcome: RunResult, final_score: u32 },
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot<'a> {
    pub grid_size: u16,
    /// Head first.
    pub snake: &'a [Cell],
    pub food: Cell,
    pub score: u32,
    pub status: Status,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlacementError {
    #[error("cell {0:?} is outside the grid")]
    OffGrid(Cell),
    #[error("cell {0:?} is occupied by the snake")]
    Occupied(Cell),
}

pub struct Engine<R = ChaCha8Rng> {
    rng: R,
    grid_size: u16,
    win_score: u32,
    facing: Direction,
    snake: Snake,
    food: Cell,
    score: u32,
    direction: Direction,
    pending: VecDeque<Direction>,
    status: Status,
    events: Vec<GameEvent>,
}

impl Engine<ChaCha8Rng> {
    /// Engine with a reproducible food sequence for `seed`.
    pub fn seeded(config: &GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Engine::new(config, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Engine<R> {
    pub fn new(config: &GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut engine = Engine {
            rng,
            grid_size: config.grid_size,
            win_score: config.win_score,
            facing: config.initial_direction,
            snake: Snake::new(config.initial_position, 1, config.initial_direction),
            food: config.initial_position,
            score: 0,
            direction: config.initial_direction,
            pending: VecDeque::with_capacity(TURN_QUEUE_CAPACITY),
            status: Status::Idle,
            events: vec![],
        };
        engine.reset(config.grid_size, config.initial_length, config.initial_position)?;
        Ok(engine)
    }

    /// Starts a fresh run. The snake faces the configured initial direction
    /// with its body trailing behind the head.
    pub fn reset(
        &mut self,
        grid_size: u16,
        initial_length: usize,
        initial_position: Cell,
    ) -> Result<(), ConfigError> {
        validate_layout(grid_size, initial_length, initial_position, self.facing)?;
        validate_win_score(self.win_score)?;

        self.grid_size = grid_size;
        self.snake = Snake::new(initial_position, initial_length, self.facing);
        self.direction = self.facing;
        self.pending.clear();
        self.events.clear();
        self.score = 0;
        self.status = Status::Idle;
        // validate_layout leaves at least one free cell.
        self.food = self.spawn_food().unwrap_or(initial_position);

        info!(
            "new run on {0}x{0} grid, snake of {1} at {2:?}",
            grid_size, initial_length, initial_position
        );
        Ok(())
    }

    /// Queues a turn for an upcoming step. Returns whether it was queued.
    ///
    /// Any input that is not a reversal starts an idle run, even when it is
    /// dropped as a repeat or because the queue is full.
    pub fn queue_turn(&mut self, direction: Direction) -> bool {
        if self.status.is_terminal() {
            return false;
        }

        let effective = self.effective_direction();
        if direction.is_opposite(effective) {
            return false;
        }
        self.start();

        if direction == effective || self.pending.len() >= TURN_QUEUE_CAPACITY {
            return false;
        }
        self.pending.push_back(direction);
        debug!("queued turn {:?} ({} pending)", direction, self.pending.len());
        true
    }

    /// Lets the snake move without any input.
    pub fn start(&mut self) {
        if self.status == Status::Idle {
            self.status = Status::Running;
            info!("run started");
        }
    }

    pub fn step(&mut self) -> RunResult {
        match self.status {
            Status::Idle => return RunResult::Continuing,
            status if status.is_terminal() => return status.as_result(),
            _ => {}
        }

        if let Some(turn) = self.pending.pop_front() {
            self.direction = turn;
        }

        let next_head = self.snake.head().moved(self.direction);
        if !next_head.in_grid(self.grid_size) {
            return self.finish(Status::HitWall);
        }

        let will_grow = next_head == self.food;
        if self.snake.bites(next_head, will_grow) {
            return self.finish(Status::BitSelf);
        }

        self.snake.advance(next_head, will_grow);
        debug_assert!(!self.snake.is_empty() && self.snake.is_self_disjoint());

        if will_grow {
            self.score += 1;
            self.events.push(GameEvent::Ate { score: self.score });
            debug!("ate food at {:?}, score {}", next_head, self.score);

            match self.spawn_food() {
                Some(food) => self.food = food,
                // Board is full.
                None => return self.finish(Status::Won),
            }
        }

        if self.score >= self.win_score {
            return self.finish(Status::Won);
        }
        RunResult::Continuing
    }

    /// Puts the food on a chosen free cell.
    pub fn place_food(&mut self, cell: Cell) -> Result<(), PlacementError> {
        if !cell.in_grid(self.grid_size) {
            return Err(PlacementError::OffGrid(cell));
        }
        if self.snake.contains(cell) {
            return Err(PlacementError::Occupied(cell));
        }
        self.food = cell;
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid_size: self.grid_size,
            snake: self.snake.cells(),
            food: self.food,
            score: self.score,
            status: self.status,
        }
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn grid_size(&self) -> u16 {
        self.grid_size
    }

    pub fn current_direction(&self) -> Direction {
        self.direction
    }

    /// The last queued turn, or the current direction when nothing is queued.
    pub fn effective_direction(&self) -> Direction {
        self.pending.back().copied().unwrap_or(self.direction)
    }

    pub fn pending_turns(&self) -> impl Iterator<Item = Direction> + '_ {
        self.pending.iter().copied()
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    fn finish(&mut self, status: Status) -> RunResult {
        self.status = status;
        self.pending.clear();
        let outcome = status.as_result();
        self.events.push(GameEvent::Ended { outcome, final_score: self.score });
        info!("run ended: {:?} with score {}", outcome, self.score);
        outcome
    }

    /// Uniform free cell: rejection sampling first, then an exhaustive pick
    /// once the board is too crowded for sampling to land. `None` when full.
    fn spawn_food(&mut self) -> Option<Cell> {
        let n = i32::from(self.grid_size);

        for _ in 0..FOOD_SAMPLING_ATTEMPTS {
            let cell = Cell::new(self.rng.gen_range(0..n), self.rng.gen_range(0..n));
            if !self.snake.contains(cell) {
                debug!("spawned food at {:?}", cell);
                return Some(cell);
            }
        }

        let snake = &self.snake;
        let cell = (0..n)
            .flat_map(|y| (0..n).map(move |x| Cell::new(x, y)))
            .filter(|c| !snake.contains(*c))
            .choose(&mut self.rng);
        if let Some(cell) = cell {
            debug!("spawned food at {:?} after exhausting samples", cell);
        }
        cell
    }
}
