//! Fixed-timestep clock.
//!
//! Turns the timestamps of a display-driven frame loop into a stream of
//! equally spaced simulation ticks, so the snake moves at the same speed
//! whatever the frame rate is.

use log::debug;

use crate::config::{validate_step_interval, ConfigError};

#[derive(Debug, Clone)]
pub struct Clock {
    step_interval_ms: f64,
    max_catch_up_ticks: u32,
    accumulator_ms: f64,
    last_timestamp: Option<f64>,
    budget: u32,
    paused: bool,
}

impl Clock {
    pub fn new(step_interval_ms: f64, max_catch_up_ticks: u32) -> Result<Self, ConfigError> {
        validate_step_interval(step_interval_ms)?;
        if max_catch_up_ticks == 0 {
            return Err(ConfigError::ZeroCatchUp);
        }
        Ok(Clock {
            step_interval_ms,
            max_catch_up_ticks,
            accumulator_ms: 0.0,
            last_timestamp: None,
            budget: 0,
            paused: false,
        })
    }

    pub fn step_interval_ms(&self) -> f64 {
        self.step_interval_ms
    }

    pub fn accumulator_ms(&self) -> f64 {
        self.accumulator_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Takes effect from the next pending tick on.
    pub fn set_step_interval(&mut self, step_interval_ms: f64) -> Result<(), ConfigError> {
        validate_step_interval(step_interval_ms)?;
        if step_interval_ms != self.step_interval_ms {
            debug!("step interval {} -> {} ms", self.step_interval_ms, step_interval_ms);
        }
        self.step_interval_ms = step_interval_ms;
        Ok(())
    }

    /// Records the frame timestamp `now_ms` and returns how many ticks are due.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        self.accumulate(now_ms);
        let mut ticks = 0;
        while self.next_tick() {
            ticks += 1;
        }
        ticks
    }

    /// Time bookkeeping half of [`Clock::advance`]. Call [`Clock::next_tick`]
    /// afterwards until it returns false.
    pub fn accumulate(&mut self, now_ms: f64) {
        if self.paused {
            return;
        }

        let dt = match self.last_timestamp {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        let cap = self.step_interval_ms * f64::from(self.max_catch_up_ticks);
        let wanted = self.accumulator_ms + dt;
        if wanted > cap {
            debug!("clamping {:.1} ms of backlog to {:.1} ms", wanted, cap);
        }
        self.accumulator_ms = wanted.min(cap);
        self.budget = self.max_catch_up_ticks;
    }

    /// Releases one tick at the current interval if enough time has built up.
    pub fn next_tick(&mut self) -> bool {
        if self.paused || self.budget == 0 || self.accumulator_ms < self.step_interval_ms {
            return false;
        }
        self.accumulator_ms -= self.step_interval_ms;
        self.budget -= 1;
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
        self.budget = 0;
    }

    /// Unpauses and re-anchors to `now_ms` so the paused span is not replayed.
    pub fn resume(&mut self, now_ms: f64) {
        self.paused = false;
        self.resync(now_ms);
    }

    pub fn resync(&mut self, now_ms: f64) {
        self.last_timestamp = Some(now_ms);
    }

    /// Forgets all timing state, e.g. when a new run starts.
    pub fn reset(&mut self) {
        self.accumulator_ms = 0.0;
        self.last_timestamp = None;
        self.budget = 0;
        self.paused = false;
    }
}
