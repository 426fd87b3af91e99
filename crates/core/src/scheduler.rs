//! Fixed-timestep scheduling
//!
//! The host reports how much wall-clock time passed since its last frame.
//! The scheduler turns that into a whole number of fixed simulation steps,
//! carrying the remainder over to the next call, so the simulation runs at
//! the same cadence on 60 Hz and 144 Hz displays.

use crate::config::SimulationConfig;
use std::time::Duration;
use tracing::warn;

/// Accumulates elapsed time and releases fixed-size steps.
#[derive(Debug, Clone)]
pub struct FixedStepScheduler {
    interval: Duration,
    max_steps_per_tick: u32,
    accumulator: Duration,
    dropped_backlog: Duration,
}

impl FixedStepScheduler {
    /// Create a scheduler.
    ///
    /// # Arguments
    ///
    /// * `interval` - Wall-clock duration of one step (non-zero)
    /// * `max_steps_per_tick` - Steps released per call before the backlog is dropped
    pub fn new(interval: Duration, max_steps_per_tick: u32) -> Self {
        debug_assert!(!interval.is_zero());
        Self {
            interval,
            max_steps_per_tick: max_steps_per_tick.max(1),
            accumulator: Duration::ZERO,
            dropped_backlog: Duration::ZERO,
        }
    }

    /// Scheduler using the interval and catch-up cap of `config`
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.step_interval, config.max_steps_per_tick)
    }

    /// Add `elapsed` and return how many steps are due now.
    ///
    /// Whole intervals are consumed and the remainder is kept. If more than
    /// `max_steps_per_tick` intervals are pending (after a stall, or a tab
    /// returning from the background), only that many run and the rest of
    /// the backlog is discarded.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator = self.accumulator.saturating_add(elapsed);

        let mut steps = 0;
        while self.accumulator >= self.interval && steps < self.max_steps_per_tick {
            self.accumulator -= self.interval;
            steps += 1;
        }

        if self.accumulator >= self.interval {
            warn!(
                "Fluid simulation fell behind, dropping {:.1} ms of backlog",
                self.accumulator.as_secs_f64() * 1000.0
            );
            self.dropped_backlog = self.dropped_backlog.saturating_add(self.accumulator);
            self.accumulator = Duration::ZERO;
        }
        steps
    }

    /// Time carried over to the next call
    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Total time discarded by the catch-up cap
    pub fn dropped_backlog(&self) -> Duration {
        self.dropped_backlog
    }

    /// Wall-clock duration of one step
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the step interval and catch-up cap, keeping accumulated time.
    pub fn reconfigure(&mut self, interval: Duration, max_steps_per_tick: u32) {
        debug_assert!(!interval.is_zero());
        self.interval = interval;
        self.max_steps_per_tick = max_steps_per_tick.max(1);
    }

    /// Forget accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

impl Default for FixedStepScheduler {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}
