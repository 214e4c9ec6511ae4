//! Periodic effects driven by elapsed time.
//!
//! Nothing here owns a thread or a clock. The host reports elapsed time
//! through `advance`, which returns how many ticks fell due.

use std::time::Duration;

/// A repeating interval that accumulates elapsed time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTimer {
    interval: Duration,
    accumulated: Duration,
    enabled: bool,
}

impl PeriodicTimer {
    /// Creates an enabled timer. A zero interval never ticks.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
            enabled: true,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Starts or stops the timer. Stopping discards partial progress.
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.accumulated = Duration::ZERO;
        }
        self.enabled = enabled;
    }

    /// Adds `elapsed` and returns the number of whole intervals that passed.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        if !self.enabled || self.interval.is_zero() {
            return 0;
        }

        self.accumulated += elapsed;
        let interval = self.interval.as_nanos();
        let total = self.accumulated.as_nanos();
        self.accumulated = Duration::from_nanos((total % interval) as u64);
        u32::try_from(total / interval).unwrap_or(u32::MAX)
    }
}

/// Continuous hue rotation, one degree per tick, while enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HueCycle {
    timer: PeriodicTimer,
}

impl HueCycle {
    /// Degrees added per tick.
    pub const STEP: f64 = 1.0;

    /// Creates a stopped cycle.
    pub fn new(interval: Duration) -> Self {
        let mut timer = PeriodicTimer::new(interval);
        timer.set_enabled(false);
        Self { timer }
    }

    pub fn is_enabled(&self) -> bool {
        self.timer.is_enabled()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.timer.set_enabled(enabled);
    }

    /// The hue delta due after `elapsed`, or `None` if nothing changed.
    pub fn advance(&mut self, elapsed: Duration) -> Option<f64> {
        match self.timer.advance(elapsed) {
            0 => None,
            ticks => Some(f64::from(ticks) * Self::STEP),
        }
    }
}
