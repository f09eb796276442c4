//! Time utilities for the game loop

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Default move period (100 moves per second)
pub const DEFAULT_MOVE_TICK_MS: u64 = 10;
/// Default draw period, nominally the same rate as moves
pub const DEFAULT_DRAW_TICK_MS: u64 = 10;

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Nominal ticks per second for a period
pub fn ticks_per_second(period: Duration) -> f64 {
    if period.is_zero() {
        return 0.0;
    }
    1.0 / period.as_secs_f64()
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_per_second_inverts_the_period() {
        assert_eq!(ticks_per_second(Duration::from_millis(10)), 100.0);
        assert_eq!(ticks_per_second(Duration::ZERO), 0.0);
    }

    #[test]
    fn timer_resets() {
        let mut timer = Timer::new();
        std::thread::sleep(Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5);
        timer.reset();
        assert!(timer.elapsed_ms() < 5);
    }
}
