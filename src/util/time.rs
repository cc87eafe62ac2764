//! Time utilities for the simulation hosts

use std::time::Instant;

/// Default simulation rate
pub const SIMULATION_TPS: u32 = 60;
/// Default host frame rate
pub const DISPLAY_FPS: u32 = 60;

/// Fixed step in seconds for a tick rate. A zero rate gives an infinite
/// step, which `ClockConfig::validate` rejects.
pub fn step_for_rate(ticks_per_second: u32) -> f64 {
    1.0 / f64::from(ticks_per_second)
}

/// Milliseconds between host frames for a display rate
pub fn frame_interval_ms(frames_per_second: u32) -> f64 {
    1000.0 / frames_per_second.max(1) as f64
}

/// A simple timer for measuring wall-clock durations
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
    fn step_for_rate_inverts_rate() {
        assert_eq!(step_for_rate(60), 1.0 / 60.0);
        assert!(step_for_rate(0).is_infinite());
    }

    #[test]
    fn frame_interval_matches_rate() {
        assert!((frame_interval_ms(50) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn timer_measures_from_creation() {
        let timer = Timer::new();
        assert!(timer.elapsed_ms() < 1_000);
    }
}
