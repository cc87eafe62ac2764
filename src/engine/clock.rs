//! Fixed-step accumulator that turns real frame time into simulation ticks

use crate::util::time::{step_for_rate, SIMULATION_TPS};

/// Slack on the accumulator comparison so exact multiples of the step
/// never lose a tick to floating-point rounding.
const STEP_EPSILON: f64 = 1e-9;

/// Clock settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockConfig {
    /// Simulation seconds per tick
    pub fixed_step: f64,
    /// Most ticks a single real frame may run
    pub max_sub_steps: u32,
    /// Clamp on a single real-frame delta (seconds)
    pub max_frame_delta: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            fixed_step: step_for_rate(SIMULATION_TPS),
            max_sub_steps: 8,
            max_frame_delta: 0.25,
        }
    }
}

impl ClockConfig {
    /// Reject settings that would stall or break the clock
    pub fn validate(&self) -> Result<(), ClockError> {
        if !(self.fixed_step.is_finite() && self.fixed_step > 0.0) {
            return Err(ClockError::FixedStep(self.fixed_step));
        }
        if self.max_sub_steps == 0 {
            return Err(ClockError::NoSubSteps);
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(ClockError::FrameDelta(self.max_frame_delta));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClockError {
    #[error("Fixed step must be a positive number of seconds, got {0}")]
    FixedStep(f64),

    #[error("At least one sub-step per frame is required")]
    NoSubSteps,

    #[error("Frame delta clamp must be a positive number of seconds, got {0}")]
    FrameDelta(f64),
}

/// One fixed simulation step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Global step counter, starting at 0
    pub index: u64,
    /// Simulation seconds covered by this step
    pub dt: f64,
}

/// Accumulates real time and releases it in fixed-size steps
#[derive(Debug, Clone)]
pub struct SimulationClock {
    config: ClockConfig,
    accumulated_time: f64,
    total_steps: u64,
    dropped_frames: u64,
}

impl SimulationClock {
    pub fn new(config: ClockConfig) -> Self {
        Self {
            config,
            accumulated_time: 0.0,
            total_steps: 0,
            dropped_frames: 0,
        }
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Unconsumed real time carried to the next frame
    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }

    /// Ticks released since creation
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Simulation seconds elapsed across all released ticks
    pub fn simulation_time(&self) -> f64 {
        self.total_steps as f64 * self.config.fixed_step
    }

    /// Frames whose backlog hit the cap and had their leftover time discarded
    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// Feed one real frame's elapsed seconds and get the ticks it releases.
    ///
    /// Order matters for determinism: clamp the delta, accumulate, drain up to
    /// `max_sub_steps` steps, then discard whatever is left if the cap was hit.
    pub fn advance(&mut self, real_delta_seconds: f64) -> Steps {
        let delta = if real_delta_seconds.is_finite() {
            real_delta_seconds.clamp(0.0, self.config.max_frame_delta)
        } else {
            0.0
        };
        self.accumulated_time += delta;

        let first_index = self.total_steps;
        let mut count = 0u32;
        while self.accumulated_time + STEP_EPSILON >= self.config.fixed_step
            && count < self.config.max_sub_steps
        {
            self.accumulated_time -= self.config.fixed_step;
            count += 1;
        }
        self.accumulated_time = self.accumulated_time.max(0.0);

        if count == self.config.max_sub_steps && count > 0 {
            if self.accumulated_time > 0.0 {
                self.dropped_frames += 1;
            }
            self.accumulated_time = 0.0;
        }

        self.total_steps += u64::from(count);
        Steps {
            next_index: first_index,
            remaining: count,
            dt: self.config.fixed_step,
        }
    }
}

/// Ticks released by one call to [`SimulationClock::advance`]
#[derive(Debug, Clone)]
pub struct Steps {
    next_index: u64,
    remaining: u32,
    dt: f64,
}

impl Iterator for Steps {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        if self.remaining == 0 {
            return None;
        }
        let tick = Tick {
            index: self.next_index,
            dt: self.dt,
        };
        self.next_index += 1;
        self.remaining -= 1;
        Some(tick)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Steps {}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> SimulationClock {
        SimulationClock::new(ClockConfig {
            fixed_step: 1.0 / 60.0,
            max_sub_steps: 8,
            max_frame_delta: 0.25,
        })
    }

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ClockConfig::default().validate(), Ok(()));
    }

    #[test]
    fn invalid_configs_rejected() {
        let base = ClockConfig::default();
        let zero_sub_steps = ClockConfig {
            max_sub_steps: 0,
            ..base
        };
        assert_eq!(zero_sub_steps.validate(), Err(ClockError::NoSubSteps));

        let negative_clamp = ClockConfig {
            max_frame_delta: -0.5,
            ..base
        };
        assert_eq!(negative_clamp.validate(), Err(ClockError::FrameDelta(-0.5)));

        let nan_clamp = ClockConfig {
            max_frame_delta: f64::NAN,
            ..base
        };
        assert!(matches!(nan_clamp.validate(), Err(ClockError::FrameDelta(_))));

        let infinite_step = ClockConfig {
            fixed_step: f64::INFINITY,
            ..base
        };
        assert!(matches!(infinite_step.validate(), Err(ClockError::FixedStep(_))));
    }

    #[test]
    fn two_steps_for_a_thirtieth_of_a_second() {
        let mut clock = clock();
        let ticks: Vec<Tick> = clock.advance(1.0 / 30.0).collect();
        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].index, 0);
        assert_eq!(ticks[1].index, 1);
        assert!(clock.accumulated_time() < 1e-9);
    }

    #[test]
    fn partial_step_carries_over() {
        let mut clock = clock();
        assert_eq!(clock.advance(0.01).count(), 0);
        assert_eq!(clock.advance(0.01).count(), 1);
        assert!((clock.accumulated_time() - (0.02 - 1.0 / 60.0)).abs() < 1e-9);
    }

    #[test]
    fn oversized_delta_is_clamped_and_backlog_dropped() {
        let mut clock = clock();
        // 10s clamps to 0.25s = 15 steps, capped at 8
        assert_eq!(clock.advance(10.0).count(), 8);
        assert_eq!(clock.accumulated_time(), 0.0);
        assert_eq!(clock.dropped_frames(), 1);
        // nothing was deferred to the next frame
        assert_eq!(clock.advance(0.0).count(), 0);
        assert_eq!(clock.total_steps(), 8);
    }

    #[test]
    fn negative_and_nan_deltas_release_nothing() {
        let mut clock = clock();
        assert_eq!(clock.advance(-1.0).count(), 0);
        assert_eq!(clock.advance(f64::NAN).count(), 0);
        assert_eq!(clock.accumulated_time(), 0.0);
    }

    #[test]
    fn indices_continue_across_frames() {
        let mut clock = clock();
        clock.advance(1.0 / 30.0).for_each(drop);
        let next: Vec<u64> = clock.advance(1.0 / 60.0).map(|t| t.index).collect();
        assert_eq!(next, vec![2]);
        assert!((clock.simulation_time() - 0.05).abs() < 1e-9);
    }
}
