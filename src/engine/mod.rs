//! Simulation time: fixed-step clock, frame-driven loop and host drivers

pub mod clock;
pub mod game_loop;
pub mod host;

pub use clock::{ClockConfig, ClockError, SimulationClock, Steps, Tick};
pub use game_loop::{FrameHandle, FrameReport, FrameScheduler, GameLoop, ListenerId, TimeSource};
pub use host::{run_headless, run_realtime, ManualScheduler, ManualTime, MonotonicTime};
