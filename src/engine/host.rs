//! Host drivers: time sources, frame schedulers and the loops that pump frames

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tokio::time::{interval, MissedTickBehavior};
use tracing::info;

use super::game_loop::{FrameHandle, FrameScheduler, GameLoop, TimeSource};
use crate::util::time::frame_interval_ms;

/// Wall-clock time since creation
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced time. Clones share the same reading.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now_ms: Rc<Cell<f64>>,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance_ms(&self, ms: f64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }
}

/// Scheduler that only records requests; the host decides when they fire
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Option<FrameHandle>,
    cancelled: Vec<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn cancelled(&self) -> &[FrameHandle] {
        &self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn request(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.pending = Some(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        if self.pending == Some(handle) {
            self.pending = None;
        }
        self.cancelled.push(handle);
    }
}

/// Fire frames back to back on a synthetic clock, `frame_ms` apart.
///
/// Stops after `max_frames` or once `finished` reports true, and always
/// leaves the loop stopped. Returns the number of frames fired.
pub fn run_headless(
    game_loop: &mut GameLoop<ManualTime, ManualScheduler>,
    time: &ManualTime,
    frame_ms: f64,
    max_frames: u64,
    mut finished: impl FnMut() -> bool,
) -> u64 {
    game_loop.start();
    let mut frames = 0;
    while frames < max_frames {
        let Some(handle) = game_loop.scheduler().pending() else {
            break;
        };
        time.advance_ms(frame_ms);
        game_loop.frame(handle);
        frames += 1;
        if finished() {
            break;
        }
    }
    game_loop.stop();
    frames
}

/// Fire frames on a tokio interval at `display_hz`, measuring real time.
///
/// Missed intervals are skipped rather than bursted; the clock's own
/// clamp and backlog cap absorb the gap.
pub async fn run_realtime<T: TimeSource>(
    game_loop: &mut GameLoop<T, ManualScheduler>,
    display_hz: u32,
    max_frames: Option<u64>,
    mut finished: impl FnMut() -> bool,
) -> u64 {
    let period = Duration::from_secs_f64(frame_interval_ms(display_hz) / 1000.0);
    let mut frame_interval = interval(period);
    frame_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(display_hz, "Realtime frame driver started");
    game_loop.start();

    let mut frames = 0;
    loop {
        frame_interval.tick().await;

        let Some(handle) = game_loop.scheduler().pending() else {
            break;
        };
        game_loop.frame(handle);
        frames += 1;

        if finished() || max_frames.is_some_and(|max| frames >= max) {
            break;
        }
    }

    game_loop.stop();
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ClockConfig;
    use std::cell::RefCell;

    #[test]
    fn manual_time_clones_share_reading() {
        let time = ManualTime::new();
        let other = time.clone();
        time.advance_ms(12.5);
        assert_eq!(other.now_ms(), 12.5);
    }

    #[test]
    fn manual_scheduler_cancel_clears_pending() {
        let mut scheduler = ManualScheduler::new();
        let first = scheduler.request();
        let second = scheduler.request();
        assert_ne!(first, second);
        assert_eq!(scheduler.pending(), Some(second));

        scheduler.cancel(first);
        assert_eq!(scheduler.pending(), Some(second));
        scheduler.cancel(second);
        assert_eq!(scheduler.pending(), None);
    }

    #[test]
    fn headless_run_stops_when_finished() {
        let time = ManualTime::new();
        let mut game_loop = GameLoop::new(ClockConfig::default(), time.clone(), ManualScheduler::new());
        let ticks = Rc::new(RefCell::new(0u32));
        {
            let ticks = ticks.clone();
            game_loop.on_tick(move |_| *ticks.borrow_mut() += 1);
        }

        let frames = run_headless(&mut game_loop, &time, 1000.0 / 60.0, 1_000, || {
            *ticks.borrow() >= 30
        });

        assert_eq!(frames, 30);
        assert!(!game_loop.is_running());
        assert!(game_loop.scheduler().pending().is_none());
    }

    #[test]
    fn headless_run_honours_frame_budget() {
        let time = ManualTime::new();
        let mut game_loop = GameLoop::new(ClockConfig::default(), time.clone(), ManualScheduler::new());
        let frames = run_headless(&mut game_loop, &time, 1000.0 / 30.0, 10, || false);
        assert_eq!(frames, 10);
        assert_eq!(game_loop.clock().total_steps(), 20);
    }

    #[test]
    fn realtime_run_fires_frames() {
        let mut game_loop = GameLoop::new(
            ClockConfig::default(),
            MonotonicTime::new(),
            ManualScheduler::new(),
        );
        let frames = tokio_test::block_on(run_realtime(&mut game_loop, 500, Some(3), || false));
        assert_eq!(frames, 3);
        assert!(!game_loop.is_running());
    }
}
