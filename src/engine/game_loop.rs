//! Frame-driven game loop: host frames in, fixed ticks and one render out

use tracing::{debug, trace};

use super::clock::{ClockConfig, SimulationClock, Tick};

/// Monotonic time source in milliseconds
pub trait TimeSource {
    fn now_ms(&self) -> f64;
}

/// Opaque handle for a requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub u64);

/// Host primitive that calls back once per display refresh
pub trait FrameScheduler {
    /// Ask for one more frame callback
    fn request(&mut self) -> FrameHandle;
    /// Withdraw a pending request
    fn cancel(&mut self, handle: FrameHandle);
}

/// Handle returned by listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type TickListener = Box<dyn FnMut(Tick)>;
type RenderListener = Box<dyn FnMut()>;

/// What a single host frame did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub ticks: u32,
    pub rendered: bool,
}

/// Owns simulation time. Knows nothing about fighters: consumers hook in
/// through tick and render listeners.
pub struct GameLoop<T: TimeSource, S: FrameScheduler> {
    clock: SimulationClock,
    time: T,
    scheduler: S,
    running: bool,
    pending: Option<FrameHandle>,
    last_time_ms: f64,
    tick_listeners: Vec<(ListenerId, TickListener)>,
    render_listeners: Vec<(ListenerId, RenderListener)>,
    next_listener_id: u64,
}

impl<T: TimeSource, S: FrameScheduler> GameLoop<T, S> {
    pub fn new(config: ClockConfig, time: T, scheduler: S) -> Self {
        let last_time_ms = time.now_ms();
        Self {
            clock: SimulationClock::new(config),
            time,
            scheduler,
            running: false,
            pending: None,
            last_time_ms,
            tick_listeners: Vec::new(),
            render_listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frame the loop is waiting on, if any
    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Register a per-tick callback
    pub fn on_tick(&mut self, listener: impl FnMut(Tick) + 'static) -> ListenerId {
        let id = self.allocate_id();
        self.tick_listeners.push((id, Box::new(listener)));
        id
    }

    /// Register a per-frame render callback
    pub fn on_render(&mut self, listener: impl FnMut() + 'static) -> ListenerId {
        let id = self.allocate_id();
        self.render_listeners.push((id, Box::new(listener)));
        id
    }

    /// Deregister a tick or render callback. Returns false for unknown ids.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.tick_listeners.len() + self.render_listeners.len();
        self.tick_listeners.retain(|(lid, _)| *lid != id);
        self.render_listeners.retain(|(lid, _)| *lid != id);
        before != self.tick_listeners.len() + self.render_listeners.len()
    }

    /// Begin requesting frames. No-op when already running.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.last_time_ms = self.time.now_ms();
        self.pending = Some(self.scheduler.request());
        debug!(fixed_step = self.clock.config().fixed_step, "Game loop started");
    }

    /// Stop and withdraw the pending frame so no tick fires after shutdown
    pub fn stop(&mut self) {
        self.running = false;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        debug!(total_steps = self.clock.total_steps(), "Game loop stopped");
    }

    /// Host callback for a requested frame.
    ///
    /// Frames arriving after `stop` or carrying a stale handle are ignored.
    pub fn frame(&mut self, handle: FrameHandle) -> FrameReport {
        if !self.running || self.pending != Some(handle) {
            trace!(?handle, "Ignoring stale frame");
            return FrameReport::default();
        }

        self.pending = Some(self.scheduler.request());

        let now_ms = self.time.now_ms();
        let delta_seconds = (now_ms - self.last_time_ms) / 1000.0;
        self.last_time_ms = now_ms;

        let mut ticks = 0;
        for tick in self.clock.advance(delta_seconds) {
            for (_, listener) in self.tick_listeners.iter_mut() {
                listener(tick);
            }
            ticks += 1;
        }

        for (_, listener) in self.render_listeners.iter_mut() {
            listener();
        }

        FrameReport {
            ticks,
            rendered: true,
        }
    }

    fn allocate_id(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::host::{ManualScheduler, ManualTime};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn new_loop(time: &ManualTime) -> GameLoop<ManualTime, ManualScheduler> {
        GameLoop::new(ClockConfig::default(), time.clone(), ManualScheduler::new())
    }

    #[test]
    fn one_render_per_frame_regardless_of_ticks() {
        let time = ManualTime::new();
        let mut game_loop = new_loop(&time);
        let ticks = Rc::new(RefCell::new(0));
        let renders = Rc::new(RefCell::new(0));
        {
            let ticks = ticks.clone();
            game_loop.on_tick(move |_| *ticks.borrow_mut() += 1);
            let renders = renders.clone();
            game_loop.on_render(move || *renders.borrow_mut() += 1);
        }

        game_loop.start();
        time.advance_ms(1000.0 / 30.0);
        let handle = game_loop.pending_frame().unwrap();
        let report = game_loop.frame(handle);

        assert_eq!(report, FrameReport { ticks: 2, rendered: true });
        assert_eq!(*ticks.borrow(), 2);
        assert_eq!(*renders.borrow(), 1);
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let time = ManualTime::new();
        let mut game_loop = new_loop(&time);
        let log = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second", "third"] {
            let log = log.clone();
            game_loop.on_tick(move |_| log.borrow_mut().push(name));
        }

        game_loop.start();
        time.advance_ms(20.0);
        let handle = game_loop.pending_frame().unwrap();
        game_loop.frame(handle);

        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let time = ManualTime::new();
        let mut game_loop = new_loop(&time);
        let count = Rc::new(RefCell::new(0));
        let id = {
            let count = count.clone();
            game_loop.on_tick(move |_| *count.borrow_mut() += 1)
        };

        assert!(game_loop.remove_listener(id));
        assert!(!game_loop.remove_listener(id));

        game_loop.start();
        time.advance_ms(50.0);
        let handle = game_loop.pending_frame().unwrap();
        assert_eq!(game_loop.frame(handle).ticks, 3);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn stop_cancels_pending_frame() {
        let time = ManualTime::new();
        let mut game_loop = new_loop(&time);
        game_loop.start();
        let handle = game_loop.pending_frame().unwrap();

        game_loop.stop();

        assert!(game_loop.scheduler().pending().is_none());
        assert_eq!(game_loop.scheduler().cancelled(), &[handle]);
        time.advance_ms(100.0);
        assert_eq!(game_loop.frame(handle), FrameReport::default());
        assert_eq!(game_loop.clock().total_steps(), 0);
    }

    #[test]
    fn stale_handle_is_ignored() {
        let time = ManualTime::new();
        let mut game_loop = new_loop(&time);
        game_loop.start();
        let first = game_loop.pending_frame().unwrap();
        time.advance_ms(1000.0 / 60.0);
        game_loop.frame(first);

        time.advance_ms(100.0);
        assert_eq!(game_loop.frame(first), FrameReport::default());
    }

    #[test]
    fn start_resets_the_frame_baseline() {
        let time = ManualTime::new();
        let mut game_loop = new_loop(&time);
        time.advance_ms(5_000.0);
        game_loop.start();
        let handle = game_loop.pending_frame().unwrap();
        assert_eq!(game_loop.frame(handle).ticks, 0);
    }
}
