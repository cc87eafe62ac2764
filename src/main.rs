//! Arena Duel - runs one match between two fighters
//!
//! The binary wires the simulation core to a host:
//! - headless: synthetic clock, frames fired back to back (deterministic)
//! - realtime: tokio interval on the wall clock
//!
//! Snapshots are logged at debug level while the match runs; the final
//! match record is printed to stdout as JSON.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use arena_duel::config::{Config, LogFormat, PlayerControl, RunMode};
use arena_duel::engine::{
    run_headless, run_realtime, FrameScheduler, GameLoop, ManualScheduler, ManualTime,
    MonotonicTime, TimeSource,
};
use arena_duel::game::{Controller, DuelMatch, MatchRules, PolicyConfig, RenderThrottle, Side};
use arena_duel::input::NoInput;
use arena_duel::roster::Roster;
use arena_duel::store::{MatchRecord, ProfileStore};
use arena_duel::util::time::{frame_interval_ms, Timer};

/// Renders between logged snapshots
const SNAPSHOT_EVERY: u32 = 30;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(&config.log_level, config.log_format);

    info!("Starting Arena Duel");
    info!(
        mode = ?config.run_mode,
        sim_tick_hz = config.sim_tick_hz,
        display_hz = config.display_hz,
        "Configuration loaded"
    );

    // Setup errors are fatal before any frame runs
    let roster = match &config.roster_dir {
        Some(dir) => Roster::load(dir)?,
        None => Roster::builtin()?,
    };
    let duel = Rc::new(RefCell::new(build_match(&config, &roster)?));
    let match_id = duel.borrow().id();

    let timer = Timer::new();
    let frames = match config.run_mode {
        RunMode::Headless => {
            let time = ManualTime::new();
            let mut game_loop = GameLoop::new(config.clock(), time.clone(), ManualScheduler::new());
            attach(&mut game_loop, &duel);

            // Enough frames to reach the time limit, with a second of slack
            let max_frames =
                ((config.match_time_limit_secs + 1.0) * f64::from(config.display_hz)).ceil() as u64;
            let watch = duel.clone();
            run_headless(
                &mut game_loop,
                &time,
                frame_interval_ms(config.display_hz),
                max_frames,
                move || watch.borrow().is_over(),
            )
        }
        RunMode::Realtime => {
            let mut game_loop =
                GameLoop::new(config.clock(), MonotonicTime::new(), ManualScheduler::new());
            attach(&mut game_loop, &duel);

            let watch = duel.clone();
            let run = run_realtime(&mut game_loop, config.display_hz, None, move || {
                watch.borrow().is_over()
            });
            tokio::select! {
                frames = run => frames,
                _ = shutdown_signal() => {
                    warn!(match_id = %match_id, "Match interrupted");
                    0
                }
            }
        }
    };

    let duel = duel.borrow();
    info!(
        match_id = %match_id,
        frames,
        ticks = duel.tick() + 1,
        wall_ms = timer.elapsed_ms(),
        sim_secs = duel.elapsed_secs(),
        phase = ?duel.phase(),
        outcome = ?duel.outcome(),
        "Simulation finished"
    );

    let record = MatchRecord::from_match(&duel);
    record_profiles(&config, &record);
    println!("{}", serde_json::to_string_pretty(&record)?);

    Ok(())
}

/// Build both controllers and the match from configuration
fn build_match(config: &Config, roster: &Roster) -> anyhow::Result<DuelMatch> {
    let player = match config.player_control {
        PlayerControl::Ai => Controller::ai(PolicyConfig::default(), config.match_seed)?,
        PlayerControl::Idle => Controller::human(NoInput, roster.combos())?,
    };
    let opponent = Controller::ai(PolicyConfig::default(), config.match_seed.wrapping_add(1))?;

    let rules = MatchRules {
        time_limit_secs: Some(config.match_time_limit_secs),
        ..MatchRules::default()
    };

    Ok(DuelMatch::new(
        roster,
        [config.player_fighter.as_str(), config.opponent_fighter.as_str()],
        [player, opponent],
        rules,
    )?)
}

/// Hook the match into the loop: one step per tick, throttled snapshot logging per render
fn attach<T: TimeSource, S: FrameScheduler>(
    game_loop: &mut GameLoop<T, S>,
    duel: &Rc<RefCell<DuelMatch>>,
) {
    let throttle = Rc::new(RefCell::new(RenderThrottle::new(SNAPSHOT_EVERY)));

    {
        let duel = duel.clone();
        let throttle = throttle.clone();
        game_loop.on_tick(move |tick| {
            let mut duel = duel.borrow_mut();
            if !duel.step(tick).is_empty() {
                throttle.borrow_mut().force_next();
            }
        });
    }

    let duel = duel.clone();
    game_loop.on_render(move || {
        if !throttle.borrow_mut().should_emit() {
            return;
        }
        let snapshot = duel.borrow().snapshot();
        match serde_json::to_string(&snapshot) {
            Ok(json) => debug!(snapshot = %json, "Render"),
            Err(e) => warn!(error = %e, "Failed to serialize snapshot"),
        }
    });
}

/// Count the result against a profile per side
fn record_profiles(config: &Config, record: &MatchRecord) {
    let Some(outcome) = record.outcome else {
        return;
    };

    let mut profiles = ProfileStore::new();
    for side in Side::BOTH {
        let name = match side {
            Side::One => &config.player_fighter,
            Side::Two => &config.opponent_fighter,
        };
        let id = Uuid::new_v4();
        profiles.ensure_profile(id, name);
        match profiles.record_result(id, outcome.winner() == Some(side)) {
            Ok(profile) => info!(
                profile_id = %profile.id,
                username = %profile.username,
                wins = profile.wins,
                total_matches = profile.total_matches,
                "Profile updated"
            ),
            Err(e) => warn!(error = %e, "Failed to record result"),
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str, format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => registry.with(layer).init(),
        LogFormat::Json => registry.with(layer.json()).init(),
    }
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, stopping match");
}
