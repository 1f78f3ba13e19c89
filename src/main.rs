use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use tracing::info;

use dungeon_core::generation::survey::survey;
use dungeon_core::logging::{LogLevel, LoggingPlugin, TimingSpan, TracingConfig};
use dungeon_core::run::plugin::{tick_dungeon_run, DungeonPlugin, RunStatus};
use dungeon_core::{DungeonRun, GameConstants, PlayerIntent, RunOutcome, SessionState};

const DEFAULT_SESSION_PATH: &str = "session.json";
const DEFAULT_MAX_TICKS: u64 = 3600;
const INTENT_HOLD_TICKS: u32 = 20;
const SURVEY_SAMPLES: u64 = 1000;

/// Random walk standing in for a keyboard: a direction held for a while and
/// an occasional swing
#[derive(Resource)]
struct IntentDriver {
    rng: Xoshiro256PlusPlus,
    held: IVec2,
    remaining: u32,
}

impl IntentDriver {
    fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            held: IVec2::ZERO,
            remaining: 0,
        }
    }

    fn next_intent(&mut self) -> PlayerIntent {
        if self.remaining == 0 {
            self.held = IVec2::new(self.rng.gen_range(-1..=1), self.rng.gen_range(-1..=1));
            self.remaining = INTENT_HOLD_TICKS;
        }
        self.remaining -= 1;
        PlayerIntent {
            axis: self.held,
            attack: self.rng.gen_bool(0.125),
        }
    }
}

fn drive_intent(mut driver: ResMut<IntentDriver>, mut intent: ResMut<PlayerIntent>) {
    *intent = driver.next_intent();
}

fn env_path(name: &str) -> Option<PathBuf> {
    env::var_os(name).map(PathBuf::from)
}

/// `DUNGEON_LOG_LEVEL` raises every crate module to the given level
fn tracing_config() -> TracingConfig {
    env::var("DUNGEON_LOG_LEVEL")
        .ok()
        .and_then(|name| LogLevel::from_name(&name))
        .map(TracingConfig::verbose)
        .unwrap_or_default()
}

fn load_constants() -> Result<GameConstants> {
    match env_path("DUNGEON_CONSTANTS") {
        Some(path) => GameConstants::load(&path)
            .with_context(|| format!("loading constants from {}", path.display())),
        None => Ok(GameConstants::default()),
    }
}

fn max_ticks() -> Result<u64> {
    match env::var("DUNGEON_MAX_TICKS") {
        Ok(value) => value
            .parse()
            .with_context(|| format!("DUNGEON_MAX_TICKS is not a tick count: {value}")),
        Err(_) => Ok(DEFAULT_MAX_TICKS),
    }
}

fn run_survey(constants: &GameConstants, session: &SessionState) -> Result<()> {
    let floor = session.dungeon.floor;
    let dim = constants.map.dimension_for_floor(floor);
    let report = {
        let _span = TimingSpan::new("generation_survey");
        survey(dim, floor, 0..SURVEY_SAMPLES, &constants.generation)?
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<()> {
    let constants = load_constants()?;
    let session_path = env_path("DUNGEON_SESSION").unwrap_or_else(|| DEFAULT_SESSION_PATH.into());
    let mut session = SessionState::load_or_default(&session_path)
        .with_context(|| format!("loading session from {}", session_path.display()))?;

    let mut app = App::new();
    app.add_plugins(LoggingPlugin {
        config: tracing_config(),
    });

    if env::args().nth(1).as_deref() == Some("survey") {
        return run_survey(&constants, &session);
    }

    let run = DungeonRun::new(constants, &session).context("building the dungeon")?;
    info!(
        floor = session.dungeon.floor,
        rooms = run.level().room_count(),
        "entering the dungeon"
    );

    app.add_plugins(DungeonPlugin)
        .insert_resource(run)
        .insert_resource(IntentDriver::new(session.dungeon.seed))
        .add_systems(Update, drive_intent.before(tick_dungeon_run));

    let limit = max_ticks()?;
    for _ in 0..limit {
        app.update();
        if app.world().resource::<RunStatus>().is_over() {
            break;
        }
    }

    let status = app.world().resource::<RunStatus>().clone();
    if let Some(err) = status.error {
        anyhow::bail!("run aborted at tick {}: {err}", status.tick);
    }
    match status.outcome {
        Some(RunOutcome::Victory) => {
            session.dungeon.floor += 1;
            info!(tick = status.tick, next_floor = session.dungeon.floor, "floor cleared");
        }
        Some(RunOutcome::Defeat) => info!(tick = status.tick, "player defeated"),
        None => info!(tick = status.tick, "tick limit reached"),
    }

    session
        .save(&session_path)
        .with_context(|| format!("saving session to {}", session_path.display()))?;
    Ok(())
}
