//! Bevy integration: ticks the [`DungeonRun`] resource once per frame.

use bevy::prelude::*;
use tracing::{debug, error};

use super::{DungeonRun, RunEvent, RunOutcome};
use crate::player::PlayerIntent;

pub struct DungeonPlugin;

impl Plugin for DungeonPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<RunEvent>()
            .insert_resource(PlayerIntent::default())
            .insert_resource(RunStatus::default())
            .add_systems(Update, (tick_dungeon_run, log_run_events).chain());
    }
}

/// Latest tick of the run, mirrored for systems that only need a summary
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct RunStatus {
    pub tick: u64,
    pub outcome: Option<RunOutcome>,
    pub error: Option<String>,
}

impl RunStatus {
    pub fn is_over(&self) -> bool {
        self.outcome.is_some() || self.error.is_some()
    }
}

/// System: advance the run with the current intent and forward its events
pub fn tick_dungeon_run(
    run: Option<ResMut<DungeonRun>>,
    intent: Res<PlayerIntent>,
    mut status: ResMut<RunStatus>,
    mut events: EventWriter<RunEvent>,
) {
    let Some(mut run) = run else {
        return;
    };
    if status.error.is_some() {
        return;
    }
    match run.tick(*intent) {
        Ok(report) => {
            status.tick = report.tick;
            status.outcome = report.outcome;
            events.send_batch(report.events);
        }
        Err(err) => {
            error!(tick = run.tick_count(), %err, "dungeon tick failed");
            status.error = Some(err.to_string());
        }
    }
}

/// System: trace every run event
pub fn log_run_events(mut events: EventReader<RunEvent>) {
    for event in events.read() {
        debug!(?event, "run event");
    }
}
