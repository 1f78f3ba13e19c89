//! Turn orchestrator: drives the player, the current room and the
//! projectiles one tick at a time.
//!
//! Tick order:
//! 1. finished runs report their outcome and do nothing else
//! 2. terminal check (defeat before victory)
//! 3. player intent, unless a room transition is running
//! 4. active list = player + current room enemies
//! 5. projectiles age, removal deferred to the end of the pass
//! 6. every living entity takes its turn, new projectiles appended after
//! 7. defeated enemies are swept
//! 8. door crossing

pub mod plugin;

use std::iter;

use bevy::prelude::{Event, Resource};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::combat::hitbox::Hitbox;
use crate::combat::projectile::{ExpiryReason, Projectile};
use crate::combat::Element;
use crate::config::{GameConstants, SessionState};
use crate::constants::{DOOR_CROSSING_COOLDOWN_TICKS, ROOM_TRANSITION_TICKS};
use crate::dungeon::door::DoorDirection;
use crate::dungeon::{LevelMap, Room, RoomKey};
use crate::entity::{Entity, EntityKind, EntityView};
use crate::error::{CoreError, CoreResult};
use crate::generation::{build_level, DungeonSeed};
use crate::monster::EnemyKind;
use crate::player::{apply_intent, spawn_player, PlayerIntent, Sword};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Victory,
    Defeat,
}

/// Discrete things that happened during a tick
#[derive(Event, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    ProjectileSpawned {
        id: u32,
        owner: u32,
        element: Option<Element>,
    },
    ProjectileExpired {
        id: u32,
        reason: ExpiryReason,
    },
    EntityDefeated {
        id: u32,
        kind: EnemyKind,
    },
    RoomTransition {
        from: RoomKey,
        to: RoomKey,
    },
    Terminal {
        outcome: RunOutcome,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<RunEvent>,
    pub outcome: Option<RunOutcome>,
}

/// Door crossing gate: a cooldown counter since the last crossing and the
/// remaining ticks of the screen transition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorCrossing {
    pub counter: u32,
    pub transition: u32,
}

impl DoorCrossing {
    pub fn in_transition(&self) -> bool {
        self.transition > 0
    }

    /// Consume one transition tick; true while the transition gates input
    fn step_transition(&mut self) -> bool {
        if self.transition == 0 {
            return false;
        }
        self.transition -= 1;
        true
    }

    pub fn can_cross(&self, attacking: bool) -> bool {
        !attacking && !self.in_transition() && self.counter > DOOR_CROSSING_COOLDOWN_TICKS
    }

    fn start(&mut self) {
        self.counter = 0;
        self.transition = ROOM_TRANSITION_TICKS;
    }
}

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct DungeonRun {
    constants: GameConstants,
    level: LevelMap,
    current: RoomKey,
    player: Entity,
    projectiles: Vec<Projectile>,
    next_projectile_id: u32,
    crossing: DoorCrossing,
    tick: u64,
    outcome: Option<RunOutcome>,
}

impl DungeonRun {
    /// Build the floor stored in the session and place the player in its
    /// entry room
    pub fn new(constants: GameConstants, session: &SessionState) -> CoreResult<Self> {
        constants.validate()?;
        let seed = DungeonSeed::new(session.dungeon.seed);
        let level = build_level(
            &seed,
            session.dungeon.floor,
            session.dungeon.theme,
            &constants,
        )?;
        let sword = Sword::from_settings(&session.sword)?;
        let player = spawn_player(&sword, &constants)?;
        Ok(Self::from_level(constants, level, player))
    }

    pub fn from_level(constants: GameConstants, level: LevelMap, player: Entity) -> Self {
        let current = level.entry;
        Self {
            constants,
            level,
            current,
            player,
            projectiles: Vec::new(),
            next_projectile_id: 1,
            crossing: DoorCrossing::default(),
            tick: 0,
            outcome: None,
        }
    }

    pub fn constants(&self) -> &GameConstants {
        &self.constants
    }

    pub fn level(&self) -> &LevelMap {
        &self.level
    }

    pub fn current_key(&self) -> RoomKey {
        self.current
    }

    pub fn current_room(&self) -> CoreResult<&Room> {
        self.level.room(self.current).ok_or_else(|| missing_room(self.current))
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.player
    }

    /// Enemies of the current room
    pub fn enemies(&self) -> &[Entity] {
        self.level
            .room(self.current)
            .map(|r| r.enemies.as_slice())
            .unwrap_or(&[])
    }

    pub fn enemies_mut(&mut self) -> CoreResult<&mut Vec<Entity>> {
        let current = self.current;
        self.level
            .room_mut(current)
            .map(|r| &mut r.enemies)
            .ok_or_else(|| missing_room(current))
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn crossing(&self) -> DoorCrossing {
        self.crossing
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    fn terminal_check(&self) -> Option<RunOutcome> {
        if !self.player.is_alive() {
            return Some(RunOutcome::Defeat);
        }
        let cleared = self.level.room(self.current).is_some_and(Room::is_cleared);
        if self.current == self.level.exit && cleared {
            return Some(RunOutcome::Victory);
        }
        None
    }

    /// Advance the run by one tick
    pub fn tick(&mut self, intent: PlayerIntent) -> CoreResult<TickReport> {
        if let Some(outcome) = self.outcome {
            return Ok(TickReport {
                tick: self.tick,
                events: Vec::new(),
                outcome: Some(outcome),
            });
        }
        self.tick += 1;
        let mut events = Vec::new();

        if let Some(outcome) = self.terminal_check() {
            info!(tick = self.tick, ?outcome, room = %self.current, "run finished");
            self.outcome = Some(outcome);
            events.push(RunEvent::Terminal { outcome });
            return Ok(self.report(events));
        }

        if !self.crossing.step_transition() {
            apply_intent(&mut self.player, intent);
        }

        let bounds = Hitbox::bounds(self.constants.bounds.outer());
        let current = self.current;
        let room = self
            .level
            .rooms
            .get_mut(&current)
            .ok_or_else(|| missing_room(current))?;

        age_projectiles(
            &mut self.projectiles,
            &mut self.player,
            &mut room.enemies,
            &bounds,
            &mut events,
        )?;

        let spawned = entity_turns(&mut self.player, &mut room.enemies, &self.constants)?;
        for mut projectile in spawned {
            projectile.id = self.next_projectile_id;
            self.next_projectile_id += 1;
            events.push(RunEvent::ProjectileSpawned {
                id: projectile.id,
                owner: projectile.owner,
                element: projectile.element,
            });
            self.projectiles.push(projectile);
        }

        sweep_defeated(&mut room.enemies, &mut events);

        self.cross_doors(&mut events)?;

        Ok(self.report(events))
    }

    fn report(&self, events: Vec<RunEvent>) -> TickReport {
        TickReport {
            tick: self.tick,
            events,
            outcome: self.outcome,
        }
    }

    fn cross_doors(&mut self, events: &mut Vec<RunEvent>) -> CoreResult<()> {
        self.crossing.counter += 1;
        if !self.crossing.can_cross(self.player.attacking) {
            return Ok(());
        }
        let Some(door_hitbox) = self.player.hitboxes.door else {
            return Ok(());
        };
        let Some(direction) = self.current_room()?.doors.door_touching(&door_hitbox)? else {
            return Ok(());
        };
        self.enter_room(direction, events)
    }

    /// Walk through the door on `direction` of the current room
    fn enter_room(&mut self, direction: DoorDirection, events: &mut Vec<RunEvent>) -> CoreResult<()> {
        let from = self.current;
        let to = from.neighbour(direction);
        let arrival = self
            .level
            .room(to)
            .ok_or_else(|| missing_room(to))?
            .doors
            .opposite_of(direction)
            .rect;

        let defense_size = self.player.hitboxes.defense.size();
        self.player.pos = self.constants.bounds.clamp(
            arrival.center() - self.player.size / 2.0,
            self.player.size,
            defense_size,
        );
        let (center, size) = (self.player.center(), self.player.size);
        self.player.hitboxes.recenter_all(center, size);

        for projectile in self.projectiles.drain(..) {
            events.push(RunEvent::ProjectileExpired {
                id: projectile.id,
                reason: ExpiryReason::RoomLeft,
            });
        }

        self.current = to;
        self.level.mark_visited(to);
        self.crossing.start();
        info!(tick = self.tick, %from, %to, "room transition");
        events.push(RunEvent::RoomTransition { from, to });
        Ok(())
    }
}

fn missing_room(key: RoomKey) -> CoreError {
    CoreError::InvalidArgument(format!("room {key} is not part of the level"))
}

/// Step 5: every projectile moves, ages and may hit one entity
fn age_projectiles(
    projectiles: &mut Vec<Projectile>,
    player: &mut Entity,
    enemies: &mut [Entity],
    bounds: &Hitbox,
    events: &mut Vec<RunEvent>,
) -> CoreResult<()> {
    let mut active: Vec<&mut Entity> = iter::once(player).chain(enemies.iter_mut()).collect();
    let mut expired = Vec::new();
    for projectile in projectiles.iter_mut() {
        if let Some(reason) = projectile.turn(&mut active, bounds)? {
            expired.push((projectile.id, reason));
        }
    }
    projectiles.retain(|p| !expired.iter().any(|(id, _)| *id == p.id));
    events.extend(
        expired
            .into_iter()
            .map(|(id, reason)| RunEvent::ProjectileExpired { id, reason }),
    );
    Ok(())
}

fn views(player: &Entity, enemies: &[Entity]) -> Vec<EntityView> {
    iter::once(player.view())
        .chain(enemies.iter().filter(|e| e.is_alive()).map(Entity::view))
        .collect()
}

/// Step 6: player first, then enemies in room order. Each entity sees the
/// others as they are after the turns already taken this tick.
fn entity_turns(
    player: &mut Entity,
    enemies: &mut [Entity],
    constants: &GameConstants,
) -> CoreResult<Vec<Projectile>> {
    let mut spawned = Vec::new();
    if player.is_alive() {
        let active = views(player, enemies);
        spawned.extend(player.turn(&active, constants)?);
    }
    for index in 0..enemies.len() {
        if !enemies[index].is_alive() {
            continue;
        }
        let active = views(player, enemies);
        spawned.extend(enemies[index].turn(&active, constants)?);
    }
    Ok(spawned)
}

/// Step 7: drop enemies with no hit points left
fn sweep_defeated(enemies: &mut Vec<Entity>, events: &mut Vec<RunEvent>) {
    enemies.retain(|enemy| {
        if enemy.is_alive() {
            return true;
        }
        if let EntityKind::Enemy(kind) = enemy.kind {
            debug!(id = enemy.id, kind = kind.as_str(), "enemy defeated");
            events.push(RunEvent::EntityDefeated { id: enemy.id, kind });
        }
        false
    });
}
