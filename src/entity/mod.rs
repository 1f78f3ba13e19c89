//! Shared entity state machine for the player and every enemy.
//!
//! A turn is: capture the display state, run the pre-turn hook, move, attack,
//! recompute the display state, then cool down. Nothing but the cooldown and
//! the hit points carries over from one tick to the next.

use bevy::math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::combat::attack::AttackStrategy;
use crate::combat::hitbox::{Hitbox, HitboxSet};
use crate::combat::projectile::Projectile;
use crate::combat::{Element, Faction, Health};
use crate::config::{EntityStats, GameConstants};
use crate::error::CoreResult;
use crate::monster::{self, EnemyKind};
use crate::movement::{self, MovementStrategy};
use crate::player;

/// What an entity is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy(EnemyKind),
}

impl EntityKind {
    pub fn faction(&self) -> Faction {
        match self {
            EntityKind::Player => Faction::Player,
            EntityKind::Enemy(_) => Faction::Enemy,
        }
    }
}

/// Display state, recomputed every tick from `(attacking, moving)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionState {
    #[default]
    Idle,
    Walking,
    Attacking,
    WalkingAttacking,
}

impl ActionState {
    pub fn from_flags(attacking: bool, moving: bool) -> Self {
        match (attacking, moving) {
            (true, true) => ActionState::WalkingAttacking,
            (true, false) => ActionState::Attacking,
            (false, true) => ActionState::Walking,
            (false, false) => ActionState::Idle,
        }
    }
}

/// Where an entity's projectiles appear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileAnchor {
    /// Entity top-left corner
    Origin,
    /// Entity center
    Center,
    /// In front of the player, depending on facing
    Facing,
}

/// Read-only snapshot of an entity, taken before another entity's turn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityView {
    pub id: u32,
    pub faction: Faction,
    pub pos: Vec2,
    pub size: Vec2,
    pub draw: Hitbox,
    pub defense: Hitbox,
}

impl EntityView {
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub element: Element,
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub damage: i32,
    pub health: Health,
    /// Intent for the current tick, components in {-1, 0, 1}
    pub axis: IVec2,
    /// Sticky facing, always a cardinal unit vector
    pub mov_axis: IVec2,
    pub last_mov_axis: IVec2,
    pub state: ActionState,
    pub attacking: bool,
    pub moving: bool,
    pub first_attack: bool,
    pub attack_cooldown: i32,
    pub max_attack_cooldown: i32,
    pub movement: MovementStrategy,
    pub attack: AttackStrategy,
    pub anchor: ProjectileAnchor,
    pub hitboxes: HitboxSet,
}

impl Entity {
    /// Entity facing right, idle, with draw/attack/defense boxes on its body
    pub fn new(
        id: u32,
        kind: EntityKind,
        pos: Vec2,
        stats: &EntityStats,
        movement: MovementStrategy,
        attack: AttackStrategy,
        anchor: ProjectileAnchor,
    ) -> Self {
        let size = stats.size();
        Self {
            id,
            kind,
            element: Element::default(),
            pos,
            size,
            speed: stats.speed,
            damage: stats.damage,
            health: Health::new(stats.hp),
            axis: IVec2::ZERO,
            mov_axis: IVec2::X,
            last_mov_axis: IVec2::X,
            state: ActionState::Idle,
            attacking: false,
            moving: false,
            first_attack: false,
            attack_cooldown: 0,
            max_attack_cooldown: stats.attack_cooldown,
            movement,
            attack,
            anchor,
            hitboxes: HitboxSet::new(pos, size),
        }
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.element = element;
        self
    }

    pub fn faction(&self) -> Faction {
        self.kind.faction()
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    pub fn view(&self) -> EntityView {
        EntityView {
            id: self.id,
            faction: self.faction(),
            pos: self.pos,
            size: self.size,
            draw: self.hitboxes.draw,
            defense: self.hitboxes.defense,
        }
    }

    /// Begin an attack: the next attack step fires
    pub fn start_attack(&mut self) {
        self.attacking = true;
        self.attack_cooldown = self.max_attack_cooldown;
    }

    /// Top-left corner of a projectile of `proj_size` spawned by this entity
    pub fn projectile_origin(&self, proj_size: Vec2) -> CoreResult<Vec2> {
        match self.anchor {
            ProjectileAnchor::Origin => Ok(self.pos),
            ProjectileAnchor::Center => Ok(self.center()),
            // attacks fire on their first cooldown tick, before update_state,
            // so first_attack still holds the previous tick's value here
            ProjectileAnchor::Facing => player::facing_projectile_origin(
                self.pos,
                self.mov_axis,
                self.first_attack,
                self.hitboxes.defense.size(),
                proj_size,
            ),
        }
    }

    fn pre_turn(&mut self) {
        match self.kind {
            EntityKind::Player => {}
            EntityKind::Enemy(kind) => monster::enemy_pre_turn(self, kind),
        }
    }

    fn update_state(&mut self, previous: ActionState) {
        self.state = ActionState::from_flags(self.attacking, self.moving);
        self.first_attack = self.state != previous && self.state == ActionState::Attacking;
    }

    fn after_turn(&mut self) {
        self.axis = IVec2::ZERO;
        self.moving = false;
        self.attack_cooldown -= 1;
        if self.attack_cooldown < 0 {
            self.attacking = false;
        }
    }

    /// Run one tick. `active` is the snapshot of every entity sharing the
    /// tick, player first.
    pub fn turn(
        &mut self,
        active: &[EntityView],
        constants: &GameConstants,
    ) -> CoreResult<Option<Projectile>> {
        let previous = self.state;
        self.pre_turn();

        movement::step_entity(self, active, &constants.bounds)?;

        let defender = match self.kind {
            EntityKind::Player => None,
            EntityKind::Enemy(_) => active.first().filter(|v| v.id != self.id),
        };
        let projectile = self.attack.attack(self, defender, constants)?;

        self.update_state(previous);
        self.after_turn();
        Ok(projectile)
    }
}
