//! Enemy kinds and their behaviour.
//!
//! Two families exist. Turrets (moco, boss) stand still and shoot at the
//! player when it enters their vision circle. Chargers (tostada, boca,
//! conejo) walk toward the player and hit in melee.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::attack::AttackStrategy;
use crate::combat::hitbox::Hitbox;
use crate::combat::Element;
use crate::config::GameConstants;
use crate::constants::TURRET_COOLDOWN_BONUS;
use crate::entity::{Entity, EntityKind, ProjectileAnchor};
use crate::error::{CoreError, CoreResult};
use crate::movement::MovementStrategy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Moco,
    Tostada,
    Boca,
    Conejo,
    Boss,
}

/// Behaviour family of an enemy kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyFamily {
    Turret,
    Charger,
}

impl EnemyKind {
    pub fn all() -> &'static [EnemyKind] {
        &[
            EnemyKind::Moco,
            EnemyKind::Tostada,
            EnemyKind::Boca,
            EnemyKind::Conejo,
            EnemyKind::Boss,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Moco => "moco",
            EnemyKind::Tostada => "tostada",
            EnemyKind::Boca => "boca",
            EnemyKind::Conejo => "conejo",
            EnemyKind::Boss => "boss",
        }
    }

    pub fn family(&self) -> EnemyFamily {
        match self {
            EnemyKind::Moco | EnemyKind::Boss => EnemyFamily::Turret,
            EnemyKind::Tostada | EnemyKind::Boca | EnemyKind::Conejo => EnemyFamily::Charger,
        }
    }

    pub fn is_turret(&self) -> bool {
        self.family() == EnemyFamily::Turret
    }
}

/// Build an enemy ready to act on its first tick
pub fn spawn_enemy(
    id: u32,
    kind: EnemyKind,
    pos: Vec2,
    element: Element,
    constants: &GameConstants,
) -> CoreResult<Entity> {
    let stats = constants.enemy(kind)?;
    let mut enemy = match kind.family() {
        EnemyFamily::Turret => {
            let radius = stats.vision.ok_or_else(|| {
                CoreError::InvalidConfig(format!("{} needs a vision radius", kind.as_str()))
            })?;
            let mut enemy = Entity::new(
                id,
                EntityKind::Enemy(kind),
                pos,
                stats,
                MovementStrategy::Stationary,
                AttackStrategy::vision_gated(AttackStrategy::SeekProjectile),
                ProjectileAnchor::Center,
            );
            enemy.max_attack_cooldown += TURRET_COOLDOWN_BONUS;
            enemy.hitboxes = enemy
                .hitboxes
                .with_vision(Hitbox::circle(pos, stats.size(), radius));
            enemy
        }
        EnemyFamily::Charger => Entity::new(
            id,
            EntityKind::Enemy(kind),
            pos,
            stats,
            MovementStrategy::Seek,
            AttackStrategy::Melee,
            ProjectileAnchor::Origin,
        ),
    }
    .with_element(element);
    enemy.attacking = true;
    enemy.moving = true;
    Ok(enemy)
}

/// Pre-turn hook: restart the attack once the previous one is over.
/// Chargers also drop the walking display flag.
pub fn enemy_pre_turn(enemy: &mut Entity, kind: EnemyKind) {
    if kind.family() == EnemyFamily::Charger {
        enemy.moving = false;
    }
    if enemy.attack_cooldown < 0 {
        enemy.start_attack();
    }
}
