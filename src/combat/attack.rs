//! Attack strategies.
//!
//! An attack fires on the single tick where `attacking` is set and the
//! cooldown still sits at its maximum, so each activation yields at most one
//! projectile.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::{Projectile, ProjectileLaunch};
use crate::config::GameConstants;
use crate::constants::MELEE_PROJECTILE_LIFETIME;
use crate::entity::{Entity, EntityView};
use crate::error::CoreResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackStrategy {
    /// Invisible one-tick projectile on top of the attacker
    Melee,
    /// Elemental projectile along the attacker's facing
    AxisProjectile,
    /// Elemental projectile aimed at the defender
    SeekProjectile,
    /// Forwards to the inner strategy only while the defender is in sight
    VisionGated(Box<AttackStrategy>),
}

impl AttackStrategy {
    pub fn vision_gated(inner: AttackStrategy) -> Self {
        AttackStrategy::VisionGated(Box::new(inner))
    }

    /// Damage carried by the projectile; decorators defer to what they wrap
    pub fn damage(&self, attacker: &Entity) -> i32 {
        match self {
            AttackStrategy::VisionGated(inner) => inner.damage(attacker),
            _ => attacker.damage,
        }
    }

    pub fn attack(
        &self,
        attacker: &Entity,
        defender: Option<&EntityView>,
        constants: &GameConstants,
    ) -> CoreResult<Option<Projectile>> {
        if !(attacker.attacking && attacker.attack_cooldown == attacker.max_attack_cooldown) {
            return Ok(None);
        }
        let damage = self.damage(attacker);
        self.make_attack(attacker, defender, damage, constants)
    }

    fn make_attack(
        &self,
        attacker: &Entity,
        defender: Option<&EntityView>,
        damage: i32,
        constants: &GameConstants,
    ) -> CoreResult<Option<Projectile>> {
        match self {
            AttackStrategy::Melee => {
                let launch = ProjectileLaunch {
                    direction: Vec2::ZERO,
                    size: attacker.size,
                    speed: 0.0,
                    lifetime: MELEE_PROJECTILE_LIFETIME,
                    damage,
                    element: None,
                    drawn: false,
                };
                Projectile::launch(attacker, launch).map(Some)
            }
            AttackStrategy::AxisProjectile => {
                let direction = attacker.mov_axis.as_vec2();
                elemental(attacker, direction, damage, constants).map(Some)
            }
            AttackStrategy::SeekProjectile => {
                let Some(defender) = defender else {
                    return Ok(None);
                };
                let aim = (defender.defense.center() - attacker.hitboxes.attack.center()).trunc();
                let direction = aim
                    .try_normalize()
                    .unwrap_or_else(|| attacker.mov_axis.as_vec2());
                elemental(attacker, direction, damage, constants).map(Some)
            }
            AttackStrategy::VisionGated(inner) => {
                let Some(defender) = defender else {
                    return Ok(None);
                };
                let in_sight = match &attacker.hitboxes.vision {
                    Some(vision) => vision.overlaps(&defender.defense)?,
                    None => false,
                };
                if in_sight {
                    inner.make_attack(attacker, Some(defender), damage, constants)
                } else {
                    Ok(None)
                }
            }
        }
    }
}

fn elemental(
    attacker: &Entity,
    direction: Vec2,
    damage: i32,
    constants: &GameConstants,
) -> CoreResult<Projectile> {
    let stats = constants.projectile(attacker.element)?;
    Projectile::launch(
        attacker,
        ProjectileLaunch {
            direction,
            size: stats.size(),
            speed: stats.speed,
            lifetime: stats.lifetime,
            damage,
            element: Some(attacker.element),
            drawn: true,
        },
    )
}
