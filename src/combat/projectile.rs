//! Short-lived projectiles spawned by attacks.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use super::hitbox::Hitbox;
use super::{Element, Faction};
use crate::entity::Entity;
use crate::error::CoreResult;
use crate::movement::direct_delta;

/// Why a projectile left play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpiryReason {
    Lifetime,
    OutOfBounds,
    Hit { target: u32 },
    RoomLeft,
}

/// Launch parameters chosen by an attack strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectileLaunch {
    pub direction: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub lifetime: i32,
    pub damage: i32,
    pub element: Option<Element>,
    pub drawn: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Assigned by the run loop when the projectile enters play
    pub id: u32,
    /// Owner entity id; the owner is never dereferenced
    pub owner: u32,
    pub faction: Faction,
    pub pos: Vec2,
    pub size: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
    pub lifetime: i32,
    pub element: Option<Element>,
    pub drawn: bool,
    pub hitbox: Hitbox,
}

impl Projectile {
    /// Spawn at the owner's projectile anchor
    pub fn launch(owner: &Entity, launch: ProjectileLaunch) -> CoreResult<Self> {
        let pos = owner.projectile_origin(launch.size)?;
        Ok(Self {
            id: 0,
            owner: owner.id,
            faction: owner.faction(),
            pos,
            size: launch.size,
            direction: launch.direction,
            speed: launch.speed,
            damage: launch.damage,
            lifetime: launch.lifetime,
            element: launch.element,
            drawn: launch.drawn,
            hitbox: Hitbox::rect(pos, launch.size, 1.0),
        })
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Displacement and hitbox recentering
    pub fn advance(&mut self) {
        self.pos += direct_delta(self.speed, self.direction);
        let (center, size) = (self.center(), self.size);
        self.hitbox.recenter(center, size);
    }

    pub fn is_out_of_bounds(&self, bounds: &Hitbox) -> bool {
        !bounds.contains_point(self.pos)
    }

    /// Damage the nearest opposing entity whose defense box overlaps this
    /// projectile. At most one entity is hit.
    pub fn resolve_hit(&self, entities: &mut [&mut Entity]) -> CoreResult<Option<u32>> {
        let target_faction = self.faction.opposing();
        let mut candidates: Vec<(f32, usize)> = entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.faction() == target_faction && e.is_alive())
            .map(|(i, e)| (self.pos.distance(e.pos), i))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (_, index) in candidates {
            let entity = &mut entities[index];
            if entity.hitboxes.defense.overlaps(&self.hitbox)? {
                let dealt = entity.health.take_damage(self.damage);
                tracing::debug!(
                    projectile = self.id,
                    target = entity.id,
                    dealt,
                    hp = entity.health.current,
                    "projectile hit"
                );
                return Ok(Some(entity.id));
            }
        }
        Ok(None)
    }

    /// Age one tick. Returns the reason the projectile must be removed, if any.
    pub fn turn(
        &mut self,
        entities: &mut [&mut Entity],
        bounds: &Hitbox,
    ) -> CoreResult<Option<ExpiryReason>> {
        self.advance();
        self.lifetime -= 1;
        if self.is_out_of_bounds(bounds) {
            return Ok(Some(ExpiryReason::OutOfBounds));
        }
        if let Some(target) = self.resolve_hit(entities)? {
            return Ok(Some(ExpiryReason::Hit { target }));
        }
        if self.lifetime <= 0 {
            return Ok(Some(ExpiryReason::Lifetime));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::attack::AttackStrategy;
    use crate::config::GameConstants;
    use crate::entity::{EntityKind, ProjectileAnchor};
    use crate::geometry::Rect;
    use crate::monster::EnemyKind;
    use crate::movement::MovementStrategy;

    fn entity(id: u32, kind: EntityKind, pos: Vec2) -> Entity {
        let constants = GameConstants::default();
        Entity::new(
            id,
            kind,
            pos,
            &constants.player,
            MovementStrategy::Stationary,
            AttackStrategy::Melee,
            ProjectileAnchor::Origin,
        )
    }

    fn bolt(owner: &Entity, direction: Vec2, lifetime: i32) -> Projectile {
        Projectile::launch(
            owner,
            ProjectileLaunch {
                direction,
                size: Vec2::new(4.0, 4.0),
                speed: 5.0,
                lifetime,
                damage: 6,
                element: Some(Element::Fire),
                drawn: true,
            },
        )
        .unwrap()
    }

    fn screen() -> Hitbox {
        Hitbox::bounds(Rect::new(0.0, 0.0, 272.0, 240.0))
    }

    #[test]
    fn test_expires_on_lifetime() {
        let owner = entity(0, EntityKind::Player, Vec2::new(100.0, 100.0));
        let mut p = bolt(&owner, Vec2::X, 2);
        assert_eq!(p.turn(&mut [], &screen()).unwrap(), None);
        assert_eq!(
            p.turn(&mut [], &screen()).unwrap(),
            Some(ExpiryReason::Lifetime)
        );
        assert_eq!(p.pos, Vec2::new(110.0, 100.0));
    }

    #[test]
    fn test_expires_out_of_bounds() {
        let owner = entity(0, EntityKind::Player, Vec2::new(2.0, 100.0));
        let mut p = bolt(&owner, Vec2::NEG_X, 50);
        assert_eq!(
            p.turn(&mut [], &screen()).unwrap(),
            Some(ExpiryReason::OutOfBounds)
        );
    }

    #[test]
    fn test_hits_nearest_opponent_once() {
        let owner = entity(0, EntityKind::Player, Vec2::new(100.0, 100.0));
        let mut near = entity(1, EntityKind::Enemy(EnemyKind::Boca), Vec2::new(103.0, 100.0));
        let mut far = entity(2, EntityKind::Enemy(EnemyKind::Boca), Vec2::new(108.0, 100.0));
        let mut me = owner.clone();
        let mut p = bolt(&owner, Vec2::X, 10);

        let hp = near.health.current;
        let mut all = [&mut me, &mut far, &mut near];
        let reason = p.turn(&mut all, &screen()).unwrap();
        assert_eq!(reason, Some(ExpiryReason::Hit { target: 1 }));
        assert_eq!(near.health.current, hp - 6);
        assert_eq!(far.health.current, far.health.max);
        // own faction is never hit
        assert_eq!(me.health.current, me.health.max);
    }

    #[test]
    fn test_dead_entities_are_not_targets() {
        let owner = entity(0, EntityKind::Player, Vec2::new(100.0, 100.0));
        let mut corpse = entity(1, EntityKind::Enemy(EnemyKind::Boca), Vec2::new(100.0, 100.0));
        corpse.health.current = 0;
        let p = bolt(&owner, Vec2::ZERO, 1);
        assert_eq!(p.resolve_hit(&mut [&mut corpse]).unwrap(), None);
    }
}
