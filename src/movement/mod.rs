//! Movement strategies and the shared movement step.
//!
//! Every mover runs the same four phases each tick: displacement, facing
//! update, hitbox recentering and (entities only) overlap hook plus wall
//! clamp. Strategies only decide the displacement.

use bevy::math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::DungeonBounds;
use crate::entity::{Entity, EntityView};
use crate::error::CoreResult;

/// How an entity picks its displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementStrategy {
    /// Never moves
    Stationary,
    /// Follows its own `axis`
    Direct,
    /// Steers `axis` toward the first active entity, then moves like `Direct`
    Seek,
}

/// Displacement for `speed` along `axis`; diagonals are not faster than
/// straight lines.
pub fn direct_delta(speed: f32, axis: Vec2) -> Vec2 {
    if axis.x != 0.0 && axis.y != 0.0 {
        speed * axis / axis.length()
    } else {
        speed * axis
    }
}

/// Axis toward `target_center`, zeroing each component inside a dead zone of
/// half the mover's own size. A distance exactly equal to the half size is
/// inside the dead zone.
pub fn seek_axis(own_center: Vec2, own_size: Vec2, target_center: Vec2) -> IVec2 {
    let d = (target_center - own_center).trunc();
    let component = |d: f32, half: f32| {
        if d.abs() > half {
            d.signum() as i32
        } else {
            0
        }
    };
    IVec2::new(
        component(d.x, own_size.x / 2.0),
        component(d.y, own_size.y / 2.0),
    )
}

/// Reserved response to two entities' draw boxes overlapping. Intentionally
/// leaves both entities where they are.
pub fn on_entity_overlap(_entity: &mut Entity, _other: &EntityView) {}

/// Facing update: `mov_axis` follows a nonzero `axis`, horizontal wins on
/// diagonals. Turning away from left re-anchors on the draw box.
fn update_facing(entity: &mut Entity) {
    entity.last_mov_axis = entity.mov_axis;
    if entity.axis != IVec2::ZERO {
        entity.mov_axis = if entity.axis.x == 0 {
            entity.axis
        } else {
            IVec2::new(entity.axis.x, 0)
        };
    }

    let Some(draw) = entity.hitboxes.draw.as_rect().copied() else {
        return;
    };
    if entity.last_mov_axis == IVec2::NEG_X && entity.mov_axis != entity.last_mov_axis {
        entity.pos.x = draw.x;
    } else if entity.last_mov_axis == IVec2::X && entity.mov_axis == IVec2::NEG_X {
        entity.pos.x = draw.x + draw.w - entity.size.x;
    }
}

/// Full movement step for an entity
pub fn step_entity(
    entity: &mut Entity,
    active: &[EntityView],
    bounds: &DungeonBounds,
) -> CoreResult<()> {
    if entity.movement == MovementStrategy::Seek {
        if let Some(target) = active.first().filter(|t| t.id != entity.id) {
            entity.axis = seek_axis(entity.center(), entity.size, target.center());
        }
    }

    let delta = match entity.movement {
        MovementStrategy::Stationary => Vec2::ZERO,
        MovementStrategy::Direct | MovementStrategy::Seek => {
            direct_delta(entity.speed, entity.axis.as_vec2())
        }
    };
    entity.pos += delta;

    update_facing(entity);

    let (center, size) = (entity.center(), entity.size);
    entity.hitboxes.recenter_all(center, size);

    let id = entity.id;
    for other in active.iter().filter(|o| o.id != id) {
        if entity.hitboxes.draw.overlaps(&other.draw)? {
            on_entity_overlap(entity, other);
        }
    }

    let defense_size = entity.hitboxes.defense.size();
    entity.pos = bounds.clamp(entity.pos, entity.size, defense_size);
    Ok(())
}
