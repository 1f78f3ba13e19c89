//! Player character: sword, intent, defense shaping and projectile anchor.

use bevy::math::{IVec2, Vec2};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::combat::attack::AttackStrategy;
use crate::combat::hitbox::Hitbox;
use crate::combat::Element;
use crate::config::session::SwordSettings;
use crate::config::GameConstants;
use crate::constants::PLAYER_ENTITY_ID;
use crate::entity::{Entity, EntityKind, ProjectileAnchor};
use crate::error::{CoreError, CoreResult};
use crate::geometry::Rect;
use crate::movement::MovementStrategy;

/// Player input for one tick
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerIntent {
    pub axis: IVec2,
    pub attack: bool,
}

impl PlayerIntent {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn walk(axis: IVec2) -> Self {
        Self {
            axis,
            attack: false,
        }
    }

    pub fn attack() -> Self {
        Self {
            axis: IVec2::ZERO,
            attack: true,
        }
    }
}

/// The player's sword. One rune may name an element; the other runes are
/// effect runes carried by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sword {
    pub runes: Vec<String>,
    pub slots: u32,
    pub element: Element,
    pub effects: Vec<String>,
}

impl Sword {
    pub fn from_runes(runes: &[String], slots: u32) -> CoreResult<Self> {
        let runes: Vec<String> = runes
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if runes.len() > slots as usize {
            return Err(CoreError::InvalidArgument(format!(
                "{} runes do not fit in {} slots",
                runes.len(),
                slots
            )));
        }

        let elements: Vec<Element> = runes.iter().filter_map(|r| Element::from_name(r)).collect();
        let element = match elements.as_slice() {
            [] => Element::default(),
            [one] => *one,
            _ => {
                return Err(CoreError::InvalidArgument(format!(
                    "a sword holds a single element rune, got {}",
                    elements.len()
                )))
            }
        };

        let effects = if slots > 1 {
            runes
                .iter()
                .filter(|r| Element::from_name(r).is_none())
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        Ok(Self {
            runes,
            slots,
            element,
            effects,
        })
    }

    pub fn from_settings(settings: &SwordSettings) -> CoreResult<Self> {
        Self::from_runes(&settings.runes_names, settings.slots)
    }
}

impl Default for Sword {
    fn default() -> Self {
        Self {
            runes: Vec::new(),
            slots: 3,
            element: Element::default(),
            effects: Vec::new(),
        }
    }
}

fn cardinal_error(mov_axis: IVec2) -> CoreError {
    CoreError::InvalidArgument(format!(
        "facing ({}, {}) is not a cardinal direction",
        mov_axis.x, mov_axis.y
    ))
}

/// Defense box of the player body for a given facing. The sprite leaves
/// empty margins that depend on the direction it faces.
pub fn shaped_defense(pos: Vec2, size: Vec2, mov_axis: IVec2) -> CoreResult<Rect> {
    let extra_w = size.x / 5.0 - 2.0;
    let extra_h = size.y / 5.0 - 1.0;

    let (x, y, w, h) = match (mov_axis.x, mov_axis.y) {
        (0, 1) => (pos.x + 2.0, pos.y, size.x - 3.0, size.y.trunc()),
        (0, -1) => (pos.x + 2.0, pos.y, size.x - 3.0, size.y),
        (1, 0) => (pos.x, pos.y, (size.x / 2.0).trunc() - 1.0, size.y),
        (-1, 0) => {
            let w = (size.x * 2.0 / 3.0).trunc() - 1.0;
            (pos.x + (size.x - w) - 2.0, pos.y + 1.0, w, size.y)
        }
        _ => return Err(cardinal_error(mov_axis)),
    };
    Ok(Rect::new(x + extra_w, y + extra_h, w - extra_w, h - extra_h))
}

/// Spawn point of a player projectile of `proj_size`, in front of the sword
pub fn facing_projectile_origin(
    pos: Vec2,
    mov_axis: IVec2,
    first_attack: bool,
    defense_size: Vec2,
    proj_size: Vec2,
) -> CoreResult<Vec2> {
    let chest = pos.y + 0.75 * defense_size.y - proj_size.y;
    match (mov_axis.x, mov_axis.y) {
        (1, 0) => {
            let reach = if first_attack { 1.0 } else { 2.0 };
            Ok(Vec2::new(pos.x + defense_size.x - reach * proj_size.x, chest))
        }
        (-1, 0) => {
            let x = if first_attack {
                pos.x - proj_size.x
            } else {
                pos.x + proj_size.x
            };
            Ok(Vec2::new(x, chest))
        }
        (0, 1) => Ok(Vec2::new(
            pos.x + defense_size.x - proj_size.x,
            pos.y + defense_size.y,
        )),
        (0, -1) => Ok(Vec2::new(pos.x, pos.y + proj_size.y)),
        _ => Err(cardinal_error(mov_axis)),
    }
}

/// Build the player near the bottom-right corner of the room
pub fn spawn_player(sword: &Sword, constants: &GameConstants) -> CoreResult<Entity> {
    let stats = &constants.player;
    let pos = Vec2::new(
        constants.bounds.width - 100.0,
        constants.bounds.height - 100.0,
    );
    let mut player = Entity::new(
        PLAYER_ENTITY_ID,
        EntityKind::Player,
        pos,
        stats,
        MovementStrategy::Direct,
        AttackStrategy::AxisProjectile,
        ProjectileAnchor::Facing,
    )
    .with_element(sword.element);

    let defense = shaped_defense(pos, player.size, player.mov_axis)?;
    player.hitboxes = player
        .hitboxes
        .with_defense(Hitbox::Rect {
            rect: defense,
            ratio: 1.0,
        })
        .with_door(Hitbox::rect(pos, player.size, 1.0));
    Ok(player)
}

/// Apply one tick of input. Attacks only start once the previous one has
/// fully cooled down.
pub fn apply_intent(player: &mut Entity, intent: PlayerIntent) {
    let axis = intent.axis.clamp(IVec2::NEG_ONE, IVec2::ONE);
    if axis != IVec2::ZERO {
        player.axis = axis;
        player.moving = true;
    }
    if intent.attack && player.attack_cooldown <= 0 {
        player.start_attack();
    }
}
