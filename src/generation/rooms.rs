//! Room content mapping: which enemies stand in which room.
//!
//! Each dungeon theme provides a boss placement for the exit room and a
//! catalog of hand-authored layouts for interior rooms. The entry room is
//! always empty.

use bevy::math::Vec2;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::Element;
use crate::config::GameConstants;
use crate::dungeon::RoomRole;
use crate::entity::Entity;
use crate::error::CoreResult;
use crate::monster::{spawn_enemy, EnemyKind};

/// One enemy of a hand-authored layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyPlacement {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub element: Element,
}

const fn place(kind: EnemyKind, x: f32, y: f32, element: Element) -> EnemyPlacement {
    EnemyPlacement {
        kind,
        pos: Vec2::new(x, y),
        element,
    }
}

/// Hands out entity ids; the player owns id 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new(first: u32) -> Self {
        Self { next: first }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

pub trait RoomMapper {
    /// Fixed encounter of the exit room
    fn boss_layout(&self) -> &[EnemyPlacement];

    /// Interior layouts, one picked uniformly per room
    fn catalog(&self) -> &[&[EnemyPlacement]];

    /// Enemies for a room of the given role. An empty catalog yields an
    /// empty room.
    fn populate(
        &self,
        role: RoomRole,
        rng: &mut dyn rand::RngCore,
        constants: &GameConstants,
        ids: &mut IdAllocator,
    ) -> CoreResult<Vec<Entity>> {
        let layout: &[EnemyPlacement] = match role {
            RoomRole::Entry => &[],
            RoomRole::Exit => self.boss_layout(),
            RoomRole::Interior => self.catalog().choose(rng).copied().unwrap_or(&[]),
        };
        layout
            .iter()
            .map(|p| spawn_enemy(ids.next_id(), p.kind, p.pos, p.element, constants))
            .collect()
    }
}

/// Dungeon themes shipped with the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DungeonTheme {
    #[default]
    Tutorial,
}

impl DungeonTheme {
    pub fn mapper(&self) -> &'static dyn RoomMapper {
        match self {
            DungeonTheme::Tutorial => &TutorialMapper,
        }
    }
}

/// The tutorial dungeon: a light boss and five interior layouts
pub struct TutorialMapper;

const TUTORIAL_BOSS: &[EnemyPlacement] = &[place(EnemyKind::Boss, 60.0, 20.0, Element::Light)];

const TUTORIAL_ROOMS: &[&[EnemyPlacement]] = &[
    &[
        place(EnemyKind::Tostada, 60.0, 20.0, Element::Water),
        place(EnemyKind::Moco, 200.0, 90.0, Element::Fire),
    ],
    &[
        place(EnemyKind::Conejo, 200.0, 90.0, Element::Water),
        place(EnemyKind::Moco, 90.0, 90.0, Element::Darkness),
    ],
    &[
        place(EnemyKind::Boca, 30.0, 30.0, Element::Light),
        place(EnemyKind::Conejo, 200.0, 200.0, Element::Water),
    ],
    &[
        place(EnemyKind::Moco, 150.0, 150.0, Element::Air),
        place(EnemyKind::Conejo, 200.0, 200.0, Element::Darkness),
    ],
    &[
        place(EnemyKind::Conejo, 30.0, 30.0, Element::Light),
        place(EnemyKind::Boca, 30.0, 200.0, Element::Air),
        place(EnemyKind::Tostada, 150.0, 150.0, Element::Air),
    ],
];

impl RoomMapper for TutorialMapper {
    fn boss_layout(&self) -> &[EnemyPlacement] {
        TUTORIAL_BOSS
    }

    fn catalog(&self) -> &[&[EnemyPlacement]] {
        TUTORIAL_ROOMS
    }
}

/// Fills the room with a given role, drawing layouts from `rng`
pub fn populate_room<R: Rng>(
    theme: DungeonTheme,
    role: RoomRole,
    rng: &mut R,
    constants: &GameConstants,
    ids: &mut IdAllocator,
) -> CoreResult<Vec<Entity>> {
    theme.mapper().populate(role, rng, constants, ids)
}
