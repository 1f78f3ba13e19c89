//! Doors: four per room, one per wall.

use bevy::math::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use crate::combat::hitbox::Hitbox;
use crate::config::{DoorGeometry, DungeonBounds};
use crate::error::CoreResult;
use crate::geometry::Rect;

/// Wall a door sits on. Indices follow 0 down, 1 left, 2 up, 3 right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DoorDirection {
    Down,
    Left,
    Up,
    Right,
}

impl DoorDirection {
    pub const ALL: [DoorDirection; 4] = [
        DoorDirection::Down,
        DoorDirection::Left,
        DoorDirection::Up,
        DoorDirection::Right,
    ];

    pub fn index(&self) -> usize {
        match self {
            DoorDirection::Down => 0,
            DoorDirection::Left => 1,
            DoorDirection::Up => 2,
            DoorDirection::Right => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Grid step taken when walking through this door
    pub fn mov(&self) -> IVec2 {
        match self {
            DoorDirection::Down => IVec2::new(0, 1),
            DoorDirection::Left => IVec2::new(-1, 0),
            DoorDirection::Up => IVec2::new(0, -1),
            DoorDirection::Right => IVec2::new(1, 0),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            DoorDirection::Down => DoorDirection::Up,
            DoorDirection::Left => DoorDirection::Right,
            DoorDirection::Up => DoorDirection::Down,
            DoorDirection::Right => DoorDirection::Left,
        }
    }

    /// Door rectangle on a dungeon screen of the given bounds
    pub fn rect(&self, bounds: &DungeonBounds, geometry: &DoorGeometry) -> Rect {
        let (span, depth, inset) = (geometry.span, geometry.depth, geometry.inset);
        let mid_x = (bounds.width / 2.0).trunc() - span / 2.0;
        let mid_y = (bounds.height / 2.0).trunc() - span / 2.0;
        match self {
            DoorDirection::Down => Rect::new(mid_x, bounds.height - depth - inset, span, depth),
            DoorDirection::Left => Rect::new(inset, mid_y, depth, span),
            DoorDirection::Up => Rect::new(mid_x, inset, span, depth),
            DoorDirection::Right => Rect::new(bounds.width - depth - inset, mid_y, depth, span),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorState {
    #[default]
    Open,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub direction: DoorDirection,
    pub rect: Rect,
    pub hitbox: Hitbox,
    /// Whether the layout actually connects this wall to a neighbour
    pub exist: bool,
    pub state: DoorState,
}

impl Door {
    pub fn mov(&self) -> IVec2 {
        self.direction.mov()
    }

    /// Direction of the paired door. It lives in the same [`DoorSet`] and in
    /// the neighbour's set on the far side of this door.
    pub fn opposite(&self) -> DoorDirection {
        self.direction.opposite()
    }

    pub fn is_passable(&self) -> bool {
        self.exist && self.state == DoorState::Open
    }
}

/// The four doors of a room, indexed by direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoorSet {
    doors: [Door; 4],
}

impl DoorSet {
    /// All four doors, none existing yet
    pub fn new(bounds: &DungeonBounds, geometry: &DoorGeometry) -> Self {
        let doors = DoorDirection::ALL.map(|direction| {
            let rect = direction.rect(bounds, geometry);
            Door {
                direction,
                rect,
                hitbox: Hitbox::rect(Vec2::new(rect.x, rect.y), rect.size(), 1.0),
                exist: false,
                state: DoorState::Open,
            }
        });
        Self { doors }
    }

    pub fn with_existing(mut self, directions: &[DoorDirection]) -> Self {
        for direction in directions {
            self.doors[direction.index()].exist = true;
        }
        self
    }

    pub fn door(&self, direction: DoorDirection) -> &Door {
        &self.doors[direction.index()]
    }

    pub fn door_mut(&mut self, direction: DoorDirection) -> &mut Door {
        &mut self.doors[direction.index()]
    }

    pub fn opposite_of(&self, direction: DoorDirection) -> &Door {
        self.door(direction.opposite())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Door> {
        self.doors.iter()
    }

    pub fn existing(&self) -> impl Iterator<Item = &Door> {
        self.doors.iter().filter(|d| d.exist)
    }

    /// First passable door overlapping `hitbox`
    pub fn door_touching(&self, hitbox: &Hitbox) -> CoreResult<Option<DoorDirection>> {
        for door in self.doors.iter().filter(|d| d.is_passable()) {
            if door.hitbox.overlaps(hitbox)? {
                return Ok(Some(door.direction));
            }
        }
        Ok(None)
    }
}
