//! Hitboxes positioned relative to an owner's logical box.
//!
//! Every hitbox is re-centered on its owner each tick by the movement step.
//! Entities declare their slots up front in a [`HitboxSet`]; the movement
//! step walks that list instead of discovering hitboxes at runtime.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::geometry::{intersects, Circle, Rect, Shape};

/// A collision volume
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Hitbox {
    /// Owner box scaled by `ratio` around the owner center
    Rect { rect: Rect, ratio: f32 },
    /// Fixed radius around the owner center; radius 0 disables the hitbox
    Circle(Circle),
    /// Full-dungeon sentinel, never moves
    Bounds(Rect),
}

impl Hitbox {
    /// Rectangle hitbox for an owner at `pos` with nominal `size`
    pub fn rect(pos: Vec2, size: Vec2, ratio: f32) -> Self {
        let center = pos + size / 2.0;
        Hitbox::Rect {
            rect: Rect::centered(center, size * ratio),
            ratio,
        }
    }

    /// Circle hitbox centered on the owner box
    pub fn circle(pos: Vec2, size: Vec2, radius: f32) -> Self {
        Hitbox::Circle(Circle::new(pos + size / 2.0, radius))
    }

    /// Zero-radius circle: never overlaps anything
    pub fn disabled(pos: Vec2, size: Vec2) -> Self {
        Self::circle(pos, size, 0.0)
    }

    pub fn bounds(rect: Rect) -> Self {
        Hitbox::Bounds(rect)
    }

    /// Lock the hitbox onto the owner's current center
    pub fn recenter(&mut self, center: Vec2, size: Vec2) {
        match self {
            Hitbox::Rect { rect, ratio } => {
                *rect = Rect::centered(center, size * *ratio);
            }
            Hitbox::Circle(circle) => {
                circle.center = center;
            }
            Hitbox::Bounds(_) => {}
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            Hitbox::Rect { rect, .. } | Hitbox::Bounds(rect) => Shape::Rect(*rect),
            Hitbox::Circle(circle) => Shape::Circle(*circle),
        }
    }

    pub fn center(&self) -> Vec2 {
        match self {
            Hitbox::Rect { rect, .. } | Hitbox::Bounds(rect) => rect.center(),
            Hitbox::Circle(circle) => circle.center,
        }
    }

    /// Extent of the hitbox (diameter for circles)
    pub fn size(&self) -> Vec2 {
        match self {
            Hitbox::Rect { rect, .. } | Hitbox::Bounds(rect) => rect.size(),
            Hitbox::Circle(circle) => Vec2::splat(circle.radius * 2.0),
        }
    }

    /// Rectangle view; `None` for circles
    pub fn as_rect(&self) -> Option<&Rect> {
        match self {
            Hitbox::Rect { rect, .. } | Hitbox::Bounds(rect) => Some(rect),
            Hitbox::Circle(_) => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Hitbox::Circle(c) if c.radius <= 0.0)
    }

    pub fn overlaps(&self, other: &Hitbox) -> CoreResult<bool> {
        if self.is_disabled() || other.is_disabled() {
            return Ok(false);
        }
        intersects(&self.shape(), &other.shape())
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            Hitbox::Rect { rect, .. } | Hitbox::Bounds(rect) => rect.contains_point(point),
            Hitbox::Circle(circle) => circle.center.distance(point) <= circle.radius,
        }
    }
}

/// Named hitbox slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitboxSlot {
    Draw,
    Attack,
    Defense,
    Vision,
    Door,
}

/// The hitboxes an entity owns, declared at construction time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitboxSet {
    pub draw: Hitbox,
    pub attack: Hitbox,
    pub defense: Hitbox,
    pub vision: Option<Hitbox>,
    pub door: Option<Hitbox>,
}

impl HitboxSet {
    /// Draw, attack and defense boxes matching the owner box
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            draw: Hitbox::rect(pos, size, 1.0),
            attack: Hitbox::rect(pos, size, 1.0),
            defense: Hitbox::rect(pos, size, 1.0),
            vision: None,
            door: None,
        }
    }

    pub fn with_defense(mut self, defense: Hitbox) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_vision(mut self, vision: Hitbox) -> Self {
        self.vision = Some(vision);
        self
    }

    pub fn with_door(mut self, door: Hitbox) -> Self {
        self.door = Some(door);
        self
    }

    pub fn get(&self, slot: HitboxSlot) -> Option<&Hitbox> {
        match slot {
            HitboxSlot::Draw => Some(&self.draw),
            HitboxSlot::Attack => Some(&self.attack),
            HitboxSlot::Defense => Some(&self.defense),
            HitboxSlot::Vision => self.vision.as_ref(),
            HitboxSlot::Door => self.door.as_ref(),
        }
    }

    /// Every present slot, in declaration order
    pub fn slots_mut(&mut self) -> impl Iterator<Item = (HitboxSlot, &mut Hitbox)> {
        [
            (HitboxSlot::Draw, Some(&mut self.draw)),
            (HitboxSlot::Attack, Some(&mut self.attack)),
            (HitboxSlot::Defense, Some(&mut self.defense)),
            (HitboxSlot::Vision, self.vision.as_mut()),
            (HitboxSlot::Door, self.door.as_mut()),
        ]
        .into_iter()
        .filter_map(|(slot, hitbox)| hitbox.map(|h| (slot, h)))
    }

    pub fn recenter_all(&mut self, center: Vec2, size: Vec2) {
        for (_, hitbox) in self.slots_mut() {
            hitbox.recenter(center, size);
        }
    }
}
