//! Shape primitives and intersection tests.
//!
//! Screen coordinates: x grows right, y grows down. Rectangles are stored as
//! left/top/width/height.

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Axis-aligned rectangle (left, top, width, height)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    /// Rectangle of the given size centered on `center`
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(
            center.x - size.x / 2.0,
            center.y - size.y / 2.0,
            size.x,
            size.y,
        )
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Standard AABB overlap; rectangles sharing only an edge do not overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Inclusive point containment
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Anything a hitbox can be shaped as
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Rect(_) => "rectangle",
            Shape::Circle(_) => "circle",
        }
    }
}

/// Intersection test between two shapes.
///
/// Circle vs circle has no implementation and fails instead of guessing.
pub fn intersects(a: &Shape, b: &Shape) -> CoreResult<bool> {
    match (a, b) {
        (Shape::Rect(r1), Shape::Rect(r2)) => Ok(r1.overlaps(r2)),
        (Shape::Rect(r), Shape::Circle(c)) | (Shape::Circle(c), Shape::Rect(r)) => {
            Ok(rect_circle_bounds_overlap(r, c))
        }
        (Shape::Circle(_), Shape::Circle(_)) => {
            Err(CoreError::UnsupportedCollision("circle", "circle"))
        }
    }
}

/// Bounding-box reject between a rectangle and a circle.
///
/// The rectangle side only spans half its width/height from the top-left
/// corner. Gameplay ranges (enemy vision) are tuned against this looser box,
/// so it must stay as is.
pub fn rect_circle_bounds_overlap(rect: &Rect, circle: &Circle) -> bool {
    let r_left = rect.x;
    let r_top = rect.y;
    let r_right = rect.x + rect.w / 2.0;
    let r_bottom = rect.y + rect.h / 2.0;

    let c_left = circle.center.x - circle.radius;
    let c_top = circle.center.y - circle.radius;
    let c_right = circle.center.x + circle.radius;
    let c_bottom = circle.center.y + circle.radius;

    !(r_right < c_left || r_left > c_right || r_bottom < c_top || r_top > c_bottom)
}
