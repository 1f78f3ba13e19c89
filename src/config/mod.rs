//! Immutable game constants, loaded once before any dungeon is created.
//!
//! Everything the simulation needs from the outside world lives here: the
//! dungeon boundary, per-entity stats, per-element projectile stats, door
//! geometry and generation tuning. A [`GameConstants`] is built once and passed
//! by reference to the generator and the run loop.

pub mod session;

use std::collections::BTreeMap;
use std::path::Path;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::combat::Element;
use crate::constants::{GENERATION_MAX_ATTEMPTS, GENERATION_ROUND_RETRIES, MAX_GRID_DIMENSION};
use crate::error::{CoreError, CoreResult};
use crate::geometry::Rect;
use crate::monster::EnemyKind;

pub use session::SessionState;

/// The dungeon screen: full size plus the wall thickness on each axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DungeonBounds {
    pub width: f32,
    pub height: f32,
    pub border_x: f32,
    pub border_y: f32,
}

impl DungeonBounds {
    /// Whole dungeon screen, walls included
    pub fn outer(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    /// Walkable area
    pub fn inner(&self) -> Rect {
        Rect::new(
            self.border_x,
            self.border_y,
            self.width - 2.0 * self.border_x,
            self.height - 2.0 * self.border_y,
        )
    }

    /// Clamp an owner position so that a box of `hitbox_size` stays inside
    /// the walls. The slack `size - hitbox_size` lets the sprite overhang
    /// the wall on the top/left side.
    pub fn clamp(&self, pos: Vec2, size: Vec2, hitbox_size: Vec2) -> Vec2 {
        let x = (pos.x.max(self.border_x - (size.x - hitbox_size.x)))
            .min(self.width - self.border_x - hitbox_size.x);
        let y = (pos.y.max(self.border_y - (size.y - hitbox_size.y)))
            .min(self.height - self.border_y - hitbox_size.y);
        Vec2::new(x, y)
    }
}

/// Stats shared by the player and every enemy kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityStats {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub damage: i32,
    pub hp: i32,
    /// Ticks an attack lasts (the attack animation length)
    pub attack_cooldown: i32,
    /// Vision radius; only turrets use it
    #[serde(default)]
    pub vision: Option<f32>,
}

impl EntityStats {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Physical constants of an elemental projectile. Damage comes from the
/// attacker, not from the element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileStats {
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub lifetime: i32,
}

impl ProjectileStats {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Door sprite measurements, as drawn for the down/up doors
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorGeometry {
    /// Extent along the wall
    pub span: f32,
    /// Extent into the room
    pub depth: f32,
    /// Gap between the door and the screen edge
    pub inset: f32,
}

/// Grid side length per floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapParameters {
    /// `dimensions[0]` is floor 1; floors past the table reuse the last entry
    pub dimensions: Vec<i32>,
}

impl MapParameters {
    pub fn dimension_for_floor(&self, floor: u32) -> i32 {
        let index = (floor.max(1) - 1) as usize;
        self.dimensions
            .get(index)
            .or_else(|| self.dimensions.last())
            .copied()
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTuning {
    pub round_retries: u32,
    pub max_attempts: u32,
}

impl Default for GenerationTuning {
    fn default() -> Self {
        Self {
            round_retries: GENERATION_ROUND_RETRIES,
            max_attempts: GENERATION_MAX_ATTEMPTS,
        }
    }
}

/// All static tables the simulation reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConstants {
    pub bounds: DungeonBounds,
    pub player: EntityStats,
    pub enemies: BTreeMap<EnemyKind, EntityStats>,
    pub projectiles: BTreeMap<Element, ProjectileStats>,
    pub doors: DoorGeometry,
    pub map: MapParameters,
    #[serde(default)]
    pub generation: GenerationTuning,
}

impl Default for GameConstants {
    fn default() -> Self {
        let enemies = BTreeMap::from([
            (EnemyKind::Moco, stats(16.0, 16.0, 0.0, 3, 12, 18, Some(70.0))),
            (EnemyKind::Tostada, stats(16.0, 16.0, 1.5, 4, 15, 15, None)),
            (EnemyKind::Boca, stats(18.0, 18.0, 1.0, 6, 20, 20, None)),
            (EnemyKind::Conejo, stats(14.0, 14.0, 2.5, 3, 10, 10, None)),
            (EnemyKind::Boss, stats(32.0, 32.0, 0.0, 8, 80, 10, Some(120.0))),
        ]);
        let projectiles = BTreeMap::from([
            (Element::Air, projectile(8.0, 8.0, 4.0, 40)),
            (Element::Fire, projectile(10.0, 10.0, 3.5, 45)),
            (Element::Water, projectile(8.0, 8.0, 4.5, 35)),
            (Element::Darkness, projectile(12.0, 12.0, 3.0, 50)),
            (Element::Light, projectile(10.0, 10.0, 5.0, 40)),
        ]);
        Self {
            bounds: DungeonBounds {
                width: 272.0,
                height: 240.0,
                border_x: 16.0,
                border_y: 16.0,
            },
            player: stats(16.0, 22.0, 3.0, 5, 50, 12, None),
            enemies,
            projectiles,
            doors: DoorGeometry {
                span: 32.0,
                depth: 12.0,
                inset: 6.0,
            },
            map: MapParameters {
                dimensions: vec![3, 4, 5, 5, 6, 7],
            },
            generation: GenerationTuning::default(),
        }
    }
}

fn stats(
    width: f32,
    height: f32,
    speed: f32,
    damage: i32,
    hp: i32,
    attack_cooldown: i32,
    vision: Option<f32>,
) -> EntityStats {
    EntityStats {
        width,
        height,
        speed,
        damage,
        hp,
        attack_cooldown,
        vision,
    }
}

fn projectile(width: f32, height: f32, speed: f32, lifetime: i32) -> ProjectileStats {
    ProjectileStats {
        width,
        height,
        speed,
        lifetime,
    }
}

impl GameConstants {
    /// Load and validate a RON constants file
    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let constants = Self::from_ron(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded game constants");
        Ok(constants)
    }

    pub fn from_ron(text: &str) -> CoreResult<Self> {
        let constants: Self = ron::from_str(text)?;
        constants.validate()?;
        Ok(constants)
    }

    pub fn to_ron(&self) -> CoreResult<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Every kind and element must be present and every size positive
    pub fn validate(&self) -> CoreResult<()> {
        let b = &self.bounds;
        if b.width <= 2.0 * b.border_x || b.height <= 2.0 * b.border_y {
            return Err(CoreError::InvalidConfig(format!(
                "bounds {}x{} leave no room inside borders {}x{}",
                b.width, b.height, b.border_x, b.border_y
            )));
        }
        check_stats("player", &self.player)?;
        for kind in EnemyKind::all() {
            let stats = self.enemy(*kind)?;
            check_stats(kind.as_str(), stats)?;
            if kind.is_turret() && stats.vision.is_none() {
                return Err(CoreError::InvalidConfig(format!(
                    "{} needs a vision radius",
                    kind.as_str()
                )));
            }
        }
        for element in Element::all() {
            let stats = self.projectile(*element)?;
            if stats.width <= 0.0 || stats.height <= 0.0 || stats.lifetime <= 0 {
                return Err(CoreError::InvalidConfig(format!(
                    "projectile {} must have a positive size and lifetime",
                    element.as_str()
                )));
            }
        }
        if self.doors.span <= 0.0 || self.doors.depth <= 0.0 {
            return Err(CoreError::InvalidConfig("door size must be positive".into()));
        }
        if self.map.dimensions.is_empty() || self.map.dimensions.iter().any(|d| *d < 1) {
            return Err(CoreError::InvalidConfig(
                "map dimensions must be a non-empty list of positive sizes".into(),
            ));
        }
        if let Some(dim) = self.map.dimensions.iter().find(|d| **d > MAX_GRID_DIMENSION) {
            return Err(CoreError::InvalidConfig(format!(
                "map dimension {dim} exceeds the {MAX_GRID_DIMENSION}x{MAX_GRID_DIMENSION} grid limit"
            )));
        }
        if self.generation.max_attempts == 0 {
            return Err(CoreError::InvalidConfig(
                "generation needs at least one attempt".into(),
            ));
        }
        Ok(())
    }

    pub fn enemy(&self, kind: EnemyKind) -> CoreResult<&EntityStats> {
        self.enemies.get(&kind).ok_or_else(|| {
            CoreError::InvalidConfig(format!("missing stats for enemy {}", kind.as_str()))
        })
    }

    pub fn projectile(&self, element: Element) -> CoreResult<&ProjectileStats> {
        self.projectiles.get(&element).ok_or_else(|| {
            CoreError::InvalidConfig(format!("missing projectile stats for {}", element.as_str()))
        })
    }
}

fn check_stats(name: &str, stats: &EntityStats) -> CoreResult<()> {
    if stats.width <= 0.0 || stats.height <= 0.0 {
        return Err(CoreError::InvalidConfig(format!("{name} must have a positive size")));
    }
    if stats.hp <= 0 {
        return Err(CoreError::InvalidConfig(format!("{name} must start with hit points")));
    }
    if stats.attack_cooldown < 0 || stats.speed < 0.0 {
        return Err(CoreError::InvalidConfig(format!(
            "{name} has a negative speed or cooldown"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants_are_valid() {
        let constants = GameConstants::default();
        constants.validate().unwrap();
        assert_eq!(constants.enemies.len(), EnemyKind::all().len());
        assert_eq!(constants.projectiles.len(), Element::all().len());
    }

    #[test]
    fn test_ron_roundtrip() {
        let constants = GameConstants::default();
        let text = constants.to_ron().unwrap();
        let restored = GameConstants::from_ron(&text).unwrap();
        assert_eq!(restored, constants);
    }

    #[test]
    fn test_shipped_constants_file_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/constants.ron");
        let constants = GameConstants::load(path).unwrap();
        assert_eq!(constants, GameConstants::default());
    }

    #[test]
    fn test_missing_enemy_is_rejected() {
        let mut constants = GameConstants::default();
        constants.enemies.remove(&EnemyKind::Boca);
        assert!(matches!(
            constants.validate(),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_turret_without_vision_is_rejected() {
        let mut constants = GameConstants::default();
        if let Some(moco) = constants.enemies.get_mut(&EnemyKind::Moco) {
            moco.vision = None;
        }
        assert!(constants.validate().is_err());
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let mut constants = GameConstants::default();
        constants.map.dimensions = vec![3, MAX_GRID_DIMENSION];
        constants.validate().unwrap();

        constants.map.dimensions = vec![3, 100_000];
        assert!(matches!(
            constants.validate(),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_dimension_for_floor() {
        let map = MapParameters {
            dimensions: vec![3, 5, 7],
        };
        assert_eq!(map.dimension_for_floor(0), 3);
        assert_eq!(map.dimension_for_floor(1), 3);
        assert_eq!(map.dimension_for_floor(3), 7);
        assert_eq!(map.dimension_for_floor(40), 7);
    }

    #[test]
    fn test_clamp_keeps_hitbox_inside_walls() {
        let bounds = GameConstants::default().bounds;
        let size = Vec2::new(16.0, 22.0);
        let clamped = bounds.clamp(Vec2::new(-50.0, 900.0), size, size);
        assert_eq!(clamped, Vec2::new(16.0, 240.0 - 16.0 - 22.0));

        // narrower hitbox lets the sprite overhang the left wall
        let clamped = bounds.clamp(Vec2::new(-50.0, 100.0), size, Vec2::new(10.0, 22.0));
        assert_eq!(clamped.x, 10.0);
    }
}
