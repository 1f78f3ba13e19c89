//! Combat primitives shared by attacks and projectiles.

use serde::{Deserialize, Serialize};

pub mod attack;
pub mod hitbox;
pub mod projectile;

/// Magic element of a sword rune, projectile or enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Element {
    #[default]
    Air,
    Fire,
    Water,
    Darkness,
    Light,
}

impl Element {
    pub fn all() -> &'static [Element] {
        &[
            Element::Air,
            Element::Fire,
            Element::Water,
            Element::Darkness,
            Element::Light,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Air => "air",
            Element::Fire => "fire",
            Element::Water => "water",
            Element::Darkness => "darkness",
            Element::Light => "light",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|e| e.as_str().eq_ignore_ascii_case(name))
    }
}

/// Which side an entity or projectile fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn opposing(&self) -> Self {
        match self {
            Faction::Player => Faction::Enemy,
            Faction::Enemy => Faction::Player,
        }
    }
}

/// Hit points, never below zero nor above max
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Apply damage once; returns the amount actually removed
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let actual = amount.clamp(0, self.current);
        self.current -= actual;
        actual
    }

    pub fn fraction(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        self.current as f32 / self.max as f32
    }
}
