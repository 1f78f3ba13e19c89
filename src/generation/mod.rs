pub mod graph;
pub mod rooms;
pub mod survey;

use std::collections::{BTreeMap, BTreeSet};

use bevy::prelude::Resource;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::info;

use crate::config::GameConstants;
use crate::constants::{DEFAULT_SESSION_SEED, PLAYER_ENTITY_ID};
use crate::dungeon::door::DoorSet;
use crate::dungeon::{LevelMap, Room, RoomKey, RoomRole};
use crate::error::CoreResult;
use graph::{generate_layout, DungeonLayout};
use rooms::{DungeonTheme, IdAllocator};

/// Session seed - the root of all procedural generation.
/// A floor is fully determined by this seed and the floor number.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonSeed {
    pub seed: u64,
}

impl Default for DungeonSeed {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SESSION_SEED,
        }
    }
}

impl DungeonSeed {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Deterministic floor hash from session seed and floor number
    pub fn floor_hash(&self, floor: u32) -> u64 {
        let mut hasher = Sha3_256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(floor.to_le_bytes());
        let result = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&result[0..8]);
        u64::from_le_bytes(bytes)
    }

    /// Generator for everything random on a floor: layout first, then room
    /// content in key order
    pub fn floor_rng(&self, floor: u32) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(self.floor_hash(floor))
    }
}

/// Role of a room in the layout. The exit wins when it coincides with the
/// entry, which only happens on a one-room floor.
pub fn room_role(layout: &DungeonLayout, key: RoomKey) -> RoomRole {
    if key == layout.exit {
        RoomRole::Exit
    } else if key == layout.entry {
        RoomRole::Entry
    } else {
        RoomRole::Interior
    }
}

/// Turn a door layout into a populated level
pub fn finalize_level<R: rand::Rng>(
    layout: DungeonLayout,
    theme: DungeonTheme,
    constants: &GameConstants,
    rng: &mut R,
) -> CoreResult<LevelMap> {
    let mut ids = IdAllocator::new(PLAYER_ENTITY_ID + 1);
    let mut rooms = BTreeMap::new();
    for (key, directions) in &layout.doors {
        let role = room_role(&layout, *key);
        let enemies = rooms::populate_room(theme, role, rng, constants, &mut ids)?;
        let doors = DoorSet::new(&constants.bounds, &constants.doors).with_existing(directions);
        rooms.insert(
            *key,
            Room {
                key: *key,
                role,
                doors,
                enemies,
            },
        );
    }

    Ok(LevelMap {
        rooms,
        entry: layout.entry,
        exit: layout.exit,
        dim: layout.dim,
        target_rooms: layout.target_rooms,
        attempts: layout.attempts,
        visited: BTreeSet::from([layout.entry]),
    })
}

/// Generate and populate the given floor
pub fn build_level(
    seed: &DungeonSeed,
    floor: u32,
    theme: DungeonTheme,
    constants: &GameConstants,
) -> CoreResult<LevelMap> {
    let dim = constants.map.dimension_for_floor(floor);
    let mut rng = seed.floor_rng(floor);
    let layout = generate_layout(dim, &constants.generation, &mut rng)?;
    let level = finalize_level(layout, theme, constants, &mut rng)?;

    info!(
        seed = seed.seed,
        floor,
        dim,
        rooms = level.room_count(),
        target = level.target_rooms,
        attempts = level.attempts,
        entry = %level.entry,
        exit = %level.exit,
        "dungeon generated"
    );
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;
    use crate::monster::EnemyKind;

    #[test]
    fn test_deterministic_hash() {
        let seed = DungeonSeed::new(12345);
        assert_eq!(
            seed.floor_hash(1),
            seed.floor_hash(1),
            "Same seed+floor must produce same hash"
        );
    }

    #[test]
    fn test_different_floors_differ() {
        let seed = DungeonSeed::new(12345);
        assert_ne!(
            seed.floor_hash(1),
            seed.floor_hash(2),
            "Different floors must produce different hashes"
        );
    }

    #[test]
    fn test_build_level_is_reproducible() {
        let constants = GameConstants::default();
        let seed = DungeonSeed::default();
        let a = build_level(&seed, 3, DungeonTheme::Tutorial, &constants).unwrap();
        let b = build_level(&seed, 3, DungeonTheme::Tutorial, &constants).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_level_roles_and_content() {
        let constants = GameConstants::default();
        for s in 0..20 {
            let level =
                build_level(&DungeonSeed::new(s), 2, DungeonTheme::Tutorial, &constants).unwrap();
            assert_eq!(level.dim, 4);
            assert!(level.is_connected());
            assert!(level.doors_are_reciprocal());
            assert_eq!(level.visited, BTreeSet::from([level.entry]));

            let entry = level.room(level.entry).unwrap();
            assert_eq!(entry.role, RoomRole::Entry);
            assert!(entry.enemies.is_empty());

            let exit = level.room(level.exit).unwrap();
            assert_eq!(exit.role, RoomRole::Exit);
            assert_eq!(exit.enemies.len(), 1);
            assert_eq!(exit.enemies[0].kind, EntityKind::Enemy(EnemyKind::Boss));

            let ids: Vec<u32> = level
                .rooms
                .values()
                .flat_map(|r| r.enemies.iter().map(|e| e.id))
                .collect();
            let unique: BTreeSet<u32> = ids.iter().copied().collect();
            assert_eq!(ids.len(), unique.len());
            assert!(!unique.contains(&PLAYER_ENTITY_ID));
        }
    }

    #[test]
    fn test_single_room_floor_is_the_exit() {
        let mut constants = GameConstants::default();
        constants.map.dimensions = vec![1];
        let level = build_level(&DungeonSeed::new(9), 1, DungeonTheme::Tutorial, &constants).unwrap();
        assert_eq!(level.room_count(), 1);
        assert_eq!(level.entry, RoomKey::new(0, 0));
        assert_eq!(level.entry, level.exit);
        assert_eq!(level.room(level.exit).unwrap().role, RoomRole::Exit);
    }
}
