//! Level map: the rooms of one floor, their doors and the visited set.

pub mod door;

use std::collections::{BTreeMap, BTreeSet};

use bevy::math::IVec2;
use petgraph::graphmap::UnGraphMap;
use petgraph::visit::{Bfs, Walker};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use door::{DoorDirection, DoorSet};

/// Grid coordinate of a room; x grows right, y grows down
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomKey {
    pub x: i32,
    pub y: i32,
}

impl RoomKey {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, delta: IVec2) -> Self {
        Self::new(self.x + delta.x, self.y + delta.y)
    }

    pub fn neighbour(&self, direction: DoorDirection) -> Self {
        self.offset(direction.mov())
    }

    pub fn in_grid(&self, dim: i32) -> bool {
        (0..dim).contains(&self.x) && (0..dim).contains(&self.y)
    }
}

impl std::fmt::Display for RoomKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomRole {
    Entry,
    Exit,
    Interior,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub key: RoomKey,
    pub role: RoomRole,
    pub doors: DoorSet,
    pub enemies: Vec<Entity>,
}

impl Room {
    pub fn is_cleared(&self) -> bool {
        self.enemies.is_empty()
    }
}

/// All rooms of a floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelMap {
    pub rooms: BTreeMap<RoomKey, Room>,
    pub entry: RoomKey,
    pub exit: RoomKey,
    pub dim: i32,
    pub target_rooms: usize,
    pub attempts: u32,
    pub visited: BTreeSet<RoomKey>,
}

impl LevelMap {
    pub fn room(&self, key: RoomKey) -> Option<&Room> {
        self.rooms.get(&key)
    }

    pub fn room_mut(&mut self, key: RoomKey) -> Option<&mut Room> {
        self.rooms.get_mut(&key)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn mark_visited(&mut self, key: RoomKey) {
        self.visited.insert(key);
    }

    /// Undirected view of the floor, one edge per existing door pair
    pub fn connectivity(&self) -> UnGraphMap<RoomKey, DoorDirection> {
        let mut graph = UnGraphMap::new();
        for (key, room) in &self.rooms {
            graph.add_node(*key);
            for door in room.doors.existing() {
                let neighbour = key.neighbour(door.direction);
                if self.rooms.contains_key(&neighbour) {
                    graph.add_edge(*key, neighbour, door.direction);
                }
            }
        }
        graph
    }

    /// Rooms reachable from the entry through existing doors
    pub fn reachable_from_entry(&self) -> BTreeSet<RoomKey> {
        let graph = self.connectivity();
        Bfs::new(&graph, self.entry).iter(&graph).collect()
    }

    pub fn is_connected(&self) -> bool {
        self.reachable_from_entry().len() == self.rooms.len()
    }

    /// Every existing door has a neighbour room whose opposite door exists
    pub fn doors_are_reciprocal(&self) -> bool {
        self.rooms.iter().all(|(key, room)| {
            room.doors.existing().all(|door| {
                self.rooms
                    .get(&key.neighbour(door.direction))
                    .map(|n| {
                        let back = n.doors.door(door.opposite());
                        back.exist && back.mov() == -door.mov()
                    })
                    .unwrap_or(false)
            })
        })
    }
}
