//! Randomized growth of the room tree.
//!
//! The entry sits in the middle of one grid edge. Rooms grow breadth-first:
//! each frontier room opens a random subset of its free walls and every door
//! it opens creates the neighbour with the reciprocal door. A round that
//! produces too few rooms is rerun on the same frontier; a run that stalls
//! far from the target room count starts over.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::GenerationTuning;
use crate::constants::MAX_GRID_DIMENSION;
use crate::dungeon::door::DoorDirection;
use crate::dungeon::RoomKey;
use crate::error::{CoreError, CoreResult};

/// Door layout of a floor, before rooms are populated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DungeonLayout {
    pub doors: BTreeMap<RoomKey, Vec<DoorDirection>>,
    pub entry: RoomKey,
    pub exit: RoomKey,
    pub dim: i32,
    pub target_rooms: usize,
    pub attempts: u32,
}

impl DungeonLayout {
    pub fn room_count(&self) -> usize {
        self.doors.len()
    }
}

/// Middle of the grid edge on the given side
pub fn entry_key(side: DoorDirection, dim: i32) -> RoomKey {
    let mid = (dim - 1) / 2;
    match side {
        DoorDirection::Down => RoomKey::new(mid, dim - 1),
        DoorDirection::Left => RoomKey::new(0, mid),
        DoorDirection::Up => RoomKey::new(mid, 0),
        DoorDirection::Right => RoomKey::new(dim - 1, mid),
    }
}

/// Room count the generator aims for: `dim + random(1 ..= dim²/5 + 1)`.
/// `dim` must lie in `1..=MAX_GRID_DIMENSION`.
pub fn draw_target<R: Rng + ?Sized>(dim: i32, rng: &mut R) -> usize {
    let extra = rng.gen_range(1..=(dim * dim / 5 + 1));
    (dim + extra) as usize
}

/// Largest target [`draw_target`] can produce
pub fn max_target(dim: i32) -> usize {
    let dim = dim.max(0) as usize;
    dim + dim * dim / 5 + 1
}

struct Growth<'a, R: Rng + ?Sized> {
    dim: i32,
    target: usize,
    doors: BTreeMap<RoomKey, Vec<DoorDirection>>,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Growth<'_, R> {
    fn reached_target(&self) -> bool {
        self.doors.len() >= self.target
    }

    /// In-grid walls of `key` whose neighbour is not claimed yet
    fn free_walls(&self, key: RoomKey) -> Vec<DoorDirection> {
        [
            DoorDirection::Left,
            DoorDirection::Right,
            DoorDirection::Up,
            DoorDirection::Down,
        ]
        .into_iter()
        .filter(|dir| {
            let n = key.neighbour(*dir);
            n.in_grid(self.dim) && !self.doors.contains_key(&n)
        })
        .collect()
    }

    /// Open a random subset of the free walls of `key`; returns the new rooms
    fn choose_doors(&mut self, key: RoomKey) -> Vec<RoomKey> {
        let free = self.free_walls(key);
        if free.is_empty() {
            return Vec::new();
        }
        let count = self.rng.gen_range(0..=free.len());
        let chosen: Vec<DoorDirection> = free.choose_multiple(&mut *self.rng, count).copied().collect();

        let mut created = Vec::new();
        for dir in chosen {
            if self.reached_target() {
                break;
            }
            let neighbour = key.neighbour(dir);
            self.doors.entry(key).or_default().push(dir);
            self.doors.insert(neighbour, vec![dir.opposite()]);
            created.push(neighbour);
        }
        created
    }

    /// One breadth-first round over the frontier
    fn room_loop(&mut self, frontier: &[RoomKey]) -> Vec<RoomKey> {
        let mut next = Vec::new();
        for key in frontier {
            next.extend(self.choose_doors(*key));
        }
        next
    }
}

/// Outcome of a single growth attempt
enum Attempt {
    Done {
        doors: BTreeMap<RoomKey, Vec<DoorDirection>>,
        entry: RoomKey,
        exit: RoomKey,
    },
    Stalled {
        rooms: usize,
    },
}

fn grow<R: Rng + ?Sized>(dim: i32, target: usize, round_retries: u32, rng: &mut R) -> Attempt {
    let side = DoorDirection::ALL[rng.gen_range(0..4)];
    let entry = entry_key(side, dim);
    let mut growth = Growth {
        dim,
        target,
        doors: BTreeMap::from([(entry, Vec::new())]),
        rng,
    };

    let mut frontier = growth.choose_doors(entry);
    let mut newest = frontier.clone();
    let mut round = 0u32;

    loop {
        if growth.reached_target() {
            break;
        }
        round += 1;
        let mut next = growth.room_loop(&frontier);
        let mut retries = 0u32;
        let mut stalled = false;
        while !growth.reached_target() && next.len() <= growth.rng.gen_range(0..=1) {
            if retries >= round_retries {
                stalled = true;
                break;
            }
            next.extend(growth.room_loop(&frontier));
            retries += 1;
        }
        debug!(
            round,
            retries,
            new_rooms = next.len(),
            rooms = growth.doors.len(),
            target,
            "generation round"
        );
        if !next.is_empty() {
            newest = next.clone();
        }
        if stalled {
            if target.saturating_sub(growth.doors.len()) > 1 {
                return Attempt::Stalled {
                    rooms: growth.doors.len(),
                };
            }
            break;
        }
        frontier = next;
    }

    let exit = newest.choose(&mut *growth.rng).copied().unwrap_or(entry);
    Attempt::Done {
        doors: growth.doors,
        entry,
        exit,
    }
}

/// Generate a connected layout on a `dim`×`dim` grid
pub fn generate_layout<R: Rng + ?Sized>(
    dim: i32,
    tuning: &GenerationTuning,
    rng: &mut R,
) -> CoreResult<DungeonLayout> {
    if !(1..=MAX_GRID_DIMENSION).contains(&dim) {
        return Err(CoreError::InvalidArgument(format!(
            "grid dimension must be within 1..={MAX_GRID_DIMENSION}, got {dim}"
        )));
    }
    let target = draw_target(dim, rng);

    for attempt in 1..=tuning.max_attempts {
        match grow(dim, target, tuning.round_retries, rng) {
            Attempt::Done { doors, entry, exit } => {
                return Ok(DungeonLayout {
                    doors,
                    entry,
                    exit,
                    dim,
                    target_rooms: target,
                    attempts: attempt,
                });
            }
            Attempt::Stalled { rooms } => {
                warn!(attempt, rooms, target, dim, "generation stalled, restarting");
            }
        }
    }
    Err(CoreError::GenerationFailed {
        attempts: tuning.max_attempts,
        target_rooms: target,
        dim,
    })
}
