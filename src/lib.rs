//! Dungeon Crawler - Procedural Core Library
//!
//! Deterministic game logic for a top-down dungeon crawler:
//! - Procedural dungeon generation (room tree growth, bounded retries)
//! - Room content per dungeon theme
//! - Per-tick entity simulation (movement, attack timing, projectiles)
//! - Collision on rectangle and circle hitboxes
//! - Run orchestration (room transitions, victory/defeat) with a bevy plugin
//! - RON game constants and JSON session state

pub mod combat;
pub mod config;
pub mod constants;
pub mod dungeon;
pub mod entity;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod logging;
pub mod monster;
pub mod movement;
pub mod player;
pub mod run;

pub use config::{GameConstants, SessionState};
pub use error::{CoreError, CoreResult};
pub use player::PlayerIntent;
pub use run::{DungeonRun, RunEvent, RunOutcome, TickReport};
