//! Centralized tuning numbers for the dungeon core.
//!
//! Per-entity stats (speed, damage, cooldowns) live in the constants file
//! loaded by [`crate::config::GameConstants`]; these are the rules of the
//! run loop and the generator.

// =====================================================
// Run loop
// =====================================================

/// Ticks the player must spend in a room before a door can be crossed again
pub const DOOR_CROSSING_COOLDOWN_TICKS: u32 = 30;

/// Ticks of black-out after a room transition (input is ignored meanwhile)
pub const ROOM_TRANSITION_TICKS: u32 = 4;

/// Entity id reserved for the player
pub const PLAYER_ENTITY_ID: u32 = 0;

/// Lifetime of the invisible projectile a melee attack leaves behind
pub const MELEE_PROJECTILE_LIFETIME: i32 = 1;

/// Extra ticks turrets wait between two shots
pub const TURRET_COOLDOWN_BONUS: i32 = 20;

// =====================================================
// Procedural Generation
// =====================================================

/// Times a frontier round is re-rolled when it produces too few rooms
pub const GENERATION_ROUND_RETRIES: u32 = 10;

/// Full restarts allowed before generation gives up
pub const GENERATION_MAX_ATTEMPTS: u32 = 64;

/// Largest grid side the generator accepts
pub const MAX_GRID_DIMENSION: i32 = 64;

/// Seed used when the session does not carry one
pub const DEFAULT_SESSION_SEED: u64 = 42;
