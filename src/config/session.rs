//! Session parameters carried between play sessions.
//!
//! The blob is grouped by subsystem (`screen`, `music`, `dungeon`, `sword`).
//! The core only reads the floor, the seed and the sword runes; every other
//! key, known or not, is written back untouched.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::DEFAULT_SESSION_SEED;
use crate::error::CoreResult;
use crate::generation::rooms::DungeonTheme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenSettings {
    #[serde(default)]
    pub pos_screen_size: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicSettings {
    #[serde(default = "default_volume")]
    pub music_vol: f32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonProgress {
    #[serde(default = "default_floor")]
    pub floor: u32,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub theme: DungeonTheme,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwordSettings {
    #[serde(default)]
    pub runes_names: Vec<String>,
    #[serde(default = "default_slots")]
    pub slots: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Everything persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub screen: ScreenSettings,
    #[serde(default)]
    pub music: MusicSettings,
    #[serde(default)]
    pub dungeon: DungeonProgress,
    #[serde(default)]
    pub sword: SwordSettings,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_volume() -> f32 {
    0.6
}

fn default_floor() -> u32 {
    1
}

fn default_seed() -> u64 {
    DEFAULT_SESSION_SEED
}

fn default_slots() -> u32 {
    3
}

impl Default for ScreenSettings {
    fn default() -> Self {
        Self {
            pos_screen_size: 0,
            extra: Map::new(),
        }
    }
}

impl Default for MusicSettings {
    fn default() -> Self {
        Self {
            music_vol: default_volume(),
            extra: Map::new(),
        }
    }
}

impl Default for DungeonProgress {
    fn default() -> Self {
        Self {
            floor: default_floor(),
            seed: default_seed(),
            theme: DungeonTheme::default(),
            extra: Map::new(),
        }
    }
}

impl Default for SwordSettings {
    fn default() -> Self {
        Self {
            runes_names: Vec::new(),
            slots: default_slots(),
            extra: Map::new(),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            screen: ScreenSettings::default(),
            music: MusicSettings::default(),
            dungeon: DungeonProgress::default(),
            sword: SwordSettings::default(),
            extra: Map::new(),
        }
    }
}

impl SessionState {
    pub fn from_json(json: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Load the session, falling back to defaults when the file does not exist
    pub fn load_or_default(path: impl AsRef<Path>) -> CoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no session file, starting fresh");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> CoreResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
