use std::collections::BTreeMap;
use std::path::Path;

use macroquad::prelude::*;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid game config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("max_frame_dt must be a positive number of seconds, got {0}")]
    InvalidFrameDt(f32),
}

/// Session-level settings read from `config/game.yaml`. Every field is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub room_width: f32,
    pub room_height: f32,
    pub tile_size: f32,
    pub normal_rooms: usize,
    /// Upper bound on a single tick's delta time, in seconds.
    pub max_frame_dt: f32,
    /// Live bullets allowed per room; unbounded when absent.
    pub bullet_cap: Option<usize>,
    pub auto_attack: bool,
    /// Room index to Tiled JSON map path.
    pub room_maps: BTreeMap<usize, String>,
    pub prop_seed: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            room_width: 1280.0,
            room_height: 768.0,
            tile_size: 64.0,
            normal_rooms: 10,
            max_frame_dt: 0.033,
            bullet_cap: None,
            auto_attack: true,
            room_maps: BTreeMap::new(),
            prop_seed: 1337,
        }
    }
}

impl GameConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(raw)?;
        if !config.max_frame_dt.is_finite() || config.max_frame_dt <= 0.0 {
            return Err(ConfigError::InvalidFrameDt(config.max_frame_dt));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&raw)
    }

    pub fn room_size(&self) -> Vec2 {
        vec2(self.room_width, self.room_height)
    }

    /// Shop, the normal rooms, then the boss room.
    pub fn room_count(&self) -> usize {
        self.normal_rooms + 2
    }

    pub fn boss_room_index(&self) -> usize {
        self.normal_rooms + 1
    }
}
