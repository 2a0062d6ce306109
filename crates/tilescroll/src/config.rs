use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};
use tiles::TileGridConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub tile_width: f32,
    pub tile_height: f32,
    pub screen_width: f32,
    pub screen_height: f32,
    /// World size in tiles.
    pub world_columns: u32,
    pub world_rows: u32,
    pub frames: u32,
    /// Screen pixels panned per frame.
    pub pan_speed: f32,
    pub renderer: TileGridConfig,
    pub decor: TileGridConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tile_width: 32.0,
            tile_height: 32.0,
            screen_width: 1280.0,
            screen_height: 720.0,
            world_columns: 200,
            world_rows: 200,
            frames: 240,
            pan_speed: 6.0,
            renderer: TileGridConfig::default().with_debug(true),
            decor: TileGridConfig::container().with_shrink(true),
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("open session config '{}'", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse session config '{}'", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.world_columns > 0 && self.world_rows > 0,
            "world must be at least one tile wide and tall"
        );
        ensure!(
            self.pan_speed.is_finite(),
            "pan_speed must be finite, got {}",
            self.pan_speed
        );
        Ok(())
    }

    pub fn world_size(&self) -> (f32, f32) {
        (
            self.world_columns as f32 * self.tile_width,
            self.world_rows as f32 * self.tile_height,
        )
    }
}
