//! The level manifest: tilesets, tile classes and the list of levels.
//!
//! Paths inside a manifest are relative to the assets directory. Level
//! numbers and tile coordinates are 1-based, as in the level editor.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, ToadError};
use crate::tileset::{Color, TileRules};
use crate::world::{NpcKind, PixelPoint};

const BUILTIN: &str = include_str!("../assets/levels.toml");

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    pub name: String,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_fadeout")]
    pub music_fadeout_millis: u32,
    pub tilesets: TilesetPaths,
    pub tiles: TileRules,
    pub levels: Vec<LevelSpec>,
}

fn default_fps() -> u32 {
    60
}

fn default_fadeout() -> u32 {
    1000
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TilesetPaths {
    pub map: PathBuf,
    pub map_tile_size: u32,
    pub characters: PathBuf,
    pub character_tile_size: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LevelSpec {
    pub map: PathBuf,
    /// player start in tiles
    pub start: (i32, i32),
    /// 0xRRGGBB
    pub background: u32,
    pub music: Option<String>,
    #[serde(default)]
    pub npcs: Vec<NpcSpawn>,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct NpcSpawn {
    pub kind: NpcKind,
    pub x: i32,
    pub y: i32,
}

/// Top-left pixel of a 1-based tile coordinate.
pub fn tile_to_pixel(x: i32, y: i32, tile_size: i32) -> PixelPoint {
    PixelPoint::new((x - 1) * tile_size, (y - 1) * tile_size)
}

impl LevelSpec {
    pub fn background_color(&self) -> Color {
        Color::from_hex(self.background)
    }
    pub fn start_pixel(&self, tile_size: i32) -> PixelPoint {
        tile_to_pixel(self.start.0, self.start.1, tile_size)
    }
}

impl NpcSpawn {
    pub fn pixel(&self, tile_size: i32) -> PixelPoint {
        tile_to_pixel(self.x, self.y, tile_size)
    }
}

impl Manifest {
    pub fn from_toml_str(s: &str) -> Result<Manifest> {
        let manifest: Manifest = toml::from_str(s)?;
        manifest.validate()?;
        Ok(manifest)
    }
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
        let path = path.as_ref();
        let manifest = Self::from_toml_str(&fs::read_to_string(path)?)?;
        info!(
            "manifest {}: {} levels",
            path.display(),
            manifest.num_levels()
        );
        Ok(manifest)
    }
    /// The five levels of the original game.
    pub fn builtin() -> Result<Manifest> {
        Self::from_toml_str(BUILTIN)
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }
    /// Level `n`, counted from 1.
    pub fn level(&self, n: usize) -> Result<&LevelSpec> {
        if n == 0 {
            return Err(ToadError::Level {
                level: n,
                message: "levels are numbered from 1".to_owned(),
            });
        }
        self.levels.get(n - 1).ok_or_else(|| ToadError::Level {
            level: n,
            message: format!("there are only {} levels", self.num_levels()),
        })
    }
    /// The level after `n`; the last level wraps around to the first.
    pub fn next_level(&self, n: usize) -> usize {
        if n >= self.num_levels() {
            1
        } else {
            n + 1
        }
    }
    pub fn validate(&self) -> Result<()> {
        if self.levels.is_empty() {
            return Err(ToadError::config("manifest has no levels"));
        }
        if self.fps == 0 {
            return Err(ToadError::config("fps must be positive"));
        }
        let ts = &self.tilesets;
        if ts.map_tile_size == 0 || ts.character_tile_size == 0 {
            return Err(ToadError::config("tile sizes must be positive"));
        }
        self.tiles.validate()
    }
}
