//! tile images and tile classification
use ansi_term::Colour as TermRGB;
use ansi_term::Style;
use image::{Rgba, RgbaImage};
use rect_iter::RectRange;
use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::error::{Result, ToadError};

/// Index of a tile inside a tileset, row-major.
pub type TileId = u16;

/// we don't support alpha blending, so just rgb is enough
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0 };
    /// 0xRRGGBB
    pub fn from_hex(hex: u32) -> Color {
        Color {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
        }
    }
    fn from_rgba(rgba: &Rgba<u8>) -> Option<Color> {
        if is_trans(rgba) {
            return None;
        }
        Some(Color {
            r: rgba[0],
            g: rgba[1],
            b: rgba[2],
        })
    }
    pub fn to_rgba(&self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, u8::max_value()])
    }
    pub fn to_term(&self) -> TermRGB {
        TermRGB::RGB(self.r, self.g, self.b)
    }
}

fn is_trans(rgba: &Rgba<u8>) -> bool {
    rgba[3] == 0
}

pub type Dot = Option<Color>;

/// square tile cut out of a tileset image
#[derive(Clone)]
pub struct Tile {
    size: u32,
    /// Buffer of tile data, row-major
    inner: Vec<Dot>,
}

impl Tile {
    fn from_buf(buf: &RgbaImage, sx: u32, sy: u32, size: u32) -> Option<Tile> {
        let mut inner = vec![None; (size * size) as usize];
        for (x, y) in RectRange::zero_start(size, size)? {
            inner[(y * size + x) as usize] = Color::from_rgba(buf.get_pixel(sx + x, sy + y));
        }
        Some(Tile { size, inner })
    }
    pub fn size(&self) -> u32 {
        self.size
    }
    pub fn get(&self, x: u32, y: u32) -> Option<Dot> {
        if self.size <= x || self.size <= y {
            return None;
        }
        Some(self.inner[(y * self.size + x) as usize])
    }
    /// A tile filled with one colour.
    pub fn filled(size: u32, dot: Dot) -> Tile {
        Tile {
            size,
            inner: vec![dot; (size * size) as usize],
        }
    }
}

impl fmt::Debug for Tile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "tile: {{")?;
        for y in 0..self.size {
            for x in 0..self.size {
                match self.get(x, y).and_then(|dot| dot) {
                    Some(rgb) => write!(f, "{}", Style::new().on(rgb.to_term()).paint("  "))?,
                    None => write!(f, "  ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "}}")
    }
}

/// An image sliced into square tiles.
/// Partial tiles at the right and bottom edge are dropped.
pub struct Tileset {
    cols: u32,
    tiles: Vec<Tile>,
}

impl Tileset {
    pub fn from_image(buf: &RgbaImage, tile_size: u32) -> Result<Tileset> {
        let err = |message: String| ToadError::Tileset { message };
        if tile_size == 0 {
            return Err(err("tile size must be positive".to_owned()));
        }
        let (cols, rows) = (buf.width() / tile_size, buf.height() / tile_size);
        if cols == 0 || rows == 0 {
            return Err(err(format!(
                "image of {}x{} is smaller than one {}px tile",
                buf.width(),
                buf.height(),
                tile_size
            )));
        }
        let mut tiles = Vec::with_capacity((cols * rows) as usize);
        for row in 0..rows {
            for col in 0..cols {
                let tile = Tile::from_buf(buf, col * tile_size, row * tile_size, tile_size)
                    .ok_or_else(|| err(format!("couldn't cut tile at ({}, {})", col, row)))?;
                tiles.push(tile);
            }
        }
        debug!("tileset: {} tiles of {}px ({} columns)", tiles.len(), tile_size, cols);
        Ok(Tileset { cols, tiles })
    }
    pub fn open<P: AsRef<Path>>(path: P, tile_size: u32) -> Result<Tileset> {
        let img = image::open(path.as_ref())?.to_rgba8();
        info!("loading tileset {}", path.as_ref().display());
        Self::from_image(&img, tile_size)
    }
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id as usize)
    }
    pub fn columns(&self) -> u32 {
        self.cols
    }
    pub fn len(&self) -> usize {
        self.tiles.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// Map tileset and character tileset of one game.
pub struct Tilesets {
    pub map: Tileset,
    pub characters: Tileset,
}

/// How a map tile behaves in collisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileClass {
    /// collides on all sides
    Solid,
    /// walkable surface on top, passable from below and the sides
    TopSolid,
    NonSolid,
}

/// Classification of map tile ids.
///
/// Every id in `0..tile_count` that is neither non-solid nor top-solid is
/// solid. Empty cells, coordinates outside the map and ids beyond
/// `tile_count` are non-solid.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TileRules {
    pub tile_count: u16,
    pub non_solid: BTreeSet<TileId>,
    pub top_solid: BTreeSet<TileId>,
    #[serde(default)]
    pub icy: BTreeSet<TileId>,
    #[serde(default)]
    pub climbable: BTreeSet<TileId>,
    pub spike: Option<TileId>,
    pub open_door: Option<TileId>,
    pub locked_door: Option<TileId>,
}

impl TileRules {
    pub fn class(&self, tile: Option<TileId>) -> TileClass {
        match tile {
            Some(t) if self.top_solid.contains(&t) => TileClass::TopSolid,
            Some(t) if t < self.tile_count && !self.non_solid.contains(&t) => TileClass::Solid,
            _ => TileClass::NonSolid,
        }
    }
    pub fn is_solid(&self, tile: Option<TileId>) -> bool {
        self.class(tile) == TileClass::Solid
    }
    pub fn is_top_solid(&self, tile: Option<TileId>) -> bool {
        self.class(tile) == TileClass::TopSolid
    }
    pub fn is_non_solid(&self, tile: Option<TileId>) -> bool {
        self.class(tile) == TileClass::NonSolid
    }
    pub fn is_icy(&self, tile: Option<TileId>) -> bool {
        tile.map_or(false, |t| self.icy.contains(&t))
    }
    pub fn is_climbable(&self, tile: Option<TileId>) -> bool {
        tile.map_or(false, |t| self.climbable.contains(&t))
    }
    pub fn is_spike(&self, tile: Option<TileId>) -> bool {
        tile.is_some() && tile == self.spike
    }
    pub fn is_open_door(&self, tile: Option<TileId>) -> bool {
        tile.is_some() && tile == self.open_door
    }
    pub fn is_locked_door(&self, tile: Option<TileId>) -> bool {
        tile.is_some() && tile == self.locked_door
    }
    pub fn validate(&self) -> Result<()> {
        if self.tile_count == 0 {
            return Err(ToadError::config("tile_count must be positive"));
        }
        if let Some(t) = self.non_solid.intersection(&self.top_solid).next() {
            return Err(ToadError::config(format!(
                "tile {} is both non-solid and top-solid",
                t
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tileset_test {
    use super::*;
    use crate::testutils::{checker_image, rules};

    #[test]
    fn slices_row_major() {
        let img = checker_image(4, 2, 16);
        let tileset = Tileset::from_image(&img, 16).unwrap();
        assert_eq!(tileset.len(), 8);
        assert_eq!(tileset.columns(), 4);
        // tile 5 is column 1 of row 1
        let tile = tileset.tile(5).unwrap();
        assert_eq!(tile.get(0, 0), Some(Some(Color::from_hex(0x050505))));
        assert!(tileset.tile(8).is_none());
    }

    #[test]
    fn partial_edge_tiles_are_dropped() {
        let img = RgbaImage::new(40, 20);
        let tileset = Tileset::from_image(&img, 16).unwrap();
        assert_eq!(tileset.len(), 2);
    }

    #[test]
    fn too_small_image_is_an_error() {
        let img = RgbaImage::new(8, 8);
        assert!(Tileset::from_image(&img, 16).is_err());
        assert!(Tileset::from_image(&img, 0).is_err());
    }

    #[test]
    fn transparent_pixels_are_none() {
        let mut img = RgbaImage::new(2, 2);
        img.put_pixel(1, 1, Rgba([10, 20, 30, 255]));
        let tileset = Tileset::from_image(&img, 2).unwrap();
        let tile = tileset.tile(0).unwrap();
        assert_eq!(tile.get(0, 0), Some(None));
        assert_eq!(tile.get(1, 1), Some(Some(Color { r: 10, g: 20, b: 30 })));
        assert_eq!(tile.get(2, 0), None);
    }

    #[test]
    fn classification() {
        let rules = rules();
        assert_eq!(rules.class(Some(0)), TileClass::Solid);
        assert_eq!(rules.class(Some(3)), TileClass::TopSolid);
        assert_eq!(rules.class(Some(21)), TileClass::NonSolid);
        assert_eq!(rules.class(None), TileClass::NonSolid);
        assert_eq!(rules.class(Some(500)), TileClass::NonSolid);
        assert!(rules.is_climbable(Some(57)));
        assert!(rules.is_icy(Some(12)));
        assert!(rules.is_open_door(Some(62)));
        assert!(!rules.is_open_door(None));
        assert!(rules.is_spike(Some(132)));
    }

    #[test]
    fn overlapping_sets_are_rejected() {
        let mut rules = rules();
        rules.top_solid.insert(21);
        assert!(rules.validate().is_err());
    }

    #[test]
    fn debug_paints_with_ansi_background() {
        let c = Some(Color { r: 1, g: 2, b: 3 });
        let tile = Tile {
            size: 2,
            inner: vec![c, None, None, c],
        };
        let dot = "\x1b[48;2;1;2;3m  \x1b[0m";
        let expected = format!("tile: {{\n{0}  \n  {0}\n}}\n", dot);
        assert_eq!(format!("{:?}", tile), expected);
    }

    #[test]
    fn hex_colors() {
        assert_eq!(
            Color::from_hex(0x87CEEB),
            Color {
                r: 0x87,
                g: 0xCE,
                b: 0xEB
            }
        );
    }
}
