use image::{Rgba, RgbaImage};

use crate::level::Manifest;
use crate::tileset::TileRules;
use crate::world::TileMap;

pub(crate) fn rules() -> TileRules {
    Manifest::builtin().unwrap().tiles
}

/// An image of `cols` x `rows` tiles, tile `n` filled with grey `0x010101 * n`.
pub(crate) fn checker_image(cols: u32, rows: u32, size: u32) -> RgbaImage {
    RgbaImage::from_fn(cols * size, rows * size, |x, y| {
        let n = ((y / size) * cols + x / size) as u8;
        Rgba([n, n, n, 255])
    })
}

/// A 16px map drawn with characters:
/// `.` empty, `#` solid, `=` top-solid, `~` ice, `L` ladder, `D` open door,
/// `d` locked door, `^` spike.
pub(crate) fn map_from(lines: &[&str]) -> TileMap {
    let rows = lines
        .iter()
        .map(|line| {
            line.chars()
                .map(|c| match c {
                    '#' => 0,
                    '=' => 3,
                    '~' => 12,
                    'L' => 57,
                    'D' => 62,
                    'd' => 80,
                    '^' => 132,
                    _ => -1,
                })
                .collect()
        })
        .collect();
    TileMap::from_rows(rows, 16, rules()).unwrap()
}
