//! software frame buffer
use image::RgbaImage;
use rect_iter::RectRange;
use std::cmp;

use crate::tileset::{Color, Tile};
use crate::world::PixelPoint;

/// The frame the game draws into. One buffer pixel is one game pixel;
/// scaling to the window happens on the GPU.
pub struct Screen {
    buf: RgbaImage,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Screen {
        Screen {
            buf: RgbaImage::new(width, height),
        }
    }
    pub fn width(&self) -> i32 {
        self.buf.width() as i32
    }
    pub fn height(&self) -> i32 {
        self.buf.height() as i32
    }
    pub fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba();
        self.buf.pixels_mut().for_each(|p| *p = rgba);
    }
    /// Draw `tile` with its upper left corner at `p`.
    /// Transparent dots keep what's below; the part outside the screen is cut.
    pub fn blit(&mut self, tile: &Tile, p: PixelPoint) {
        let size = tile.size() as i32;
        let (lx, ly) = (cmp::max(p.x, 0), cmp::max(p.y, 0));
        let ux = cmp::min(p.x + size, self.width());
        let uy = cmp::min(p.y + size, self.height());
        let range = match RectRange::new(lx, ly, ux, uy) {
            Some(r) => r,
            None => return,
        };
        for (x, y) in range {
            if let Some(Some(color)) = tile.get((x - p.x) as u32, (y - p.y) as u32) {
                self.buf.put_pixel(x as u32, y as u32, color.to_rgba());
            }
        }
    }
    pub fn buf(&self) -> &RgbaImage {
        &self.buf
    }
}
