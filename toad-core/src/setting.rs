//! window and main loop setting
#[cfg(feature = "window")]
use opengl_graphics::OpenGL;
use tuple_map::*;

/// application setting(builder)
#[derive(Clone, Debug)]
pub struct ToadSetting {
    pub(crate) title: String,
    /// screen size in map tiles
    pub(crate) screen_tiles: (u32, u32),
    pub(crate) tile_size: u32,
    pub(crate) max_fps: u64,
    pub(crate) ups: u64,
    /// window pixels per buffer pixel
    pub(crate) scale: f64,
    #[cfg(feature = "window")]
    pub(crate) opengl: OpenGL,
    pub(crate) resizable: bool,
}

impl Default for ToadSetting {
    fn default() -> Self {
        ToadSetting::new()
    }
}

impl ToadSetting {
    const DEFAULT_TITLE: &'static str = "Toad's Adventure";
    const DEFAULT_SCREEN_TILES: (u32, u32) = (50, 30);
    const DEFAULT_TILE_SIZE: u32 = 16;
    const DEFAULT_MAX_FPS: u64 = 60;
    const DEFAULT_UPS: u64 = 60;
    pub fn new() -> ToadSetting {
        ToadSetting {
            title: Self::DEFAULT_TITLE.to_owned(),
            screen_tiles: Self::DEFAULT_SCREEN_TILES,
            tile_size: Self::DEFAULT_TILE_SIZE,
            max_fps: Self::DEFAULT_MAX_FPS,
            ups: Self::DEFAULT_UPS,
            scale: 1.0,
            #[cfg(feature = "window")]
            opengl: OpenGL::V3_2,
            resizable: false,
        }
    }
    pub fn title(&mut self, title: impl Into<String>) -> &mut ToadSetting {
        self.title = title.into();
        self
    }
    pub fn screen_tiles(&mut self, w: u32, h: u32) -> &mut ToadSetting {
        self.screen_tiles = (w, h);
        self
    }
    pub fn tile_size(&mut self, size: u32) -> &mut ToadSetting {
        self.tile_size = size;
        self
    }
    pub fn max_fps(&mut self, f: u64) -> &mut ToadSetting {
        self.max_fps = f;
        self
    }
    pub fn ups(&mut self, u: u64) -> &mut ToadSetting {
        self.ups = u;
        self
    }
    pub fn scale(&mut self, s: f64) -> &mut ToadSetting {
        self.scale = s;
        self
    }
    #[cfg(feature = "window")]
    pub fn opengl(&mut self, gl: OpenGL) -> &mut ToadSetting {
        self.opengl = gl;
        self
    }
    pub fn resizable(&mut self, b: bool) -> &mut ToadSetting {
        self.resizable = b;
        self
    }

    pub fn screen_size(&self) -> (u32, u32) {
        self.screen_tiles
    }
    pub fn updates_per_second(&self) -> u64 {
        self.ups
    }
    /// frame buffer size in pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        let size = self.tile_size;
        self.screen_tiles.map(|n| n * size)
    }
    /// window size in pixels
    pub fn window_size(&self) -> (u32, u32) {
        let scale = self.scale;
        self.pixel_size().map(|n| (f64::from(n) * scale).round() as u32)
    }
}
