//! Toad's Adventure: a tile-based platformer on a software frame buffer.
//!
//! The game state never touches the window directly. Every update produces a
//! frame in an `RgbaImage`, which the windowed frontend (behind the `window`
//! feature) uploads as an OpenGL texture.

extern crate ansi_term;
extern crate euclid;
#[cfg(feature = "window")]
extern crate graphics;
extern crate image;
#[macro_use]
extern crate log;
extern crate num_traits;
#[cfg(feature = "window")]
extern crate opengl_graphics;
extern crate piston;
extern crate rect_iter;
#[cfg(feature = "window")]
extern crate sdl2_window;
extern crate tuple_map;

pub mod app;
pub mod error;
pub mod game;
pub mod input;
pub mod level;
pub mod schedule;
pub mod screen;
pub mod setting;
#[cfg(test)]
mod testutils;
pub mod tiled;
pub mod tileset;
#[cfg(feature = "window")]
pub mod window;
pub mod world;

pub use crate::app::{App, AppMessage};
pub use crate::error::{Result, ToadError};
pub use crate::game::ToadsAdventure;
pub use crate::level::Manifest;
pub use crate::setting::ToadSetting;

/// clock counter type
/// one tick per Update event
pub type Clock = u64;

/// Inclusive time span
/// We use our own type instead of Range, to get 'Copy'
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Span {
    pub start: Clock,
    pub end: Clock,
}

impl Span {
    pub fn new(s: Clock, e: Clock) -> Span {
        Span { start: s, end: e }
    }
}
