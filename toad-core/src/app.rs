//! The contract between a game and the main loop.

use crate::input::InputMessage;
use image::RgbaImage;

/// messages the main loop reacts to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppMessage {
    Quit,
    None,
}

/// A windowed game: one `update` per Update event, one `paint` per Render event.
pub trait App {
    fn name(&self) -> &str;
    fn update(&mut self, input: &InputMessage) -> AppMessage;
    /// Draw the current state and hand out the frame buffer.
    fn paint(&mut self) -> &RgbaImage;
}
