//! Toad's Adventure as an `App`.
use image::RgbaImage;
use std::path::Path;

use crate::app::{App, AppMessage};
use crate::error::Result;
use crate::input::{Controls, InputMessage};
use crate::level::Manifest;
use crate::screen::Screen;
use crate::setting::ToadSetting;
use crate::tileset::{Tileset, Tilesets};
use crate::world::{GameEvent, Level, World};

pub struct ToadsAdventure {
    name: String,
    world: World,
    tilesets: Tilesets,
    screen: Screen,
    /// events of the last update
    events: Vec<GameEvent>,
}

impl ToadsAdventure {
    /// Load tilesets and every level of `manifest` from `assets`, then start
    /// at `first_level`.
    pub fn new(
        manifest: &Manifest,
        assets: &Path,
        first_level: usize,
        setting: &ToadSetting,
    ) -> Result<ToadsAdventure> {
        let paths = &manifest.tilesets;
        let tilesets = Tilesets {
            map: Tileset::open(assets.join(&paths.map), paths.map_tile_size)?,
            characters: Tileset::open(assets.join(&paths.characters), paths.character_tile_size)?,
        };
        let levels = Level::load_all(manifest, assets)?;
        let world = World::new(
            levels,
            first_level,
            manifest.fps,
            manifest.music_fadeout_millis,
        )?;
        Ok(Self::from_parts(&manifest.name, world, tilesets, setting))
    }
    pub fn from_parts(
        name: &str,
        mut world: World,
        tilesets: Tilesets,
        setting: &ToadSetting,
    ) -> ToadsAdventure {
        let (w, h) = setting.pixel_size();
        let events = world.events();
        events.iter().for_each(log_event);
        ToadsAdventure {
            name: name.to_owned(),
            world,
            tilesets,
            screen: Screen::new(w, h),
            events,
        }
    }
    pub fn world(&self) -> &World {
        &self.world
    }
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }
}

/// There's no audio backend, so music requests only go to the log.
fn log_event(event: &GameEvent) {
    match event {
        GameEvent::PlayMusic { track, looping } => {
            info!("music: {} (looping: {})", track, looping)
        }
        GameEvent::FadeOutMusic { millis } => info!("music: fade out in {}ms", millis),
        GameEvent::LevelLoaded { level } => info!("entered level {}", level),
        GameEvent::LevelComplete { level } => info!("cleared level {}", level),
        GameEvent::PlayerDied => info!("player died"),
    }
}

impl App for ToadsAdventure {
    fn name(&self) -> &str {
        &self.name
    }
    fn update(&mut self, input: &InputMessage) -> AppMessage {
        let controls = Controls::from_message(input);
        if controls.quit {
            return AppMessage::Quit;
        }
        self.world.update(&controls);
        self.events = self.world.events();
        self.events.iter().for_each(log_event);
        AppMessage::None
    }
    fn paint(&mut self) -> &RgbaImage {
        self.world.draw(&mut self.screen, &self.tilesets);
        self.screen.buf()
    }
}
