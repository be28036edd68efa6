//! Level progression and the rules between the player, enemies and the map.
use std::mem;
use std::path::Path;

use super::character::{tiles, Character, Npc, NpcKind, Player};
use super::{PixelPoint, PixelVector, TileMap, TilePoint};
use crate::error::{Result, ToadError};
use crate::input::Controls;
use crate::level::{LevelSpec, Manifest};
use crate::schedule::Scheduler;
use crate::screen::Screen;
use crate::tileset::{Color, TileId, Tilesets};
use crate::Clock;

/// A loaded level: its map plus where everybody starts.
pub struct Level {
    number: usize,
    map: TileMap,
    start: PixelPoint,
    background: Color,
    music: Option<String>,
    spawns: Vec<(NpcKind, PixelPoint)>,
}

impl Level {
    pub fn new(number: usize, spec: &LevelSpec, map: TileMap) -> Level {
        let size = map.tile_size();
        Level {
            number,
            start: spec.start_pixel(size),
            background: spec.background_color(),
            music: spec.music.clone(),
            spawns: spec.npcs.iter().map(|s| (s.kind, s.pixel(size))).collect(),
            map,
        }
    }
    /// Load level `number` with map paths relative to `assets`.
    pub fn load(manifest: &Manifest, number: usize, assets: &Path) -> Result<Level> {
        let spec = manifest.level(number)?;
        let tile_size = manifest.tilesets.map_tile_size as i32;
        let map = TileMap::load(assets.join(&spec.map), tile_size, manifest.tiles.clone())
            .map_err(|e| ToadError::Level {
                level: number,
                message: format!("{}: {}", spec.map.display(), e),
            })?;
        Ok(Level::new(number, spec, map))
    }
    pub fn load_all(manifest: &Manifest, assets: &Path) -> Result<Vec<Level>> {
        (1..=manifest.num_levels())
            .map(|n| Level::load(manifest, n, assets))
            .collect()
    }
    pub fn number(&self) -> usize {
        self.number
    }
    pub fn map(&self) -> &TileMap {
        &self.map
    }
    pub fn start(&self) -> PixelPoint {
        self.start
    }
    pub fn background(&self) -> Color {
        self.background
    }
    pub fn music(&self) -> Option<&str> {
        self.music.as_ref().map(String::as_str)
    }
    /// enemies placed in the level, in pixels
    pub fn spawns(&self) -> &[(NpcKind, PixelPoint)] {
        &self.spawns
    }
    fn spawn_npcs(&self) -> Vec<Npc> {
        self.spawns
            .iter()
            .map(|&(kind, pos)| Npc::new(kind, pos))
            .collect()
    }
}

/// What happened during an update, for the sound and the log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    LevelLoaded { level: usize },
    PlayMusic { track: String, looping: bool },
    FadeOutMusic { millis: u32 },
    LevelComplete { level: usize },
    PlayerDied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Playing,
    /// frozen, showing one player tile
    Posing(TileId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Respawn,
    AdvanceLevel,
}

pub struct World {
    levels: Vec<Level>,
    /// index into `levels`
    current: usize,
    player: Player,
    npcs: Vec<Npc>,
    phase: Phase,
    scheduler: Scheduler<Action>,
    clock: Clock,
    pose_frames: Clock,
    fadeout_millis: u32,
    events: Vec<GameEvent>,
}

impl World {
    /// Start at level `first` (1-based). Poses last `fps` updates.
    pub fn new(levels: Vec<Level>, first: usize, fps: u32, fadeout_millis: u32) -> Result<World> {
        if first == 0 || first > levels.len() {
            return Err(ToadError::Level {
                level: first,
                message: format!("there are only {} levels", levels.len()),
            });
        }
        let start = levels[first - 1].start;
        let mut world = World {
            levels,
            current: first - 1,
            player: Player::new(start),
            npcs: vec![],
            phase: Phase::Playing,
            scheduler: Scheduler::new(),
            clock: 0,
            pose_frames: Clock::from(fps),
            fadeout_millis,
            events: vec![],
        };
        world.load_level(first - 1);
        Ok(world)
    }

    fn load_level(&mut self, index: usize) {
        self.current = index;
        let level = &self.levels[index];
        self.player = Player::new(level.start);
        self.npcs = level.spawn_npcs();
        self.phase = Phase::Playing;
        self.scheduler.clear();
        info!("level {} ({} enemies)", level.number, self.npcs.len());
        self.events.push(GameEvent::LevelLoaded {
            level: level.number,
        });
        if let Some(track) = level.music() {
            self.events.push(GameEvent::PlayMusic {
                track: track.to_owned(),
                looping: true,
            });
        }
    }

    fn pose(&mut self, tile: TileId, then: Action) {
        self.phase = Phase::Posing(tile);
        self.scheduler.push(self.clock + self.pose_frames, then);
    }

    fn run(&mut self, action: Action) {
        match action {
            Action::Respawn => {
                let start = self.levels[self.current].start;
                self.player.respawn(start);
                self.phase = Phase::Playing;
            }
            Action::AdvanceLevel => {
                let next = (self.current + 1) % self.levels.len();
                self.load_level(next);
            }
        }
    }

    /// One frame of game logic.
    pub fn update(&mut self, controls: &Controls) {
        self.clock += 1;
        let actions = self.scheduler.pop(self.clock);
        if !actions.is_empty() {
            // respawning or switching levels takes the whole frame
            actions.into_iter().for_each(|a| self.run(a));
            return;
        }
        if self.phase != Phase::Playing {
            return;
        }
        let level = &self.levels[self.current];
        let map = &level.map;
        if map
            .rules()
            .is_open_door(self.player.body().tile_behind(map))
        {
            info!("level {} complete", level.number);
            self.events.push(GameEvent::FadeOutMusic {
                millis: self.fadeout_millis,
            });
            self.events.push(GameEvent::LevelComplete {
                level: level.number,
            });
            let tile = self.player.victory_tile();
            self.pose(tile, Action::AdvanceLevel);
            return;
        }
        self.player.update(map, controls);
        let player = &mut self.player;
        self.npcs.retain_mut(|npc| {
            if npc.body().overlaps(player.body()) {
                player.take_damage();
            }
            if npc.body().is_below(map) {
                debug!("{} left the map at {:?}", npc.kind(), npc.body().pos);
                false
            } else {
                npc.update(map);
                true
            }
        });
        if self.player.is_dying() {
            self.events.push(GameEvent::PlayerDied);
            self.pose(tiles::DEAD, Action::Respawn);
        }
    }

    pub fn events(&mut self) -> Vec<GameEvent> {
        mem::replace(&mut self.events, vec![])
    }
    pub fn level(&self) -> &Level {
        &self.levels[self.current]
    }
    pub fn level_number(&self) -> usize {
        self.level().number
    }
    pub fn player(&self) -> &Player {
        &self.player
    }
    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }
    pub fn is_posing(&self) -> bool {
        self.phase != Phase::Playing
    }
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Where the player appears on `screen`: the tile just left of and
    /// above the centre.
    fn anchor(screen: &Screen, tile_size: i32) -> PixelPoint {
        let half = |len: i32| (len / tile_size - 1) / 2 * tile_size;
        PixelPoint::new(half(screen.width()), half(screen.height()))
    }

    /// Draw the visible part of the level around the player.
    pub fn draw(&self, screen: &mut Screen, tilesets: &Tilesets) {
        let level = self.level();
        let map = &level.map;
        let size = map.tile_size();
        let anchor = Self::anchor(screen, size);
        // screen position = world position + offset
        let offset: PixelVector = anchor - self.player.body().pos;
        screen.clear(level.background);
        let view = PixelPoint::origin() - offset;
        let first = map.to_tile_point(view);
        let last = map.to_tile_point(view + PixelVector::new(screen.width(), screen.height()));
        for ty in first.y..=last.y {
            for tx in first.x..=last.x {
                let tp = TilePoint::new(tx, ty);
                let tile = map.draw_tile(tp).and_then(|id| tilesets.map.tile(id));
                if let Some(tile) = tile {
                    screen.blit(tile, PixelPoint::new(tx * size, ty * size) + offset);
                }
            }
        }
        let player_tile = match self.phase {
            Phase::Posing(pose) => {
                if let Some(tile) = tilesets.characters.tile(pose) {
                    screen.blit(tile, anchor);
                }
                return;
            }
            Phase::Playing => self.player.tile(),
        };
        let blink = self.player.is_invincible() && (self.clock / 4) % 2 == 1;
        if !blink {
            if let Some(tile) = tilesets.characters.tile(player_tile) {
                screen.blit(tile, anchor);
            }
        }
        for npc in &self.npcs {
            if let Some(tile) = tilesets.characters.tile(npc.tile()) {
                screen.blit(tile, npc.body().pos + offset);
            }
        }
    }
}
