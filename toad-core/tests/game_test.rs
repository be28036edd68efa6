use image::{Rgba, RgbaImage};
use piston::input::{Button, ButtonArgs, ButtonState, Input, Key};
use std::fs;
use std::path::Path;
use toad_core::input::InputHandler;
use toad_core::world::GameEvent;
use toad_core::{App, AppMessage, Manifest, ToadSetting, ToadsAdventure};

const MANIFEST: &str = r#"
name = "test adventure"
fps = 5
music_fadeout_millis = 250

[tilesets]
map = "images/map.png"
map_tile_size = 16
characters = "images/characters.png"
character_tile_size = 32

[tiles]
tile_count = 144
non_solid = [21, 62]
top_solid = [3]
open_door = 62

[[levels]]
map = "maps/one.map"
start = [1, 2]
background = 0x87CEEB
music = "music/overworld.mp3"

[[levels]]
map = "maps/two.map"
start = [2, 2]
background = 0x000000
npcs = [{ kind = "shy_guy_red", x = 6, y = 2 }]
"#;

// the door is six tiles right of the start
const ONE: &str = "
[
    [ -1, -1, -1, -1, -1, -1, -1, -1, ],
    [ -1, -1, -1, -1, -1, -1, -1, -1, ],
    [ -1, -1, -1, -1, -1, -1, 62, -1, ],
    [  0,  0,  0,  0,  0,  0,  0,  0, ],
]";

const TWO: &str = "
[
    [ -1, -1, -1, -1, -1, -1, -1, -1, ],
    [ -1, -1, -1, -1, -1, -1, -1, -1, ],
    [  0, -1, -1, -1, -1, -1, -1,  0, ],
    [  0,  0,  0,  0,  0,  0,  0,  0, ],
]";

fn grey_tiles(cols: u32, rows: u32, size: u32) -> RgbaImage {
    RgbaImage::from_fn(cols * size, rows * size, |x, y| {
        let n = ((y / size) * cols + x / size) as u8;
        Rgba([n, n, n, 255])
    })
}

fn write_assets(dir: &Path) {
    fs::create_dir_all(dir.join("images")).unwrap();
    fs::create_dir_all(dir.join("maps")).unwrap();
    grey_tiles(4, 4, 16).save(dir.join("images/map.png")).unwrap();
    grey_tiles(8, 3, 32)
        .save(dir.join("images/characters.png"))
        .unwrap();
    fs::write(dir.join("maps/one.map"), ONE).unwrap();
    fs::write(dir.join("maps/two.map"), TWO).unwrap();
    fs::write(dir.join("levels.toml"), MANIFEST).unwrap();
}

fn setting() -> ToadSetting {
    let mut setting = ToadSetting::new();
    setting.screen_tiles(10, 6);
    setting
}

fn load(dir: &Path, level: usize) -> ToadsAdventure {
    let manifest = Manifest::from_file(dir.join("levels.toml")).unwrap();
    ToadsAdventure::new(&manifest, dir, level, &setting()).unwrap()
}

fn key(k: Key, state: ButtonState) -> Input {
    Input::Button(ButtonArgs {
        state,
        button: Button::Keyboard(k),
        scancode: None,
    })
}

struct Driver {
    handler: InputHandler,
    clock: u64,
}

impl Driver {
    fn new() -> Driver {
        Driver {
            handler: InputHandler::default(),
            clock: 0,
        }
    }
    fn input(&mut self, input: Input) {
        self.handler.handle(&input, self.clock);
    }
    fn update(&mut self, game: &mut ToadsAdventure) -> AppMessage {
        self.clock += 1;
        let msg = self.handler.get_message(self.clock);
        game.update(&msg)
    }
}

#[test]
fn starts_with_music_and_paints_the_screen() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    let mut game = load(dir.path(), 1);
    assert_eq!(game.name(), "test adventure");
    assert!(game.events().contains(&GameEvent::PlayMusic {
        track: "music/overworld.mp3".to_owned(),
        looping: true
    }));
    let buf = game.paint();
    assert_eq!(buf.dimensions(), (160, 96));
    // sky in the corner, the player at the anchor
    assert_eq!(buf.get_pixel(0, 0).0, [0x87, 0xCE, 0xEB, 255]);
    assert_eq!(buf.get_pixel(80, 48).0, [0, 0, 0, 255]);
}

#[test]
fn escape_quits() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    let mut game = load(dir.path(), 1);
    let mut driver = Driver::new();
    assert_eq!(driver.update(&mut game), AppMessage::None);
    driver.input(key(Key::Escape, ButtonState::Press));
    assert_eq!(driver.update(&mut game), AppMessage::Quit);
}

#[test]
fn walking_into_the_door_loads_the_next_level() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    let mut game = load(dir.path(), 1);
    let mut driver = Driver::new();
    driver.input(key(Key::D, ButtonState::Press));
    let mut completed = false;
    for _ in 0..60 {
        driver.update(&mut game);
        if game.events().contains(&GameEvent::LevelComplete { level: 1 }) {
            completed = true;
            break;
        }
    }
    assert!(completed);
    assert!(game.events().contains(&GameEvent::FadeOutMusic { millis: 250 }));
    assert!(game.world().is_posing());
    driver.input(key(Key::D, ButtonState::Release));
    for _ in 0..5 {
        driver.update(&mut game);
    }
    assert_eq!(game.world().level_number(), 2);
    assert_eq!(game.world().npcs().len(), 1);
    // level two has no music
    assert_eq!(game.events(), &[GameEvent::LevelLoaded { level: 2 }]);
}

#[test]
fn start_level_out_of_range() {
    let dir = tempfile::tempdir().unwrap();
    write_assets(dir.path());
    let manifest = Manifest::from_file(dir.path().join("levels.toml")).unwrap();
    assert!(ToadsAdventure::new(&manifest, dir.path(), 3, &setting()).is_err());
}

#[test]
fn missing_assets_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = Manifest::builtin().unwrap();
    assert!(ToadsAdventure::new(&manifest, dir.path(), 1, &setting()).is_err());
}
