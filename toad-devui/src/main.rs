//! Developer tools for Toad's Adventure levels.
use ansi_term::{Colour, Style};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use toad_core::tileset::TileClass;
use toad_core::world::{Level, PixelPoint, TilePoint};
use toad_core::Manifest;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "toad-devui", version, about = "level tools for Toad's Adventure")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a map exported from Tiled as JSON into a .map file
    Convert { input: PathBuf, output: PathBuf },
    /// Print a level to the terminal
    Preview {
        level: usize,
        #[arg(long, default_value = "assets")]
        assets: PathBuf,
        /// level manifest (defaults to the built-in one)
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// no colours
        #[arg(long)]
        plain: bool,
    },
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "toad_core=debug,toad_devui=debug,info"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

/// One character per map tile, with the player start as `T` and enemies as
/// their markers.
fn render_level(level: &Level, color: bool) -> String {
    let map = level.map();
    let size = map.tile_size();
    let rules = map.rules();
    let (w, h) = map.size();
    let to_tile = |p: PixelPoint| map.to_tile_point(p);
    let start = to_tile(level.start());
    let mut out = String::new();
    for y in 0..h {
        for x in 0..w {
            let tile = map.tile(TilePoint::new(x, y));
            let npc = level
                .spawns()
                .iter()
                .find(|(_, p)| to_tile(*p) == TilePoint::new(x, y));
            let (c, style) = if start.x == x && start.y == y {
                ('T', Style::new().bold().fg(Colour::White))
            } else if let Some((kind, _)) = npc {
                (kind.marker(), Style::new().bold().fg(Colour::Red))
            } else if rules.is_open_door(tile) {
                ('D', Style::new().fg(Colour::Green))
            } else if rules.is_locked_door(tile) {
                ('d', Style::new().fg(Colour::Purple))
            } else if rules.is_spike(tile) {
                ('^', Style::new().fg(Colour::Red))
            } else if rules.is_climbable(tile) {
                ('H', Style::new().fg(Colour::Yellow))
            } else if rules.is_icy(tile) {
                ('~', Style::new().fg(Colour::Cyan))
            } else {
                match rules.class(tile) {
                    TileClass::Solid => ('#', Style::new().fg(Colour::RGB(160, 82, 45))),
                    TileClass::TopSolid => ('=', Style::new().fg(Colour::RGB(205, 133, 63))),
                    TileClass::NonSolid if tile.is_some() => (':', Style::new().dimmed()),
                    TileClass::NonSolid => ('.', Style::new().dimmed()),
                }
            };
            if color {
                out.push_str(&style.paint(c.to_string()).to_string());
            } else {
                out.push(c);
            }
        }
        out.push('\n');
    }
    log::debug!("rendered level {} ({}x{}, {}px tiles)", level.number(), w, h, size);
    out
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match cli.command {
        Command::Convert { input, output } => {
            let (w, h) = toad_core::tiled::convert(&input, &output)
                .with_context(|| format!("couldn't convert {}", input.display()))?;
            println!("{} -> {} ({}x{})", input.display(), output.display(), w, h);
        }
        Command::Preview {
            level,
            assets,
            manifest,
            plain,
        } => {
            let manifest = match manifest {
                Some(path) => Manifest::from_file(&path)?,
                None => Manifest::builtin()?,
            };
            let level = Level::load(&manifest, level, &assets)?;
            print!("{}", render_level(&level, !plain));
        }
    }
    Ok(())
}

#[cfg(test)]
mod devui_test {
    use super::*;
    use std::fs;

    const MANIFEST: &str = r#"
        name = "preview"

        [tilesets]
        map = "map.png"
        map_tile_size = 16
        characters = "chars.png"
        character_tile_size = 32

        [tiles]
        tile_count = 144
        non_solid = [21, 57, 62]
        top_solid = [3]
        climbable = [57]
        spike = 132
        open_door = 62

        [[levels]]
        map = "maps/one.map"
        start = [1, 1]
        background = 0x000000
        npcs = [{ kind = "shy_guy_red", x = 3, y = 1 }]
    "#;

    fn load(map: &str) -> (tempfile::TempDir, Level) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("maps")).unwrap();
        fs::write(dir.path().join("maps/one.map"), map).unwrap();
        let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
        let level = Level::load(&manifest, 1, dir.path()).unwrap();
        (dir, level)
    }

    #[test]
    fn plain_preview() {
        let (_dir, level) = load("[[-1, 21, -1, 62], [57, 3, 132, 0]]");
        assert_eq!(render_level(&level, false), "T:rD\nH=^#\n");
    }

    #[test]
    fn colored_preview_keeps_the_characters() {
        let (_dir, level) = load("[[-1, -1, -1], [0, 0, 0]]");
        let out = render_level(&level, true);
        assert!(out.contains('T'));
        assert!(out.contains('r'));
        assert!(out.contains("\x1b["));
    }

    #[test]
    fn missing_map_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest::from_toml_str(MANIFEST).unwrap();
        assert!(Level::load(&manifest, 1, dir.path()).is_err());
        assert!(Level::load(&manifest, 2, dir.path()).is_err());
    }
}
