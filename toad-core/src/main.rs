use anyhow::{bail, Context};
use clap::Parser;
use std::path::PathBuf;
use toad_core::{window, App, Manifest, ToadSetting, ToadsAdventure};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Toad's Adventure: arrow keys or WASD to move, climb and duck, space to jump.
#[derive(Parser, Debug)]
#[command(name = "toads-adventure", version)]
struct Cli {
    /// level to start at
    #[arg(default_value_t = 1)]
    level: usize,
    /// directory holding images/ and maps/
    #[arg(long, default_value = "assets")]
    assets: PathBuf,
    /// level manifest (defaults to the built-in five levels)
    #[arg(long)]
    manifest: Option<PathBuf>,
    /// window pixels per game pixel
    #[arg(long, default_value_t = 1.0)]
    scale: f64,
    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let default = if verbose {
        "toad_core=debug,info"
    } else {
        "toad_core=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).compact())
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let manifest = match &cli.manifest {
        Some(path) => Manifest::from_file(path)
            .with_context(|| format!("couldn't read manifest {}", path.display()))?,
        None => Manifest::builtin()?,
    };
    if cli.level == 0 || cli.level > manifest.num_levels() {
        bail!(
            "level must be between 1 and {}, not {}",
            manifest.num_levels(),
            cli.level
        );
    }
    if cli.scale <= 0.0 {
        bail!("scale must be positive, not {}", cli.scale);
    }
    let mut setting = ToadSetting::new();
    setting
        .title(manifest.name.clone())
        .tile_size(manifest.tilesets.map_tile_size)
        .max_fps(u64::from(manifest.fps))
        .ups(u64::from(manifest.fps))
        .scale(cli.scale);
    let mut game = ToadsAdventure::new(&manifest, &cli.assets, cli.level, &setting)
        .with_context(|| format!("couldn't load the game from {}", cli.assets.display()))?;
    log::debug!("starting {} at level {}", game.name(), cli.level);
    window::run(&mut game, &setting)?;
    Ok(())
}
