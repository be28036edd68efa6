//! Import of level maps drawn in the Tiled editor (JSON export).
//!
//! Only the subset the game uses is accepted: an orthogonal map with exactly
//! one tile layer of the map's size. The layer may be stored as a plain array,
//! as uncompressed base64 or as base64 of zlib or gzip data.
use base64::Engine;
use flate2::read::{GzDecoder, ZlibDecoder};
use serde::Deserialize;
use std::convert::TryFrom;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::error::{Result, ToadError};
use crate::world::map::format_rows;

/// flip and rotation bits Tiled stores in the top of a gid
const FLIP_FLAGS: u32 = 0xF000_0000;

#[derive(Debug, Deserialize)]
struct TiledMap {
    orientation: String,
    width: i64,
    height: i64,
    #[serde(default)]
    layers: Vec<TiledLayer>,
    #[serde(default)]
    tilesets: Vec<TiledTileset>,
}

#[derive(Debug, Deserialize)]
struct TiledLayer {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    width: Option<i64>,
    height: Option<i64>,
    data: Option<LayerData>,
    encoding: Option<String>,
    compression: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

#[derive(Debug, Deserialize)]
struct TiledTileset {
    firstgid: u32,
}

/// Convert a Tiled JSON document into rows of tile ids, `-1` for empty cells.
pub fn parse_tiled(json: &str) -> Result<Vec<Vec<i32>>> {
    let map: TiledMap = serde_json::from_str(json)?;
    if map.orientation != "orthogonal" {
        return Err(ToadError::tiled(format!(
            "orientation must be orthogonal, not {}",
            map.orientation
        )));
    }
    if map.width < 1 || map.height < 1 {
        return Err(ToadError::tiled(format!(
            "map is too small: {} x {}",
            map.width, map.height
        )));
    }
    let size = |n: i64| usize::try_from(n).ok();
    let (width, height, len) = match (size(map.width), size(map.height)) {
        (Some(w), Some(h)) => match w.checked_mul(h).filter(|n| n.checked_mul(4).is_some()) {
            Some(len) => (w, h, len),
            None => return Err(ToadError::tiled("map is too large")),
        },
        _ => return Err(ToadError::tiled("map is too large")),
    };
    let firstgid = match map.tilesets.first() {
        Some(ts) => ts.firstgid,
        None => return Err(ToadError::tiled("map has no tileset")),
    };
    let layers: Vec<_> = map.layers.iter().filter(|l| l.kind == "tilelayer").collect();
    if layers.len() != 1 {
        return Err(ToadError::tiled(format!(
            "map must contain exactly one tile layer, not {}",
            layers.len()
        )));
    }
    let layer = layers[0];
    debug!("importing layer '{}' ({}x{})", layer.name, width, height);
    if layer.width != Some(map.width) || layer.height != Some(map.height) {
        return Err(ToadError::tiled(format!(
            "layer size {:?} x {:?} does not match map size {} x {}",
            layer.width, layer.height, map.width, map.height
        )));
    }
    let gids = layer_gids(layer, len)?;
    let rows = gids
        .chunks(width)
        .map(|row| row.iter().map(|&gid| tile_id(gid, firstgid)).collect())
        .collect();
    Ok(rows)
}

fn tile_id(gid: u32, firstgid: u32) -> i32 {
    let gid = gid & !FLIP_FLAGS;
    if gid == 0 {
        -1
    } else {
        gid as i32 - firstgid as i32
    }
}

fn layer_gids(layer: &TiledLayer, len: usize) -> Result<Vec<u32>> {
    let encoded = match &layer.data {
        Some(LayerData::Gids(gids)) => {
            if gids.len() != len {
                return Err(ToadError::tiled(format!(
                    "map data is the wrong size: found {} tiles but expected {}",
                    gids.len(),
                    len
                )));
            }
            return Ok(gids.clone());
        }
        Some(LayerData::Encoded(s)) => s,
        None => return Err(ToadError::tiled("tile layer has no data")),
    };
    match layer.encoding.as_ref().map(String::as_str) {
        Some("base64") => {}
        other => {
            return Err(ToadError::tiled(format!(
                "layer data must use base64 encoding, not {}",
                other.unwrap_or("none")
            )))
        }
    }
    let raw = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
    let bytes = match layer.compression.as_ref().map(String::as_str) {
        None | Some("") => raw,
        Some("zlib") => inflate(ZlibDecoder::new(&raw[..]))?,
        Some("gzip") => inflate(GzDecoder::new(&raw[..]))?,
        Some(other) => {
            return Err(ToadError::tiled(format!(
                "layer data must use gzip or zlib compression, not {}",
                other
            )))
        }
    };
    if bytes.len() != 4 * len {
        return Err(ToadError::tiled(format!(
            "map data is the wrong size: found {} bytes but expected {}",
            bytes.len(),
            4 * len
        )));
    }
    Ok(bytes
        .chunks(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

fn inflate(mut decoder: impl Read) -> Result<Vec<u8>> {
    let mut out = vec![];
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Convert a Tiled JSON file into a `.map` file.
/// Returns (width, height) of the map in tiles.
pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<(usize, usize)> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let rows = parse_tiled(&fs::read_to_string(input)?)?;
    fs::write(output, format_rows(&rows))?;
    let size = (rows[0].len(), rows.len());
    info!(
        "converted {} -> {} ({}x{} tiles)",
        input.display(),
        output.display(),
        size.0,
        size.1
    );
    Ok(size)
}
