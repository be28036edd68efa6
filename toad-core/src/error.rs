use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("manifest error: {0}")]
    Manifest(#[from] toml::de::Error),

    #[error("Tiled JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("map parse error at {line}:{column}: {message}")]
    MapParse {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("unsupported Tiled map: {message}")]
    Tiled { message: String },

    #[error("tileset error: {message}")]
    Tileset { message: String },

    #[error("level {level}: {message}")]
    Level { level: usize, message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("window error: {message}")]
    Window { message: String },
}

impl ToadError {
    pub(crate) fn tiled(message: impl Into<String>) -> ToadError {
        ToadError::Tiled {
            message: message.into(),
        }
    }
    pub(crate) fn config(message: impl Into<String>) -> ToadError {
        ToadError::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ToadError>;
