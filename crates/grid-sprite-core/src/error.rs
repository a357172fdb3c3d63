use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to open image {}: {source}", path.display())]
    ImageOpen {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    #[error("No valid images found in {}", dir.display())]
    NoValidImages { dir: PathBuf },
    #[error("Encode error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, SpriteError>;
