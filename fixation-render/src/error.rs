use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("could not load stimulus image {path}: {source}")]
    AssetLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("The dimensions of the image are not correct. Expected {expected} bytes, got {actual}.")]
    WrongDimensions { expected: usize, actual: usize },

    #[error("stimulus image is empty")]
    EmptyImage,

    #[error("{0}")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("cannot allocate a {0}x{1} canvas")]
    Canvas(u32, u32),
}
