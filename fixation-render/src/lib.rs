pub mod error;
pub mod field;
pub mod render;
pub mod text;

pub use error::AssetError;
pub use field::FieldImages;
pub use render::{FrameStats, SkiaRenderer};
