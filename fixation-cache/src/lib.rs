mod cache;

pub use cache::{TextId, intern_text};
