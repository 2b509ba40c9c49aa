use serde::{Deserialize, Serialize};

use crate::stimulus::ArrowDirection;

/// Screen side a cued trial points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// -1 for left, +1 for right.
    pub fn sign(self) -> f32 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    pub fn arrow(self) -> ArrowDirection {
        match self {
            Side::Left => ArrowDirection::Left,
            Side::Right => ArrowDirection::Right,
        }
    }
}

/// Line glyph flashed next to fixation in cued trials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistractorGlyph {
    Slash,
    Backslash,
}

impl DistractorGlyph {
    pub fn as_str(self) -> &'static str {
        match self {
            DistractorGlyph::Slash => "/",
            DistractorGlyph::Backslash => "\\",
        }
    }
}

/// Per-trial view of the session plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialConfig {
    pub index: usize,
    pub side: Side,
    pub glyph: DistractorGlyph,
    pub cue_active: bool,
}
