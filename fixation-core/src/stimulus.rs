use serde::{Deserialize, Serialize};

use crate::trial::{DistractorGlyph, Side};

/// Drawable primitives understood by a [`crate::Display`].
///
/// Coordinates are pixel offsets from the screen centre with +y pointing up.
#[derive(Debug, Clone, PartialEq)]
pub enum Stimulus {
    /// Centred text block, wrapped by the renderer.
    Text {
        content: &'static str,
        size: f32,
        color: [u8; 4],
    },
    /// Centred filled disc; the fixation point.
    Circle { radius: f32, color: [u8; 4] },
    /// One of the two pre-rendered alternation fields, centred.
    Field(FieldId),
    Arrow {
        direction: ArrowDirection,
        size: f32,
        color: [u8; 4],
    },
    Glyph {
        glyph: DistractorGlyph,
        x: f32,
        size: f32,
        color: [u8; 4],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    First,
    Second,
}

impl FieldId {
    /// Field shown for the current alternation flag.
    pub fn for_flag(white_first: bool) -> Self {
        if white_first {
            FieldId::First
        } else {
            FieldId::Second
        }
    }

    pub fn index(self) -> usize {
        match self {
            FieldId::First => 0,
            FieldId::Second => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Left,
    Right,
}

/// Sizes and colours of every primitive a session draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimulusLayout {
    pub background: [u8; 4],
    pub field_size: f32,
    pub fixation_radius: f32,
    pub fixation_color: [u8; 4],
    pub arrow_size: f32,
    pub glyph_size: f32,
    pub text_size: f32,
    pub text_wrap_width: f32,
    pub foreground: [u8; 4],
}

impl Default for StimulusLayout {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 255],
            field_size: 800.0,
            fixation_radius: 25.0,
            fixation_color: [0, 0, 0, 255],
            arrow_size: 40.0,
            glyph_size: 50.0,
            text_size: 28.0,
            text_wrap_width: 900.0,
            foreground: [255, 255, 255, 255],
        }
    }
}

impl StimulusLayout {
    pub fn fixation(&self) -> Stimulus {
        Stimulus::Circle {
            radius: self.fixation_radius,
            color: self.fixation_color,
        }
    }

    pub fn arrow(&self, side: Side) -> Stimulus {
        Stimulus::Arrow {
            direction: side.arrow(),
            size: self.arrow_size,
            color: self.foreground,
        }
    }

    pub fn glyph(&self, glyph: DistractorGlyph, x: f32) -> Stimulus {
        Stimulus::Glyph {
            glyph,
            x,
            size: self.glyph_size,
            color: self.foreground,
        }
    }

    pub fn text(&self, content: &'static str) -> Stimulus {
        Stimulus::Text {
            content,
            size: self.text_size,
            color: self.foreground,
        }
    }
}
