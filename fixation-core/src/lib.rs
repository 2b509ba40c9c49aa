pub mod device;
pub mod error;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use device::{Display, Key, KeyOutcome, Keyboard};
pub use error::ExperimentError;
pub use phase::TrialPhase;
pub use stimulus::{ArrowDirection, FieldId, Stimulus, StimulusLayout};
pub use trial::{DistractorGlyph, Side, TrialConfig};
