use std::time::Duration;

use fixation_core::{ExperimentError, Key, StimulusLayout};
use serde::{Deserialize, Serialize};

/// One `run_session` call of the session script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBlock {
    pub show_distractor: bool,
    pub n_trials: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Blocks run in order; the trial plan is sized to their total.
    pub blocks: Vec<SessionBlock>,
    pub cue_frames: usize,
    pub flash_frames: usize,
    /// Inclusive bounds of the per-trial alternation duration.
    pub alternation_range: (Duration, Duration),
    pub distractor_offset_px: f32,
    pub pre_session_pause: Duration,
    pub continue_key: Key,
    pub quit_key: Key,
    pub stimuli: StimulusLayout,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            blocks: vec![
                SessionBlock {
                    show_distractor: false,
                    n_trials: 5,
                },
                SessionBlock {
                    show_distractor: true,
                    n_trials: 25,
                },
            ],
            cue_frames: 50,
            flash_frames: 4,
            alternation_range: (Duration::from_millis(1500), Duration::from_millis(2500)),
            distractor_offset_px: 300.0,
            pre_session_pause: Duration::from_millis(1500),
            continue_key: Key::Space,
            quit_key: Key::Q,
            stimuli: StimulusLayout::default(),
        }
    }
}

impl SessionConfig {
    /// Number of trials the whole script consumes.
    pub fn plan_len(&self) -> usize {
        self.blocks.iter().map(|b| b.n_trials).sum()
    }

    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.blocks.is_empty() {
            return Err(ExperimentError::invalid("session script has no blocks"));
        }
        if let Some(pos) = self.blocks.iter().position(|b| b.n_trials == 0) {
            return Err(ExperimentError::invalid(format!("block {pos} has no trials")));
        }
        let total = self.plan_len();
        if total % 2 != 0 {
            return Err(ExperimentError::invalid(format!(
                "session total of {total} trials cannot be balanced across two sides"
            )));
        }
        let (min, max) = self.alternation_range;
        if min > max {
            return Err(ExperimentError::invalid(format!(
                "alternation range {min:?}..={max:?} is inverted"
            )));
        }
        if max.is_zero() {
            return Err(ExperimentError::invalid("alternation range is empty"));
        }
        self.alternation_range_nanos()?;
        if self.continue_key == self.quit_key {
            return Err(ExperimentError::invalid(
                "continue and quit keys must differ",
            ));
        }
        if self.stimuli.field_size <= 0.0 {
            return Err(ExperimentError::invalid("field size must be positive"));
        }
        Ok(())
    }

    /// Alternation bounds in whole nanoseconds, as the display-time draw uses them.
    pub fn alternation_range_nanos(&self) -> Result<(u64, u64), ExperimentError> {
        let nanos = |d: Duration| {
            u64::try_from(d.as_nanos()).map_err(|_| {
                ExperimentError::invalid(format!("alternation bound {d:?} is out of range"))
            })
        };
        let (min, max) = self.alternation_range;
        Ok((nanos(min)?, nanos(max)?))
    }

    /// Parses a JSON override on top of the defaults and validates it.
    pub fn from_json(json: &str) -> Result<Self, ExperimentError> {
        let config: SessionConfig = serde_json::from_str(json)
            .map_err(|e| ExperimentError::invalid(format!("malformed session config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}
