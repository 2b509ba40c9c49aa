/// The phases of a single fixation trial, in presentation order.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum TrialPhase {
    #[default]
    Prompt,
    Cue,
    PreDistractor,
    DistractorFlash,
    PostDistractor,
}

impl TrialPhase {
    /// Phase that follows `self`. Cue and flash only exist in cued trials.
    pub fn next(&self, cue_active: bool) -> Option<Self> {
        use TrialPhase::*;
        Some(match self {
            Prompt if cue_active => Cue,
            Prompt => PreDistractor,
            Cue => PreDistractor,
            PreDistractor if cue_active => DistractorFlash,
            PreDistractor => PostDistractor,
            DistractorFlash => PostDistractor,
            PostDistractor => return None,
        })
    }

    /// Whether frames of this phase carry the fixation dot on top.
    pub fn draws_fixation(&self) -> bool {
        matches!(
            self,
            Self::PreDistractor | Self::DistractorFlash | Self::PostDistractor
        )
    }
}
