use fixation_core::{DistractorGlyph, ExperimentError, Side, TrialConfig};
use rand::Rng;
use rand::seq::SliceRandom;

/// Side and glyph assignments for every trial of a session.
///
/// Both sequences hold each value exactly `len / 2` times and are shuffled
/// independently of each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialPlan {
    sides: Vec<Side>,
    glyphs: Vec<DistractorGlyph>,
}

impl TrialPlan {
    pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Self, ExperimentError> {
        check_even(n)?;
        let mut sides = balanced(n, Side::Left, Side::Right);
        let mut glyphs = balanced(n, DistractorGlyph::Slash, DistractorGlyph::Backslash);
        sides.shuffle(rng);
        glyphs.shuffle(rng);
        Ok(Self { sides, glyphs })
    }

    /// Builds a plan from fixed sequences, checking the balance invariant.
    pub fn from_sequences(
        sides: Vec<Side>,
        glyphs: Vec<DistractorGlyph>,
    ) -> Result<Self, ExperimentError> {
        if sides.len() != glyphs.len() {
            return Err(ExperimentError::invalid(format!(
                "plan has {} sides but {} glyphs",
                sides.len(),
                glyphs.len()
            )));
        }
        check_even(sides.len())?;
        let half = sides.len() / 2;
        let lefts = sides.iter().filter(|s| **s == Side::Left).count();
        let slashes = glyphs
            .iter()
            .filter(|g| **g == DistractorGlyph::Slash)
            .count();
        if lefts != half || slashes != half {
            return Err(ExperimentError::invalid(format!(
                "plan is unbalanced: {lefts} left and {slashes} slash of {}",
                sides.len()
            )));
        }
        Ok(Self { sides, glyphs })
    }

    pub fn len(&self) -> usize {
        self.sides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sides.is_empty()
    }

    pub fn sides(&self) -> &[Side] {
        &self.sides
    }

    pub fn glyphs(&self) -> &[DistractorGlyph] {
        &self.glyphs
    }

    pub fn config(&self, index: usize, cue_active: bool) -> Result<TrialConfig, ExperimentError> {
        match (self.sides.get(index), self.glyphs.get(index)) {
            (Some(&side), Some(&glyph)) => Ok(TrialConfig {
                index,
                side,
                glyph,
                cue_active,
            }),
            _ => Err(ExperimentError::PlanExhausted {
                index,
                len: self.len(),
            }),
        }
    }
}

fn check_even(n: usize) -> Result<(), ExperimentError> {
    if n == 0 || n % 2 != 0 {
        return Err(ExperimentError::invalid(format!(
            "trial plan length must be even and non-zero, got {n}"
        )));
    }
    Ok(())
}

fn balanced<T: Copy>(n: usize, a: T, b: T) -> Vec<T> {
    [vec![a; n / 2], vec![b; n / 2]].concat()
}
