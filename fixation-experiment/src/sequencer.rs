use std::time::Duration;

use fixation_core::{
    Display, ExperimentError, FieldId, KeyOutcome, Keyboard, Stimulus, TrialConfig, TrialPhase,
};
use fixation_timing::Timer;
use log::{debug, info};
use rand::Rng;

use crate::config::SessionConfig;
use crate::instructions;
use crate::plan::TrialPlan;

/// Everything a session reads but never changes once built.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub config: SessionConfig,
    pub plan: TrialPlan,
}

impl SessionContext {
    /// Validates `config` and draws a plan sized to its script.
    pub fn new<R: Rng + ?Sized>(config: SessionConfig, rng: &mut R) -> Result<Self, ExperimentError> {
        config.validate()?;
        let plan = TrialPlan::generate(config.plan_len(), rng)?;
        Ok(Self { config, plan })
    }

    pub fn with_plan(config: SessionConfig, plan: TrialPlan) -> Result<Self, ExperimentError> {
        config.validate()?;
        if plan.len() != config.plan_len() {
            return Err(ExperimentError::invalid(format!(
                "plan holds {} trials but the session script runs {}",
                plan.len(),
                config.plan_len()
            )));
        }
        Ok(Self { config, plan })
    }
}

/// The collaborators a trial drives.
pub struct Devices<D, K, T, R> {
    pub display: D,
    pub keyboard: K,
    pub timer: T,
    pub rng: R,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrialSummary {
    pub trial: TrialConfig,
    pub display_time: Duration,
    pub cue_frames: usize,
    pub pre_frames: usize,
    pub flash_frames: usize,
    pub post_frames: usize,
}

impl TrialSummary {
    fn new(trial: TrialConfig) -> Self {
        Self {
            trial,
            display_time: Duration::ZERO,
            cue_frames: 0,
            pre_frames: 0,
            flash_frames: 0,
            post_frames: 0,
        }
    }

    pub fn total_frames(&self) -> usize {
        self.cue_frames + self.pre_frames + self.flash_frames + self.post_frames
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    Completed(TrialSummary),
    Aborted,
}

pub struct TrialSequencer<'a, D, K, T, R> {
    ctx: &'a SessionContext,
    devices: &'a mut Devices<D, K, T, R>,
    white_first: bool,
}

impl<'a, D, K, T, R> TrialSequencer<'a, D, K, T, R>
where
    D: Display,
    K: Keyboard,
    T: Timer,
    R: Rng,
{
    pub fn new(ctx: &'a SessionContext, devices: &'a mut Devices<D, K, T, R>) -> Self {
        Self {
            ctx,
            devices,
            white_first: true,
        }
    }

    /// Runs one trial of the plan through every phase that applies to it.
    pub fn run_trial(
        &mut self,
        index: usize,
        cue_active: bool,
    ) -> Result<TrialOutcome, ExperimentError> {
        let trial = self.ctx.plan.config(index, cue_active)?;
        let mut summary = TrialSummary::new(trial);
        self.white_first = true;

        let mut phase = Some(TrialPhase::Prompt);
        while let Some(current) = phase {
            match current {
                TrialPhase::Prompt => {
                    if self.prompt()? == KeyOutcome::Abort {
                        info!("Trial {} aborted at prompt", index);
                        return Ok(TrialOutcome::Aborted);
                    }
                }
                TrialPhase::Cue => {
                    summary.cue_frames = self.cue(current, &trial)?;
                }
                TrialPhase::PreDistractor => {
                    summary.display_time = self.sample_display_time()?;
                    summary.pre_frames = self.alternate(current, summary.display_time)?;
                }
                TrialPhase::DistractorFlash => {
                    summary.flash_frames = self.flash(current, &trial)?;
                }
                TrialPhase::PostDistractor => {
                    summary.post_frames = self.alternate(current, summary.display_time)?;
                }
            }
            phase = current.next(cue_active);
        }

        self.devices.display.present(true)?;
        self.devices.timer.reset();

        debug!(
            "Trial {} done: side {:?}, glyph {:?}, display time {:.3} s, frames {}/{}/{}/{}",
            index,
            trial.side,
            trial.glyph,
            summary.display_time.as_secs_f64(),
            summary.cue_frames,
            summary.pre_frames,
            summary.flash_frames,
            summary.post_frames,
        );
        Ok(TrialOutcome::Completed(summary))
    }

    fn prompt(&mut self) -> Result<KeyOutcome, ExperimentError> {
        let config = &self.ctx.config;
        self.devices
            .display
            .draw(config.stimuli.text(instructions::INTERVAL_PROMPT))?;
        self.devices.display.present(false)?;
        Ok(self
            .devices
            .keyboard
            .wait_for_continue(config.continue_key, config.quit_key)?)
    }

    // Frame gated: lasts `cue_frames` refreshes whatever the refresh rate.
    fn cue(&mut self, phase: TrialPhase, trial: &TrialConfig) -> Result<usize, ExperimentError> {
        let config = &self.ctx.config;
        for _ in 0..config.cue_frames {
            self.devices.display.draw(config.stimuli.arrow(trial.side))?;
            self.finish_frame(phase)?;
        }
        Ok(config.cue_frames)
    }

    /// Alternates the fields until `display_time` has passed since the phase began.
    fn alternate(
        &mut self,
        phase: TrialPhase,
        display_time: Duration,
    ) -> Result<usize, ExperimentError> {
        let mut frames = 0;
        self.devices.timer.reset();
        while self.devices.timer.elapsed() < display_time {
            self.draw_field()?;
            self.finish_frame(phase)?;
            frames += 1;
        }
        Ok(frames)
    }

    fn flash(&mut self, phase: TrialPhase, trial: &TrialConfig) -> Result<usize, ExperimentError> {
        let config = &self.ctx.config;
        let glyph = config
            .stimuli
            .glyph(trial.glyph, trial.side.sign() * config.distractor_offset_px);
        for _ in 0..config.flash_frames {
            self.draw_field()?;
            self.devices.display.draw(glyph.clone())?;
            self.finish_frame(phase)?;
        }
        Ok(config.flash_frames)
    }

    /// Tops the frame with the fixation dot where the phase shows it, then presents.
    fn finish_frame(&mut self, phase: TrialPhase) -> Result<(), ExperimentError> {
        if phase.draws_fixation() {
            self.devices
                .display
                .draw(self.ctx.config.stimuli.fixation())?;
        }
        self.devices.display.present(false)?;
        Ok(())
    }

    fn draw_field(&mut self) -> Result<(), ExperimentError> {
        let field = FieldId::for_flag(self.white_first);
        self.white_first = !self.white_first;
        self.devices.display.draw(Stimulus::Field(field))?;
        Ok(())
    }

    fn sample_display_time(&mut self) -> Result<Duration, ExperimentError> {
        let (min, max) = self.ctx.config.alternation_range_nanos()?;
        Ok(Duration::from_nanos(self.devices.rng.random_range(min..=max)))
    }
}
