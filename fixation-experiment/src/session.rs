use fixation_core::{Display, ExperimentError, KeyOutcome, Keyboard};
use fixation_timing::Timer;
use log::{debug, info};
use rand::Rng;

use crate::instructions;
use crate::sequencer::{Devices, SessionContext, TrialOutcome, TrialSequencer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed { trials: usize },
    /// The quit key was pressed; `completed_trials` counts the whole session so far.
    Aborted { completed_trials: usize },
}

/// Runs blocks of trials against one plan. Every block reads the plan from its start.
pub struct SessionDriver<D, K, T, R> {
    context: SessionContext,
    devices: Devices<D, K, T, R>,
    completed_trials: usize,
}

impl<D, K, T, R> SessionDriver<D, K, T, R>
where
    D: Display,
    K: Keyboard,
    T: Timer,
    R: Rng,
{
    pub fn new(context: SessionContext, devices: Devices<D, K, T, R>) -> Self {
        Self {
            context,
            devices,
            completed_trials: 0,
        }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn devices(&self) -> &Devices<D, K, T, R> {
        &self.devices
    }

    /// Trials completed so far across every block.
    pub fn completed_trials(&self) -> usize {
        self.completed_trials
    }

    /// Welcome and instruction pages, a short pause, then every configured block.
    pub fn run(&mut self) -> Result<SessionOutcome, ExperimentError> {
        let blocks = self.context.config.blocks.clone();
        info!(
            "Session started: {} blocks, {} trials planned",
            blocks.len(),
            self.context.plan.len()
        );

        for page in std::iter::once(instructions::WELCOME).chain(instructions::PAGES) {
            if self.show_page(page)? == KeyOutcome::Abort {
                info!("Session aborted during instructions");
                return Ok(SessionOutcome::Aborted {
                    completed_trials: self.completed_trials,
                });
            }
        }
        self.devices
            .timer
            .sleep(self.context.config.pre_session_pause);

        let mut trials = 0;
        for (n, block) in blocks.iter().enumerate() {
            info!(
                "Block {} started: {} trials, distractor {}",
                n + 1,
                block.n_trials,
                if block.show_distractor { "on" } else { "off" }
            );
            match self.run_session(block.show_distractor, block.n_trials)? {
                SessionOutcome::Completed { trials: done } => trials += done,
                aborted => return Ok(aborted),
            }
        }

        info!("Session completed: {} trials", trials);
        Ok(SessionOutcome::Completed { trials })
    }

    /// Runs plan entries `0..n_trials`.
    pub fn run_session(
        &mut self,
        cue_active: bool,
        n_trials: usize,
    ) -> Result<SessionOutcome, ExperimentError> {
        let len = self.context.plan.len();
        if n_trials > len {
            return Err(ExperimentError::PlanExhausted { index: len, len });
        }

        let mut completed = 0;
        for index in 0..n_trials {
            let outcome = TrialSequencer::new(&self.context, &mut self.devices)
                .run_trial(index, cue_active)?;
            match outcome {
                TrialOutcome::Completed(summary) => {
                    debug!(
                        "Trial {}/{} presented {} frames",
                        index + 1,
                        len,
                        summary.total_frames()
                    );
                    completed += 1;
                    self.completed_trials += 1;
                }
                TrialOutcome::Aborted => {
                    info!("Session aborted after {} trials", self.completed_trials);
                    return Ok(SessionOutcome::Aborted {
                        completed_trials: self.completed_trials,
                    });
                }
            }
        }
        Ok(SessionOutcome::Completed { trials: completed })
    }

    fn show_page(&mut self, text: &'static str) -> Result<KeyOutcome, ExperimentError> {
        let config = &self.context.config;
        self.devices.display.draw(config.stimuli.text(text))?;
        self.devices.display.present(false)?;
        Ok(self
            .devices
            .keyboard
            .wait_for_continue(config.continue_key, config.quit_key)?)
    }
}
