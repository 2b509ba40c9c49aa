#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use fixation_core::{ArrowDirection, Display, FieldId, Key, Keyboard, Stimulus};
use fixation_experiment::{Devices, SessionConfig};
use fixation_timing::Timer;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Shared simulated "now" that the display advances on every present.
#[derive(Debug, Clone, Default)]
pub struct SimulatedClock {
    now: Rc<Cell<Duration>>,
    origin: Duration,
}

impl SimulatedClock {
    pub fn advance(&self, d: Duration) {
        self.now.set(self.now.get() + d);
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }
}

impl Timer for SimulatedClock {
    fn reset(&mut self) {
        self.origin = self.now.get();
    }
    fn elapsed(&self) -> Duration {
        self.now.get() - self.origin
    }
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

/// Returns queued `elapsed` readings, then a value past any display time.
#[derive(Debug, Default)]
pub struct ScriptedTimer {
    pub readings: RefCell<VecDeque<Duration>>,
    pub resets: usize,
}

impl Timer for ScriptedTimer {
    fn reset(&mut self) {
        self.resets += 1;
    }
    fn elapsed(&self) -> Duration {
        self.readings
            .borrow_mut()
            .pop_front()
            .unwrap_or(Duration::from_secs(3600))
    }
    fn sleep(&self, _d: Duration) {}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub stimuli: Vec<Stimulus>,
    pub clear: bool,
}

impl Frame {
    pub fn field(&self) -> Option<FieldId> {
        self.stimuli.iter().find_map(|s| match s {
            Stimulus::Field(id) => Some(*id),
            _ => None,
        })
    }

    pub fn arrow(&self) -> Option<ArrowDirection> {
        self.stimuli.iter().find_map(|s| match s {
            Stimulus::Arrow { direction, .. } => Some(*direction),
            _ => None,
        })
    }

    pub fn glyph_x(&self) -> Option<f32> {
        self.stimuli.iter().find_map(|s| match s {
            Stimulus::Glyph { x, .. } => Some(*x),
            _ => None,
        })
    }

    pub fn has_fixation(&self) -> bool {
        self.stimuli
            .iter()
            .any(|s| matches!(s, Stimulus::Circle { .. }))
    }

    pub fn text(&self) -> Option<&'static str> {
        self.stimuli.iter().find_map(|s| match s {
            Stimulus::Text { content, .. } => Some(*content),
            _ => None,
        })
    }

    pub fn is_blank_clear(&self) -> bool {
        self.clear && self.stimuli.is_empty()
    }
}

/// Records every presented frame; optionally advances a clock per present.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub frames: Vec<Frame>,
    pending: Vec<Stimulus>,
    clock: Option<(SimulatedClock, Duration)>,
}

impl RecordingDisplay {
    pub fn with_clock(clock: SimulatedClock, frame_period: Duration) -> Self {
        Self {
            clock: Some((clock, frame_period)),
            ..Default::default()
        }
    }

    pub fn count(&self, pred: impl Fn(&Frame) -> bool) -> usize {
        self.frames.iter().filter(|f| pred(f)).count()
    }

    pub fn draw_count(&self, pred: impl Fn(&Stimulus) -> bool) -> usize {
        self.frames
            .iter()
            .flat_map(|f| f.stimuli.iter())
            .filter(|s| pred(s))
            .count()
    }
}

impl Display for RecordingDisplay {
    fn draw(&mut self, stimulus: Stimulus) -> anyhow::Result<()> {
        self.pending.push(stimulus);
        Ok(())
    }

    fn present(&mut self, clear: bool) -> anyhow::Result<()> {
        let mut stimuli = std::mem::take(&mut self.pending);
        if clear {
            stimuli.clear();
        }
        self.frames.push(Frame { stimuli, clear });
        if let Some((clock, period)) = &self.clock {
            clock.advance(*period);
        }
        Ok(())
    }
}

/// Replays scripted key presses; falls back to `repeat` once they run out.
#[derive(Debug, Default)]
pub struct ScriptedKeyboard {
    pub keys: VecDeque<Key>,
    pub repeat: Option<Key>,
    pub reads: Vec<Vec<Key>>,
}

impl ScriptedKeyboard {
    pub fn always(key: Key) -> Self {
        Self {
            repeat: Some(key),
            ..Default::default()
        }
    }

    pub fn then_always(keys: impl IntoIterator<Item = Key>, key: Key) -> Self {
        Self {
            keys: keys.into_iter().collect(),
            repeat: Some(key),
            ..Default::default()
        }
    }
}

impl Keyboard for ScriptedKeyboard {
    fn wait_for_key(&mut self, allowed: &[Key]) -> anyhow::Result<Key> {
        self.reads.push(allowed.to_vec());
        while let Some(key) = self.keys.pop_front() {
            if allowed.contains(&key) {
                return Ok(key);
            }
        }
        match self.repeat {
            Some(key) if allowed.contains(&key) => Ok(key),
            _ => anyhow::bail!("keyboard script exhausted"),
        }
    }
}

pub type SimDevices = Devices<RecordingDisplay, ScriptedKeyboard, SimulatedClock, StdRng>;

/// Devices on a simulated clock that ticks `frame_period` per present.
pub fn simulated(frame_period: Duration, keyboard: ScriptedKeyboard, seed: u64) -> SimDevices {
    let clock = SimulatedClock::default();
    Devices {
        display: RecordingDisplay::with_clock(clock.clone(), frame_period),
        keyboard,
        timer: clock,
        rng: StdRng::seed_from_u64(seed),
    }
}

pub fn fixed_display_time(config: SessionConfig, secs: f64) -> SessionConfig {
    let d = Duration::from_secs_f64(secs);
    SessionConfig {
        alternation_range: (d, d),
        ..config
    }
}

pub const FRAME_16_6: Duration = Duration::from_micros(16_600);
