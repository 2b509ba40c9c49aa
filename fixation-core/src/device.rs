use serde::{Deserialize, Serialize};

use crate::stimulus::Stimulus;

/// A surface that collects primitives and shows them as one frame.
pub trait Display {
    /// Queues a primitive into the frame being built.
    fn draw(&mut self, stimulus: Stimulus) -> anyhow::Result<()>;

    /// Shows the queued primitives over the background and starts a new frame.
    /// With `clear` the queue is dropped and a blank frame is shown instead.
    fn present(&mut self, clear: bool) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Space,
    Return,
    Escape,
    Q,
}

/// Result of a continue/quit key read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Abort,
}

pub trait Keyboard {
    /// Blocks until one of `allowed` is pressed and returns it.
    fn wait_for_key(&mut self, allowed: &[Key]) -> anyhow::Result<Key>;

    /// Blocks on `{continue_key, quit_key}`; the quit key maps to [`KeyOutcome::Abort`].
    fn wait_for_continue(
        &mut self,
        continue_key: Key,
        quit_key: Key,
    ) -> anyhow::Result<KeyOutcome> {
        let key = self.wait_for_key(&[continue_key, quit_key])?;
        Ok(if key == quit_key {
            KeyOutcome::Abort
        } else {
            KeyOutcome::Continue
        })
    }
}

impl<D: Display + ?Sized> Display for &mut D {
    fn draw(&mut self, stimulus: Stimulus) -> anyhow::Result<()> {
        (**self).draw(stimulus)
    }

    fn present(&mut self, clear: bool) -> anyhow::Result<()> {
        (**self).present(clear)
    }
}

impl<K: Keyboard + ?Sized> Keyboard for &mut K {
    fn wait_for_key(&mut self, allowed: &[Key]) -> anyhow::Result<Key> {
        (**self).wait_for_key(allowed)
    }
}
