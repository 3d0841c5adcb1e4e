//! Seams to the rendering collaborator and the host's state display.
//!
//! The engine never waits on wall-clock time. A call to
//! [`EffectPlayer::play`] with [`EffectMode::Wait`] returning *is* the
//! completion signal; a headless host returns immediately.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::{Effect, EffectMode, StateChange};

/// Plays visual effects requested by the engine.
pub trait EffectPlayer {
    fn play(&mut self, effect: &Effect, mode: EffectMode);
}

/// Receives pushed state changes.
pub trait StateSink {
    fn publish(&mut self, change: StateChange);
}

/// Completes every effect instantly.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantEffects;

impl EffectPlayer for InstantEffects {
    fn play(&mut self, _effect: &Effect, _mode: EffectMode) {}
}

/// Discards state changes.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl StateSink for NullSink {
    fn publish(&mut self, _change: StateChange) {}
}

pub type EffectLog = Rc<RefCell<Vec<(Effect, EffectMode)>>>;
pub type ChangeLog = Rc<RefCell<Vec<StateChange>>>;

/// Records effects into a shared log.
#[derive(Debug, Default, Clone)]
pub struct RecordingEffects {
    log: EffectLog,
}

impl RecordingEffects {
    /// A player plus a handle to read what it recorded.
    pub fn new() -> (Self, EffectLog) {
        let log = EffectLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl EffectPlayer for RecordingEffects {
    fn play(&mut self, effect: &Effect, mode: EffectMode) {
        self.log.borrow_mut().push((*effect, mode));
    }
}

/// Records state changes into a shared log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    log: ChangeLog,
}

impl RecordingSink {
    pub fn new() -> (Self, ChangeLog) {
        let log = ChangeLog::default();
        (Self { log: log.clone() }, log)
    }
}

impl StateSink for RecordingSink {
    fn publish(&mut self, change: StateChange) {
        self.log.borrow_mut().push(change);
    }
}

/// Forwards state changes through `tracing` at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StateSink for TracingSink {
    fn publish(&mut self, change: StateChange) {
        tracing::debug!(?change, "state change");
    }
}
