// Shared test doubles for use-case unit tests.

use crate::domain::{Clock, EntityState, Renderer};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Clock whose reading the test advances by hand.
#[derive(Clone, Default)]
pub struct StepClock {
    now: Arc<AtomicU64>,
}

impl StepClock {
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::Relaxed);
    }

    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::Relaxed);
    }
}

impl Clock for StepClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::Relaxed)
    }
}

/// Renderer that records every applied state for assertions.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    applied: Arc<Mutex<Vec<(String, EntityState)>>>,
}

impl RecordingRenderer {
    pub fn applied(&self) -> Vec<(String, EntityState)> {
        self.applied.lock().expect("renderer log lock").clone()
    }

    pub fn last_for(&self, entity_id: &str) -> Option<EntityState> {
        self.applied()
            .iter()
            .rev()
            .find(|(id, _)| id == entity_id)
            .map(|(_, state)| state.clone())
    }
}

impl Renderer for RecordingRenderer {
    fn apply_state(&mut self, entity_id: &str, state: &EntityState) {
        self.applied
            .lock()
            .expect("renderer log lock")
            .push((entity_id.to_string(), state.clone()));
    }
}
