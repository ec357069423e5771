// Ports consumed by the sync core; hosts inject the implementations.

use crate::domain::EntityState;
use std::time::Instant;

/// Monotonic millisecond time source for timestamps and retention pruning.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

/// Production clock anchored at construction so readings never go backwards.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// One-way push of predicted/corrected states toward the rendering side.
///
/// The host owns the entity-id-to-scene-object mapping; the core keeps no
/// render handles of its own and expects nothing back.
pub trait Renderer {
    fn apply_state(&mut self, entity_id: &str, state: &EntityState);
}
