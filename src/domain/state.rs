// Domain-level entity state and input types for the sync core.

use glam::{Quat, Vec3};

/// Snapshot of one simulated entity at a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityState {
    pub entity_id: String,
    pub position: Vec3,
    pub velocity: Vec3,
    // Orientation is carried through untouched; this core never rotates entities.
    pub rotation: Quat,
    pub tick: u64,
    // Diagnostic prediction confidence in [0.1, 1.0]; no control-flow effect.
    pub confidence: f32,
}

impl EntityState {
    /// State used when a player has no prior prediction yet.
    pub fn spawn(entity_id: String, position: Vec3) -> Self {
        Self {
            entity_id,
            position,
            velocity: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            tick: 0,
            confidence: 1.0,
        }
    }
}

/// One captured input sample for the local player.
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub player_id: String,
    // Strictly increasing per player; the ordering and acknowledgement key.
    // Deliberately not wall-clock time.
    pub sequence: u64,
    // Movement intent, each axis in [-1, 1]; the vertical axis is ignored.
    pub movement: Vec3,
    // Capture time in milliseconds, informational only.
    pub timestamp: u64,
}

/// Authoritative server state for one tick; never mutated after receipt.
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    pub tick: u64,
    pub entities: Vec<EntityState>,
}
