use crate::domain::state::EntityState;
use crate::domain::tuning::ReconciliationTuning;

/// Result of folding one authoritative state into a prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReconcileOutcome {
    /// Drift was within the acceptance threshold; the prediction is untouched.
    Unchanged,
    /// A soft correction was applied; carries the pre-correction distance.
    Corrected { position_error: f32 },
}

/// Blends late-arriving authoritative state into the local prediction.
pub struct ReconciliationEngine {
    tuning: ReconciliationTuning,
}

impl ReconciliationEngine {
    pub fn new(tuning: ReconciliationTuning) -> Self {
        Self { tuning }
    }

    /// Correct `predicted` toward `authoritative` in place.
    ///
    /// Drift at or below the threshold is accepted as visually imperceptible.
    /// Beyond it, position and velocity move a fixed fraction toward the
    /// server state; repeating this on later snapshots spreads the visible
    /// jump over time instead of snapping. The prediction tick is left alone.
    pub fn reconcile(
        &self,
        authoritative: &EntityState,
        predicted: &mut EntityState,
    ) -> ReconcileOutcome {
        let position_error = authoritative.position - predicted.position;
        let velocity_error = authoritative.velocity - predicted.velocity;

        let distance = position_error.length();
        if distance <= self.tuning.error_threshold {
            return ReconcileOutcome::Unchanged;
        }

        predicted.position += position_error * self.tuning.smoothing_factor;
        predicted.velocity += velocity_error * self.tuning.smoothing_factor;

        ReconcileOutcome::Corrected {
            position_error: distance,
        }
    }
}
