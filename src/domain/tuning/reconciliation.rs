/// Gameplay tuning for folding authoritative state into predictions.

#[derive(Debug, Clone, Copy)]
pub struct ReconciliationTuning {
    /// Position error in units below which drift is accepted uncorrected.
    pub error_threshold: f32,

    /// Fraction of the error applied per correction. Repeated snapshots make
    /// the remaining error decay geometrically instead of snapping.
    pub smoothing_factor: f32,
}

impl Default for ReconciliationTuning {
    fn default() -> Self {
        Self {
            error_threshold: 1.0,
            smoothing_factor: 0.7,
        }
    }
}
