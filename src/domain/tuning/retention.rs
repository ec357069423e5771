/// Retention windows for the per-session history stores.
///
/// The rollback store and the prediction bookkeeping prune on different
/// windows; both are explicit here so neither inherits the other's value.

#[derive(Debug, Clone, Copy)]
pub struct RetentionTuning {
    /// How long rollback position history is kept, in milliseconds.
    pub rollback_window_millis: u64,

    /// How long prediction records are kept for diagnostics, in milliseconds.
    pub prediction_window_millis: u64,
}

impl Default for RetentionTuning {
    fn default() -> Self {
        Self {
            rollback_window_millis: 5_000,
            prediction_window_millis: 10_000,
        }
    }
}
