// Tunable constant bundles for the sync core.

pub mod prediction;
pub mod reconciliation;
pub mod retention;

pub use prediction::PredictionTuning;
pub use reconciliation::ReconciliationTuning;
pub use retention::RetentionTuning;
