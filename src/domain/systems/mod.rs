// Simulation systems: pure state-transition logic, no I/O.

pub mod prediction;
pub mod reconciliation;

pub use prediction::{PredictionEngine, PredictionRecord};
pub use reconciliation::{ReconcileOutcome, ReconciliationEngine};
